//! Report dispatcher: turns ledger state into queued, addressed messages.
//!
//! Enqueue operations return as soon as the job is stored; the aggregation
//! and send run later on the executor, reading whatever was committed at
//! that point. Each recipient is an isolated job, so a failed delivery is
//! retried and dead-lettered without touching its siblings, and nothing
//! here ever mutates the ledger.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use salesdesk_core::{BusinessClock, JobId, SellerId};
use salesdesk_reporting::{daily_summary, seller_daily_line};
use salesdesk_sales::SaleFilter;

use crate::jobs::{
    Job, JobExecutor, JobHandler, JobKind, JobResult, JobStore, JobStoreError,
};
use crate::mail::{templates, DynMailClient, MailError};
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("seller not found")]
    SellerNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to enqueue job: {0}")]
    Queue(#[from] JobStoreError),

    #[error(transparent)]
    Mail(#[from] MailError),

    #[error("malformed job payload: {0}")]
    Payload(String),
}

/// Payload of a `report.seller_commission` job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerReportPayload {
    pub seller_id: SellerId,
    pub date: NaiveDate,
}

/// Payload of a `report.admin_sales` job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminReportPayload {
    pub date: NaiveDate,
    pub recipient: String,
}

/// What a daily batch put on the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchQueued {
    pub date: NaiveDate,
    pub seller_reports: usize,
    pub admin_reports: usize,
}

pub struct ReportDispatcher<J: JobStore> {
    store: Arc<dyn Store>,
    jobs: J,
    mail: DynMailClient,
    clock: BusinessClock,
}

impl<J: JobStore + 'static> ReportDispatcher<J> {
    pub fn new(store: Arc<dyn Store>, jobs: J, mail: DynMailClient, clock: BusinessClock) -> Self {
        Self {
            store,
            jobs,
            mail,
            clock,
        }
    }

    /// Queue a commission report for one seller.
    ///
    /// When no date is supplied it defaults to the seller's most recent
    /// sale date, falling back to the business date. Returns the queued job
    /// id and the date the report will cover.
    pub async fn enqueue_seller_report(
        &self,
        seller_id: SellerId,
        date: Option<NaiveDate>,
    ) -> Result<(JobId, NaiveDate), DispatchError> {
        if self.store.seller(seller_id).await?.is_none() {
            return Err(DispatchError::SellerNotFound);
        }

        let date = match date {
            Some(date) => date,
            None => self
                .store
                .latest_sale_date(seller_id)
                .await?
                .unwrap_or_else(|| self.clock.today(Utc::now())),
        };

        let job_id = self.queue_seller_job(seller_id, date)?;
        info!(%seller_id, %date, %job_id, "queued seller commission report");
        Ok((job_id, date))
    }

    /// Queue the whole-system daily report for one recipient.
    pub async fn enqueue_admin_report(
        &self,
        date: NaiveDate,
        recipient: &str,
    ) -> Result<JobId, DispatchError> {
        let payload = AdminReportPayload {
            date,
            recipient: recipient.to_string(),
        };
        let job_id = self.jobs.enqueue(Job::new(
            JobKind::AdminSalesReport,
            payload_value(&payload)?,
        ))?;
        info!(%date, recipient, %job_id, "queued admin daily report");
        Ok(job_id)
    }

    /// Queue the daily batch: one commission report per registered seller
    /// and one admin report per manager email. Defaults to yesterday.
    pub async fn enqueue_daily_batch(
        &self,
        date: Option<NaiveDate>,
        manager_emails: &[String],
    ) -> Result<BatchQueued, DispatchError> {
        let date = date.unwrap_or_else(|| self.clock.yesterday(Utc::now()));

        let sellers = self.store.search_sellers(None).await?;
        for seller in &sellers {
            self.queue_seller_job(seller.id, date)?;
        }

        for email in manager_emails {
            self.enqueue_admin_report(date, email).await?;
        }

        let queued = BatchQueued {
            date,
            seller_reports: sellers.len(),
            admin_reports: manager_emails.len(),
        };
        info!(
            %date,
            seller_reports = queued.seller_reports,
            admin_reports = queued.admin_reports,
            "queued daily report batch"
        );
        Ok(queued)
    }

    fn queue_seller_job(
        &self,
        seller_id: SellerId,
        date: NaiveDate,
    ) -> Result<JobId, DispatchError> {
        let payload = SellerReportPayload { seller_id, date };
        Ok(self.jobs.enqueue(Job::new(
            JobKind::SellerCommissionReport,
            payload_value(&payload)?,
        ))?)
    }

    /// Register the two report handlers on an executor.
    pub fn register_handlers(self: &Arc<Self>, executor: &mut JobExecutor<J>) {
        executor.register_handler(
            JobKind::SellerCommissionReport,
            Arc::new(SellerReportHandler {
                dispatcher: Arc::clone(self),
            }),
        );
        executor.register_handler(
            JobKind::AdminSalesReport,
            Arc::new(AdminReportHandler {
                dispatcher: Arc::clone(self),
            }),
        );
    }

    /// Aggregate one seller's day and send the commission mail.
    ///
    /// A date with no sales still sends a zeroed report.
    async fn send_seller_report(
        &self,
        seller_id: SellerId,
        date: NaiveDate,
    ) -> Result<(), DispatchError> {
        let seller = self
            .store
            .seller(seller_id)
            .await?
            .ok_or(DispatchError::SellerNotFound)?;

        let filter = SaleFilter {
            seller_id: Some(seller_id),
            date_from: Some(date),
            date_to: Some(date),
            ..Default::default()
        };
        let sales = self.store.list_sales(&filter).await?;
        let line = seller_daily_line(&seller, date, &sales);

        let message = templates::seller_commission_report(&line, date);
        self.mail.send(message).await?;
        info!(%seller_id, %date, sales = line.sales_count, "sent seller commission report");
        Ok(())
    }

    /// Aggregate the whole day and send the admin report.
    async fn send_admin_report(
        &self,
        date: NaiveDate,
        recipient: &str,
    ) -> Result<(), DispatchError> {
        let filter = SaleFilter {
            date_from: Some(date),
            date_to: Some(date),
            ..Default::default()
        };
        let sales = self.store.list_sales(&filter).await?;
        let sellers = self.store.search_sellers(None).await?;
        let summary = daily_summary(date, &sales, &sellers);

        let message = templates::admin_daily_report(&summary, recipient);
        self.mail.send(message).await?;
        info!(%date, recipient, sales = summary.sales_count, "sent admin daily report");
        Ok(())
    }
}

fn payload_value<T: Serialize>(payload: &T) -> Result<serde_json::Value, DispatchError> {
    serde_json::to_value(payload).map_err(|e| DispatchError::Payload(e.to_string()))
}

struct SellerReportHandler<J: JobStore> {
    dispatcher: Arc<ReportDispatcher<J>>,
}

#[async_trait]
impl<J: JobStore + 'static> JobHandler for SellerReportHandler<J> {
    async fn run(&self, job: &Job) -> JobResult {
        let payload: SellerReportPayload = match serde_json::from_value(job.payload.clone()) {
            Ok(payload) => payload,
            Err(e) => return JobResult::Failure(format!("malformed payload: {e}")),
        };

        match self
            .dispatcher
            .send_seller_report(payload.seller_id, payload.date)
            .await
        {
            Ok(()) => JobResult::Success,
            Err(e) => {
                warn!(
                    seller_id = %payload.seller_id,
                    date = %payload.date,
                    error = %e,
                    "seller commission report failed"
                );
                JobResult::Failure(e.to_string())
            }
        }
    }
}

struct AdminReportHandler<J: JobStore> {
    dispatcher: Arc<ReportDispatcher<J>>,
}

#[async_trait]
impl<J: JobStore + 'static> JobHandler for AdminReportHandler<J> {
    async fn run(&self, job: &Job) -> JobResult {
        let payload: AdminReportPayload = match serde_json::from_value(job.payload.clone()) {
            Ok(payload) => payload,
            Err(e) => return JobResult::Failure(format!("malformed payload: {e}")),
        };

        match self
            .dispatcher
            .send_admin_report(payload.date, &payload.recipient)
            .await
        {
            Ok(()) => JobResult::Success,
            Err(e) => {
                warn!(
                    date = %payload.date,
                    recipient = %payload.recipient,
                    error = %e,
                    "admin daily report failed"
                );
                JobResult::Failure(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use salesdesk_sales::NewSale;
    use salesdesk_sellers::{NewSeller, Seller};

    use crate::jobs::{InMemoryJobStore, JobExecutorConfig};
    use crate::mail::RecordingMailClient;
    use crate::store::{InMemoryStore, SaleStore, SellerStore};

    struct Fixture {
        store: Arc<InMemoryStore>,
        jobs: Arc<InMemoryJobStore>,
        mail: Arc<RecordingMailClient>,
        dispatcher: Arc<ReportDispatcher<Arc<InMemoryJobStore>>>,
        executor: JobExecutor<Arc<InMemoryJobStore>>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let jobs = InMemoryJobStore::arc();
        let mail = RecordingMailClient::arc("reports@example.com");
        let dispatcher = Arc::new(ReportDispatcher::new(
            store.clone() as Arc<dyn Store>,
            jobs.clone(),
            mail.clone() as DynMailClient,
            BusinessClock::utc(),
        ));
        let mut executor = JobExecutor::new(jobs.clone());
        dispatcher.register_handlers(&mut executor);

        Fixture {
            store,
            jobs,
            mail,
            dispatcher,
            executor,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    async fn register_seller(fx: &Fixture, name: &str, email: &str) -> Seller {
        let seller = NewSeller::new(name, email)
            .unwrap()
            .into_seller(Utc::now());
        fx.store.insert_seller(seller.clone()).await.unwrap();
        seller
    }

    async fn record_sale(fx: &Fixture, seller: &Seller, day: NaiveDate, amount_cents: i64) {
        let sale = NewSale::new(seller.id, Decimal::new(amount_cents, 2), day, day)
            .unwrap()
            .into_sale(Utc::now());
        fx.store.insert_sale(sale).await.unwrap();
    }

    #[tokio::test]
    async fn seller_report_renders_the_days_figures() {
        let fx = fixture();
        let seller = register_seller(&fx, "Maria", "maria@example.com").await;
        record_sale(&fx, &seller, date(15), 100_000).await;
        record_sale(&fx, &seller, date(15), 50_000).await;
        record_sale(&fx, &seller, date(14), 999_900).await; // other day, excluded

        fx.dispatcher
            .enqueue_seller_report(seller.id, Some(date(15)))
            .await
            .unwrap();
        fx.executor.drain().await;

        let sent = fx.mail.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "maria@example.com");
        assert!(sent[0].body.contains("1500.00"));
        assert!(sent[0].body.contains("127.50"));
    }

    #[tokio::test]
    async fn zero_sale_date_still_sends_a_zeroed_report() {
        let fx = fixture();
        let seller = register_seller(&fx, "Maria", "maria@example.com").await;

        fx.dispatcher
            .enqueue_seller_report(seller.id, Some(date(15)))
            .await
            .unwrap();
        fx.executor.drain().await;

        let sent = fx.mail.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("Sales recorded:    0"));
        assert!(sent[0].body.contains("0.00"));
    }

    #[tokio::test]
    async fn missing_date_defaults_to_latest_sale_date() {
        let fx = fixture();
        let seller = register_seller(&fx, "Maria", "maria@example.com").await;
        record_sale(&fx, &seller, date(10), 100_00).await;
        record_sale(&fx, &seller, date(12), 100_00).await;

        let (_, resolved) = fx
            .dispatcher
            .enqueue_seller_report(seller.id, None)
            .await
            .unwrap();
        assert_eq!(resolved, date(12));
    }

    #[tokio::test]
    async fn unknown_seller_is_rejected_at_enqueue() {
        let fx = fixture();
        assert!(matches!(
            fx.dispatcher
                .enqueue_seller_report(SellerId::new(), Some(date(15)))
                .await,
            Err(DispatchError::SellerNotFound)
        ));
    }

    #[tokio::test]
    async fn one_failing_recipient_does_not_block_the_others() {
        let fx = fixture();
        let a = register_seller(&fx, "Ana", "ana@example.com").await;
        let b = register_seller(&fx, "Bruno", "bruno@example.com").await;
        record_sale(&fx, &a, date(15), 100_00).await;
        record_sale(&fx, &b, date(15), 200_00).await;
        fx.mail.fail_for("ana@example.com");

        fx.dispatcher
            .enqueue_daily_batch(Some(date(15)), &[])
            .await
            .unwrap();
        fx.executor.drain().await;

        // Bruno's report went out even though Ana's delivery failed.
        let sent = fx.mail.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "bruno@example.com");

        // Ana's job is queued for retry, not lost.
        let stats = fx.jobs.stats().unwrap();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.completed, 1);
    }

    #[tokio::test]
    async fn daily_batch_queues_one_job_per_seller_and_manager() {
        let fx = fixture();
        register_seller(&fx, "Ana", "ana@example.com").await;
        register_seller(&fx, "Bruno", "bruno@example.com").await;

        let queued = fx
            .dispatcher
            .enqueue_daily_batch(Some(date(15)), &["boss@example.com".to_string()])
            .await
            .unwrap();
        assert_eq!(queued.seller_reports, 2);
        assert_eq!(queued.admin_reports, 1);

        fx.executor.drain().await;
        let recipients: Vec<String> = fx.mail.sent().into_iter().map(|m| m.to).collect();
        assert!(recipients.contains(&"ana@example.com".to_string()));
        assert!(recipients.contains(&"bruno@example.com".to_string()));
        assert!(recipients.contains(&"boss@example.com".to_string()));
    }

    #[tokio::test]
    async fn admin_report_covers_only_the_requested_date() {
        let fx = fixture();
        let seller = register_seller(&fx, "Maria", "maria@example.com").await;
        record_sale(&fx, &seller, date(15), 100_000).await;
        record_sale(&fx, &seller, date(16), 777_700).await;

        fx.dispatcher
            .enqueue_admin_report(date(15), "boss@example.com")
            .await
            .unwrap();
        fx.executor.drain().await;

        let sent = fx.mail.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("1000.00"));
        assert!(!sent[0].body.contains("7777.00"));
    }

    #[tokio::test]
    async fn spawned_executor_processes_queued_reports() {
        let fx = fixture();
        let seller = register_seller(&fx, "Maria", "maria@example.com").await;
        record_sale(&fx, &seller, date(15), 100_00).await;

        let handle = fx
            .executor
            .spawn(JobExecutorConfig::default().with_name("report-worker"));

        fx.dispatcher
            .enqueue_seller_report(seller.id, Some(date(15)))
            .await
            .unwrap();

        for _ in 0..100 {
            if !fx.mail.sent().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(fx.mail.sent().len(), 1);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn malformed_payload_fails_without_panicking() {
        let fx = fixture();
        let job = Job::new(JobKind::SellerCommissionReport, serde_json::json!("nonsense"));
        fx.jobs.enqueue(job).unwrap();

        fx.executor.drain().await;

        assert!(fx.mail.sent().is_empty());
        assert_eq!(fx.jobs.stats().unwrap().failed, 1);
    }
}
