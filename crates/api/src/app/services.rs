//! Infrastructure wiring: stores, job queue, mail transport, dispatcher,
//! and the credential directory.
//!
//! Dev/test runs wire everything in memory; `USE_PERSISTENT_STORES=true`
//! swaps the ledger onto Postgres. The report worker is spawned here and
//! lives as long as the services do.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};

use salesdesk_auth::{AuthClaims, Hs256TokenCodec, TokenError, UserAccount};
use salesdesk_core::BusinessClock;
use salesdesk_infra::credentials::UserDirectory;
use salesdesk_infra::jobs::{InMemoryJobStore, JobExecutor, JobExecutorConfig, JobExecutorHandle};
use salesdesk_infra::mail::{DynMailClient, RecordingMailClient};
use salesdesk_infra::store::{InMemoryStore, PostgresStore};
use salesdesk_infra::{ReportDispatcher, Store};

use crate::config::ApiConfig;

pub struct AppServices {
    pub store: Arc<dyn Store>,
    pub jobs: Arc<InMemoryJobStore>,
    pub mail: DynMailClient,
    pub dispatcher: Arc<ReportDispatcher<Arc<InMemoryJobStore>>>,
    pub directory: Arc<UserDirectory>,
    pub codec: Arc<Hs256TokenCodec>,
    pub clock: BusinessClock,
    pub token_ttl: Duration,
    pub admin_report_recipient: Option<String>,
    // Held so the report worker keeps polling for the lifetime of the app.
    _executor: JobExecutorHandle,
}

impl AppServices {
    /// The business date right now.
    pub fn today(&self) -> NaiveDate {
        self.clock.today(Utc::now())
    }

    /// Issue a bearer token for an authenticated account.
    pub fn issue_token(&self, account: &UserAccount) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AuthClaims {
            sub: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            role: account.role,
            issued_at: now,
            expires_at: now + self.token_ttl,
        };
        self.codec.issue(&claims)
    }
}

pub async fn build_services(config: &ApiConfig) -> AppServices {
    let store = build_store(config).await;
    let mail = build_mail(config);

    let jobs = InMemoryJobStore::arc();
    let dispatcher = Arc::new(ReportDispatcher::new(
        store.clone(),
        jobs.clone(),
        mail.clone(),
        config.clock,
    ));

    let mut executor = JobExecutor::new(jobs.clone());
    dispatcher.register_handlers(&mut executor);
    let handle = executor.spawn(JobExecutorConfig::default().with_name("report-worker"));

    AppServices {
        store,
        jobs,
        mail,
        dispatcher,
        directory: Arc::new(UserDirectory::new()),
        codec: Arc::new(Hs256TokenCodec::new(config.jwt_secret.as_bytes())),
        clock: config.clock,
        token_ttl: Duration::minutes(config.token_ttl_minutes),
        admin_report_recipient: config.admin_report_recipient.clone(),
        _executor: handle,
    }
}

async fn build_store(config: &ApiConfig) -> Arc<dyn Store> {
    if config.use_persistent_stores {
        match &config.database_url {
            Some(url) => {
                let store = PostgresStore::connect(url)
                    .await
                    .expect("failed to connect to Postgres");
                store
                    .ensure_schema()
                    .await
                    .expect("failed to ensure database schema");
                return Arc::new(store);
            }
            None => {
                tracing::warn!(
                    "USE_PERSISTENT_STORES=true but DATABASE_URL not set, falling back to in-memory"
                );
            }
        }
    }
    Arc::new(InMemoryStore::new())
}

fn build_mail(config: &ApiConfig) -> DynMailClient {
    match &config.smtp {
        #[cfg(feature = "smtp")]
        Some(smtp) => {
            match salesdesk_infra::mail::SmtpMailClient::new(
                &smtp.host,
                smtp.port,
                smtp.username.clone(),
                smtp.password.clone(),
                config.mail_sender.clone(),
            ) {
                Ok(client) => return Arc::new(client),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to build SMTP transport, recording mail instead");
                }
            }
        }
        #[cfg(not(feature = "smtp"))]
        Some(_) => {
            tracing::warn!("SMTP_HOST set but smtp feature not enabled, recording mail instead");
        }
        None => {
            tracing::warn!("no SMTP transport configured; outgoing mail is recorded, not delivered");
        }
    }
    Arc::new(RecordingMailClient::new(config.mail_sender.clone()))
}
