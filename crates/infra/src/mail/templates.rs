//! Plain-text renderings of the two report mails.

use std::fmt::Write as _;

use chrono::NaiveDate;

use salesdesk_core::money::format_money;
use salesdesk_reporting::{DailySummary, SellerDailyLine};

use super::EmailMessage;

/// Commission summary addressed to one seller.
///
/// Zero-sale days still render (with zeroed figures) so a report can always
/// be sent.
pub fn seller_commission_report(line: &SellerDailyLine, date: NaiveDate) -> EmailMessage {
    let mut body = String::new();
    let _ = writeln!(body, "Hello {},", line.seller_name);
    let _ = writeln!(body);
    let _ = writeln!(body, "Here is your sales summary for {date}:");
    let _ = writeln!(body);
    let _ = writeln!(body, "  Sales recorded:    {}", line.sales_count);
    let _ = writeln!(
        body,
        "  Total amount:      {}",
        format_money(line.total_amount)
    );
    let _ = writeln!(
        body,
        "  Commission (8.5%): {}",
        format_money(line.total_commission)
    );
    let _ = writeln!(body);
    let _ = writeln!(body, "Thank you for your work!");

    EmailMessage {
        to: line.seller_email.clone(),
        subject: format!("Daily commission report - {date}"),
        body,
    }
}

/// Whole-system daily report addressed to one manager.
pub fn admin_daily_report(summary: &DailySummary, recipient: &str) -> EmailMessage {
    let mut body = String::new();
    let _ = writeln!(body, "Daily sales report for {}", summary.date);
    let _ = writeln!(body);
    let _ = writeln!(body, "  Sales recorded:   {}", summary.sales_count);
    let _ = writeln!(
        body,
        "  Total amount:     {}",
        format_money(summary.total_amount)
    );
    let _ = writeln!(
        body,
        "  Total commission: {}",
        format_money(summary.total_commission)
    );
    let _ = writeln!(body);

    if summary.sellers.is_empty() {
        let _ = writeln!(body, "No sales were recorded for this date.");
    } else {
        let _ = writeln!(body, "Per seller:");
        for line in &summary.sellers {
            let _ = writeln!(
                body,
                "  {} <{}>: {} sale(s), amount {}, commission {}",
                line.seller_name,
                line.seller_email,
                line.sales_count,
                format_money(line.total_amount),
                format_money(line.total_commission),
            );
        }
    }

    EmailMessage {
        to: recipient.to_string(),
        subject: format!("Daily sales report - {}", summary.date),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use salesdesk_core::SellerId;

    fn line(count: u64, amount_cents: i64, commission_cents: i64) -> SellerDailyLine {
        SellerDailyLine {
            seller_id: SellerId::new(),
            seller_name: "Maria".to_string(),
            seller_email: "maria@example.com".to_string(),
            sales_count: count,
            total_amount: Decimal::new(amount_cents, 2),
            total_commission: Decimal::new(commission_cents, 2),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn seller_report_carries_the_figures() {
        let msg = seller_commission_report(&line(2, 150_000, 12_750), date());

        assert_eq!(msg.to, "maria@example.com");
        assert_eq!(msg.subject, "Daily commission report - 2024-01-15");
        assert!(msg.body.contains("Hello Maria,"));
        assert!(msg.body.contains("Sales recorded:    2"));
        assert!(msg.body.contains("1500.00"));
        assert!(msg.body.contains("127.50"));
    }

    #[test]
    fn seller_report_renders_zeroed_days() {
        let msg = seller_commission_report(&line(0, 0, 0), date());
        assert!(msg.body.contains("Sales recorded:    0"));
        assert!(msg.body.contains("0.00"));
    }

    #[test]
    fn admin_report_lists_each_seller() {
        let summary = DailySummary {
            date: date(),
            total_amount: Decimal::new(150_000, 2),
            total_commission: Decimal::new(12_750, 2),
            sales_count: 3,
            sellers: vec![line(3, 150_000, 12_750)],
        };

        let msg = admin_daily_report(&summary, "boss@example.com");
        assert_eq!(msg.to, "boss@example.com");
        assert_eq!(msg.subject, "Daily sales report - 2024-01-15");
        assert!(msg.body.contains("Maria <maria@example.com>"));
        assert!(msg.body.contains("3 sale(s)"));
    }

    #[test]
    fn admin_report_tolerates_an_empty_day() {
        let summary = DailySummary {
            date: date(),
            total_amount: Decimal::ZERO,
            total_commission: Decimal::ZERO,
            sales_count: 0,
            sellers: Vec::new(),
        };

        let msg = admin_daily_report(&summary, "boss@example.com");
        assert!(msg.body.contains("No sales were recorded for this date."));
    }
}
