use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use salesdesk_core::SellerId;
use salesdesk_sales::Sale;
use salesdesk_sellers::Seller;

/// Per-seller figures within one day's summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerDailyLine {
    pub seller_id: SellerId,
    pub seller_name: String,
    pub seller_email: String,
    pub sales_count: u64,
    pub total_amount: Decimal,
    pub total_commission: Decimal,
}

/// Aggregate over all sales of one calendar date.
///
/// Per-seller lines are ordered by seller id ascending; that order is part
/// of the contract, not an artifact of storage iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_amount: Decimal,
    pub total_commission: Decimal,
    pub sales_count: u64,
    pub sellers: Vec<SellerDailyLine>,
}

/// Summarize one calendar date.
///
/// Sales dated on any other day are ignored, whatever the caller passes in.
/// Idempotent: same inputs, same summary.
pub fn daily_summary(date: NaiveDate, sales: &[Sale], sellers: &[Seller]) -> DailySummary {
    let by_id: HashMap<SellerId, &Seller> = sellers.iter().map(|s| (s.id, s)).collect();

    let mut total_amount = Decimal::ZERO;
    let mut total_commission = Decimal::ZERO;
    let mut sales_count = 0u64;

    // BTreeMap keys the contract order (seller id ascending).
    let mut grouped: BTreeMap<SellerId, (u64, Decimal, Decimal)> = BTreeMap::new();

    for sale in sales.iter().filter(|s| s.sale_date == date) {
        total_amount += sale.amount;
        total_commission += sale.commission;
        sales_count += 1;

        let entry = grouped
            .entry(sale.seller_id)
            .or_insert((0, Decimal::ZERO, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += sale.amount;
        entry.2 += sale.commission;
    }

    let sellers = grouped
        .into_iter()
        .map(|(seller_id, (count, amount, commission))| {
            let (name, email) = by_id
                .get(&seller_id)
                .map(|s| (s.name.clone(), s.email.clone()))
                .unwrap_or_else(|| ("(unknown)".to_string(), String::new()));
            SellerDailyLine {
                seller_id,
                seller_name: name,
                seller_email: email,
                sales_count: count,
                total_amount: amount,
                total_commission: commission,
            }
        })
        .collect();

    DailySummary {
        date,
        total_amount,
        total_commission,
        sales_count,
        sellers,
    }
}

/// One seller's figures for one date.
///
/// A date with no sales yields a zeroed line rather than an error, so
/// commission reports can always be sent.
pub fn seller_daily_line(seller: &Seller, date: NaiveDate, sales: &[Sale]) -> SellerDailyLine {
    let mut line = SellerDailyLine {
        seller_id: seller.id,
        seller_name: seller.name.clone(),
        seller_email: seller.email.clone(),
        sales_count: 0,
        total_amount: Decimal::ZERO,
        total_commission: Decimal::ZERO,
    };

    for sale in sales
        .iter()
        .filter(|s| s.seller_id == seller.id && s.sale_date == date)
    {
        line.sales_count += 1;
        line.total_amount += sale.amount;
        line.total_commission += sale.commission;
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use salesdesk_core::SaleId;
    use salesdesk_sellers::NewSeller;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn seller(name: &str, email: &str) -> Seller {
        NewSeller::new(name, email).unwrap().into_seller(Utc::now())
    }

    fn sale(seller_id: SellerId, day: NaiveDate, amount_cents: i64, commission_cents: i64) -> Sale {
        Sale {
            id: SaleId::new(),
            seller_id,
            amount: money(amount_cents),
            commission: money(commission_cents),
            sale_date: day,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn sums_persisted_amounts_and_commissions() {
        let s = seller("Maria", "maria@example.com");
        let day = date(15);
        let sales = vec![
            sale(s.id, day, 100_000, 8_500),
            sale(s.id, day, 50_000, 4_250),
        ];

        let summary = daily_summary(day, &sales, std::slice::from_ref(&s));
        assert_eq!(summary.total_amount, money(150_000));
        assert_eq!(summary.total_commission, money(12_750));
        assert_eq!(summary.sales_count, 2);
        assert_eq!(summary.sellers.len(), 1);
        assert_eq!(summary.sellers[0].seller_name, "Maria");
        assert_eq!(summary.sellers[0].sales_count, 2);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let s = seller("Maria", "maria@example.com");
        let day = date(15);
        let sales = vec![
            sale(s.id, day, 100_000, 8_500),
            sale(s.id, day, 50_000, 4_250),
        ];

        let first = daily_summary(day, &sales, std::slice::from_ref(&s));
        let second = daily_summary(day, &sales, std::slice::from_ref(&s));
        assert_eq!(first, second);
    }

    #[test]
    fn other_dates_never_leak_into_a_summary() {
        let s = seller("Maria", "maria@example.com");
        let sales = vec![
            sale(s.id, date(14), 100_000, 8_500),
            sale(s.id, date(15), 50_000, 4_250),
            sale(s.id, date(16), 20_000, 1_700),
        ];

        let summary = daily_summary(date(15), &sales, std::slice::from_ref(&s));
        assert_eq!(summary.sales_count, 1);
        assert_eq!(summary.total_amount, money(50_000));
    }

    #[test]
    fn sums_stale_commissions_as_stored() {
        // The engine must not re-derive from the rate.
        let s = seller("Maria", "maria@example.com");
        let day = date(15);
        let sales = vec![sale(s.id, day, 100_000, 1)]; // deliberately not 8.5%

        let summary = daily_summary(day, &sales, std::slice::from_ref(&s));
        assert_eq!(summary.total_commission, money(1));
    }

    #[test]
    fn groups_by_seller_sorted_by_id() {
        let a = seller("Ana", "ana@example.com");
        let b = seller("Bruno", "bruno@example.com");
        let day = date(15);
        let sales = vec![
            sale(b.id, day, 30_000, 2_550),
            sale(a.id, day, 10_000, 850),
            sale(b.id, day, 20_000, 1_700),
        ];

        let summary = daily_summary(day, &sales, &[a.clone(), b.clone()]);
        assert_eq!(summary.sellers.len(), 2);
        assert!(summary.sellers[0].seller_id < summary.sellers[1].seller_id);

        let bruno = summary
            .sellers
            .iter()
            .find(|l| l.seller_id == b.id)
            .unwrap();
        assert_eq!(bruno.sales_count, 2);
        assert_eq!(bruno.total_amount, money(50_000));
    }

    #[test]
    fn empty_day_produces_zeroed_summary() {
        let s = seller("Maria", "maria@example.com");
        let summary = daily_summary(date(15), &[], std::slice::from_ref(&s));
        assert_eq!(summary.sales_count, 0);
        assert_eq!(summary.total_amount, Decimal::ZERO);
        assert_eq!(summary.total_commission, Decimal::ZERO);
        assert!(summary.sellers.is_empty());
    }

    #[test]
    fn seller_line_is_zeroed_for_a_quiet_day() {
        let s = seller("Maria", "maria@example.com");
        let sales = vec![sale(s.id, date(14), 100_000, 8_500)];

        let line = seller_daily_line(&s, date(15), &sales);
        assert_eq!(line.sales_count, 0);
        assert_eq!(line.total_amount, Decimal::ZERO);
        assert_eq!(line.total_commission, Decimal::ZERO);
        assert_eq!(line.seller_email, "maria@example.com");
    }

    #[test]
    fn seller_line_ignores_other_sellers() {
        let a = seller("Ana", "ana@example.com");
        let b = seller("Bruno", "bruno@example.com");
        let day = date(15);
        let sales = vec![
            sale(a.id, day, 100_000, 8_500),
            sale(b.id, day, 50_000, 4_250),
        ];

        let line = seller_daily_line(&a, day, &sales);
        assert_eq!(line.sales_count, 1);
        assert_eq!(line.total_amount, money(100_000));
    }
}
