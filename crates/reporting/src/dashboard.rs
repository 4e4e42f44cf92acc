use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;

use salesdesk_sales::{filter::listing_order, Sale};

/// How many sales the dashboard shows in its recent-activity panel.
pub const RECENT_SALES_LIMIT: usize = 20;

/// Figures for one calendar-month window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MonthStats {
    /// Distinct sellers with at least one sale in the window, not all
    /// registered sellers.
    pub sellers: u64,
    pub sales: u64,
    pub revenue: Decimal,
    pub commission: Decimal,
}

/// The dashboard aggregate: all-time totals, recent activity, and the
/// current/previous calendar-month windows relative to the business date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_sellers: u64,
    pub total_sales: u64,
    pub total_revenue: Decimal,
    pub total_commission: Decimal,
    pub recent_sales: Vec<Sale>,
    pub current_month: MonthStats,
    pub previous_month: MonthStats,
}

/// Inclusive first/last day of the month containing `day`.
pub fn month_window(day: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = day.with_day(1).expect("day 1 exists in every month");
    let next_month_first = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .expect("first day of next month exists");
    (first, next_month_first - Duration::days(1))
}

fn month_stats(window: (NaiveDate, NaiveDate), sales: &[Sale]) -> MonthStats {
    let (from, to) = window;
    let mut stats = MonthStats::default();
    let mut sellers = HashSet::new();

    for sale in sales
        .iter()
        .filter(|s| s.sale_date >= from && s.sale_date <= to)
    {
        sellers.insert(sale.seller_id);
        stats.sales += 1;
        stats.revenue += sale.amount;
        stats.commission += sale.commission;
    }

    stats.sellers = sellers.len() as u64;
    stats
}

/// Compute the dashboard aggregate. Pure and idempotent; `total_sellers` is
/// the registry head-count supplied by the caller.
pub fn dashboard_stats(today: NaiveDate, total_sellers: u64, sales: &[Sale]) -> DashboardStats {
    let mut total_revenue = Decimal::ZERO;
    let mut total_commission = Decimal::ZERO;
    for sale in sales {
        total_revenue += sale.amount;
        total_commission += sale.commission;
    }

    let mut recent: Vec<Sale> = sales.to_vec();
    recent.sort_by(listing_order);
    recent.truncate(RECENT_SALES_LIMIT);

    let current_window = month_window(today);
    let previous_window = month_window(current_window.0 - Duration::days(1));

    DashboardStats {
        total_sellers,
        total_sales: sales.len() as u64,
        total_revenue,
        total_commission,
        recent_sales: recent,
        current_month: month_stats(current_window, sales),
        previous_month: month_stats(previous_window, sales),
    }
}
