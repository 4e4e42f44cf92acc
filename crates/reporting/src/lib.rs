//! `salesdesk-reporting` — the aggregation engine.
//!
//! Pure, side-effect-free summaries over persisted sales. Totals sum the
//! stored amount/commission fields; nothing here re-derives commission from
//! the rate, so a summary always reflects the ledger as committed.

pub mod daily;
pub mod dashboard;

pub use daily::{daily_summary, seller_daily_line, DailySummary, SellerDailyLine};
pub use dashboard::{dashboard_stats, month_window, DashboardStats, MonthStats, RECENT_SALES_LIMIT};
