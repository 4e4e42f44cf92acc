use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use salesdesk_auth::UserAccount;
use salesdesk_core::money::format_money;
use salesdesk_core::Page;
use salesdesk_infra::store::SellerTotals;
use salesdesk_reporting::{DailySummary, DashboardStats, MonthStats, SellerDailyLine};
use salesdesk_sales::Sale;
use salesdesk_sellers::Seller;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to the seller role when absent.
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSellerRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSellerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Create payload. A `commission` field is tolerated for wire compatibility
/// but never honored; the ledger always derives commission from the amount.
#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub seller_id: String,
    pub amount: MoneyInput,
    pub sale_date: NaiveDate,
    pub commission: Option<MoneyInput>,
}

/// Update payload. Commission is recomputed iff `amount` is present; a
/// caller-supplied `commission` is ignored either way.
#[derive(Debug, Deserialize)]
pub struct UpdateSaleRequest {
    pub seller_id: Option<String>,
    pub amount: Option<MoneyInput>,
    pub sale_date: Option<NaiveDate>,
    pub commission: Option<MoneyInput>,
}

#[derive(Debug, Deserialize)]
pub struct SellerListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SellerSalesQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SaleListQuery {
    pub seller_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub amount_min: Option<Decimal>,
    pub amount_max: Option<Decimal>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

/// Monetary input: accepts a JSON number or a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MoneyInput {
    Number(f64),
    Text(String),
}

impl MoneyInput {
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            MoneyInput::Number(v) => Decimal::from_f64(*v),
            MoneyInput::Text(s) => s.trim().parse().ok(),
        }
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn user_to_json(account: &UserAccount) -> serde_json::Value {
    json!({
        "id": account.id.to_string(),
        "name": account.name,
        "email": account.email,
        "role": account.role.as_str(),
    })
}

pub fn seller_to_json(seller: &Seller, totals: Option<&SellerTotals>) -> serde_json::Value {
    json!({
        "id": seller.id.to_string(),
        "name": seller.name,
        "email": seller.email,
        "sales_count": totals.map_or(0, |t| t.sales_count),
        "sales_sum_commission": format_money(totals.map_or(Decimal::ZERO, |t| t.commission_sum)),
        "created_at": seller.created_at.to_rfc3339(),
        "updated_at": seller.updated_at.to_rfc3339(),
    })
}

pub fn sale_to_json(sale: &Sale) -> serde_json::Value {
    json!({
        "id": sale.id.to_string(),
        "seller_id": sale.seller_id.to_string(),
        "amount": format_money(sale.amount),
        "commission": format_money(sale.commission),
        "sale_date": sale.sale_date.to_string(),
        "created_at": sale.created_at.to_rfc3339(),
        "updated_at": sale.updated_at.to_rfc3339(),
    })
}

pub fn page_to_json<T>(page: Page<T>, f: impl Fn(&T) -> serde_json::Value) -> serde_json::Value {
    json!({
        "data": page.items.iter().map(&f).collect::<Vec<_>>(),
        "meta": {
            "page": page.page,
            "per_page": page.per_page,
            "total": page.total,
            "last_page": page.last_page,
        }
    })
}

fn seller_line_to_json(line: &SellerDailyLine) -> serde_json::Value {
    json!({
        "seller_id": line.seller_id.to_string(),
        "name": line.seller_name,
        "email": line.seller_email,
        "sales_count": line.sales_count,
        "total_amount": format_money(line.total_amount),
        "total_commission": format_money(line.total_commission),
    })
}

pub fn daily_summary_to_json(summary: &DailySummary) -> serde_json::Value {
    json!({
        "date": summary.date.to_string(),
        "total_amount": format_money(summary.total_amount),
        "total_commission": format_money(summary.total_commission),
        "sales_count": summary.sales_count,
        "sellers": summary.sellers.iter().map(seller_line_to_json).collect::<Vec<_>>(),
    })
}

fn month_to_json(stats: &MonthStats) -> serde_json::Value {
    json!({
        "sellers": stats.sellers,
        "sales": stats.sales,
        "revenue": format_money(stats.revenue),
        "commission": format_money(stats.commission),
    })
}

pub fn dashboard_to_json(stats: &DashboardStats) -> serde_json::Value {
    json!({
        "total_sellers": stats.total_sellers,
        "total_sales": stats.total_sales,
        "total_revenue": format_money(stats.total_revenue),
        "total_commission": format_money(stats.total_commission),
        "recent_sales": stats.recent_sales.iter().map(sale_to_json).collect::<Vec<_>>(),
        "current_month": month_to_json(&stats.current_month),
        "previous_month": month_to_json(&stats.previous_month),
    })
}
