use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use salesdesk_core::SellerId;

use crate::sale::Sale;

/// Optional, AND-combined listing filters. Date and amount bounds are
/// inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleFilter {
    pub seller_id: Option<SellerId>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub amount_min: Option<Decimal>,
    pub amount_max: Option<Decimal>,
}

impl SaleFilter {
    pub fn for_seller(seller_id: SellerId) -> Self {
        Self {
            seller_id: Some(seller_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, sale: &Sale) -> bool {
        if let Some(seller_id) = self.seller_id {
            if sale.seller_id != seller_id {
                return false;
            }
        }
        if let Some(from) = self.date_from {
            if sale.sale_date < from {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if sale.sale_date > to {
                return false;
            }
        }
        if let Some(min) = self.amount_min {
            if sale.amount < min {
                return false;
            }
        }
        if let Some(max) = self.amount_max {
            if sale.amount > max {
                return false;
            }
        }
        true
    }
}

/// Listing order: sale date descending, ties broken by creation instant and
/// then id (UUIDv7, time-ordered), both descending. Deterministic across
/// pages by construction.
pub fn listing_order(a: &Sale, b: &Sale) -> Ordering {
    b.sale_date
        .cmp(&a.sale_date)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}
