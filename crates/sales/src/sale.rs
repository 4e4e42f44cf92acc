use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use salesdesk_core::{money::round_money, DomainError, DomainResult, SaleId, SellerId};

use crate::commission::commission_for;

/// A recorded sale, attributed to exactly one seller.
///
/// Invariant: `commission == commission_for(amount)` after every create and
/// every amount change. The ledger enforces this explicitly; callers never
/// supply an authoritative commission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub seller_id: SellerId,
    pub amount: Decimal,
    pub commission: Decimal,
    pub sale_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for recording a sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    seller_id: SellerId,
    amount: Decimal,
    sale_date: NaiveDate,
}

impl NewSale {
    /// Validate sale input against the business date.
    ///
    /// `today` is the business date derived from the configured time zone,
    /// fixed at startup. Whether `seller_id` references a registered seller
    /// is the store's job.
    pub fn new(
        seller_id: SellerId,
        amount: Decimal,
        sale_date: NaiveDate,
        today: NaiveDate,
    ) -> DomainResult<Self> {
        Ok(Self {
            seller_id,
            amount: validate_amount(amount)?,
            sale_date: validate_sale_date(sale_date, today)?,
        })
    }

    pub fn seller_id(&self) -> SellerId {
        self.seller_id
    }

    /// Materialize the sale. Commission is always derived here, regardless
    /// of anything the caller supplied on the wire.
    pub fn into_sale(self, now: DateTime<Utc>) -> Sale {
        let commission = commission_for(self.amount);
        Sale {
            id: SaleId::new(),
            seller_id: self.seller_id,
            amount: self.amount,
            commission,
            sale_date: self.sale_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a sale. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalePatch {
    pub seller_id: Option<SellerId>,
    pub amount: Option<Decimal>,
    pub sale_date: Option<NaiveDate>,
}

impl SalePatch {
    pub fn is_empty(&self) -> bool {
        self.seller_id.is_none() && self.amount.is_none() && self.sale_date.is_none()
    }

    /// Validate supplied fields and apply them.
    ///
    /// Commission is recomputed iff the patch carries an amount; otherwise
    /// the persisted commission is left untouched, even if stale relative to
    /// the current rate.
    pub fn apply(self, sale: &mut Sale, today: NaiveDate, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(seller_id) = self.seller_id {
            sale.seller_id = seller_id;
        }
        if let Some(amount) = self.amount {
            sale.amount = validate_amount(amount)?;
            sale.commission = commission_for(sale.amount);
        }
        if let Some(sale_date) = self.sale_date {
            sale.sale_date = validate_sale_date(sale_date, today)?;
        }
        sale.updated_at = now;
        Ok(())
    }
}

fn validate_amount(amount: Decimal) -> DomainResult<Decimal> {
    let amount = round_money(amount);
    if amount <= Decimal::ZERO {
        return Err(DomainError::validation(
            "amount",
            "amount must be greater than zero",
        ));
    }
    Ok(amount)
}

fn validate_sale_date(sale_date: NaiveDate, today: NaiveDate) -> DomainResult<NaiveDate> {
    if sale_date > today {
        return Err(DomainError::validation(
            "sale_date",
            "sale date must be today or earlier",
        ));
    }
    Ok(sale_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn recorded(amount_cents: i64, today: NaiveDate) -> Sale {
        NewSale::new(SellerId::new(), money(amount_cents), today, today)
            .unwrap()
            .into_sale(Utc::now())
    }

    #[test]
    fn create_derives_commission_from_amount() {
        let today = date(2024, 1, 15);
        let sale = recorded(100_000, today);
        assert_eq!(sale.commission, money(8_500));

        let sale = recorded(150_000, today);
        assert_eq!(sale.commission, money(12_750));
    }

    #[test]
    fn create_rejects_non_positive_amounts() {
        let today = date(2024, 1, 15);
        for cents in [0, -10_000] {
            let err = NewSale::new(SellerId::new(), money(cents), today, today).unwrap_err();
            assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "amount"));
        }
    }

    #[test]
    fn amount_rounding_to_zero_is_rejected() {
        let today = date(2024, 1, 15);
        // 0.004 rounds to 0.00
        let err = NewSale::new(SellerId::new(), Decimal::new(4, 3), today, today).unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "amount"));
    }

    #[test]
    fn create_accepts_today_and_rejects_tomorrow() {
        let today = date(2024, 1, 15);
        assert!(NewSale::new(SellerId::new(), money(100), today, today).is_ok());

        let err =
            NewSale::new(SellerId::new(), money(100), date(2024, 1, 16), today).unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "sale_date"));
    }

    #[test]
    fn amount_update_recomputes_commission() {
        let today = date(2024, 1, 15);
        let mut sale = recorded(100_000, today);
        assert_eq!(sale.commission, money(8_500));

        let patch = SalePatch {
            amount: Some(money(150_000)),
            ..Default::default()
        };
        patch.apply(&mut sale, today, Utc::now()).unwrap();

        assert_eq!(sale.amount, money(150_000));
        assert_eq!(sale.commission, money(12_750));
    }

    #[test]
    fn non_amount_update_leaves_commission_untouched() {
        let today = date(2024, 1, 15);
        let mut sale = recorded(100_000, today);
        // Simulate a historically stale commission.
        sale.commission = money(9_999);

        let patch = SalePatch {
            sale_date: Some(date(2024, 1, 10)),
            ..Default::default()
        };
        patch.apply(&mut sale, today, Utc::now()).unwrap();

        assert_eq!(sale.sale_date, date(2024, 1, 10));
        assert_eq!(sale.commission, money(9_999));
    }

    #[test]
    fn update_rejects_future_date_and_bad_amount() {
        let today = date(2024, 1, 15);
        let mut sale = recorded(100_000, today);

        let patch = SalePatch {
            sale_date: Some(date(2024, 1, 16)),
            ..Default::default()
        };
        assert!(patch.apply(&mut sale.clone(), today, Utc::now()).is_err());

        let patch = SalePatch {
            amount: Some(Decimal::ZERO),
            ..Default::default()
        };
        assert!(patch.apply(&mut sale, today, Utc::now()).is_err());
    }
}
