//! In-memory store for dev and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use salesdesk_core::{SaleId, SellerId};
use salesdesk_sales::{filter::listing_order, Sale, SaleFilter};
use salesdesk_sellers::Seller;

use super::{SaleStore, SellerStore, SellerTotals, StoreError};

/// Registry and ledger in two maps behind one lock. Each operation takes
/// the lock once, so every create/update/delete is a single atomic section
/// (the in-memory analogue of a single-row transaction).
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    sellers: HashMap<SellerId, Seller>,
    sales: HashMap<SaleId, Sale>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(state: &State, email: &str, except: Option<SellerId>) -> bool {
    state
        .sellers
        .values()
        .any(|s| Some(s.id) != except && s.email.eq_ignore_ascii_case(email))
}

#[async_trait]
impl SellerStore for InMemoryStore {
    async fn insert_seller(&self, seller: Seller) -> Result<(), StoreError> {
        let mut state = self.inner.write().unwrap();
        if email_taken(&state, &seller.email, None) {
            return Err(StoreError::DuplicateEmail);
        }
        state.sellers.insert(seller.id, seller);
        Ok(())
    }

    async fn seller(&self, id: SellerId) -> Result<Option<Seller>, StoreError> {
        Ok(self.inner.read().unwrap().sellers.get(&id).cloned())
    }

    async fn update_seller(&self, seller: Seller) -> Result<(), StoreError> {
        let mut state = self.inner.write().unwrap();
        if !state.sellers.contains_key(&seller.id) {
            return Err(StoreError::NotFound);
        }
        if email_taken(&state, &seller.email, Some(seller.id)) {
            return Err(StoreError::DuplicateEmail);
        }
        state.sellers.insert(seller.id, seller);
        Ok(())
    }

    async fn delete_seller(&self, id: SellerId) -> Result<(), StoreError> {
        let mut state = self.inner.write().unwrap();
        if !state.sellers.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if state.sales.values().any(|s| s.seller_id == id) {
            return Err(StoreError::SellerHasSales);
        }
        state.sellers.remove(&id);
        Ok(())
    }

    async fn search_sellers(&self, query: Option<&str>) -> Result<Vec<Seller>, StoreError> {
        let state = self.inner.read().unwrap();
        let needle = query.map(str::to_lowercase);
        let mut sellers: Vec<Seller> = state
            .sellers
            .values()
            .filter(|s| match &needle {
                Some(q) => {
                    s.name.to_lowercase().starts_with(q)
                        || s.email.to_lowercase().starts_with(q)
                }
                None => true,
            })
            .cloned()
            .collect();
        sellers.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(sellers)
    }

    async fn seller_count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().unwrap().sellers.len() as u64)
    }
}

#[async_trait]
impl SaleStore for InMemoryStore {
    async fn insert_sale(&self, sale: Sale) -> Result<(), StoreError> {
        let mut state = self.inner.write().unwrap();
        if !state.sellers.contains_key(&sale.seller_id) {
            return Err(StoreError::UnknownSeller);
        }
        state.sales.insert(sale.id, sale);
        Ok(())
    }

    async fn sale(&self, id: SaleId) -> Result<Option<Sale>, StoreError> {
        Ok(self.inner.read().unwrap().sales.get(&id).cloned())
    }

    async fn update_sale(&self, sale: Sale) -> Result<(), StoreError> {
        let mut state = self.inner.write().unwrap();
        if !state.sales.contains_key(&sale.id) {
            return Err(StoreError::NotFound);
        }
        if !state.sellers.contains_key(&sale.seller_id) {
            return Err(StoreError::UnknownSeller);
        }
        state.sales.insert(sale.id, sale);
        Ok(())
    }

    async fn delete_sale(&self, id: SaleId) -> Result<(), StoreError> {
        let mut state = self.inner.write().unwrap();
        if state.sales.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_sales(&self, filter: &SaleFilter) -> Result<Vec<Sale>, StoreError> {
        let state = self.inner.read().unwrap();
        let mut sales: Vec<Sale> = state
            .sales
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        sales.sort_by(listing_order);
        Ok(sales)
    }

    async fn seller_totals(&self) -> Result<Vec<SellerTotals>, StoreError> {
        let state = self.inner.read().unwrap();
        let mut totals: HashMap<SellerId, (u64, Decimal)> = HashMap::new();
        for sale in state.sales.values() {
            let entry = totals.entry(sale.seller_id).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += sale.commission;
        }
        let mut totals: Vec<SellerTotals> = totals
            .into_iter()
            .map(|(seller_id, (sales_count, commission_sum))| SellerTotals {
                seller_id,
                sales_count,
                commission_sum,
            })
            .collect();
        totals.sort_by_key(|t| t.seller_id);
        Ok(totals)
    }

    async fn latest_sale_date(
        &self,
        seller_id: SellerId,
    ) -> Result<Option<NaiveDate>, StoreError> {
        let state = self.inner.read().unwrap();
        Ok(state
            .sales
            .values()
            .filter(|s| s.seller_id == seller_id)
            .map(|s| s.sale_date)
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use salesdesk_sales::NewSale;
    use salesdesk_sellers::NewSeller;

    fn seller(name: &str, email: &str) -> Seller {
        NewSeller::new(name, email).unwrap().into_seller(Utc::now())
    }

    fn sale(seller_id: SellerId, day: NaiveDate, amount_cents: i64) -> Sale {
        NewSale::new(seller_id, Decimal::new(amount_cents, 2), day, day)
            .unwrap()
            .into_sale(Utc::now())
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let store = InMemoryStore::new();
        store
            .insert_seller(seller("Maria", "maria@example.com"))
            .await
            .unwrap();

        let err = store
            .insert_seller(seller("Other", "MARIA@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn update_may_keep_own_email_but_not_take_anothers() {
        let store = InMemoryStore::new();
        let mut a = seller("Ana", "ana@example.com");
        let b = seller("Bruno", "bruno@example.com");
        store.insert_seller(a.clone()).await.unwrap();
        store.insert_seller(b.clone()).await.unwrap();

        a.name = "Ana Paula".to_string();
        store.update_seller(a.clone()).await.unwrap();

        a.email = "bruno@example.com".to_string();
        assert!(matches!(
            store.update_seller(a).await,
            Err(StoreError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn deleting_a_seller_with_sales_is_restricted() {
        let store = InMemoryStore::new();
        let s = seller("Maria", "maria@example.com");
        store.insert_seller(s.clone()).await.unwrap();
        let recorded = sale(s.id, date(10), 100_00);
        store.insert_sale(recorded.clone()).await.unwrap();

        assert!(matches!(
            store.delete_seller(s.id).await,
            Err(StoreError::SellerHasSales)
        ));

        store.delete_sale(recorded.id).await.unwrap();
        store.delete_seller(s.id).await.unwrap();
        assert!(store.seller(s.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sale_insert_requires_a_registered_seller() {
        let store = InMemoryStore::new();
        let err = store
            .insert_sale(sale(SellerId::new(), date(10), 100_00))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownSeller));
    }

    #[tokio::test]
    async fn listing_applies_filters_and_order() {
        let store = InMemoryStore::new();
        let s = seller("Maria", "maria@example.com");
        store.insert_seller(s.clone()).await.unwrap();
        for d in [10, 20, 15] {
            store.insert_sale(sale(s.id, date(d), 100_00)).await.unwrap();
        }

        let all = store.list_sales(&SaleFilter::default()).await.unwrap();
        let dates: Vec<NaiveDate> = all.iter().map(|s| s.sale_date).collect();
        assert_eq!(dates, vec![date(20), date(15), date(10)]);

        let filter = SaleFilter {
            date_from: Some(date(15)),
            ..Default::default()
        };
        assert_eq!(store.list_sales(&filter).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn search_matches_name_or_email_prefix() {
        let store = InMemoryStore::new();
        store
            .insert_seller(seller("Maria", "maria@example.com"))
            .await
            .unwrap();
        store
            .insert_seller(seller("Bruno", "bruno@example.com"))
            .await
            .unwrap();

        let hits = store.search_sellers(Some("mar")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Maria");

        let hits = store.search_sellers(Some("bruno@")).await.unwrap();
        assert_eq!(hits.len(), 1);

        assert_eq!(store.search_sellers(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn totals_and_latest_date_track_the_ledger() {
        let store = InMemoryStore::new();
        let s = seller("Maria", "maria@example.com");
        store.insert_seller(s.clone()).await.unwrap();
        store.insert_sale(sale(s.id, date(10), 100_000)).await.unwrap();
        store.insert_sale(sale(s.id, date(12), 50_000)).await.unwrap();

        let totals = store.seller_totals().await.unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].sales_count, 2);
        assert_eq!(totals[0].commission_sum, Decimal::new(12_750, 2));

        assert_eq!(
            store.latest_sale_date(s.id).await.unwrap(),
            Some(date(12))
        );
        assert_eq!(store.latest_sale_date(SellerId::new()).await.unwrap(), None);
    }
}
