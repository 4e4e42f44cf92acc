//! Seller and sale persistence.
//!
//! The domain crates validate; this layer persists. Two implementations
//! share the same traits: [`InMemoryStore`] for dev/test wiring and
//! [`PostgresStore`] for real deployments, selected at startup.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use salesdesk_core::{SaleId, SellerId};
use salesdesk_sales::{Sale, SaleFilter};
use salesdesk_sellers::Seller;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("not found")]
    NotFound,

    /// A seller with the same email is already registered.
    #[error("email already registered")]
    DuplicateEmail,

    /// The seller still owns sales; deletion is restricted.
    #[error("seller still owns sales")]
    SellerHasSales,

    /// A sale referenced a seller that is not registered.
    #[error("seller does not exist")]
    UnknownSeller,

    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// All-time per-seller sale totals, attached to registry listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellerTotals {
    pub seller_id: SellerId,
    pub sales_count: u64,
    pub commission_sum: Decimal,
}

/// Persistence for the seller registry.
#[async_trait]
pub trait SellerStore: Send + Sync {
    /// Persist a new seller. Fails with [`StoreError::DuplicateEmail`] if
    /// the email is already registered (compared case-insensitively).
    async fn insert_seller(&self, seller: Seller) -> Result<(), StoreError>;

    async fn seller(&self, id: SellerId) -> Result<Option<Seller>, StoreError>;

    /// Overwrite an existing seller. Same uniqueness rule as insert.
    async fn update_seller(&self, seller: Seller) -> Result<(), StoreError>;

    /// Hard-delete a seller. Restricted: fails with
    /// [`StoreError::SellerHasSales`] while the seller still owns sales.
    async fn delete_seller(&self, id: SellerId) -> Result<(), StoreError>;

    /// Sellers whose name or email starts with `query` (case-insensitive),
    /// ordered by name then id. `None` lists the whole registry.
    async fn search_sellers(&self, query: Option<&str>) -> Result<Vec<Seller>, StoreError>;

    async fn seller_count(&self) -> Result<u64, StoreError>;
}

/// Persistence for the sale ledger.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Persist a new sale. Fails with [`StoreError::UnknownSeller`] if the
    /// owning seller is not registered.
    async fn insert_sale(&self, sale: Sale) -> Result<(), StoreError>;

    async fn sale(&self, id: SaleId) -> Result<Option<Sale>, StoreError>;

    /// Overwrite an existing sale. Same referential rule as insert.
    async fn update_sale(&self, sale: Sale) -> Result<(), StoreError>;

    async fn delete_sale(&self, id: SaleId) -> Result<(), StoreError>;

    /// Sales matching `filter`, in listing order (sale date descending,
    /// creation descending, id descending).
    async fn list_sales(&self, filter: &SaleFilter) -> Result<Vec<Sale>, StoreError>;

    /// All-time count and commission sum per seller with at least one sale.
    async fn seller_totals(&self) -> Result<Vec<SellerTotals>, StoreError>;

    /// Most recent sale date recorded for a seller, if any.
    async fn latest_sale_date(&self, seller_id: SellerId)
        -> Result<Option<NaiveDate>, StoreError>;
}

/// Everything the API and the report dispatcher need from persistence.
pub trait Store: SellerStore + SaleStore {}

impl<T: SellerStore + SaleStore> Store for T {}
