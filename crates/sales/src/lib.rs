//! `salesdesk-sales` — the sale ledger domain.
//!
//! Holds the `Sale` entity, the commission rule, and the listing filter
//! model. Persistence and referential checks against the seller registry
//! live behind the store traits in `salesdesk-infra`.

pub mod commission;
pub mod filter;
pub mod sale;

pub use commission::{commission_for, commission_rate};
pub use filter::SaleFilter;
pub use sale::{NewSale, Sale, SalePatch};
