//! `salesdesk-infra` — storage, job queue, mail transport, and the report
//! dispatcher.
//!
//! Domain crates stay pure; everything that touches IO or shared mutable
//! state lives here, behind traits with in-memory twins for dev/test.

pub mod credentials;
pub mod dispatch;
pub mod jobs;
pub mod mail;
pub mod store;

pub use dispatch::{DispatchError, ReportDispatcher};
pub use store::{InMemoryStore, SaleStore, SellerStore, Store, StoreError};
