//! `salesdesk-sellers` — the seller registry domain.

pub mod seller;

pub use seller::{NewSeller, Seller, SellerPatch};
