//! Persistence ports and the adapters behind them.
//!
//! Ports live in [`ports`]; [`infrastructure`] holds one adapter per
//! storage engine. [`DatabaseContext`] picks the adapter from the database
//! URL and hands back an [`AppUnitOfWork`](crate::application::unit_of_work::AppUnitOfWork).

pub mod context;
pub mod infrastructure;
pub mod ports;

pub use context::{DatabaseContext, DatabasePool};
