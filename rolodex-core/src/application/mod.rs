//! Application services composed from the persistence ports.

pub mod bootstrap;
pub mod unit_of_work;

pub use unit_of_work::AppUnitOfWork;
