//! SQLite storage implementation for the contribution ledger.

mod model;
mod repository;

pub use model::ContributionDB;
pub use repository::ContributionRepository;
