//! SQLite storage implementation for Caritas campaigns.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `caritas-core` and contains:
//! - Database connection pooling and the single writer
//! - Diesel migrations
//! - Repository implementations for campaigns, the contribution ledger and donors
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The core crate is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!             │
//!             ▼
//!   storage-sqlite (this crate)
//!             │
//!             ▼
//!         SQLite DB
//! ```
//!
//! Every mutation goes through [`WriteHandle`], which runs one job at a time in
//! an immediate transaction. Status guards and ledger appends re-read the
//! campaign status inside that transaction.

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod campaigns;
pub mod contributions;
pub mod donors;

#[cfg(test)]
mod test_support;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use campaigns::CampaignRepository;
pub use contributions::ContributionRepository;
pub use donors::DonorRepository;

// Re-export from caritas-core for convenience
pub use caritas_core::errors::{DatabaseError, Error, Result};
