//! Caritas Core - Campaign lifecycle and contribution ledger.
//!
//! This crate contains the fundraising business logic of the Caritas back
//! office. It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod campaigns;
pub mod constants;
pub mod contributions;
pub mod donors;
pub mod errors;
pub mod statistics;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
