//! Read access to the donor registry table.

mod repository;

pub use repository::{DonorDB, DonorRepository};
