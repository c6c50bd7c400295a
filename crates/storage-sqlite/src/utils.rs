//! Utility functions for SQLite storage operations.
//!
//! This module provides helpers for working with SQLite, including chunking
//! utilities to avoid parameter limits and parsing of TEXT-encoded columns.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::StorageError;

/// Maximum number of parameters for SQLite IN (...) queries.
///
/// SQLite has a compile-time limit on the number of parameters in a SQL statement,
/// typically around 999 (SQLITE_MAX_VARIABLE_NUMBER). To stay safely under this limit
/// and leave room for other parameters in the query, we use 500 as our chunk size.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Chunk a slice into smaller slices for batch SQLite queries.
///
/// ```ignore
/// let mut all_results = Vec::new();
/// for chunk in chunk_for_sqlite(&campaign_ids) {
///     all_results.extend(query_with_in_clause(chunk)?);
/// }
/// ```
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Parses a stored decimal. Amounts are kept as TEXT so that no precision is
/// lost; a value that does not parse is a corrupt row, not a zero.
pub fn parse_decimal(value: &str, field_name: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value)
        .map_err(|e| StorageError::CorruptValue(format!("{} '{}': {}", field_name, value, e)))
}

/// Parses a stored enum token such as a status.
pub fn parse_token<T>(value: &str, field_name: &str) -> Result<T, StorageError>
where
    T: FromStr<Err = String>,
{
    T::from_str(value).map_err(|e| StorageError::CorruptValue(format!("{}: {}", field_name, e)))
}
