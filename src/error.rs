//! Errors reported by fallible table construction.

use std::collections::TryReserveError;
use thiserror::Error;

/// Error returned by [`ChainTable::try_with_config`](crate::ChainTable::try_with_config).
///
/// Lookups and removals never fail: absence is reported as `None`.
#[derive(Debug, Error)]
pub enum TableError {
    /// The bucket array could not be allocated.
    #[error("failed to allocate bucket array: {0}")]
    Alloc(#[from] TryReserveError),

    /// A table needs at least one bucket.
    #[error("initial capacity must be non-zero")]
    ZeroCapacity,

    /// The maximum load factor must be finite and at least `MIN_MAX_LOAD`.
    #[error("invalid maximum load factor: {0}")]
    InvalidLoadFactor(f64),
}
