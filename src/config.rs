//! Construction-time tuning for [`ChainTable`](crate::ChainTable).

use crate::error::TableError;

/// Number of buckets a freshly created table starts with.
pub const DEFAULT_CAPACITY: usize = 10;

/// Average chain length at which the table doubles its bucket count.
pub const DEFAULT_MAX_LOAD: f64 = 2.0;

/// Smallest accepted load threshold. Lower values would make a single
/// insert allocate a bucket array orders of magnitude larger than the table.
pub const MIN_MAX_LOAD: f64 = 0.05;

/// Initial sizing and growth threshold of a table.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableConfig {
    initial_capacity: usize,
    max_load: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            max_load: DEFAULT_MAX_LOAD,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of buckets the table is created with.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Sets the `len / capacity` ratio that triggers a resize.
    ///
    /// Must be finite and at least [`MIN_MAX_LOAD`]; checked by `validate`.
    pub fn max_load(mut self, max_load: f64) -> Self {
        self.max_load = max_load;
        self
    }

    pub fn capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn load_threshold(&self) -> f64 {
        self.max_load
    }

    /// Checks the contract every table relies on: at least one bucket and a
    /// finite load threshold no smaller than [`MIN_MAX_LOAD`].
    pub fn validate(&self) -> Result<(), TableError> {
        if self.initial_capacity == 0 {
            return Err(TableError::ZeroCapacity);
        }
        if !self.max_load.is_finite() || self.max_load < MIN_MAX_LOAD {
            return Err(TableError::InvalidLoadFactor(self.max_load));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let c = TableConfig::default();
        assert_eq!(c.capacity(), DEFAULT_CAPACITY);
        assert_eq!(c.load_threshold(), DEFAULT_MAX_LOAD);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_capacity_rejected() {
        let c = TableConfig::new().initial_capacity(0);
        assert!(matches!(c.validate(), Err(TableError::ZeroCapacity)));
    }

    #[test]
    fn bad_load_factors_rejected() {
        for lf in [0.0, -1.0, 1e-12, 0.01, f64::NAN, f64::INFINITY] {
            match TableConfig::new().max_load(lf).validate() {
                Err(TableError::InvalidLoadFactor(_)) => {}
                other => panic!("unexpected result for {lf}: {other:?}"),
            }
        }
    }

    /// Invariant: the smallest accepted threshold is inclusive.
    #[test]
    fn min_load_threshold_accepted() {
        assert!(TableConfig::new().max_load(MIN_MAX_LOAD).validate().is_ok());
    }

    #[test]
    fn setters_chain() {
        let c = TableConfig::new().initial_capacity(3).max_load(0.5);
        assert_eq!(c.capacity(), 3);
        assert_eq!(c.load_threshold(), 0.5);
        assert!(c.validate().is_ok());
    }
}
