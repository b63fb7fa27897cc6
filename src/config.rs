//! Construction-time policy for [`DynamicHashSet`](crate::DynamicHashSet).

use crate::error::SetError;

/// Bucket count a default set starts with; also its capacity floor.
pub const DEFAULT_INITIAL_CAPACITY: usize = 10;

/// Load factor above which a default set doubles its bucket count.
pub const DEFAULT_LOAD_FACTOR_THRESHOLD: f64 = 0.75;

/// Capacity floor and grow trigger for a set.
///
/// The shrink trigger is derived: a set halves its bucket count when the load
/// factor drops below `1 - load_factor_threshold`, never going under
/// `initial_capacity`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetConfig {
    pub initial_capacity: usize,
    pub load_factor_threshold: f64,
}

impl SetConfig {
    pub fn new(initial_capacity: usize, load_factor_threshold: f64) -> Self {
        Self {
            initial_capacity,
            load_factor_threshold,
        }
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_load_factor_threshold(mut self, load_factor_threshold: f64) -> Self {
        self.load_factor_threshold = load_factor_threshold;
        self
    }

    /// Checks `initial_capacity > 0` and `0 < load_factor_threshold < 1`.
    pub fn validate(&self) -> Result<(), SetError> {
        if self.initial_capacity == 0 {
            return Err(SetError::InvalidCapacity);
        }
        // Written so that NaN fails too.
        if !(self.load_factor_threshold > 0.0 && self.load_factor_threshold < 1.0) {
            return Err(SetError::InvalidLoadFactor {
                threshold: self.load_factor_threshold,
            });
        }
        Ok(())
    }

    pub fn shrink_threshold(&self) -> f64 {
        1.0 - self.load_factor_threshold
    }
}

impl Default for SetConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR_THRESHOLD)
    }
}
