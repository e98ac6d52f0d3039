//! Construction-time settings shared by the hash tables.

use crate::error::ConfigError;

/// Initial number of bins when none is given.
pub const DEFAULT_BIN_COUNT: usize = 10;

/// Load factor above which a table doubles its bins.
pub const DEFAULT_MAX_LOAD: f64 = 0.7;

/// Smallest accepted `max_load`. A table grows until `len / bin_count`
/// drops to `max_load`, so one entry at this floor needs about a thousand
/// bins; lower values would let a single `put` demand an unbounded table.
pub const MIN_MAX_LOAD: f64 = 1e-3;

/// What `put` does when the key is already stored.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DuplicatePolicy {
    /// Overwrite the stored value and hand back the previous one.
    #[default]
    Replace,
    /// Store another entry for the same key. Which entry lookups see is
    /// documented per container.
    Keep,
}

/// Settings for [`ChainedMap`](crate::ChainedMap) and
/// [`ProbeMap`](crate::ProbeMap).
///
/// ```
/// use kv_containers::{DuplicatePolicy, TableConfig};
///
/// let cfg = TableConfig::default()
///     .with_bin_count(4)
///     .with_max_load(0.5)
///     .with_duplicates(DuplicatePolicy::Keep);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableConfig {
    /// Number of bins the table starts with.
    pub bin_count: usize,
    /// Growth threshold for `len / bin_count`.
    pub max_load: f64,
    /// Behavior of `put` on an existing key.
    pub duplicates: DuplicatePolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            bin_count: DEFAULT_BIN_COUNT,
            max_load: DEFAULT_MAX_LOAD,
            duplicates: DuplicatePolicy::default(),
        }
    }
}

impl TableConfig {
    pub fn with_bin_count(mut self, bin_count: usize) -> Self {
        self.bin_count = bin_count;
        self
    }

    pub fn with_max_load(mut self, max_load: f64) -> Self {
        self.max_load = max_load;
        self
    }

    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Reject settings no table can operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bin_count == 0 {
            return Err(ConfigError::ZeroBinCount);
        }
        if !self.max_load.is_finite() || self.max_load < MIN_MAX_LOAD {
            return Err(ConfigError::InvalidMaxLoad(self.max_load));
        }
        Ok(())
    }
}
