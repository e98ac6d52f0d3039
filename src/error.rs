//! Error types. Absence of a key is never an error; these cover
//! structural failures and invalid configuration only.

/// Failures raised by map mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// Every slot of an open-addressing table was probed without finding
    /// an empty or deleted slot. The insert was rejected and the table is
    /// unchanged.
    #[error("table full: probed all {bin_count} slots without finding a free one")]
    TableFull {
        /// Number of slots in the table at the time of the insert.
        bin_count: usize,
    },
}

/// Errors returned by [`TableConfig::validate`](crate::TableConfig::validate).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A table needs at least one bin.
    #[error("bin_count must be at least 1")]
    ZeroBinCount,
    /// The load threshold must be finite and at least
    /// [`MIN_MAX_LOAD`](crate::config::MIN_MAX_LOAD).
    #[error("invalid max_load: {0}")]
    InvalidMaxLoad(f64),
}
