//! Error types for the `quakeview-filter` crate.

/// Errors that can occur while constructing filters.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A year range could not be turned into calendar timestamps.
    #[error("invalid year range {start}-{end}")]
    InvalidYearRange {
        /// First year of the range.
        start: i32,
        /// Last year of the range.
        end: i32,
    },

    /// A region name did not match any preset.
    #[error("unknown region: {0}")]
    UnknownRegion(String),
}
