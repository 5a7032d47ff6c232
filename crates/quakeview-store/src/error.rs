//! Error types for the `quakeview-store` crate.
//!
//! Loading is all-or-nothing: the first malformed row aborts the load and
//! is reported with its 1-based row number in the file (the header is
//! row 1).

/// Errors that can occur while loading the event catalogue.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The catalogue file could not be opened.
    #[error("failed to open event catalogue: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The CSV reader could not produce a record.
    #[error("row {row}: unreadable CSV record: {source}")]
    Csv {
        /// Row number in the file.
        row: usize,
        /// The underlying CSV error.
        source: csv::Error,
    },

    /// A row has fewer columns than the catalogue format requires.
    #[error("row {row}: expected {expected} columns, found {found}")]
    MissingColumns {
        /// Row number in the file.
        row: usize,
        /// Required column count.
        expected: usize,
        /// Columns actually present.
        found: usize,
    },

    /// A timestamp does not follow the fixed-width `YYYY-MM-DDTHH:MM:SS`
    /// layout or names an impossible date or time.
    #[error("row {row}: malformed {column} timestamp {value:?}")]
    MalformedTimestamp {
        /// Row number in the file.
        row: usize,
        /// Column name.
        column: &'static str,
        /// The offending text.
        value: String,
    },

    /// A numeric column could not be parsed or is not finite.
    #[error("row {row}: malformed {column} value {value:?}")]
    MalformedField {
        /// Row number in the file.
        row: usize,
        /// Column name.
        column: &'static str,
        /// The offending text.
        value: String,
    },

    /// A coordinate lies outside its valid range.
    #[error("row {row}: {column} {value} is out of range")]
    OutOfRange {
        /// Row number in the file.
        row: usize,
        /// Column name.
        column: &'static str,
        /// The offending value.
        value: f64,
    },
}
