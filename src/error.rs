//! Error types for loading the congestion table and evaluating queries.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while loading the source CSV.
///
/// Any of these aborts startup; the table is never partially loaded.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode {} with any of the configured encodings ({tried})", path.display())]
    Undecodable { path: PathBuf, tried: String },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column `{0}` not found in header")]
    MissingColumn(&'static str),

    #[error("no time-slot columns found in header")]
    NoTimeSlots,

    #[error("time-slot columns out of order: `{current}` follows `{previous}`")]
    SlotOrder { previous: String, current: String },

    #[error("data file contains no usable congestion values")]
    Empty,
}

/// Invalid query criteria. The serving layer reports these back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unknown time slot `{0}`")]
    UnknownTimeSlot(String),

    #[error("time range start {start} is after end {end}")]
    InvalidTimeRange { start: String, end: String },

    #[error("comparison accepts at most {max} stations, got {got}")]
    TooManyStations { max: usize, got: usize },

    #[error("unknown sort mode `{0}` (expected `alphabetical` or `peak`)")]
    UnknownSortMode(String),
}
