use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a lookup run.
///
/// A query with no match is not an error; it renders as `NOTFOUND`.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("input contains no usable address records")]
    NoRecords,

    /// Row-level; ingestion skips the row and keeps going.
    #[error("row at line {line}: EZI_ADD must be non-empty and NUL-free")]
    InvalidKey { line: u64 },

    #[error("unknown stage {0} (expected 1 or 2)")]
    UnknownStage(u8),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = LookupError> = std::result::Result<T, E>;
