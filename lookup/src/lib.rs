//! Property address lookup by `EZI_ADD`.
//!
//! Loads a CSV dataset, indexes it with either a linear scan or a PATRICIA
//! trie from [`ezi_trie`], and answers one query per input line. Matches are
//! rendered to a records sink and comparison counters to a stats sink.

pub mod address;
pub mod config;
pub mod error;
pub mod ingest;
pub mod render;
pub mod session;

pub use address::AddressRecord;
pub use config::{LookupConfig, Stage};
pub use error::{LookupError, Result};
pub use ingest::{load_csv, read_records};
pub use session::{run_session, Index, SessionSummary};
