use std::fmt;

use crate::error::LookupError;

/// Which index answers the queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Scan every record, comparing keys bit by bit.
    Linear,
    /// Descend a PATRICIA trie built over the `EZI_ADD` keys.
    Patricia,
}

impl TryFrom<u8> for Stage {
    type Error = LookupError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Stage::Linear),
            2 => Ok(Stage::Patricia),
            other => Err(LookupError::UnknownStage(other)),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Linear => f.write_str("linear"),
            Stage::Patricia => f.write_str("patricia"),
        }
    }
}

/// Configuration for a lookup run.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub stage: Stage,
    /// Fall back to the nearest key by edit distance on a trie miss.
    pub closest_match: bool,
    /// CSV field delimiter
    pub delimiter: u8,
    /// Whether the first CSV row is a header
    pub has_headers: bool,
}

impl LookupConfig {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            ..Self::default()
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            stage: Stage::Linear,
            closest_match: true,
            delimiter: b',',
            has_headers: true,
        }
    }
}
