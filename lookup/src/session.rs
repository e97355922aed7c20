//! Query loop: one lookup per input line, rendered to the records sink and
//! summarised on the stats sink.

use std::io::{BufRead, Write};

use ezi_trie::{linear, PatriciaTrie, SearchStats};
use tracing::{debug, info};

use crate::address::AddressRecord;
use crate::config::{LookupConfig, Stage};
use crate::error::Result;
use crate::render;

/// A searchable view over a loaded dataset.
pub enum Index<'a> {
    Linear(&'a [AddressRecord]),
    Patricia {
        trie: PatriciaTrie<&'a AddressRecord>,
        closest_match: bool,
    },
}

impl<'a> Index<'a> {
    pub fn build(records: &'a [AddressRecord], config: &LookupConfig) -> Self {
        match config.stage {
            Stage::Linear => Index::Linear(records),
            Stage::Patricia => Index::Patricia {
                trie: PatriciaTrie::from_records(records),
                closest_match: config.closest_match,
            },
        }
    }

    pub fn lookup(&self, query: &[u8]) -> SearchStats<&'a AddressRecord> {
        match self {
            Index::Linear(records) => {
                let records: &'a [AddressRecord] = records;
                linear::scan(records, query)
            }
            Index::Patricia {
                trie,
                closest_match,
            } => trie.search(query, *closest_match).copied(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Index::Linear(_) => Stage::Linear,
            Index::Patricia { .. } => Stage::Patricia,
        }
    }
}

/// Totals for a finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub queries: usize,
    pub found: usize,
    pub not_found: usize,
    /// Queries answered by the closest-match fallback.
    pub approximate: usize,
}

/// Answer every line of `queries`, stripping the line terminator.
///
/// Matches go to `records_out` and one summary line per query goes to
/// `stats_out`. Both sinks are flushed before returning.
pub fn run_session<R, W, S>(
    index: &Index<'_>,
    queries: R,
    records_out: &mut W,
    stats_out: &mut S,
) -> Result<SessionSummary>
where
    R: BufRead,
    W: Write,
    S: Write,
{
    let mut summary = SessionSummary::default();

    for line in queries.split(b'\n') {
        let mut query = line?;
        while query.last() == Some(&b'\r') {
            query.pop();
        }

        let stats = index.lookup(&query);
        debug!(
            query = %String::from_utf8_lossy(&query),
            results = stats.len(),
            nodes = stats.node_comparisons,
            "lookup"
        );

        render::write_query_block(records_out, &query, &stats)?;
        render::write_summary(stats_out, &query, &stats)?;

        summary.queries += 1;
        if stats.is_not_found() {
            summary.not_found += 1;
        } else {
            summary.found += 1;
        }
        if stats.closest_distance.is_some() {
            summary.approximate += 1;
        }
    }

    records_out.flush()?;
    stats_out.flush()?;
    info!(
        stage = %index.stage(),
        queries = summary.queries,
        found = summary.found,
        not_found = summary.not_found,
        approximate = summary.approximate,
        "session finished"
    );
    Ok(summary)
}
