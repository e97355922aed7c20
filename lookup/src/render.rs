//! Output formats for the records file and the per-query summary.

use std::io::{self, Write};

use ezi_trie::SearchStats;

use crate::address::AddressRecord;

pub const NOT_FOUND: &str = "NOTFOUND";

/// `--> PFI: v || EZI_ADD: v || ... || x: v || y: v`
pub fn write_record<W: Write>(out: &mut W, record: &AddressRecord) -> io::Result<()> {
    out.write_all(b"--> ")?;
    for (name, value) in record.text_fields() {
        write!(out, "{name}: ")?;
        out.write_all(value)?;
        out.write_all(b" || ")?;
    }
    writeln!(out, "x: {:.6} || y: {:.6}", record.x, record.y)
}

/// The query line followed by every match, or `NOTFOUND`.
pub fn write_query_block<W: Write>(
    out: &mut W,
    query: &[u8],
    stats: &SearchStats<&AddressRecord>,
) -> io::Result<()> {
    out.write_all(query)?;
    out.write_all(b"\n")?;
    if stats.is_not_found() {
        writeln!(out, "{NOT_FOUND}")?;
        return Ok(());
    }
    for record in &stats.results {
        write_record(out, record)?;
    }
    Ok(())
}

/// `<query> --> <n> records found - comparisons: b<bits> n<nodes> s<strings>`
pub fn write_summary<W: Write, T>(
    out: &mut W,
    query: &[u8],
    stats: &SearchStats<T>,
) -> io::Result<()> {
    out.write_all(query)?;
    writeln!(
        out,
        " --> {} records found - comparisons: b{} n{} s{}",
        stats.len(),
        stats.bit_comparisons,
        stats.node_comparisons,
        stats.string_comparisons,
    )
}
