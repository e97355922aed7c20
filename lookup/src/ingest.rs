use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use tracing::{info, warn};

use crate::address::AddressRecord;
use crate::config::LookupConfig;
use crate::error::{LookupError, Result};

/// Load every usable record from a CSV file on disk.
pub fn load_csv(path: &Path, config: &LookupConfig) -> Result<Vec<AddressRecord>> {
    let file = File::open(path).map_err(|source| LookupError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_records(BufReader::new(file), config)?;
    info!(path = %path.display(), records = records.len(), "loaded dataset");
    Ok(records)
}

/// Read records from any CSV source, in file order.
///
/// Rows whose `EZI_ADD` cannot be indexed are skipped with a warning. A
/// source that yields no usable rows at all is an error.
pub fn read_records<R: Read>(reader: R, config: &LookupConfig) -> Result<Vec<AddressRecord>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(config.has_headers)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut row = ByteRecord::new();
    while rdr.read_byte_record(&mut row)? {
        match AddressRecord::from_csv_row(&row) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(%err, "skipping row");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, kept = records.len(), "some rows were not indexed");
    }
    if records.is_empty() {
        return Err(LookupError::NoRecords);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "PFI,EZI_ADD,SRC_VERIF\n";

    #[test]
    fn test_reads_in_order() {
        let data = format!("{HEADER}1,B ST,x\n2,A ST,y\n3,B ST,z\n");
        let records = read_records(data.as_bytes(), &LookupConfig::default()).unwrap();
        let keys: Vec<&[u8]> = records.iter().map(|r| r.ezi_add()).collect();
        assert_eq!(keys, [&b"B ST"[..], &b"A ST"[..], &b"B ST"[..]]);
        assert_eq!(records[2].field(2), b"z");
    }

    #[test]
    fn test_skips_empty_keys() {
        let data = format!("{HEADER}1,,x\n2,A ST,y\n");
        let records = read_records(data.as_bytes(), &LookupConfig::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pfi(), b"2");
    }

    #[test]
    fn test_no_usable_rows() {
        let data = format!("{HEADER}1,,x\n");
        assert!(matches!(
            read_records(data.as_bytes(), &LookupConfig::default()),
            Err(LookupError::NoRecords)
        ));
        assert!(matches!(
            read_records(HEADER.as_bytes(), &LookupConfig::default()),
            Err(LookupError::NoRecords)
        ));
    }

    #[test]
    fn test_delimiter_and_headerless() {
        let config = LookupConfig {
            delimiter: b';',
            has_headers: false,
            ..LookupConfig::default()
        };
        let records = read_records("9;C RD\n".as_bytes(), &config).unwrap();
        assert_eq!(records[0].pfi(), b"9");
        assert_eq!(records[0].ezi_add(), b"C RD");
    }

    #[test]
    fn test_quoted_commas() {
        let data = format!("{HEADER}1,\"UNIT 1, 5 A ST\",x\n");
        let records = read_records(data.as_bytes(), &LookupConfig::default()).unwrap();
        assert_eq!(records[0].ezi_add(), b"UNIT 1, 5 A ST");
    }

    #[test]
    fn test_non_utf8_bytes_survive_ingestion() {
        let data = b"PFI,EZI_ADD\n1,CAF\xE9 ST\n";
        let records = read_records(&data[..], &LookupConfig::default()).unwrap();
        assert_eq!(records[0].ezi_add(), b"CAF\xE9 ST");
    }

    #[test]
    fn test_missing_file() {
        let err = load_csv(Path::new("/definitely/not/here.csv"), &LookupConfig::default())
            .unwrap_err();
        assert!(matches!(err, LookupError::Open { .. }));
    }
}
