//! The property address record and its CSV row layout.

use csv::ByteRecord;
use ezi_trie::record::is_valid_key;
use ezi_trie::Record;
use tracing::warn;

use crate::error::{LookupError, Result};

/// Column names in dataset order. The last two are the numeric coordinates.
pub const FIELD_NAMES: [&str; 35] = [
    "PFI",
    "EZI_ADD",
    "SRC_VERIF",
    "PROPSTATUS",
    "GCODEFEAT",
    "LOC_DESC",
    "BLGUNTTYP",
    "HSAUNITID",
    "BUNIT_PRE1",
    "BUNIT_ID1",
    "BUNIT_SUF1",
    "BUNIT_PRE2",
    "BUNIT_ID2",
    "BUNIT_SUF2",
    "FLOOR_TYPE",
    "FLOOR_NO_1",
    "FLOOR_NO_2",
    "BUILDING",
    "COMPLEX",
    "HSE_PREF1",
    "HSE_NUM1",
    "HSE_SUF1",
    "HSE_PREF2",
    "HSE_NUM2",
    "HSE_SUF2",
    "DISP_NUM1",
    "ROAD_NAME",
    "ROAD_TYPE",
    "RD_SUF",
    "LOCALITY",
    "STATE",
    "POSTCODE",
    "ACCESSTYPE",
    "x",
    "y",
];

/// Number of leading text columns.
pub const TEXT_FIELDS: usize = 33;

const PFI: usize = 0;
const EZI_ADD: usize = 1;
const X: usize = TEXT_FIELDS;
const Y: usize = TEXT_FIELDS + 1;

/// One property row. Text columns keep their raw bytes, whatever the
/// encoding; missing trailing columns read as empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressRecord {
    fields: Box<[Box<[u8]>]>,
    pub x: f64,
    pub y: f64,
}

impl AddressRecord {
    /// Build from text columns in [`FIELD_NAMES`] order. Short input is
    /// padded with empty fields and extra columns are dropped.
    pub fn new<I, S>(fields: I, x: f64, y: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        let mut fields: Vec<Box<[u8]>> = fields
            .into_iter()
            .take(TEXT_FIELDS)
            .map(|f| f.into().into_boxed_slice())
            .collect();
        fields.resize_with(TEXT_FIELDS, Default::default);
        Self {
            fields: fields.into_boxed_slice(),
            x,
            y,
        }
    }

    /// A record with only `PFI` and `EZI_ADD` populated.
    pub fn with_address(pfi: impl Into<Vec<u8>>, ezi_add: impl Into<Vec<u8>>) -> Self {
        let fields: [Vec<u8>; 2] = [pfi.into(), ezi_add.into()];
        Self::new(fields, 0.0, 0.0)
    }

    /// Parse one CSV row. Unparsable coordinates read as `0.0`.
    ///
    /// Fails only when the `EZI_ADD` column is empty or holds a NUL byte,
    /// since such a row cannot be indexed.
    pub fn from_csv_row(row: &ByteRecord) -> Result<Self> {
        let line = row.position().map_or(0, |p| p.line());

        let key = row.get(EZI_ADD).unwrap_or_default();
        if !is_valid_key(key) {
            return Err(LookupError::InvalidKey { line });
        }

        let text = (0..TEXT_FIELDS).map(|i| row.get(i).unwrap_or_default());
        let x = parse_coordinate(row.get(X), line, "x");
        let y = parse_coordinate(row.get(Y), line, "y");

        Ok(Self::new(text, x, y))
    }

    pub fn field(&self, index: usize) -> &[u8] {
        self.fields.get(index).map(|f| &**f).unwrap_or_default()
    }

    /// Text fields paired with their column names.
    pub fn text_fields(&self) -> impl Iterator<Item = (&'static str, &[u8])> + '_ {
        FIELD_NAMES
            .iter()
            .copied()
            .zip(self.fields.iter().map(|f| &**f))
    }

    pub fn pfi(&self) -> &[u8] {
        self.field(PFI)
    }

    pub fn ezi_add(&self) -> &[u8] {
        self.field(EZI_ADD)
    }
}

impl Record for AddressRecord {
    fn key(&self) -> &[u8] {
        self.ezi_add()
    }
}

fn parse_coordinate(raw: Option<&[u8]>, line: u64, column: &str) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }
    match text.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            warn!(line, column, value = %text, "unparsable coordinate, using 0");
            0.0
        }
    }
}
