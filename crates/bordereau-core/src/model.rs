use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BordereauError;

/// Rectangular grid of cell text decoded from the first worksheet.
///
/// Missing cells are empty strings; every row has the same width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGrid {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl RawGrid {
    /// Build a grid, padding short rows with empty cells.
    pub fn new(mut rows: Vec<Vec<String>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, String::new());
        }
        RawGrid { rows, width }
    }

    /// Convenience constructor for literal grids.
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        RawGrid::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

/// A column of the header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Normalized key used for every lookup.
    pub key: String,
    /// Header text as it appears in the source, for display only.
    pub label: String,
}

/// One data row keyed by header key, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Row index in the source grid.
    pub source_row: usize,
    entries: Vec<(String, String)>,
}

impl Record {
    pub fn new(source_row: usize, entries: Vec<(String, String)>) -> Self {
        Record {
            source_row,
            entries,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value for `key`, or an empty string when the column is absent.
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.entries.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// Ordered, non-empty collection of records from one import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub header_row: usize,
    pub headers: Vec<Header>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(
        header_row: usize,
        headers: Vec<Header>,
        records: Vec<Record>,
    ) -> Result<Self, BordereauError> {
        if records.is_empty() {
            return Err(BordereauError::EmptyDataset);
        }
        Ok(Dataset {
            header_row,
            headers,
            records,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys of the first record; the schema is assumed homogeneous.
    pub fn sample_keys(&self) -> Vec<&str> {
        self.records
            .first()
            .map(|r| r.keys().collect())
            .unwrap_or_default()
    }

    /// Original label for a header key.
    pub fn label_for(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.key == key)
            .map(|h| h.label.as_str())
    }
}

/// Calculation fields of a record after numeric reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledRow {
    pub code: String,
    pub title: String,
    pub unit: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub total: Decimal,
    /// True when the total was derived as quantity × price.
    pub total_recomputed: bool,
}

/// One line of the exported calculation spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    /// Fresh 1-based sequence number, in selection order.
    pub code: usize,
    pub title: String,
    pub unit: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub total: Decimal,
}

/// One entry of the description document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionEntry {
    pub id: usize,
    pub title: String,
    pub description: String,
}
