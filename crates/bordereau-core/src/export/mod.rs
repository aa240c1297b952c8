pub mod docx;
pub mod emit;
pub mod xlsx;

use tracing::debug;

use crate::error::BordereauError;
use crate::model::{DescriptionEntry, ExportRow, Record};
use crate::parsing::columns::{Field, ResolvedColumns};
use crate::parsing::reconcile::reconcile_row;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// How a spreadsheet column is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Sequence number.
    Integer,
    Text,
    /// Decimal amount shown with two decimals.
    Amount,
}

#[derive(Debug, Clone, Copy)]
pub struct SpreadsheetColumn {
    pub title: &'static str,
    pub kind: CellKind,
    pub width: f64,
}

/// Columns of the calculation spreadsheet, in output order.
pub const SPREADSHEET_COLUMNS: [SpreadsheetColumn; 6] = [
    SpreadsheetColumn {
        title: "N°Prix",
        kind: CellKind::Integer,
        width: 9.0,
    },
    SpreadsheetColumn {
        title: "Désignation",
        kind: CellKind::Text,
        width: 60.0,
    },
    SpreadsheetColumn {
        title: "Unité",
        kind: CellKind::Text,
        width: 10.0,
    },
    SpreadsheetColumn {
        title: "Quantité",
        kind: CellKind::Amount,
        width: 14.0,
    },
    SpreadsheetColumn {
        title: "P.U DH.HT",
        kind: CellKind::Amount,
        width: 16.0,
    },
    SpreadsheetColumn {
        title: "Montant Total HT",
        kind: CellKind::Amount,
        width: 20.0,
    },
];

/// Project the selected records onto the calculation columns.
///
/// Codes are renumbered 1..n in selection order; the source code is dropped.
pub fn build_spreadsheet_rows(
    selected: &[&Record],
    columns: &ResolvedColumns,
) -> Result<Vec<ExportRow>, BordereauError> {
    if selected.is_empty() {
        return Err(BordereauError::EmptySelection);
    }

    let rows: Vec<ExportRow> = selected
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let r = reconcile_row(record, columns);
            ExportRow {
                code: i + 1,
                title: r.title,
                unit: r.unit,
                quantity: r.quantity,
                price: r.price,
                total: r.total,
            }
        })
        .collect();

    debug!(rows = rows.len(), "assembled spreadsheet rows");
    Ok(rows)
}

/// Pair each selected title with its long description, numbered 1..n.
pub fn build_description_entries(
    selected: &[&Record],
    columns: &ResolvedColumns,
) -> Result<Vec<DescriptionEntry>, BordereauError> {
    if selected.is_empty() {
        return Err(BordereauError::EmptySelection);
    }

    let title_key = columns.key(Field::Title);
    let description_key = columns.key(Field::Description);

    let entries: Vec<DescriptionEntry> = selected
        .iter()
        .enumerate()
        .map(|(i, record)| DescriptionEntry {
            id: i + 1,
            title: record.value(title_key).trim().to_string(),
            description: record.value(description_key).trim().to_string(),
        })
        .collect();

    debug!(entries = entries.len(), "assembled description entries");
    Ok(entries)
}

/// "export_<base>.xlsx"
pub fn spreadsheet_file_name(base: &str) -> String {
    format!("export_{base}.xlsx")
}

/// "descriptions_<base>.docx"
pub fn document_file_name(base: &str) -> String {
    format!("descriptions_{base}.docx")
}
