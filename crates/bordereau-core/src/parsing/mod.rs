pub mod columns;
pub mod header;
pub mod normalize;
pub mod reconcile;
pub mod values;

use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::BordereauError;
use crate::model::{Dataset, Header, RawGrid, Record};
use header::detect_header_row;
use normalize::normalize;

/// Turn a decoded grid into a Dataset: locate the header row, then map the
/// rows below it.
pub fn parse_grid(grid: &RawGrid) -> Result<Dataset, BordereauError> {
    let header_row = detect_header_row(grid)?;
    map_rows(grid, header_row)
}

/// Map the rows below `header_row` into records keyed by normalized header.
///
/// Rows whose values are all blank are dropped. Fails with `EmptyDataset`
/// when nothing remains.
pub fn map_rows(grid: &RawGrid, header_row: usize) -> Result<Dataset, BordereauError> {
    let header_cells = grid.row(header_row).unwrap_or_default();
    let headers = build_headers(header_cells);

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for (row_idx, row) in grid.rows().iter().enumerate().skip(header_row + 1) {
        let entries = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.key.clone(), row.get(i).cloned().unwrap_or_default()))
            .collect();
        let record = Record::new(row_idx, entries);

        if record.is_blank() {
            dropped += 1;
            continue;
        }
        records.push(record);
    }

    debug!(
        header_row,
        kept = records.len(),
        dropped,
        "mapped rows below header"
    );

    let dataset = Dataset::new(header_row, headers, records)?;
    info!(records = dataset.len(), "dataset ready");
    Ok(dataset)
}

/// Build unique, normalized keys for the header row.
///
/// Blank headers become `col_<i>`; a key already taken by an earlier column
/// becomes `<key>_<i>`, then `<key>_<i>_<n>` if that is taken too.
fn build_headers(cells: &[String]) -> Vec<Header> {
    let mut seen = HashSet::new();

    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let label = cell.trim().to_string();
            let mut key = normalize(&label);
            if key.is_empty() {
                key = format!("col_{i}");
            }
            if !seen.insert(key.clone()) {
                let base = key;
                key = format!("{base}_{i}");
                let mut n = 2;
                while !seen.insert(key.clone()) {
                    key = format!("{base}_{i}_{n}");
                    n += 1;
                }
            }
            Header { key, label }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> RawGrid {
        RawGrid::from_rows(&[
            &["BORDEREAU DES PRIX", "", "", ""],
            &["N° Prix", "Désignation", "", "Quantité"],
            &["1", "Terrassement", "x", "12"],
            &["", "", "", ""],
            &["2", "Béton", "", "3,5"],
        ])
    }

    #[test]
    fn test_parse_grid() {
        let ds = parse_grid(&sample_grid()).unwrap();
        assert_eq!(ds.header_row, 1);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].source_row, 2);
        assert_eq!(ds.records()[1].source_row, 4);
    }

    #[test]
    fn test_keys_are_normalized_labels_kept() {
        let ds = parse_grid(&sample_grid()).unwrap();
        let keys: Vec<&str> = ds.sample_keys();
        assert_eq!(keys, vec!["n° prix", "designation", "col_2", "quantite"]);
        assert_eq!(ds.label_for("designation"), Some("Désignation"));
        assert_eq!(ds.records()[1].get("quantite"), Some("3,5"));
    }

    #[test]
    fn test_blank_rows_dropped() {
        let grid = RawGrid::from_rows(&[&["N° prix", "Désignation"], &["  ", ""], &["1", "Fouilles"]]);
        let ds = map_rows(&grid, 0).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].get("designation"), Some("Fouilles"));
    }

    #[test]
    fn test_no_records_is_empty_dataset() {
        let grid = RawGrid::from_rows(&[&["N° prix", "Désignation"], &["", ""]]);
        assert!(matches!(
            map_rows(&grid, 0),
            Err(BordereauError::EmptyDataset)
        ));
    }

    #[test]
    fn test_header_on_last_row_is_empty_dataset() {
        let grid = RawGrid::from_rows(&[&["N° prix"]]);
        assert!(matches!(
            parse_grid(&grid),
            Err(BordereauError::EmptyDataset)
        ));
    }

    #[test]
    fn test_duplicate_headers_get_unique_keys() {
        let headers = build_headers(&[
            "Montant".to_string(),
            "MONTANT".to_string(),
            "".to_string(),
        ]);
        let keys: Vec<&str> = headers.iter().map(|h| h.key.as_str()).collect();
        assert_eq!(keys, vec!["montant", "montant_1", "col_2"]);
        assert_eq!(headers[1].label, "MONTANT");
    }

    #[test]
    fn test_renamed_duplicate_does_not_collide() {
        let grid = RawGrid::from_rows(&[
            &["Montant", "Montant_2", "MONTANT"],
            &["1", "2", "3"],
        ]);
        let ds = map_rows(&grid, 0).unwrap();
        let keys = ds.sample_keys();
        assert_eq!(keys, vec!["montant", "montant_2", "montant_2_2"]);

        let unique: HashSet<&str> = keys.iter().copied().collect();
        assert_eq!(unique.len(), keys.len());
        assert_eq!(ds.records()[0].get("montant_2"), Some("2"));
        assert_eq!(ds.records()[0].get("montant_2_2"), Some("3"));
    }
}
