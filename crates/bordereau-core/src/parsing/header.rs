use tracing::debug;

use crate::error::BordereauError;
use crate::model::RawGrid;
use crate::parsing::normalize::matches_marker;

/// Header text that identifies the header row of a price schedule.
pub const ANCHOR_LABEL: &str = "n° prix";

/// Find the index of the header row.
///
/// Sheets often carry title blocks and blank rows above the table, so the
/// header is located by the anchor label rather than a fixed row number.
/// The first row with any cell matching [`ANCHOR_LABEL`] wins.
pub fn detect_header_row(grid: &RawGrid) -> Result<usize, BordereauError> {
    let index = grid
        .rows()
        .iter()
        .position(|row| row.iter().any(|cell| matches_marker(cell, ANCHOR_LABEL)))
        .ok_or(BordereauError::HeaderNotFound)?;

    debug!(header_row = index, "detected header row");
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_after_blank_rows() {
        let grid = RawGrid::from_rows(&[
            &["", "", ""],
            &["", "", ""],
            &["", "N° Prix", "Désignation"],
            &["", "1", "Terrassement"],
        ]);
        assert_eq!(detect_header_row(&grid).unwrap(), 2);
    }

    #[test]
    fn test_header_after_title_block() {
        let grid = RawGrid::from_rows(&[
            &["BORDEREAU DES PRIX - LOT 2"],
            &["N°PRIX", "DESIGNATION"],
            &["n° prix", "désignation"],
        ]);
        assert_eq!(detect_header_row(&grid).unwrap(), 1);
    }

    #[test]
    fn test_anchor_as_substring() {
        let grid = RawGrid::from_rows(&[&["Code", "N° Prix / Article"]]);
        assert_eq!(detect_header_row(&grid).unwrap(), 0);
    }

    #[test]
    fn test_header_not_found() {
        let grid = RawGrid::from_rows(&[&["Code", "Libellé"], &["1", "Béton"]]);
        assert!(matches!(
            detect_header_row(&grid),
            Err(BordereauError::HeaderNotFound)
        ));
    }

    #[test]
    fn test_empty_grid() {
        assert!(matches!(
            detect_header_row(&RawGrid::default()),
            Err(BordereauError::HeaderNotFound)
        ));
    }
}
