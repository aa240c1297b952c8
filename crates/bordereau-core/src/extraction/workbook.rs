use std::io::{Cursor, Read, Seek};

use calamine::{Data, Ods, Range, Reader, Xls, Xlsx};

use crate::error::BordereauError;
use crate::extraction::SourceFormat;
use crate::model::RawGrid;

/// Decode the first worksheet of a workbook into a RawGrid.
///
/// Other sheets are ignored.
pub fn read_first_sheet(bytes: &[u8], format: SourceFormat) -> Result<RawGrid, BordereauError> {
    let cursor = Cursor::new(bytes);
    let range = match format {
        SourceFormat::Xlsx => {
            let workbook: Xlsx<_> = open(cursor, "xlsx")?;
            first_range(workbook)?
        }
        SourceFormat::Xls => {
            let workbook: Xls<_> = open(cursor, "xls")?;
            first_range(workbook)?
        }
        SourceFormat::Ods => {
            let workbook: Ods<_> = open(cursor, "ods")?;
            first_range(workbook)?
        }
    };
    Ok(range_to_grid(&range))
}

fn open<R, RS>(cursor: RS, kind: &str) -> Result<R, BordereauError>
where
    RS: Read + Seek,
    R: Reader<RS>,
{
    calamine::open_workbook_from_rs(cursor)
        .map_err(|e| BordereauError::Workbook(format!("failed to open {kind}: {e:?}")))
}

fn first_range<R, RS>(mut workbook: R) -> Result<Range<Data>, BordereauError>
where
    RS: Read + Seek,
    R: Reader<RS>,
{
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| BordereauError::Workbook("workbook has no worksheet".into()))?
        .map_err(|e| BordereauError::Workbook(format!("failed to read first sheet: {e:?}")))
}

/// Convert a calamine range into a grid with absolute positions.
///
/// calamine trims leading empty rows and columns; they are restored as
/// empty cells so row indices match the sheet.
fn range_to_grid(range: &Range<Data>) -> RawGrid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<String>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![String::new(); col_offset];
        cells.extend(row.iter().map(cell_as_string));
        rows.push(cells);
    }
    RawGrid::new(rows)
}

fn cell_as_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        // Display for f64 has no trailing ".0" and no exponent.
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        _ => format!("{cell}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_as_string() {
        assert_eq!(cell_as_string(&Data::Float(31.5)), "31.5");
        assert_eq!(cell_as_string(&Data::Float(3.0)), "3");
        assert_eq!(cell_as_string(&Data::Int(12)), "12");
        assert_eq!(cell_as_string(&Data::String("Béton".into())), "Béton");
        assert_eq!(cell_as_string(&Data::Empty), "");
    }

    #[test]
    fn test_range_offset_restored() {
        let mut range = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("N° Prix".into()));
        range.set_value((3, 2), Data::Float(4.0));

        let grid = range_to_grid(&range);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.row(2).unwrap(), &["", "N° Prix", ""]);
        assert_eq!(grid.row(3).unwrap(), &["", "", "4"]);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let err = read_first_sheet(b"not a workbook", SourceFormat::Xlsx).unwrap_err();
        assert!(matches!(err, BordereauError::Workbook(_)));
    }
}
