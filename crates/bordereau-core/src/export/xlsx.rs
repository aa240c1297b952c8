use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use tracing::info;

use crate::error::BordereauError;
use crate::export::{CellKind, SPREADSHEET_COLUMNS};
use crate::model::ExportRow;

const AMOUNT_FORMAT: &str = "0.00";

/// Presentation settings for the calculation spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetStyle {
    pub sheet_name: String,
    /// Header fill as 0xRRGGBB.
    pub header_fill: u32,
}

impl Default for SpreadsheetStyle {
    fn default() -> Self {
        SpreadsheetStyle {
            sheet_name: "Bordereau".to_string(),
            header_fill: 0xD9E1F2,
        }
    }
}

/// Write the export rows into a single-sheet xlsx workbook.
///
/// Row 0 holds the styled header, then one row per export row, then a
/// summary row carrying the sum of the totals.
pub fn render_spreadsheet(
    rows: &[ExportRow],
    style: &SpreadsheetStyle,
) -> Result<Vec<u8>, BordereauError> {
    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(style.header_fill))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();
    let text_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Top)
        .set_text_wrap();
    let integer_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::Top);
    let amount_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Top)
        .set_num_format(AMOUNT_FORMAT);
    let summary_label_format = Format::new().set_bold().set_border(FormatBorder::Thin);
    let summary_amount_format = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_num_format(AMOUNT_FORMAT);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(style.sheet_name.as_str())?;

    for (col, column) in SPREADSHEET_COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, column.title, &header_format)?;
        worksheet.set_column_width(col, column.width)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        let values = [
            CellValue::Number(row.code as f64),
            CellValue::Text(&row.title),
            CellValue::Text(&row.unit),
            CellValue::Number(decimal_to_f64(row.quantity)),
            CellValue::Number(decimal_to_f64(row.price)),
            CellValue::Number(decimal_to_f64(row.total)),
        ];

        for (col, (column, value)) in SPREADSHEET_COLUMNS.iter().zip(values).enumerate() {
            let col = col as u16;
            let format = match column.kind {
                CellKind::Integer => &integer_format,
                CellKind::Text => &text_format,
                CellKind::Amount => &amount_format,
            };
            match value {
                CellValue::Text(s) => worksheet.write_string_with_format(r, col, s, format)?,
                CellValue::Number(n) => worksheet.write_number_with_format(r, col, n, format)?,
            };
        }
    }

    let grand_total: Decimal = rows.iter().map(|r| r.total).sum();
    let summary_row = (rows.len() + 1) as u32;
    let last_col = (SPREADSHEET_COLUMNS.len() - 1) as u16;
    worksheet.write_string_with_format(summary_row, 1, "Total HT", &summary_label_format)?;
    worksheet.write_number_with_format(
        summary_row,
        last_col,
        decimal_to_f64(grand_total),
        &summary_amount_format,
    )?;

    let bytes = workbook.save_to_buffer()?;
    info!(rows = rows.len(), bytes = bytes.len(), "spreadsheet rendered");
    Ok(bytes)
}

enum CellValue<'a> {
    Text(&'a str),
    Number(f64),
}

fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    fn row(code: usize, title: &str, total: Decimal) -> ExportRow {
        ExportRow {
            code,
            title: title.to_string(),
            unit: "m3".to_string(),
            quantity: dec!(3),
            price: dec!(10.5),
            total,
        }
    }

    fn read_back(bytes: Vec<u8>, sheet: &str) -> calamine::Range<Data> {
        let mut wb: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        wb.worksheet_range(sheet).unwrap()
    }

    #[test]
    fn test_header_and_rows_written() {
        let rows = vec![row(1, "Fouilles", dec!(31.5)), row(2, "Remblai", dec!(12))];
        let bytes = render_spreadsheet(&rows, &SpreadsheetStyle::default()).unwrap();
        let range = read_back(bytes, "Bordereau");

        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("N°Prix".into()))
        );
        assert_eq!(
            range.get_value((0, 5)),
            Some(&Data::String("Montant Total HT".into()))
        );
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(1.0)));
        assert_eq!(
            range.get_value((2, 1)),
            Some(&Data::String("Remblai".into()))
        );
        assert_eq!(range.get_value((1, 5)), Some(&Data::Float(31.5)));
    }

    #[test]
    fn test_summary_row() {
        let rows = vec![row(1, "A", dec!(31.5)), row(2, "B", dec!(12))];
        let bytes = render_spreadsheet(&rows, &SpreadsheetStyle::default()).unwrap();
        let range = read_back(bytes, "Bordereau");

        assert_eq!(
            range.get_value((3, 1)),
            Some(&Data::String("Total HT".into()))
        );
        assert_eq!(range.get_value((3, 5)), Some(&Data::Float(43.5)));
    }

    #[test]
    fn test_custom_sheet_name() {
        let style = SpreadsheetStyle {
            sheet_name: "Lot 2".into(),
            ..SpreadsheetStyle::default()
        };
        let bytes = render_spreadsheet(&[row(1, "A", dec!(1))], &style).unwrap();
        let wb: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        assert_eq!(wb.sheet_names(), vec!["Lot 2".to_string()]);
    }
}
