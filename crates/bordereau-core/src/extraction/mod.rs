pub mod workbook;

use std::path::Path;

use crate::error::BordereauError;

/// File extensions accepted for import (compared case-insensitively).
pub const ACCEPTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Container format of an imported spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Xlsx,
    Xls,
    Ods,
}

impl SourceFormat {
    /// Pick the decoder from the file extension.
    ///
    /// Rejects anything outside [`ACCEPTED_EXTENSIONS`] before any bytes are parsed.
    pub fn from_file_name(name: &str) -> Result<SourceFormat, BordereauError> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" => Ok(SourceFormat::Xlsx),
            "xls" => Ok(SourceFormat::Xls),
            "ods" => Ok(SourceFormat::Ods),
            _ => Err(BordereauError::InvalidFileType {
                extension,
                accepted: ACCEPTED_EXTENSIONS.join(", "),
            }),
        }
    }
}

/// File stem used to name exported files ("lot2.xlsx" -> "lot2").
pub fn base_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("bordereau")
        .to_string()
}
