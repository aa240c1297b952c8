use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::BordereauError;
use crate::export::xlsx::SpreadsheetStyle;

/// Export settings, read from a JSON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Docx template for the description document.
    pub template: Option<PathBuf>,
    /// Directory exports are written into.
    pub output_dir: PathBuf,
    /// Replace existing files instead of canceling the save.
    pub overwrite: bool,
    /// Header fill of the spreadsheet as hex RGB, e.g. "D9E1F2".
    pub header_fill: String,
    pub sheet_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            template: None,
            output_dir: PathBuf::from("."),
            overwrite: false,
            header_fill: "D9E1F2".to_string(),
            sheet_name: "Bordereau".to_string(),
        }
    }
}

impl ExportConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<ExportConfig, BordereauError> {
        let content = std::fs::read_to_string(path).map_err(|e| BordereauError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        ExportConfig::parse(&content, path)
    }

    /// Parse and validate a config from a JSON string.
    pub fn parse(json: &str, source: &Path) -> Result<ExportConfig, BordereauError> {
        let config: ExportConfig =
            serde_json::from_str(json).map_err(|e| BordereauError::ConfigLoad {
                path: source.to_path_buf(),
                reason: e.to_string(),
            })?;
        config.validate().map_err(|reason| BordereauError::ConfigLoad {
            path: source.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if parse_hex_color(&self.header_fill).is_none() {
            return Err(format!(
                "header_fill '{}' is not a hex RGB colour such as D9E1F2",
                self.header_fill
            ));
        }
        validate_sheet_name(&self.sheet_name)
    }

    /// Spreadsheet presentation derived from this config.
    pub fn spreadsheet_style(&self) -> SpreadsheetStyle {
        let defaults = SpreadsheetStyle::default();
        SpreadsheetStyle {
            sheet_name: if validate_sheet_name(&self.sheet_name).is_ok() {
                self.sheet_name.clone()
            } else {
                defaults.sheet_name
            },
            header_fill: parse_hex_color(&self.header_fill).unwrap_or(defaults.header_fill),
        }
    }
}

fn parse_hex_color(s: &str) -> Option<u32> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Worksheet names are 1..=31 characters without `[]:*?/\`.
fn validate_sheet_name(name: &str) -> Result<(), String> {
    let len = name.chars().count();
    if len == 0 || len > 31 {
        return Err(format!("sheet_name '{name}' must be 1 to 31 characters"));
    }
    if name.contains(|c: char| "[]:*?/\\".contains(c)) {
        return Err(format!("sheet_name '{name}' contains a forbidden character"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<ExportConfig, BordereauError> {
        ExportConfig::parse(json, Path::new("test.json"))
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(parse("{}").unwrap(), ExportConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let cfg = parse(r#"{"template": "tpl/desc.docx", "overwrite": true}"#).unwrap();
        assert_eq!(cfg.template, Some(PathBuf::from("tpl/desc.docx")));
        assert!(cfg.overwrite);
        assert_eq!(cfg.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_style_from_config() {
        let cfg = parse(r##"{"header_fill": "#FFC000", "sheet_name": "Lot 3"}"##).unwrap();
        let style = cfg.spreadsheet_style();
        assert_eq!(style.header_fill, 0xFFC000);
        assert_eq!(style.sheet_name, "Lot 3");
    }

    #[test]
    fn test_bad_colour_rejected() {
        assert!(matches!(
            parse(r#"{"header_fill": "blue"}"#),
            Err(BordereauError::ConfigLoad { .. })
        ));
    }

    #[test]
    fn test_bad_sheet_name_rejected() {
        assert!(parse(r#"{"sheet_name": "a/b"}"#).is_err());
        assert!(parse(r#"{"sheet_name": ""}"#).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(parse(r#"{"colour": "D9E1F2"}"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ExportConfig::load(Path::new("/nonexistent/bordereau.json")),
            Err(BordereauError::ConfigLoad { .. })
        ));
    }
}
