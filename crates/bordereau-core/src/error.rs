use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BordereauError {
    #[error("unsupported file type '{extension}'. Accepted: {accepted}")]
    InvalidFileType { extension: String, accepted: String },

    #[error("could not find the header row. Look for a column labelled 'N° Prix'")]
    HeaderNotFound,

    #[error("no data rows found below the header row")]
    EmptyDataset,

    #[error("no rows selected for export")]
    EmptySelection,

    #[error("row {index} is out of range (the dataset has {len} rows)")]
    SelectionOutOfRange { index: usize, len: usize },

    #[error("invalid selection '{0}'. Use indices and ranges such as 0,2,5-7")]
    InvalidSelection(String),

    #[error("failed to read workbook: {0}")]
    Workbook(String),

    #[error("failed to write spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("template {path} is unavailable: {reason}")]
    TemplateUnavailable { path: PathBuf, reason: String },

    #[error("no description template configured. Pass --template or set 'template' in the config")]
    MissingTemplate,

    #[error("failed to render document: {0}")]
    RenderFailure(String),

    #[error("saving '{name}' was canceled")]
    SaveCanceled { name: String },

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rust_xlsxwriter::XlsxError> for BordereauError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        BordereauError::Spreadsheet(e.to_string())
    }
}
