pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod session;

use std::path::{Path, PathBuf};

use tracing::info;

use error::BordereauError;
use export::emit::{emit_or_cancel, Emitter};
use export::xlsx::SpreadsheetStyle;
use extraction::SourceFormat;
use parsing::columns::{resolve_columns, ResolvedColumns};
use session::Session;

/// Main API entry point: import a bordereau from raw file bytes.
///
/// The extension of `file_name` is checked before any bytes are decoded.
/// The first worksheet is read, the header row located and the rows below it
/// mapped into records. The returned session has an empty selection.
pub fn import_bytes(bytes: &[u8], file_name: &str) -> Result<Session, BordereauError> {
    let format = SourceFormat::from_file_name(file_name)?;
    let grid = extraction::workbook::read_first_sheet(bytes, format)?;
    let dataset = parsing::parse_grid(&grid)?;

    info!(
        file = file_name,
        header_row = dataset.header_row,
        records = dataset.len(),
        "imported bordereau"
    );
    Ok(Session::new(file_name, dataset))
}

/// Import a bordereau from disk.
pub fn import_file(path: &Path) -> Result<Session, BordereauError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    // Reject by extension before touching the file
    SourceFormat::from_file_name(&file_name)?;
    let bytes = std::fs::read(path)?;
    import_bytes(&bytes, &file_name)
}

/// Resolve the logical columns from the keys of the first record.
pub fn resolve_for(session: &Session) -> ResolvedColumns {
    resolve_columns(session.dataset().sample_keys())
}

/// Build the calculation spreadsheet for the current selection and hand it
/// to `emitter` as `export_<base>.xlsx`.
pub fn export_spreadsheet(
    session: &Session,
    style: &SpreadsheetStyle,
    emitter: &dyn Emitter,
) -> Result<PathBuf, BordereauError> {
    let columns = resolve_for(session);
    let rows = export::build_spreadsheet_rows(&session.selected_records(), &columns)?;
    let bytes = export::xlsx::render_spreadsheet(&rows, style)?;

    let name = export::spreadsheet_file_name(&session.base_name());
    let path = emit_or_cancel(emitter, &bytes, &name, export::XLSX_MIME)?;
    info!(path = %path.display(), rows = rows.len(), "spreadsheet exported");
    Ok(path)
}

/// Render the description document for the current selection from the
/// template bytes and hand it to `emitter` as `descriptions_<base>.docx`.
pub fn export_document(
    session: &Session,
    template: &[u8],
    emitter: &dyn Emitter,
) -> Result<PathBuf, BordereauError> {
    let columns = resolve_for(session);
    let entries = export::build_description_entries(&session.selected_records(), &columns)?;
    let bytes = export::docx::render_document(template, &entries)?;

    let name = export::document_file_name(&session.base_name());
    let path = emit_or_cancel(emitter, &bytes, &name, export::DOCX_MIME)?;
    info!(path = %path.display(), entries = entries.len(), "description document exported");
    Ok(path)
}

/// Like [`export_document`], loading the template from disk first.
///
/// An empty selection is reported before the template is read.
pub fn export_document_with_template(
    session: &Session,
    template_path: &Path,
    emitter: &dyn Emitter,
) -> Result<PathBuf, BordereauError> {
    if session.selection().is_empty() {
        return Err(BordereauError::EmptySelection);
    }
    let template = export::docx::load_template(template_path)?;
    export_document(session, &template, emitter)
}
