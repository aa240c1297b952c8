use bordereau_core::error::BordereauError;
use serde_json::json;
use std::path::Path;

use crate::output;

pub fn run(input_file: &Path, output_format: &str) -> Result<(), BordereauError> {
    let session = bordereau_core::import_file(input_file)?;
    let columns = bordereau_core::resolve_for(&session);

    match output_format {
        "json" => output::json::print(&json!({
            "header_row": session.dataset().header_row,
            "headers": session.dataset().headers,
            "columns": columns,
        }))?,
        _ => output::table::print_columns(session.dataset(), &columns),
    }

    Ok(())
}
