use bordereau_core::error::BordereauError;
use bordereau_core::model::ReconciledRow;
use bordereau_core::parsing::columns::Field;
use bordereau_core::parsing::reconcile::reconcile_row;
use serde_json::json;
use std::path::Path;

use crate::output;

pub fn run(input_file: &Path, output_format: &str) -> Result<(), BordereauError> {
    let session = bordereau_core::import_file(input_file)?;
    let columns = bordereau_core::resolve_for(&session);

    let rows: Vec<ReconciledRow> = session
        .dataset()
        .records()
        .iter()
        .map(|record| reconcile_row(record, &columns))
        .collect();

    match output_format {
        "json" => {
            let description_key = columns.key(Field::Description);
            let items: Vec<_> = session
                .dataset()
                .records()
                .iter()
                .zip(&rows)
                .enumerate()
                .map(|(index, (record, row))| {
                    json!({
                        "index": index,
                        "source_row": record.source_row,
                        "item": row,
                        "description": record.value(description_key),
                    })
                })
                .collect();
            output::json::print(&json!({
                "source": session.source_name(),
                "header_row": session.dataset().header_row,
                "items": items,
            }))?
        }
        _ => output::table::print_items(session.source_name(), &rows),
    }

    Ok(())
}
