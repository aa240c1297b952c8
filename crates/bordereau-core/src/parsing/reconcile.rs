use rust_decimal::Decimal;
use tracing::debug;

use crate::model::{ReconciledRow, Record};
use crate::parsing::columns::{Field, ResolvedColumns};
use crate::parsing::values::parse_amount;

/// Extract the calculation fields of a record.
///
/// Quantity and price that do not parse count as zero. The source total is
/// kept whenever it parses, even if it disagrees with quantity × price;
/// otherwise the total is recomputed.
pub fn reconcile_row(record: &Record, columns: &ResolvedColumns) -> ReconciledRow {
    let text = |field: Field| record.value(columns.key(field)).trim().to_string();
    let amount = |field: Field| parse_amount(record.value(columns.key(field)));

    let quantity = amount(Field::Quantity).unwrap_or_default();
    let price = amount(Field::Price).unwrap_or_default();

    let (total, total_recomputed) = match amount(Field::Total) {
        Some(total) => (total, false),
        None => {
            let computed = quantity.checked_mul(price).unwrap_or(Decimal::ZERO);
            debug!(
                row = record.source_row,
                %quantity,
                %price,
                total = %computed,
                "recomputed missing total"
            );
            (computed, true)
        }
    };

    ReconciledRow {
        code: text(Field::Code),
        title: text(Field::Title),
        unit: text(Field::Unit),
        quantity,
        price,
        total,
        total_recomputed,
    }
}
