use bordereau_core::model::{Dataset, ReconciledRow};
use bordereau_core::parsing::columns::{Field, ResolvedColumns};
use rust_decimal::Decimal;
use std::fmt::Write;

pub fn print_items(source: &str, rows: &[ReconciledRow]) {
    print!("{}", format_items(source, rows));
}

pub fn print_columns(dataset: &Dataset, columns: &ResolvedColumns) {
    print!("{}", format_columns(dataset, columns));
}

/// One line per item: index, code, title, unit and the three amounts.
/// Recomputed totals are marked with `*`.
pub fn format_items(source: &str, rows: &[ReconciledRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {source} ({} item(s)) ===\n", rows.len());

    let code_width = rows
        .iter()
        .map(|r| r.code.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    let title_width = rows
        .iter()
        .map(|r| r.title.chars().count().min(48))
        .max()
        .unwrap_or(0)
        .max(5);

    let _ = writeln!(
        out,
        "  {:>5}  {:<code_width$}  {:<title_width$}  {:<6}  {:>12}  {:>12}  {:>14}",
        "#", "Code", "Title", "Unit", "Quantity", "Price", "Total"
    );

    let mut recomputed = 0;
    for (index, row) in rows.iter().enumerate() {
        let marker = if row.total_recomputed {
            recomputed += 1;
            "*"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {:>5}  {:<code_width$}  {:<title_width$}  {:<6}  {:>12}  {:>12}  {:>14}{}",
            index,
            row.code,
            truncate(&row.title, 48),
            row.unit,
            amount(row.quantity),
            amount(row.price),
            amount(row.total),
            marker,
        );
    }

    let grand_total: Decimal = rows.iter().map(|r| r.total).sum();
    let _ = writeln!(out, "\n  Total HT: {}", amount(grand_total));
    if recomputed > 0 {
        let _ = writeln!(out, "  * {recomputed} total(s) computed as quantity x price");
    }
    out
}

/// Header row, keys with their source labels, then the field resolution.
pub fn format_columns(dataset: &Dataset, columns: &ResolvedColumns) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Header row: {}\n", dataset.header_row);

    let key_width = dataset
        .headers
        .iter()
        .map(|h| h.key.chars().count())
        .max()
        .unwrap_or(0);
    for header in &dataset.headers {
        let _ = writeln!(out, "  {:<key_width$}  <- {}", header.key, header.label);
    }

    let _ = writeln!(out, "\nColumns:");
    for field in Field::ALL {
        let column = columns.get(field);
        let note = match dataset.label_for(&column.key) {
            _ if column.defaulted => "  (default, not found)".to_string(),
            Some(label) if label != column.key => format!("  [{label}]"),
            _ => String::new(),
        };
        let _ = writeln!(out, "  {:<12} {}{}", field.to_string(), column.key, note);
    }
    out
}

fn amount(d: Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut t: String = s.chars().take(max.saturating_sub(3)).collect();
    t.push_str("...");
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use bordereau_core::model::{Header, Record};
    use bordereau_core::parsing::columns::resolve_columns;
    use rust_decimal_macros::dec;

    fn row(code: &str, title: &str, total: Decimal, recomputed: bool) -> ReconciledRow {
        ReconciledRow {
            code: code.into(),
            title: title.into(),
            unit: "m3".into(),
            quantity: dec!(3),
            price: dec!(10.5),
            total,
            total_recomputed: recomputed,
        }
    }

    #[test]
    fn test_items_table() {
        let rows = vec![
            row("101", "Fouilles", dec!(31.5), true),
            row("102", "Remblai", dec!(999), false),
        ];
        let out = format_items("lot2.xlsx", &rows);

        assert!(out.contains("=== lot2.xlsx (2 item(s)) ==="));
        assert!(out.contains("Fouilles"));
        assert!(out.contains("31.50*"));
        assert!(out.contains("999.00"));
        assert!(out.contains("Total HT: 1030.50"));
        assert!(out.contains("1 total(s) computed"));
    }

    #[test]
    fn test_long_title_truncated() {
        let title = "x".repeat(80);
        let out = format_items("a.xlsx", &[row("1", &title, dec!(1), false)]);
        assert!(out.contains(&format!("{}...", "x".repeat(45))));
        assert!(!out.contains(&title));
    }

    #[test]
    fn test_columns_table_marks_defaults() {
        let dataset = Dataset::new(
            0,
            vec![
                Header {
                    key: "n° prix".into(),
                    label: "N° Prix".into(),
                },
                Header {
                    key: "designation".into(),
                    label: "Désignation".into(),
                },
            ],
            vec![Record::new(
                1,
                vec![
                    ("n° prix".into(), "1".into()),
                    ("designation".into(), "Fouilles".into()),
                ],
            )],
        )
        .unwrap();
        let columns = resolve_columns(dataset.sample_keys());
        let out = format_columns(&dataset, &columns);

        assert!(out.contains("Header row: 0"));
        assert!(out.contains("<- Désignation"));
        assert!(out.contains("unite  (default, not found)"));
        assert!(out.contains("designation  [Désignation]"));
        assert!(!out.contains("designation  (default"));
    }
}
