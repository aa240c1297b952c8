use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use crate::parsing::normalize::matches_marker;

/// Semantic fields an export needs from each record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Code,
    Title,
    Unit,
    Quantity,
    Price,
    Total,
    Description,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Code,
        Field::Title,
        Field::Unit,
        Field::Quantity,
        Field::Price,
        Field::Total,
        Field::Description,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Code => "code",
            Field::Title => "title",
            Field::Unit => "unit",
            Field::Quantity => "quantity",
            Field::Price => "price",
            Field::Total => "total",
            Field::Description => "description",
        };
        write!(f, "{name}")
    }
}

/// How one field is located among the header keys.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    /// Substrings looked for in normalized keys, highest priority first.
    pub markers: &'static [&'static str],
    /// Key used when nothing matches.
    pub default_key: &'static str,
}

/// Marker table, in resolution order.
///
/// "motant" is a misspelling found in real source files.
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: Field::Code,
        markers: &["n° prix", "code"],
        default_key: "n° prix",
    },
    FieldRule {
        field: Field::Title,
        markers: &["designation", "libelle"],
        default_key: "designation",
    },
    FieldRule {
        field: Field::Unit,
        markers: &["unite"],
        default_key: "unite",
    },
    FieldRule {
        field: Field::Quantity,
        markers: &["quantit", "qte"],
        default_key: "quantite",
    },
    FieldRule {
        field: Field::Price,
        markers: &["p.u", "prix unitaire"],
        default_key: "p.u dh.ht",
    },
    FieldRule {
        field: Field::Total,
        markers: &["montant total h.t", "montant total", "motant", "montant"],
        default_key: "montant total ht",
    },
    FieldRule {
        field: Field::Description,
        markers: &["descriptif", "description"],
        default_key: "descriptif",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedColumn {
    pub key: String,
    /// True when no key matched and the default label was used.
    pub defaulted: bool,
}

/// Mapping from semantic field to the record key that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedColumns {
    columns: BTreeMap<Field, ResolvedColumn>,
}

impl ResolvedColumns {
    pub fn get(&self, field: Field) -> &ResolvedColumn {
        // Every field is inserted by resolve_columns().
        &self.columns[&field]
    }

    pub fn key(&self, field: Field) -> &str {
        &self.get(field).key
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &ResolvedColumn)> {
        self.columns.iter().map(|(f, c)| (*f, c))
    }

    pub fn defaulted(&self) -> Vec<Field> {
        self.iter()
            .filter(|(_, c)| c.defaulted)
            .map(|(f, _)| f)
            .collect()
    }
}

/// Resolve each semantic field to a concrete key.
///
/// Markers are tried in priority order; for a given marker the first key
/// in key order wins. Unmatched fields fall back to their default label,
/// which is simply absent from the records and reads as empty downstream.
pub fn resolve_columns<'a, I>(sample_keys: I) -> ResolvedColumns
where
    I: IntoIterator<Item = &'a str>,
{
    let keys: Vec<&str> = sample_keys.into_iter().collect();
    let mut columns = BTreeMap::new();

    for rule in FIELD_RULES {
        let found = rule
            .markers
            .iter()
            .find_map(|marker| keys.iter().find(|k| matches_marker(k, marker)));

        let resolved = match found {
            Some(key) => {
                debug!(field = %rule.field, key, "resolved column");
                ResolvedColumn {
                    key: key.to_string(),
                    defaulted: false,
                }
            }
            None => {
                warn!(
                    field = %rule.field,
                    default = rule.default_key,
                    "no matching column, using default label"
                );
                ResolvedColumn {
                    key: rule.default_key.to_string(),
                    defaulted: true,
                }
            }
        };
        columns.insert(rule.field, resolved);
    }

    ResolvedColumns { columns }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typical_keys() -> Vec<&'static str> {
        vec![
            "n° prix",
            "designation des ouvrages",
            "unite",
            "quantite",
            "p.u dh.ht",
            "montant total ht",
            "descriptif technique",
        ]
    }

    #[test]
    fn test_resolves_typical_headers() {
        let cols = resolve_columns(typical_keys());
        assert_eq!(cols.key(Field::Code), "n° prix");
        assert_eq!(cols.key(Field::Title), "designation des ouvrages");
        assert_eq!(cols.key(Field::Unit), "unite");
        assert_eq!(cols.key(Field::Quantity), "quantite");
        assert_eq!(cols.key(Field::Price), "p.u dh.ht");
        assert_eq!(cols.key(Field::Total), "montant total ht");
        assert_eq!(cols.key(Field::Description), "descriptif technique");
        assert!(cols.defaulted().is_empty());
    }

    #[test]
    fn test_misspelled_total() {
        let cols = resolve_columns(["n° prix", "motant"]);
        assert_eq!(cols.key(Field::Total), "motant");
    }

    #[test]
    fn test_marker_priority_beats_key_order() {
        // "montant" alone is the weakest marker for the total.
        let cols = resolve_columns(["montant tva", "montant total h.t"]);
        assert_eq!(cols.key(Field::Total), "montant total h.t");
    }

    #[test]
    fn test_first_key_wins_for_same_marker() {
        let cols = resolve_columns(["quantite prevue", "quantite realisee"]);
        assert_eq!(cols.key(Field::Quantity), "quantite prevue");
    }

    #[test]
    fn test_unmatched_fields_fall_back() {
        let cols = resolve_columns(["n° prix", "designation"]);
        let price = cols.get(Field::Price);
        assert_eq!(price.key, "p.u dh.ht");
        assert!(price.defaulted);
        assert_eq!(
            cols.defaulted(),
            vec![
                Field::Unit,
                Field::Quantity,
                Field::Price,
                Field::Total,
                Field::Description
            ]
        );
    }

    #[test]
    fn test_every_field_resolved() {
        let cols = resolve_columns(std::iter::empty());
        assert_eq!(cols.iter().count(), Field::ALL.len());
    }
}
