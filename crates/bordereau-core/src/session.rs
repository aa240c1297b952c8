use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BordereauError;
use crate::extraction::base_name;
use crate::model::{Dataset, Record};

/// Ordered set of dataset indices chosen for export.
///
/// Order is the order the user picked rows in; repeated indices keep their
/// first position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    indices: Vec<usize>,
}

impl Selection {
    /// Build a selection, checking every index against the dataset length.
    pub fn new<I>(indices: I, dataset_len: usize) -> Result<Selection, BordereauError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut out: Vec<usize> = Vec::new();
        for index in indices {
            if index >= dataset_len {
                return Err(BordereauError::SelectionOutOfRange {
                    index,
                    len: dataset_len,
                });
            }
            if !out.contains(&index) {
                out.push(index);
            }
        }
        Ok(Selection { indices: out })
    }

    /// Every row, in dataset order.
    pub fn all(dataset_len: usize) -> Selection {
        Selection {
            indices: (0..dataset_len).collect(),
        }
    }

    /// Parse a comma-separated list of indices and inclusive ranges,
    /// e.g. "4,1,7" or "0-3,9".
    pub fn parse(spec: &str, dataset_len: usize) -> Result<Selection, BordereauError> {
        let invalid = || BordereauError::InvalidSelection(spec.to_string());
        let mut indices = Vec::new();

        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((start, end)) => {
                    let start: usize = start.trim().parse().map_err(|_| invalid())?;
                    let end: usize = end.trim().parse().map_err(|_| invalid())?;
                    if start > end {
                        return Err(invalid());
                    }
                    if end >= dataset_len {
                        return Err(BordereauError::SelectionOutOfRange {
                            index: end,
                            len: dataset_len,
                        });
                    }
                    indices.extend(start..=end);
                }
                None => indices.push(part.parse().map_err(|_| invalid())?),
            }
        }

        Selection::new(indices, dataset_len)
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// State of one import: the dataset, where it came from, and the rows
/// currently selected.
///
/// Actions return a new Session; a fresh import replaces it entirely, which
/// also clears the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    source_name: String,
    dataset: Dataset,
    selection: Selection,
}

impl Session {
    pub fn new(source_name: impl Into<String>, dataset: Dataset) -> Session {
        Session {
            source_name: source_name.into(),
            dataset,
            selection: Selection::default(),
        }
    }

    /// Replace the selection, validating it against the dataset.
    pub fn select<I>(self, indices: I) -> Result<Session, BordereauError>
    where
        I: IntoIterator<Item = usize>,
    {
        let selection = Selection::new(indices, self.dataset.len())?;
        Ok(self.replace_selection(selection))
    }

    /// Adopt a prebuilt selection, checking it against this dataset.
    ///
    /// A selection built for an earlier import may point past the end of
    /// the current dataset and is rejected.
    pub fn with_selection(self, selection: Selection) -> Result<Session, BordereauError> {
        let selection = Selection::new(selection.indices, self.dataset.len())?;
        Ok(self.replace_selection(selection))
    }

    fn replace_selection(self, selection: Selection) -> Session {
        debug!(selected = selection.len(), "selection updated");
        Session { selection, ..self }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Stem of the imported file, used to name exports.
    pub fn base_name(&self) -> String {
        base_name(&self.source_name)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected records in selection order.
    pub fn selected_records(&self) -> Vec<&Record> {
        self.selection
            .indices()
            .iter()
            .filter_map(|&i| self.dataset.get(i))
            .collect()
    }
}
