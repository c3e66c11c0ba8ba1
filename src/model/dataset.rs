use thiserror::Error;

use crate::model::repertoire::Repertoire;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("expected {expected} repertoires, got {found}")]
    CountMismatch { expected: usize, found: usize },
    #[error("repertoire identifier mismatch at index {index}: expected {expected}, found {found}")]
    IdentifierMismatch {
        index: usize,
        expected: String,
        found: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepertoireDataset {
    pub name: String,
    repertoires: Vec<Repertoire>,
}

impl RepertoireDataset {
    pub fn new(name: impl Into<String>, repertoires: Vec<Repertoire>) -> Self {
        Self {
            name: name.into(),
            repertoires,
        }
    }

    pub fn repertoires(&self) -> &[Repertoire] {
        &self.repertoires
    }

    pub fn len(&self) -> usize {
        self.repertoires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repertoires.is_empty()
    }

    pub fn example_ids(&self) -> Vec<&str> {
        self.repertoires
            .iter()
            .map(|r| r.identifier.as_str())
            .collect()
    }

    /// New dataset over `transformed`, which must carry this dataset's
    /// identifiers in the same order.
    pub fn rebuild(&self, transformed: Vec<Repertoire>) -> Result<Self, DatasetError> {
        if transformed.len() != self.repertoires.len() {
            return Err(DatasetError::CountMismatch {
                expected: self.repertoires.len(),
                found: transformed.len(),
            });
        }
        for (index, (original, next)) in self.repertoires.iter().zip(&transformed).enumerate() {
            if original.identifier != next.identifier {
                return Err(DatasetError::IdentifierMismatch {
                    index,
                    expected: original.identifier.clone(),
                    found: next.identifier.clone(),
                });
            }
        }
        Ok(Self {
            name: self.name.clone(),
            repertoires: transformed,
        })
    }

    pub fn into_repertoires(self) -> Vec<Repertoire> {
        self.repertoires
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/dataset.rs"]
mod tests;
