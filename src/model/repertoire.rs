use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::sequence::ReceptorSequence;

pub const SIGNAL_LABEL_PREFIX: &str = "signal_";

pub fn signal_label(signal_id: &str) -> String {
    format!("{}{}", SIGNAL_LABEL_PREFIX, signal_id)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub subject_id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub custom_params: BTreeMap<String, String>,
}

/// Repertoire-level implant record; details live on the sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepertoireImplant {
    pub signal_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepertoireMetadata {
    #[serde(default)]
    pub sample: Sample,
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
    #[serde(default)]
    pub implants: Vec<RepertoireImplant>,
    #[serde(default)]
    pub labels: BTreeMap<String, bool>,
}

impl RepertoireMetadata {
    pub fn with_implant(&self, signal_id: &str) -> Self {
        let mut next = self.clone();
        next.implants.push(RepertoireImplant {
            signal_id: signal_id.to_string(),
        });
        next
    }

    pub fn signal_flag(&self, signal_id: &str) -> Option<bool> {
        self.labels.get(&signal_label(signal_id)).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repertoire {
    pub identifier: String,
    pub sequences: Vec<ReceptorSequence>,
    pub metadata: RepertoireMetadata,
}

impl Repertoire {
    pub fn new(
        identifier: impl Into<String>,
        sequences: Vec<ReceptorSequence>,
        metadata: RepertoireMetadata,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            sequences,
            metadata,
        }
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Fresh repertoire with the same identity and the given content.
    pub fn rebuilt(&self, sequences: Vec<ReceptorSequence>, metadata: RepertoireMetadata) -> Self {
        Self {
            identifier: self.identifier.clone(),
            sequences,
            metadata,
        }
    }

    /// Sets one `signal_<id>` label per known signal.
    pub fn with_labels<'a, I>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        for (signal_id, present) in flags {
            self.metadata
                .labels
                .insert(signal_label(signal_id), present);
        }
        self
    }

    pub fn implanted_sequence_count(&self) -> usize {
        self.sequences.iter().filter(|s| s.has_implants()).count()
    }
}
