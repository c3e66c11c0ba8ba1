use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::simulation::motif::MotifInstance;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceMetadata {
    pub v_gene: Option<String>,
    pub j_gene: Option<String>,
    pub chain: Option<String>,
    pub count: Option<u64>,
    pub region_type: Option<String>,
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
}

/// Provenance of a single motif splice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplantAnnotation {
    pub signal_id: String,
    pub motif_id: String,
    pub motif_instance: MotifInstance,
    pub position: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceAnnotation {
    #[serde(default)]
    pub implants: Vec<ImplantAnnotation>,
}

impl SequenceAnnotation {
    pub fn has_implants(&self) -> bool {
        !self.implants.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceptorSequence {
    pub identifier: String,
    pub amino_acid_sequence: String,
    pub nucleotide_sequence: Option<String>,
    #[serde(default)]
    pub metadata: SequenceMetadata,
    #[serde(default)]
    pub annotation: SequenceAnnotation,
}

impl ReceptorSequence {
    pub fn new(identifier: impl Into<String>, amino_acid_sequence: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            amino_acid_sequence: amino_acid_sequence.into(),
            nucleotide_sequence: None,
            metadata: SequenceMetadata::default(),
            annotation: SequenceAnnotation::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: SequenceMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_nucleotide_sequence(mut self, nucleotide_sequence: impl Into<String>) -> Self {
        self.nucleotide_sequence = Some(nucleotide_sequence.into());
        self
    }

    pub fn sequence(&self) -> &str {
        &self.amino_acid_sequence
    }

    /// Residue count, not byte length.
    pub fn len(&self) -> usize {
        self.amino_acid_sequence.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.amino_acid_sequence.is_empty()
    }

    pub fn has_implants(&self) -> bool {
        self.annotation.has_implants()
    }

    /// Builds the sequence that results from an implant. The nucleotide string
    /// is dropped since it no longer encodes the rewritten residues.
    pub fn implanted(&self, amino_acid_sequence: String, implant: ImplantAnnotation) -> Self {
        let mut implants = self.annotation.implants.clone();
        implants.push(implant);
        Self {
            identifier: self.identifier.clone(),
            amino_acid_sequence,
            nucleotide_sequence: None,
            metadata: self.metadata.clone(),
            annotation: SequenceAnnotation { implants },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/sequence.rs"]
mod tests;
