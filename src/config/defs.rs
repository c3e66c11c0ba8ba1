use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InstantiationDef {
    GappedKmer {
        #[serde(default)]
        min_gap: usize,
        #[serde(default)]
        max_gap: usize,
    },
    HammingGappedKmer {
        #[serde(default)]
        min_gap: usize,
        #[serde(default)]
        max_gap: usize,
        hamming_distance_probabilities: BTreeMap<String, f64>,
        #[serde(default)]
        position_weights: Option<Vec<f64>>,
        #[serde(default)]
        alphabet_weights: Option<BTreeMap<String, f64>>,
    },
}

impl Default for InstantiationDef {
    fn default() -> Self {
        InstantiationDef::GappedKmer {
            min_gap: 0,
            max_gap: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MotifDef {
    pub id: String,
    pub seed: String,
    #[serde(default)]
    pub instantiation: InstantiationDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SequenceImplantingDef {
    #[default]
    GappedMotif,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalImplantingDef {
    HealthySequence {
        #[serde(default)]
        sequence_implanting: SequenceImplantingDef,
        #[serde(default)]
        sequence_position_weights: Option<BTreeMap<String, f64>>,
    },
}

impl Default for SignalImplantingDef {
    fn default() -> Self {
        SignalImplantingDef::HealthySequence {
            sequence_implanting: SequenceImplantingDef::default(),
            sequence_position_weights: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalDef {
    pub id: String,
    pub motifs: Vec<String>,
    #[serde(default)]
    pub implanting: SignalImplantingDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImplantingDef {
    #[serde(default)]
    pub name: Option<String>,
    pub dataset_implanting_rate: f64,
    pub repertoire_implanting_rate: f64,
    pub signals: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SimulationDef {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default, rename = "motif")]
    pub motifs: Vec<MotifDef>,
    #[serde(default, rename = "signal")]
    pub signals: Vec<SignalDef>,
    #[serde(default, rename = "implanting")]
    pub implantings: Vec<ImplantingDef>,
}
