use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::defs::{
    ImplantingDef, InstantiationDef, MotifDef, SequenceImplantingDef, SignalDef,
    SignalImplantingDef, SimulationDef,
};
use crate::simulation::healthy_sequence::HealthySequenceImplanting;
use crate::simulation::instantiation::{
    GapRange, GappedKmerInstantiation, HammingGappedKmerInstantiation,
};
use crate::simulation::motif::{Motif, MotifError, MotifInstantiation};
use crate::simulation::plan::{Implanting, PlanError, Simulation};
use crate::simulation::sequence_implanting::{
    GappedMotifImplanting, ImplantError, PositionWeights, SequenceImplantingStrategy,
};
use crate::simulation::signal::{Signal, SignalImplantingStrategy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("signal {signal} references unknown motif {motif}")]
    UnknownMotif { signal: String, motif: String },
    #[error("implanting {implanting} references unknown signal {signal}")]
    UnknownSignal { implanting: String, signal: String },
    #[error("invalid key {key:?} in {field}: {reason}")]
    InvalidKey {
        field: &'static str,
        key: String,
        reason: String,
    },
    #[error("motif error: {0}")]
    Motif(#[from] MotifError),
    #[error("signal error: {0}")]
    Implant(#[from] ImplantError),
    #[error("simulation plan error: {0}")]
    Plan(#[from] PlanError),
}

/// In-memory objects built from a simulation file.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub seed: Option<u64>,
    pub batch_size: Option<usize>,
    pub motifs: Vec<Motif>,
    pub signals: Vec<Signal>,
    pub simulation: Simulation,
    pub definition: SimulationDef,
}

pub fn load_simulation_config(path: &Path) -> Result<SimulationConfig, ConfigError> {
    let text = fs::read_to_string(path)?;
    parse_simulation_config(&text)
}

pub fn parse_simulation_config(text: &str) -> Result<SimulationConfig, ConfigError> {
    let definition: SimulationDef = toml::from_str(text)?;
    build_simulation_config(definition)
}

pub fn build_simulation_config(definition: SimulationDef) -> Result<SimulationConfig, ConfigError> {
    let mut motifs_by_id: HashMap<String, Motif> = HashMap::new();
    let mut motifs = Vec::with_capacity(definition.motifs.len());
    for def in &definition.motifs {
        let motif = build_motif(def)?;
        if motifs_by_id.insert(def.id.clone(), motif.clone()).is_some() {
            return Err(ConfigError::DuplicateId {
                kind: "motif",
                id: def.id.clone(),
            });
        }
        motifs.push(motif);
    }

    let mut signals_by_id: HashMap<String, Signal> = HashMap::new();
    let mut signals = Vec::with_capacity(definition.signals.len());
    for def in &definition.signals {
        let signal = build_signal(def, &motifs_by_id)?;
        if signals_by_id.insert(def.id.clone(), signal.clone()).is_some() {
            return Err(ConfigError::DuplicateId {
                kind: "signal",
                id: def.id.clone(),
            });
        }
        signals.push(signal);
    }

    let mut implantings = Vec::with_capacity(definition.implantings.len());
    for (index, def) in definition.implantings.iter().enumerate() {
        implantings.push(build_implanting(index, def, &signals_by_id)?);
    }
    let simulation = Simulation::new(implantings)?;

    Ok(SimulationConfig {
        seed: definition.seed,
        batch_size: definition.batch_size,
        motifs,
        signals,
        simulation,
        definition,
    })
}

fn build_motif(def: &MotifDef) -> Result<Motif, ConfigError> {
    let instantiation: Arc<dyn MotifInstantiation> = match &def.instantiation {
        InstantiationDef::GappedKmer { min_gap, max_gap } => {
            Arc::new(GappedKmerInstantiation::new(GapRange::new(*min_gap, *max_gap)))
        }
        InstantiationDef::HammingGappedKmer {
            min_gap,
            max_gap,
            hamming_distance_probabilities,
            position_weights,
            alphabet_weights,
        } => {
            let distances = parse_keys(
                "hamming_distance_probabilities",
                hamming_distance_probabilities,
                |k| k.trim().parse::<usize>().map_err(|e| e.to_string()),
            )?;
            let alphabet = match alphabet_weights {
                Some(weights) => Some(parse_keys("alphabet_weights", weights, parse_letter)?),
                None => None,
            };
            Arc::new(HammingGappedKmerInstantiation::new(
                GapRange::new(*min_gap, *max_gap),
                distances,
                position_weights.clone(),
                alphabet,
            ))
        }
    };
    Ok(Motif::new(def.id.clone(), &def.seed, instantiation)?)
}

fn build_signal(def: &SignalDef, motifs: &HashMap<String, Motif>) -> Result<Signal, ConfigError> {
    let mut signal_motifs = Vec::with_capacity(def.motifs.len());
    for motif_id in &def.motifs {
        let motif = motifs
            .get(motif_id.as_str())
            .ok_or_else(|| ConfigError::UnknownMotif {
                signal: def.id.clone(),
                motif: motif_id.clone(),
            })?;
        signal_motifs.push(motif.clone());
    }

    let strategy: Arc<dyn SignalImplantingStrategy> = match &def.implanting {
        SignalImplantingDef::HealthySequence {
            sequence_implanting,
            sequence_position_weights,
        } => {
            let sequence_implanting: Arc<dyn SequenceImplantingStrategy> = match sequence_implanting
            {
                SequenceImplantingDef::GappedMotif => Arc::new(GappedMotifImplanting),
            };
            let position_weights = match sequence_position_weights {
                Some(weights) => {
                    let parsed = parse_keys("sequence_position_weights", weights, |k| {
                        k.trim().parse::<usize>().map_err(|e| e.to_string())
                    })?;
                    Some(PositionWeights::new(parsed)?)
                }
                None => None,
            };
            Arc::new(HealthySequenceImplanting::new(
                sequence_implanting,
                position_weights,
            ))
        }
    };

    Ok(Signal::new(def.id.clone(), signal_motifs, strategy)?)
}

fn build_implanting(
    index: usize,
    def: &ImplantingDef,
    signals: &HashMap<String, Signal>,
) -> Result<Implanting, ConfigError> {
    let name = def
        .name
        .clone()
        .unwrap_or_else(|| format!("implanting_{}", index + 1));
    let mut rule_signals = Vec::with_capacity(def.signals.len());
    for signal_id in &def.signals {
        let signal = signals
            .get(signal_id.as_str())
            .ok_or_else(|| ConfigError::UnknownSignal {
                implanting: name.clone(),
                signal: signal_id.clone(),
            })?;
        rule_signals.push(signal.clone());
    }
    Ok(Implanting::new(
        name,
        def.dataset_implanting_rate,
        def.repertoire_implanting_rate,
        rule_signals,
    )?)
}

fn parse_letter(key: &str) -> Result<char, String> {
    let mut chars = key.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c.to_ascii_uppercase()),
        _ => Err("expected a single letter".to_string()),
    }
}

fn parse_keys<K, F>(
    field: &'static str,
    map: &BTreeMap<String, f64>,
    parse: F,
) -> Result<BTreeMap<K, f64>, ConfigError>
where
    K: Ord,
    F: Fn(&str) -> Result<K, String>,
{
    let mut out = BTreeMap::new();
    for (key, value) in map {
        let parsed = parse(key).map_err(|reason| ConfigError::InvalidKey {
            field,
            key: key.clone(),
            reason,
        })?;
        if out.insert(parsed, *value).is_some() {
            return Err(ConfigError::InvalidKey {
                field,
                key: key.clone(),
                reason: "duplicate key".to_string(),
            });
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/config/loader.rs"]
mod tests;
