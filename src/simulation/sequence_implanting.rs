use std::collections::BTreeMap;
use std::fmt;

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::{Rng, RngCore};
use thiserror::Error;

use crate::model::sequence::{ImplantAnnotation, ReceptorSequence};
use crate::simulation::motif::{MotifError, MotifInstance};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ImplantError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(
        "repertoire {repertoire_id}: signal {signal_id} needs {requested} sequences but only {available} are eligible; reduce the repertoire implanting rate"
    )]
    InsufficientEligibleSequences {
        repertoire_id: String,
        signal_id: String,
        requested: usize,
        available: usize,
    },
    #[error(
        "signal {signal_id}: no valid implant position for motif {motif_instance} (span {span}) in sequence {sequence_id} of length {sequence_length}"
    )]
    NoValidImplantPosition {
        signal_id: String,
        sequence_id: String,
        motif_instance: String,
        span: usize,
        sequence_length: usize,
    },
    #[error("motif error: {0}")]
    Motif(#[from] MotifError),
}

/// Relative weight per 0-based sequence position. Positions missing from the
/// map are never chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionWeights {
    weights: BTreeMap<usize, f64>,
}

impl PositionWeights {
    pub fn new(weights: BTreeMap<usize, f64>) -> Result<Self, ImplantError> {
        if weights.is_empty() {
            return Err(ImplantError::Configuration(
                "position weight map is empty".to_string(),
            ));
        }
        let mut total = 0.0;
        for (position, weight) in &weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ImplantError::Configuration(format!(
                    "position {position} has invalid weight {weight}"
                )));
            }
            total += weight;
        }
        if total <= 0.0 {
            return Err(ImplantError::Configuration(
                "position weights sum to zero".to_string(),
            ));
        }
        Ok(Self { weights })
    }

    pub fn weight(&self, position: usize) -> f64 {
        self.weights.get(&position).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.weights.iter().map(|(p, w)| (*p, *w))
    }
}

#[derive(Debug, Clone)]
pub struct SignalInfo<'a> {
    pub signal_id: &'a str,
    pub motif_id: &'a str,
    pub motif_instance: MotifInstance,
}

pub trait SequenceImplantingStrategy: fmt::Debug + Send + Sync {
    fn implant(
        &self,
        sequence: &ReceptorSequence,
        signal: SignalInfo<'_>,
        position_weights: Option<&PositionWeights>,
        rng: &mut dyn RngCore,
    ) -> Result<ReceptorSequence, ImplantError>;
}

/// Overwrites sequence residues with the motif halves; residues under the gap
/// stay as they were, so the sequence length never changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct GappedMotifImplanting;

impl GappedMotifImplanting {
    pub fn valid_positions(sequence_length: usize, span: usize) -> Vec<usize> {
        if span == 0 || span > sequence_length {
            return Vec::new();
        }
        (0..=sequence_length - span).collect()
    }

    fn choose_position(
        candidates: &[usize],
        position_weights: Option<&PositionWeights>,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        match position_weights {
            None => {
                if candidates.is_empty() {
                    None
                } else {
                    Some(candidates[rng.random_range(0..candidates.len())])
                }
            }
            Some(weights) => {
                let w: Vec<f64> = candidates.iter().map(|p| weights.weight(*p)).collect();
                let index = WeightedIndex::<f64>::new(&w).ok()?;
                Some(candidates[index.sample(rng)])
            }
        }
    }

    pub fn splice(residues: &[char], position: usize, instance: &MotifInstance) -> String {
        let left: Vec<char> = instance.left().chars().collect();
        let right: Vec<char> = instance.right().chars().collect();
        let gap_start = position + left.len();
        let gap_end = gap_start + instance.gap;
        let right_end = gap_end + right.len();

        let mut out = String::with_capacity(residues.len());
        out.extend(&residues[..position]);
        out.extend(&left);
        out.extend(&residues[gap_start..gap_end]);
        out.extend(&right);
        out.extend(&residues[right_end..]);
        out
    }
}

impl SequenceImplantingStrategy for GappedMotifImplanting {
    fn implant(
        &self,
        sequence: &ReceptorSequence,
        signal: SignalInfo<'_>,
        position_weights: Option<&PositionWeights>,
        rng: &mut dyn RngCore,
    ) -> Result<ReceptorSequence, ImplantError> {
        let residues: Vec<char> = sequence.sequence().chars().collect();
        let span = signal.motif_instance.span();
        let candidates = Self::valid_positions(residues.len(), span);

        let position = Self::choose_position(&candidates, position_weights, rng).ok_or_else(
            || ImplantError::NoValidImplantPosition {
                signal_id: signal.signal_id.to_string(),
                sequence_id: sequence.identifier.clone(),
                motif_instance: signal.motif_instance.to_string(),
                span,
                sequence_length: residues.len(),
            },
        )?;

        let new_sequence = Self::splice(&residues, position, &signal.motif_instance);
        Ok(sequence.implanted(
            new_sequence,
            ImplantAnnotation {
                signal_id: signal.signal_id.to_string(),
                motif_id: signal.motif_id.to_string(),
                motif_instance: signal.motif_instance,
                position,
            },
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/simulation/sequence_implanting.rs"]
mod tests;
