use std::sync::Arc;

use rand::RngCore;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::model::repertoire::Repertoire;
use crate::model::sequence::ReceptorSequence;
use crate::simulation::sequence_implanting::{
    ImplantError, PositionWeights, SequenceImplantingStrategy, SignalInfo,
};
use crate::simulation::signal::{Signal, SignalImplantingStrategy};

/// Implants only into sequences that carry no implant yet and are longer than
/// the signal's longest possible motif.
#[derive(Debug, Clone)]
pub struct HealthySequenceImplanting {
    sequence_implanting: Arc<dyn SequenceImplantingStrategy>,
    position_weights: Option<PositionWeights>,
}

impl HealthySequenceImplanting {
    pub fn new(
        sequence_implanting: Arc<dyn SequenceImplantingStrategy>,
        position_weights: Option<PositionWeights>,
    ) -> Self {
        Self {
            sequence_implanting,
            position_weights,
        }
    }

    pub fn position_weights(&self) -> Option<&PositionWeights> {
        self.position_weights.as_ref()
    }

    fn choose_sequences<'a>(
        &self,
        repertoire: &'a Repertoire,
        repertoire_implanting_rate: f64,
        signal: &Signal,
        rng: &mut dyn RngCore,
    ) -> Result<(Vec<&'a ReceptorSequence>, Vec<&'a ReceptorSequence>), ImplantError> {
        let max_motif_length = signal.max_motif_length();
        let requested = (repertoire_implanting_rate * repertoire.len() as f64).floor() as usize;

        let mut unusable = Vec::new();
        let mut candidates = Vec::new();
        for sequence in &repertoire.sequences {
            if sequence.has_implants() || sequence.len() <= max_motif_length {
                unusable.push(sequence);
            } else {
                candidates.push(sequence);
            }
        }

        if requested > candidates.len() {
            return Err(ImplantError::InsufficientEligibleSequences {
                repertoire_id: repertoire.identifier.clone(),
                signal_id: signal.identifier.clone(),
                requested,
                available: candidates.len(),
            });
        }

        candidates.shuffle(rng);
        let rest = candidates.split_off(requested);
        unusable.extend(rest);
        Ok((candidates, unusable))
    }

    fn implant_in_sequence(
        &self,
        sequence: &ReceptorSequence,
        signal: &Signal,
        rng: &mut dyn RngCore,
    ) -> Result<ReceptorSequence, ImplantError> {
        let motif = signal.motifs().choose(rng).ok_or_else(|| {
            ImplantError::Configuration(format!("signal {} has no motifs", signal.identifier))
        })?;
        let motif_instance = motif.instantiate(rng)?;
        self.sequence_implanting.implant(
            sequence,
            SignalInfo {
                signal_id: &signal.identifier,
                motif_id: &motif.identifier,
                motif_instance,
            },
            self.position_weights.as_ref(),
            rng,
        )
    }
}

impl SignalImplantingStrategy for HealthySequenceImplanting {
    fn name(&self) -> &'static str {
        "healthy_sequence"
    }

    fn implant_in_repertoire(
        &self,
        repertoire: &Repertoire,
        repertoire_implanting_rate: f64,
        signal: &Signal,
        rng: &mut dyn RngCore,
    ) -> Result<Repertoire, ImplantError> {
        let (targets, untouched) =
            self.choose_sequences(repertoire, repertoire_implanting_rate, signal, rng)?;

        let mut sequences: Vec<ReceptorSequence> = untouched.into_iter().cloned().collect();
        for sequence in targets {
            sequences.push(self.implant_in_sequence(sequence, signal, rng)?);
        }

        let metadata = repertoire.metadata.with_implant(&signal.identifier);
        Ok(repertoire.rebuilt(sequences, metadata))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/simulation/healthy_sequence.rs"]
mod tests;
