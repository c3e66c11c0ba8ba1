use std::collections::HashSet;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::dataset::{DatasetError, RepertoireDataset};
use crate::model::repertoire::Repertoire;
use crate::simulation::plan::{Implanting, Simulation};
use crate::simulation::sequence_implanting::ImplantError;
use crate::simulation::state::SimulationState;

pub type SimRng = Xoshiro256PlusPlus;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid simulation state: {0}")]
    InvalidState(String),
    #[error(
        "implanting {rule} (rule {rule_index}) failed in repertoire {repertoire} for signal {signal}: {source}"
    )]
    Implant {
        rule: String,
        rule_index: usize,
        repertoire: String,
        signal: String,
        source: ImplantError,
    },
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub fn run_rng(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}

/// Per-repertoire RNG mixed from the run seed and the dataset index.
pub fn repertoire_rng(seed: u64, index: usize) -> SimRng {
    let mut z = seed ^ (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    SimRng::seed_from_u64(z ^ (z >> 31))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    rules: Vec<Option<usize>>,
    counts: Vec<usize>,
}

impl Assignment {
    pub fn rule_for(&self, repertoire_index: usize) -> Option<usize> {
        self.rules.get(repertoire_index).copied().flatten()
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn unassigned(&self) -> usize {
        self.rules.iter().filter(|r| r.is_none()).count()
    }
}

// Rules draw in order from one shuffled pool, so no repertoire is shared.
pub fn assign_repertoires(
    simulation: &Simulation,
    repertoire_count: usize,
    rng: &mut SimRng,
) -> Assignment {
    let mut pool: Vec<usize> = (0..repertoire_count).collect();
    pool.shuffle(rng);

    let mut rules = vec![None; repertoire_count];
    let mut counts = Vec::with_capacity(simulation.implantings().len());
    let mut cursor = 0usize;
    for (rule_index, implanting) in simulation.implantings().iter().enumerate() {
        let quota = implanting.repertoire_quota(repertoire_count);
        let take = quota.min(repertoire_count - cursor);
        if take < quota {
            warn!(
                rule = %implanting.name,
                quota,
                assigned = take,
                "repertoire pool exhausted by rounding; clamping rule quota"
            );
        }
        for &repertoire_index in &pool[cursor..cursor + take] {
            rules[repertoire_index] = Some(rule_index);
        }
        cursor += take;
        counts.push(take);
    }

    Assignment { rules, counts }
}

#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub dataset: RepertoireDataset,
    pub assignment: Assignment,
}

pub struct SignalImplanter;

impl SignalImplanter {
    pub fn run(state: &SimulationState) -> Result<RepertoireDataset, SimulationError> {
        Self::execute(state).map(|outcome| outcome.dataset)
    }

    pub fn execute(state: &SimulationState) -> Result<SimulationOutcome, SimulationError> {
        validate_state(state)?;

        let repertoires = state.dataset.repertoires();
        let mut rng = run_rng(state.seed);
        let assignment = assign_repertoires(&state.simulation, repertoires.len(), &mut rng);
        for (implanting, count) in state
            .simulation
            .implantings()
            .iter()
            .zip(assignment.counts())
        {
            info!(
                rule = %implanting.name,
                repertoires = *count,
                repertoire_implanting_rate = implanting.repertoire_implanting_rate,
                "assigned repertoires"
            );
        }
        info!(unassigned = assignment.unassigned(), "repertoires passed through");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(state.batch_size)
            .build()?;
        let processed = pool.install(|| {
            repertoires
                .par_iter()
                .enumerate()
                .map(|(index, repertoire)| process_repertoire(state, &assignment, index, repertoire))
                .collect::<Result<Vec<_>, _>>()
        })?;

        Ok(SimulationOutcome {
            dataset: state.dataset.rebuild(processed)?,
            assignment,
        })
    }
}

fn validate_state(state: &SimulationState) -> Result<(), SimulationError> {
    if state.batch_size == 0 {
        return Err(SimulationError::InvalidState(
            "batch size must be at least 1".to_string(),
        ));
    }

    let mut known = HashSet::new();
    for id in state.signal_ids() {
        if !known.insert(id) {
            return Err(SimulationError::InvalidState(format!(
                "signal {id} is listed more than once"
            )));
        }
    }

    for implanting in state.simulation.implantings() {
        for signal in implanting.signals() {
            if !known.contains(signal.identifier.as_str()) {
                return Err(SimulationError::InvalidState(format!(
                    "implanting {} uses signal {} which is not among the known signals",
                    implanting.name, signal.identifier
                )));
            }
        }
    }
    Ok(())
}

fn process_repertoire(
    state: &SimulationState,
    assignment: &Assignment,
    index: usize,
    repertoire: &Repertoire,
) -> Result<Repertoire, SimulationError> {
    let mut rng = repertoire_rng(state.seed, index);
    let rule: Option<(usize, &Implanting)> = assignment
        .rule_for(index)
        .map(|i| (i, &state.simulation.implantings()[i]));

    let mut current: Option<Repertoire> = None;
    if let Some((rule_index, implanting)) = rule {
        for signal in implanting.signals() {
            let source = current.as_ref().unwrap_or(repertoire);
            let next = signal
                .implant_in_repertoire(source, implanting.repertoire_implanting_rate, &mut rng)
                .map_err(|source| SimulationError::Implant {
                    rule: implanting.name.clone(),
                    rule_index,
                    repertoire: repertoire.identifier.clone(),
                    signal: signal.identifier.clone(),
                    source,
                })?;
            current = Some(next);
        }
    }

    let output = match current {
        Some(implanted) => implanted,
        None => repertoire.clone(),
    };
    debug!(
        repertoire = %output.identifier,
        rule = rule.map(|(_, r)| r.name.as_str()).unwrap_or("."),
        implanted_sequences = output.implanted_sequence_count(),
        "processed repertoire"
    );

    let flags = state.signals.iter().map(|signal| {
        let present = rule.is_some_and(|(_, r)| r.contains_signal(&signal.identifier));
        (signal.identifier.as_str(), present)
    });
    Ok(output.with_labels(flags))
}

#[cfg(test)]
#[path = "../../tests/src_inline/simulation/implanter.rs"]
mod tests;
