use thiserror::Error;

use crate::config::loader::SimulationConfig;
use crate::model::dataset::RepertoireDataset;
use crate::simulation::implanter::{Assignment, SignalImplanter, SimulationError};
use crate::simulation::plan::Simulation;
use crate::simulation::signal::Signal;
use crate::simulation::state::{DEFAULT_BATCH_SIZE, DEFAULT_SEED, SimulationState};

#[derive(Debug, Error)]
pub enum Stage2Error {
    #[error("simulation error: {0}")]
    Simulation(#[from] SimulationError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimulateOptions {
    pub seed: Option<u64>,
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SimulateContext {
    pub input: RepertoireDataset,
    pub output: RepertoireDataset,
    pub assignment: Assignment,
    pub simulation: Simulation,
    pub signals: Vec<Signal>,
    pub seed: u64,
    pub batch_size: usize,
}

/// Command-line options win over the simulation file, which wins over the
/// defaults.
pub fn run_stage2(
    dataset: RepertoireDataset,
    config: &SimulationConfig,
    options: SimulateOptions,
) -> Result<SimulateContext, Stage2Error> {
    let seed = options.seed.or(config.seed).unwrap_or(DEFAULT_SEED);
    let batch_size = options
        .batch_size
        .or(config.batch_size)
        .unwrap_or(DEFAULT_BATCH_SIZE);

    let state = SimulationState::new(dataset, config.simulation.clone(), config.signals.clone())
        .with_seed(seed)
        .with_batch_size(batch_size);

    let outcome = SignalImplanter::execute(&state)?;

    Ok(SimulateContext {
        simulation: state.simulation,
        signals: state.signals,
        input: state.dataset,
        output: outcome.dataset,
        assignment: outcome.assignment,
        seed,
        batch_size,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_simulate.rs"]
mod tests;
