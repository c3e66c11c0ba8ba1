use crate::model::dataset::RepertoireDataset;
use crate::simulation::plan::Simulation;
use crate::simulation::signal::Signal;

pub const DEFAULT_BATCH_SIZE: usize = 4;
pub const DEFAULT_SEED: u64 = 0;

// `signals` is every known signal, not only the ones rules reference.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub dataset: RepertoireDataset,
    pub simulation: Simulation,
    pub signals: Vec<Signal>,
    pub batch_size: usize,
    pub seed: u64,
}

impl SimulationState {
    pub fn new(
        dataset: RepertoireDataset,
        simulation: Simulation,
        signals: Vec<Signal>,
    ) -> Self {
        Self {
            dataset,
            simulation,
            signals,
            batch_size: DEFAULT_BATCH_SIZE,
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn signal_ids(&self) -> impl Iterator<Item = &str> {
        self.signals.iter().map(|s| s.identifier.as_str())
    }
}
