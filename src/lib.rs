pub mod cli;
pub mod config;
pub mod input;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod simulation;

pub mod prelude {
    pub use crate::config::loader::{SimulationConfig, load_simulation_config};
    pub use crate::model::dataset::RepertoireDataset;
    pub use crate::model::repertoire::Repertoire;
    pub use crate::model::sequence::ReceptorSequence;
    pub use crate::pipeline::stage1_load::DatasetCtx;
    pub use crate::simulation::implanter::SignalImplanter;
    pub use crate::simulation::state::SimulationState;
}
