use std::fmt;
use std::sync::Arc;

use rand::RngCore;

use crate::model::repertoire::Repertoire;
use crate::simulation::motif::Motif;
use crate::simulation::sequence_implanting::ImplantError;

pub trait SignalImplantingStrategy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn implant_in_repertoire(
        &self,
        repertoire: &Repertoire,
        repertoire_implanting_rate: f64,
        signal: &Signal,
        rng: &mut dyn RngCore,
    ) -> Result<Repertoire, ImplantError>;
}

#[derive(Debug, Clone)]
pub struct Signal {
    pub identifier: String,
    motifs: Vec<Motif>,
    implanting_strategy: Arc<dyn SignalImplantingStrategy>,
}

impl Signal {
    pub fn new(
        identifier: impl Into<String>,
        motifs: Vec<Motif>,
        implanting_strategy: Arc<dyn SignalImplantingStrategy>,
    ) -> Result<Self, ImplantError> {
        let identifier = identifier.into();
        if motifs.is_empty() {
            return Err(ImplantError::Configuration(format!(
                "signal {identifier} has no motifs"
            )));
        }
        Ok(Self {
            identifier,
            motifs,
            implanting_strategy,
        })
    }

    pub fn motifs(&self) -> &[Motif] {
        &self.motifs
    }

    pub fn implanting_strategy(&self) -> &dyn SignalImplantingStrategy {
        self.implanting_strategy.as_ref()
    }

    pub fn max_motif_length(&self) -> usize {
        self.motifs.iter().map(Motif::max_length).max().unwrap_or(0)
    }

    pub fn implant_in_repertoire(
        &self,
        repertoire: &Repertoire,
        repertoire_implanting_rate: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Repertoire, ImplantError> {
        self.implanting_strategy
            .implant_in_repertoire(repertoire, repertoire_implanting_rate, self, rng)
    }
}
