use thiserror::Error;

use crate::simulation::signal::Signal;

const RATE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("implanting {name}: {field} must be within [0, 1], got {value}")]
    RateOutOfRange {
        name: String,
        field: &'static str,
        value: f64,
    },
    #[error("implanting {0} has no signals")]
    NoSignals(String),
    #[error("dataset implanting rates sum to {0}, which exceeds 1")]
    DatasetRatesExceedOne(f64),
    #[error("duplicate implanting name {0}")]
    DuplicateName(String),
}

#[derive(Debug, Clone)]
pub struct Implanting {
    pub name: String,
    pub dataset_implanting_rate: f64,
    pub repertoire_implanting_rate: f64,
    signals: Vec<Signal>,
}

impl Implanting {
    pub fn new(
        name: impl Into<String>,
        dataset_implanting_rate: f64,
        repertoire_implanting_rate: f64,
        signals: Vec<Signal>,
    ) -> Result<Self, PlanError> {
        let name = name.into();
        check_rate(&name, "dataset_implanting_rate", dataset_implanting_rate)?;
        check_rate(&name, "repertoire_implanting_rate", repertoire_implanting_rate)?;
        if signals.is_empty() {
            return Err(PlanError::NoSignals(name));
        }
        Ok(Self {
            name,
            dataset_implanting_rate,
            repertoire_implanting_rate,
            signals,
        })
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn contains_signal(&self, signal_id: &str) -> bool {
        self.signals.iter().any(|s| s.identifier == signal_id)
    }

    /// Repertoires this rule claims out of `repertoire_count`, rounded half
    /// away from zero.
    pub fn repertoire_quota(&self, repertoire_count: usize) -> usize {
        (self.dataset_implanting_rate * repertoire_count as f64).round() as usize
    }
}

fn check_rate(name: &str, field: &'static str, value: f64) -> Result<(), PlanError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(PlanError::RateOutOfRange {
            name: name.to_string(),
            field,
            value,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct Simulation {
    implantings: Vec<Implanting>,
}

impl Simulation {
    pub fn new(implantings: Vec<Implanting>) -> Result<Self, PlanError> {
        let total: f64 = implantings.iter().map(|i| i.dataset_implanting_rate).sum();
        if total > 1.0 + RATE_TOLERANCE {
            return Err(PlanError::DatasetRatesExceedOne(total));
        }
        for (i, implanting) in implantings.iter().enumerate() {
            if implantings[..i].iter().any(|o| o.name == implanting.name) {
                return Err(PlanError::DuplicateName(implanting.name.clone()));
            }
        }
        Ok(Self { implantings })
    }

    pub fn implantings(&self) -> &[Implanting] {
        &self.implantings
    }

    pub fn is_empty(&self) -> bool {
        self.implantings.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/simulation/plan.rs"]
mod tests;
