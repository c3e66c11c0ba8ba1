use std::fmt;
use std::sync::Arc;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const GAP_MARKER: char = '/';

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotifError {
    #[error("invalid motif configuration for {motif_id}: {reason}")]
    InvalidMotifConfiguration { motif_id: String, reason: String },
}

impl MotifError {
    pub fn invalid(motif_id: &str, reason: impl Into<String>) -> Self {
        MotifError::InvalidMotifConfiguration {
            motif_id: motif_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Parsed motif seed: residues with the gap marker removed, plus the residue
/// index the gap follows (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotifSeed {
    raw: String,
    residues: Vec<char>,
    gap_after: Option<usize>,
}

impl MotifSeed {
    pub fn parse(motif_id: &str, raw: &str) -> Result<Self, MotifError> {
        let mut residues = Vec::with_capacity(raw.len());
        let mut gap_after = None;
        for c in raw.chars() {
            if c == GAP_MARKER {
                if gap_after.is_some() {
                    return Err(MotifError::invalid(
                        motif_id,
                        format!("seed {raw} contains more than one gap marker"),
                    ));
                }
                gap_after = Some(residues.len());
            } else if c.is_ascii_alphabetic() {
                residues.push(c.to_ascii_uppercase());
            } else {
                return Err(MotifError::invalid(
                    motif_id,
                    format!("seed {raw} contains invalid residue {c:?}"),
                ));
            }
        }

        if residues.is_empty() {
            return Err(MotifError::invalid(motif_id, "seed is empty"));
        }
        if let Some(split) = gap_after
            && (split == 0 || split == residues.len())
        {
            return Err(MotifError::invalid(
                motif_id,
                format!("gap marker in seed {raw} needs residues on both sides"),
            ));
        }

        Ok(Self {
            raw: raw.to_string(),
            residues,
            gap_after,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn residues(&self) -> &[char] {
        &self.residues
    }

    pub fn gap_after(&self) -> Option<usize> {
        self.gap_after
    }

    pub fn has_gap(&self) -> bool {
        self.gap_after.is_some()
    }

    pub fn render(&self, residues: &[char]) -> String {
        let mut out = String::with_capacity(residues.len() + 1);
        for (i, c) in residues.iter().enumerate() {
            if self.gap_after == Some(i) {
                out.push(GAP_MARKER);
            }
            out.push(*c);
        }
        out
    }
}

/// Concrete motif text, generated fresh for every implant. `instance` keeps
/// the gap marker when the seed had one; `gap` is the number of original
/// residues left in place between the two halves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotifInstance {
    pub instance: String,
    pub gap: usize,
}

impl MotifInstance {
    pub fn new(instance: impl Into<String>, gap: usize) -> Self {
        Self {
            instance: instance.into(),
            gap,
        }
    }

    pub fn left(&self) -> &str {
        match self.instance.split_once(GAP_MARKER) {
            Some((left, _)) => left,
            None => &self.instance,
        }
    }

    pub fn right(&self) -> &str {
        match self.instance.split_once(GAP_MARKER) {
            Some((_, right)) => right,
            None => "",
        }
    }

    pub fn span(&self) -> usize {
        self.left().chars().count() + self.gap + self.right().chars().count()
    }
}

impl fmt::Display for MotifInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.instance)?;
        if self.instance.contains(GAP_MARKER) {
            write!(f, "[gap={}]", self.gap)?;
        }
        Ok(())
    }
}

pub trait MotifInstantiation: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn validate(&self, motif_id: &str, seed: &MotifSeed) -> Result<(), MotifError>;

    fn max_gap(&self) -> usize;

    fn instantiate(
        &self,
        motif_id: &str,
        seed: &MotifSeed,
        rng: &mut dyn RngCore,
    ) -> Result<MotifInstance, MotifError>;
}

#[derive(Debug, Clone)]
pub struct Motif {
    pub identifier: String,
    seed: MotifSeed,
    instantiation: Arc<dyn MotifInstantiation>,
}

impl Motif {
    pub fn new(
        identifier: impl Into<String>,
        seed: &str,
        instantiation: Arc<dyn MotifInstantiation>,
    ) -> Result<Self, MotifError> {
        let identifier = identifier.into();
        let seed = MotifSeed::parse(&identifier, seed)?;
        instantiation.validate(&identifier, &seed)?;
        Ok(Self {
            identifier,
            seed,
            instantiation,
        })
    }

    pub fn seed(&self) -> &MotifSeed {
        &self.seed
    }

    pub fn instantiation(&self) -> &dyn MotifInstantiation {
        self.instantiation.as_ref()
    }

    pub fn max_length(&self) -> usize {
        self.seed.residues().len() + self.instantiation.max_gap()
    }

    pub fn instantiate(&self, rng: &mut dyn RngCore) -> Result<MotifInstance, MotifError> {
        self.instantiation
            .instantiate(&self.identifier, &self.seed, rng)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/simulation/motif.rs"]
mod tests;
