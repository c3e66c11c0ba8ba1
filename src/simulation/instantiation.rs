use std::collections::BTreeMap;

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::{Rng, RngCore};

use crate::simulation::motif::{MotifError, MotifInstance, MotifInstantiation, MotifSeed};

pub const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GapRange {
    pub min_gap: usize,
    pub max_gap: usize,
}

impl GapRange {
    pub fn new(min_gap: usize, max_gap: usize) -> Self {
        Self { min_gap, max_gap }
    }

    fn validate(&self, motif_id: &str, seed: &MotifSeed) -> Result<(), MotifError> {
        if self.min_gap > self.max_gap {
            return Err(MotifError::invalid(
                motif_id,
                format!("min_gap {} exceeds max_gap {}", self.min_gap, self.max_gap),
            ));
        }
        if self.max_gap > 0 && !seed.has_gap() {
            let reason = if seed.residues().len() == 1 {
                format!("seed {} has one residue, no room for a gap", seed.as_str())
            } else {
                format!(
                    "gap range {}..={} configured but seed {} has no gap marker",
                    self.min_gap,
                    self.max_gap,
                    seed.as_str()
                )
            };
            return Err(MotifError::invalid(motif_id, reason));
        }
        Ok(())
    }

    fn draw(&self, seed: &MotifSeed, rng: &mut dyn RngCore) -> usize {
        if !seed.has_gap() || self.min_gap == self.max_gap {
            return self.min_gap;
        }
        rng.random_range(self.min_gap..=self.max_gap)
    }
}

/// Seed residues verbatim, with a uniformly drawn gap.
#[derive(Debug, Clone, Default)]
pub struct GappedKmerInstantiation {
    pub gaps: GapRange,
}

impl GappedKmerInstantiation {
    pub fn new(gaps: GapRange) -> Self {
        Self { gaps }
    }
}

impl MotifInstantiation for GappedKmerInstantiation {
    fn name(&self) -> &'static str {
        "gapped_kmer"
    }

    fn validate(&self, motif_id: &str, seed: &MotifSeed) -> Result<(), MotifError> {
        self.gaps.validate(motif_id, seed)
    }

    fn max_gap(&self) -> usize {
        self.gaps.max_gap
    }

    fn instantiate(
        &self,
        _motif_id: &str,
        seed: &MotifSeed,
        rng: &mut dyn RngCore,
    ) -> Result<MotifInstance, MotifError> {
        let gap = self.gaps.draw(seed, rng);
        Ok(MotifInstance::new(seed.render(seed.residues()), gap))
    }
}

/// Gapped k-mer whose residues are perturbed by a random number of
/// substitutions.
#[derive(Debug, Clone)]
pub struct HammingGappedKmerInstantiation {
    pub gaps: GapRange,
    hamming_distance_probabilities: BTreeMap<usize, f64>,
    position_weights: Option<Vec<f64>>,
    alphabet_weights: Vec<(char, f64)>,
}

impl HammingGappedKmerInstantiation {
    pub fn new(
        gaps: GapRange,
        hamming_distance_probabilities: BTreeMap<usize, f64>,
        position_weights: Option<Vec<f64>>,
        alphabet_weights: Option<BTreeMap<char, f64>>,
    ) -> Self {
        let alphabet_weights = match alphabet_weights {
            Some(weights) => weights.into_iter().collect(),
            None => AMINO_ACIDS.chars().map(|c| (c, 1.0)).collect(),
        };
        Self {
            gaps,
            hamming_distance_probabilities,
            position_weights,
            alphabet_weights,
        }
    }

    fn position_weights_for(&self, seed: &MotifSeed) -> Vec<f64> {
        match &self.position_weights {
            Some(weights) => weights.clone(),
            None => vec![1.0; seed.residues().len()],
        }
    }

    fn draw_distance(&self, motif_id: &str, rng: &mut dyn RngCore) -> Result<usize, MotifError> {
        let distances: Vec<usize> = self.hamming_distance_probabilities.keys().copied().collect();
        let index = WeightedIndex::<f64>::new(self.hamming_distance_probabilities.values())
            .map_err(|e| MotifError::invalid(motif_id, format!("hamming distances: {e}")))?;
        Ok(distances[index.sample(rng)])
    }

    fn substitute(
        &self,
        motif_id: &str,
        original: char,
        rng: &mut dyn RngCore,
    ) -> Result<char, MotifError> {
        let weights: Vec<f64> = self
            .alphabet_weights
            .iter()
            .map(|(c, w)| if *c == original { 0.0 } else { *w })
            .collect();
        let index = WeightedIndex::<f64>::new(&weights)
            .map_err(|e| MotifError::invalid(motif_id, format!("alphabet weights: {e}")))?;
        Ok(self.alphabet_weights[index.sample(rng)].0)
    }
}

fn check_weights<'a, I>(motif_id: &str, what: &str, weights: I) -> Result<f64, MotifError>
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut total = 0.0;
    for w in weights {
        if !w.is_finite() || *w < 0.0 {
            return Err(MotifError::invalid(
                motif_id,
                format!("{what} contains invalid weight {w}"),
            ));
        }
        total += *w;
    }
    Ok(total)
}

impl MotifInstantiation for HammingGappedKmerInstantiation {
    fn name(&self) -> &'static str {
        "hamming_gapped_kmer"
    }

    fn validate(&self, motif_id: &str, seed: &MotifSeed) -> Result<(), MotifError> {
        self.gaps.validate(motif_id, seed)?;

        let total = check_weights(
            motif_id,
            "hamming_distance_probabilities",
            self.hamming_distance_probabilities.values(),
        )?;
        if total <= 0.0 {
            return Err(MotifError::invalid(
                motif_id,
                "hamming_distance_probabilities must have positive mass",
            ));
        }

        let positions = self.position_weights_for(seed);
        if positions.len() != seed.residues().len() {
            return Err(MotifError::invalid(
                motif_id,
                format!(
                    "{} position weights given for {} seed residues",
                    positions.len(),
                    seed.residues().len()
                ),
            ));
        }
        check_weights(motif_id, "position_weights", positions.iter())?;
        let usable_positions = positions.iter().filter(|w| **w > 0.0).count();
        let max_distance = self
            .hamming_distance_probabilities
            .iter()
            .filter(|(_, p)| **p > 0.0)
            .map(|(d, _)| *d)
            .max()
            .unwrap_or(0);
        if max_distance > usable_positions {
            return Err(MotifError::invalid(
                motif_id,
                format!(
                    "hamming distance {max_distance} exceeds {usable_positions} substitutable positions"
                ),
            ));
        }

        check_weights(
            motif_id,
            "alphabet_weights",
            self.alphabet_weights.iter().map(|(_, w)| w),
        )?;
        if max_distance > 0 {
            for residue in seed.residues() {
                let has_alternative = self
                    .alphabet_weights
                    .iter()
                    .any(|(c, w)| c != residue && *w > 0.0);
                if !has_alternative {
                    return Err(MotifError::invalid(
                        motif_id,
                        format!("no substitute letter available for residue {residue}"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn max_gap(&self) -> usize {
        self.gaps.max_gap
    }

    fn instantiate(
        &self,
        motif_id: &str,
        seed: &MotifSeed,
        rng: &mut dyn RngCore,
    ) -> Result<MotifInstance, MotifError> {
        let mut residues = seed.residues().to_vec();
        let distance = self.draw_distance(motif_id, rng)?;

        let mut weights = self.position_weights_for(seed);
        for _ in 0..distance {
            let index = WeightedIndex::<f64>::new(&weights)
                .map_err(|e| MotifError::invalid(motif_id, format!("position weights: {e}")))?;
            let position = index.sample(rng);
            weights[position] = 0.0;
            residues[position] = self.substitute(motif_id, residues[position], rng)?;
        }

        let gap = self.gaps.draw(seed, rng);
        Ok(MotifInstance::new(seed.render(&residues), gap))
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/simulation/instantiation.rs"]
mod tests;
