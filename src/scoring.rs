use crate::amplicon::AmpliconCandidate;
use crate::error::SimulationError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Coefficients of the likelihood heuristic. The shape of the function is
/// fixed (monotone in mismatch count, extra weight near the 3' end); the
/// numbers are tunable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Base penalty per mismatch, before 3'-proximity weighting.
    pub mismatch_penalty: f64,
    /// How much a mismatch at the 3'-terminal base costs on top of the base
    /// penalty; decays with distance from the 3' end.
    pub three_prime_weight: f64,
    /// Flat penalty factor applied when the 3' anchor run is not exact.
    pub inexact_three_prime_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mismatch_penalty: 0.12,
            three_prime_weight: 1.0,
            inexact_three_prime_penalty: 0.2,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.mismatch_penalty > 0.0) || !self.mismatch_penalty.is_finite() {
            return Err(SimulationError::config(
                "scoring.mismatch_penalty",
                "must be a positive number",
            ));
        }
        if !(self.three_prime_weight >= 0.0) || !self.three_prime_weight.is_finite() {
            return Err(SimulationError::config(
                "scoring.three_prime_weight",
                "must be a non-negative number",
            ));
        }
        // The worst single-mismatch factor must stay below 1, otherwise a
        // site score can hit zero and mismatch counts stop being ordered.
        if self.mismatch_penalty * (1.0 + self.three_prime_weight) >= 1.0 {
            return Err(SimulationError::config(
                "scoring.mismatch_penalty",
                "mismatch_penalty * (1 + three_prime_weight) must stay below 1",
            ));
        }
        if !(0.0..1.0).contains(&self.inexact_three_prime_penalty) {
            return Err(SimulationError::config(
                "scoring.inexact_three_prime_penalty",
                "must lie in [0, 1)",
            ));
        }
        Ok(())
    }
}

/// Per-site binding score in (0, 1]. Zero mismatches score 1.0; every
/// mismatch multiplies in a factor below 1 that shrinks further the closer
/// the mismatch sits to the 3' end. `mismatch_positions` are offsets from
/// the primer 5' end.
pub fn site_score(
    primer_len: usize,
    mismatch_positions: &[usize],
    three_prime_exact: bool,
    config: &ScoringConfig,
) -> f64 {
    let mut score = 1.0;
    for &pos in mismatch_positions {
        let from_three_prime = (primer_len - 1 - pos) as f64;
        let penalty =
            config.mismatch_penalty * (1.0 + config.three_prime_weight / (1.0 + from_three_prime));
        score *= 1.0 - penalty;
    }
    if !three_prime_exact {
        score *= 1.0 - config.inexact_three_prime_penalty;
    }
    score
}

/// Amplicon composite score: the weaker of the two sites limits the product.
pub fn combined_score(forward_score: f64, reverse_score: f64) -> f64 {
    forward_score.min(reverse_score)
}

/// Total ordering for ranking: score descending, then length closest to the
/// optimal product size, then template coordinates. Never iteration order.
pub fn rank_cmp(a: &AmpliconCandidate, b: &AmpliconCandidate, optimal_size: usize) -> Ordering {
    b.combined_score
        .total_cmp(&a.combined_score)
        .then_with(|| size_closeness(a.length, optimal_size).cmp(&size_closeness(b.length, optimal_size)))
        .then_with(|| a.forward_site.start.cmp(&b.forward_site.start))
        .then_with(|| a.reverse_site.end.cmp(&b.reverse_site.end))
}

fn size_closeness(length: usize, optimal_size: usize) -> usize {
    length.abs_diff(optimal_size)
}
