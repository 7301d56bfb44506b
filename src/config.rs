use crate::error::SimulationError;
use crate::scoring::ScoringConfig;
use serde::{Deserialize, Serialize};

/// Per-request simulation settings. All fields have working defaults so a
/// JSON config only needs to name what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Substitution budget per binding site.
    pub max_mismatches: usize,
    /// Refuse sites whose 3'-terminal run is not an exact match.
    pub require_three_prime_exact: bool,
    /// Length of the 3'-terminal run checked for exactness. A run of 0
    /// disables the gate even when `require_three_prime_exact` is set.
    pub min_three_prime_run: usize,
    pub min_product_size: usize,
    pub max_product_size: usize,
    /// Preferred product length for tie-breaking; defaults to the middle of
    /// the size window.
    pub optimal_product_size: Option<usize>,
    /// How many candidates to report below the primary.
    pub show_alternatives: usize,
    /// Polymerase speed for the extension time estimate.
    pub seconds_per_kb: f64,
    /// Coarse-grained scan budget, checked between primer scans.
    pub time_budget_ms: Option<u64>,
    /// Shortest 3'-terminal overlap probed by the dimer check.
    pub min_dimer_overlap: usize,
    /// Fraction of the shorter primer that an overlap must reach before a
    /// dimer is flagged as problematic.
    pub problematic_overlap_fraction: f64,
    pub scoring: ScoringConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_mismatches: 2,
            require_three_prime_exact: false,
            min_three_prime_run: 1,
            min_product_size: 40,
            max_product_size: 5000,
            optimal_product_size: None,
            show_alternatives: 3,
            seconds_per_kb: 30.0,
            time_budget_ms: None,
            min_dimer_overlap: 4,
            problematic_overlap_fraction: 0.5,
            scoring: ScoringConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.min_product_size == 0 {
            return Err(SimulationError::config(
                "min_product_size",
                "must be positive",
            ));
        }
        if self.min_product_size > self.max_product_size {
            return Err(SimulationError::config(
                "min_product_size",
                format!(
                    "min_product_size ({}) exceeds max_product_size ({})",
                    self.min_product_size, self.max_product_size
                ),
            ));
        }
        if let Some(optimal) = self.optimal_product_size {
            if optimal < self.min_product_size || optimal > self.max_product_size {
                return Err(SimulationError::config(
                    "optimal_product_size",
                    format!(
                        "{} lies outside {}..={}",
                        optimal, self.min_product_size, self.max_product_size
                    ),
                ));
            }
        }
        if !(self.seconds_per_kb > 0.0) || !self.seconds_per_kb.is_finite() {
            return Err(SimulationError::config(
                "seconds_per_kb",
                "must be a positive number",
            ));
        }
        if self.min_dimer_overlap == 0 {
            return Err(SimulationError::config(
                "min_dimer_overlap",
                "must be at least 1",
            ));
        }
        if !(self.problematic_overlap_fraction > 0.0)
            || self.problematic_overlap_fraction > 1.0
            || !self.problematic_overlap_fraction.is_finite()
        {
            return Err(SimulationError::config(
                "problematic_overlap_fraction",
                "must lie in (0, 1]",
            ));
        }
        self.scoring.validate()
    }

    pub fn effective_optimal_size(&self) -> usize {
        self.optimal_product_size
            .unwrap_or((self.min_product_size + self.max_product_size) / 2)
    }
}
