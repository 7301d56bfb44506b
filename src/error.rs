use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Failure taxonomy of the simulation core. "No binding site" and
/// "no amplicon" are successful empty results with warnings, never errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SimulationError {
    /// Malformed input: empty/invalid sequence, primer longer than a
    /// linear template. Raised before any scanning starts.
    Validation { subject: String, message: String },
    /// Contradictory or out-of-range configuration values.
    Config { option: String, message: String },
    /// The scan exceeded its time budget. Reports how far it got.
    Timeout {
        budget_ms: u64,
        primers_completed: usize,
        primers_total: usize,
    },
}

impl SimulationError {
    pub fn validation<S: Into<String>, M: Into<String>>(subject: S, message: M) -> Self {
        Self::Validation {
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>, M: Into<String>>(option: S, message: M) -> Self {
        Self::Config {
            option: option.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { subject, message } => {
                write!(f, "Validation error for '{subject}': {message}")
            }
            Self::Config { option, message } => {
                write!(f, "Configuration error for '{option}': {message}")
            }
            Self::Timeout {
                budget_ms,
                primers_completed,
                primers_total,
            } => {
                write!(
                    f,
                    "Scan exceeded time budget of {budget_ms} ms after {primers_completed} of {primers_total} primers"
                )
            }
        }
    }
}

impl Error for SimulationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_context() {
        let e = SimulationError::validation("primer fwd1", "empty sequence");
        assert_eq!(
            e.to_string(),
            "Validation error for 'primer fwd1': empty sequence"
        );

        let e = SimulationError::Timeout {
            budget_ms: 50,
            primers_completed: 2,
            primers_total: 5,
        };
        assert!(e.to_string().contains("2 of 5"));
    }

    #[test]
    fn test_serializes_to_json() {
        let e = SimulationError::config("min_product_size", "must be positive");
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("min_product_size"));
    }
}
