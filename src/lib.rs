//! In-silico primer binding and amplification simulation: find every
//! location where a primer anneals to a template within a mismatch budget,
//! pair compatible sites into candidate products, rank them, and screen the
//! primer set for dimers.

pub mod amplicon;
pub mod binding;
pub mod config;
pub mod dimer;
pub mod error;
pub mod extension;
pub mod iupac_code;
pub mod ranker;
pub mod scoring;
pub mod simulation;
pub mod template;

pub use binding::{BindingSite, Primer, PrimerRole, Strand};
pub use config::SimulationConfig;
pub use error::SimulationError;
pub use simulation::{run, SimulationReport, SimulationRequest};
pub use template::Template;
