use crate::binding::{self, Primer, Strand};
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::iupac_code;
use crate::template::Template;
use serde::{Deserialize, Serialize};

/// Outcome of probing one primer pair for cross- or self-priming.
/// `overlap_length` is the longest 3'-terminal stretch of `primer_a` that
/// anneals to `primer_b` within the mismatch budget; zero means no overlap
/// was found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimerResult {
    pub primer_a: String,
    pub primer_b: String,
    pub overlap_length: usize,
    pub dimer_score: f64,
    pub is_problematic: bool,
}

/// Reuses the binding-site scan: the reverse complement of `primer_b`
/// becomes a linear pseudo-template and 3'-terminal windows of `primer_a`
/// are probed against it, longest first. Calling with the same primer twice
/// checks hairpin-like self-priming.
pub fn check_dimer(
    primer_a: &Primer,
    primer_b: &Primer,
    config: &SimulationConfig,
) -> Result<DimerResult, SimulationError> {
    primer_a.validate()?;
    primer_b.validate()?;

    let rc_b = String::from_utf8_lossy(&iupac_code::reverse_complement(primer_b.bases())).to_string();
    let target = Template::from_iupac(&format!("{}_rc", primer_b.id), &rc_b)?;
    let shorter = primer_a.len().min(primer_b.len());

    let mut scan_config = config.clone();
    scan_config.require_three_prime_exact = false;

    for window in (config.min_dimer_overlap..=shorter).rev() {
        let suffix = &primer_a.sequence[primer_a.len() - window..];
        let probe = Primer {
            id: primer_a.id.clone(),
            role: primer_a.role,
            sequence: suffix.to_string(),
        };
        // short overlaps must earn their match almost exactly
        scan_config.max_mismatches = config.max_mismatches.min(window / 4);
        let sites = binding::scan_strand(&target, &probe, Strand::Sense, &scan_config);
        let best = sites.iter().max_by(|x, y| {
            x.binding_score
                .total_cmp(&y.binding_score)
                .then_with(|| y.start.cmp(&x.start))
        });
        if let Some(best) = best {
            let dimer_score = best.binding_score * window as f64 / shorter as f64;
            let is_problematic =
                window as f64 >= config.problematic_overlap_fraction * shorter as f64;
            return Ok(DimerResult {
                primer_a: primer_a.id.clone(),
                primer_b: primer_b.id.clone(),
                overlap_length: window,
                dimer_score,
                is_problematic,
            });
        }
    }

    Ok(DimerResult {
        primer_a: primer_a.id.clone(),
        primer_b: primer_b.id.clone(),
        overlap_length: 0,
        dimer_score: 0.0,
        is_problematic: false,
    })
}

/// Every unordered primer pair plus each primer against itself, in input
/// order.
pub fn check_all_dimers(
    primers: &[Primer],
    config: &SimulationConfig,
) -> Result<Vec<DimerResult>, SimulationError> {
    let mut ret = vec![];
    for (i, primer_a) in primers.iter().enumerate() {
        for primer_b in primers.iter().skip(i) {
            ret.push(check_dimer(primer_a, primer_b, config)?);
        }
    }
    Ok(ret)
}
