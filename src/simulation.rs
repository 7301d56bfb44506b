use crate::amplicon;
use crate::binding::{self, BindingSite, Primer, PrimerRole, Strand};
use crate::config::SimulationConfig;
use crate::dimer::{self, DimerResult};
use crate::error::SimulationError;
use crate::extension;
use crate::ranker::{self, RankedAmplicons};
use crate::template::Template;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

/// One fully materialized simulation request. Template, primers and
/// configuration are immutable for the duration of the run; there is no
/// background state.
#[derive(Debug, Clone)]
pub struct SimulationRequest {
    pub template: Template,
    pub primers: Vec<Primer>,
    pub config: SimulationConfig,
}

/// Per-primer scan outcome, reported for every primer including probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimerCheck {
    pub primer_id: String,
    pub role: PrimerRole,
    pub sites: Vec<BindingSite>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub template_id: String,
    pub primers_checked: Vec<PrimerCheck>,
    pub amplicons: RankedAmplicons,
    pub dimers: Vec<DimerResult>,
    pub warnings: Vec<String>,
}

/// Run one simulation. Validation happens up front, before any scan, so an
/// error is never accompanied by partial work. Missing sites or products
/// are successful empty results with warnings.
pub fn run(request: &SimulationRequest) -> Result<SimulationReport, SimulationError> {
    let SimulationRequest {
        template,
        primers,
        config,
    } = request;

    config.validate()?;
    if primers.is_empty() {
        return Err(SimulationError::validation(
            "primer set",
            "at least one primer is required",
        ));
    }
    let mut ids: HashSet<&str> = HashSet::new();
    for primer in primers {
        primer.validate()?;
        if !ids.insert(&primer.id) {
            return Err(SimulationError::validation(
                format!("primer '{}'", primer.id),
                "duplicate primer id",
            ));
        }
        if !template.is_circular() && primer.len() > template.len() {
            return Err(SimulationError::validation(
                format!("primer '{}'", primer.id),
                format!(
                    "primer length {} exceeds linear template '{}' length {}",
                    primer.len(),
                    template.id(),
                    template.len()
                ),
            ));
        }
    }

    let started = Instant::now();
    debug!(
        "scanning {} primers against template '{}' ({} bp, {})",
        primers.len(),
        template.id(),
        template.len(),
        if template.is_circular() {
            "circular"
        } else {
            "linear"
        }
    );

    // Scans share nothing but the read-only template, so they fan out
    // freely; each primer's site list comes back in canonical order, and
    // the outer collect preserves primer order. With a time budget the loop
    // runs sequentially so the checkpoint between scans can report exactly
    // how many primers completed.
    let primers_checked: Vec<PrimerCheck> = match config.time_budget_ms {
        None => primers
            .par_iter()
            .map(|primer| scan_primer(template, primer, config))
            .collect::<Result<Vec<_>, _>>()?,
        Some(budget_ms) => {
            let mut ret = Vec::with_capacity(primers.len());
            for (completed, primer) in primers.iter().enumerate() {
                if started.elapsed().as_millis() as u64 >= budget_ms {
                    return Err(SimulationError::Timeout {
                        budget_ms,
                        primers_completed: completed,
                        primers_total: primers.len(),
                    });
                }
                ret.push(scan_primer(template, primer, config)?);
            }
            ret
        }
    };

    let mut warnings = vec![];
    for check in &primers_checked {
        if check.sites.is_empty() {
            warnings.push(format!(
                "no binding sites found for primer '{}' within {} mismatches",
                check.primer_id, config.max_mismatches
            ));
        }
    }

    // Probes are scanned and reported but never extend, so they stay out of
    // the pairing pools.
    let mut sense_sites = vec![];
    let mut antisense_sites = vec![];
    for (primer, check) in primers.iter().zip(&primers_checked) {
        if primer.role == PrimerRole::Probe {
            continue;
        }
        for site in &check.sites {
            match site.strand {
                Strand::Sense => sense_sites.push(site.clone()),
                Strand::Antisense => antisense_sites.push(site.clone()),
            }
        }
    }

    let (candidates, size_rejected) =
        amplicon::assemble(template, &sense_sites, &antisense_sites, config);
    if candidates.is_empty() {
        warnings.push(format!(
            "no amplicon within product size bounds {}..={}",
            config.min_product_size, config.max_product_size
        ));
    }
    let mut amplicons = ranker::rank(candidates, size_rejected, config);
    if let Some(primary) = amplicons.primary.as_mut() {
        primary.extension_seconds = Some(extension::estimate_seconds(
            primary.length,
            config.seconds_per_kb,
        ));
    }
    for alternate in &mut amplicons.alternates {
        alternate.extension_seconds = Some(extension::estimate_seconds(
            alternate.length,
            config.seconds_per_kb,
        ));
    }

    let dimers = dimer::check_all_dimers(primers, config)?;
    for d in &dimers {
        if d.is_problematic {
            warnings.push(format!(
                "primer-dimer risk between '{}' and '{}' (3' overlap of {} bases)",
                d.primer_a, d.primer_b, d.overlap_length
            ));
        }
    }

    debug!(
        "simulation of template '{}' done in {} ms",
        template.id(),
        started.elapsed().as_millis()
    );

    Ok(SimulationReport {
        template_id: template.id().to_string(),
        primers_checked,
        amplicons,
        dimers,
        warnings,
    })
}

fn scan_primer(
    template: &Template,
    primer: &Primer,
    config: &SimulationConfig,
) -> Result<PrimerCheck, SimulationError> {
    let sites = binding::find_binding_sites(template, primer, config)?;
    debug!("primer '{}': {} binding sites", primer.id, sites.len());
    Ok(PrimerCheck {
        primer_id: primer.id.clone(),
        role: primer.role,
        sites,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        template_seq: &str,
        circular: bool,
        primers: Vec<Primer>,
        tweak: impl FnOnce(&mut SimulationConfig),
    ) -> SimulationRequest {
        let mut config = SimulationConfig::default();
        config.max_mismatches = 0;
        config.min_product_size = 10;
        config.max_product_size = 100;
        tweak(&mut config);
        SimulationRequest {
            template: Template::new("t1", template_seq, circular).unwrap(),
            primers,
            config,
        }
    }

    fn primer(id: &str, role: PrimerRole, seq: &str) -> Primer {
        Primer::new(id, role, seq).unwrap()
    }

    #[test]
    fn test_forward_reverse_pair_yields_primary() {
        let req = request(
            "AAAACCCCGGGGTTTT",
            false,
            vec![
                primer("fwd", PrimerRole::Forward, "AAAACCCC"),
                primer("rev", PrimerRole::Reverse, "GGGGTTTT"),
            ],
            |_| {},
        );
        let report = run(&req).unwrap();
        let primary = report.amplicons.primary.as_ref().unwrap();
        assert_eq!(primary.length, 16);
        assert_eq!(primary.rank, Some(1));
        assert_eq!(primary.combined_score, 1.0);
        assert_eq!(primary.extension_seconds, Some(0.48));
        // the 8 bp same-region pairings fall below min_product_size
        assert!(report.amplicons.alternates.is_empty());
        assert!(report
            .amplicons
            .rejected
            .iter()
            .all(|r| r.reason.contains("outside")));
        // fwd and rev are exact reverse complements of each other
        assert!(report.dimers.iter().any(|d| d.is_problematic));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("primer-dimer risk")));
    }

    #[test]
    fn test_no_match_is_successful_empty_result() {
        let req = request(
            "AAAACCCCGGGGTTTT",
            false,
            vec![primer("fwd", PrimerRole::Forward, "TGCATGCA")],
            |_| {},
        );
        let report = run(&req).unwrap();
        assert!(report.amplicons.primary.is_none());
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("no binding sites found for primer 'fwd' within 0 mismatches")));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("no amplicon within product size bounds")));
    }

    #[test]
    fn test_probe_is_checked_but_never_paired() {
        let req = request(
            "AAAACCCCGGGGTTTT",
            false,
            vec![primer("probe", PrimerRole::Probe, "AAAACCCC")],
            |_| {},
        );
        let report = run(&req).unwrap();
        assert!(!report.primers_checked[0].sites.is_empty());
        assert!(report.amplicons.primary.is_none());
    }

    #[test]
    fn test_circular_product_across_origin() {
        let req = request(
            "GGGGTTTTAAAACCCC",
            true,
            vec![
                primer("fwd", PrimerRole::Forward, "AAAACCCC"),
                primer("rev", PrimerRole::Reverse, "AAAACCCC"),
            ],
            |cfg| {
                cfg.min_product_size = 12;
            },
        );
        let report = run(&req).unwrap();
        let primary = report.amplicons.primary.as_ref().unwrap();
        assert_eq!(primary.length, 16);
        assert!(primary.wraps_origin);
    }

    #[test]
    fn test_determinism_across_runs() {
        let build = || {
            request(
                "AAAACCCCGGGGTTTTAAAACCCCGGGGTTTT",
                true,
                vec![
                    primer("fwd", PrimerRole::Forward, "AAAACCCC"),
                    primer("rev", PrimerRole::Reverse, "GGGGTTTT"),
                ],
                |cfg| {
                    cfg.max_mismatches = 2;
                },
            )
        };
        let a = serde_json::to_string(&run(&build()).unwrap()).unwrap();
        let b = serde_json::to_string(&run(&build()).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_config_error_reported_before_scanning() {
        let req = request(
            "AAAACCCCGGGGTTTT",
            false,
            vec![primer("fwd", PrimerRole::Forward, "AAAACCCC")],
            |cfg| {
                cfg.min_product_size = 200;
                cfg.max_product_size = 100;
            },
        );
        match run(&req) {
            Err(SimulationError::Config { option, .. }) => {
                assert_eq!(option, "min_product_size");
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_primer_longer_than_linear_template_fails_fast() {
        let req = request(
            "AAAACCCCGGGG",
            false,
            vec![primer("fwd", PrimerRole::Forward, "AAAACCCCGGGGTTTTAAAA")],
            |_| {},
        );
        match run(&req) {
            Err(SimulationError::Validation { subject, .. }) => {
                assert!(subject.contains("fwd"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_primer_ids_rejected() {
        let req = request(
            "AAAACCCCGGGGTTTT",
            false,
            vec![
                primer("fwd", PrimerRole::Forward, "AAAACCCC"),
                primer("fwd", PrimerRole::Reverse, "GGGGTTTT"),
            ],
            |_| {},
        );
        assert!(matches!(
            run(&req),
            Err(SimulationError::Validation { .. })
        ));
    }

    #[test]
    fn test_zero_time_budget_times_out() {
        let req = request(
            "AAAACCCCGGGGTTTT",
            false,
            vec![primer("fwd", PrimerRole::Forward, "AAAACCCC")],
            |cfg| {
                cfg.time_budget_ms = Some(0);
            },
        );
        match run(&req) {
            Err(SimulationError::Timeout {
                primers_completed,
                primers_total,
                ..
            }) => {
                assert_eq!(primers_completed, 0);
                assert_eq!(primers_total, 1);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
