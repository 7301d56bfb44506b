use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::iupac_code::{self, base_matches, IupacCode};
use crate::scoring;
use crate::template::Template;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strand {
    Sense,
    Antisense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimerRole {
    Forward,
    Reverse,
    Probe,
}

/// An oligonucleotide as supplied by the caller. The sequence may contain
/// IUPAC degenerate symbols; validation happens once per request, before
/// any scan starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Primer {
    pub id: String,
    pub role: PrimerRole,
    pub sequence: String,
}

impl Primer {
    pub fn new(id: &str, role: PrimerRole, sequence: &str) -> Result<Self, SimulationError> {
        let primer = Self {
            id: id.to_string(),
            role,
            sequence: sequence.trim().to_string(),
        };
        primer.validate()?;
        Ok(primer)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let subject = format!("primer '{}'", self.id);
        if self.sequence.is_empty() {
            return Err(SimulationError::validation(subject, "empty sequence"));
        }
        for (pos, c) in self.sequence.bytes().enumerate() {
            if !IupacCode::is_valid_letter(c) {
                return Err(SimulationError::validation(
                    subject,
                    format!("invalid IUPAC symbol '{}' at position {pos}", c as char),
                ));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn bases(&self) -> &[u8] {
        self.sequence.as_bytes()
    }
}

/// One location where a primer anneals within the mismatch budget. `start`
/// and `end` are sense-strand coordinates; on a circular template they are
/// wrapped, and `end <= start` marks a site spanning the origin.
/// `mismatch_positions` are offsets from the primer 5' end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingSite {
    pub template_id: String,
    pub primer_id: String,
    pub start: usize,
    pub end: usize,
    pub strand: Strand,
    pub mismatch_count: usize,
    pub mismatch_positions: Vec<usize>,
    pub three_prime_exact: bool,
    pub binding_score: f64,
}

impl BindingSite {
    /// Does the annealed footprint cross the origin of a circular template?
    pub fn wraps_origin(&self) -> bool {
        self.end <= self.start
    }
}

/// Every position on either strand where the primer binds within
/// `max_mismatches`, in increasing `start` order. The two strand scans run
/// in parallel; the merge re-sorts into canonical order, so internal
/// parallelism never changes the observable result.
pub fn find_binding_sites(
    template: &Template,
    primer: &Primer,
    config: &SimulationConfig,
) -> Result<Vec<BindingSite>, SimulationError> {
    primer.validate()?;
    if primer.len() > template.len() {
        if template.is_circular() {
            // a wrap-around match cannot be longer than the circle itself
            return Ok(vec![]);
        }
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

    let (mut sites, antisense) = rayon::join(
        || scan_strand(template, primer, Strand::Sense, config),
        || scan_strand(template, primer, Strand::Antisense, config),
    );
    sites.extend(antisense);
    sites.sort_by(|a, b| a.start.cmp(&b.start).then(a.strand.cmp(&b.strand)));
    Ok(sites)
}

/// Slide the primer along one strand view. Antisense binding is found by
/// laying the primer's reverse complement on the sense strand, so reported
/// coordinates are sense-strand coordinates either way; window offsets are
/// translated back to primer 5'-origin offsets before reporting.
pub(crate) fn scan_strand(
    template: &Template,
    primer: &Primer,
    strand: Strand,
    config: &SimulationConfig,
) -> Vec<BindingSite> {
    let probe: Vec<u8> = match strand {
        Strand::Sense => primer.bases().to_vec(),
        Strand::Antisense => iupac_code::reverse_complement(primer.bases()),
    };
    let n = template.len();
    let m = probe.len();
    let mut ret = vec![];
    if m == 0 || m > n {
        return ret;
    }
    let last_start = if template.is_circular() { n - 1 } else { n - m };

    'offsets: for start in 0..=last_start {
        let mut window_mismatches: Vec<usize> = vec![];
        for i in 0..m {
            let base = match template.base_at(start + i) {
                Some(base) => base,
                None => continue 'offsets,
            };
            if !base_matches(base, probe[i]) {
                window_mismatches.push(i);
                if window_mismatches.len() > config.max_mismatches {
                    continue 'offsets;
                }
            }
        }

        // The extension-initiating 3' end sits at the window end on the
        // sense strand and at the window start on the antisense strand.
        let anchor_exact = |run: usize| match strand {
            Strand::Sense => !window_mismatches.iter().any(|&i| i + run >= m),
            Strand::Antisense => !window_mismatches.iter().any(|&i| i < run),
        };
        if config.require_three_prime_exact
            && config.min_three_prime_run > 0
            && (config.min_three_prime_run > m || !anchor_exact(config.min_three_prime_run))
        {
            continue;
        }
        let three_prime_exact = anchor_exact(config.min_three_prime_run.min(m));

        let mut mismatch_positions: Vec<usize> = match strand {
            Strand::Sense => window_mismatches.clone(),
            Strand::Antisense => window_mismatches.iter().map(|&i| m - 1 - i).collect(),
        };
        mismatch_positions.sort_unstable();
        let binding_score =
            scoring::site_score(m, &mismatch_positions, three_prime_exact, &config.scoring);

        let end = if start + m <= n {
            start + m
        } else {
            (start + m) % n
        };
        ret.push(BindingSite {
            template_id: template.id().to_string(),
            primer_id: primer.id.clone(),
            start,
            end,
            strand,
            mismatch_count: mismatch_positions.len(),
            mismatch_positions,
            three_prime_exact,
            binding_score,
        });
    }
    ret
}

/// Three-row text alignment of a site, for `--show-alignment` output.
pub fn render_alignment(template: &Template, primer: &Primer, site: &BindingSite) -> String {
    let m = primer.len();
    let window = template.slice(site.start, m).unwrap_or_default();
    let probe: Vec<u8> = match site.strand {
        Strand::Sense => primer.bases().to_vec(),
        Strand::Antisense => iupac_code::reverse_complement(primer.bases()),
    };
    let marks: String = window
        .iter()
        .zip(probe.iter())
        .map(|(t, p)| if base_matches(*t, *p) { '|' } else { '.' })
        .collect();
    let (strand_label, primer_row) = match site.strand {
        Strand::Sense => ("+", format!("5'-{}-3'", primer.sequence)),
        Strand::Antisense => (
            "-",
            format!(
                "3'-{}-5'",
                primer.sequence.chars().rev().collect::<String>()
            ),
        ),
    };
    format!(
        "template 5'-{}-3' [{}:{}..{} ({})]\n            {}\nprimer   {} {}\n",
        String::from_utf8_lossy(&window),
        site.template_id,
        site.start,
        site.end,
        strand_label,
        marks,
        primer_row,
        site.primer_id,
    )
}
