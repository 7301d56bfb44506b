use crate::binding::{BindingSite, Strand};
use crate::config::SimulationConfig;
use crate::scoring;
use crate::template::Template;
use itertools::iproduct;
use serde::{Deserialize, Serialize};

/// A forward/reverse site pair that could be amplified. `length` runs from
/// the forward site's 5' end to the reverse site's 5' end along the sense
/// direction, wrapping the origin on circular templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmpliconCandidate {
    pub forward_site: BindingSite,
    pub reverse_site: BindingSite,
    pub length: usize,
    pub wraps_origin: bool,
    pub combined_score: f64,
    pub gc_fraction: f64,
    pub rank: Option<usize>,
    pub extension_seconds: Option<f64>,
}

impl AmpliconCandidate {
    /// The predicted product sequence, origin-wrapped when needed.
    pub fn sequence(&self, template: &Template) -> Option<Vec<u8>> {
        template.slice(self.forward_site.start, self.length)
    }
}

/// A candidate excluded from ranking, kept in the payload with the reason
/// stated rather than silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedCandidate {
    pub candidate: AmpliconCandidate,
    pub reason: String,
}

/// Pair every sense site with every antisense site. Orientation violations
/// are discarded; size violations are returned separately so the ranker can
/// report them as rejected. Retained candidates are unranked — ordering is
/// the ranker's job, which keeps this combinatorial step independent of
/// scoring policy.
pub fn assemble(
    template: &Template,
    sense_sites: &[BindingSite],
    antisense_sites: &[BindingSite],
    config: &SimulationConfig,
) -> (Vec<AmpliconCandidate>, Vec<RejectedCandidate>) {
    let mut candidates = vec![];
    let mut rejected = vec![];

    for (forward, reverse) in iproduct!(sense_sites.iter(), antisense_sites.iter()) {
        if forward.strand != Strand::Sense || reverse.strand != Strand::Antisense {
            continue;
        }
        if !template.is_circular() && reverse.start < forward.start {
            // reverse site entirely upstream on a non-wrapping template
            continue;
        }
        let length = match template.sense_distance(forward.start, reverse.end) {
            Some(length) => length,
            None => continue,
        };
        let forward_span = footprint(template, forward);
        let reverse_span = footprint(template, reverse);
        if length < forward_span.max(reverse_span) {
            // product shorter than a primer footprint is geometric nonsense
            continue;
        }
        let wraps_origin = template.is_circular()
            && (reverse.end <= forward.start || forward.wraps_origin() || reverse.wraps_origin());

        let product = match template.slice(forward.start, length) {
            Some(product) => product,
            None => continue,
        };
        let candidate = AmpliconCandidate {
            forward_site: forward.clone(),
            reverse_site: reverse.clone(),
            length,
            wraps_origin,
            combined_score: scoring::combined_score(
                forward.binding_score,
                reverse.binding_score,
            ),
            gc_fraction: gc_fraction(&product),
            rank: None,
            extension_seconds: None,
        };
        if length < config.min_product_size || length > config.max_product_size {
            rejected.push(RejectedCandidate {
                reason: format!(
                    "product size {} outside {}..={}",
                    length, config.min_product_size, config.max_product_size
                ),
                candidate,
            });
        } else {
            candidates.push(candidate);
        }
    }
    (candidates, rejected)
}

fn footprint(template: &Template, site: &BindingSite) -> usize {
    template
        .sense_distance(site.start, site.end)
        .unwrap_or(site.end.saturating_sub(site.start))
}

fn gc_fraction(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc = seq.iter().filter(|c| matches!(c, b'G' | b'C')).count();
    gc as f64 / seq.len() as f64
}
