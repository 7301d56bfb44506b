use crate::amplicon::{AmpliconCandidate, RejectedCandidate};
use crate::config::SimulationConfig;
use crate::scoring;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The ranked view of all assembled candidates. Nothing is silently
/// dropped: what is neither primary nor alternate lands in `rejected` with
/// its reason.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankedAmplicons {
    pub primary: Option<AmpliconCandidate>,
    pub alternates: Vec<AmpliconCandidate>,
    pub rejected: Vec<RejectedCandidate>,
}

pub fn rank(
    mut candidates: Vec<AmpliconCandidate>,
    size_rejected: Vec<RejectedCandidate>,
    config: &SimulationConfig,
) -> RankedAmplicons {
    let optimal_size = config.effective_optimal_size();
    candidates.sort_by(|a, b| scoring::rank_cmp(a, b, optimal_size));

    // The same product can be assembled from different site pairings (eg
    // both strand-scan passes); after sorting, the best-ranked pairing of
    // each coordinate pair survives.
    let mut seen: HashSet<(usize, usize, bool)> = HashSet::new();
    candidates.retain(|c| seen.insert((c.forward_site.start, c.reverse_site.end, c.wraps_origin)));

    let mut rejected = size_rejected;
    let mut iter = candidates.into_iter();
    let primary = iter.next().map(|mut c| {
        c.rank = Some(1);
        c
    });
    let mut alternates = vec![];
    for (i, mut candidate) in iter.enumerate() {
        if i < config.show_alternatives {
            candidate.rank = Some(i + 2);
            alternates.push(candidate);
        } else {
            rejected.push(RejectedCandidate {
                candidate,
                reason: "below rank threshold".to_string(),
            });
        }
    }
    rejected.sort_by(|a, b| {
        a.candidate
            .forward_site
            .start
            .cmp(&b.candidate.forward_site.start)
            .then(a.candidate.reverse_site.end.cmp(&b.candidate.reverse_site.end))
            .then(a.reason.cmp(&b.reason))
    });

    RankedAmplicons {
        primary,
        alternates,
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingSite, Strand};

    fn site(start: usize, end: usize, strand: Strand, score: f64) -> BindingSite {
        BindingSite {
            template_id: "t1".to_string(),
            primer_id: "p1".to_string(),
            start,
            end,
            strand,
            mismatch_count: 0,
            mismatch_positions: vec![],
            three_prime_exact: true,
            binding_score: score,
        }
    }

    fn candidate(f_start: usize, r_end: usize, length: usize, score: f64) -> AmpliconCandidate {
        AmpliconCandidate {
            forward_site: site(f_start, f_start + 8, Strand::Sense, score),
            reverse_site: site(r_end - 8, r_end, Strand::Antisense, score),
            length,
            wraps_origin: false,
            combined_score: score,
            gc_fraction: 0.5,
            rank: None,
            extension_seconds: None,
        }
    }

    fn config(show_alternatives: usize) -> SimulationConfig {
        let mut cfg = SimulationConfig::default();
        cfg.min_product_size = 50;
        cfg.max_product_size = 250;
        cfg.show_alternatives = show_alternatives;
        cfg
    }

    #[test]
    fn test_empty_input_has_no_primary() {
        let ranked = rank(vec![], vec![], &config(3));
        assert!(ranked.primary.is_none());
        assert!(ranked.alternates.is_empty());
        assert!(ranked.rejected.is_empty());
    }

    #[test]
    fn test_orders_by_score_then_size_closeness() {
        // optimal size is (50 + 250) / 2 = 150
        let best_score = candidate(0, 100, 100, 0.9);
        let closer_to_optimal = candidate(10, 160, 150, 0.7);
        let farther_from_optimal = candidate(20, 220, 200, 0.7);
        let ranked = rank(
            vec![
                farther_from_optimal.clone(),
                closer_to_optimal.clone(),
                best_score.clone(),
            ],
            vec![],
            &config(3),
        );
        let primary = ranked.primary.unwrap();
        assert_eq!(primary.length, 100);
        assert_eq!(primary.rank, Some(1));
        assert_eq!(ranked.alternates[0].length, 150);
        assert_eq!(ranked.alternates[0].rank, Some(2));
        assert_eq!(ranked.alternates[1].length, 200);
    }

    #[test]
    fn test_dedup_keeps_best_pairing() {
        let weak = candidate(0, 100, 100, 0.5);
        let strong = candidate(0, 100, 100, 0.9);
        let ranked = rank(vec![weak, strong], vec![], &config(3));
        assert_eq!(ranked.primary.unwrap().combined_score, 0.9);
        assert!(ranked.alternates.is_empty());
        assert!(ranked.rejected.is_empty());
    }

    #[test]
    fn test_overflow_goes_to_rejected_with_reason() {
        let candidates = vec![
            candidate(0, 150, 150, 0.9),
            candidate(10, 160, 150, 0.8),
            candidate(20, 170, 150, 0.7),
            candidate(30, 180, 150, 0.6),
        ];
        let ranked = rank(candidates, vec![], &config(1));
        assert!(ranked.primary.is_some());
        assert_eq!(ranked.alternates.len(), 1);
        assert_eq!(ranked.rejected.len(), 2);
        for r in &ranked.rejected {
            assert_eq!(r.reason, "below rank threshold");
        }
    }

    #[test]
    fn test_size_rejected_pass_through() {
        let size_rejected = vec![RejectedCandidate {
            candidate: candidate(0, 300, 300, 0.9),
            reason: "product size 300 outside 50..=250".to_string(),
        }];
        let ranked = rank(vec![], size_rejected, &config(3));
        assert!(ranked.primary.is_none());
        assert_eq!(ranked.rejected.len(), 1);
        assert!(ranked.rejected[0].reason.contains("outside"));
    }
}
