//! # Pairing Module
//!
//! Enumerates the candidate pairs that the scorer will compare.
//!
//! ## Rules
//! - Every unordered pair `{a, b}` with `a` discovered before `b`
//! - With `cross_only`, both images must come from different roots
//! - The aspect-ratio delta must be **at least** `aspect_tolerance`;
//!   pairs closer than the tolerance are rejected
//!
//! Filtering uses catalog metadata only, so rejected pairs never cost a decode.

use crate::core::catalog::{ImageCatalog, RecordId};
use serde::{Deserialize, Serialize};

/// Filters applied while generating pairs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairingRules {
    /// Only pair images from different roots
    pub cross_only: bool,
    /// Minimum aspect-ratio difference a pair must have to be kept
    pub aspect_tolerance: f64,
}

impl Default for PairingRules {
    fn default() -> Self {
        Self {
            cross_only: false,
            aspect_tolerance: 0.1,
        }
    }
}

impl PairingRules {
    /// Rules that keep every pair
    pub fn all_pairs() -> Self {
        Self {
            cross_only: false,
            aspect_tolerance: 0.0,
        }
    }

    /// Number of unordered pairs before any filtering
    pub fn count_candidates(images: usize) -> usize {
        images * images.saturating_sub(1) / 2
    }
}

/// A candidate or scored pair of catalog records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPair {
    /// Earlier record in discovery order
    pub left: RecordId,
    /// Later record in discovery order
    pub right: RecordId,
    /// Position in generator output, used to keep ranking stable
    pub discovery_index: usize,
    /// Absolute difference of the two aspect ratios
    pub aspect_ratio_delta: f64,
    /// Structural similarity in [-1, 1]; zero until scored
    pub similarity_score: f64,
}

impl ComparisonPair {
    /// Both record ids, left first
    pub fn ids(&self) -> [RecordId; 2] {
        [self.left, self.right]
    }

    /// Copy of the pair carrying a score
    pub fn with_score(&self, score: f64) -> Self {
        Self {
            similarity_score: score,
            ..self.clone()
        }
    }
}

/// Generate all pairs allowed by `rules`, in discovery order
pub fn generate_pairs(catalog: &ImageCatalog, rules: &PairingRules) -> Vec<ComparisonPair> {
    let records = catalog.records();
    let ratios: Vec<f64> = records.iter().map(|r| r.aspect_ratio()).collect();
    let mut pairs = Vec::new();

    for i in 0..records.len() {
        for j in (i + 1)..records.len() {
            if rules.cross_only && records[i].root == records[j].root {
                continue;
            }

            let delta = (ratios[i] - ratios[j]).abs();
            if delta < rules.aspect_tolerance {
                continue;
            }

            pairs.push(ComparisonPair {
                left: RecordId(i),
                right: RecordId(j),
                discovery_index: pairs.len(),
                aspect_ratio_delta: delta,
                similarity_score: 0.0,
            });
        }
    }

    tracing::debug!(
        candidates = PairingRules::count_candidates(records.len()),
        kept = pairs.len(),
        "pairs generated"
    );

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{ImageFormat, ImageRecord};
    use std::path::PathBuf;

    fn catalog(dims: &[(u32, u32, usize)]) -> ImageCatalog {
        let roots = (0..=dims.iter().map(|d| d.2).max().unwrap_or(0))
            .map(|i| PathBuf::from(format!("/root{i}")))
            .collect();
        let records = dims
            .iter()
            .enumerate()
            .map(|(i, &(width, height, root))| ImageRecord {
                path: PathBuf::from(format!("/root{root}/img{i}.png")),
                width,
                height,
                format: ImageFormat::Png,
                size: 100,
                root,
            })
            .collect();
        ImageCatalog::from_records(roots, records)
    }

    #[test]
    fn zero_tolerance_yields_every_unordered_pair() {
        for n in 0..7 {
            let dims: Vec<_> = (0..n).map(|i| (100 + i * 10, 100, 0)).collect();
            let pairs = generate_pairs(&catalog(&dims), &PairingRules::all_pairs());
            assert_eq!(pairs.len(), n as usize * (n as usize).saturating_sub(1) / 2);
            assert_eq!(pairs.len(), PairingRules::count_candidates(n as usize));
        }
    }

    #[test]
    fn pairs_are_in_discovery_order() {
        let pairs = generate_pairs(
            &catalog(&[(10, 10, 0), (20, 10, 0), (30, 10, 0)]),
            &PairingRules::all_pairs(),
        );

        let ids: Vec<_> = pairs.iter().map(|p| (p.left.0, p.right.0)).collect();
        assert_eq!(ids, vec![(0, 1), (0, 2), (1, 2)]);
        let order: Vec<_> = pairs.iter().map(|p| p.discovery_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(pairs.iter().all(|p| p.left != p.right));
    }

    #[test]
    fn cross_only_never_pairs_within_a_root() {
        let cat = catalog(&[(10, 10, 0), (10, 10, 0), (10, 10, 1), (10, 10, 1)]);
        let all = generate_pairs(&cat, &PairingRules::all_pairs());
        let cross = generate_pairs(
            &cat,
            &PairingRules {
                cross_only: true,
                aspect_tolerance: 0.0,
            },
        );

        assert_eq!(all.len(), 6);
        assert_eq!(cross.len(), 4);
        for pair in &cross {
            assert_ne!(cat[pair.left].root, cat[pair.right].root);
        }
    }

    #[test]
    fn raising_tolerance_never_adds_pairs() {
        let cat = catalog(&[(100, 100, 0), (130, 100, 0), (200, 100, 0), (90, 100, 0), (400, 100, 0)]);
        let mut previous = usize::MAX;
        for step in 0..40 {
            let rules = PairingRules {
                cross_only: false,
                aspect_tolerance: step as f64 * 0.1,
            };
            let count = generate_pairs(&cat, &rules).len();
            assert!(count <= previous);
            previous = count;
        }
    }

    #[test]
    fn pairs_closer_than_tolerance_are_rejected() {
        // 1.0, 1.2, 1.4: every delta is below 0.5
        let cat = catalog(&[(100, 100, 0), (120, 100, 0), (140, 100, 0)]);
        let rules = PairingRules {
            cross_only: false,
            aspect_tolerance: 0.5,
        };

        assert!(generate_pairs(&cat, &rules).is_empty());
    }

    #[test]
    fn delta_at_tolerance_is_kept() {
        let cat = catalog(&[(100, 100, 0), (150, 100, 0)]);
        let rules = PairingRules {
            cross_only: false,
            aspect_tolerance: 0.5,
        };

        let pairs = generate_pairs(&cat, &rules);
        assert_eq!(pairs.len(), 1);
        assert!((pairs[0].aspect_ratio_delta - 0.5).abs() < 1e-12);
    }

    #[test]
    fn identical_aspect_pairs_survive_zero_tolerance() {
        let cat = catalog(&[(800, 600, 0), (400, 300, 0)]);
        let pairs = generate_pairs(&cat, &PairingRules::all_pairs());

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].aspect_ratio_delta, 0.0);
    }
}
