//! Weighted aggregation of normalized indicators into a 0-100 score.

use std::collections::BTreeSet;

use school_zone_facility_models::{Facility, Feature};
use school_zone_scoring_models::{BreakdownItem, FeatureWeights, NEUTRAL_SCORE};

use crate::normalize::normalize_feature;

/// Per-record output of [`weighted_scores`].
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Score in `[0, 100]`, one per record.
    pub scores: Vec<f64>,
    /// Points contributed by each feature, one list per record. The points
    /// of a record sum to its score.
    pub breakdowns: Vec<Vec<BreakdownItem>>,
}

/// Combines the normalized indicators of `facilities` under `weights`.
///
/// Only features with a nonzero weight that are also in `available`
/// contribute. Each contributes `normalized * |weight|`; the sum is divided
/// by the total contributing magnitude and scaled to 100. When nothing
/// contributes every record gets [`NEUTRAL_SCORE`] and an empty breakdown.
///
/// Magnitudes are rescaled by the largest one before summing, so any finite
/// weights keep their proportions even when their raw sum would overflow.
#[must_use]
pub fn weighted_scores(
    facilities: &[Facility],
    available: &BTreeSet<Feature>,
    weights: &FeatureWeights,
) -> Aggregate {
    let contributing: Vec<(Feature, f64)> = weights.contributing(available).collect();
    let largest = contributing.iter().map(|(_, w)| *w).fold(0.0, f64::max);

    if largest <= 0.0 {
        log::debug!("No contributing weights; assigning neutral score");
        return Aggregate {
            scores: vec![NEUTRAL_SCORE; facilities.len()],
            breakdowns: vec![Vec::new(); facilities.len()],
        };
    }

    let total: f64 = contributing.iter().map(|(_, w)| w / largest).sum();
    let mut scores = vec![0.0; facilities.len()];
    let mut breakdowns: Vec<Vec<BreakdownItem>> = vec![Vec::new(); facilities.len()];

    for (feature, magnitude) in contributing {
        log::debug!("Aggregating {feature} with weight {magnitude}");
        let share = magnitude / largest / total;
        let normalized = normalize_feature(facilities, feature);
        for (i, value) in normalized.into_iter().enumerate() {
            let points = value * share * 100.0;
            scores[i] += points;
            breakdowns[i].push(BreakdownItem {
                label: feature.label().to_string(),
                points,
            });
        }
    }

    // Guard against float drift past the documented range.
    for score in &mut scores {
        *score = score.clamp(0.0, 100.0);
    }

    Aggregate { scores, breakdowns }
}
