#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scoring scheme, weight, and scored-result types.
//!
//! These types sit between the scoring engine and the reporting layer: the
//! engine produces a [`ScoredSet`] and everything downstream (tables,
//! exports, suggestions) reads from it without knowing which scheme ran.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use school_zone_facility_models::{Facility, Feature, Grade};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Largest weight magnitude accepted from interactive input.
pub const MAX_WEIGHT: f64 = 10.0;

/// Neutral score given to every record when no weight contributes.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Per-feature weights for live aggregation.
///
/// Only the magnitude of each weight is used; the direction comes from the
/// feature's fixed polarity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureWeights(BTreeMap<Feature, f64>);

impl FeatureWeights {
    /// Creates an empty weight set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns `self` with `feature` set to `weight`.
    #[must_use]
    pub fn with(mut self, feature: Feature, weight: f64) -> Self {
        self.0.insert(feature, weight);
        self
    }

    /// Sets the weight for `feature`, replacing any previous value.
    pub fn set(&mut self, feature: Feature, weight: f64) {
        self.0.insert(feature, weight);
    }

    /// Configured weight for `feature`, or zero.
    #[must_use]
    pub fn get(&self, feature: Feature) -> f64 {
        self.0.get(&feature).copied().unwrap_or(0.0)
    }

    /// Iterates over every configured `(feature, weight)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        self.0.iter().map(|(f, w)| (*f, *w))
    }

    /// Whether no weight has been configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Features that actually contribute: nonzero weight and present in
    /// `available`. Yields `(feature, |weight|)`.
    pub fn contributing<'a>(
        &'a self,
        available: &'a BTreeSet<Feature>,
    ) -> impl Iterator<Item = (Feature, f64)> + 'a {
        self.iter()
            .filter(|(f, w)| *w != 0.0 && w.is_finite() && available.contains(f))
            .map(|(f, w)| (f, w.abs()))
    }
}

impl FromIterator<(Feature, f64)> for FeatureWeights {
    fn from_iter<T: IntoIterator<Item = (Feature, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Absolute cut points for the fixed-threshold policy. Bounds are inclusive
/// of the better grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeThresholds {
    /// Minimum score for an A.
    pub a: f64,
    /// Minimum score for a B.
    pub b: f64,
    /// Minimum score for a C.
    pub c: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            a: 75.0,
            b: 65.0,
            c: 55.0,
        }
    }
}

/// How a continuous score becomes a letter grade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum GradePolicy {
    /// Cut points are the 25th/50th/75th percentiles of the working set.
    #[default]
    Quartile,
    /// Cut points are fixed scheme constants.
    Thresholds(GradeThresholds),
}

impl fmt::Display for GradePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quartile => write!(f, "quartile"),
            Self::Thresholds(t) => write!(f, "thresholds A>={} B>={} C>={}", t.a, t.b, t.c),
        }
    }
}

/// Statistic that a suggestion compares the current count against.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReferenceStat {
    /// Working-set maximum.
    Maximum,
    /// Working-set median.
    Median,
}

/// Which records receive improvement suggestions and how they are phrased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionSettings {
    /// Grades that trigger a suggestion.
    pub grades: Vec<Grade>,
    /// Statistic shown next to the current count.
    pub reference: ReferenceStat,
    /// Candidate features, in tie-break order.
    pub features: Vec<Feature>,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            grades: vec![Grade::D],
            reference: ReferenceStat::Maximum,
            features: Feature::all()
                .iter()
                .copied()
                .filter(|f| f.is_facility())
                .collect(),
        }
    }
}

/// One named component of a record's score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownItem {
    /// Component label (e.g. "Penalty total" or a feature name).
    pub label: String,
    /// Signed points this component contributes.
    pub points: f64,
}

/// A facility with its active score and grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredFacility {
    /// The source row.
    pub facility: Facility,
    /// Active score.
    pub score: f64,
    /// Active grade.
    pub grade: Grade,
    /// Score components for the active scheme.
    pub breakdown: Vec<BreakdownItem>,
}

/// Result of one scoring pass over a working set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSet {
    /// Identifier of the scheme that produced this set.
    pub scheme_id: String,
    /// Display name of the scheme.
    pub scheme_name: String,
    /// Policy the grades were assigned with.
    pub grading: GradePolicy,
    /// Scored rows, in working-set order.
    pub facilities: Vec<ScoredFacility>,
}

impl ScoredSet {
    /// Number of scored rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    /// Whether the set has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// Active scores, in row order.
    #[must_use]
    pub fn scores(&self) -> Vec<f64> {
        self.facilities.iter().map(|f| f.score).collect()
    }

    /// Returns a copy holding only the rows matching `predicate`. Scores and
    /// grades are kept as they are.
    #[must_use]
    pub fn retain(&self, mut predicate: impl FnMut(&ScoredFacility) -> bool) -> Self {
        Self {
            scheme_id: self.scheme_id.clone(),
            scheme_name: self.scheme_name.clone(),
            grading: self.grading,
            facilities: self
                .facilities
                .iter()
                .filter(|f| predicate(f))
                .cloned()
                .collect(),
        }
    }

    /// Breakdown labels in first-seen order across all rows.
    #[must_use]
    pub fn component_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for item in self.facilities.iter().flat_map(|f| &f.breakdown) {
            if !labels.contains(&item.label) {
                labels.push(item.label.clone());
            }
        }
        labels
    }
}

/// What a suggestion recommends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advice {
    /// Add more of the weakest safety facility.
    Reinforce {
        /// The weakest facility.
        feature: Feature,
        /// Current raw count at the site.
        current: f64,
        /// Reference statistic value.
        reference: f64,
        /// Which statistic `reference` is.
        stat: ReferenceStat,
    },
    /// No facility column could be compared.
    FurtherAnalysis,
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reinforce {
                feature,
                current,
                reference,
                stat,
            } => {
                let stat = match stat {
                    ReferenceStat::Maximum => "max",
                    ReferenceStat::Median => "median",
                };
                write!(
                    f,
                    "Reinforce {} (currently {current}, {stat} {reference})",
                    feature.label()
                )
            }
            Self::FurtherAnalysis => write!(f, "Needs further analysis"),
        }
    }
}

/// Advisory improvement note for a low-graded facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Facility identifier.
    pub facility_id: String,
    /// Facility name.
    pub facility_name: String,
    /// Active grade.
    pub grade: Grade,
    /// Active score.
    pub score: f64,
    /// The recommendation.
    pub advice: Advice,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contributing_skips_zero_and_absent_features() {
        let weights = FeatureWeights::new()
            .with(Feature::IncidentCount, -3.0)
            .with(Feature::Cctv, 0.0)
            .with(Feature::YellowCarpet, 2.0);
        let available = BTreeSet::from([Feature::IncidentCount, Feature::Cctv]);

        let contributing: Vec<(Feature, f64)> = weights.contributing(&available).collect();
        assert_eq!(contributing, vec![(Feature::IncidentCount, 3.0)]);
    }

    #[test]
    fn grade_policy_parses_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            grading: GradePolicy,
        }

        let quartile: Wrapper = toml::from_str("[grading]\npolicy = \"quartile\"").unwrap();
        assert_eq!(quartile.grading, GradePolicy::Quartile);

        let fixed: Wrapper =
            toml::from_str("[grading]\npolicy = \"thresholds\"\na = 80.0").unwrap();
        assert_eq!(
            fixed.grading,
            GradePolicy::Thresholds(GradeThresholds {
                a: 80.0,
                b: 65.0,
                c: 55.0,
            })
        );
    }

    #[test]
    fn component_labels_keep_first_seen_order() {
        let facility = Facility {
            id: "1".to_string(),
            name: "A".to_string(),
            category: "Kindergarten".to_string(),
            district: "Jungwon".to_string(),
            coordinates: None,
            indicators: BTreeMap::new(),
            attributes: BTreeMap::new(),
        };
        let item = |label: &str| BreakdownItem {
            label: label.to_string(),
            points: 1.0,
        };
        let set = ScoredSet {
            scheme_id: "v6".to_string(),
            scheme_name: "V6".to_string(),
            grading: GradePolicy::Quartile,
            facilities: vec![
                ScoredFacility {
                    facility: facility.clone(),
                    score: 1.0,
                    grade: Grade::A,
                    breakdown: vec![item("Bonus"), item("Penalty")],
                },
                ScoredFacility {
                    facility,
                    score: 2.0,
                    grade: Grade::B,
                    breakdown: vec![item("Penalty"), item("Base")],
                },
            ],
        };
        assert_eq!(set.component_labels(), vec!["Bonus", "Penalty", "Base"]);
    }

    #[test]
    fn advice_message_names_feature_and_reference() {
        let advice = Advice::Reinforce {
            feature: Feature::Crosswalk,
            current: 1.0,
            reference: 7.0,
            stat: ReferenceStat::Maximum,
        };
        assert_eq!(advice.to_string(), "Reinforce Crosswalks (currently 1, max 7)");
    }
}
