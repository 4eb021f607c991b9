//! Config-driven scoring schemes.
//!
//! A [`Scheme`] is either a pass-through of scores computed upstream and
//! delivered as dataset columns, or a live weighted aggregation. Both
//! produce the same [`ScoredSet`] shape, so grading and reporting never
//! branch on which one ran.

use school_zone_facility_models::{Dataset, Facility, Grade};
use school_zone_scoring_models::{
    BreakdownItem, FeatureWeights, GradePolicy, ScoredFacility, ScoredSet, SuggestionSettings,
};
use serde::Deserialize;

use crate::ScoringError;
use crate::aggregate::weighted_scores;
use crate::grade::assign_grades;

// ── Top-level scheme definition ──────────────────────────────────────────

/// A complete scoring scheme.
///
/// Loaded from TOML files at compile time (see [`crate::registry`]).
#[derive(Debug, Clone, Deserialize)]
pub struct Scheme {
    /// Unique identifier (e.g., `"v6"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// One-line description shown in scheme listings.
    pub description: String,
    /// How scores are produced.
    pub scoring: ScoringMethod,
    /// How scores become grades. For precomputed schemes this is only used
    /// for rows whose grade cell is missing.
    #[serde(default)]
    pub grading: GradePolicy,
    /// Who gets improvement suggestions.
    #[serde(default)]
    pub suggestions: SuggestionSettings,
}

// ── Scoring methods ──────────────────────────────────────────────────────

/// How a scheme produces its scores.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Scores (and usually grades) were computed upstream.
    Precomputed(PrecomputedScoring),
    /// Scores are aggregated live from normalized indicators.
    Weighted(WeightedScoring),
}

/// Column selection for a precomputed scheme.
#[derive(Debug, Clone, Deserialize)]
pub struct PrecomputedScoring {
    /// Column holding the final score. Rows without a value here are not
    /// covered by the scheme.
    pub score_column: String,
    /// Column holding the letter grade.
    pub grade_column: Option<String>,
    /// Components shown as the score breakdown.
    #[serde(default)]
    pub components: Vec<ComponentColumn>,
}

/// One breakdown component of a precomputed score.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentColumn {
    /// Display label.
    pub label: String,
    /// Source column. Takes precedence over `constant`.
    pub column: Option<String>,
    /// Fixed value shared by every row (e.g. a base score).
    pub constant: Option<f64>,
    /// Whether the column holds a magnitude that is subtracted.
    #[serde(default)]
    pub negate: bool,
}

impl ComponentColumn {
    fn points(&self, facility: &Facility) -> f64 {
        let value = self
            .column
            .as_deref()
            .map_or(self.constant.unwrap_or(0.0), |c| {
                facility.number(c).unwrap_or(0.0)
            });
        if self.negate { -value } else { value }
    }
}

/// Weight configuration for a live scheme.
#[derive(Debug, Clone, Deserialize)]
pub struct WeightedScoring {
    /// Default weights.
    pub weights: FeatureWeights,
    /// Whether callers may replace the weights.
    #[serde(default)]
    pub adjustable: bool,
    /// Whether every weighted feature must be present for the scheme to be
    /// offered. Otherwise one is enough.
    #[serde(default)]
    pub require_all_features: bool,
}

impl Scheme {
    /// Whether `dataset` carries the columns this scheme needs.
    #[must_use]
    pub fn is_available(&self, dataset: &Dataset) -> bool {
        match &self.scoring {
            ScoringMethod::Precomputed(p) => dataset.has_column(&p.score_column),
            ScoringMethod::Weighted(w) => {
                let mut features = w.weights.iter().map(|(f, _)| f);
                if w.require_all_features {
                    features.all(|f| dataset.has_feature(f))
                } else {
                    features.any(|f| dataset.has_feature(f))
                }
            }
        }
    }

    /// Whether callers may override the weights.
    #[must_use]
    pub const fn is_adjustable(&self) -> bool {
        matches!(&self.scoring, ScoringMethod::Weighted(w) if w.adjustable)
    }

    /// Default weights of a weighted scheme.
    #[must_use]
    pub const fn weights(&self) -> Option<&FeatureWeights> {
        match &self.scoring {
            ScoringMethod::Weighted(w) => Some(&w.weights),
            ScoringMethod::Precomputed(_) => None,
        }
    }

    /// Returns this scheme with its weights replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::NotAdjustable`] unless the scheme is an
    /// adjustable weighted scheme.
    pub fn with_weights(mut self, weights: FeatureWeights) -> Result<Self, ScoringError> {
        match &mut self.scoring {
            ScoringMethod::Weighted(w) if w.adjustable => {
                w.weights = weights;
                Ok(self)
            }
            _ => Err(ScoringError::NotAdjustable { id: self.id }),
        }
    }

    /// Returns this scheme graded under `policy` instead of its default.
    #[must_use]
    pub const fn with_grading(mut self, policy: GradePolicy) -> Self {
        self.grading = policy;
        self
    }

    /// Rows of `working_set` this scheme can score.
    ///
    /// Precomputed schemes drop rows without a finite score; weighted
    /// schemes cover every row.
    #[must_use]
    pub fn coverage(&self, working_set: &Dataset) -> Dataset {
        match &self.scoring {
            ScoringMethod::Precomputed(p) => {
                working_set.retain(|f| f.number(&p.score_column).is_some_and(f64::is_finite))
            }
            ScoringMethod::Weighted(_) => working_set.clone(),
        }
    }

    /// Scores and grades every covered row of `working_set`.
    ///
    /// All statistics (normalization bounds, quartiles) are taken over the
    /// covered rows only.
    #[must_use]
    pub fn compute(&self, working_set: &Dataset) -> ScoredSet {
        let covered = self.coverage(working_set);
        let excluded = working_set.len() - covered.len();

        let facilities = match &self.scoring {
            ScoringMethod::Precomputed(p) => self.pass_through(p, covered),
            ScoringMethod::Weighted(w) => self.aggregate(w, covered),
        };

        log::info!(
            "Scored {} facilities with scheme '{}' ({excluded} not covered)",
            facilities.len(),
            self.id,
        );

        ScoredSet {
            scheme_id: self.id.clone(),
            scheme_name: self.name.clone(),
            grading: self.grading,
            facilities,
        }
    }

    fn pass_through(&self, scoring: &PrecomputedScoring, covered: Dataset) -> Vec<ScoredFacility> {
        let scores: Vec<f64> = covered
            .facilities
            .iter()
            .map(|f| f.number(&scoring.score_column).unwrap_or(0.0))
            .collect();
        let derived = assign_grades(&scores, &self.grading);

        let mut fallbacks = 0_usize;
        let scored: Vec<ScoredFacility> = covered
            .facilities
            .into_iter()
            .zip(scores)
            .zip(derived)
            .map(|((facility, score), derived)| {
                let grade = scoring
                    .grade_column
                    .as_deref()
                    .and_then(|c| facility.text(c))
                    .and_then(|g| g.trim().parse::<Grade>().ok())
                    .unwrap_or_else(|| {
                        fallbacks += 1;
                        derived
                    });
                let breakdown = scoring
                    .components
                    .iter()
                    .map(|c| BreakdownItem {
                        label: c.label.clone(),
                        points: c.points(&facility),
                    })
                    .collect();
                ScoredFacility {
                    facility,
                    score,
                    grade,
                    breakdown,
                }
            })
            .collect();

        if fallbacks > 0 && scoring.grade_column.is_some() {
            log::warn!(
                "Scheme '{}': {fallbacks} rows had no usable grade, derived with {} policy",
                self.id,
                self.grading
            );
        }

        scored
    }

    fn aggregate(&self, scoring: &WeightedScoring, covered: Dataset) -> Vec<ScoredFacility> {
        let aggregate = weighted_scores(&covered.facilities, &covered.features, &scoring.weights);
        let grades = assign_grades(&aggregate.scores, &self.grading);

        covered
            .facilities
            .into_iter()
            .zip(aggregate.scores)
            .zip(aggregate.breakdowns)
            .zip(grades)
            .map(|(((facility, score), breakdown), grade)| ScoredFacility {
                facility,
                score,
                grade,
                breakdown,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use school_zone_facility_models::{AttributeValue, Feature};
    use school_zone_scoring_models::GradeThresholds;

    use super::*;
    use crate::grade::QuartileCuts;

    const PRECOMPUTED: &str = r#"
id = "test_fixed"
name = "Fixed"
description = "Precomputed test scheme"

[scoring]
type = "precomputed"
score_column = "final"
grade_column = "grade"

[[scoring.components]]
label = "Bonus"
column = "bonus"

[[scoring.components]]
label = "Penalty"
column = "penalty"
negate = true

[[scoring.components]]
label = "Base"
constant = 50.0
"#;

    const WEIGHTED: &str = r#"
id = "test_weighted"
name = "Weighted"
description = "Weighted test scheme"

[scoring]
type = "weighted"
adjustable = true

[scoring.weights]
red_surface = 1
incident_count = 1

[grading]
policy = "thresholds"
"#;

    fn facility(id: usize, attrs: &[(&str, AttributeValue)], red: f64) -> Facility {
        Facility {
            id: id.to_string(),
            name: format!("School {id}"),
            category: "Elementary school".to_string(),
            district: "Sujeong".to_string(),
            coordinates: None,
            indicators: BTreeMap::from([(Feature::RedSurface, red)]),
            attributes: attrs
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        }
    }

    fn dataset(facilities: Vec<Facility>) -> Dataset {
        Dataset {
            id: "test".to_string(),
            features: BTreeSet::from([Feature::RedSurface]),
            columns: ["final", "grade", "bonus", "penalty"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            facilities,
        }
    }

    fn num(v: f64) -> AttributeValue {
        AttributeValue::Number(v)
    }

    fn text(v: &str) -> AttributeValue {
        AttributeValue::Text(v.to_string())
    }

    #[test]
    fn precomputed_scheme_excludes_uncovered_rows() {
        let scheme: Scheme = toml::from_str(PRECOMPUTED).unwrap();
        let rows: Vec<Facility> = (0..142)
            .map(|i| {
                if i < 60 {
                    #[allow(clippy::cast_precision_loss)]
                    let score = 40.0 + i as f64;
                    facility(i, &[("final", num(score)), ("grade", text("B"))], 1.0)
                } else {
                    facility(i, &[("grade", text("C"))], 1.0)
                }
            })
            .collect();

        let scored = scheme.compute(&dataset(rows));
        assert_eq!(scored.len(), 60);
        assert!(scored.facilities.iter().all(|f| f.grade == Grade::B));
    }

    #[test]
    fn derived_grades_use_only_covered_rows() {
        let scheme: Scheme = toml::from_str(PRECOMPUTED).unwrap();
        let rows: Vec<Facility> = (0..142)
            .map(|i| {
                if i < 60 {
                    #[allow(clippy::cast_precision_loss)]
                    let score = 40.0 + i as f64;
                    facility(i, &[("final", num(score))], 1.0)
                } else {
                    facility(i, &[("grade", text("A"))], 1.0)
                }
            })
            .collect();

        let scored = scheme.compute(&dataset(rows));
        assert_eq!(scored.len(), 60);

        // Quartiles over 40..=99 are 54.75 / 69.5 / 84.25.
        let scores = scored.scores();
        let cuts = QuartileCuts::from_scores(&scores).unwrap();
        assert!((cuts.p25 - 54.75).abs() < 1e-9);
        assert!((cuts.p50 - 69.5).abs() < 1e-9);
        assert!((cuts.p75 - 84.25).abs() < 1e-9);

        for grade in Grade::all() {
            let count = scored.facilities.iter().filter(|f| f.grade == *grade).count();
            assert_eq!(count, 15, "grade {grade}");
        }
        let mean = scores.iter().sum::<f64>() / 60.0;
        assert!((mean - 69.5).abs() < 1e-9);
        assert_eq!(
            scored.facilities.iter().find(|f| f.score >= 85.0).map(|f| f.grade),
            Some(Grade::A)
        );
        assert_eq!(
            scored.facilities.iter().find(|f| (f.score - 84.0).abs() < 1e-9).map(|f| f.grade),
            Some(Grade::B)
        );
    }

    #[test]
    fn precomputed_scheme_passes_scores_and_components_through() {
        let scheme: Scheme = toml::from_str(PRECOMPUTED).unwrap();
        let rows = vec![facility(
            1,
            &[
                ("final", num(61.5)),
                ("grade", text("A")),
                ("bonus", num(20.0)),
                ("penalty", num(8.5)),
            ],
            0.0,
        )];

        let scored = scheme.compute(&dataset(rows));
        let row = &scored.facilities[0];
        assert!((row.score - 61.5).abs() < f64::EPSILON);
        assert_eq!(row.grade, Grade::A);
        let points: Vec<f64> = row.breakdown.iter().map(|b| b.points).collect();
        assert_eq!(points, vec![20.0, -8.5, 50.0]);
    }

    #[test]
    fn missing_grade_cell_falls_back_to_policy() {
        let scheme: Scheme = toml::from_str(PRECOMPUTED).unwrap();
        let scheme = scheme.with_grading(GradePolicy::Thresholds(GradeThresholds::default()));
        let rows = vec![
            facility(1, &[("final", num(80.0))], 0.0),
            facility(2, &[("final", num(50.0)), ("grade", text("?"))], 0.0),
        ];

        let scored = scheme.compute(&dataset(rows));
        assert_eq!(scored.facilities[0].grade, Grade::A);
        assert_eq!(scored.facilities[1].grade, Grade::D);
    }

    #[test]
    fn precomputed_availability_follows_score_column() {
        let scheme: Scheme = toml::from_str(PRECOMPUTED).unwrap();
        let mut data = dataset(Vec::new());
        assert!(scheme.is_available(&data));
        data.columns.remove("final");
        assert!(!scheme.is_available(&data));
    }

    #[test]
    fn weighted_scheme_scores_live() {
        let scheme: Scheme = toml::from_str(WEIGHTED).unwrap();
        let rows = vec![facility(1, &[], 0.0), facility(2, &[], 10.0)];

        let scored = scheme.compute(&dataset(rows));
        // Only red_surface is present; incident_count is skipped.
        assert!(scored.facilities[0].score.abs() < 1e-9);
        assert!((scored.facilities[1].score - 100.0).abs() < 1e-9);
        assert_eq!(scored.facilities[0].grade, Grade::D);
        assert_eq!(scored.facilities[1].grade, Grade::A);
    }

    #[test]
    fn weights_can_only_be_replaced_when_adjustable() {
        let weighted: Scheme = toml::from_str(WEIGHTED).unwrap();
        let weights = FeatureWeights::new().with(Feature::Crosswalk, 2.0);
        let replaced = weighted.with_weights(weights.clone()).unwrap();
        assert_eq!(replaced.weights(), Some(&weights));

        let fixed: Scheme = toml::from_str(PRECOMPUTED).unwrap();
        assert!(fixed.with_weights(weights).is_err());
    }

    #[test]
    fn all_zero_weights_score_fifty() {
        let scheme: Scheme = toml::from_str(WEIGHTED).unwrap();
        let scheme = scheme
            .with_weights(
                FeatureWeights::new()
                    .with(Feature::RedSurface, 0.0)
                    .with(Feature::IncidentCount, 0.0),
            )
            .unwrap();
        let rows = vec![facility(1, &[], 3.0), facility(2, &[], 9.0)];

        let scored = scheme.compute(&dataset(rows));
        assert!(
            scored
                .facilities
                .iter()
                .all(|f| (f.score - 50.0).abs() < f64::EPSILON)
        );
    }
}
