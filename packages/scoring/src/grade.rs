//! Letter-grade assignment.
//!
//! Two policies: quartile cut points computed from the working set, and
//! fixed absolute thresholds. Under either, a higher score never receives a
//! worse grade.

use school_zone_facility_models::Grade;
use school_zone_scoring_models::{GradePolicy, GradeThresholds};

/// The 25th, 50th, and 75th percentiles of a score column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuartileCuts {
    /// 25th percentile.
    pub p25: f64,
    /// Median.
    pub p50: f64,
    /// 75th percentile.
    pub p75: f64,
}

impl QuartileCuts {
    /// Computes the cut points of `scores`, or `None` when there are no
    /// finite scores.
    #[must_use]
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            p25: quantile(&sorted, 0.25)?,
            p50: quantile(&sorted, 0.50)?,
            p75: quantile(&sorted, 0.75)?,
        })
    }

    /// Grade for `score` against these cut points.
    #[must_use]
    pub fn grade(&self, score: f64) -> Grade {
        if score >= self.p75 {
            Grade::A
        } else if score >= self.p50 {
            Grade::B
        } else if score >= self.p25 {
            Grade::C
        } else {
            Grade::D
        }
    }
}

/// Quantile `q` of an ascending slice, interpolating linearly between the
/// two nearest order statistics at position `q * (n - 1)`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some((sorted[upper] - sorted[lower]).mul_add(fraction, sorted[lower]))
}

/// Grade for `score` against fixed thresholds.
#[must_use]
pub fn threshold_grade(score: f64, thresholds: &GradeThresholds) -> Grade {
    if score >= thresholds.a {
        Grade::A
    } else if score >= thresholds.b {
        Grade::B
    } else if score >= thresholds.c {
        Grade::C
    } else {
        Grade::D
    }
}

/// Assigns one grade per score under `policy`.
///
/// For [`GradePolicy::Quartile`] the cut points come from `scores`
/// themselves, so the result depends on which records are in the set.
#[must_use]
pub fn assign_grades(scores: &[f64], policy: &GradePolicy) -> Vec<Grade> {
    match policy {
        GradePolicy::Quartile => {
            let Some(cuts) = QuartileCuts::from_scores(scores) else {
                return vec![Grade::D; scores.len()];
            };
            log::debug!(
                "Quartile cuts: p25={:.2} p50={:.2} p75={:.2}",
                cuts.p25,
                cuts.p50,
                cuts.p75
            );
            scores.iter().map(|s| cuts.grade(*s)).collect()
        }
        GradePolicy::Thresholds(thresholds) => scores
            .iter()
            .map(|s| threshold_grade(*s, thresholds))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_scores() -> Vec<f64> {
        (1..=10).map(|i| f64::from(i) * 10.0).collect()
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        // Linear interpolation at q*(n-1), the pandas default: p25 is 32.5, not 30.
        let cuts = QuartileCuts::from_scores(&ten_scores()).unwrap();
        assert!((cuts.p25 - 32.5).abs() < 1e-9);
        assert!((cuts.p50 - 55.0).abs() < 1e-9);
        assert!((cuts.p75 - 77.5).abs() < 1e-9);
    }

    #[test]
    fn quartile_grades_against_cut_points() {
        let cuts = QuartileCuts::from_scores(&ten_scores()).unwrap();
        assert_eq!(cuts.grade(80.0), Grade::A);
        assert_eq!(cuts.grade(77.5), Grade::A);
        assert_eq!(cuts.grade(60.0), Grade::B);
        assert_eq!(cuts.grade(55.0), Grade::B);
        assert_eq!(cuts.grade(35.0), Grade::C);
        assert_eq!(cuts.grade(30.0), Grade::D);
    }

    #[test]
    fn quartile_grades_are_monotonic() {
        let scores = vec![63.0, 12.5, 88.0, 40.0, 40.0, 71.2, 5.0, 99.9, 55.5, 23.0, 67.0];
        let grades = assign_grades(&scores, &GradePolicy::Quartile);

        let mut pairs: Vec<(f64, Grade)> = scores.into_iter().zip(grades).collect();
        pairs.sort_by(|a, b| b.0.total_cmp(&a.0));
        for window in pairs.windows(2) {
            assert!(
                window[0].1 <= window[1].1,
                "grade got better as score dropped: {window:?}"
            );
        }
    }

    #[test]
    fn quartile_grades_spread_over_all_letters() {
        let grades = assign_grades(&ten_scores(), &GradePolicy::Quartile);
        for grade in Grade::all() {
            assert!(grades.contains(grade), "missing {grade}");
        }
    }

    #[test]
    fn thresholds_are_inclusive_of_better_grade() {
        let t = GradeThresholds::default();
        assert_eq!(threshold_grade(80.0, &t), Grade::A);
        assert_eq!(threshold_grade(75.0, &t), Grade::A);
        assert_eq!(threshold_grade(70.0, &t), Grade::B);
        assert_eq!(threshold_grade(65.0, &t), Grade::B);
        assert_eq!(threshold_grade(60.0, &t), Grade::C);
        assert_eq!(threshold_grade(55.0, &t), Grade::C);
        assert_eq!(threshold_grade(54.99, &t), Grade::D);
        assert_eq!(threshold_grade(40.0, &t), Grade::D);
    }

    #[test]
    fn threshold_grades_ignore_working_set() {
        let policy = GradePolicy::Thresholds(GradeThresholds::default());
        let all = assign_grades(&[90.0, 70.0, 60.0, 10.0], &policy);
        let subset = assign_grades(&[70.0, 60.0], &policy);
        assert_eq!(all[1..3], subset[..]);
    }

    #[test]
    fn refiltering_reassigns_quartile_grades() {
        let scores = ten_scores();
        let before = assign_grades(&scores, &GradePolicy::Quartile);

        let upper_half = &scores[5..];
        let after = assign_grades(upper_half, &GradePolicy::Quartile);

        let changed = before[5..].iter().zip(&after).any(|(b, a)| b != a);
        assert!(changed, "dropping the lower half should move grade boundaries");
    }

    #[test]
    fn empty_scores_produce_no_cuts() {
        assert!(QuartileCuts::from_scores(&[]).is_none());
        assert!(assign_grades(&[], &GradePolicy::Quartile).is_empty());
    }

    #[test]
    fn single_score_is_top_grade() {
        assert_eq!(assign_grades(&[42.0], &GradePolicy::Quartile), vec![Grade::A]);
    }
}
