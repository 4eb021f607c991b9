//! Aggregate statistics over a scored working set.
//!
//! Every function here accepts an empty set and reports zero counts and
//! `None`/zero means instead of failing.

use std::collections::BTreeMap;

use school_zone_facility_models::{Feature, Grade};
use school_zone_scoring_models::{ScoredFacility, ScoredSet};
use serde::Serialize;

/// Names shown before the caution list is truncated.
pub const CAUTION_LIMIT: usize = 10;

// ── KPIs ─────────────────────────────────────────────────────────────────

/// Headline numbers for the working set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    /// Number of facilities.
    pub count: usize,
    /// Mean active score, `0.0` for an empty set.
    pub mean_score: f64,
    /// Share of A and B grades, in percent.
    pub safe_ratio: f64,
    /// Sum of incident counts.
    pub total_incidents: f64,
}

/// Computes the headline numbers.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn kpis(set: &ScoredSet) -> Kpis {
    let count = set.len();
    let safe = set.facilities.iter().filter(|f| f.grade.is_safe()).count();

    Kpis {
        count,
        mean_score: mean(set.facilities.iter().map(|f| f.score)).unwrap_or(0.0),
        safe_ratio: if count == 0 {
            0.0
        } else {
            safe as f64 / count as f64 * 100.0
        },
        total_incidents: set
            .facilities
            .iter()
            .map(|f| f.facility.indicator(Feature::IncidentCount))
            .sum(),
    }
}

// ── Rankings ─────────────────────────────────────────────────────────────

/// The `n` highest-scoring facilities, best first. Ties keep row order.
#[must_use]
pub fn top_n(set: &ScoredSet, n: usize) -> Vec<&ScoredFacility> {
    let mut ranked: Vec<&ScoredFacility> = set.facilities.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(n);
    ranked
}

/// The `n` lowest-scoring facilities, worst first. Ties keep row order.
#[must_use]
pub fn bottom_n(set: &ScoredSet, n: usize) -> Vec<&ScoredFacility> {
    let mut ranked: Vec<&ScoredFacility> = set.facilities.iter().collect();
    ranked.sort_by(|a, b| a.score.total_cmp(&b.score));
    ranked.truncate(n);
    ranked
}

// ── Grade summary ────────────────────────────────────────────────────────

/// Count and means for one grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    /// The grade.
    pub grade: Grade,
    /// Facilities with this grade.
    pub count: usize,
    /// Mean incident count, `None` when no facility has this grade.
    pub mean_incidents: Option<f64>,
    /// Mean active score, `None` when no facility has this grade.
    pub mean_score: Option<f64>,
}

/// One row per grade, A through D, including empty grades.
#[must_use]
pub fn grade_summary(set: &ScoredSet) -> Vec<GradeSummary> {
    Grade::all()
        .iter()
        .map(|&grade| {
            let rows: Vec<&ScoredFacility> =
                set.facilities.iter().filter(|f| f.grade == grade).collect();
            GradeSummary {
                grade,
                count: rows.len(),
                mean_incidents: mean(
                    rows.iter()
                        .map(|f| f.facility.indicator(Feature::IncidentCount)),
                ),
                mean_score: mean(rows.iter().map(|f| f.score)),
            }
        })
        .collect()
}

// ── Group summaries ──────────────────────────────────────────────────────

/// Which facility field to group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// Facility type.
    Category,
    /// Administrative district.
    District,
}

impl GroupKey {
    fn of(self, facility: &ScoredFacility) -> &str {
        match self {
            Self::Category => &facility.facility.category,
            Self::District => &facility.facility.district,
        }
    }
}

/// Count and means for one category or district.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    /// Category or district name.
    pub key: String,
    /// Facilities in the group.
    pub count: usize,
    /// Mean active score.
    pub mean_score: f64,
    /// Mean incident count.
    pub mean_incidents: f64,
}

/// Groups the set by `key`, sorted by mean score ascending (weakest group
/// first). Equal means keep name order.
#[must_use]
pub fn group_summary(set: &ScoredSet, key: GroupKey) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<&str, Vec<&ScoredFacility>> = BTreeMap::new();
    for facility in &set.facilities {
        groups.entry(key.of(facility)).or_default().push(facility);
    }

    let mut summaries: Vec<GroupSummary> = groups
        .into_iter()
        .map(|(name, rows)| GroupSummary {
            key: name.to_string(),
            count: rows.len(),
            mean_score: mean(rows.iter().map(|f| f.score)).unwrap_or(0.0),
            mean_incidents: mean(
                rows.iter()
                    .map(|f| f.facility.indicator(Feature::IncidentCount)),
            )
            .unwrap_or(0.0),
        })
        .collect();
    summaries.sort_by(|a, b| a.mean_score.total_cmp(&b.mean_score));
    summaries
}

// ── Components ───────────────────────────────────────────────────────────

/// Mean contribution of one breakdown component.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMean {
    /// Component label.
    pub label: String,
    /// Mean points over rows carrying the component.
    pub mean: f64,
}

/// Mean of each breakdown component, in first-seen order.
#[must_use]
pub fn component_means(set: &ScoredSet) -> Vec<ComponentMean> {
    set.component_labels()
        .into_iter()
        .map(|label| {
            let values = set
                .facilities
                .iter()
                .flat_map(|f| &f.breakdown)
                .filter(|item| item.label == label)
                .map(|item| item.points);
            ComponentMean {
                mean: mean(values).unwrap_or(0.0),
                label,
            }
        })
        .collect()
}

// ── Caution list ─────────────────────────────────────────────────────────

/// D-grade facilities named in the warning banner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CautionList {
    /// Total D-grade facilities.
    pub total: usize,
    /// Up to [`CAUTION_LIMIT`] names, in row order.
    pub names: Vec<String>,
    /// Facilities not named.
    pub overflow: usize,
}

impl CautionList {
    /// Whether there is anything to warn about.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Collects D-grade facility names, keeping at most `limit`.
#[must_use]
pub fn caution_list(set: &ScoredSet, limit: usize) -> CautionList {
    let flagged: Vec<&str> = set
        .facilities
        .iter()
        .filter(|f| f.grade == Grade::D)
        .map(|f| f.facility.name.as_str())
        .collect();

    CautionList {
        total: flagged.len(),
        names: flagged.iter().take(limit).map(|n| (*n).to_string()).collect(),
        overflow: flagged.len().saturating_sub(limit),
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{scored, set};

    fn sample() -> ScoredSet {
        set(vec![
            scored("a", "초등학교", "분당구", 90.0, Grade::A, 1.0),
            scored("b", "유치원", "분당구", 70.0, Grade::B, 2.0),
            scored("c", "초등학교", "수정구", 50.0, Grade::C, 4.0),
            scored("d", "어린이집", "중원구", 20.0, Grade::D, 6.0),
            scored("e", "초등학교", "중원구", 10.0, Grade::D, 8.0),
        ])
    }

    #[test]
    fn kpis_over_working_set() {
        let k = kpis(&sample());
        assert_eq!(k.count, 5);
        assert!((k.mean_score - 48.0).abs() < 1e-9);
        assert!((k.safe_ratio - 40.0).abs() < 1e-9);
        assert!((k.total_incidents - 21.0).abs() < 1e-9);
    }

    #[test]
    fn empty_set_reports_zeroes() {
        let empty = set(Vec::new());
        let k = kpis(&empty);
        assert_eq!(k.count, 0);
        assert!(k.mean_score.abs() < f64::EPSILON);
        assert!(k.safe_ratio.abs() < f64::EPSILON);
        assert!(top_n(&empty, 5).is_empty());
        assert!(group_summary(&empty, GroupKey::District).is_empty());
        assert!(caution_list(&empty, CAUTION_LIMIT).is_empty());
        assert!(grade_summary(&empty).iter().all(|g| g.mean_score.is_none()));
    }

    #[test]
    fn rankings() {
        let data = sample();
        let top: Vec<&str> = top_n(&data, 2)
            .iter()
            .map(|f| f.facility.id.as_str())
            .collect();
        let bottom: Vec<&str> = bottom_n(&data, 2)
            .iter()
            .map(|f| f.facility.id.as_str())
            .collect();
        assert_eq!(top, vec!["a", "b"]);
        assert_eq!(bottom, vec!["e", "d"]);
        assert_eq!(top_n(&data, 50).len(), 5);
    }

    #[test]
    fn grade_summary_has_all_grades_in_order() {
        let mut data = sample();
        data.facilities.retain(|f| f.grade != Grade::B);

        let summary = grade_summary(&data);
        let grades: Vec<Grade> = summary.iter().map(|g| g.grade).collect();
        assert_eq!(grades, Grade::all());

        assert_eq!(summary[1].count, 0);
        assert!(summary[1].mean_score.is_none());
        assert_eq!(summary[3].count, 2);
        assert_eq!(summary[3].mean_incidents, Some(7.0));
        assert_eq!(summary[3].mean_score, Some(15.0));
    }

    #[test]
    fn groups_sorted_by_mean_score() {
        let districts = group_summary(&sample(), GroupKey::District);
        let keys: Vec<&str> = districts.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["중원구", "수정구", "분당구"]);
        assert_eq!(districts[2].count, 2);
        assert!((districts[2].mean_score - 80.0).abs() < 1e-9);

        let categories = group_summary(&sample(), GroupKey::Category);
        assert_eq!(categories[0].key, "어린이집");
        assert_eq!(categories.iter().map(|g| g.count).sum::<usize>(), 5);
    }

    #[test]
    fn caution_list_truncates() {
        let rows = (0..13)
            .map(|i| scored(&format!("d{i}"), "초등학교", "분당구", 5.0, Grade::D, 0.0))
            .collect();
        let list = caution_list(&set(rows), CAUTION_LIMIT);
        assert_eq!(list.total, 13);
        assert_eq!(list.names.len(), 10);
        assert_eq!(list.names[0], "School d0");
        assert_eq!(list.overflow, 3);
    }

    #[test]
    fn component_means_follow_breakdown() {
        use school_zone_scoring_models::BreakdownItem;

        let mut data = sample();
        for (i, f) in data.facilities.iter_mut().enumerate() {
            f.breakdown = vec![
                BreakdownItem {
                    label: "Base".to_string(),
                    points: 50.0,
                },
                BreakdownItem {
                    label: "Penalty total".to_string(),
                    points: -f64::from(u8::try_from(i).unwrap()),
                },
            ];
        }
        let means = component_means(&data);
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].label, "Base");
        assert!((means[0].mean - 50.0).abs() < 1e-9);
        assert!((means[1].mean + 2.0).abs() < 1e-9);
    }
}
