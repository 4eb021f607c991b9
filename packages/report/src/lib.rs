#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reporting over scored school-zone working sets.
//!
//! Consumes a [`ScoredSet`] and produces the statistics a dashboard shows
//! (KPIs, rankings, grade and group summaries, the D-grade caution list,
//! improvement suggestions) along with CSV, GeoJSON, and JSON exports.

pub mod export;
pub mod filter;
pub mod summary;

#[cfg(test)]
mod test_support;

use std::collections::BTreeSet;

use school_zone_facility_models::Grade;
use school_zone_scoring::suggest::suggestions;
use school_zone_scoring_models::{ScoredFacility, ScoredSet, Suggestion, SuggestionSettings};
use serde::Serialize;

use crate::filter::filter_grades;
use crate::summary::{
    CAUTION_LIMIT, CautionList, ComponentMean, GradeSummary, GroupKey, GroupSummary, Kpis,
    bottom_n, caution_list, component_means, grade_summary, group_summary, kpis, top_n,
};

/// Default length of the top/bottom rankings.
pub const DEFAULT_RANKING_SIZE: usize = 5;

/// One line of a top/bottom ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedFacility {
    /// 1-based position.
    pub rank: usize,
    /// Facility identifier.
    pub id: String,
    /// Facility name.
    pub name: String,
    /// Facility type.
    pub category: String,
    /// District.
    pub district: String,
    /// Active grade.
    pub grade: Grade,
    /// Active score.
    pub score: f64,
}

impl RankedFacility {
    fn ranked(rows: Vec<&ScoredFacility>) -> Vec<Self> {
        rows.into_iter()
            .enumerate()
            .map(|(i, scored)| Self {
                rank: i + 1,
                id: scored.facility.id.clone(),
                name: scored.facility.name.clone(),
                category: scored.facility.category.clone(),
                district: scored.facility.district.clone(),
                grade: scored.grade,
                score: scored.score,
            })
            .collect()
    }
}

/// Everything the dashboard shows for one working set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Scheme identifier.
    pub scheme_id: String,
    /// Scheme display name.
    pub scheme_name: String,
    /// Grading policy, as displayed.
    pub grading: String,
    /// Headline numbers.
    pub kpis: Kpis,
    /// Highest scores, best first.
    pub top: Vec<RankedFacility>,
    /// Lowest scores, worst first.
    pub bottom: Vec<RankedFacility>,
    /// Per-grade counts and means, A through D.
    pub grades: Vec<GradeSummary>,
    /// Per-category summaries, weakest first.
    pub categories: Vec<GroupSummary>,
    /// Per-district summaries, weakest first.
    pub districts: Vec<GroupSummary>,
    /// Mean breakdown components.
    pub components: Vec<ComponentMean>,
    /// D-grade warning list.
    pub caution: CautionList,
    /// Improvement suggestions, lowest score first.
    pub suggestions: Vec<Suggestion>,
}

/// Builds the report for the rows of `scored` whose grade is in `grades`
/// (empty shows every row), ranking `ranking_size` facilities at each end
/// and suggesting improvements per `settings`.
///
/// Suggestion references (column maximum or median) are taken over all of
/// `scored`, so hiding grades never changes the advice for a shown row.
#[must_use]
pub fn build_report(
    scored: &ScoredSet,
    grades: &BTreeSet<Grade>,
    settings: &SuggestionSettings,
    ranking_size: usize,
) -> Report {
    let shown = filter_grades(scored, grades);
    let mut advice = suggestions(scored, settings);
    advice.retain(|s| grades.is_empty() || grades.contains(&s.grade));

    Report {
        scheme_id: shown.scheme_id.clone(),
        scheme_name: shown.scheme_name.clone(),
        grading: shown.grading.to_string(),
        kpis: kpis(&shown),
        top: RankedFacility::ranked(top_n(&shown, ranking_size)),
        bottom: RankedFacility::ranked(bottom_n(&shown, ranking_size)),
        grades: grade_summary(&shown),
        categories: group_summary(&shown, GroupKey::Category),
        districts: group_summary(&shown, GroupKey::District),
        components: component_means(&shown),
        caution: caution_list(&shown, CAUTION_LIMIT),
        suggestions: advice,
    }
}
