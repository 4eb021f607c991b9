//! Improvement suggestions for low-graded facilities.
//!
//! Advisory only: nothing here feeds back into scores or grades.

use school_zone_facility_models::{Feature, Polarity};
use school_zone_scoring_models::{
    Advice, ReferenceStat, ScoredFacility, ScoredSet, Suggestion, SuggestionSettings,
};

use crate::grade::quantile;

/// Column statistics for one candidate feature over the scored set.
struct Candidate {
    feature: Feature,
    max: f64,
    reference: f64,
}

/// Builds one suggestion per facility whose grade is in
/// `settings.grades`, lowest score first.
///
/// The suggested feature is the candidate with the lowest `raw / max`
/// ratio, ties going to the earlier candidate in `settings.features`.
/// Candidates are limited to safer-polarity features with a positive
/// maximum over the set.
#[must_use]
pub fn suggestions(set: &ScoredSet, settings: &SuggestionSettings) -> Vec<Suggestion> {
    let candidates: Vec<Candidate> = settings
        .features
        .iter()
        .copied()
        .filter(|f| f.polarity() == Polarity::Safer)
        .filter_map(|feature| candidate(set, feature, settings.reference))
        .collect();

    let mut flagged: Vec<&ScoredFacility> = set
        .facilities
        .iter()
        .filter(|f| settings.grades.contains(&f.grade))
        .collect();
    flagged.sort_by(|a, b| a.score.total_cmp(&b.score));

    flagged
        .into_iter()
        .map(|scored| Suggestion {
            facility_id: scored.facility.id.clone(),
            facility_name: scored.facility.name.clone(),
            grade: scored.grade,
            score: scored.score,
            advice: advise(scored, &candidates, settings.reference),
        })
        .collect()
}

fn candidate(set: &ScoredSet, feature: Feature, stat: ReferenceStat) -> Option<Candidate> {
    let mut values: Vec<f64> = set
        .facilities
        .iter()
        .map(|f| f.facility.indicator(feature))
        .collect();
    values.sort_by(f64::total_cmp);

    let max = values.last().copied()?;
    if max <= 0.0 {
        return None;
    }

    let reference = match stat {
        ReferenceStat::Maximum => max,
        ReferenceStat::Median => quantile(&values, 0.5)?,
    };

    Some(Candidate {
        feature,
        max,
        reference,
    })
}

fn advise(scored: &ScoredFacility, candidates: &[Candidate], stat: ReferenceStat) -> Advice {
    let mut weakest: Option<(&Candidate, f64)> = None;
    for candidate in candidates {
        let ratio = scored.facility.indicator(candidate.feature) / candidate.max;
        if weakest.is_none_or(|(_, best)| ratio < best) {
            weakest = Some((candidate, ratio));
        }
    }

    weakest.map_or(Advice::FurtherAnalysis, |(candidate, _)| Advice::Reinforce {
        feature: candidate.feature,
        current: scored.facility.indicator(candidate.feature),
        reference: candidate.reference,
        stat,
    })
}
