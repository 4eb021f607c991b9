//! Grade filtering.
//!
//! Unlike category and district filters, the grade filter runs after
//! grading: it hides rows without moving any quartile boundary or
//! suggestion reference.

use std::collections::BTreeSet;

use school_zone_facility_models::Grade;
use school_zone_scoring_models::ScoredSet;

/// Keeps rows whose grade is in `grades`. An empty set keeps every row.
#[must_use]
pub fn filter_grades(set: &ScoredSet, grades: &BTreeSet<Grade>) -> ScoredSet {
    if grades.is_empty() {
        return set.clone();
    }
    set.retain(|f| grades.contains(&f.grade))
}
