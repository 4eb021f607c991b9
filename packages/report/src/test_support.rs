use std::collections::BTreeMap;

use school_zone_facility_models::{Coordinates, Facility, Feature, Grade};
use school_zone_scoring_models::{GradePolicy, ScoredFacility, ScoredSet};

pub fn scored(
    id: &str,
    category: &str,
    district: &str,
    score: f64,
    grade: Grade,
    incidents: f64,
) -> ScoredFacility {
    ScoredFacility {
        facility: Facility {
            id: id.to_string(),
            name: format!("School {id}"),
            category: category.to_string(),
            district: district.to_string(),
            coordinates: Some(Coordinates {
                latitude: 37.4,
                longitude: 127.1,
            }),
            indicators: BTreeMap::from([
                (Feature::IncidentCount, incidents),
                (Feature::Crosswalk, 2.0),
            ]),
            attributes: BTreeMap::new(),
        },
        score,
        grade,
        breakdown: Vec::new(),
    }
}

pub fn set(facilities: Vec<ScoredFacility>) -> ScoredSet {
    ScoredSet {
        scheme_id: "custom".to_string(),
        scheme_name: "Custom weights".to_string(),
        grading: GradePolicy::Quartile,
        facilities,
    }
}
