#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! School-zone facility records, indicator vocabulary, and safety grades.
//!
//! This crate defines the canonical indicator vocabulary shared by every
//! dataset and scoring scheme. Each [`Feature`] carries a fixed
//! [`Polarity`] that decides whether a higher raw count makes a site safer
//! or riskier.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Direction in which a raw indicator moves safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Polarity {
    /// More of this indicator makes the site safer.
    Safer,
    /// More of this indicator marks the site as riskier.
    Riskier,
}

/// Raw safety/risk indicators recorded per facility.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Feature {
    // ── Facilities ──────────────────────────────────────
    /// Red road-surface markings
    RedSurface,
    /// Signal lights
    SignalLight,
    /// Marked crosswalks
    Crosswalk,
    /// Road safety signage
    RoadSafetySign,
    /// Neighbourhood CCTV cameras
    Cctv,
    /// Automated traffic enforcement cameras
    EnforcementCamera,
    /// Protection-zone sign boards
    ZoneSign,
    /// Yellow-carpet waiting areas at crossings
    YellowCarpet,
    /// Anti-jaywalking fences
    JaywalkFence,

    // ── Context ─────────────────────────────────────────
    /// Historical incident count near the site
    IncidentCount,
    /// Share of residents aged 0-14, in percent
    ChildRatio,
}

impl Feature {
    /// Returns the fixed polarity of this indicator.
    ///
    /// CCTV and enforcement cameras are installed where incidents cluster,
    /// so their raw counts are read as a risk signal.
    #[must_use]
    pub const fn polarity(self) -> Polarity {
        match self {
            Self::Cctv | Self::EnforcementCamera | Self::IncidentCount => Polarity::Riskier,
            Self::RedSurface
            | Self::SignalLight
            | Self::Crosswalk
            | Self::RoadSafetySign
            | Self::ZoneSign
            | Self::YellowCarpet
            | Self::JaywalkFence
            | Self::ChildRatio => Polarity::Safer,
        }
    }

    /// Whether this indicator counts a physical installation that can be
    /// added to a site.
    #[must_use]
    pub const fn is_facility(self) -> bool {
        !matches!(self, Self::IncidentCount | Self::ChildRatio)
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RedSurface => "Red road surface",
            Self::SignalLight => "Signal lights",
            Self::Crosswalk => "Crosswalks",
            Self::RoadSafetySign => "Road safety signs",
            Self::Cctv => "CCTV",
            Self::EnforcementCamera => "Enforcement cameras",
            Self::ZoneSign => "Protection-zone signs",
            Self::YellowCarpet => "Yellow carpets",
            Self::JaywalkFence => "Anti-jaywalking fences",
            Self::IncidentCount => "Incidents",
            Self::ChildRatio => "Child ratio (%)",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::RedSurface,
            Self::SignalLight,
            Self::Crosswalk,
            Self::RoadSafetySign,
            Self::Cctv,
            Self::EnforcementCamera,
            Self::ZoneSign,
            Self::YellowCarpet,
            Self::JaywalkFence,
            Self::IncidentCount,
            Self::ChildRatio,
        ]
    }
}

/// Letter grade, from A (best) to D (worst).
///
/// The derived ordering follows declaration order, so `Grade::A < Grade::D`
/// and "better" means "smaller".
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Grade {
    /// Excellent
    A,
    /// Good
    B,
    /// Fair
    C,
    /// Needs attention
    D,
}

impl Grade {
    /// Display label used in tables and exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A (Excellent)",
            Self::B => "B (Good)",
            Self::C => "C (Fair)",
            Self::D => "D (Caution)",
        }
    }

    /// Whether this grade counts toward the "safe" share (A or B).
    #[must_use]
    pub const fn is_safe(self) -> bool {
        matches!(self, Self::A | Self::B)
    }

    /// Returns all grades, best first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::A, Self::B, Self::C, Self::D]
    }
}

/// WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Value of a non-indicator column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A finite numeric cell.
    Number(f64),
    /// Any other non-empty cell.
    Text(String),
}

impl AttributeValue {
    /// Returns the numeric value, if this is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Returns the text value, if this is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

/// One physical site (school, kindergarten, crossing, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    /// Stable identifier, unique within a dataset.
    pub id: String,
    /// Facility name.
    pub name: String,
    /// Facility type (e.g. "Elementary school").
    pub category: String,
    /// Administrative district.
    pub district: String,
    /// Location, when known.
    pub coordinates: Option<Coordinates>,
    /// Raw indicator values. Only finite cells are stored.
    pub indicators: BTreeMap<Feature, f64>,
    /// Every other column, keyed by its header.
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Facility {
    /// Raw value of an indicator; missing cells read as zero.
    #[must_use]
    pub fn indicator(&self, feature: Feature) -> f64 {
        self.indicators.get(&feature).copied().unwrap_or(0.0)
    }

    /// Numeric attribute value, if the cell is present and numeric.
    #[must_use]
    pub fn number(&self, column: &str) -> Option<f64> {
        self.attributes.get(column).and_then(AttributeValue::as_number)
    }

    /// Text attribute value, if the cell is present and non-numeric.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<&str> {
        self.attributes.get(column).and_then(AttributeValue::as_text)
    }
}

/// An immutable table of facilities together with the columns it exposes.
///
/// The same type represents a full snapshot and any filtered working set
/// derived from it; column presence is carried over unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Identifier of the dataset definition this table was read with.
    pub id: String,
    /// Indicator columns present in the source.
    pub features: BTreeSet<Feature>,
    /// Attribute columns present in the source.
    pub columns: BTreeSet<String>,
    /// Rows.
    pub facilities: Vec<Facility>,
}

impl Dataset {
    /// Whether the source carried a column for `feature`.
    #[must_use]
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Whether the source carried an attribute column named `column`.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// Returns a new table holding only the rows matching `predicate`.
    #[must_use]
    pub fn retain(&self, mut predicate: impl FnMut(&Facility) -> bool) -> Self {
        Self {
            id: self.id.clone(),
            features: self.features.clone(),
            columns: self.columns.clone(),
            facilities: self
                .facilities
                .iter()
                .filter(|f| predicate(f))
                .cloned()
                .collect(),
        }
    }

    /// Sorted, de-duplicated category values.
    #[must_use]
    pub fn categories(&self) -> BTreeSet<&str> {
        self.facilities.iter().map(|f| f.category.as_str()).collect()
    }

    /// Sorted, de-duplicated district values.
    #[must_use]
    pub fn districts(&self) -> BTreeSet<&str> {
        self.facilities.iter().map(|f| f.district.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn riskier_features_are_incidents_and_cameras() {
        let riskier: Vec<Feature> = Feature::all()
            .iter()
            .copied()
            .filter(|f| f.polarity() == Polarity::Riskier)
            .collect();
        assert_eq!(
            riskier,
            vec![
                Feature::Cctv,
                Feature::EnforcementCamera,
                Feature::IncidentCount
            ]
        );
    }

    #[test]
    fn vocabulary_has_eleven_features_nine_facilities() {
        assert_eq!(Feature::all().len(), 11);
        assert_eq!(Feature::all().iter().filter(|f| f.is_facility()).count(), 9);
    }

    #[test]
    fn feature_parses_from_snake_case() {
        assert_eq!("red_surface".parse::<Feature>().unwrap(), Feature::RedSurface);
        assert_eq!("CCTV".parse::<Feature>().unwrap(), Feature::Cctv);
        assert!("lamp_post".parse::<Feature>().is_err());
    }

    #[test]
    fn grade_order_is_best_first() {
        assert!(Grade::A < Grade::B);
        assert!(Grade::C < Grade::D);
        assert_eq!("b".parse::<Grade>().unwrap(), Grade::B);
        assert!(Grade::B.is_safe());
        assert!(!Grade::C.is_safe());
    }

    #[test]
    fn missing_indicator_reads_as_zero() {
        let facility = Facility {
            id: "1".to_string(),
            name: "North Elementary".to_string(),
            category: "Elementary school".to_string(),
            district: "Sujeong".to_string(),
            coordinates: None,
            indicators: BTreeMap::from([(Feature::Crosswalk, 4.0)]),
            attributes: BTreeMap::new(),
        };
        assert!((facility.indicator(Feature::Crosswalk) - 4.0).abs() < f64::EPSILON);
        assert!(facility.indicator(Feature::Cctv).abs() < f64::EPSILON);
    }

    #[test]
    fn attribute_value_serializes_untagged() {
        let json = serde_json::to_string(&AttributeValue::Number(1.5)).unwrap();
        assert_eq!(json, "1.5");
        let json = serde_json::to_string(&AttributeValue::Text("A".to_string())).unwrap();
        assert_eq!(json, "\"A\"");
    }
}
