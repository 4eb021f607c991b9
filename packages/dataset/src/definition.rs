//! Config-driven dataset definition.
//!
//! [`DatasetDefinition`] captures the header names of one CSV layout so a
//! single generic loader handles every dataset variant.

use std::collections::BTreeMap;

use school_zone_facility_models::Feature;
use serde::Deserialize;

use crate::DatasetError;

// ── Top-level dataset definition ─────────────────────────────────────────

/// A complete, config-driven dataset layout.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"initial"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// One-line description shown in listings.
    pub description: String,
    /// Row count of the published export. A mismatch is logged, not fatal.
    #[serde(default)]
    pub expected_records: Option<usize>,
    /// Conventional file name of the export inside a data directory.
    #[serde(default)]
    pub file: Option<String>,
    /// Identity and location headers.
    pub columns: ColumnMapping,
    /// Header for each indicator. Indicators whose header is missing from a
    /// file are skipped with a warning.
    #[serde(default)]
    pub indicators: BTreeMap<Feature, String>,
}

// ── Column mapping ───────────────────────────────────────────────────────

/// Header names for identity and location fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    /// Stable identifier. When absent, the facility name is used.
    #[serde(default)]
    pub id: Option<String>,
    /// Facility name.
    pub name: String,
    /// Facility type.
    pub category: String,
    /// Administrative district.
    pub district: String,
    /// Latitude in degrees.
    #[serde(default)]
    pub latitude: Option<String>,
    /// Longitude in degrees.
    #[serde(default)]
    pub longitude: Option<String>,
}

impl ColumnMapping {
    /// Headers that must be present in every file.
    #[must_use]
    pub fn required(&self) -> Vec<&str> {
        let mut required = vec![
            self.name.as_str(),
            self.category.as_str(),
            self.district.as_str(),
        ];
        if let Some(id) = &self.id {
            required.push(id.as_str());
        }
        required
    }

    /// Whether `header` is consumed by an identity or location field.
    #[must_use]
    pub fn is_mapped(&self, header: &str) -> bool {
        header == self.name
            || header == self.category
            || header == self.district
            || self.id.as_deref() == Some(header)
            || self.latitude.as_deref() == Some(header)
            || self.longitude.as_deref() == Some(header)
    }
}

/// Parses a TOML string into a [`DatasetDefinition`].
///
/// # Errors
///
/// Returns [`DatasetError::Config`] if the TOML is malformed.
pub fn parse_dataset_toml(toml: &str) -> Result<DatasetDefinition, DatasetError> {
    Ok(toml::from_str(toml)?)
}
