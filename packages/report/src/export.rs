//! Tabular and map exports of a scored working set.
//!
//! CSV rows carry identity, grade, score, the active scheme's breakdown,
//! and the raw indicators. GeoJSON output holds only rows with
//! coordinates.

use std::io::Write;

use geojson::{FeatureCollection, Geometry, JsonObject, Value};
use school_zone_facility_models::Feature;
use school_zone_scoring_models::{ScoredFacility, ScoredSet};
use serde::Serialize;

/// Facility type drawn with the larger marker.
const PRIMARY_CATEGORY: &str = "초등학교";

/// Marker radius for [`PRIMARY_CATEGORY`] sites.
const PRIMARY_MARKER_RADIUS: u32 = 9;

/// Marker radius for every other site.
const MARKER_RADIUS: u32 = 6;

/// Spreadsheet tools need the BOM to detect UTF-8 Korean headers.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Errors that can occur while writing an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error (file write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ── CSV ──────────────────────────────────────────────────────────────────

/// Indicator columns with a value in at least one row, in vocabulary order.
fn exported_features(set: &ScoredSet) -> Vec<Feature> {
    Feature::all()
        .iter()
        .copied()
        .filter(|feature| {
            set.facilities
                .iter()
                .any(|f| f.facility.indicators.contains_key(feature))
        })
        .collect()
}

/// Writes `set` as CSV.
///
/// # Errors
///
/// Returns [`ExportError`] if writing fails.
pub fn write_csv<W: Write>(set: &ScoredSet, mut writer: W) -> Result<(), ExportError> {
    writer.write_all(UTF8_BOM)?;

    let components = set.component_labels();
    let features = exported_features(set);

    let mut csv = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = ["id", "name", "category", "district", "grade", "score"]
        .iter()
        .map(|h| (*h).to_string())
        .collect();
    header.extend(components.iter().cloned());
    header.extend(features.iter().map(|f| f.as_ref().to_string()));
    csv.write_record(&header)?;

    for scored in &set.facilities {
        csv.write_record(csv_row(scored, &components, &features))?;
    }

    csv.flush()?;
    log::info!("Exported {} rows to CSV", set.len());
    Ok(())
}

fn csv_row(scored: &ScoredFacility, components: &[String], features: &[Feature]) -> Vec<String> {
    let facility = &scored.facility;
    let mut row = vec![
        facility.id.clone(),
        facility.name.clone(),
        facility.category.clone(),
        facility.district.clone(),
        scored.grade.label().to_string(),
        format!("{:.2}", scored.score),
    ];

    row.extend(components.iter().map(|label| {
        scored
            .breakdown
            .iter()
            .find(|item| &item.label == label)
            .map(|item| format!("{:.2}", item.points))
            .unwrap_or_default()
    }));
    row.extend(features.iter().map(|feature| {
        facility
            .indicators
            .get(feature)
            .map(ToString::to_string)
            .unwrap_or_default()
    }));
    row
}

// ── GeoJSON ──────────────────────────────────────────────────────────────

/// Marker radius for a facility type.
#[must_use]
pub fn marker_radius(category: &str) -> u32 {
    if category == PRIMARY_CATEGORY {
        PRIMARY_MARKER_RADIUS
    } else {
        MARKER_RADIUS
    }
}

/// Builds a point `FeatureCollection` of every row with coordinates.
#[must_use]
pub fn feature_collection(set: &ScoredSet) -> FeatureCollection {
    let features: Vec<geojson::Feature> = set
        .facilities
        .iter()
        .filter_map(|scored| {
            let coordinates = scored.facility.coordinates?;
            Some(geojson::Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(vec![
                    coordinates.longitude,
                    coordinates.latitude,
                ]))),
                id: Some(geojson::feature::Id::String(scored.facility.id.clone())),
                properties: Some(properties(scored)),
                foreign_members: None,
            })
        })
        .collect();

    let skipped = set.len() - features.len();
    if skipped > 0 {
        log::debug!("{skipped} facilities without coordinates left off the map");
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn properties(scored: &ScoredFacility) -> JsonObject {
    let facility = &scored.facility;
    let mut props = JsonObject::new();
    props.insert("name".to_string(), facility.name.clone().into());
    props.insert("category".to_string(), facility.category.clone().into());
    props.insert("district".to_string(), facility.district.clone().into());
    props.insert("grade".to_string(), scored.grade.to_string().into());
    props.insert("gradeLabel".to_string(), scored.grade.label().into());
    props.insert("score".to_string(), scored.score.into());
    props.insert(
        "markerRadius".to_string(),
        marker_radius(&facility.category).into(),
    );
    for item in &scored.breakdown {
        props.insert(item.label.clone(), item.points.into());
    }
    for (feature, value) in &facility.indicators {
        props.insert(feature.as_ref().to_string(), (*value).into());
    }
    props
}

/// Writes the GeoJSON `FeatureCollection` for `set`.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or writing fails.
pub fn write_geojson<W: Write>(set: &ScoredSet, writer: W) -> Result<(), ExportError> {
    let collection = feature_collection(set);
    serde_json::to_writer_pretty(writer, &collection)?;
    log::info!(
        "Exported {} map features to GeoJSON",
        collection.features.len()
    );
    Ok(())
}

// ── JSON ─────────────────────────────────────────────────────────────────

/// Writes any serializable value (typically a [`crate::Report`]) as
/// pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or writing fails.
pub fn write_json<W: Write, T: Serialize>(value: &T, writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}
