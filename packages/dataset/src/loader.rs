//! CSV parsing and snapshot caching.
//!
//! Loads are pure reads of immutable input, so a parsed [`Dataset`] is
//! cached by a digest of its definition id and raw bytes and handed out as
//! a shared [`Arc`]. The cache is never invalidated.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use school_zone_facility_models::{AttributeValue, Coordinates, Dataset, Facility, Feature};
use sha2::{Digest, Sha256};

use crate::DatasetError;
use crate::definition::DatasetDefinition;
use crate::source::DatasetSource;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Reads datasets and caches parsed snapshots by content identity.
#[derive(Debug, Default)]
pub struct DatasetLoader {
    cache: BTreeMap<String, Arc<Dataset>>,
}

impl DatasetLoader {
    /// Creates a loader with an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache: BTreeMap::new(),
        }
    }

    /// Reads `source` with `definition`, returning a cached snapshot when
    /// the same bytes were already parsed under the same definition.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the source cannot be read, the CSV is
    /// malformed, or a required column is missing.
    pub fn load(
        &mut self,
        definition: &DatasetDefinition,
        source: &dyn DatasetSource,
    ) -> Result<Arc<Dataset>, DatasetError> {
        let bytes = source.read()?;
        let key = content_key(&definition.id, &bytes);

        if let Some(cached) = self.cache.get(&key) {
            log::debug!("Dataset cache hit for {} ({key})", source.id());
            return Ok(Arc::clone(cached));
        }

        let dataset = Arc::new(parse_dataset(definition, &bytes)?);
        log::info!(
            "Loaded {} facilities from {} as '{}'",
            dataset.len(),
            source.id(),
            definition.id
        );
        self.cache.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Number of cached snapshots.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// Hex-encoded SHA-256 of the definition id and raw bytes.
#[must_use]
pub fn content_key(definition_id: &str, bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(definition_id.as_bytes());
    hasher.update([0_u8]);
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Parses CSV `bytes` into a [`Dataset`] using the header names in
/// `definition`.
///
/// # Errors
///
/// Returns [`DatasetError::Csv`] if the CSV is malformed, or
/// [`DatasetError::MissingColumn`] if an identity column is absent.
pub fn parse_dataset(
    definition: &DatasetDefinition,
    bytes: &[u8],
) -> Result<Dataset, DatasetError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();
    let index: BTreeMap<&str, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();

    for column in definition.columns.required() {
        if !index.contains_key(column) {
            return Err(DatasetError::MissingColumn {
                dataset: definition.id.clone(),
                column: column.to_string(),
            });
        }
    }

    // ── Resolve indicator columns ───────────────────────────────────────
    let mut indicator_columns: Vec<(Feature, usize)> = Vec::new();
    for (feature, header) in &definition.indicators {
        if let Some(&i) = index.get(header.as_str()) {
            indicator_columns.push((*feature, i));
        } else {
            log::warn!(
                "Dataset '{}': indicator column '{header}' ({feature}) not found, skipping",
                definition.id
            );
        }
    }
    let indicator_headers: BTreeSet<&str> = indicator_columns
        .iter()
        .map(|(_, i)| headers[*i].as_str())
        .collect();

    let attribute_columns: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            !h.is_empty()
                && !definition.columns.is_mapped(h)
                && !indicator_headers.contains(h.as_str())
        })
        .map(|(i, h)| (i, h.as_str()))
        .collect();

    let column_at = |name: &str| index.get(name).copied();
    let name_idx = column_at(definition.columns.name.as_str());
    let category_idx = column_at(definition.columns.category.as_str());
    let district_idx = column_at(definition.columns.district.as_str());
    let id_idx = definition.columns.id.as_deref().and_then(column_at);
    let lat_idx = definition.columns.latitude.as_deref().and_then(column_at);
    let lon_idx = definition.columns.longitude.as_deref().and_then(column_at);

    // ── Parse rows ──────────────────────────────────────────────────────
    let mut facilities = Vec::new();
    let mut without_coordinates = 0_usize;

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .unwrap_or_default()
        };

        let name = cell(name_idx).to_owned();
        let id = [cell(id_idx), name.as_str()]
            .into_iter()
            .find(|s| !s.is_empty())
            .map_or_else(|| format!("row-{}", row + 1), str::to_owned);

        let coordinates = match (parse_number(cell(lat_idx)), parse_number(cell(lon_idx))) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => {
                without_coordinates += 1;
                None
            }
        };

        let indicators = indicator_columns
            .iter()
            .filter_map(|(feature, i)| parse_number(cell(Some(*i))).map(|v| (*feature, v)))
            .collect();

        let attributes = attribute_columns
            .iter()
            .filter_map(|(i, header)| {
                parse_attribute(cell(Some(*i))).map(|v| ((*header).to_owned(), v))
            })
            .collect();

        facilities.push(Facility {
            id,
            name,
            category: cell(category_idx).to_owned(),
            district: cell(district_idx).to_owned(),
            coordinates,
            indicators,
            attributes,
        });
    }

    if without_coordinates > 0 {
        log::debug!(
            "Dataset '{}': {without_coordinates} rows without coordinates",
            definition.id
        );
    }
    if let Some(expected) = definition.expected_records
        && expected != facilities.len()
    {
        log::warn!(
            "Dataset '{}': expected {expected} records, found {}",
            definition.id,
            facilities.len()
        );
    }

    Ok(Dataset {
        id: definition.id.clone(),
        features: indicator_columns.iter().map(|(f, _)| *f).collect(),
        columns: attribute_columns
            .iter()
            .map(|(_, h)| (*h).to_owned())
            .collect(),
        facilities,
    })
}

/// Parses a numeric cell. Empty, `NaN`, infinite, and non-numeric cells are
/// missing.
fn parse_number(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_attribute(cell: &str) -> Option<AttributeValue> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return None;
    }
    Some(parse_number(cell).map_or_else(
        || AttributeValue::Text(cell.to_owned()),
        AttributeValue::Number,
    ))
}
