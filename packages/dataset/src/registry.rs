//! Dataset registry: loads all dataset definitions from embedded TOML
//! configs.
//!
//! Each `.toml` file in `packages/dataset/datasets/` is baked into the
//! binary at compile time via [`include_str!`].

use crate::DatasetError;
use crate::definition::{DatasetDefinition, parse_dataset_toml};

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[
    ("initial", include_str!("../datasets/initial.toml")),
    ("v11", include_str!("../datasets/v11.toml")),
];

/// Total number of configured datasets (used in tests).
#[cfg(test)]
const EXPECTED_DATASET_COUNT: usize = 2;

/// Returns all configured dataset definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a dataset definition by identifier.
///
/// # Errors
///
/// Returns [`DatasetError::UnknownDataset`] if no definition has this id.
pub fn find_dataset(id: &str) -> Result<DatasetDefinition, DatasetError> {
    all_datasets()
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| DatasetError::UnknownDataset { id: id.to_string() })
}
