#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset definitions and loading for school-zone facility tables.
//!
//! A [`DatasetDefinition`](definition::DatasetDefinition) describes how the
//! columns of a CSV export map onto the facility vocabulary. The
//! [`DatasetLoader`](loader::DatasetLoader) reads bytes from a
//! [`DatasetSource`](source::DatasetSource), parses them into an immutable
//! [`Dataset`](school_zone_facility_models::Dataset), and caches the result
//! by content digest.

pub mod definition;
pub mod loader;
pub mod registry;
pub mod source;

/// Errors that can occur while reading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A column the definition requires is not in the header row.
    #[error("Dataset '{dataset}' is missing required column '{column}'")]
    MissingColumn {
        /// Dataset identifier.
        dataset: String,
        /// Header that was not found.
        column: String,
    },

    /// No dataset definition with this identifier is registered.
    #[error("Unknown dataset '{id}'")]
    UnknownDataset {
        /// The requested identifier.
        id: String,
    },

    /// A dataset definition failed to parse.
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}
