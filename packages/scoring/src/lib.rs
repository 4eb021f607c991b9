#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scoring engine for school-zone safety grades.
//!
//! A scoring pass takes an explicit working set (a filtered
//! [`Dataset`](school_zone_facility_models::Dataset)) and a
//! [`Scheme`](scheme::Scheme), and returns a
//! [`ScoredSet`](school_zone_scoring_models::ScoredSet). Nothing here reads
//! files or keeps state between passes.

pub mod aggregate;
pub mod grade;
pub mod normalize;
pub mod registry;
pub mod scheme;
pub mod suggest;
pub mod working_set;

use school_zone_facility_models::Feature;
use school_zone_scoring_models::{FeatureWeights, MAX_WEIGHT};
use thiserror::Error;

/// Errors that can occur while selecting or configuring a scheme.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// No scheme with this identifier is registered.
    #[error("Unknown scheme '{id}'")]
    UnknownScheme {
        /// The requested identifier.
        id: String,
    },

    /// The scheme's required columns are missing from the dataset.
    #[error("Scheme '{id}' is not available for dataset '{dataset}'")]
    Unavailable {
        /// Scheme identifier.
        id: String,
        /// Dataset identifier.
        dataset: String,
    },

    /// Custom weights were supplied for a precomputed scheme.
    #[error("Scheme '{id}' does not accept custom weights")]
    NotAdjustable {
        /// Scheme identifier.
        id: String,
    },

    /// A weight assignment could not be parsed.
    #[error("Invalid weight '{input}': {message}")]
    InvalidWeight {
        /// The offending input.
        input: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A scheme definition failed to parse.
    #[error("Scheme config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// Parses a `feature=weight` assignment such as `"incident_count=3"`.
///
/// Weights must be whole numbers in `0..=10`.
///
/// # Errors
///
/// Returns [`ScoringError::InvalidWeight`] if the feature is unknown, the
/// weight is not an integer, or it falls outside the accepted range.
pub fn parse_weight_assignment(input: &str) -> Result<(Feature, f64), ScoringError> {
    let invalid = |message: String| ScoringError::InvalidWeight {
        input: input.to_string(),
        message,
    };

    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| invalid("expected FEATURE=WEIGHT".to_string()))?;

    let feature: Feature = name
        .trim()
        .parse()
        .map_err(|_| invalid(format!("unknown feature '{}'", name.trim())))?;

    let weight: u8 = value
        .trim()
        .parse()
        .map_err(|e| invalid(format!("weight must be a whole number: {e}")))?;
    let weight = f64::from(weight);

    if weight > MAX_WEIGHT {
        return Err(invalid(format!("weight must be between 0 and {MAX_WEIGHT}")));
    }

    Ok((feature, weight))
}

/// Applies `assignments` on top of `base`, later assignments winning.
///
/// # Errors
///
/// Returns [`ScoringError::InvalidWeight`] for the first malformed
/// assignment.
pub fn apply_weight_assignments<S: AsRef<str>>(
    base: &FeatureWeights,
    assignments: &[S],
) -> Result<FeatureWeights, ScoringError> {
    let mut weights = base.clone();
    for assignment in assignments {
        let (feature, weight) = parse_weight_assignment(assignment.as_ref())?;
        weights.set(feature, weight);
    }
    Ok(weights)
}
