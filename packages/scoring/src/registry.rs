//! Scheme registry: loads all scheme definitions from embedded TOML configs.
//!
//! Each `.toml` file in `packages/scoring/schemes/` is baked into the binary
//! at compile time via [`include_str!`]. Adding a scheme means adding a TOML
//! file and listing it below.

use school_zone_facility_models::Dataset;

use crate::ScoringError;
use crate::scheme::Scheme;

/// TOML configs embedded at compile time.
const SCHEME_TOMLS: &[(&str, &str)] = &[
    // ── Precomputed ──────────────────────────────────────────────────
    ("v6", include_str!("../schemes/v6.toml")),
    (
        "category_50_30_20",
        include_str!("../schemes/category_50_30_20.toml"),
    ),
    // ── Weighted ─────────────────────────────────────────────────────
    ("custom", include_str!("../schemes/custom.toml")),
    ("v11", include_str!("../schemes/v11.toml")),
];

/// Total number of configured schemes (used in tests).
#[cfg(test)]
const EXPECTED_SCHEME_COUNT: usize = 4;

/// Parses a single scheme definition.
///
/// # Errors
///
/// Returns [`ScoringError::Config`] if the TOML is malformed.
pub fn parse_scheme_toml(toml: &str) -> Result<Scheme, ScoringError> {
    Ok(toml::from_str(toml)?)
}

/// Returns all configured schemes, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_schemes() -> Vec<Scheme> {
    SCHEME_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_scheme_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a scheme by identifier.
///
/// # Errors
///
/// Returns [`ScoringError::UnknownScheme`] if no scheme has this id.
pub fn find_scheme(id: &str) -> Result<Scheme, ScoringError> {
    all_schemes()
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| ScoringError::UnknownScheme { id: id.to_string() })
}

/// Looks up a scheme and checks that `dataset` can support it.
///
/// # Errors
///
/// Returns [`ScoringError::UnknownScheme`] or
/// [`ScoringError::Unavailable`].
pub fn scheme_for(id: &str, dataset: &Dataset) -> Result<Scheme, ScoringError> {
    let scheme = find_scheme(id)?;
    if scheme.is_available(dataset) {
        Ok(scheme)
    } else {
        Err(ScoringError::Unavailable {
            id: id.to_string(),
            dataset: dataset.id.clone(),
        })
    }
}

/// Schemes whose required columns are all present in `dataset`.
#[must_use]
pub fn available_schemes(dataset: &Dataset) -> Vec<Scheme> {
    all_schemes()
        .into_iter()
        .filter(|s| s.is_available(dataset))
        .collect()
}
