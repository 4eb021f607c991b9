//! Min-max feature normalization.
//!
//! Bounds are taken from the working set passed in, so narrowing the
//! working set moves them. Output is oriented so that 1.0 is always the
//! safest value in the set.

use school_zone_facility_models::{Facility, Feature, Polarity};

/// Value given to every record when a column is constant.
pub const NEUTRAL_NORMALIZED: f64 = 0.5;

/// Scales `values` into `[0, 1]` using their own minimum and maximum, then
/// inverts the result for [`Polarity::Riskier`].
///
/// Non-finite inputs are read as zero. A constant column (including a
/// single value) maps every entry to [`NEUTRAL_NORMALIZED`].
#[must_use]
pub fn min_max(values: &[f64], polarity: Polarity) -> Vec<f64> {
    let values: Vec<f64> = values
        .iter()
        .map(|v| if v.is_finite() { *v } else { 0.0 })
        .collect();

    let Some(mn) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let mx = values.iter().copied().fold(mn, f64::max);

    if mx <= mn {
        return vec![NEUTRAL_NORMALIZED; values.len()];
    }

    let span = mx - mn;
    values
        .into_iter()
        .map(|v| {
            let scaled = ((v - mn) / span).clamp(0.0, 1.0);
            match polarity {
                Polarity::Safer => scaled,
                Polarity::Riskier => 1.0 - scaled,
            }
        })
        .collect()
}

/// Normalizes one indicator column over `facilities` using the feature's
/// fixed polarity.
#[must_use]
pub fn normalize_feature(facilities: &[Facility], feature: Feature) -> Vec<f64> {
    let raw: Vec<f64> = facilities.iter().map(|f| f.indicator(feature)).collect();
    min_max(&raw, feature.polarity())
}
