//! Working-set selection.
//!
//! Category and district filters narrow the dataset *before* scoring, so
//! normalization bounds and quartile cut points follow what is displayed.

use std::collections::BTreeSet;

use school_zone_facility_models::Dataset;

/// Category/district selection. An empty set means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingSetFilter {
    /// Allowed facility categories.
    pub categories: BTreeSet<String>,
    /// Allowed districts.
    pub districts: BTreeSet<String>,
}

impl WorkingSetFilter {
    /// A filter that keeps every row.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            categories: BTreeSet::new(),
            districts: BTreeSet::new(),
        }
    }

    /// Restricts to the given categories.
    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Restricts to the given districts.
    #[must_use]
    pub fn with_districts<I, S>(mut self, districts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.districts = districts.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this filter keeps every row.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.categories.is_empty() && self.districts.is_empty()
    }

    /// Returns the rows of `dataset` matching this filter.
    #[must_use]
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        if self.is_unrestricted() {
            return dataset.clone();
        }

        let working = dataset.retain(|f| {
            (self.categories.is_empty() || self.categories.contains(&f.category))
                && (self.districts.is_empty() || self.districts.contains(&f.district))
        });
        log::debug!(
            "Working set: {} of {} facilities",
            working.len(),
            dataset.len()
        );
        working
    }
}
