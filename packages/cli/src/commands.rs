//! Scoring pipeline shared by the `score` subcommand and the interactive
//! menu.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use school_zone_dataset::definition::DatasetDefinition;
use school_zone_dataset::loader::DatasetLoader;
use school_zone_dataset::registry::find_dataset;
use school_zone_dataset::source::FileSource;
use school_zone_facility_models::{Dataset, Grade};
use school_zone_report::export::{write_csv, write_geojson, write_json};
use school_zone_report::filter::filter_grades;
use school_zone_report::{Report, build_report};
use school_zone_scoring::registry::{all_schemes, scheme_for};
use school_zone_scoring::working_set::WorkingSetFilter;
use school_zone_scoring::{ScoringError, apply_weight_assignments};
use school_zone_scoring_models::GradePolicy;

use crate::render;

/// Directory searched for a dataset's conventional file name when no
/// input path is given.
const DEFAULT_DATA_DIR: &str = "data";

/// Everything one scoring run needs.
#[derive(Debug, Clone)]
pub struct ScoreOptions {
    /// Dataset definition identifier.
    pub dataset: String,
    /// CSV path; defaults to the definition's file under `data/`.
    pub input: Option<PathBuf>,
    /// Scheme identifier.
    pub scheme: String,
    /// `feature=N` weight overrides.
    pub weights: Vec<String>,
    /// Grading policy override.
    pub grading: Option<GradePolicy>,
    /// Category filter (empty keeps all).
    pub categories: Vec<String>,
    /// District filter (empty keeps all).
    pub districts: Vec<String>,
    /// Grade filter applied after grading (empty keeps all).
    pub grades: Vec<Grade>,
    /// Ranking length.
    pub top: usize,
    /// CSV export path.
    pub csv: Option<PathBuf>,
    /// GeoJSON export path.
    pub geojson: Option<PathBuf>,
    /// JSON report path.
    pub json: Option<PathBuf>,
}

/// Picks the CSV path for `definition`.
///
/// # Errors
///
/// Returns an error if no path was given and the definition names no file.
pub fn resolve_input(
    definition: &DatasetDefinition,
    input: Option<&Path>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    input
        .map(Path::to_path_buf)
        .or_else(|| {
            definition
                .file
                .as_ref()
                .map(|file| Path::new(DEFAULT_DATA_DIR).join(file))
        })
        .ok_or_else(|| {
            format!(
                "No input file for dataset '{}': pass --input or set SCHOOL_ZONE_DATA",
                definition.id
            )
            .into()
        })
}

/// Loads a dataset through `loader`.
///
/// # Errors
///
/// Returns an error if the definition is unknown or the file cannot be
/// read or parsed.
pub fn load(
    loader: &mut DatasetLoader,
    dataset: &str,
    input: Option<&Path>,
) -> Result<Arc<Dataset>, Box<dyn std::error::Error>> {
    let definition = find_dataset(dataset)?;
    let path = resolve_input(&definition, input)?;
    log::debug!("Reading dataset '{dataset}' from {}", path.display());
    Ok(loader.load(&definition, &FileSource::new(path))?)
}

/// Prints every scheme and whether `dataset` supports it.
pub fn list_schemes(dataset: &Dataset) {
    println!("Schemes for dataset '{}':", dataset.id);
    for scheme in all_schemes() {
        let status = if scheme.is_available(dataset) {
            "available"
        } else {
            "unavailable"
        };
        let adjustable = if scheme.is_adjustable() {
            ", adjustable"
        } else {
            ""
        };
        println!(
            "  {:<20} {:<12} {}{adjustable}",
            scheme.id, status, scheme.name
        );
        println!("  {:<20} {}", "", scheme.description);
    }
}

/// Runs one scoring pass, prints the report, and writes any requested
/// exports.
///
/// # Errors
///
/// Returns an error if loading, scheme selection, weight parsing, or an
/// export fails.
pub fn score(
    loader: &mut DatasetLoader,
    options: &ScoreOptions,
) -> Result<Report, Box<dyn std::error::Error>> {
    let dataset = load(loader, &options.dataset, options.input.as_deref())?;

    let mut scheme = scheme_for(&options.scheme, &dataset)?;
    if !options.weights.is_empty() {
        let base = scheme
            .weights()
            .cloned()
            .ok_or_else(|| ScoringError::NotAdjustable {
                id: scheme.id.clone(),
            })?;
        let weights = apply_weight_assignments(&base, &options.weights)?;
        scheme = scheme.with_weights(weights)?;
    }
    if let Some(policy) = options.grading {
        scheme = scheme.with_grading(policy);
    }

    let working = WorkingSetFilter::all()
        .with_categories(options.categories.iter().cloned())
        .with_districts(options.districts.iter().cloned())
        .apply(&dataset);

    let scored = scheme.compute(&working);
    let grades: BTreeSet<Grade> = options.grades.iter().copied().collect();
    let shown = filter_grades(&scored, &grades);
    let report = build_report(&scored, &grades, &scheme.suggestions, options.top);

    render::print_report(&report);

    if let Some(path) = &options.csv {
        write_csv(&shown, BufWriter::new(File::create(path)?))?;
        println!("CSV written to {}", path.display());
    }
    if let Some(path) = &options.geojson {
        write_geojson(&shown, BufWriter::new(File::create(path)?))?;
        println!("GeoJSON written to {}", path.display());
    }
    if let Some(path) = &options.json {
        write_json(&report, BufWriter::new(File::create(path)?))?;
        println!("Report written to {}", path.display());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_input_wins() {
        let definition = find_dataset("initial").unwrap();
        let path = resolve_input(&definition, Some(Path::new("/tmp/zones.csv"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/zones.csv"));
    }

    #[test]
    fn falls_back_to_data_dir() {
        let definition = find_dataset("v11").unwrap();
        let path = resolve_input(&definition, None).unwrap();
        assert!(path.starts_with(DEFAULT_DATA_DIR));
        assert!(path.ends_with(definition.file.unwrap()));
    }

    #[test]
    fn missing_file_is_reported() {
        let mut loader = DatasetLoader::new();
        let result = load(
            &mut loader,
            "initial",
            Some(Path::new("/nonexistent/school_zones.csv")),
        );
        assert!(result.is_err());
        assert_eq!(loader.cached(), 0);
    }
}
