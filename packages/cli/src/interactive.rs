#![allow(clippy::module_name_repetitions)]

//! Interactive menu for school-zone scoring.
//!
//! Walks through dataset, scheme, weight, and filter selection with
//! `dialoguer` prompts, then runs the same pipeline as `score`.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input, MultiSelect, Select};
use school_zone_dataset::loader::DatasetLoader;
use school_zone_dataset::registry::all_datasets;
use school_zone_facility_models::Grade;
use school_zone_report::DEFAULT_RANKING_SIZE;
use school_zone_scoring::registry::available_schemes;
use school_zone_scoring_models::MAX_WEIGHT;

use crate::commands::{self, ScoreOptions};

/// Runs the prompt sequence and prints one report.
///
/// # Errors
///
/// Returns an error if a prompt fails, the dataset cannot be loaded, or
/// scoring fails.
pub fn run(
    loader: &mut DatasetLoader,
    default_dataset: &str,
    default_input: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("School-Zone Safety Scoring");
    println!();

    // ── Dataset ─────────────────────────────────────────────────────────
    let definitions = all_datasets();
    let labels: Vec<String> = definitions
        .iter()
        .map(|d| format!("{} - {}", d.id, d.name))
        .collect();
    let idx = Select::new()
        .with_prompt("Dataset")
        .items(&labels)
        .default(
            definitions
                .iter()
                .position(|d| d.id == default_dataset)
                .unwrap_or(0),
        )
        .interact()?;
    let definition = &definitions[idx];

    let suggested = commands::resolve_input(definition, default_input)?;
    let input: String = Input::new()
        .with_prompt("CSV path")
        .default(suggested.display().to_string())
        .interact_text()?;
    let input = PathBuf::from(input);

    let dataset = commands::load(loader, &definition.id, Some(&input))?;

    // ── Scheme ──────────────────────────────────────────────────────────
    let schemes = available_schemes(&dataset);
    if schemes.is_empty() {
        println!("No scheme is available for this dataset.");
        return Ok(());
    }
    let labels: Vec<String> = schemes
        .iter()
        .map(|s| format!("{} - {}", s.id, s.name))
        .collect();
    let idx = Select::new()
        .with_prompt("Scoring scheme")
        .items(&labels)
        .default(0)
        .interact()?;
    let scheme = &schemes[idx];

    let mut weights = Vec::new();
    if scheme.is_adjustable()
        && let Some(defaults) = scheme.weights()
        && Confirm::new()
            .with_prompt("Adjust weights?")
            .default(false)
            .interact()?
    {
        for feature in dataset.features.iter().copied() {
            let weight: u8 = Input::new()
                .with_prompt(format!("{} ({feature})", feature.label()))
                .default(whole_weight(defaults.get(feature)))
                .validate_with(|w: &u8| -> Result<(), String> {
                    if f64::from(*w) <= MAX_WEIGHT {
                        Ok(())
                    } else {
                        Err(format!("Weight must be between 0 and {MAX_WEIGHT}"))
                    }
                })
                .interact_text()?;
            weights.push(format!("{feature}={weight}"));
        }
    }

    // ── Filters ─────────────────────────────────────────────────────────
    let categories = pick_subset("Facility types", &owned(dataset.categories()))?;
    let districts = pick_subset("Districts", &owned(dataset.districts()))?;

    let grade_labels: Vec<&str> = Grade::all().iter().map(|g| g.label()).collect();
    let picked = MultiSelect::new()
        .with_prompt("Grades to show (space=toggle, enter=confirm, none=all)")
        .items(&grade_labels)
        .interact()?;
    let grades: Vec<Grade> = picked.into_iter().map(|i| Grade::all()[i]).collect();

    let top: usize = Input::new()
        .with_prompt("Ranking length")
        .default(DEFAULT_RANKING_SIZE)
        .interact_text()?;

    let csv = prompt_optional_path("CSV export path (empty to skip)")?;

    let options = ScoreOptions {
        dataset: definition.id.clone(),
        input: Some(input),
        scheme: scheme.id.clone(),
        weights,
        grading: None,
        categories,
        districts,
        grades,
        top,
        csv,
        geojson: None,
        json: None,
    };
    commands::score(loader, &options)?;

    Ok(())
}

fn owned(values: BTreeSet<&str>) -> Vec<String> {
    values.into_iter().map(str::to_owned).collect()
}

/// Prompts for a subset of `values`; choosing nothing means all.
fn pick_subset(prompt: &str, values: &[String]) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    if values.len() < 2 {
        return Ok(Vec::new());
    }
    let picked = MultiSelect::new()
        .with_prompt(format!("{prompt} (space=toggle, enter=confirm, none=all)"))
        .items(values)
        .max_length(20)
        .interact()?;
    Ok(picked.into_iter().map(|i| values[i].clone()).collect())
}

fn prompt_optional_path(prompt: &str) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let trimmed = input.trim();
    Ok((!trimmed.is_empty()).then(|| PathBuf::from(trimmed)))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_weight(weight: f64) -> u8 {
    weight.clamp(0.0, MAX_WEIGHT).round() as u8
}
