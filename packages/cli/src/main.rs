#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for school-zone safety scoring.
//!
//! Runs a scoring scheme over a facility dataset and prints the resulting
//! grades, rankings, summaries, and suggestions. With no subcommand it
//! falls back to an interactive menu.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use school_zone_dataset::loader::DatasetLoader;
use school_zone_facility_models::Grade;
use school_zone_report::DEFAULT_RANKING_SIZE;
use school_zone_scoring_models::{GradePolicy, GradeThresholds};

mod commands;
mod interactive;
mod render;

use commands::ScoreOptions;

#[derive(Parser)]
#[command(name = "school_zone", about = "School-zone safety scoring")]
struct Cli {
    /// Dataset definition to read the input with (e.g., "initial", "v11")
    #[arg(long, global = true, default_value = "initial")]
    dataset: String,

    /// Path to the dataset CSV
    #[arg(long, global = true, env = "SCHOOL_ZONE_DATA")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List scoring schemes and whether the dataset supports them
    Schemes,
    /// Score the dataset with one scheme and print the report
    Score {
        /// Scheme identifier (e.g., "v6", "custom")
        #[arg(long, default_value = "custom")]
        scheme: String,
        /// Weight override as FEATURE=N with N in 0-10 (repeatable)
        #[arg(long = "weight", value_name = "FEATURE=N")]
        weights: Vec<String>,
        /// Grade with this policy instead of the scheme's own
        #[arg(long, value_enum)]
        grading: Option<GradingArg>,
        /// Only score facilities of this type (repeatable)
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Only score facilities in this district (repeatable)
        #[arg(long = "district")]
        districts: Vec<String>,
        /// Only show facilities with this grade (repeatable)
        #[arg(long = "grade", value_enum, ignore_case = true)]
        grades: Vec<GradeArg>,
        /// Length of the top/bottom rankings
        #[arg(long, default_value_t = DEFAULT_RANKING_SIZE)]
        top: usize,
        /// Write the scored rows as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Write facilities with coordinates as GeoJSON
        #[arg(long)]
        geojson: Option<PathBuf>,
        /// Write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Pick the dataset, scheme, weights, and filters from prompts
    Interactive,
}

#[derive(Clone, Copy, ValueEnum)]
enum GradingArg {
    /// Working-set quartiles
    Quartile,
    /// Fixed thresholds (75/65/55)
    Thresholds,
}

impl From<GradingArg> for GradePolicy {
    fn from(arg: GradingArg) -> Self {
        match arg {
            GradingArg::Quartile => Self::Quartile,
            GradingArg::Thresholds => Self::Thresholds(GradeThresholds::default()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GradeArg {
    A,
    B,
    C,
    D,
}

impl From<GradeArg> for Grade {
    fn from(arg: GradeArg) -> Self {
        match arg {
            GradeArg::A => Self::A,
            GradeArg::B => Self::B,
            GradeArg::C => Self::C,
            GradeArg::D => Self::D,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let mut loader = DatasetLoader::new();

    match cli.command {
        None | Some(Commands::Interactive) => {
            interactive::run(&mut loader, &cli.dataset, cli.input.as_deref())?;
        }
        Some(Commands::Schemes) => {
            let dataset = commands::load(&mut loader, &cli.dataset, cli.input.as_deref())?;
            commands::list_schemes(&dataset);
        }
        Some(Commands::Score {
            scheme,
            weights,
            grading,
            categories,
            districts,
            grades,
            top,
            csv,
            geojson,
            json,
        }) => {
            let options = ScoreOptions {
                dataset: cli.dataset,
                input: cli.input,
                scheme,
                weights,
                grading: grading.map(GradePolicy::from),
                categories,
                districts,
                grades: grades.into_iter().map(Grade::from).collect(),
                top,
                csv,
                geojson,
                json,
            };
            commands::score(&mut loader, &options)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_repeated_grade_filters() {
        let cli = Cli::try_parse_from([
            "school_zone",
            "score",
            "--grade",
            "D",
            "--grade",
            "c",
            "--grading",
            "thresholds",
        ])
        .unwrap();

        let Some(Commands::Score {
            grades, grading, ..
        }) = cli.command
        else {
            panic!("expected score subcommand");
        };
        let grades: Vec<Grade> = grades.into_iter().map(Grade::from).collect();
        assert_eq!(grades, vec![Grade::D, Grade::C]);
        assert!(matches!(grading, Some(GradingArg::Thresholds)));
    }

    #[test]
    fn rejects_unknown_grade() {
        assert!(Cli::try_parse_from(["school_zone", "score", "--grade", "E"]).is_err());
    }
}
