#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for fire dispatch incident analytics.
//!
//! Loads the configured dispatch export once, applies the global filter
//! flags and prints the requested view as pretty JSON.

use std::str::FromStr as _;

use clap::{Parser, Subcommand};
use fire_dispatch_analytics as analytics;
use fire_dispatch_incident_models::{ClassifiedIncident, FilterSelection, IncidentCategory};
use fire_dispatch_source::HttpCsvSource;
use fire_dispatch_source::loader::RecordLoader;
use fire_dispatch_source::registry::{DEFAULT_SOURCE_ID, all_sources, find_source};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "fire_dispatch", about = "Fire dispatch incident analytics")]
struct Cli {
    /// Source identifier (e.g., "`allegheny_fire_dispatch`")
    #[arg(long, global = true, default_value = DEFAULT_SOURCE_ID)]
    source: String,
    /// Comma-separated reporting years to keep. Empty keeps all.
    #[arg(long, global = true, value_delimiter = ',')]
    periods: Vec<i32>,
    /// Comma-separated category names (e.g., "Fire Alarms,Gas Issues").
    /// Empty keeps all.
    #[arg(long, global = true, value_delimiter = ',')]
    categories: Vec<String>,
    /// Comma-separated municipality names. Empty keeps all.
    #[arg(long, global = true, value_delimiter = ',')]
    places: Vec<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Headline statistics for the selection
    Stats,
    /// Per-category counts for each reporting year
    Periods,
    /// Per-category counts for each season
    Seasons,
    /// Per-category counts for the busiest municipalities
    Places {
        /// Number of municipalities to show
        #[arg(long, default_value_t = analytics::DEFAULT_PLACE_HOTSPOTS)]
        top: usize,
    },
    /// Counts per priority description and category
    Priorities,
    /// Fire alarms split into commercial, residential and other
    FalseAlarms,
    /// Incident count per category
    Categories,
    /// Municipality names to offer as filter options
    TopPlaces {
        /// Number of names to list
        #[arg(long, default_value_t = analytics::DEFAULT_PLACE_OPTIONS)]
        top: usize,
    },
    /// Reporting years present in the data
    PeriodsAvailable,
    /// List all configured data sources
    Sources,
}

impl Cli {
    fn selection(&self) -> Result<FilterSelection, String> {
        let categories = self
            .categories
            .iter()
            .map(|name| {
                IncidentCategory::from_str(name.trim())
                    .map_err(|_| format!("Unknown category: {name}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FilterSelection::all()
            .with_periods(self.periods.iter().copied())
            .with_categories(categories)
            .with_places(self.places.iter().map(|p| p.trim().to_string())))
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Sources) {
        println!("{:<28} NAME", "ID");
        println!("{}", "-".repeat(60));
        for source in all_sources() {
            println!("{:<28} {}", source.id, source.name);
        }
        return Ok(());
    }

    let selection = cli.selection()?;
    let definition = find_source(&cli.source)?;
    let loader = RecordLoader::new(HttpCsvSource::new(definition)?);

    let dataset = loader.incidents().await;
    if dataset.is_empty() {
        log::warn!("No dispatch data available from {}", cli.source);
    }

    let filtered: Vec<&ClassifiedIncident> = analytics::filter_incidents(&dataset, &selection);
    let view = || filtered.iter().copied();

    match cli.command {
        Commands::Stats => print_json(&analytics::summary_stats(view()))?,
        Commands::Periods => print_json(&analytics::by_period(view()))?,
        Commands::Seasons => print_json(&analytics::by_season(view()))?,
        Commands::Places { top } => print_json(&analytics::by_place(view(), top))?,
        Commands::Priorities => print_json(&analytics::by_priority(view()))?,
        Commands::FalseAlarms => {
            let split = analytics::false_alarm_split(view());
            if let Some(note) = &split.estimate_note {
                log::info!("{note}");
            }
            print_json(&split)?;
        }
        Commands::Categories => print_json(&analytics::by_category(view()))?,
        Commands::TopPlaces { top } => print_json(&analytics::top_places(dataset.iter(), top))?,
        Commands::PeriodsAvailable => print_json(&analytics::available_periods(dataset.iter()))?,
        Commands::Sources => {}
    }

    Ok(())
}
