//! CLI interface for Mapty.
//!
//! Stands in for the browser front end: `add` is the workout form, `list`
//! the sidebar, `markers` the map pins and `locate` a click on a list row.
//! Each subcommand is non-interactive: arguments in, plain text out.

mod format;
mod workout;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use mapty::config::Config;
use mapty::model::{Workout, WorkoutId};
use mapty::storage::{FileMedium, Storage};
use mapty::store::{StoreError, WorkoutStore};

use workout::AddCommand;

/// Mapty: log runs and rides where they happened.
#[derive(Debug, Parser)]
#[command(name = "mapty", after_long_help = USAGE_HELP)]
pub struct Cli {
    /// Directory holding stored workouts (overrides `MAPTY_DATA_DIR` and config).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const USAGE_HELP: &str = r"Examples:
  mapty add running --lat 40.7 --lng -74.0 --distance 5 --duration 25 --cadence 178
  mapty add cycling --lat 40.7 --lng -74.0 --distance 20 --duration 60 --elevation 150
  mapty list
  mapty locate a3b0fc12";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log a new workout. Prints its ID.
    Add {
        #[command(subcommand)]
        workout: AddCommand,
    },

    /// List workouts, oldest first.
    List,

    /// Print one map marker per workout.
    Markers,

    /// Print the coordinate of a workout.
    Locate {
        /// Workout ID: full ID or unambiguous prefix.
        id: String,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();

    let data_dir = config.resolve_data_dir(cli.data_dir.as_deref())?;
    let medium = FileMedium::new(&data_dir)
        .map_err(|e| format!("failed to open {}: {e}", data_dir.display()))?;
    let (mut store, defects) = WorkoutStore::open(Storage::new(medium, config.storage_key()));
    for defect in &defects {
        eprintln!("warning: skipped stored workout ({defect})");
    }

    match cli.command {
        Command::Add { workout: add } => workout::cmd_add(&mut store, &add),
        Command::List => cmd_list(&store),
        Command::Markers => cmd_markers(&store),
        Command::Locate { id } => cmd_locate(&store, &id),
    }
}

fn cmd_list(store: &WorkoutStore<FileMedium>) -> Result<(), String> {
    if store.is_empty() {
        println!("No workouts");
        return Ok(());
    }
    for w in store.all() {
        println!("{}", format::format_row(w));
    }
    Ok(())
}

fn cmd_markers(store: &WorkoutStore<FileMedium>) -> Result<(), String> {
    for marker in store.markers() {
        println!("{}", format::format_marker(&marker));
    }
    Ok(())
}

fn cmd_locate(store: &WorkoutStore<FileMedium>, reference: &str) -> Result<(), String> {
    let workout = resolve_workout(store.all(), reference)?;
    let coordinate = store
        .locate(workout.id())
        .map_err(|e: StoreError| e.to_string())?;
    println!("{coordinate}");
    Ok(())
}

/// Resolve a workout reference (full ID or unambiguous prefix) to a workout.
fn resolve_workout<'a>(workouts: &'a [Workout], reference: &str) -> Result<&'a Workout, String> {
    let id = WorkoutId::from(reference);
    if let Some(w) = workouts.iter().find(|w| w.id() == &id) {
        return Ok(w);
    }

    let matches: Vec<&Workout> = workouts
        .iter()
        .filter(|w| w.id().as_str().starts_with(reference))
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no workout matching '{reference}'")),
        [w] => Ok(*w),
        many => {
            let ids: Vec<&str> = many.iter().map(|w| format::short_id(w.id())).collect();
            Err(format!(
                "'{reference}' is ambiguous; it matches {} workouts: {}",
                many.len(),
                ids.join(", ")
            ))
        }
    }
}
