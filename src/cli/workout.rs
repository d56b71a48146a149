//! The `add` command: the workout form.

use clap::{Args, Subcommand};

use mapty::model::{Coordinate, WorkoutInput};
use mapty::storage::Medium;
use mapty::store::{StoreError, WorkoutStore};

use super::format;

#[derive(Debug, Subcommand)]
pub enum AddCommand {
    /// Log a run.
    Running {
        #[command(flatten)]
        common: CommonArgs,

        /// Steps per minute.
        #[arg(long)]
        cadence: f64,
    },

    /// Log a ride.
    Cycling {
        #[command(flatten)]
        common: CommonArgs,

        /// Elevation gain in meters. Negative for a net descent.
        #[arg(long, allow_hyphen_values = true)]
        elevation: f64,
    },
}

/// Fields shared by every workout kind.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Latitude of the workout.
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude of the workout.
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,

    /// Distance in kilometers.
    #[arg(long, allow_hyphen_values = true)]
    distance: f64,

    /// Duration in minutes.
    #[arg(long, allow_hyphen_values = true)]
    duration: f64,
}

impl AddCommand {
    fn to_input(&self) -> WorkoutInput {
        match self {
            Self::Running { common, cadence } => WorkoutInput::running(
                Coordinate::new(common.lat, common.lng),
                common.distance,
                common.duration,
                *cadence,
            ),
            Self::Cycling { common, elevation } => WorkoutInput::cycling(
                Coordinate::new(common.lat, common.lng),
                common.distance,
                common.duration,
                *elevation,
            ),
        }
    }
}

pub(super) fn cmd_add<M: Medium>(
    store: &mut WorkoutStore<M>,
    command: &AddCommand,
) -> Result<(), String> {
    match store.create(&command.to_input()) {
        Ok(workout) => {
            eprintln!("{}", format::format_row(&workout));
            println!("{}", workout.id());
            Ok(())
        }
        Err(StoreError::Validation(e)) => {
            let problems: Vec<String> = e.violations.iter().map(|v| format!("  {v}")).collect();
            Err(format!("invalid workout:\n{}", problems.join("\n")))
        }
        Err(e @ StoreError::Persistence { .. }) => {
            Err(format!("{e}\nThe workout will be lost when this session ends."))
        }
        Err(e) => Err(e.to_string()),
    }
}
