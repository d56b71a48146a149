//! Workout records and their derived metrics.

use std::fmt;

use jiff::{Timestamp, tz::TimeZone};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::input::{Coordinate, WorkoutInput, WorkoutKind};
use super::validation::{Checker, Field, Reason, ValidationError, Violation};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Opaque workout identifier.
///
/// New ids come from random v4 UUIDs. Any string is accepted when loading,
/// so ids issued by older versions keep resolving.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkoutId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for WorkoutId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind-specific base fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
    Running { cadence_spm: f64 },

    /// Negative elevation gain is a net descent.
    Cycling { elevation_gain_m: f64 },
}

impl Activity {
    pub fn kind(self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// The metric computed from distance and duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    /// Minutes per kilometer.
    Pace(f64),

    /// Kilometers per hour.
    Speed(f64),
}

/// What the map renderer needs for one marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coordinate: Coordinate,
    pub label: String,
    pub kind: WorkoutKind,
}

/// A logged workout.
///
/// Base fields are fixed at creation. The metric and description are
/// derived from them and rebuilt by [`Workout::recompute_derived`].
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: WorkoutId,
    created_at: Timestamp,
    coordinate: Coordinate,
    distance_km: f64,
    duration_min: f64,
    activity: Activity,
    metric: Metric,
    description: String,
}

impl Workout {
    /// Validates `input` and builds a workout with a fresh id, stamped now.
    pub fn create(input: &WorkoutInput) -> Result<Self, ValidationError> {
        Self::create_at(input, WorkoutId::generate(), Timestamp::now())
    }

    /// Like [`Workout::create`], with identity and creation time supplied.
    pub fn create_at(
        input: &WorkoutInput,
        id: WorkoutId,
        created_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        let mut check = Checker::default();

        if !input.coordinate.is_finite() {
            check.reject(Field::Coordinate, Reason::NotFinite);
        }
        check.positive(Field::DistanceKm, input.distance_km);
        check.positive(Field::DurationMin, input.duration_min);

        let activity = match input.kind {
            WorkoutKind::Running => check
                .present(kind_field(input.kind), input.cadence_spm)
                .map(|cadence_spm| {
                    check.positive(Field::CadenceSpm, cadence_spm);
                    Activity::Running { cadence_spm }
                }),
            WorkoutKind::Cycling => check
                .present(kind_field(input.kind), input.elevation_gain_m)
                .map(|elevation_gain_m| {
                    check.finite(Field::ElevationGainM, elevation_gain_m);
                    Activity::Cycling { elevation_gain_m }
                }),
        };

        check.finish()?;
        let activity = activity.ok_or(Violation {
            field: kind_field(input.kind),
            reason: Reason::Missing,
        })?;

        Ok(Self::from_parts(
            id,
            created_at,
            input.coordinate,
            input.distance_km,
            input.duration_min,
            activity,
        ))
    }

    /// Assembles a workout from base fields without validating them.
    ///
    /// Used when reloading stored records; derived values are computed here.
    pub fn from_parts(
        id: WorkoutId,
        created_at: Timestamp,
        coordinate: Coordinate,
        distance_km: f64,
        duration_min: f64,
        activity: Activity,
    ) -> Self {
        let metric = metric(distance_km, duration_min, activity);
        let description = describe(activity.kind(), created_at);
        Self {
            id,
            created_at,
            coordinate,
            distance_km,
            duration_min,
            activity,
            metric,
            description,
        }
    }

    /// Rebuilds the metric and description from base fields.
    #[must_use]
    pub fn recompute_derived(mut self) -> Self {
        self.metric = metric(self.distance_km, self.duration_min, self.activity);
        self.description = describe(self.activity.kind(), self.created_at);
        self
    }

    pub fn id(&self) -> &WorkoutId {
        &self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn kind(&self) -> WorkoutKind {
        self.activity.kind()
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Minutes per kilometer, for running workouts.
    pub fn pace_min_per_km(&self) -> Option<f64> {
        match self.metric {
            Metric::Pace(pace) => Some(pace),
            Metric::Speed(_) => None,
        }
    }

    /// Kilometers per hour, for cycling workouts.
    pub fn speed_kmh(&self) -> Option<f64> {
        match self.metric {
            Metric::Speed(speed) => Some(speed),
            Metric::Pace(_) => None,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn marker(&self) -> Marker {
        Marker {
            coordinate: self.coordinate,
            label: self.description.clone(),
            kind: self.kind(),
        }
    }
}

fn kind_field(kind: WorkoutKind) -> Field {
    match kind {
        WorkoutKind::Running => Field::CadenceSpm,
        WorkoutKind::Cycling => Field::ElevationGainM,
    }
}

fn metric(distance_km: f64, duration_min: f64, activity: Activity) -> Metric {
    match activity {
        Activity::Running { .. } => Metric::Pace(duration_min / distance_km),
        Activity::Cycling { .. } => Metric::Speed(distance_km / (duration_min / 60.0)),
    }
}

/// `"<Kind> on <Month> <day>"`, using the UTC calendar date of `created_at`.
pub fn describe(kind: WorkoutKind, created_at: Timestamp) -> String {
    let date = created_at.to_zoned(TimeZone::UTC).date();
    let month = MONTHS[usize::from(date.month().unsigned_abs()) - 1];
    format!("{} on {month} {}", kind.label(), date.day())
}
