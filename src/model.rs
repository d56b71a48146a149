//! Core data model for Mapty.
//!
//! A workout is a coordinate, a distance and a duration plus one
//! kind-specific field. Pace, speed and the description are derived.

mod input;
mod validation;
mod workout;

pub use input::{Coordinate, WorkoutInput, WorkoutKind};
pub use validation::{Field, Reason, ValidationError, Violation};
pub use workout::{Activity, Marker, Metric, Workout, WorkoutId, describe};
