//! Mapty: log runs and rides against the place they happened.
//!
//! [`store::WorkoutStore`] owns the session's workouts, [`model`] defines
//! them and derives their metrics, and [`storage`] keeps them across sessions.

pub mod config;
pub mod model;
pub mod storage;
pub mod store;
