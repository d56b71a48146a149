//! Local persistence for workouts.
//!
//! The whole collection lives under a single key of a key/value [`Medium`]
//! as one JSON array, rewritten on every save:
//!
//! ```text
//! <data-dir>/
//!   workouts.json            # every workout, in creation order
//!   workouts-corrupt.json    # last blob that could not be parsed, if any
//! ```

mod medium;
mod workouts;

use std::{fmt, io};

use crate::model::Workout;

pub use medium::{FileMedium, MemoryMedium, Medium};

/// The key used when none is configured.
pub const DEFAULT_KEY: &str = "workouts";

/// Whether `key` can name a blob: ASCII letters, digits, `-` and `_` only.
///
/// Keys become file names, so anything that could form a path is refused.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Errors that can occur while saving.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Saves and loads the workout collection through a storage medium.
#[derive(Debug)]
pub struct Storage<M> {
    medium: M,
    key: String,
}

impl<M: Medium> Storage<M> {
    /// Creates storage that keeps workouts under `key` in `medium`.
    pub fn new(medium: M, key: impl Into<String>) -> Self {
        Self {
            medium,
            key: key.into(),
        }
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }
}

/// A stored entry that could not be restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defect {
    /// Position in the stored array, or `None` when the whole blob was unusable.
    pub index: Option<usize>,
    pub reason: String,
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "entry {i}: {}", self.reason),
            None => write!(f, "storage: {}", self.reason),
        }
    }
}

/// What a load recovered, and what it had to drop.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub workouts: Vec<Workout>,
    pub defects: Vec<Defect>,
}

impl LoadReport {
    fn unusable(reason: String) -> Self {
        Self {
            workouts: Vec::new(),
            defects: vec![Defect {
                index: None,
                reason,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_that_could_form_paths_are_invalid() {
        assert!(is_valid_key("workouts"));
        assert!(is_valid_key("run_log-2024"));
        for key in ["", ".", "..", "../x", "a/b", "a\\b", "log.json", "with space"] {
            assert!(!is_valid_key(key), "{key:?} should be invalid");
        }
    }
}
