//! Validation failures for workout input.
//!
//! Every failing constraint is collected so a form can show all problems at once.

use std::fmt;

/// A form field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Coordinate,
    DistanceKm,
    DurationMin,
    CadenceSpm,
    ElevationGainM,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Coordinate => "coordinate",
            Self::DistanceKm => "distanceKm",
            Self::DurationMin => "durationMin",
            Self::CadenceSpm => "cadenceSpm",
            Self::ElevationGainM => "elevationGainM",
        };
        f.write_str(name)
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// NaN or infinite.
    NotFinite,

    /// Zero or negative where a positive value is required.
    NotPositive,

    /// The field this workout kind needs was not supplied.
    Missing,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotFinite => "must be a finite number",
            Self::NotPositive => "must be positive",
            Self::Missing => "is required",
        };
        f.write_str(text)
    }
}

/// One failed constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub field: Field,
    pub reason: Reason,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// Workout input was rejected. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid workout: {}", join(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Whether any violation concerns `field`.
    pub fn cites(&self, field: Field) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl From<Violation> for ValidationError {
    fn from(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Accumulates violations while checking an input.
#[derive(Debug, Default)]
pub(super) struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    /// Requires a finite, strictly positive value.
    pub(super) fn positive(&mut self, field: Field, value: f64) {
        if !value.is_finite() {
            self.reject(field, Reason::NotFinite);
        } else if value <= 0.0 {
            self.reject(field, Reason::NotPositive);
        }
    }

    /// Requires a finite value of any sign.
    pub(super) fn finite(&mut self, field: Field, value: f64) {
        if !value.is_finite() {
            self.reject(field, Reason::NotFinite);
        }
    }

    /// Requires an optional field to be present, returning it when it is.
    pub(super) fn present(&mut self, field: Field, value: Option<f64>) -> Option<f64> {
        if value.is_none() {
            self.reject(field, Reason::Missing);
        }
        value
    }

    pub(super) fn reject(&mut self, field: Field, reason: Reason) {
        self.violations.push(Violation { field, reason });
    }

    pub(super) fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                violations: self.violations,
            })
        }
    }
}
