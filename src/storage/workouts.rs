//! Workout collection storage: save and load the serialized array.

use std::collections::HashSet;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Activity, Coordinate, Workout, WorkoutId, WorkoutKind};

use super::{Defect, LoadReport, Medium, Result, Storage};

/// The persisted shape of one workout: base fields only.
///
/// Aliases accept records written by the original browser app, whose stale
/// `pace`, `speed` and `description` fields are ignored.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWorkout {
    id: WorkoutId,
    #[serde(alias = "date")]
    created_at: Timestamp,
    #[serde(alias = "coords")]
    coordinate: Coordinate,
    #[serde(alias = "distance")]
    distance_km: f64,
    #[serde(alias = "duration")]
    duration_min: f64,
    #[serde(alias = "type")]
    kind: WorkoutKind,
    #[serde(default, alias = "cadence", skip_serializing_if = "Option::is_none")]
    cadence_spm: Option<f64>,
    #[serde(
        default,
        alias = "elevationGain",
        skip_serializing_if = "Option::is_none"
    )]
    elevation_gain_m: Option<f64>,
}

impl From<&Workout> for StoredWorkout {
    fn from(w: &Workout) -> Self {
        let (cadence_spm, elevation_gain_m) = match w.activity() {
            Activity::Running { cadence_spm } => (Some(cadence_spm), None),
            Activity::Cycling { elevation_gain_m } => (None, Some(elevation_gain_m)),
        };
        Self {
            id: w.id().clone(),
            created_at: w.created_at(),
            coordinate: w.coordinate(),
            distance_km: w.distance_km(),
            duration_min: w.duration_min(),
            kind: w.kind(),
            cadence_spm,
            elevation_gain_m,
        }
    }
}

impl StoredWorkout {
    fn into_workout(self) -> core::result::Result<Workout, String> {
        let activity = match self.kind {
            WorkoutKind::Running => Activity::Running {
                cadence_spm: self
                    .cadence_spm
                    .ok_or("running workout has no `cadenceSpm`")?,
            },
            WorkoutKind::Cycling => Activity::Cycling {
                elevation_gain_m: self
                    .elevation_gain_m
                    .ok_or("cycling workout has no `elevationGainM`")?,
            },
        };
        Ok(Workout::from_parts(
            self.id,
            self.created_at,
            self.coordinate,
            self.distance_km,
            self.duration_min,
            activity,
        ))
    }
}

impl<M: Medium> Storage<M> {
    /// Writes every workout, in order, replacing whatever was stored before.
    pub fn save(&mut self, workouts: &[Workout]) -> Result<()> {
        let stored: Vec<StoredWorkout> = workouts.iter().map(StoredWorkout::from).collect();
        let json = serde_json::to_string_pretty(&stored)?;
        self.medium.write(&self.key, &json)?;
        tracing::debug!(key = %self.key, count = workouts.len(), "saved workouts");
        Ok(())
    }

    /// Reads back the stored workouts with derived values recomputed.
    ///
    /// Never fails. A missing key yields an empty report. Malformed entries
    /// and repeated ids are dropped and listed as defects. A blob that is not
    /// a JSON array yields no workouts and is copied to `<key>-corrupt` so
    /// the next save does not destroy it.
    pub fn load(&mut self) -> LoadReport {
        let blob = match self.medium.read(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return LoadReport::default(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to read stored workouts");
                return LoadReport::unusable(format!("failed to read: {e}"));
            }
        };

        let entries = match serde_json::from_str::<Value>(&blob) {
            Ok(Value::Array(entries)) => entries,
            Ok(Value::Null) => return LoadReport::default(),
            Ok(other) => {
                let reason = format!("expected an array of workouts, found {}", type_name(&other));
                return self.quarantine(&blob, reason);
            }
            Err(e) => return self.quarantine(&blob, format!("invalid JSON: {e}")),
        };

        let mut report = LoadReport::default();
        let mut seen = HashSet::new();
        for (index, entry) in entries.into_iter().enumerate() {
            let decoded = serde_json::from_value::<StoredWorkout>(entry)
                .map_err(|e| e.to_string())
                .and_then(StoredWorkout::into_workout);
            let reason = match decoded {
                Ok(workout) if seen.insert(workout.id().clone()) => {
                    report.workouts.push(workout);
                    continue;
                }
                Ok(workout) => format!("duplicate id `{}`", workout.id()),
                Err(reason) => reason,
            };
            tracing::warn!(key = %self.key, index, %reason, "dropping stored workout");
            report.defects.push(Defect {
                index: Some(index),
                reason,
            });
        }

        tracing::info!(
            key = %self.key,
            loaded = report.workouts.len(),
            dropped = report.defects.len(),
            "loaded workouts"
        );
        report
    }

    fn quarantine(&mut self, blob: &str, reason: String) -> LoadReport {
        let backup = format!("{}-corrupt", self.key);
        tracing::warn!(key = %self.key, %backup, %reason, "stored workouts are unreadable");
        if let Err(e) = self.medium.write(&backup, blob) {
            tracing::error!(key = %backup, error = %e, "failed to keep a copy of unreadable workouts");
        }
        LoadReport::unusable(reason)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
