//! Output formatting for CLI display.

use mapty::model::{Activity, Marker, Metric, Workout, WorkoutId, WorkoutKind};

/// The glyph shown next to a workout of `kind`.
pub(super) fn glyph(kind: WorkoutKind) -> &'static str {
    match kind {
        WorkoutKind::Running => "🏃",
        WorkoutKind::Cycling => "🚴",
    }
}

/// The first eight characters of an ID, or all of it if shorter.
pub(super) fn short_id(id: &WorkoutId) -> &str {
    let s = id.as_str();
    s.char_indices().nth(8).map_or(s, |(end, _)| &s[..end])
}

/// One list row: title line, then the workout's figures.
pub(super) fn format_row(w: &Workout) -> String {
    let metric = match w.metric() {
        Metric::Pace(pace) => format!("⚡ {pace:.1} min/km"),
        Metric::Speed(speed) => format!("⚡ {speed:.1} km/h"),
    };
    let extra = match w.activity() {
        Activity::Running { cadence_spm } => format!("🦶 {cadence_spm} spm"),
        Activity::Cycling { elevation_gain_m } => format!("⛰ {elevation_gain_m} m"),
    };
    format!(
        "{}  {} {}\n    {} {} km  ⏱ {} min  {metric}  {extra}",
        short_id(w.id()),
        glyph(w.kind()),
        w.description(),
        glyph(w.kind()),
        w.distance_km(),
        w.duration_min(),
    )
}

/// One map marker: glyph, label and where to pin it.
pub(super) fn format_marker(marker: &Marker) -> String {
    format!(
        "{} {} @ {}",
        glyph(marker.kind),
        marker.label,
        marker.coordinate
    )
}
