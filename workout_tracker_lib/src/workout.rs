use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::input::{VariantInput, WorkoutInput};

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September", "October", "November", "December",
];

/// Identifier derived from the creation time of a workout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    /// Last 10 digits of the millisecond timestamp.
    pub fn from_timestamp(date: &DateTime<FixedOffset>) -> Self {
        let millis = date.timestamp_millis().to_string();
        let start = millis.len().saturating_sub(10);
        Self(millis[start..].to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkoutId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Latitude and longitude, serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords(pub f64, pub f64);

impl Coords {
    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lng(&self) -> f64 {
        self.1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Running,
    Cycling,
}

impl WorkoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Running => "running",
            WorkoutType::Cycling => "cycling",
        }
    }

    /// Capitalized name used as the first word of a description.
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutType::Running => "Running",
            WorkoutType::Cycling => "Cycling",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            WorkoutType::Running => "🏃‍♂️",
            WorkoutType::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(WorkoutType::Running),
            "cycling" => Ok(WorkoutType::Cycling),
            other => Err(format!("unknown workout type: {other}")),
        }
    }
}

/// Type specific inputs together with the metric derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metrics {
    Running { cadence: f64, pace: f64 },
    Cycling { elevation_gain: f64, speed: f64 },
}

impl Metrics {
    fn derive(distance: f64, duration: f64, variant: VariantInput) -> Self {
        match variant {
            VariantInput::Running { cadence } => Metrics::Running {
                cadence,
                pace: duration / distance,
            },
            VariantInput::Cycling { elevation_gain } => Metrics::Cycling {
                elevation_gain,
                speed: distance / (duration / 60.),
            },
        }
    }

    pub fn kind(&self) -> WorkoutType {
        match self {
            Metrics::Running { .. } => WorkoutType::Running,
            Metrics::Cycling { .. } => WorkoutType::Cycling,
        }
    }
}

/// One row of a list entry: icon, formatted value and unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Detail {
    fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub id: WorkoutId,
    pub date: DateTime<FixedOffset>,
    pub coords: Coords,
    pub distance: f64,
    pub duration: f64,
    pub description: String,
    pub metrics: Metrics,
}

impl Workout {
    /// Builds a workout from already validated input.
    pub fn new(id: WorkoutId, date: DateTime<FixedOffset>, coords: Coords, input: &WorkoutInput) -> Self {
        let metrics = Metrics::derive(input.distance, input.duration, input.variant);
        Self {
            id,
            description: describe(metrics.kind(), &date),
            date,
            coords,
            distance: input.distance,
            duration: input.duration,
            metrics,
        }
    }

    pub fn running(id: WorkoutId, date: DateTime<FixedOffset>, coords: Coords, distance: f64, duration: f64, cadence: f64) -> Self {
        Self::new(id, date, coords, &WorkoutInput::running(distance, duration, cadence))
    }

    pub fn cycling(id: WorkoutId, date: DateTime<FixedOffset>, coords: Coords, distance: f64, duration: f64, elevation_gain: f64) -> Self {
        Self::new(id, date, coords, &WorkoutInput::cycling(distance, duration, elevation_gain))
    }

    pub fn kind(&self) -> WorkoutType {
        self.metrics.kind()
    }

    pub fn pace(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Running { pace, .. } => Some(pace),
            Metrics::Cycling { .. } => None,
        }
    }

    pub fn cadence(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Running { cadence, .. } => Some(cadence),
            Metrics::Cycling { .. } => None,
        }
    }

    pub fn speed(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Cycling { speed, .. } => Some(speed),
            Metrics::Running { .. } => None,
        }
    }

    pub fn elevation_gain(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Cycling { elevation_gain, .. } => Some(elevation_gain),
            Metrics::Running { .. } => None,
        }
    }

    /// Applies an edit in place. Switching type replaces the metrics of the
    /// old variant and the first word of the description.
    pub fn apply(&mut self, input: &WorkoutInput) {
        let old_kind = self.kind();
        self.distance = input.distance;
        self.duration = input.duration;
        self.metrics = Metrics::derive(input.distance, input.duration, input.variant);

        if self.kind() != old_kind {
            self.description = relabel(&self.description, self.kind());
        }
    }

    pub fn popup_text(&self) -> String {
        format!("{} {}", self.kind().emoji(), self.description)
    }

    pub fn popup_class(&self) -> String {
        format!("{}-popup", self.kind())
    }

    /// Rows shown in the list entry, type specific rows last.
    pub fn details(&self) -> Vec<Detail> {
        let mut details = vec![
            Detail::new(self.kind().emoji(), fmt_number(self.distance), "km"),
            Detail::new("⏱", fmt_number(self.duration), "min"),
        ];

        match self.metrics {
            Metrics::Running { cadence, pace } => {
                details.push(Detail::new("⚡️", format!("{pace:.1}"), "min/km"));
                details.push(Detail::new("🦶🏼", fmt_number(cadence), "spm"));
            }
            Metrics::Cycling { elevation_gain, speed } => {
                details.push(Detail::new("⚡️", format!("{speed:.1}"), "km/h"));
                details.push(Detail::new("⛰", fmt_number(elevation_gain), "m"));
            }
        }

        details
    }
}

/// "Running on April 14"
pub fn describe(kind: WorkoutType, date: &DateTime<FixedOffset>) -> String {
    format!("{} on {} {}", kind.label(), MONTHS[date.month0() as usize], date.day())
}

fn relabel(description: &str, kind: WorkoutType) -> String {
    match description.split_once(' ') {
        Some((_, rest)) => format!("{} {}", kind.label(), rest),
        None => kind.label().to_owned(),
    }
}

/// Integral values print without a fractional part, like the browser does.
pub(crate) fn fmt_number(value: f64) -> String {
    if value.fract() == 0. && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
