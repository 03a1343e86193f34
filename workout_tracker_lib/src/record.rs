use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    input::{InputError, WorkoutInput},
    workout::{Coords, Metrics, Workout, WorkoutId, WorkoutType},
};

#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
    #[error("{kind} workout {id} has no {field}")]
    MissingField {
        id: WorkoutId,
        kind: WorkoutType,
        field: &'static str,
    },
    #[error("workout {id} has invalid values: {source}")]
    InvalidValues {
        id: WorkoutId,
        #[source]
        source: InputError,
    },
}

/// Flat on-disk shape of a workout. Older saves used the keys `descrtiption`
/// and `elavationGain`, which are still accepted when reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: WorkoutId,
    pub date: DateTime<FixedOffset>,
    #[serde(rename = "type")]
    pub kind: WorkoutType,
    pub distance: f64,
    pub duration: f64,
    pub coords: Coords,
    #[serde(default, alias = "descrtiption")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    #[serde(default, alias = "elavationGain", skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl From<&Workout> for WorkoutRecord {
    fn from(workout: &Workout) -> Self {
        let mut record = Self {
            id: workout.id.clone(),
            date: workout.date,
            kind: workout.kind(),
            distance: workout.distance,
            duration: workout.duration,
            coords: workout.coords,
            description: workout.description.clone(),
            cadence: None,
            pace: None,
            elevation_gain: None,
            speed: None,
        };

        match workout.metrics {
            Metrics::Running { cadence, pace } => {
                record.cadence = Some(cadence);
                record.pace = Some(pace);
            }
            Metrics::Cycling { elevation_gain, speed } => {
                record.elevation_gain = Some(elevation_gain);
                record.speed = Some(speed);
            }
        }

        record
    }
}

impl TryFrom<WorkoutRecord> for Workout {
    type Error = RecordError;

    /// Rebuilds the workout through its variant constructor, so stored
    /// derived metrics are recomputed rather than trusted.
    fn try_from(record: WorkoutRecord) -> Result<Self, Self::Error> {
        let missing = |field| RecordError::MissingField {
            id: record.id.clone(),
            kind: record.kind,
            field,
        };

        let input = match record.kind {
            WorkoutType::Running => {
                let cadence = record.cadence.ok_or_else(|| missing("cadence"))?;
                WorkoutInput::running(record.distance, record.duration, cadence)
            }
            WorkoutType::Cycling => {
                let elevation_gain = record.elevation_gain.ok_or_else(|| missing("elevationGain"))?;
                WorkoutInput::cycling(record.distance, record.duration, elevation_gain)
            }
        };

        input.validate().map_err(|source| RecordError::InvalidValues {
            id: record.id.clone(),
            source,
        })?;

        let mut workout = Workout::new(record.id, record.date, record.coords, &input);
        if !record.description.is_empty() {
            workout.description = record.description;
        }

        Ok(workout)
    }
}
