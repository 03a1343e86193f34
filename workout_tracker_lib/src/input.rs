use thiserror::Error;

use crate::workout::{fmt_number, Metrics, Workout, WorkoutType};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("only numbers")]
    NotANumber,
    #[error("only positive numbers")]
    NotPositive,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariantInput {
    Running { cadence: f64 },
    Cycling { elevation_gain: f64 },
}

/// Validated numbers for creating or editing a workout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutInput {
    pub distance: f64,
    pub duration: f64,
    pub variant: VariantInput,
}

impl WorkoutInput {
    pub fn running(distance: f64, duration: f64, cadence: f64) -> Self {
        Self {
            distance,
            duration,
            variant: VariantInput::Running { cadence },
        }
    }

    pub fn cycling(distance: f64, duration: f64, elevation_gain: f64) -> Self {
        Self {
            distance,
            duration,
            variant: VariantInput::Cycling { elevation_gain },
        }
    }

    pub fn kind(&self) -> WorkoutType {
        match self.variant {
            VariantInput::Running { .. } => WorkoutType::Running,
            VariantInput::Cycling { .. } => WorkoutType::Cycling,
        }
    }

    /// Running needs every value positive, cycling only distance and
    /// duration. Elevation gain may be zero or negative.
    pub fn validate(&self) -> Result<(), InputError> {
        let (extra, extra_must_be_positive) = match self.variant {
            VariantInput::Running { cadence } => (cadence, true),
            VariantInput::Cycling { elevation_gain } => (elevation_gain, false),
        };

        if ![self.distance, self.duration, extra].iter().all(|v| v.is_finite()) {
            return Err(InputError::NotANumber);
        }

        let mut positive = vec![self.distance, self.duration];
        if extra_must_be_positive {
            positive.push(extra);
        }
        if !positive.iter().all(|v| *v > 0.) {
            return Err(InputError::NotPositive);
        }

        Ok(())
    }
}

/// Raw contents of the workout form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFields {
    pub kind: WorkoutType,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            kind: WorkoutType::Running,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
        }
    }
}

impl FormFields {
    /// Pre-fills the form for editing an existing workout.
    pub fn from_workout(workout: &Workout) -> Self {
        let mut fields = Self {
            kind: workout.kind(),
            distance: fmt_number(workout.distance),
            duration: fmt_number(workout.duration),
            ..Default::default()
        };

        match workout.metrics {
            Metrics::Running { cadence, .. } => fields.cadence = fmt_number(cadence),
            Metrics::Cycling { elevation_gain, .. } => fields.elevation = fmt_number(elevation_gain),
        }

        fields
    }

    /// Parses and validates the fields relevant to the selected type.
    pub fn parse(&self) -> Result<WorkoutInput, InputError> {
        let distance = parse_number(&self.distance);
        let duration = parse_number(&self.duration);

        let input = match self.kind {
            WorkoutType::Running => WorkoutInput::running(distance, duration, parse_number(&self.cadence)),
            WorkoutType::Cycling => WorkoutInput::cycling(distance, duration, parse_number(&self.elevation)),
        };

        input.validate()?;
        Ok(input)
    }
}

/// Blank reads as 0 and garbage as NaN, matching numeric coercion of form values.
fn parse_number(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.;
    }
    raw.parse::<f64>().unwrap_or(f64::NAN)
}
