use std::{collections::HashMap, fmt, str::FromStr};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    record::WorkoutRecord,
    storage::{KeyValueStorage, StorageError, STORAGE_KEY},
    workout::{Workout, WorkoutId},
};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("a workout with id {0} already exists")]
    DuplicateId(WorkoutId),
    #[error("saved workouts are corrupt: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("failed to encode workouts: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Numeric field the list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Distance,
    Duration,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Distance => "distance",
            SortKey::Duration => "duration",
        }
    }

    fn value(&self, workout: &Workout) -> f64 {
        match self {
            SortKey::Distance => workout.distance,
            SortKey::Duration => workout.duration,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distance" => Ok(SortKey::Distance),
            "duration" => Ok(SortKey::Duration),
            other => Err(format!("cannot sort by {other}")),
        }
    }
}

/// Saved workouts read back from storage.
#[derive(Debug, Default)]
pub struct Loaded {
    pub store: WorkoutStore,
    /// Records that could not be rebuilt and were dropped.
    pub skipped: usize,
}

/// Ordered workouts, addressed by id.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorkoutStore {
    order: Vec<WorkoutId>,
    workouts: HashMap<WorkoutId, Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, workout: Workout) -> Result<(), StoreError> {
        if self.workouts.contains_key(&workout.id) {
            return Err(StoreError::DuplicateId(workout.id));
        }

        debug!(id = %workout.id, kind = %workout.kind(), "adding workout");
        self.order.push(workout.id.clone());
        self.workouts.insert(workout.id.clone(), workout);
        Ok(())
    }

    pub fn remove(&mut self, id: &WorkoutId) -> Option<Workout> {
        let workout = self.workouts.remove(id)?;
        self.order.retain(|other| other != id);
        debug!(%id, "removed workout");
        Some(workout)
    }

    pub fn get(&self, id: &WorkoutId) -> Option<&Workout> {
        self.workouts.get(id)
    }

    pub fn get_mut(&mut self, id: &WorkoutId) -> Option<&mut Workout> {
        self.workouts.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Workouts in list order.
    pub fn iter(&self) -> impl Iterator<Item = &Workout> + '_ {
        self.order.iter().filter_map(|id| self.workouts.get(id))
    }

    /// Stable ascending sort.
    pub fn sort(&mut self, key: SortKey) {
        let workouts = &self.workouts;
        self.order.sort_by(|a, b| key.value(&workouts[a]).total_cmp(&key.value(&workouts[b])));
        debug!(%key, "sorted workouts");
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.workouts.clear();
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        let records: Vec<WorkoutRecord> = self.iter().map(WorkoutRecord::from).collect();
        serde_json::to_string(&records).map_err(StoreError::Serialize)
    }

    /// Records that cannot be rebuilt into a workout are skipped and
    /// counted. A stored `null` reads as an empty list.
    pub fn from_json(json: &str) -> Result<Loaded, StoreError> {
        let values: Option<Vec<serde_json::Value>> = serde_json::from_str(json).map_err(StoreError::Malformed)?;
        let mut loaded = Loaded::default();

        for value in values.unwrap_or_default() {
            let workout = serde_json::from_value::<WorkoutRecord>(value)
                .map_err(|e| e.to_string())
                .and_then(|record| Workout::try_from(record).map_err(|e| e.to_string()));

            let added = workout.and_then(|workout| loaded.store.add(workout).map_err(|e| e.to_string()));
            if let Err(e) = added {
                warn!("skipping saved workout: {e}");
                loaded.skipped += 1;
            }
        }

        Ok(loaded)
    }

    pub fn save(&self, storage: &mut impl KeyValueStorage) -> Result<(), StoreError> {
        storage.set(STORAGE_KEY, &self.to_json()?)?;
        debug!(count = self.len(), "saved workouts");
        Ok(())
    }

    /// An absent entry yields an empty store.
    pub fn load(storage: &impl KeyValueStorage) -> Result<Loaded, StoreError> {
        let loaded = match storage.get(STORAGE_KEY)? {
            Some(json) => Self::from_json(&json)?,
            None => Loaded::default(),
        };
        info!(count = loaded.store.len(), skipped = loaded.skipped, "loaded workouts");
        Ok(loaded)
    }
}
