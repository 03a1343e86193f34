use chrono::{DateTime, FixedOffset};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    input::{FormFields, InputError},
    storage::{KeyValueStorage, StorageError, STORAGE_KEY},
    store::{SortKey, StoreError, WorkoutStore},
    workout::{Coords, Workout, WorkoutId},
};

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no location selected, click on the map first")]
    NoLocation,
    #[error("finish editing the current workout first")]
    EditInProgress,
    #[error("no workout is being edited")]
    NotEditing,
    #[error("unknown workout {0}")]
    UnknownWorkout(WorkoutId),
}

impl From<StorageError> for TrackerError {
    fn from(e: StorageError) -> Self {
        TrackerError::Store(StoreError::Storage(e))
    }
}

/// What the workout form is currently used for.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Idle,
    Creating { coords: Coords },
    Editing { id: WorkoutId },
}

/// Owns the workouts and the form mode, persisting after every change.
pub struct Tracker<S: KeyValueStorage> {
    store: WorkoutStore,
    mode: Mode,
    storage: S,
    skipped_on_load: usize,
}

impl<S: KeyValueStorage> Tracker<S> {
    pub fn new(storage: S) -> Self {
        Self {
            store: WorkoutStore::new(),
            mode: Mode::Idle,
            storage,
            skipped_on_load: 0,
        }
    }

    /// Restores the saved workouts.
    pub fn load(storage: S) -> Result<Self, (S, TrackerError)> {
        match WorkoutStore::load(&storage) {
            Ok(loaded) => Ok(Self {
                store: loaded.store,
                mode: Mode::Idle,
                storage,
                skipped_on_load: loaded.skipped,
            }),
            Err(e) => Err((storage, e.into())),
        }
    }

    /// Saved records dropped by `load` because they could not be rebuilt.
    /// They are gone from storage after the next change.
    pub fn skipped_on_load(&self) -> usize {
        self.skipped_on_load
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn workouts(&self) -> impl Iterator<Item = &Workout> + '_ {
        self.store.iter()
    }

    /// Workouts shown in the list, last in store order on top. The one
    /// being edited is hidden.
    pub fn listed(&self) -> Vec<&Workout> {
        let editing = match &self.mode {
            Mode::Editing { id } => Some(id),
            _ => None,
        };
        let mut listed: Vec<_> = self.store.iter().filter(|w| Some(&w.id) != editing).collect();
        listed.reverse();
        listed
    }

    pub fn get(&self, id: &WorkoutId) -> Option<&Workout> {
        self.store.get(id)
    }

    pub fn is_form_open(&self) -> bool {
        self.mode != Mode::Idle
    }

    /// Opens the form for a new workout at `coords`. Ignored while editing.
    pub fn map_clicked(&mut self, coords: Coords) {
        if let Mode::Editing { .. } = self.mode {
            debug!("map click ignored while editing");
            return;
        }
        self.mode = Mode::Creating { coords };
    }

    pub fn cancel(&mut self) {
        self.mode = Mode::Idle;
    }

    pub fn submit_new(&mut self, fields: &FormFields, now: DateTime<FixedOffset>) -> Result<&Workout, TrackerError> {
        let coords = match self.mode {
            Mode::Creating { coords } => coords,
            Mode::Editing { .. } => return Err(TrackerError::EditInProgress),
            Mode::Idle => return Err(TrackerError::NoLocation),
        };

        let input = fields.parse()?;
        let workout = Workout::new(WorkoutId::from_timestamp(&now), now, coords, &input);
        let id = workout.id.clone();

        self.store.add(workout)?;
        self.mode = Mode::Idle;
        self.persist()?;

        self.store.get(&id).ok_or(TrackerError::UnknownWorkout(id))
    }

    /// Switches to editing `id` and returns the form pre-filled from it.
    pub fn begin_edit(&mut self, id: &WorkoutId) -> Result<FormFields, TrackerError> {
        let workout = self.store.get(id).ok_or_else(|| TrackerError::UnknownWorkout(id.clone()))?;
        let fields = FormFields::from_workout(workout);
        self.mode = Mode::Editing { id: id.clone() };
        debug!(%id, "editing workout");
        Ok(fields)
    }

    pub fn commit_edit(&mut self, fields: &FormFields) -> Result<&Workout, TrackerError> {
        let Mode::Editing { id } = &self.mode else {
            return Err(TrackerError::NotEditing);
        };
        let id = id.clone();

        let input = fields.parse()?;
        let workout = self.store.get_mut(&id).ok_or_else(|| TrackerError::UnknownWorkout(id.clone()))?;
        workout.apply(&input);
        debug!(%id, kind = %workout.kind(), "edited workout");

        self.mode = Mode::Idle;
        self.persist()?;

        self.store.get(&id).ok_or(TrackerError::UnknownWorkout(id))
    }

    pub fn delete(&mut self, id: &WorkoutId) -> Result<Workout, TrackerError> {
        let workout = self.store.remove(id).ok_or_else(|| TrackerError::UnknownWorkout(id.clone()))?;
        if self.mode == (Mode::Editing { id: id.clone() }) {
            self.mode = Mode::Idle;
        }
        self.persist()?;
        Ok(workout)
    }

    /// Reorders the list. Not persisted until the next change.
    pub fn sort(&mut self, key: SortKey) {
        self.store.sort(key);
    }

    /// Forgets every workout, in memory and in storage.
    pub fn reset(&mut self) -> Result<(), TrackerError> {
        self.storage.remove(STORAGE_KEY)?;
        self.store.clear();
        self.mode = Mode::Idle;
        info!("reset workouts");
        Ok(())
    }

    fn persist(&mut self) -> Result<(), TrackerError> {
        self.store.save(&mut self.storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::MemoryStorage, workout::WorkoutType};

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn now(seconds: u32) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(&format!("2024-04-14T10:30:{seconds:02}+02:00")).unwrap()
    }

    fn running(distance: &str, duration: &str, cadence: &str) -> FormFields {
        FormFields {
            kind: WorkoutType::Running,
            distance: distance.into(),
            duration: duration.into(),
            cadence: cadence.into(),
            ..Default::default()
        }
    }

    fn cycling(distance: &str, duration: &str, elevation: &str) -> FormFields {
        FormFields {
            kind: WorkoutType::Cycling,
            distance: distance.into(),
            duration: duration.into(),
            elevation: elevation.into(),
            ..Default::default()
        }
    }

    fn tracker_with(n: u32) -> Tracker<MemoryStorage> {
        let mut tracker = Tracker::new(MemoryStorage::new());
        for i in 0..n {
            tracker.map_clicked(Coords(10. + i as f64, 20.));
            tracker.submit_new(&running(&format!("{}", i + 1), "30", "170"), now(i)).unwrap();
        }
        tracker
    }

    #[test]
    fn submit_creates_and_persists_workout() {
        init_logging();
        let mut tracker = Tracker::new(MemoryStorage::new());
        tracker.map_clicked(Coords(10., 20.));
        assert!(tracker.is_form_open());

        let workout = tracker.submit_new(&running("5", "25", "178"), now(0)).unwrap();
        assert_eq!(workout.kind(), WorkoutType::Running);
        assert_eq!(workout.distance, 5.);
        assert_eq!(workout.duration, 25.);
        assert_eq!(workout.cadence(), Some(178.));
        assert_eq!(workout.pace(), Some(5.));
        assert_eq!(workout.coords, Coords(10., 20.));
        assert_eq!(tracker.mode(), &Mode::Idle);

        let saved = tracker.storage.get(STORAGE_KEY).unwrap().unwrap();
        let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
        assert_eq!(saved[0]["type"], "running");
        assert_eq!(saved[0]["pace"], 5.);
    }

    #[test]
    fn submit_without_location_fails() {
        let mut tracker = Tracker::new(MemoryStorage::new());
        assert!(matches!(
            tracker.submit_new(&running("5", "25", "178"), now(0)),
            Err(TrackerError::NoLocation)
        ));
    }

    #[test]
    fn invalid_input_leaves_state_untouched() {
        let mut tracker = Tracker::new(MemoryStorage::new());
        tracker.map_clicked(Coords(10., 20.));

        let err = tracker.submit_new(&running("5", "abc", "178"), now(0)).unwrap_err();
        assert_eq!(err.to_string(), "only numbers");
        let err = tracker.submit_new(&running("5", "25", "-1"), now(0)).unwrap_err();
        assert_eq!(err.to_string(), "only positive numbers");

        assert!(tracker.store().is_empty());
        assert_eq!(tracker.mode(), &Mode::Creating { coords: Coords(10., 20.) });
        assert!(tracker.storage.get(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn cancel_closes_form() {
        let mut tracker = Tracker::new(MemoryStorage::new());
        tracker.map_clicked(Coords(10., 20.));
        tracker.cancel();
        assert_eq!(tracker.mode(), &Mode::Idle);
        assert!(!tracker.is_form_open());
    }

    #[test]
    fn edit_hides_entry_and_blocks_new_submissions() {
        let mut tracker = tracker_with(2);
        let id = tracker.workouts().next().unwrap().id.clone();

        let fields = tracker.begin_edit(&id).unwrap();
        assert_eq!(fields, running("1", "30", "170"));
        assert_eq!(tracker.listed().len(), 1);
        assert_eq!(tracker.store().len(), 2);

        tracker.map_clicked(Coords(0., 0.));
        assert_eq!(tracker.mode(), &Mode::Editing { id: id.clone() });
        assert!(matches!(
            tracker.submit_new(&running("5", "25", "178"), now(59)),
            Err(TrackerError::EditInProgress)
        ));
        assert_eq!(tracker.store().len(), 2);
    }

    #[test]
    fn commit_edit_switches_type_in_place() {
        let mut tracker = tracker_with(1);
        let id = tracker.workouts().next().unwrap().id.clone();

        tracker.begin_edit(&id).unwrap();
        let workout = tracker.commit_edit(&cycling("20", "60", "150")).unwrap();

        assert_eq!(workout.id, id);
        assert_eq!(workout.kind(), WorkoutType::Cycling);
        assert_eq!(workout.pace(), None);
        assert_eq!(workout.cadence(), None);
        assert_eq!(workout.speed(), Some(20.));
        assert_eq!(workout.elevation_gain(), Some(150.));
        assert!(workout.description.starts_with("Cycling "));
        assert_eq!(tracker.mode(), &Mode::Idle);
        assert_eq!(tracker.listed().len(), 1);

        let saved = tracker.storage.get(STORAGE_KEY).unwrap().unwrap();
        let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
        assert_eq!(saved[0]["type"], "cycling");
        assert!(saved[0].get("cadence").is_none());
        assert!(saved[0].get("pace").is_none());
        assert_eq!(saved[0]["elevationGain"], 150.);
    }

    #[test]
    fn invalid_edit_keeps_editing() {
        let mut tracker = tracker_with(1);
        let id = tracker.workouts().next().unwrap().id.clone();
        let before = tracker.get(&id).cloned();

        tracker.begin_edit(&id).unwrap();
        assert!(matches!(tracker.commit_edit(&cycling("0", "60", "150")), Err(TrackerError::Input(InputError::NotPositive))));
        assert_eq!(tracker.mode(), &Mode::Editing { id: id.clone() });
        assert_eq!(tracker.get(&id).cloned(), before);
    }

    #[test]
    fn commit_without_edit_fails() {
        let mut tracker = tracker_with(1);
        assert!(matches!(tracker.commit_edit(&running("1", "2", "3")), Err(TrackerError::NotEditing)));
    }

    #[test]
    fn delete_removes_and_persists() {
        let mut tracker = tracker_with(3);
        let id = tracker.workouts().nth(1).unwrap().id.clone();

        let removed = tracker.delete(&id).unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(tracker.store().len(), 2);
        assert!(tracker.get(&id).is_none());

        let reloaded = Tracker::load(tracker.storage.clone()).ok().unwrap();
        assert_eq!(reloaded.store().len(), 2);
        assert!(matches!(tracker.delete(&id), Err(TrackerError::UnknownWorkout(_))));
    }

    #[test]
    fn deleting_edited_workout_closes_form() {
        let mut tracker = tracker_with(1);
        let id = tracker.workouts().next().unwrap().id.clone();
        tracker.begin_edit(&id).unwrap();
        tracker.delete(&id).unwrap();
        assert_eq!(tracker.mode(), &Mode::Idle);
    }

    #[test]
    fn sort_reorders_list() {
        let mut tracker = Tracker::new(MemoryStorage::new());
        for (i, distance) in ["7", "2", "5"].into_iter().enumerate() {
            tracker.map_clicked(Coords(0., 0.));
            tracker.submit_new(&running(distance, "30", "170"), now(i as u32)).unwrap();
        }

        tracker.sort(SortKey::Distance);
        let distances: Vec<f64> = tracker.workouts().map(|w| w.distance).collect();
        assert_eq!(distances, [2., 5., 7.]);
        let shown: Vec<f64> = tracker.listed().iter().map(|w| w.distance).collect();
        assert_eq!(shown, [7., 5., 2.]);
    }

    #[test]
    fn newest_workout_is_listed_first() {
        let tracker = tracker_with(3);
        let shown: Vec<f64> = tracker.listed().iter().map(|w| w.distance).collect();
        assert_eq!(shown, [3., 2., 1.]);
    }

    #[test]
    fn cancel_edit_restores_entry_untouched() {
        let mut tracker = tracker_with(2);
        let id = tracker.workouts().next().unwrap().id.clone();
        let before = tracker.get(&id).cloned();

        tracker.begin_edit(&id).unwrap();
        assert!(tracker.listed().iter().all(|w| w.id != id));

        tracker.cancel();
        assert_eq!(tracker.mode(), &Mode::Idle);
        assert_eq!(tracker.get(&id).cloned(), before);
        assert_eq!(tracker.listed().len(), 2);
        assert!(tracker.listed().iter().any(|w| w.id == id));
    }

    #[test]
    fn second_map_click_moves_target() {
        let mut tracker = Tracker::new(MemoryStorage::new());
        tracker.map_clicked(Coords(10., 20.));
        tracker.map_clicked(Coords(30., 40.));
        assert_eq!(tracker.mode(), &Mode::Creating { coords: Coords(30., 40.) });

        let workout = tracker.submit_new(&running("5", "25", "178"), now(0)).unwrap();
        assert_eq!(workout.coords, Coords(30., 40.));
    }

    #[test]
    fn edit_while_creating_takes_over_form() {
        let mut tracker = tracker_with(1);
        let id = tracker.workouts().next().unwrap().id.clone();

        tracker.map_clicked(Coords(50., 60.));
        let fields = tracker.begin_edit(&id).unwrap();
        assert_eq!(fields, running("1", "30", "170"));
        assert_eq!(tracker.mode(), &Mode::Editing { id: id.clone() });

        tracker.commit_edit(&running("2", "30", "170")).unwrap();
        assert_eq!(tracker.store().len(), 1);
        assert_eq!(tracker.get(&id).unwrap().distance, 2.);
        assert_eq!(tracker.get(&id).unwrap().coords, Coords(10., 20.));
    }

    #[test]
    fn load_counts_dropped_records() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                STORAGE_KEY,
                r#"[
                    {"id":"1","date":"2024-04-14T08:30:00Z","type":"running","distance":5,"duration":25,"coords":[1,2],"cadence":178},
                    {"id":"2","date":"2024-04-14T08:30:00Z","type":"cycling","distance":5,"duration":25,"coords":[1,2]}
                ]"#,
            )
            .unwrap();

        let tracker = Tracker::load(storage).ok().unwrap();
        assert_eq!(tracker.store().len(), 1);
        assert_eq!(tracker.skipped_on_load(), 1);
    }

    #[test]
    fn reset_clears_everything() {
        let mut tracker = tracker_with(2);
        tracker.reset().unwrap();
        assert!(tracker.store().is_empty());
        assert!(tracker.storage.get(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn load_reports_corrupt_storage() {
        let mut storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, "not json").unwrap();
        let Err((_, e)) = Tracker::load(storage) else {
            panic!("corrupt storage should not load");
        };
        assert!(matches!(e, TrackerError::Store(StoreError::Malformed(_))));
    }
}
