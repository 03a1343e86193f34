//! Reconciles map markers with the workout list by id.

use std::collections::HashMap;

use crate::workout::{Workout, WorkoutId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerChange {
    Add(WorkoutId),
    /// Popup content or style is stale.
    Refresh(WorkoutId),
    Remove(WorkoutId),
}

/// Changes that turn the markers of `old` into the markers of `new`.
/// List order is irrelevant, so sorting produces no changes.
pub fn marker_changes<'a>(
    old: impl IntoIterator<Item = &'a Workout>,
    new: impl IntoIterator<Item = &'a Workout>,
) -> Vec<MarkerChange> {
    let mut previous: HashMap<&WorkoutId, &Workout> = old.into_iter().map(|w| (&w.id, w)).collect();
    let mut changes = Vec::new();

    for workout in new {
        match previous.remove(&workout.id) {
            None => changes.push(MarkerChange::Add(workout.id.clone())),
            Some(before) => {
                if before.popup_text() != workout.popup_text() || before.coords != workout.coords {
                    changes.push(MarkerChange::Refresh(workout.id.clone()));
                }
            }
        }
    }

    let mut removed: Vec<_> = previous.into_keys().cloned().collect();
    removed.sort();
    changes.extend(removed.into_iter().map(MarkerChange::Remove));

    changes
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::{input::WorkoutInput, store::{SortKey, WorkoutStore}, workout::Coords};

    fn store() -> WorkoutStore {
        let date = DateTime::parse_from_rfc3339("2024-04-14T10:30:00Z").unwrap();
        let mut store = WorkoutStore::new();
        store.add(Workout::running("1".into(), date, Coords(1., 1.), 9., 45., 170.)).unwrap();
        store.add(Workout::cycling("2".into(), date, Coords(2., 2.), 20., 60., 100.)).unwrap();
        store.add(Workout::running("3".into(), date, Coords(3., 3.), 4., 22., 175.)).unwrap();
        store
    }

    #[test]
    fn first_render_adds_everything() {
        let store = store();
        let changes = marker_changes([], store.iter());
        assert_eq!(
            changes,
            [
                MarkerChange::Add("1".into()),
                MarkerChange::Add("2".into()),
                MarkerChange::Add("3".into()),
            ]
        );
    }

    #[test]
    fn delete_removes_matching_marker() {
        let before = store();
        let mut after = before.clone();
        after.remove(&"2".into());

        assert_eq!(marker_changes(before.iter(), after.iter()), [MarkerChange::Remove("2".into())]);
    }

    #[test]
    fn sorting_keeps_markers() {
        let before = store();
        let mut after = before.clone();
        after.sort(SortKey::Distance);

        assert!(marker_changes(before.iter(), after.iter()).is_empty());
    }

    #[test]
    fn type_switch_refreshes_popup() {
        let before = store();
        let mut after = before.clone();
        after.get_mut(&"1".into()).unwrap().apply(&WorkoutInput::cycling(9., 45., 30.));

        assert_eq!(marker_changes(before.iter(), after.iter()), [MarkerChange::Refresh("1".into())]);
    }

    #[test]
    fn metric_only_edit_needs_no_refresh() {
        let before = store();
        let mut after = before.clone();
        after.get_mut(&"3".into()).unwrap().apply(&WorkoutInput::running(5., 25., 180.));

        assert!(marker_changes(before.iter(), after.iter()).is_empty());
    }
}
