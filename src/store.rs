//! The session's workout collection.
//!
//! A store starts [`Phase::Uninitialized`], restores persisted workouts once
//! while [`Phase::Loading`], and accepts new workouts only once
//! [`Phase::Ready`]. Every successful create is saved before it returns.

use std::collections::HashMap;

use crate::model::{Coordinate, Marker, ValidationError, Workout, WorkoutId, WorkoutInput};
use crate::storage::{Defect, Medium, Storage, StorageError};

/// Where a store is in its session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
}

/// Errors returned by store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("workout not found: {0}")]
    NotFound(WorkoutId),

    #[error("store is not ready; restore saved workouts first")]
    NotReady,

    #[error("store is already ready; workouts can only be restored once")]
    AlreadyReady,

    /// The workout was added for this session but may not survive a reload.
    #[error("workout {id} was added but could not be saved: {source}")]
    Persistence {
        id: WorkoutId,
        #[source]
        source: StorageError,
    },
}

pub type Result<T> = core::result::Result<T, StoreError>;

/// Owns the ordered workouts of one session and keeps storage in step with them.
#[derive(Debug)]
pub struct WorkoutStore<M> {
    storage: Storage<M>,
    phase: Phase,
    workouts: Vec<Workout>,
    // Position of each workout in `workouts`.
    index: HashMap<WorkoutId, usize>,
}

impl<M: Medium> WorkoutStore<M> {
    /// Creates an empty, uninitialized store backed by `storage`.
    pub fn new(storage: Storage<M>) -> Self {
        Self {
            storage,
            phase: Phase::Uninitialized,
            workouts: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates a store, loads what `storage` holds, and leaves it ready.
    ///
    /// Returns the defects the load had to drop alongside the store.
    pub fn open(storage: Storage<M>) -> (Self, Vec<Defect>) {
        let mut store = Self::new(storage);
        store.phase = Phase::Loading;
        let report = store.storage.load();
        store.replace(report.workouts);
        store.phase = Phase::Ready;
        (store, report.defects)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Replaces the whole collection with `workouts` and marks the store ready.
    ///
    /// Derived values are recomputed; business rules are not re-checked.
    /// Ids stay unique: a workout repeating an earlier id is skipped.
    /// Only allowed before the store is ready.
    pub fn restore(&mut self, workouts: Vec<Workout>) -> Result<()> {
        if self.phase == Phase::Ready {
            return Err(StoreError::AlreadyReady);
        }
        self.phase = Phase::Loading;
        self.replace(workouts);
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Validates `input`, appends the new workout and saves the collection.
    ///
    /// On [`StoreError::Persistence`] the workout stays in the store.
    pub fn create(&mut self, input: &WorkoutInput) -> Result<Workout> {
        if self.phase != Phase::Ready {
            return Err(StoreError::NotReady);
        }
        let workout = Workout::create(input)?;
        self.push(workout.clone());
        tracing::info!(id = %workout.id(), kind = %workout.kind(), "workout added");

        if let Err(source) = self.storage.save(&self.workouts) {
            tracing::error!(id = %workout.id(), error = %source, "failed to save workouts");
            return Err(StoreError::Persistence {
                id: workout.id().clone(),
                source,
            });
        }
        Ok(workout)
    }

    /// All workouts in creation order.
    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    pub fn find_by_id(&self, id: &WorkoutId) -> Result<&Workout> {
        self.index
            .get(id)
            .map(|&i| &self.workouts[i])
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// The coordinate a map should center on for the workout `id`.
    pub fn locate(&self, id: &WorkoutId) -> Result<Coordinate> {
        self.find_by_id(id).map(Workout::coordinate)
    }

    /// One map marker per workout, in creation order.
    pub fn markers(&self) -> Vec<Marker> {
        self.workouts.iter().map(Workout::marker).collect()
    }

    pub fn storage(&self) -> &Storage<M> {
        &self.storage
    }

    fn replace(&mut self, workouts: Vec<Workout>) {
        self.workouts.clear();
        self.index.clear();
        for workout in workouts {
            if self.index.contains_key(workout.id()) {
                tracing::warn!(id = %workout.id(), "skipping restored workout with duplicate id");
                continue;
            }
            self.push(workout.recompute_derived());
        }
    }

    fn push(&mut self, workout: Workout) {
        self.index.insert(workout.id().clone(), self.workouts.len());
        self.workouts.push(workout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    use jiff::Timestamp;
    use tempfile::TempDir;

    use crate::model::{Field, WorkoutKind};
    use crate::storage::{FileMedium, MemoryMedium};

    fn ready_store() -> WorkoutStore<MemoryMedium> {
        WorkoutStore::open(Storage::new(MemoryMedium::new(), "workouts")).0
    }

    fn nyc() -> Coordinate {
        Coordinate::new(40.7, -74.0)
    }

    fn run() -> WorkoutInput {
        WorkoutInput::running(nyc(), 5.0, 25.0, 178.0)
    }

    fn ride() -> WorkoutInput {
        WorkoutInput::cycling(nyc(), 20.0, 60.0, 150.0)
    }

    /// A medium that refuses writes once `fail` is set.
    #[derive(Default)]
    struct Flaky {
        inner: MemoryMedium,
        fail: bool,
    }

    impl Medium for Flaky {
        fn read(&self, key: &str) -> io::Result<Option<String>> {
            self.inner.read(key)
        }

        fn write(&mut self, key: &str, value: &str) -> io::Result<()> {
            if self.fail {
                return Err(io::Error::other("disk full"));
            }
            self.inner.write(key, value)
        }
    }

    #[test]
    fn open_empty_storage_is_ready() {
        let (store, defects) = WorkoutStore::open(Storage::new(MemoryMedium::new(), "workouts"));

        assert_eq!(store.phase(), Phase::Ready);
        assert!(store.is_empty());
        assert!(defects.is_empty());
    }

    #[test]
    fn create_appends_with_fresh_ids() {
        let mut store = ready_store();

        let first = store.create(&run()).unwrap();
        let second = store.create(&ride()).unwrap();
        let third = store.create(&run()).unwrap();

        assert_eq!(store.len(), 3);
        assert_ne!(first.id(), second.id());
        assert_ne!(first.id(), third.id());
        assert_ne!(second.id(), third.id());
        let kinds: Vec<_> = store.all().iter().map(Workout::kind).collect();
        assert_eq!(
            kinds,
            vec![WorkoutKind::Running, WorkoutKind::Cycling, WorkoutKind::Running]
        );
    }

    #[test]
    fn create_computes_metrics() {
        let mut store = ready_store();

        let running = store.create(&run()).unwrap();
        let cycling = store.create(&ride()).unwrap();

        assert_eq!(running.pace_min_per_km(), Some(5.0));
        assert_eq!(cycling.speed_kmh(), Some(20.0));
    }

    #[test]
    fn invalid_create_leaves_store_unchanged() {
        let mut store = ready_store();
        store.create(&run()).unwrap();

        let bad = WorkoutInput::running(nyc(), -3.0, 10.0, 150.0);
        let err = store.create(&bad).unwrap_err();

        let StoreError::Validation(err) = err else {
            panic!("expected a validation error");
        };
        assert!(err.cites(Field::DistanceKm));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn invalid_create_does_not_save() {
        let mut store = ready_store();
        let bad = WorkoutInput::cycling(nyc(), 0.0, 0.0, 10.0);

        store.create(&bad).unwrap_err();

        assert_eq!(store.storage().medium().read("workouts").unwrap(), None);
    }

    #[test]
    fn create_saves_before_returning() {
        let mut store = ready_store();
        let workout = store.create(&run()).unwrap();

        let blob = store.storage().medium().read("workouts").unwrap().unwrap();
        assert!(blob.contains(workout.id().as_str()));
    }

    #[test]
    fn create_before_ready_is_rejected() {
        let mut store = WorkoutStore::new(Storage::new(MemoryMedium::new(), "workouts"));

        let err = store.create(&run()).unwrap_err();

        assert!(matches!(err, StoreError::NotReady));
        assert!(store.is_empty());
    }

    #[test]
    fn save_failure_keeps_workout_in_memory() {
        let mut store = WorkoutStore::open(Storage::new(Flaky::default(), "workouts")).0;
        store.create(&run()).unwrap();

        store.storage.medium_mut().fail = true;
        let err = store.create(&ride()).unwrap_err();

        let StoreError::Persistence { id, .. } = err else {
            panic!("expected a persistence error");
        };
        assert_eq!(store.len(), 2);
        assert_eq!(store.find_by_id(&id).unwrap().kind(), WorkoutKind::Cycling);
    }

    #[test]
    fn find_by_id() {
        let mut store = ready_store();
        let created = store.create(&run()).unwrap();

        assert_eq!(store.find_by_id(created.id()).unwrap(), &created);

        let err = store.find_by_id(&"never-issued".into()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn locate_returns_coordinate() {
        let mut store = ready_store();
        let created = store.create(&ride()).unwrap();

        assert_eq!(store.locate(created.id()).unwrap(), nyc());
        assert!(matches!(
            store.locate(&"stale".into()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn markers_follow_creation_order() {
        let mut store = ready_store();
        store.create(&run()).unwrap();
        store.create(&ride()).unwrap();

        let markers = store.markers();

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].kind, WorkoutKind::Running);
        assert!(markers[0].label.starts_with("Running on "));
        assert_eq!(markers[1].kind, WorkoutKind::Cycling);
    }

    #[test]
    fn restore_replaces_and_recomputes() {
        let at: Timestamp = "2024-04-14T07:00:00Z".parse().unwrap();
        let saved = vec![
            Workout::create_at(&run(), "a".into(), at).unwrap(),
            Workout::create_at(&ride(), "b".into(), at).unwrap(),
        ];
        let mut store = WorkoutStore::new(Storage::new(MemoryMedium::new(), "workouts"));

        store.restore(saved.clone()).unwrap();

        assert_eq!(store.phase(), Phase::Ready);
        assert_eq!(store.all(), saved.as_slice());
        assert_eq!(store.find_by_id(&"b".into()).unwrap(), &saved[1]);
    }

    #[test]
    fn restore_keeps_first_of_duplicate_ids() {
        let at: Timestamp = "2024-04-14T07:00:00Z".parse().unwrap();
        let first = Workout::create_at(&run(), "same".into(), at).unwrap();
        let second = Workout::create_at(&ride(), "same".into(), at).unwrap();
        let other = Workout::create_at(&ride(), "other".into(), at).unwrap();
        let mut store = WorkoutStore::new(Storage::new(MemoryMedium::new(), "workouts"));

        store
            .restore(vec![first.clone(), second, other.clone()])
            .unwrap();

        assert_eq!(store.all(), [first.clone(), other.clone()].as_slice());
        assert_eq!(store.find_by_id(&"same".into()).unwrap(), &first);
        assert_eq!(store.find_by_id(&"other".into()).unwrap(), &other);
    }

    #[test]
    fn restore_after_ready_is_rejected() {
        let mut store = ready_store();
        store.create(&run()).unwrap();

        let err = store.restore(Vec::new()).unwrap_err();

        assert!(matches!(err, StoreError::AlreadyReady));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn reopen_restores_previous_session() {
        let dir = TempDir::new().unwrap();
        let open = || {
            let medium = FileMedium::new(dir.path()).unwrap();
            WorkoutStore::open(Storage::new(medium, "workouts"))
        };

        let (mut store, _) = open();
        let running = store.create(&run()).unwrap();
        let cycling = store.create(&ride()).unwrap();
        drop(store);

        let (reopened, defects) = open();

        assert!(defects.is_empty());
        assert_eq!(reopened.all(), [running.clone(), cycling].as_slice());
        assert_eq!(reopened.locate(running.id()).unwrap(), nyc());
    }
}
