//! Core state of the Mapty workout logger.
//!
//! Everything here is independent of the browser: storage and the map are
//! reached through the [`SnapshotStorage`] and [`MapSurface`] traits, and
//! timestamps are passed in. The Yew front end owns a single [`Tracker`] and
//! forwards every user or platform event to it.

use chrono::{DateTime, Local};
use log::{debug, info, warn};

pub mod config;
pub mod form;
pub mod store;
pub mod sync;
pub mod workout;

pub use form::{Field, FormController, FormError, FormFields, FormState};
pub use store::{MemoryStorage, SnapshotStorage, StorageError, WorkoutStore};
pub use sync::{MapSurface, Marker, PopupStyle, ViewSync};
pub use workout::{Activity, Coords, DetailRow, IdGenerator, Kind, Workout};

/// Application controller: the workout list, the form, and the map once it
/// exists.
#[derive(Debug)]
pub struct Tracker<S: SnapshotStorage, M: MapSurface> {
    store: WorkoutStore<S>,
    form: FormController,
    sync: ViewSync,
    ids: IdGenerator,
    map: Option<M>,
}

impl<S: SnapshotStorage, M: MapSurface> Tracker<S, M> {
    /// Rehydrate prior workouts from the default storage slot.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, config::STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: &str) -> Self {
        let store = WorkoutStore::load_all(storage, key);
        let ids = IdGenerator::seeded(store.workouts().iter().map(Workout::id));
        Self {
            store,
            form: FormController::new(),
            sync: ViewSync::new(),
            ids,
            map: None,
        }
    }

    pub fn store(&self) -> &WorkoutStore<S> {
        &self.store
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn sync(&self) -> &ViewSync {
        &self.sync
    }

    pub fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    /// The map finished loading: keep it and give every known workout a
    /// marker.
    pub fn map_ready(&mut self, map: M) {
        let placed = self.sync.place_markers(self.store.workouts(), &map);
        info!("Map ready, placed {} markers", placed);
        self.map = Some(map);
    }

    pub fn map_clicked(&mut self, coords: Coords) {
        debug!("Map clicked at ({}, {})", coords.lat(), coords.lng());
        self.form.show(coords);
    }

    pub fn kind_changed(&mut self, kind: Kind) {
        self.form.set_kind(kind);
    }

    pub fn field_edited(&mut self, field: Field, text: String) {
        self.form.edit(field, text);
    }

    /// Validate the form and log a new workout created at `now`.
    ///
    /// On success the workout is stored, persisted, given a marker, and the
    /// form is hidden; its id is returned. On failure nothing changes.
    pub fn submit(&mut self, now: DateTime<Local>) -> Result<String, FormError> {
        let new = self.form.submit()?;
        let id = self.ids.next_id(&now);
        let workout = new.build(id.clone(), now);
        info!("Logging {}", workout.description());

        if let Err(e) = self.store.append(workout) {
            warn!("Workout {} kept in memory only: {}", id, e);
        }
        if let Some(map) = &self.map {
            self.sync.place_markers(self.store.workouts(), map);
        }
        self.form.hide();
        Ok(id)
    }

    /// The hide animation delay started after hide number `hide` elapsed.
    pub fn form_settled(&mut self, hide: u64) {
        self.form.settle(hide);
    }

    /// A list item with `id` was clicked. Returns whether the map moved.
    pub fn list_clicked(&mut self, id: &str) -> bool {
        match &self.map {
            Some(map) => self.sync.move_to(self.store.workouts(), id, map),
            None => false,
        }
    }

    /// Forget every workout, including the persisted snapshot. The caller is
    /// expected to restart the application afterwards.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.store.reset()?;
        self.form = FormController::new();
        self.sync = ViewSync::new();
        info!("Workout history cleared");
        Ok(())
    }
}
