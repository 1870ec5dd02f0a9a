//! The ordered, append-only workout list and its snapshot persistence.
//!
//! Every append rewrites the whole snapshot under one storage key. Loading
//! never fails: a missing or unreadable snapshot is an empty history.

use crate::workout::{Workout, WorkoutRecord};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;

/// Errors raised by a [`SnapshotStorage`] backend or while encoding a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not be reached at all.
    Unavailable,
    /// The backend refused the operation (quota, permissions, ...).
    Backend(String),
    /// The snapshot could not be encoded.
    Encode(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "Persistent storage is unavailable"),
            StorageError::Backend(msg) => write!(f, "Storage backend error: {}", msg),
            StorageError::Encode(msg) => write!(f, "Failed to encode snapshot: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// A string-keyed slot store, e.g. the browser's `localStorage`.
pub trait SnapshotStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Storage that lives only as long as the value does.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.slots.remove(key);
        Ok(())
    }
}

/// Serialize the full list as a JSON array of records.
pub fn encode_snapshot(workouts: &[Workout]) -> Result<String, StorageError> {
    let records: Vec<WorkoutRecord> = workouts.iter().map(Workout::to_record).collect();
    serde_json::to_string(&records).map_err(|e| StorageError::Encode(e.to_string()))
}

/// Parse a snapshot and rebuild each record into a [`Workout`].
///
/// An unparseable snapshot yields nothing. Individual records that fail to
/// rebuild are skipped.
pub fn decode_snapshot(raw: &str) -> Vec<Workout> {
    let records: Vec<WorkoutRecord> = match serde_json::from_str(raw) {
        Ok(records) => records,
        Err(e) => {
            warn!("Discarding unreadable workout snapshot: {}", e);
            return Vec::new();
        }
    };

    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match Workout::from_record(record) {
                Ok(workout) => Some(workout),
                Err(e) => {
                    warn!("Skipping persisted workout {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

/// Ordered workout list mirrored to a [`SnapshotStorage`] slot.
#[derive(Debug)]
pub struct WorkoutStore<S: SnapshotStorage> {
    workouts: Vec<Workout>,
    storage: S,
    key: String,
}

impl<S: SnapshotStorage> WorkoutStore<S> {
    /// Rehydrate from the snapshot under `key`, or start empty.
    pub fn load_all(storage: S, key: &str) -> Self {
        let workouts = match storage.read(key) {
            Ok(Some(raw)) => decode_snapshot(&raw),
            Ok(None) => {
                debug!("No workout snapshot under '{}'", key);
                Vec::new()
            }
            Err(e) => {
                warn!("Could not read workout snapshot: {}", e);
                Vec::new()
            }
        };
        info!("Loaded {} workouts from storage", workouts.len());

        Self {
            workouts,
            storage,
            key: key.to_string(),
        }
    }

    /// Add `workout` at the end and rewrite the snapshot.
    ///
    /// The in-memory list keeps the entry even when the save fails; the
    /// error is returned for the caller to report.
    pub fn append(&mut self, workout: Workout) -> Result<(), StorageError> {
        self.workouts.push(workout);
        self.save()
    }

    /// Overwrite the snapshot with the full current list.
    pub fn save(&mut self) -> Result<(), StorageError> {
        let snapshot = encode_snapshot(&self.workouts)?;
        self.storage.write(&self.key, &snapshot)?;
        debug!("Saved snapshot of {} workouts", self.workouts.len());
        Ok(())
    }

    /// Drop the snapshot and every in-memory entry.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.workouts.clear();
        self.storage.remove(&self.key)
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    /// Entries in insertion order.
    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    /// Entries newest first, the order the list view shows them in.
    pub fn newest_first(&self) -> impl Iterator<Item = &Workout> {
        self.workouts.iter().rev()
    }

    pub fn find(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{Activity, Coords, Kind};
    use chrono::{Local, TimeZone};

    const KEY: &str = "workouts";

    fn running(id: &str) -> Workout {
        let at = Local.with_ymd_and_hms(2024, 4, 14, 8, 30, 0).unwrap();
        Workout::running(id.into(), at, Coords(40.0, -75.0), 5.0, 25.0, 150)
    }

    fn cycling(id: &str) -> Workout {
        let at = Local.with_ymd_and_hms(2024, 4, 15, 18, 0, 0).unwrap();
        Workout::cycling(id.into(), at, Coords(41.5, -74.25), 20.0, 45.0, -12.0)
    }

    #[test]
    fn missing_snapshot_loads_empty() {
        let store = WorkoutStore::load_all(MemoryStorage::new(), KEY);
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_snapshot_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage.write(KEY, "{not json").unwrap();
        let store = WorkoutStore::load_all(storage, KEY);
        assert!(store.is_empty());

        let mut storage = MemoryStorage::new();
        storage.write(KEY, "null").unwrap();
        assert!(WorkoutStore::load_all(storage, KEY).is_empty());
    }

    #[test]
    fn append_writes_full_snapshot() {
        let mut store = WorkoutStore::load_all(MemoryStorage::new(), KEY);
        store.append(running("1")).unwrap();
        store.append(cycling("2")).unwrap();

        let raw = store.storage().read(KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let ids: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn snapshot_round_trips_raw_fields() {
        let mut store = WorkoutStore::load_all(MemoryStorage::new(), KEY);
        store.append(running("1")).unwrap();
        store.append(cycling("2")).unwrap();
        let originals = store.workouts().to_vec();

        let reloaded = WorkoutStore::load_all(store.storage().clone(), KEY);
        assert_eq!(reloaded.len(), 2);
        for (before, after) in originals.iter().zip(reloaded.workouts()) {
            assert_eq!(before.id(), after.id());
            assert_eq!(before.coords(), after.coords());
            assert_eq!(before.distance(), after.distance());
            assert_eq!(before.duration(), after.duration());
            assert_eq!(before.kind(), after.kind());
            assert_eq!(before.description(), after.description());
        }
        assert!(matches!(
            reloaded.workouts()[0].activity(),
            Activity::Running { cadence: 150, .. }
        ));
        assert!(matches!(
            reloaded.workouts()[1].activity(),
            Activity::Cycling { elevation_gain, .. } if *elevation_gain == -12.0
        ));
    }

    #[test]
    fn invalid_records_are_skipped_not_fatal() {
        let raw = r#"[
            {"id":"1","createdAt":"2024-04-14T08:30:00Z","coords":[1.0,2.0],
             "distance":5,"duration":25,"kind":"running","description":"Running on April 14",
             "cadence":150,"pace":5},
            {"id":"2","createdAt":"2024-04-14T09:30:00Z","coords":[1.0,2.0],
             "distance":0,"duration":25,"kind":"running","description":"Running on April 14",
             "cadence":150}
        ]"#;
        let mut storage = MemoryStorage::new();
        storage.write(KEY, raw).unwrap();
        let store = WorkoutStore::load_all(storage, KEY);
        assert_eq!(store.len(), 1);
        assert_eq!(store.workouts()[0].id(), "1");
        assert_eq!(store.workouts()[0].kind(), Kind::Running);
    }

    #[test]
    fn newest_first_and_find() {
        let mut store = WorkoutStore::load_all(MemoryStorage::new(), KEY);
        store.append(running("1")).unwrap();
        store.append(cycling("2")).unwrap();
        let order: Vec<&str> = store.newest_first().map(Workout::id).collect();
        assert_eq!(order, ["2", "1"]);
        assert_eq!(store.find("1").map(Workout::kind), Some(Kind::Running));
        assert!(store.find("missing").is_none());
    }

    #[test]
    fn reset_clears_memory_and_snapshot() {
        let mut store = WorkoutStore::load_all(MemoryStorage::new(), KEY);
        store.append(running("1")).unwrap();
        store.reset().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.storage().read(KEY).unwrap(), None);
    }
}
