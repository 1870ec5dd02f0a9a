//! Keeps map markers in step with the workout list and handles the
//! list-to-map interaction.
//!
//! Rendering is additive only: the list is append-only, so the number of
//! markers already placed is all the bookkeeping needed.

use crate::config::{MAP_ZOOM, PAN_DURATION_SECS, POPUP_MAX_WIDTH, POPUP_MIN_WIDTH};
use crate::workout::{Coords, Workout};
use log::debug;
use serde::Serialize;

/// Popup options handed to the map library as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupStyle {
    pub auto_close: bool,
    pub close_on_click: bool,
    pub max_width: u32,
    pub min_width: u32,
    pub class_name: String,
}

/// A marker with an open popup at one workout's location.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coords: Coords,
    pub popup: PopupStyle,
    pub content: String,
}

impl Marker {
    pub fn for_workout(workout: &Workout) -> Self {
        Self {
            coords: workout.coords(),
            popup: PopupStyle {
                auto_close: false,
                close_on_click: false,
                max_width: POPUP_MAX_WIDTH,
                min_width: POPUP_MIN_WIDTH,
                class_name: format!("{}-popup", workout.kind()),
            },
            content: workout.popup_label(),
        }
    }
}

/// What the synchronizer needs from the map library.
pub trait MapSurface {
    /// Add `marker` and open its popup immediately.
    fn place_marker(&self, marker: &Marker);
    /// Animate the view to `coords`.
    fn fly_to(&self, coords: Coords, zoom: u8, duration_secs: f64);
}

#[derive(Debug, Default, Clone)]
pub struct ViewSync {
    placed: usize,
    clicks: u32,
}

impl ViewSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a marker for every workout that does not have one yet.
    /// Returns how many were added.
    pub fn place_markers<M: MapSurface + ?Sized>(
        &mut self,
        workouts: &[Workout],
        map: &M,
    ) -> usize {
        let fresh = workouts.get(self.placed..).unwrap_or(&[]);
        for workout in fresh {
            map.place_marker(&Marker::for_workout(workout));
        }
        self.placed += fresh.len();
        fresh.len()
    }

    pub fn markers_placed(&self) -> usize {
        self.placed
    }

    /// Recenter on the workout whose id matches a clicked list item.
    /// Unknown ids are ignored. Returns whether the map moved.
    pub fn move_to<M: MapSurface + ?Sized>(
        &mut self,
        workouts: &[Workout],
        id: &str,
        map: &M,
    ) -> bool {
        let Some(workout) = workouts.iter().find(|w| w.id() == id) else {
            debug!("No workout with id {}", id);
            return false;
        };
        map.fly_to(workout.coords(), MAP_ZOOM, PAN_DURATION_SECS);
        self.clicks += 1;
        debug!("Moved to workout {} ({} moves)", id, self.clicks);
        true
    }

    /// Successful move-to-entry clicks so far.
    pub fn clicks(&self) -> u32 {
        self.clicks
    }
}
