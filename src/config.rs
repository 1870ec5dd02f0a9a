//! Application-level configuration constants.

// Persistence
pub const STORAGE_KEY: &str = "workouts";

// Map
pub const MAP_ELEMENT_ID: &str = "map";
pub const MAP_ZOOM: u8 = 13;
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.fr/hot/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
pub const PAN_DURATION_SECS: f64 = 1.0;

// Popups
pub const POPUP_MAX_WIDTH: u32 = 250;
pub const POPUP_MIN_WIDTH: u32 = 100;

// UI Behavior
pub const FORM_RESTORE_MS: u32 = 1_000;
pub const INVALID_INPUT_ALERT: &str = "All fields should be positive numbers";
pub const GEOLOCATION_ALERT: &str = "could not get your location";

// Diagnostics
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Debug;
