//! Workout entries: the two activity kinds, their derived metrics, and the
//! plain record shape they take in a persisted snapshot.

use chrono::{DateTime, Local};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `[latitude, longitude]` pair. Serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords(pub f64, pub f64);

impl Coords {
    pub fn lat(&self) -> f64 {
        self.0
    }

    pub fn lng(&self) -> f64 {
        self.1
    }
}

/// Discriminator between the two activity variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    #[default]
    Running,
    Cycling,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Running => "running",
            Kind::Cycling => "cycling",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Kind::Running => "Running",
            Kind::Cycling => "Cycling",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Kind::Running => "🏃‍♂️",
            Kind::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "running" => Ok(Kind::Running),
            "cycling" => Ok(Kind::Cycling),
            other => Err(format!("Unknown activity kind '{}'", other)),
        }
    }
}

/// Kind-specific payload, including the metric derived at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activity {
    /// `pace` is min/km.
    Running { cadence: u32, pace: f64 },
    /// `speed` is km/h. Elevation may be zero or negative.
    Cycling { elevation_gain: f64, speed: f64 },
}

impl Activity {
    pub fn running(distance: f64, duration: f64, cadence: u32) -> Self {
        Activity::Running {
            cadence,
            pace: duration / distance,
        }
    }

    pub fn cycling(distance: f64, duration: f64, elevation_gain: f64) -> Self {
        Activity::Cycling {
            elevation_gain,
            speed: distance / (duration / 60.0),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Activity::Running { .. } => Kind::Running,
            Activity::Cycling { .. } => Kind::Cycling,
        }
    }
}

/// Human-readable title, e.g. "Running on April 14".
pub fn describe(kind: Kind, created_at: &DateTime<Local>) -> String {
    format!("{} on {}", kind.label(), created_at.format("%B %-d"))
}

/// One logged activity. Every field is fixed once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: String,
    created_at: DateTime<Local>,
    coords: Coords,
    distance: f64,
    duration: f64,
    description: String,
    activity: Activity,
}

impl Workout {
    /// Builds an entry from already validated inputs. No validation happens here.
    pub fn new(
        id: String,
        created_at: DateTime<Local>,
        coords: Coords,
        distance: f64,
        duration: f64,
        activity: Activity,
    ) -> Self {
        let description = describe(activity.kind(), &created_at);
        Self {
            id,
            created_at,
            coords,
            distance,
            duration,
            description,
            activity,
        }
    }

    pub fn running(
        id: String,
        created_at: DateTime<Local>,
        coords: Coords,
        distance: f64,
        duration: f64,
        cadence: u32,
    ) -> Self {
        let activity = Activity::running(distance, duration, cadence);
        Self::new(id, created_at, coords, distance, duration, activity)
    }

    pub fn cycling(
        id: String,
        created_at: DateTime<Local>,
        coords: Coords,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    ) -> Self {
        let activity = Activity::cycling(distance, duration, elevation_gain);
        Self::new(id, created_at, coords, distance, duration, activity)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> &DateTime<Local> {
        &self.created_at
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn kind(&self) -> Kind {
        self.activity.kind()
    }

    /// Modifier class of the list item, e.g. `workout--running`.
    pub fn list_class(&self) -> String {
        format!("workout--{}", self.kind())
    }

    /// Rows shown under the list item title: distance, duration, then the
    /// derived metric and the kind-specific one. Pace and speed are rounded
    /// to one decimal.
    pub fn detail_rows(&self) -> Vec<DetailRow> {
        let mut rows = vec![
            DetailRow::new(self.kind().icon(), self.distance.to_string(), "km"),
            DetailRow::new("⏱", self.duration.to_string(), "min"),
        ];
        match self.activity {
            Activity::Running { cadence, pace } => {
                rows.push(DetailRow::new("⚡️", format!("{:.1}", pace), "min/km"));
                rows.push(DetailRow::new("🦶🏼", cadence.to_string(), "spm"));
            }
            Activity::Cycling {
                elevation_gain,
                speed,
            } => {
                rows.push(DetailRow::new("⚡️", format!("{:.1}", speed), "km/h"));
                rows.push(DetailRow::new("⛰", elevation_gain.to_string(), "m"));
            }
        }
        rows
    }

    /// Popup text shown on the map marker.
    pub fn popup_label(&self) -> String {
        format!("{} {}", self.kind().icon(), self.description)
    }

    /// Flatten into the persisted record shape.
    pub fn to_record(&self) -> WorkoutRecord {
        let mut record = WorkoutRecord {
            id: self.id.clone(),
            created_at: self.created_at,
            coords: self.coords,
            distance: self.distance,
            duration: self.duration,
            kind: self.kind(),
            description: self.description.clone(),
            cadence: None,
            pace: None,
            elevation_gain: None,
            speed: None,
        };
        match self.activity {
            Activity::Running { cadence, pace } => {
                record.cadence = Some(f64::from(cadence));
                record.pace = Some(pace);
            }
            Activity::Cycling {
                elevation_gain,
                speed,
            } => {
                record.elevation_gain = Some(elevation_gain);
                record.speed = Some(speed);
            }
        }
        record
    }

    /// Rebuild an entry from a persisted record.
    ///
    /// Pace and speed are recomputed from the raw fields; stored derived
    /// values are ignored. The stored description is kept since it was fixed
    /// at construction, and only regenerated when the record has none.
    pub fn from_record(record: WorkoutRecord) -> Result<Self, RecordError> {
        if !is_positive(record.distance) {
            return Err(RecordError::InvalidField("distance"));
        }
        if !is_positive(record.duration) {
            return Err(RecordError::InvalidField("duration"));
        }
        if !record.coords.lat().is_finite() || !record.coords.lng().is_finite() {
            return Err(RecordError::InvalidField("coords"));
        }

        let activity = match record.kind {
            Kind::Running => {
                let cadence = record.cadence.ok_or(RecordError::MissingField("cadence"))?;
                if !is_positive(cadence) || cadence.fract() != 0.0 || cadence > f64::from(u32::MAX)
                {
                    return Err(RecordError::InvalidField("cadence"));
                }
                Activity::running(record.distance, record.duration, cadence as u32)
            }
            Kind::Cycling => {
                let elevation = record
                    .elevation_gain
                    .ok_or(RecordError::MissingField("elevationGain"))?;
                if !elevation.is_finite() {
                    return Err(RecordError::InvalidField("elevationGain"));
                }
                Activity::cycling(record.distance, record.duration, elevation)
            }
        };

        let description = if record.description.trim().is_empty() {
            describe(record.kind, &record.created_at)
        } else {
            record.description
        };

        Ok(Self {
            id: record.id,
            created_at: record.created_at,
            coords: record.coords,
            distance: record.distance,
            duration: record.duration,
            description,
            activity,
        })
    }
}

/// One `icon value unit` line of a list item.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl DetailRow {
    fn new(icon: &'static str, value: String, unit: &'static str) -> Self {
        Self { icon, value, unit }
    }
}

#[inline]
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Plain persisted form of a [`Workout`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRecord {
    pub id: String,
    pub created_at: DateTime<Local>,
    pub coords: Coords,
    pub distance: f64,
    pub duration: f64,
    pub kind: Kind,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

/// Why a persisted record could not be turned back into a [`Workout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    MissingField(&'static str),
    InvalidField(&'static str),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::MissingField(name) => write!(f, "Record is missing '{}'", name),
            RecordError::InvalidField(name) => write!(f, "Record has an invalid '{}'", name),
        }
    }
}

impl std::error::Error for RecordError {}

/// Hands out time-derived ids that never repeat within one store.
///
/// The id is the creation time in milliseconds, bumped past the last id
/// issued whenever two entries land on the same (or an earlier) millisecond.
/// Once the counter reaches `i64::MAX` it restarts from the clock.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// Start above every numeric id in `ids`. Non-numeric ids are ignored.
    pub fn seeded<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let last = ids
            .into_iter()
            .filter_map(|id| id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Self { last }
    }

    pub fn next_id(&mut self, created_at: &DateTime<Local>) -> String {
        let now = created_at.timestamp_millis();
        let id = match self.last.checked_add(1) {
            Some(floor) => now.max(floor),
            None => {
                warn!("Id counter exhausted, restarting from the clock");
                now
            }
        };
        self.last = id;
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(month: u32, day: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn running_derives_pace_and_description() {
        let w = Workout::running("1".into(), at(4, 14), Coords(40.0, -75.0), 5.0, 25.0, 150);
        assert_eq!(w.kind(), Kind::Running);
        assert_eq!(w.description(), "Running on April 14");
        match w.activity() {
            Activity::Running { cadence, pace } => {
                assert_eq!(*cadence, 150);
                assert!((pace - 5.0).abs() < 1e-12);
            }
            other => panic!("unexpected activity {:?}", other),
        }
    }

    #[test]
    fn cycling_derives_speed_with_any_elevation() {
        for elevation in [-30.0, 0.0, 420.0] {
            let w = Workout::cycling("2".into(), at(1, 3), Coords(1.0, 2.0), 27.0, 95.0, elevation);
            assert_eq!(w.description(), "Cycling on January 3");
            match w.activity() {
                Activity::Cycling {
                    elevation_gain,
                    speed,
                } => {
                    assert_eq!(*elevation_gain, elevation);
                    assert!((speed - 27.0 / (95.0 / 60.0)).abs() < 1e-12);
                }
                other => panic!("unexpected activity {:?}", other),
            }
        }
    }

    fn row(icon: &'static str, value: &str, unit: &'static str) -> DetailRow {
        DetailRow::new(icon, value.to_string(), unit)
    }

    #[test]
    fn running_rows_round_pace_to_one_decimal() {
        let w = Workout::running("11".into(), at(4, 14), Coords(0.0, 0.0), 6.0, 25.0, 178);
        assert_eq!(w.list_class(), "workout--running");
        assert_eq!(
            w.detail_rows(),
            vec![
                row("🏃‍♂️", "6", "km"),
                row("⏱", "25", "min"),
                row("⚡️", "4.2", "min/km"),
                row("🦶🏼", "178", "spm"),
            ]
        );
    }

    #[test]
    fn cycling_rows_round_speed_to_one_decimal() {
        let w = Workout::cycling("12".into(), at(4, 14), Coords(0.0, 0.0), 20.0, 70.0, 223.0);
        assert_eq!(w.list_class(), "workout--cycling");
        assert_eq!(
            w.detail_rows(),
            vec![
                row("🚴‍♀️", "20", "km"),
                row("⏱", "70", "min"),
                row("⚡️", "17.1", "km/h"),
                row("⛰", "223", "m"),
            ]
        );
    }

    #[test]
    fn record_uses_camel_case_and_kind_specific_fields() {
        let w = Workout::cycling("7".into(), at(6, 1), Coords(10.5, 20.25), 12.0, 30.0, 80.0);
        let json = serde_json::to_value(w.to_record()).unwrap();
        assert_eq!(json["kind"], "cycling");
        assert_eq!(json["coords"], serde_json::json!([10.5, 20.25]));
        assert_eq!(json["elevationGain"], 80.0);
        assert_eq!(json["speed"], 24.0);
        assert!(json.get("cadence").is_none());
        assert!(json.get("pace").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn from_record_recomputes_derived_metrics() {
        let w = Workout::running("9".into(), at(2, 9), Coords(0.0, 0.0), 4.0, 30.0, 170);
        let mut record = w.to_record();
        record.pace = Some(999.0);
        let rebuilt = Workout::from_record(record).unwrap();
        assert_eq!(rebuilt, w);
    }

    #[test]
    fn from_record_rejects_broken_records() {
        let w = Workout::running("9".into(), at(2, 9), Coords(0.0, 0.0), 4.0, 30.0, 170);

        let mut missing = w.to_record();
        missing.cadence = None;
        assert_eq!(
            Workout::from_record(missing),
            Err(RecordError::MissingField("cadence"))
        );

        let mut negative = w.to_record();
        negative.distance = -1.0;
        assert_eq!(
            Workout::from_record(negative),
            Err(RecordError::InvalidField("distance"))
        );

        let mut fractional = w.to_record();
        fractional.cadence = Some(150.5);
        assert_eq!(
            Workout::from_record(fractional),
            Err(RecordError::InvalidField("cadence"))
        );
    }

    #[test]
    fn from_record_fills_missing_description() {
        let w = Workout::cycling("3".into(), at(12, 25), Coords(0.0, 0.0), 10.0, 60.0, 0.0);
        let mut record = w.to_record();
        record.description = String::new();
        let rebuilt = Workout::from_record(record).unwrap();
        assert_eq!(rebuilt.description(), "Cycling on December 25");
    }

    #[test]
    fn ids_are_unique_within_one_millisecond() {
        let now = at(5, 5);
        let mut ids = IdGenerator::default();
        let a = ids.next_id(&now);
        let b = ids.next_id(&now);
        assert_eq!(a, now.timestamp_millis().to_string());
        assert_ne!(a, b);
        assert!(b.parse::<i64>().unwrap() > a.parse::<i64>().unwrap());
    }

    #[test]
    fn seeded_ids_stay_above_existing_ones() {
        let now = at(5, 5);
        let future = (now.timestamp_millis() + 10_000).to_string();
        let mut ids = IdGenerator::seeded([future.as_str(), "not-a-number"]);
        let next = ids.next_id(&now).parse::<i64>().unwrap();
        assert_eq!(next, now.timestamp_millis() + 10_001);
    }

    #[test]
    fn seeding_with_largest_id_does_not_overflow() {
        let now = at(5, 5);
        let max = i64::MAX.to_string();
        let mut ids = IdGenerator::seeded([max.as_str()]);
        let first = ids.next_id(&now);
        let second = ids.next_id(&now);
        assert_eq!(first, now.timestamp_millis().to_string());
        assert_eq!(second, (now.timestamp_millis() + 1).to_string());
        assert_ne!(first, max);
    }

    #[test]
    fn kind_parses_from_select_values() {
        assert_eq!("running".parse::<Kind>(), Ok(Kind::Running));
        assert_eq!("cycling".parse::<Kind>(), Ok(Kind::Cycling));
        assert!("swimming".parse::<Kind>().is_err());
    }
}
