//! Input form state: which location it is bound to, what the user typed,
//! and turning a submission into a validated new workout.

use crate::config::INVALID_INPUT_ALERT;
use crate::workout::{Activity, Coords, Kind, Workout};
use chrono::{DateTime, Local};
use log::debug;
use std::fmt;

/// The editable numeric inputs of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Distance => "Distance",
            Field::Duration => "Duration",
            Field::Cadence => "Cadence",
            Field::Elevation => "Elevation gain",
        }
    }

    /// The kind-specific field shown for `kind`.
    pub fn metric_for(kind: Kind) -> Field {
        match kind {
            Kind::Running => Field::Cadence,
            Kind::Cycling => Field::Elevation,
        }
    }
}

/// Raw text of every input, kept as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
}

impl FormFields {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Distance => &self.distance,
            Field::Duration => &self.duration,
            Field::Cadence => &self.cadence,
            Field::Elevation => &self.elevation,
        }
    }

    pub fn set(&mut self, field: Field, text: String) {
        match field {
            Field::Distance => self.distance = text,
            Field::Duration => self.duration = text,
            Field::Cadence => self.cadence = text,
            Field::Elevation => self.elevation = text,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Whether the form is waiting for input, and for which map location.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FormState {
    #[default]
    Idle,
    AwaitingInput { pending: Coords },
}

/// Kind-specific value of a validated submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Cadence(u32),
    Elevation(f64),
}

/// A submission that passed validation, ready to become a [`Workout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewWorkout {
    pub coords: Coords,
    pub distance: f64,
    pub duration: f64,
    pub metric: Metric,
}

impl NewWorkout {
    pub fn build(self, id: String, created_at: DateTime<Local>) -> Workout {
        let activity = match self.metric {
            Metric::Cadence(cadence) => Activity::running(self.distance, self.duration, cadence),
            Metric::Elevation(gain) => Activity::cycling(self.distance, self.duration, gain),
        };
        Workout::new(
            id,
            created_at,
            self.coords,
            self.distance,
            self.duration,
            activity,
        )
    }
}

/// Why a submission was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    /// Submitted without a map click to bind the entry to.
    NoPendingLocation,
    InvalidInput { field: Field, reason: String },
}

impl FormError {
    /// Text for the blocking alert shown to the user.
    pub fn alert_message(&self) -> &'static str {
        match self {
            FormError::NoPendingLocation => "Click on the map to choose a location first",
            FormError::InvalidInput { .. } => INVALID_INPUT_ALERT,
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::NoPendingLocation => write!(f, "No pending map location"),
            FormError::InvalidInput { field, reason } => {
                write!(f, "{} {}", field.label(), reason)
            }
        }
    }
}

impl std::error::Error for FormError {}

/// Parse a field that must be a finite, strictly positive number.
pub fn validate_positive(input: &str, field: Field) -> Result<f64, FormError> {
    let invalid = |reason: &str| FormError::InvalidInput {
        field,
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid("cannot be empty"));
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|_| invalid("must be a valid number"))?;
    if !value.is_finite() {
        return Err(invalid("must be a finite number"));
    }
    if value <= 0.0 {
        return Err(invalid("must be positive"));
    }
    Ok(value)
}

/// Cadence is a positive whole number of steps per minute.
pub fn validate_cadence(input: &str) -> Result<u32, FormError> {
    let value = validate_positive(input, Field::Cadence)?;
    if value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(FormError::InvalidInput {
            field: Field::Cadence,
            reason: "must be a whole number".to_string(),
        });
    }
    Ok(value as u32)
}

/// Visibility, fields and pending location of the workout form.
#[derive(Debug, Clone, Default)]
pub struct FormController {
    state: FormState,
    kind: Kind,
    fields: FormFields,
    display_suppressed: bool,
    reveals: u64,
    hides: u64,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, FormState::AwaitingInput { .. })
    }

    pub fn pending(&self) -> Option<Coords> {
        match self.state {
            FormState::AwaitingInput { pending } => Some(pending),
            FormState::Idle => None,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    /// The kind-specific field currently on display.
    pub fn metric_field(&self) -> Field {
        Field::metric_for(self.kind)
    }

    /// True between a hide and the end of its animation delay.
    pub fn display_suppressed(&self) -> bool {
        self.display_suppressed
    }

    /// Bumped on every hide; [`FormController::settle`] takes the value
    /// current when its delay started.
    pub fn hides(&self) -> u64 {
        self.hides
    }

    /// Bumped on every reveal so the view knows to focus the distance input.
    pub fn reveals(&self) -> u64 {
        self.reveals
    }

    /// Bind the form to `coords` and show it. A later click replaces the
    /// pending location without touching the typed values.
    pub fn show(&mut self, coords: Coords) {
        if let FormState::AwaitingInput { pending } = self.state {
            debug!(
                "Replacing pending location ({}, {}) with ({}, {})",
                pending.lat(),
                pending.lng(),
                coords.lat(),
                coords.lng()
            );
        }
        self.state = FormState::AwaitingInput { pending: coords };
        self.reveals += 1;
    }

    /// Switch the kind-specific field. Entered values are kept.
    pub fn set_kind(&mut self, kind: Kind) {
        self.kind = kind;
    }

    pub fn edit(&mut self, field: Field, text: String) {
        self.fields.set(field, text);
    }

    /// Validate the current input. The form state is left untouched; on
    /// failure the form stays open with everything the user typed.
    pub fn submit(&self) -> Result<NewWorkout, FormError> {
        let coords = self.pending().ok_or(FormError::NoPendingLocation)?;
        let distance = validate_positive(&self.fields.distance, Field::Distance)?;
        let duration = validate_positive(&self.fields.duration, Field::Duration)?;
        let metric = match self.kind {
            Kind::Running => Metric::Cadence(validate_cadence(&self.fields.cadence)?),
            Kind::Cycling => Metric::Elevation(validate_positive(
                &self.fields.elevation,
                Field::Elevation,
            )?),
        };

        Ok(NewWorkout {
            coords,
            distance,
            duration,
            metric,
        })
    }

    /// Clear every input, drop the pending location and hide without the
    /// transition. [`FormController::settle`] restores normal display.
    pub fn hide(&mut self) {
        self.fields.clear();
        self.state = FormState::Idle;
        self.display_suppressed = true;
        self.hides += 1;
    }

    /// End the suppression started by hide number `hide`. Stale delays from
    /// an earlier hide are ignored.
    pub fn settle(&mut self, hide: u64) {
        if hide == self.hides {
            self.display_suppressed = false;
        } else {
            debug!("Ignoring settle for hide {} (latest {})", hide, self.hides);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(kind: Kind, distance: &str, duration: &str, metric: &str) -> FormController {
        let mut form = FormController::new();
        form.show(Coords(40.0, -75.0));
        form.set_kind(kind);
        form.edit(Field::Distance, distance.into());
        form.edit(Field::Duration, duration.into());
        form.edit(Field::metric_for(kind), metric.into());
        form
    }

    #[test]
    fn starts_idle_and_hidden() {
        let form = FormController::new();
        assert_eq!(form.state(), FormState::Idle);
        assert!(!form.is_visible());
        assert_eq!(form.kind(), Kind::Running);
        assert_eq!(form.metric_field(), Field::Cadence);
    }

    #[test]
    fn map_click_binds_location_and_requests_focus() {
        let mut form = FormController::new();
        form.show(Coords(1.0, 2.0));
        assert!(form.is_visible());
        assert_eq!(form.pending(), Some(Coords(1.0, 2.0)));
        assert_eq!(form.reveals(), 1);
    }

    #[test]
    fn second_click_replaces_pending_and_keeps_input() {
        let mut form = filled(Kind::Running, "5", "25", "150");
        form.show(Coords(3.0, 4.0));
        assert_eq!(form.pending(), Some(Coords(3.0, 4.0)));
        assert_eq!(form.fields().distance, "5");
        assert_eq!(form.reveals(), 2);
    }

    #[test]
    fn kind_change_toggles_metric_field_only() {
        let mut form = filled(Kind::Running, "5", "25", "150");
        form.set_kind(Kind::Cycling);
        assert_eq!(form.metric_field(), Field::Elevation);
        assert_eq!(form.fields().cadence, "150");
        assert_eq!(form.fields().distance, "5");
    }

    #[test]
    fn valid_running_submission() {
        let form = filled(Kind::Running, "5", "25", "150");
        let new = form.submit().unwrap();
        assert_eq!(new.coords, Coords(40.0, -75.0));
        assert_eq!(new.metric, Metric::Cadence(150));
    }

    #[test]
    fn valid_cycling_submission_ignores_cadence() {
        let mut form = filled(Kind::Cycling, "27", "95", "523");
        form.edit(Field::Cadence, "garbage".into());
        let new = form.submit().unwrap();
        assert_eq!(new.metric, Metric::Elevation(523.0));
    }

    #[test]
    fn rejects_zero_negative_and_non_numeric() {
        let bad = [
            (Kind::Running, "0", "25", "150", Field::Distance),
            (Kind::Running, "5", "-1", "150", Field::Duration),
            (Kind::Running, "5", "25", "abc", Field::Cadence),
            (Kind::Running, "5", "25", "", Field::Cadence),
            (Kind::Running, "5", "25", "150.5", Field::Cadence),
            (Kind::Cycling, "5", "25", "0", Field::Elevation),
            (Kind::Cycling, "5", "25", "-10", Field::Elevation),
            (Kind::Cycling, "inf", "25", "10", Field::Distance),
            (Kind::Cycling, "NaN", "25", "10", Field::Distance),
        ];
        for (kind, distance, duration, metric, field) in bad {
            let form = filled(kind, distance, duration, metric);
            match form.submit() {
                Err(FormError::InvalidInput { field: got, .. }) => assert_eq!(got, field),
                other => panic!("{:?} {} {} {}: got {:?}", kind, distance, duration, metric, other),
            }
            assert!(form.is_visible());
        }
    }

    #[test]
    fn rejected_submission_keeps_input() {
        let form = filled(Kind::Running, "5", "0", "150");
        let err = form.submit().unwrap_err();
        assert_eq!(err.alert_message(), INVALID_INPUT_ALERT);
        assert_eq!(form.fields().distance, "5");
        assert_eq!(form.fields().duration, "0");
    }

    #[test]
    fn submit_without_location_is_rejected() {
        let mut form = FormController::new();
        form.edit(Field::Distance, "5".into());
        assert_eq!(form.submit(), Err(FormError::NoPendingLocation));
    }

    #[test]
    fn hide_clears_and_suppresses_until_settled() {
        let mut form = filled(Kind::Cycling, "5", "25", "10");
        form.hide();
        assert_eq!(form.state(), FormState::Idle);
        assert_eq!(form.fields(), &FormFields::default());
        assert_eq!(form.kind(), Kind::Cycling);
        assert!(form.display_suppressed());
        let latest = form.hides();
        form.settle(latest);
        assert!(!form.display_suppressed());
    }

    #[test]
    fn only_latest_hide_settles() {
        let mut form = filled(Kind::Running, "5", "25", "150");
        form.hide();
        let first = form.hides();
        form.show(Coords(1.0, 1.0));
        form.hide();
        form.settle(first);
        assert!(form.display_suppressed());
        let latest = form.hides();
        form.settle(latest);
        assert!(!form.display_suppressed());
    }

    #[test]
    fn build_computes_derived_metric() {
        use chrono::TimeZone;
        let at = Local.with_ymd_and_hms(2024, 4, 14, 12, 0, 0).unwrap();
        let workout = filled(Kind::Running, "5", "25", "150")
            .submit()
            .unwrap()
            .build("42".into(), at);
        assert_eq!(workout.id(), "42");
        assert!(matches!(workout.activity(), Activity::Running { pace, .. } if (*pace - 5.0).abs() < 1e-12));
    }
}
