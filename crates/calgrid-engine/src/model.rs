//! Event templates, recurrence rules and reminders.
//!
//! Templates and the instances generated from them share one shape: an
//! [`Event`] with `parent_id == None` is a persisted template, one with
//! `parent_id == Some(template_id)` is an ephemeral instance.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::EventColor;

/// Length of a freshly drafted event.
pub const DEFAULT_DRAFT_MINUTES: i64 = 60;

/// Lead time of a freshly added reminder.
pub const DEFAULT_REMINDER_MINUTES: u32 = 30;

/// A reminder attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    /// Minutes before the event start at which the reminder fires.
    #[serde(alias = "time")]
    pub minutes_before: u32,
}

impl Reminder {
    pub fn new(minutes_before: u32) -> Self {
        Self {
            id: new_id(),
            minutes_before,
        }
    }
}

impl Default for Reminder {
    fn default() -> Self {
        Self::new(DEFAULT_REMINDER_MINUTES)
    }
}

/// Cadence of a recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    /// Steps by days, like `Daily`. `days_of_week` and `day_of_month` are
    /// carried but not yet interpreted.
    Custom,
}

fn default_interval() -> i64 {
    1
}

/// How, and for how long, a template repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    /// Step between occurrences in units of the cadence. Values below 1 are
    /// treated as 1, see [`RecurrenceRule::effective_interval`].
    #[serde(default = "default_interval")]
    pub interval: i64,
    /// Inclusive upper bound on occurrence start times.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::timestamp::deserialize_option"
    )]
    pub end_date: Option<NaiveDateTime>,
    /// Total number of occurrences in the whole series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
    /// 0 = Sunday .. 6 = Saturday.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,
}

impl RecurrenceRule {
    pub fn none() -> Self {
        Self::every(RecurrenceKind::None, 1)
    }

    pub fn every(kind: RecurrenceKind, interval: i64) -> Self {
        Self {
            kind,
            interval,
            end_date: None,
            occurrences: None,
            days_of_week: Vec::new(),
            day_of_month: None,
        }
    }

    pub fn daily(interval: i64) -> Self {
        Self::every(RecurrenceKind::Daily, interval)
    }

    pub fn weekly(interval: i64) -> Self {
        Self::every(RecurrenceKind::Weekly, interval)
    }

    pub fn monthly(interval: i64) -> Self {
        Self::every(RecurrenceKind::Monthly, interval)
    }

    pub fn until(mut self, end_date: NaiveDateTime) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn times(mut self, occurrences: u32) -> Self {
        self.occurrences = Some(occurrences);
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.kind != RecurrenceKind::None
    }

    pub fn effective_interval(&self) -> i64 {
        self.interval.max(1)
    }
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self::none()
    }
}

/// A calendar event: either a persisted template or a generated instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub start: NaiveDateTime,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub end: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub color: EventColor,
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    #[serde(default)]
    pub recurrence: RecurrenceRule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Event {
    /// A non-recurring template with a fresh id.
    pub fn new(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: String::new(),
            start,
            end,
            location: None,
            color: EventColor::default(),
            reminders: Vec::new(),
            recurrence: RecurrenceRule::none(),
            parent_id: None,
            is_deleted: false,
        }
    }

    /// The template offered when an empty grid cell is selected. The draft is
    /// shortened if an hour would run past the latest representable instant.
    pub fn draft_at(start: NaiveDateTime) -> Self {
        let end = start
            .checked_add_signed(Duration::minutes(DEFAULT_DRAFT_MINUTES))
            .unwrap_or(NaiveDateTime::MAX);
        Self::new("", start, end)
    }

    pub fn with_recurrence(mut self, recurrence: RecurrenceRule) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_recurring()
    }

    /// True for generated occurrences (and stray ones found in storage).
    pub fn is_instance(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn is_well_formed(&self) -> bool {
        self.end >= self.start
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn interval_below_one_is_coerced() {
        assert_eq!(RecurrenceRule::daily(0).effective_interval(), 1);
        assert_eq!(RecurrenceRule::daily(-3).effective_interval(), 1);
        assert_eq!(RecurrenceRule::daily(2).effective_interval(), 2);
    }

    #[test]
    fn draft_lasts_one_hour() {
        let draft = Event::draft_at(at(5, 9));
        assert_eq!(draft.duration(), Duration::hours(1));
        assert!(!draft.is_recurring());
        assert!(!draft.is_instance());
    }

    #[test]
    fn draft_at_calendar_end_stays_well_formed() {
        let draft = Event::draft_at(NaiveDateTime::MAX);
        assert_eq!(draft.end, NaiveDateTime::MAX);
        assert!(draft.is_well_formed());
    }

    #[test]
    fn legacy_json_is_accepted() {
        let json = r#"{
            "id": "e1",
            "title": "Standup",
            "description": "",
            "start": "2024-01-01T09:00:00.000Z",
            "end": "2024-01-01T09:15:00.000Z",
            "color": "green",
            "reminders": [{"id": "r1", "time": 10}],
            "recurrence": {"type": "weekly", "interval": 1, "endDate": null, "occurrences": null}
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.start, at(1, 9));
        assert_eq!(event.duration(), Duration::minutes(15));
        assert_eq!(event.reminders[0].minutes_before, 10);
        assert_eq!(event.recurrence.kind, RecurrenceKind::Weekly);
        assert_eq!(event.recurrence.end_date, None);
        assert!(!event.is_deleted);
        assert_eq!(event.location, None);
    }

    #[test]
    fn legacy_end_date_keeps_wall_time() {
        let json = r#"{"type": "daily", "interval": 2, "endDate": "2024-01-05T09:00:00.000Z"}"#;
        let rule: RecurrenceRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.end_date, Some(at(5, 9)));

        let back = serde_json::to_string(&rule).unwrap();
        assert!(back.contains(r#""endDate":"2024-01-05T09:00:00""#));
    }

    #[test]
    fn bad_timestamp_is_a_json_error() {
        let json = r#"{"id": "e", "title": "x", "start": "soon", "end": "2024-01-01T09:00:00"}"#;
        let err = serde_json::from_str::<Event>(json).unwrap_err();
        assert!(err.to_string().contains("Invalid timestamp 'soon'"));
    }

    #[test]
    fn empty_location_survives_roundtrip() {
        let mut event = Event::new("x", at(1, 9), at(1, 10));
        event.location = Some(String::new());
        let back: Event = serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(back.location, Some(String::new()));

        event.location = None;
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("location"));
    }

    #[test]
    fn subsecond_timestamps_roundtrip_exactly() {
        let start = at(1, 9) + Duration::nanoseconds(123_456_789);
        let event = Event::new("x", start, start);
        let back: Event = serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(back.start, start);
    }
}
