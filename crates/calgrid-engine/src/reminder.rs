//! Reminder polling over the assembled view.
//!
//! A host calls [`due_reminders`] on a fixed cadence with the latest visible
//! events. A reminder is due when its fire time falls in the look-ahead
//! window `(now, now + poll_interval]`. Repeated polls may report the same
//! reminder again; deduplication is left to the caller.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::model::Event;

/// Reference polling cadence, in seconds.
pub const DEFAULT_POLL_SECONDS: i64 = 60;

pub fn default_poll_interval() -> Duration {
    Duration::seconds(DEFAULT_POLL_SECONDS)
}

/// A reminder whose fire time has come up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueReminder {
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub reminder_id: String,
    pub title: String,
    pub starts_at: NaiveDateTime,
    pub fires_at: NaiveDateTime,
    pub minutes_before: u32,
}

impl DueReminder {
    pub fn message(&self) -> String {
        format!(
            "Reminder: {} starts in {} minutes",
            self.title, self.minutes_before
        )
    }
}

/// Reminders among `events` that fire within the next `poll_interval`.
///
/// The look-ahead stops at the latest representable instant, and a reminder
/// whose fire time would precede the earliest one never fires.
pub fn due_reminders(events: &[Event], now: NaiveDateTime, poll_interval: Duration) -> Vec<DueReminder> {
    let horizon = now
        .checked_add_signed(poll_interval)
        .unwrap_or(NaiveDateTime::MAX);

    events
        .iter()
        .flat_map(|event| {
            event.reminders.iter().filter_map(move |reminder| {
                let fires_at = event
                    .start
                    .checked_sub_signed(Duration::minutes(i64::from(reminder.minutes_before)))?;
                (now < fires_at && fires_at <= horizon).then(|| DueReminder {
                    event_id: event.id.clone(),
                    parent_id: event.parent_id.clone(),
                    reminder_id: reminder.id.clone(),
                    title: event.title.clone(),
                    starts_at: event.start,
                    fires_at,
                    minutes_before: reminder.minutes_before,
                })
            })
        })
        .collect()
}
