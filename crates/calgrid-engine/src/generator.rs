//! Recurring-template expansion -- turns one template into the concrete
//! instances that fall inside a visible window.
//!
//! The series is walked from the template's own start. Occurrence `k` starts
//! at `advance(template.start, unit, k * interval)` and keeps the template's
//! duration. Walking stops at the first of:
//!
//! - an occurrence starting after `recurrence.end_date`,
//! - `recurrence.occurrences` occurrences generated,
//! - [`SAFETY_CAP`] occurrences generated,
//! - an occurrence starting after the window end.
//!
//! Occurrences that end before the window start still count toward the
//! series length; they are just not materialized.

use chrono::{Duration, NaiveDateTime};

use crate::error::{EngineError, Result};
use crate::model::{new_id, Event, RecurrenceKind};
use crate::range::{advance, TimeUnit};

/// Hard ceiling on occurrences generated for one template in one call.
pub const SAFETY_CAP: u32 = 100;

/// The window-independent occurrence stream of a template, as
/// `(start, end)` pairs in non-decreasing start order.
#[derive(Debug, Clone)]
pub struct Occurrences {
    origin: NaiveDateTime,
    duration: Duration,
    unit: TimeUnit,
    step: i64,
    end_date: Option<NaiveDateTime>,
    limit: u32,
    index: u32,
    done: bool,
}

impl Occurrences {
    pub fn of(template: &Event) -> Self {
        let rule = &template.recurrence;
        let unit = match rule.kind {
            RecurrenceKind::Weekly => TimeUnit::Week,
            RecurrenceKind::Monthly => TimeUnit::Month,
            // Custom cadences fall back to day stepping.
            RecurrenceKind::None | RecurrenceKind::Daily | RecurrenceKind::Custom => TimeUnit::Day,
        };
        let limit = if rule.is_recurring() {
            rule.occurrences.unwrap_or(SAFETY_CAP).min(SAFETY_CAP)
        } else {
            1
        };

        Self {
            origin: template.start,
            duration: template.duration(),
            unit,
            step: rule.effective_interval(),
            end_date: rule.end_date,
            limit,
            index: 0,
            done: false,
        }
    }

    /// Number of occurrences produced so far.
    pub fn generated(&self) -> u32 {
        self.index
    }
}

impl Iterator for Occurrences {
    type Item = (NaiveDateTime, NaiveDateTime);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.index >= self.limit {
            return None;
        }

        let next = i64::from(self.index)
            .checked_mul(self.step)
            .and_then(|offset| advance(self.origin, self.unit, offset))
            .and_then(|start| Some((start, start.checked_add_signed(self.duration)?)));

        match next {
            Some((start, _)) if self.end_date.is_some_and(|end_date| start > end_date) => {
                self.done = true;
                None
            }
            Some(pair) => {
                self.index += 1;
                Some(pair)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Expand a recurring template into the instances visible in
/// `[window_start, window_end]`.
///
/// Malformed templates (end before start) yield no instances and a warning;
/// use [`try_expand`] to observe the error instead. The caller is expected to
/// have filtered out soft-deleted templates.
pub fn expand(template: &Event, window_start: NaiveDateTime, window_end: NaiveDateTime) -> Vec<Event> {
    match try_expand(template, window_start, window_end) {
        Ok(instances) => instances,
        Err(err) => {
            tracing::warn!(template_id = %template.id, error = %err, "skipping template");
            Vec::new()
        }
    }
}

/// Like [`expand`], but reports malformed templates.
///
/// # Errors
/// Returns `EngineError::MalformedTemplate` if `template.end < template.start`.
pub fn try_expand(
    template: &Event,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> Result<Vec<Event>> {
    if !template.is_well_formed() {
        return Err(EngineError::MalformedTemplate {
            id: template.id.clone(),
            start: template.start,
            end: template.end,
        });
    }

    let instances: Vec<Event> = Occurrences::of(template)
        .take_while(|(start, _)| *start <= window_end)
        .filter(|(_, end)| *end >= window_start)
        .map(|(start, end)| instantiate(template, start, end))
        .collect();

    tracing::debug!(
        template_id = %template.id,
        instances = instances.len(),
        "expanded recurring template"
    );

    Ok(instances)
}

fn instantiate(template: &Event, start: NaiveDateTime, end: NaiveDateTime) -> Event {
    Event {
        id: new_id(),
        parent_id: Some(template.id.clone()),
        start,
        end,
        is_deleted: false,
        ..template.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecurrenceRule;
    use chrono::NaiveDate;

    fn dt(m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn open_series_stops_at_safety_cap() {
        let t = Event::new("t", dt(1, 1, 9), dt(1, 1, 10)).with_recurrence(RecurrenceRule::daily(1));
        assert_eq!(Occurrences::of(&t).count(), SAFETY_CAP as usize);
    }

    #[test]
    fn occurrences_larger_than_cap_is_capped() {
        let t = Event::new("t", dt(1, 1, 9), dt(1, 1, 10))
            .with_recurrence(RecurrenceRule::daily(1).times(500));
        assert_eq!(Occurrences::of(&t).count(), SAFETY_CAP as usize);
    }

    #[test]
    fn zero_occurrences_is_empty() {
        let t = Event::new("t", dt(1, 1, 9), dt(1, 1, 10))
            .with_recurrence(RecurrenceRule::weekly(1).times(0));
        assert_eq!(Occurrences::of(&t).count(), 0);
    }

    #[test]
    fn monthly_from_the_31st_does_not_drift() {
        let t = Event::new("t", dt(1, 31, 9), dt(1, 31, 10))
            .with_recurrence(RecurrenceRule::monthly(1).times(4));
        let starts: Vec<_> = Occurrences::of(&t).map(|(s, _)| s).collect();
        assert_eq!(starts, vec![dt(1, 31, 9), dt(2, 29, 9), dt(3, 31, 9), dt(4, 30, 9)]);
    }

    #[test]
    fn generated_counts_every_occurrence() {
        let t = Event::new("t", dt(1, 1, 9), dt(1, 1, 10))
            .with_recurrence(RecurrenceRule::daily(1).times(5));
        let mut occ = Occurrences::of(&t);
        occ.by_ref().for_each(drop);
        assert_eq!(occ.generated(), 5);
    }

    #[test]
    fn malformed_template_is_rejected() {
        let t = Event::new("bad", dt(1, 2, 9), dt(1, 1, 9)).with_recurrence(RecurrenceRule::daily(1));
        assert!(matches!(
            try_expand(&t, dt(1, 1, 0), dt(2, 1, 0)),
            Err(EngineError::MalformedTemplate { .. })
        ));
        assert!(expand(&t, dt(1, 1, 0), dt(2, 1, 0)).is_empty());
    }
}
