//! Date-interval helpers: containment, overlap, calendar arithmetic and the
//! visible month window.
//!
//! All intervals here are closed: both endpoints belong to the interval.
//!
//! Month arithmetic clamps to the last valid day of the target month, so
//! advancing Jan 31 by one month yields Feb 29 (leap year) or Feb 28.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Calendar unit used by [`advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Day,
    Week,
    Month,
}

/// Inclusive containment test.
pub fn is_within(point: NaiveDateTime, range_start: NaiveDateTime, range_end: NaiveDateTime) -> bool {
    range_start <= point && point <= range_end
}

/// True if the closed intervals `[a_start, a_end]` and `[b_start, b_end]`
/// share at least one instant. Touching endpoints count as overlap.
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Shift `date` by `n` units. Returns `None` if the result falls outside the
/// representable range.
pub fn advance(date: NaiveDateTime, unit: TimeUnit, n: i64) -> Option<NaiveDateTime> {
    match unit {
        TimeUnit::Day => date.checked_add_signed(Duration::try_days(n)?),
        TimeUnit::Week => date.checked_add_signed(Duration::try_weeks(n)?),
        TimeUnit::Month => {
            let months = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
            if n >= 0 {
                date.checked_add_months(months)
            } else {
                date.checked_sub_months(months)
            }
        }
    }
}

/// A closed range of instants, typically the visible grid of one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, point: NaiveDateTime) -> bool {
        is_within(point, self.start, self.end)
    }

    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        overlaps(self.start, self.end, start, end)
    }

    /// Every calendar date touched by the window, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.end.date();
        self.start.date().iter_days().take_while(move |d| *d <= last)
    }
}

/// First day of the week containing `date`, or the earliest representable
/// date if that week starts before it.
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    date
        .checked_sub_signed(Duration::days(i64::from(back)))
        .unwrap_or(NaiveDate::MIN)
}

/// Last day of the week containing `date`, saturating at the latest
/// representable date.
pub fn end_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    start_of_week(date, week_start)
        .checked_add_signed(Duration::days(6))
        .unwrap_or(NaiveDate::MAX)
}

/// First day of the month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// The month containing `anchor`, widened to whole weeks on both sides.
///
/// The window starts at midnight of the first grid day and ends at the last
/// representable instant of the final grid day. Near the ends of the
/// representable calendar the window is cut short instead of wrapping.
pub fn month_window(anchor: NaiveDateTime, week_start: Weekday) -> DateWindow {
    let first = start_of_week(start_of_month(anchor.date()), week_start);
    let last = end_of_week(end_of_month(anchor.date()), week_start);

    let start = first.and_time(NaiveTime::MIN);
    let end = last
        .succ_opt()
        .map(|next| next.and_time(NaiveTime::MIN))
        .and_then(|midnight| midnight.checked_sub_signed(Duration::nanoseconds(1)))
        .unwrap_or(NaiveDateTime::MAX);
    DateWindow { start, end }
}

/// Same time, one month earlier (clamped). `None` before the earliest
/// representable month.
pub fn previous_month(anchor: NaiveDateTime) -> Option<NaiveDateTime> {
    anchor.checked_sub_months(Months::new(1))
}

/// Same time, one month later (clamped). `None` past the latest
/// representable month.
pub fn next_month(anchor: NaiveDateTime) -> Option<NaiveDateTime> {
    anchor.checked_add_months(Months::new(1))
}
