//! Month grid layout -- buckets visible events into day cells.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::model::Event;
use crate::view::ViewOptions;

/// Events shown in a cell before the rest collapse into "+N more".
pub const MAX_VISIBLE_PER_DAY: usize = 3;

/// One day of the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    /// False for the leading/trailing days borrowed from adjacent months.
    pub in_month: bool,
    /// Every event starting on this date, ordered by start.
    pub events: Vec<Event>,
}

impl DayCell {
    pub fn visible(&self) -> &[Event] {
        &self.events[..self.events.len().min(MAX_VISIBLE_PER_DAY)]
    }

    /// Number of events hidden behind the "+N more" marker.
    pub fn overflow(&self) -> usize {
        self.events.len().saturating_sub(MAX_VISIBLE_PER_DAY)
    }
}

/// The visible month as rows of seven day cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<DayCell>>,
}

impl MonthGrid {
    /// Lay out `events` (as produced by the view assembler for the same
    /// anchor) on the grid around `anchor`. Events are placed on the date
    /// they start; events starting outside the grid are not shown.
    pub fn build(anchor: NaiveDateTime, events: &[Event], options: &ViewOptions) -> Self {
        let window = options.window(anchor);
        let (year, month) = (anchor.year(), anchor.month());

        let mut cells: Vec<DayCell> = window
            .days()
            .map(|date| DayCell {
                date,
                in_month: date.year() == year && date.month() == month,
                events: Vec::new(),
            })
            .collect();

        let first = window.start.date();
        for event in events {
            let offset = (event.start.date() - first).num_days();
            if let Some(cell) = usize::try_from(offset).ok().and_then(|i| cells.get_mut(i)) {
                cell.events.push(event.clone());
            }
        }
        for cell in &mut cells {
            cell.events.sort_by_key(|e| e.start);
        }

        let weeks = cells.chunks(7).map(<[DayCell]>::to_vec).collect();
        Self { year, month, weeks }
    }

    pub fn days(&self) -> impl Iterator<Item = &DayCell> {
        self.weeks.iter().flatten()
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.days().find(|c| c.date == date)
    }
}
