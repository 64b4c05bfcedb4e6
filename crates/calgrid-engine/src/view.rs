//! View assembly -- computes the visible month window and merges plain and
//! recurring templates into one flat list of displayable events.
//!
//! Pure: nothing is cached between calls. Hosts recompute on every change to
//! the template set or the anchor date.

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::generator::expand;
use crate::model::Event;
use crate::range::{month_window, DateWindow};

/// Presentation settings that affect which instants are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewOptions {
    /// First column of the month grid.
    pub week_start: Weekday,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
        }
    }
}

impl ViewOptions {
    pub fn window(&self, anchor: NaiveDateTime) -> DateWindow {
        month_window(anchor, self.week_start)
    }
}

/// Events visible on the month grid around `anchor`, with Sunday-first weeks.
pub fn build_visible_instances(templates: &[Event], anchor: NaiveDateTime) -> Vec<Event> {
    build_visible_instances_with(templates, anchor, &ViewOptions::default())
}

/// Events visible on the month grid around `anchor`.
pub fn build_visible_instances_with(
    templates: &[Event],
    anchor: NaiveDateTime,
    options: &ViewOptions,
) -> Vec<Event> {
    instances_in_window(templates, &options.window(anchor))
}

/// Events visible in an arbitrary window.
///
/// Soft-deleted templates and stray instances are dropped. Plain templates
/// are kept when they overlap the window; recurring ones are replaced by
/// their expanded instances. Plain events come first, in source order,
/// followed by each template's instances in generation order.
pub fn instances_in_window(templates: &[Event], window: &DateWindow) -> Vec<Event> {
    let (recurring, plain): (Vec<&Event>, Vec<&Event>) = templates
        .iter()
        .filter(|t| !t.is_deleted && !t.is_instance())
        .partition(|t| t.is_recurring());

    let mut visible: Vec<Event> = plain
        .into_iter()
        .filter(|t| {
            if !t.is_well_formed() {
                tracing::warn!(template_id = %t.id, "skipping template with end before start");
                return false;
            }
            window.overlaps(t.start, t.end)
        })
        .cloned()
        .collect();

    for template in recurring {
        visible.extend(expand(template, window.start, window.end));
    }

    tracing::debug!(
        window_start = %window.start,
        window_end = %window.end,
        visible = visible.len(),
        "assembled visible events"
    );

    visible
}
