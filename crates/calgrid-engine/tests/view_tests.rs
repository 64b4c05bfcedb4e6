//! Tests for assembling the visible month.

use calgrid_engine::range::DateWindow;
use calgrid_engine::view::instances_in_window;
use calgrid_engine::{
    build_visible_instances, build_visible_instances_with, Event, RecurrenceRule, ViewOptions,
};
use chrono::{NaiveDate, NaiveDateTime, Weekday};

fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}

fn january() -> NaiveDateTime {
    dt(2024, 1, 15, 12)
}

// ── Plain templates ─────────────────────────────────────────────────────────

#[test]
fn plain_template_spanning_window_start_is_returned_as_is() {
    let template = Event::new("New year trip", dt(2023, 12, 30, 10), dt(2024, 1, 2, 18));

    let visible = build_visible_instances(std::slice::from_ref(&template), january());

    assert_eq!(visible, vec![template]);
    assert_eq!(visible[0].parent_id, None);
}

#[test]
fn plain_template_covering_whole_window_is_kept() {
    let template = Event::new("Sabbatical", dt(2023, 11, 1, 0), dt(2024, 3, 1, 0));
    assert_eq!(build_visible_instances(&[template], january()).len(), 1);
}

#[test]
fn plain_templates_outside_window_are_dropped() {
    let before = Event::new("Old", dt(2023, 12, 1, 9), dt(2023, 12, 1, 10));
    let after = Event::new("Later", dt(2024, 2, 10, 9), dt(2024, 2, 10, 10));
    assert!(build_visible_instances(&[before, after], january()).is_empty());
}

#[test]
fn plain_template_in_trailing_week_is_visible() {
    // Feb 3 2024 is the last Saturday of the January grid.
    let template = Event::new("Brunch", dt(2024, 2, 3, 11), dt(2024, 2, 3, 12));
    assert_eq!(build_visible_instances(&[template], january()).len(), 1);
}

// ── Recurring templates ─────────────────────────────────────────────────────

#[test]
fn recurring_template_is_replaced_by_instances() {
    let template = Event::new("Standup", dt(2024, 1, 1, 9), dt(2024, 1, 1, 10))
        .with_recurrence(RecurrenceRule::weekly(1));

    let visible = build_visible_instances(std::slice::from_ref(&template), january());

    assert_eq!(visible.len(), 5);
    assert!(visible.iter().all(|e| e.id != template.id));
    assert!(visible
        .iter()
        .all(|e| e.parent_id.as_deref() == Some(template.id.as_str())));
}

#[test]
fn plain_events_precede_recurring_instances() {
    let recurring = Event::new("Gym", dt(2024, 1, 2, 7), dt(2024, 1, 2, 8))
        .with_recurrence(RecurrenceRule::weekly(1).times(2));
    let plain = Event::new("Dentist", dt(2024, 1, 20, 14), dt(2024, 1, 20, 15));

    let visible = build_visible_instances(&[recurring, plain.clone()], january());

    assert_eq!(visible.len(), 3);
    assert_eq!(visible[0], plain);
    assert_eq!(visible[1].title, "Gym");
    assert_eq!(visible[2].title, "Gym");
}

// ── Filtering ───────────────────────────────────────────────────────────────

#[test]
fn soft_deleted_recurring_template_contributes_nothing() {
    let mut template = Event::new("Daily", dt(2024, 1, 1, 9), dt(2024, 1, 1, 10))
        .with_recurrence(RecurrenceRule::daily(1));
    template.is_deleted = true;

    for anchor in [dt(2023, 12, 1, 0), january(), dt(2024, 2, 1, 0), dt(2024, 3, 1, 0)] {
        assert!(build_visible_instances(std::slice::from_ref(&template), anchor).is_empty());
    }
}

#[test]
fn soft_deleted_plain_template_is_hidden() {
    let mut template = Event::new("Cancelled", dt(2024, 1, 10, 9), dt(2024, 1, 10, 10));
    template.is_deleted = true;
    assert!(build_visible_instances(&[template], january()).is_empty());
}

#[test]
fn stray_instances_in_storage_are_ignored() {
    let mut stray = Event::new("Orphan", dt(2024, 1, 10, 9), dt(2024, 1, 10, 10));
    stray.parent_id = Some("gone".to_string());

    let mut stray_recurring = stray.clone();
    stray_recurring.recurrence = RecurrenceRule::daily(1);

    assert!(build_visible_instances(&[stray, stray_recurring], january()).is_empty());
}

#[test]
fn malformed_templates_are_skipped_without_blocking_others() {
    let bad_plain = Event::new("Bad", dt(2024, 1, 10, 10), dt(2024, 1, 10, 9));
    let bad_recurring = Event::new("Bad series", dt(2024, 1, 10, 10), dt(2024, 1, 9, 9))
        .with_recurrence(RecurrenceRule::daily(1));
    let good = Event::new("Good", dt(2024, 1, 11, 9), dt(2024, 1, 11, 10));

    let visible = build_visible_instances(&[bad_plain, bad_recurring, good.clone()], january());

    assert_eq!(visible, vec![good]);
}

// ── Options and windows ─────────────────────────────────────────────────────

#[test]
fn monday_first_grid_shifts_visible_days() {
    // Sunday Dec 31 2023 is on the Sunday-first grid only.
    let template = Event::new("NYE", dt(2023, 12, 31, 20), dt(2023, 12, 31, 23));
    let monday = ViewOptions {
        week_start: Weekday::Mon,
    };

    assert_eq!(build_visible_instances(std::slice::from_ref(&template), january()).len(), 1);
    assert!(build_visible_instances_with(&[template], january(), &monday).is_empty());
}

#[test]
fn arbitrary_window() {
    let template = Event::new("Standup", dt(2024, 1, 1, 9), dt(2024, 1, 1, 10))
        .with_recurrence(RecurrenceRule::daily(1));
    let window = DateWindow::new(dt(2024, 1, 5, 0), dt(2024, 1, 7, 23));
    assert_eq!(instances_in_window(&[template], &window).len(), 3);
}

#[test]
fn repeated_assembly_is_stable() {
    let templates = vec![
        Event::new("Standup", dt(2024, 1, 1, 9), dt(2024, 1, 1, 10))
            .with_recurrence(RecurrenceRule::weekly(1)),
        Event::new("Lunch", dt(2024, 1, 12, 12), dt(2024, 1, 12, 13)),
    ];

    let key = |events: Vec<Event>| -> Vec<(NaiveDateTime, NaiveDateTime, Option<String>, String)> {
        events
            .into_iter()
            .map(|e| (e.start, e.end, e.parent_id, e.title))
            .collect()
    };

    assert_eq!(
        key(build_visible_instances(&templates, january())),
        key(build_visible_instances(&templates, january()))
    );
}
