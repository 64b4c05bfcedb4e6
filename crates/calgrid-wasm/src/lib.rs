//! WASM bindings for calgrid-engine.
//!
//! Exposes month-view assembly, grid layout, reminder polling and the
//! soft-delete/undo lifecycle to JavaScript via `wasm-bindgen`. All complex
//! types are passed as JSON strings in the same camelCase shape the engine
//! persists.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p calgrid-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/pkg/ \
//!   target/wasm32-unknown-unknown/release/calgrid_wasm.wasm
//! ```

use calgrid_engine::{
    build_visible_instances_with, due_reminders, timestamp, CalendarState, EditScope, Event,
    EventColor, MonthGrid, Selection, ViewOptions,
};
use chrono::{Duration, NaiveDateTime, Weekday};
use serde::Serialize;
use wasm_bindgen::prelude::*;

type BindResult<T> = std::result::Result<T, String>;

// ---------------------------------------------------------------------------
// Helpers: parsing and serialization at the JS boundary
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 datetime string into a local wall-clock time.
///
/// Accepts naive local time (e.g., "2024-01-15T09:00:00"), a bare date, or
/// RFC 3339 with an offset, in which case the offset's wall time is kept.
fn parse_datetime(s: &str) -> BindResult<NaiveDateTime> {
    timestamp::parse(s).map_err(|e| e.to_string())
}

fn parse_options(week_start: Option<String>) -> BindResult<ViewOptions> {
    match week_start {
        None => Ok(ViewOptions::default()),
        Some(s) => s
            .parse::<Weekday>()
            .map(|week_start| ViewOptions { week_start })
            .map_err(|_| format!("Invalid week start '{}'", s)),
    }
}

fn from_json<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> BindResult<T> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> BindResult<String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn bind<T>(result: BindResult<T>) -> Result<T, JsValue> {
    result.map_err(|e| JsValue::from_str(&e))
}

// ---------------------------------------------------------------------------
// Implementations (plain Rust, testable off-wasm)
// ---------------------------------------------------------------------------

fn visible_impl(templates_json: &str, anchor: &str, week_start: Option<String>) -> BindResult<String> {
    let templates: Vec<Event> = from_json(templates_json, "templates")?;
    let anchor = parse_datetime(anchor)?;
    let options = parse_options(week_start)?;
    to_json(&build_visible_instances_with(&templates, anchor, &options))
}

fn grid_impl(templates_json: &str, anchor: &str, week_start: Option<String>) -> BindResult<String> {
    let templates: Vec<Event> = from_json(templates_json, "templates")?;
    let anchor = parse_datetime(anchor)?;
    let options = parse_options(week_start)?;
    let visible = build_visible_instances_with(&templates, anchor, &options);
    to_json(&MonthGrid::build(anchor, &visible, &options))
}

fn reminders_impl(events_json: &str, now: &str, interval_secs: u32) -> BindResult<String> {
    let events: Vec<Event> = from_json(events_json, "events")?;
    let now = parse_datetime(now)?;
    let due = due_reminders(&events, now, Duration::seconds(i64::from(interval_secs.max(1))));
    to_json(&due)
}

fn create_impl(state_json: &str, event_json: &str) -> BindResult<String> {
    let mut state: CalendarState = from_json(state_json, "state")?;
    state.create(from_json(event_json, "event")?);
    to_json(&state)
}

fn update_impl(state_json: &str, event_json: &str, series: bool) -> BindResult<String> {
    let mut state: CalendarState = from_json(state_json, "state")?;
    let scope = if series { EditScope::Series } else { EditScope::Single };
    state
        .update(from_json(event_json, "event")?, scope)
        .map_err(|e| e.to_string())?;
    to_json(&state)
}

fn delete_impl(state_json: &str, selection_json: &str) -> BindResult<String> {
    let mut state: CalendarState = from_json(state_json, "state")?;
    let selection: Selection = from_json(selection_json, "selection")?;
    state.delete(&selection).map_err(|e| e.to_string())?;
    to_json(&state)
}

fn undo_impl(state_json: &str) -> BindResult<String> {
    let mut state: CalendarState = from_json(state_json, "state")?;
    state.undo();
    to_json(&state)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Events visible on the month grid around `anchor`.
///
/// `templates_json` is the persisted JSON array of event templates. Returns a
/// JSON array of events: plain templates as stored, recurring templates as
/// their generated instances.
#[wasm_bindgen(js_name = "buildVisibleInstances")]
pub fn build_visible_instances(
    templates_json: &str,
    anchor: &str,
    week_start: Option<String>,
) -> Result<String, JsValue> {
    bind(visible_impl(templates_json, anchor, week_start))
}

/// The month grid around `anchor`, as `{year, month, weeks: [[{date, inMonth, events}]]}`.
#[wasm_bindgen(js_name = "monthGrid")]
pub fn month_grid(
    templates_json: &str,
    anchor: &str,
    week_start: Option<String>,
) -> Result<String, JsValue> {
    bind(grid_impl(templates_json, anchor, week_start))
}

/// Reminders firing within the next `interval_secs` seconds after `now`.
///
/// `events_json` should be the latest output of `buildVisibleInstances`.
#[wasm_bindgen(js_name = "dueReminders")]
pub fn reminders_due(events_json: &str, now: &str, interval_secs: u32) -> Result<String, JsValue> {
    bind(reminders_impl(events_json, now, interval_secs))
}

/// Append a template to `{events, pendingRestoration?}` and return the new state.
#[wasm_bindgen(js_name = "createEvent")]
pub fn create_event(state_json: &str, event_json: &str) -> Result<String, JsValue> {
    bind(create_impl(state_json, event_json))
}

/// Apply an edit; with `series` set, `event_json` is an instance whose
/// descriptive fields are copied onto its template.
#[wasm_bindgen(js_name = "updateEvent")]
pub fn update_event(state_json: &str, event_json: &str, series: bool) -> Result<String, JsValue> {
    bind(update_impl(state_json, event_json, series))
}

/// Soft-delete the template behind `{id, parentId?}` and remember it for undo.
#[wasm_bindgen(js_name = "deleteEvent")]
pub fn delete_event(state_json: &str, selection_json: &str) -> Result<String, JsValue> {
    bind(delete_impl(state_json, selection_json))
}

/// Restore the most recently deleted template, if any.
#[wasm_bindgen(js_name = "undoDelete")]
pub fn undo_delete(state_json: &str) -> Result<String, JsValue> {
    bind(undo_impl(state_json))
}

/// Style classes for one of the four event colors.
#[wasm_bindgen(js_name = "colorStyle")]
pub fn color_style(color: &str) -> Result<String, JsValue> {
    bind(
        color
            .parse::<EventColor>()
            .map(|c| c.style_token().to_string())
            .map_err(|e| e.to_string()),
    )
}
