//! # calgrid-engine
//!
//! Recurring-event expansion for month-grid calendars.
//!
//! Persisted event templates, some carrying a recurrence rule, are turned
//! into the concrete instances visible in one month view. Expansion is
//! bounded by the rule's end date, its occurrence count and a hard safety
//! cap, preserves each template's duration, and links every instance back to
//! its template through `parent_id`.
//!
//! ## Modules
//!
//! - [`range`] — interval tests, calendar arithmetic, the month window
//! - [`generator`] — one recurring template → instances in a window
//! - [`view`] — all templates + anchor date → visible events
//! - [`lifecycle`] — create, edit, soft-delete and undo
//! - [`reminder`] — which reminders are due on a poll
//! - [`grid`] — visible events → month grid cells
//! - [`store`] — whole-list persistence
//! - [`timestamp`] — lenient timestamp parsing for stored and typed dates
//! - [`model`], [`color`] — data types
//! - [`error`] — Error types

pub mod color;
pub mod error;
pub mod generator;
pub mod grid;
pub mod lifecycle;
pub mod model;
pub mod range;
pub mod reminder;
pub mod store;
pub mod timestamp;
pub mod view;

pub use color::EventColor;
pub use error::EngineError;
pub use generator::{expand, try_expand, Occurrences, SAFETY_CAP};
pub use grid::MonthGrid;
pub use lifecycle::{CalendarState, EditScope, Selection};
pub use model::{Event, RecurrenceKind, RecurrenceRule, Reminder};
pub use range::DateWindow;
pub use reminder::{due_reminders, DueReminder};
pub use store::{load_or_empty, EventStore, JsonFileStore, MemoryStore};
pub use view::{build_visible_instances, build_visible_instances_with, ViewOptions};
