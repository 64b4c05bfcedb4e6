//! Template lifecycle -- create, edit, soft-delete and single-level undo.
//!
//! Templates are never physically removed. A delete flips `is_deleted` and
//! remembers the template id as the pending restoration target; a later
//! delete overwrites that target, and `undo` restores exactly it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::Event;
use crate::view::{build_visible_instances_with, ViewOptions};

/// What the user picked on the grid: an event id, plus the id of the
/// template it was generated from when it is a recurring instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Selection {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
        }
    }

    /// Id of the persisted template this selection refers to.
    pub fn template_id(&self) -> &str {
        self.parent_id.as_deref().unwrap_or(&self.id)
    }
}

impl From<&Event> for Selection {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.clone(),
            parent_id: event.parent_id.clone(),
        }
    }
}

/// How far an edit reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditScope {
    /// Replace the template whose id matches the edited event.
    #[default]
    Single,
    /// Copy the descriptive fields of an edited instance onto its template.
    Series,
}

/// The host application's template set plus its undo pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarState {
    events: Vec<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pending_restoration: Option<String>,
}

impl CalendarState {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            pending_restoration: None,
        }
    }

    /// Resume with a previously recorded undo target.
    pub fn with_pending_restoration(mut self, id: Option<String>) -> Self {
        self.pending_restoration = id;
        self
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn pending_restoration(&self) -> Option<&str> {
        self.pending_restoration.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Event> {
        self.events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| EngineError::TemplateNotFound(id.to_string()))
    }

    /// Store a new template. Returns its id.
    pub fn create(&mut self, mut event: Event) -> String {
        event.is_deleted = false;
        event.parent_id = None;
        let id = event.id.clone();
        tracing::debug!(template_id = %id, "created template");
        self.events.push(event);
        id
    }

    /// Apply an edit made in the details form.
    ///
    /// # Errors
    /// Returns `EngineError::TemplateNotFound` if the targeted template is
    /// not stored.
    pub fn update(&mut self, edited: Event, scope: EditScope) -> Result<()> {
        match (scope, edited.parent_id.clone()) {
            (EditScope::Series, Some(parent_id)) => {
                let parent = self.get_mut(&parent_id)?;
                parent.title = edited.title;
                parent.description = edited.description;
                parent.location = edited.location;
                parent.color = edited.color;
                parent.reminders = edited.reminders;
                parent.is_deleted = false;
            }
            _ => {
                let slot = self.get_mut(&edited.id)?;
                *slot = Event {
                    is_deleted: false,
                    ..edited
                };
            }
        }
        Ok(())
    }

    /// Soft-delete the selected template, or the series behind a selected
    /// instance. Returns the id of the template that was deleted.
    ///
    /// # Errors
    /// Returns `EngineError::TemplateNotFound` if no stored template matches;
    /// the pending restoration target is left untouched in that case.
    pub fn delete(&mut self, selection: &Selection) -> Result<String> {
        let target = selection.template_id().to_string();
        self.get_mut(&target)?.is_deleted = true;
        tracing::debug!(template_id = %target, "soft-deleted template");
        self.pending_restoration = Some(target.clone());
        Ok(target)
    }

    /// Restore the most recently deleted template. A no-op returning `None`
    /// when nothing is pending.
    pub fn undo(&mut self) -> Option<String> {
        let id = self.pending_restoration.take()?;
        match self.events.iter_mut().find(|e| e.id == id) {
            Some(event) => {
                event.is_deleted = false;
                tracing::debug!(template_id = %id, "restored template");
                Some(id)
            }
            None => {
                tracing::warn!(template_id = %id, "pending restoration target vanished");
                None
            }
        }
    }

    pub fn visible(&self, anchor: NaiveDateTime, options: &ViewOptions) -> Vec<Event> {
        build_visible_instances_with(&self.events, anchor, options)
    }
}
