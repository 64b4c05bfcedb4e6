//! Template persistence.
//!
//! The engine itself never loads or saves; hosts read the whole list, work on
//! it, and write the whole list back.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::Result;
use crate::model::Event;

/// Whole-list storage for templates.
pub trait EventStore {
    fn load(&self) -> Result<Vec<Event>>;
    fn save(&mut self, events: &[Event]) -> Result<()>;
}

/// Templates kept as a pretty-printed JSON array in one file.
///
/// Saves write a sibling temporary file and rename it over the target, so an
/// interrupted save leaves the previous calendar in place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventStore for JsonFileStore {
    /// A missing file is an empty calendar.
    fn load(&self) -> Result<Vec<Event>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&mut self, events: &[Event]) -> Result<()> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };
        let json = serde_json::to_string_pretty(events)?;

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(json.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| e.error)?;
        tracing::debug!(path = %self.path.display(), count = events.len(), "saved templates");
        Ok(())
    }
}

/// Templates held in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    events: Vec<Event>,
}

impl MemoryStore {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }
}

impl EventStore for MemoryStore {
    fn load(&self) -> Result<Vec<Event>> {
        Ok(self.events.clone())
    }

    fn save(&mut self, events: &[Event]) -> Result<()> {
        self.events = events.to_vec();
        Ok(())
    }
}

/// Load templates, treating any failure as an empty calendar.
pub fn load_or_empty(store: &impl EventStore) -> Vec<Event> {
    store.load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "failed to load templates, starting empty");
        Vec::new()
    })
}
