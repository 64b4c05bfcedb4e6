//! The fixed event color palette and its style tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Display color of an event. The set is closed; unknown names are rejected
/// at deserialization time rather than rendered unstyled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    #[default]
    Blue,
    Green,
    Red,
    Yellow,
}

impl EventColor {
    pub const ALL: [EventColor; 4] = [
        EventColor::Blue,
        EventColor::Green,
        EventColor::Red,
        EventColor::Yellow,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventColor::Blue => "blue",
            EventColor::Green => "green",
            EventColor::Red => "red",
            EventColor::Yellow => "yellow",
        }
    }

    /// Style classes used by the month grid for an event chip.
    pub fn style_token(self) -> &'static str {
        match self {
            EventColor::Blue => "bg-blue-500 dark:bg-blue-600",
            EventColor::Green => "bg-green-500 dark:bg-green-600",
            EventColor::Red => "bg-red-500 dark:bg-red-600",
            EventColor::Yellow => "bg-yellow-500 dark:bg-yellow-600",
        }
    }
}

impl fmt::Display for EventColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventColor {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        EventColor::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| EngineError::UnknownColor(s.to_string()))
    }
}
