//! Note model

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unique identifier for a note, assigned by the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(i64);

impl NoteId {
    /// Wrap a raw server-assigned identifier
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the raw numeric value of this ID
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A note in the system, as returned by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Server-assigned identifier
    pub id: NoteId,
    /// Plain text content
    pub content: String,
    /// Importance flag toggled by the user
    pub important: bool,
    /// Creation timestamp
    pub date: DateTime<Utc>,
}

impl Note {
    /// Return a copy of this note with the importance flag flipped.
    ///
    /// Importance changes are submitted as a full replacement of the
    /// record, so callers send the flipped copy to the service.
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            important: !self.important,
            ..self.clone()
        }
    }

    /// Check if note content is empty (whitespace-only counts as empty)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// A note draft submitted on creation; the service assigns the id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub content: String,
    pub important: bool,
    pub date: DateTime<Utc>,
}

impl NoteDraft {
    /// Create a draft with the given content, stamped with the current time
    #[must_use]
    pub fn new(content: impl Into<String>, important: bool) -> Self {
        Self {
            content: content.into(),
            important,
            date: Utc::now(),
        }
    }
}
