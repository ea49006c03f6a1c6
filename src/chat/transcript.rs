//! Chat transcript
//!
//! The transcript is an append-only list of [`ChatEntry`] values. Entries
//! are never edited or removed, and every entry gets an id strictly greater
//! than the one before it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::types::{ChartPayload, UploadedFile};

/// What an entry displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Text typed by the user
    User,
    /// Plain text from the assistant
    Text,
    /// Chart answer
    Chart,
    /// Something went wrong
    Error,
    /// Upload summary
    Upload,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Text => write!(f, "text"),
            Self::Chart => write!(f, "chart"),
            Self::Error => write!(f, "error"),
            Self::Upload => write!(f, "upload"),
        }
    }
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    /// Position-ordered unique id
    pub id: u64,
    /// Entry kind
    pub kind: EntryKind,
    /// Message text
    pub text: String,
    /// Chart to render (chart entries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartPayload>,
    /// Caption under the chart (chart entries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Uploaded file summaries (upload entries)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<UploadedFile>,
    /// When the entry was appended
    pub created_at: DateTime<Utc>,
}

impl ChatEntry {
    /// Whether the user authored this entry
    pub fn is_user(&self) -> bool {
        self.kind == EntryKind::User
    }
}

/// Append-only, id-ordered list of entries
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<ChatEntry>,
    next_id: u64,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    /// Entries appended after the first `offset`
    pub fn since(&self, offset: usize) -> &[ChatEntry] {
        &self.entries[offset.min(self.entries.len())..]
    }

    fn push(
        &mut self,
        kind: EntryKind,
        text: impl Into<String>,
        chart: Option<ChartPayload>,
        description: Option<String>,
        files: Vec<UploadedFile>,
    ) -> &ChatEntry {
        self.next_id += 1;
        let entry = ChatEntry {
            id: self.next_id,
            kind,
            text: text.into(),
            chart,
            description,
            files,
            created_at: Utc::now(),
        };
        tracing::trace!(id = entry.id, kind = %entry.kind, "Transcript append");
        self.entries.push(entry);
        // Just pushed, so the vector is non-empty.
        &self.entries[self.entries.len() - 1]
    }

    /// Append a user entry with the verbatim input
    pub fn push_user(&mut self, text: impl Into<String>) -> &ChatEntry {
        self.push(EntryKind::User, text, None, None, Vec::new())
    }

    /// Append an assistant text entry
    pub fn push_text(&mut self, text: impl Into<String>) -> &ChatEntry {
        self.push(EntryKind::Text, text, None, None, Vec::new())
    }

    /// Append a chart entry
    pub fn push_chart(
        &mut self,
        text: impl Into<String>,
        chart: ChartPayload,
        description: impl Into<String>,
    ) -> &ChatEntry {
        self.push(
            EntryKind::Chart,
            text,
            Some(chart),
            Some(description.into()),
            Vec::new(),
        )
    }

    /// Append an error entry
    pub fn push_error(&mut self, text: impl Into<String>) -> &ChatEntry {
        self.push(EntryKind::Error, text, None, None, Vec::new())
    }

    /// Append an upload summary entry
    pub fn push_upload(&mut self, text: impl Into<String>, files: Vec<UploadedFile>) -> &ChatEntry {
        self.push(EntryKind::Upload, text, None, None, files)
    }
}
