//! Core document record for the buddydocs application.
//!
//! This module contains the `Document` stored by `DocumentStore`, the closed
//! `DocumentType` enumeration and the `DocumentDraft` used to create one.
use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DocsError, Result};

/// Store-assigned identifier. Monotonically increasing, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(DocumentId)
            .map_err(|_| DocsError::validation(format!("Invalid document id: '{}'", s)))
    }
}

/// The kinds of document a user can create.
///
/// Serialized as a lower-case string. A stored value outside the enumeration
/// is kept verbatim in `Unknown` so rewriting the record never changes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentType {
    Document,
    Wiki,
    List,
    Interactive,
    Fiction,
    /// Stored value that is not part of the enumeration. Shown with the
    /// default treatment; never accepted for new documents.
    Unknown(String),
}

impl DocumentType {
    /// Every type a user may pick when creating a document.
    pub const ALL: [DocumentType; 5] = [
        DocumentType::Document,
        DocumentType::Wiki,
        DocumentType::List,
        DocumentType::Interactive,
        DocumentType::Fiction,
    ];

    /// The stored form: lower-case for known types, verbatim otherwise.
    pub fn as_str(&self) -> &str {
        match self {
            DocumentType::Document => "document",
            DocumentType::Wiki => "wiki",
            DocumentType::List => "list",
            DocumentType::Interactive => "interactive",
            DocumentType::Fiction => "fiction",
            DocumentType::Unknown(raw) => raw,
        }
    }

    /// Human readable label, e.g. "Wiki".
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Document => "Document",
            DocumentType::Wiki => "Wiki",
            DocumentType::List => "List",
            DocumentType::Interactive => "Interactive",
            DocumentType::Fiction => "Fiction",
            DocumentType::Unknown(_) => "Document",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, DocumentType::Unknown(_))
    }

    /// Maps a stored value onto the enumeration, keeping anything else raw.
    fn from_stored(raw: String) -> Self {
        raw.parse().unwrap_or(DocumentType::Unknown(raw))
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentType {
    type Err = DocsError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        DocumentType::ALL
            .iter()
            .find(|t| t.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                DocsError::validation(format!(
                    "Unknown document type '{}', expected one of: document, wiki, list, interactive, fiction",
                    s
                ))
            })
    }
}

impl Serialize for DocumentType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocumentType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(DocumentType::from_stored)
    }
}

fn default_author() -> String {
    "You".to_string()
}

/// A single user-created document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier assigned by the store
    pub id: DocumentId,
    /// Document title, never empty
    pub title: String,
    /// Kind of document, fixed at creation
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    /// Rich-text (HTML) body
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_author")]
    pub author: String,
    /// When the document was created
    pub created: DateTime<Utc>,
    /// Last successful update
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Only meaningful when `deadline` is set
    #[serde(default)]
    pub completed: bool,
}

impl Document {
    /// Builds the stored record for a draft. Timestamps are both `now`.
    pub(crate) fn from_draft(id: DocumentId, draft: DocumentDraft, now: DateTime<Utc>) -> Self {
        Document {
            id,
            title: draft.title.trim().to_string(),
            doc_type: draft.doc_type,
            content: draft.content,
            author: draft.author.unwrap_or_else(default_author),
            created: now,
            last_modified: now,
            pinned: draft.pinned,
            deadline: draft.deadline,
            completed: draft.completed,
        }
    }

    /// Deadline set and not yet completed.
    pub fn has_active_deadline(&self) -> bool {
        self.deadline.is_some() && !self.completed
    }

    /// Case-insensitive substring match against title or content.
    ///
    /// `needle` must already be lower-cased.
    pub fn matches_query(&self, needle: &str) -> bool {
        if self.title.to_lowercase().contains(needle) {
            return true;
        }
        !self.content.is_empty() && self.content.to_lowercase().contains(needle)
    }
}

/// Input for creating a document. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub title: String,
    pub doc_type: DocumentType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
}

impl DocumentDraft {
    /// Creates a draft with empty content, the way the "New" dialog does.
    pub fn new(title: impl Into<String>, doc_type: DocumentType) -> Self {
        DocumentDraft {
            title: title.into(),
            doc_type,
            content: String::new(),
            author: None,
            pinned: false,
            deadline: None,
            completed: false,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Rejects drafts that must never reach the store.
    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        if !self.doc_type.is_known() {
            return Err(DocsError::validation(
                "Document type must be one of: document, wiki, list, interactive, fiction",
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(DocsError::validation("Title must not be empty"));
    }
    Ok(())
}
