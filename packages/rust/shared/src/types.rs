//! Core domain types for Lexi conversations and knowledge records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Citation / KnowledgeRecord
// ---------------------------------------------------------------------------

/// A reference to a source document, surfaced with a matched answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Display text (usually the cited paragraph).
    pub text: String,
    /// Link to the externally served document. Opaque, never validated.
    pub link: String,
    /// Literal phrases the document viewer marks when rendering the source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
    /// Short badge shown next to the citation, e.g. "Highlighted Para 7".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Citation {
    /// Citation with no highlight phrases and no note.
    pub fn new(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: link.into(),
            highlights: Vec::new(),
            note: None,
        }
    }
}

/// A static keyword → answer → citation triple used for matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    /// Lower-case keywords; any one appearing in a query selects this record.
    pub keywords: Vec<String>,
    /// Answer text returned on a match.
    pub answer: String,
    /// Source backing the answer.
    pub citation: Citation,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A UUID v7 wrapper for message identifiers (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Generate a new time-sortable message identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One transcript entry. Built once when appended and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    /// At most one entry for assistant messages; always empty for user messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// A user message carrying the submitted draft verbatim.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::User,
            content: content.into(),
            citations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// An assistant message with an optional supporting citation.
    pub fn assistant(content: impl Into<String>, citation: Option<Citation>) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::Assistant,
            content: content.into(),
            citations: citation.into_iter().collect(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_id_serializes_as_bare_uuid() {
        let id = MessageId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).expect("serialize");
        assert_eq!(json, "\"assistant\"");
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn user_message_has_no_citations() {
        let msg = Message::user("Tell me about motor accident compensation");
        assert_eq!(msg.role, Role::User);
        assert!(msg.citations.is_empty());

        let json = serde_json::to_value(&msg).expect("serialize");
        assert!(json.get("citations").is_none());
    }

    #[test]
    fn assistant_message_carries_at_most_one_citation() {
        let cited = Message::assistant("answer", Some(Citation::new("Para 7", "/doc.pdf")));
        assert_eq!(cited.citations.len(), 1);

        let fallback = Message::assistant("no idea", None);
        assert!(fallback.citations.is_empty());
    }

    #[test]
    fn citation_optional_fields_default() {
        let citation: Citation =
            serde_json::from_str(r#"{"text":"Para 7","link":"/doc.pdf"}"#).expect("deserialize");
        assert!(citation.highlights.is_empty());
        assert!(citation.note.is_none());
    }
}
