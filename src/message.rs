//! Items and wire payload shapes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Payload ─────────────────────────────────────────────────────────

/// What the transport hands us or expects back: one text value or an
/// ordered sequence of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    List(Vec<String>),
}

impl Payload {
    /// Flatten into individual text values, in order.
    pub fn into_texts(self) -> Vec<String> {
        match self {
            Self::Text(text) => vec![text],
            Self::List(texts) => texts,
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<String>> for Payload {
    fn from(texts: Vec<String>) -> Self {
        Self::List(texts)
    }
}

// ── Item ────────────────────────────────────────────────────────────

/// An opaque unit of payload travelling through a mailbox.
///
/// Fields are private so an item cannot change once it has been enqueued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: Uuid,
    payload: serde_json::Value,
    origin: Option<String>,
    tag: Option<String>,
}

impl Item {
    pub fn new(payload: impl Into<serde_json::Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload: payload.into(),
            origin: None,
            tag: None,
        }
    }

    /// Builder: set the address this item came from.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Builder: attach a string tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Unwrap a transport envelope.
    ///
    /// An object carrying a `content` field yields that content, with its
    /// `addr` string (when present) recorded as the origin. Anything else is
    /// taken as the payload itself.
    pub fn from_envelope(raw: serde_json::Value) -> Self {
        match raw {
            serde_json::Value::Object(mut map) if map.contains_key("content") => {
                let content = map.remove("content").unwrap_or_default();
                let item = Self::new(content);
                match map.get("addr").and_then(|a| a.as_str()) {
                    Some(addr) => item.with_origin(addr),
                    None => item,
                }
            }
            other => Self::new(other),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// The payload as text, if it is a JSON string.
    pub fn text(&self) -> Option<&str> {
        self.payload.as_str()
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Render for an outbound text payload. Non-string payloads use their
    /// JSON form.
    pub fn render(&self) -> String {
        match &self.payload {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
