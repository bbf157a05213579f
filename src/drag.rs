//! Drag-and-drop tagging.
//!
//! A drag carries a serialized [`DragPayload`] from a tag list to a note.
//! The payload is plain JSON so any surface that can move a string can
//! carry it; the drop side decodes it and applies the reference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

use crate::error::{ParseError, PayloadError};
use crate::models::{Color, TagEntry, TagId, TagKind};

/// Data channel the payload travels on.
pub const MIME_TYPE: &str = "application/json";

/// Reference to one tag, as carried by a drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPayload {
    pub id: TagId,
    #[serde(rename = "type")]
    pub kind: TagKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl From<TagEntry> for DragPayload {
    fn from(entry: TagEntry) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind,
            text: entry.text,
            color: entry.color,
        }
    }
}

impl DragPayload {
    /// Serializes the payload for transport.
    pub fn encode(&self) -> String {
        // a struct of strings and integers always serializes
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Decodes a payload received at drop time.
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook::TagKind;
    /// use casebook::drag::DragPayload;
    ///
    /// let payload = DragPayload::decode(Some(r##"{"id":1,"type":"character","text":"A","color":"#ff0000"}"##)).unwrap();
    /// assert_eq!(payload.kind, TagKind::Character);
    /// assert_eq!(payload.text, "A");
    ///
    /// assert!(DragPayload::decode(None).is_err());
    /// assert!(DragPayload::decode(Some("not json")).is_err());
    /// ```
    pub fn decode(raw: Option<&str>) -> Result<Self, PayloadError> {
        let raw = raw.filter(|raw| !raw.trim().is_empty()).ok_or(PayloadError::Missing)?;
        serde_json::from_str(raw).map_err(PayloadError::Malformed)
    }
}

/// How a drop treats a note that already holds a reference of that kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropMode {
    /// Always replace the reference.
    #[default]
    Overwrite,
    /// Clear the reference if it already equals the dropped text, otherwise
    /// replace it.
    Toggle,
}

impl DropMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Toggle => "toggle",
        }
    }
}

impl fmt::Display for DropMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DropMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "toggle" => Ok(Self::Toggle),
            _ => Err(ParseError::BadDropMode(s.to_string())),
        }
    }
}

/// What a drop does to the target note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum DropAction {
    Attach { kind: TagKind, text: String },
    Detach { kind: TagKind },
}

impl DropMode {
    /// Decides the action for dropping `payload` onto a note whose current
    /// reference of the payload's kind is `current`.
    pub fn resolve(&self, current: Option<&str>, payload: &DragPayload) -> DropAction {
        let kind = payload.kind;
        match self {
            Self::Toggle if current == Some(payload.text.as_str()) => DropAction::Detach { kind },
            _ => DropAction::Attach {
                kind,
                text: payload.text.clone(),
            },
        }
    }
}

/// Tracks the drag in flight, if any.
///
/// Nothing here is consulted at drop time: the drop reads the payload it
/// was handed. The session only lets a surface know a drag is underway.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    in_flight: Option<DragPayload>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a drag and returns the serialized payload.
    pub fn begin(&mut self, payload: DragPayload) -> String {
        let encoded = payload.encode();
        trace!(kind = %payload.kind, text = %payload.text, "drag started");
        self.in_flight = Some(payload);
        encoded
    }

    /// Ends the current drag, whether it was dropped or cancelled.
    pub fn end(&mut self) -> Option<DragPayload> {
        self.in_flight.take()
    }

    pub fn in_flight(&self) -> Option<&DragPayload> {
        self.in_flight.as_ref()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}
