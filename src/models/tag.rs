use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Color, TagId, TagKind};
use crate::error::ParseError;

/// A named, colored tag: a character or a place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedTag {
    id: TagId,
    name: String,
    color: Color,
}

impl NamedTag {
    /// Creates a new named tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook::{Color, NamedTag, TagId};
    ///
    /// let tag = NamedTag::new(TagId::new(1), "A", Color::new("#ff0000"));
    /// assert_eq!(tag.name(), "A");
    /// assert_eq!(tag.color().as_str(), "#ff0000");
    /// ```
    pub fn new(id: TagId, name: impl Into<String>, color: Color) -> Self {
        Self {
            id,
            name: name.into(),
            color,
        }
    }

    /// Returns the tag's unique identifier.
    pub fn id(&self) -> TagId {
        self.id
    }

    /// Returns the display name, which is also the text notes reference.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tag's color.
    pub fn color(&self) -> &Color {
        &self.color
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}

/// A plain-text time or date label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    id: TagId,
    text: String,
}

impl Label {
    /// Creates a new label.
    pub fn new(id: TagId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Returns the label's unique identifier.
    pub fn id(&self) -> TagId {
        self.id
    }

    /// Returns the label text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// Uniform listing row for any registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub kind: TagKind,
    pub id: TagId,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl From<(TagKind, &NamedTag)> for TagEntry {
    fn from((kind, tag): (TagKind, &NamedTag)) -> Self {
        Self {
            kind,
            id: tag.id(),
            text: tag.name().to_string(),
            color: Some(tag.color().clone()),
        }
    }
}

impl From<(TagKind, &Label)> for TagEntry {
    fn from((kind, label): (TagKind, &Label)) -> Self {
        Self {
            kind,
            id: label.id(),
            text: label.text().to_string(),
            color: None,
        }
    }
}

/// Addresses one entity inside a registry.
///
/// `Id` survives removals and re-sorting. `Position` is the index in the
/// registry's current display order and shifts whenever an earlier entry
/// goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKey {
    Id(TagId),
    Position(usize),
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Position(index) => write!(f, "@{index}"),
        }
    }
}

impl From<TagId> for TagKey {
    fn from(id: TagId) -> Self {
        Self::Id(id)
    }
}

impl FromStr for TagKey {
    type Err = ParseError;

    /// Parses `12` as an id and `@3` as a display position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad_key = || ParseError::BadKey(s.to_string());
        match s.strip_prefix('@') {
            Some(index) => index.parse().map(Self::Position).map_err(|_| bad_key()),
            None => s
                .parse()
                .map(|id| Self::Id(TagId::new(id)))
                .map_err(|_| bad_key()),
        }
    }
}
