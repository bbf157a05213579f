use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{NoteId, TagKind};

/// A free-written note with up to one reference per tag kind.
///
/// References hold the referenced tag's text, not its id. Keeping them in
/// step with the registries is the job of the cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    id: NoteId,
    content: String,
    character: Option<String>,
    place: Option<String>,
    time: Option<String>,
    date: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl Note {
    /// Returns the note's unique identifier.
    pub fn id(&self) -> NoteId {
        self.id
    }

    /// Returns the note's content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the referenced text for `kind`, if any.
    pub fn reference(&self, kind: TagKind) -> Option<&str> {
        match kind {
            TagKind::Character => self.character.as_deref(),
            TagKind::Place => self.place.as_deref(),
            TagKind::Time => self.time.as_deref(),
            TagKind::Date => self.date.as_deref(),
        }
    }

    /// Returns the referenced character name.
    pub fn character(&self) -> Option<&str> {
        self.character.as_deref()
    }

    /// Returns the referenced place name.
    pub fn place(&self) -> Option<&str> {
        self.place.as_deref()
    }

    /// Returns the referenced time label.
    pub fn time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    /// Returns the referenced date label.
    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    /// Returns when this note was created.
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub(crate) fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub(crate) fn reference_mut(&mut self, kind: TagKind) -> &mut Option<String> {
        match kind {
            TagKind::Character => &mut self.character,
            TagKind::Place => &mut self.place,
            TagKind::Time => &mut self.time,
            TagKind::Date => &mut self.date,
        }
    }
}

/// Builder for constructing `Note` instances with optional fields.
///
/// # Examples
///
/// ```
/// use casebook::{NoteBuilder, NoteId, TagKind};
///
/// let note = NoteBuilder::new()
///     .id(NoteId::new(1))
///     .content("Aが包丁を持っていた")
///     .reference(TagKind::Character, "A")
///     .build();
///
/// assert_eq!(note.id(), NoteId::new(1));
/// assert_eq!(note.character(), Some("A"));
/// assert_eq!(note.place(), None);
/// ```
#[derive(Debug, Default)]
pub struct NoteBuilder {
    id: Option<NoteId>,
    content: Option<String>,
    character: Option<String>,
    place: Option<String>,
    time: Option<String>,
    date: Option<String>,
    created_at: Option<OffsetDateTime>,
}

impl NoteBuilder {
    /// Creates a new `NoteBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the note ID.
    pub fn id(mut self, id: NoteId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the note content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the reference for one tag kind.
    pub fn reference(mut self, kind: TagKind, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match kind {
            TagKind::Character => self.character = value,
            TagKind::Place => self.place = value,
            TagKind::Time => self.time = value,
            TagKind::Date => self.date = value,
        }
        self
    }

    /// Sets the created timestamp.
    pub fn created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builds the `Note`, using defaults for optional fields.
    ///
    /// # Panics
    ///
    /// Panics if `id` or `content` have not been set.
    pub fn build(self) -> Note {
        Note {
            id: self.id.expect("id is required"),
            content: self.content.expect("content is required"),
            character: self.character,
            place: self.place,
            time: self.time,
            date: self.date,
            created_at: self.created_at.unwrap_or_else(OffsetDateTime::now_utc),
        }
    }
}
