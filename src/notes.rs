//! Note repository.
//!
//! Owns the note collection in creation order. There is no index from tag
//! text to notes, so reference rewrites scan every note.

use time::OffsetDateTime;

use crate::error::{Outcome, Rejected};
use crate::models::{Note, NoteBuilder, NoteId, TagKind};

/// The collection of notes.
#[derive(Debug, Clone, Default)]
pub struct NoteRepository {
    notes: Vec<Note>,
    last_id: i64,
}

impl NoteRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a note stamped with the current time.
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook::notes::NoteRepository;
    ///
    /// let mut notes = NoteRepository::new();
    /// let id = notes.add("Aが包丁を持っていた").unwrap();
    ///
    /// assert_eq!(notes.get(id).unwrap().character(), None);
    /// assert!(notes.add("   ").is_err());
    /// assert_eq!(notes.len(), 1);
    /// ```
    pub fn add(&mut self, content: &str) -> Outcome<NoteId> {
        self.add_at(content, OffsetDateTime::now_utc())
    }

    /// Creates a note with an explicit creation time.
    ///
    /// The id is the creation time in milliseconds, bumped past the last
    /// issued id when needed so ids are strictly increasing.
    pub fn add_at(&mut self, content: &str, created_at: OffsetDateTime) -> Outcome<NoteId> {
        if content.trim().is_empty() {
            return Err(Rejected::EmptyText);
        }

        let millis = (created_at.unix_timestamp_nanos() / 1_000_000) as i64;
        let id = millis.max(self.last_id + 1);
        self.last_id = id;

        let note = NoteBuilder::new()
            .id(NoteId::new(id))
            .content(content)
            .created_at(created_at)
            .build();
        self.notes.push(note);
        Ok(NoteId::new(id))
    }

    /// Deletes a note. Returns false if there was nothing to delete.
    pub fn remove(&mut self, id: NoteId) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| note.id() != id);
        self.notes.len() != before
    }

    /// Replaces a note's content.
    pub fn set_content(&mut self, id: NoteId, content: &str) -> Outcome {
        self.note_mut(id)?.set_content(content);
        Ok(())
    }

    /// Points the `kind` reference of a note at `value`, replacing any
    /// previous reference.
    pub fn attach(&mut self, id: NoteId, kind: TagKind, value: &str) -> Outcome {
        if value.trim().is_empty() {
            return Err(Rejected::EmptyText);
        }
        *self.note_mut(id)?.reference_mut(kind) = Some(value.to_string());
        Ok(())
    }

    /// Clears the `kind` reference of a note and returns what it held.
    pub fn detach(&mut self, id: NoteId, kind: TagKind) -> Outcome<Option<String>> {
        Ok(self.note_mut(id)?.reference_mut(kind).take())
    }

    /// Rewrites every `kind` reference equal to `old` into `new`.
    ///
    /// Returns the number of notes changed. An empty `old` matches nothing.
    pub fn rename_references(&mut self, kind: TagKind, old: &str, new: &str) -> usize {
        if old.is_empty() {
            return 0;
        }
        self.rewrite(kind, old, || Some(new.to_string()))
    }

    /// Clears every `kind` reference equal to `value`.
    ///
    /// Returns the number of notes changed. An empty `value` matches nothing.
    pub fn clear_references(&mut self, kind: TagKind, value: &str) -> usize {
        if value.is_empty() {
            return 0;
        }
        self.rewrite(kind, value, || None)
    }

    /// Returns the note with the given id.
    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id() == id)
    }

    /// Returns all notes in creation order.
    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn note_mut(&mut self, id: NoteId) -> Outcome<&mut Note> {
        self.notes
            .iter_mut()
            .find(|note| note.id() == id)
            .ok_or(Rejected::UnknownNote(id))
    }

    fn rewrite(
        &mut self,
        kind: TagKind,
        matching: &str,
        replacement: impl Fn() -> Option<String>,
    ) -> usize {
        let mut touched = 0;
        for note in &mut self.notes {
            let slot = note.reference_mut(kind);
            if slot.as_deref() == Some(matching) {
                *slot = replacement();
                touched += 1;
            }
        }
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn repo_with(contents: &[&str]) -> (NoteRepository, Vec<NoteId>) {
        let mut repo = NoteRepository::new();
        let base = datetime!(2024-05-01 09:00 UTC);
        let ids = contents
            .iter()
            .map(|content| repo.add_at(content, base).unwrap())
            .collect();
        (repo, ids)
    }

    #[test]
    fn add_rejects_whitespace_only_content() {
        let mut repo = NoteRepository::new();
        assert!(matches!(repo.add(" \n\t"), Err(Rejected::EmptyText)));
        assert!(repo.is_empty());
    }

    #[test]
    fn ids_strictly_increase_within_one_millisecond() {
        let (repo, ids) = repo_with(&["a", "b", "c"]);

        assert!(ids[0] < ids[1] && ids[1] < ids[2]);
        assert_eq!(repo.len(), 3);
    }

    #[test]
    fn id_follows_creation_millis() {
        let mut repo = NoteRepository::new();
        let at = datetime!(2024-05-01 09:00:00.250 UTC);
        let id = repo.add_at("x", at).unwrap();

        assert_eq!(id.get(), at.unix_timestamp() * 1000 + 250);
    }

    #[test]
    fn remove_is_idempotent() {
        let (mut repo, ids) = repo_with(&["a"]);

        assert!(repo.remove(ids[0]));
        assert!(!repo.remove(ids[0]));
        assert!(repo.is_empty());
    }

    #[test]
    fn set_content_requires_existing_note() {
        let (mut repo, ids) = repo_with(&["a"]);

        repo.set_content(ids[0], "b").unwrap();
        assert_eq!(repo.get(ids[0]).unwrap().content(), "b");
        assert!(matches!(
            repo.set_content(NoteId::new(1), "c"),
            Err(Rejected::UnknownNote(_))
        ));
    }

    #[test]
    fn attach_overwrites_without_toggling() {
        let (mut repo, ids) = repo_with(&["a"]);

        repo.attach(ids[0], TagKind::Character, "A").unwrap();
        repo.attach(ids[0], TagKind::Character, "A").unwrap();
        assert_eq!(repo.get(ids[0]).unwrap().character(), Some("A"));

        repo.attach(ids[0], TagKind::Character, "B").unwrap();
        assert_eq!(repo.get(ids[0]).unwrap().character(), Some("B"));
    }

    #[test]
    fn detach_twice_equals_detach_once() {
        let (mut repo, ids) = repo_with(&["a"]);
        repo.attach(ids[0], TagKind::Place, "書斎").unwrap();

        assert_eq!(
            repo.detach(ids[0], TagKind::Place).unwrap().as_deref(),
            Some("書斎")
        );
        let after_once = repo.get(ids[0]).cloned();
        assert_eq!(repo.detach(ids[0], TagKind::Place).unwrap(), None);
        assert_eq!(repo.get(ids[0]).cloned(), after_once);
    }

    #[test]
    fn rename_references_touches_only_matching_kind_and_value() {
        let (mut repo, ids) = repo_with(&["a", "b", "c"]);
        repo.attach(ids[0], TagKind::Character, "A").unwrap();
        repo.attach(ids[1], TagKind::Character, "B").unwrap();
        repo.attach(ids[2], TagKind::Place, "A").unwrap();

        let touched = repo.rename_references(TagKind::Character, "A", "A子");

        assert_eq!(touched, 1);
        assert_eq!(repo.get(ids[0]).unwrap().character(), Some("A子"));
        assert_eq!(repo.get(ids[1]).unwrap().character(), Some("B"));
        assert_eq!(repo.get(ids[2]).unwrap().place(), Some("A"));
    }

    #[test]
    fn clear_references_nulls_every_match() {
        let (mut repo, ids) = repo_with(&["a", "b"]);
        repo.attach(ids[0], TagKind::Date, "1日目").unwrap();
        repo.attach(ids[1], TagKind::Date, "1日目").unwrap();
        repo.attach(ids[1], TagKind::Time, "朝").unwrap();

        assert_eq!(repo.clear_references(TagKind::Date, "1日目"), 2);
        assert!(repo.iter().all(|note| note.date().is_none()));
        assert_eq!(repo.get(ids[1]).unwrap().time(), Some("朝"));
    }

    #[test]
    fn empty_match_values_are_no_ops() {
        let (mut repo, ids) = repo_with(&["a"]);
        repo.attach(ids[0], TagKind::Time, "朝").unwrap();

        assert_eq!(repo.rename_references(TagKind::Time, "", "夜"), 0);
        assert_eq!(repo.clear_references(TagKind::Time, ""), 0);
        assert_eq!(repo.get(ids[0]).unwrap().time(), Some("朝"));
    }
}
