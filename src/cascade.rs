//! Cascade coordinator.
//!
//! Couples a registry mutation with the matching rewrite of note
//! references. Both writes happen under the same exclusive borrow, and the
//! note rewrite cannot fail once the registry write succeeded, so callers
//! never observe a registry that disagrees with the notes.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Outcome;
use crate::models::{Color, TagKey, TagKind};
use crate::notes::NoteRepository;
use crate::registry::TagRegistries;

/// What a cascaded tag mutation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    pub kind: TagKind,
    /// Text the tag had before the mutation.
    pub old_text: String,
    /// Text the tag has now; `None` when the tag was deleted.
    pub new_text: Option<String>,
    /// Number of notes whose reference was rewritten or cleared.
    pub notes_touched: usize,
}

/// Renames a tag and rewrites every note that referenced the old text.
///
/// Notes are left alone when the name did not actually change (for
/// example a color-only edit).
///
/// # Examples
///
/// ```
/// use casebook::cascade;
/// use casebook::notes::NoteRepository;
/// use casebook::registry::TagRegistries;
/// use casebook::{TagKey, TagKind};
///
/// let mut registries = TagRegistries::new();
/// let mut notes = NoteRepository::new();
/// let tag = registries.add(TagKind::Character, "A", None).unwrap();
/// let note = notes.add("Aが包丁を持っていた").unwrap();
/// notes.attach(note, TagKind::Character, "A").unwrap();
///
/// let report = cascade::rename_tag(
///     &mut registries, &mut notes, TagKind::Character, TagKey::Id(tag), "A子", None,
/// ).unwrap();
///
/// assert_eq!(report.notes_touched, 1);
/// assert_eq!(notes.get(note).unwrap().character(), Some("A子"));
/// ```
pub fn rename_tag(
    registries: &mut TagRegistries,
    notes: &mut NoteRepository,
    kind: TagKind,
    key: TagKey,
    new_text: &str,
    new_color: Option<Color>,
) -> Outcome<CascadeReport> {
    let old_text = registries.rename(kind, key, new_text, new_color)?;

    let notes_touched = if !old_text.is_empty() && old_text != new_text {
        if registries.contains_text(kind, &old_text) {
            warn!(%kind, old = %old_text, "another tag still carries the renamed text; its notes follow the rename too");
        }
        notes.rename_references(kind, &old_text, new_text)
    } else {
        0
    };

    debug!(%kind, old = %old_text, new = %new_text, notes_touched, "renamed tag");
    Ok(CascadeReport {
        kind,
        old_text,
        new_text: Some(new_text.to_string()),
        notes_touched,
    })
}

/// Deletes a tag and clears every note reference to its text.
pub fn delete_tag(
    registries: &mut TagRegistries,
    notes: &mut NoteRepository,
    kind: TagKind,
    key: TagKey,
) -> Outcome<CascadeReport> {
    let old_text = registries.remove(kind, key)?;

    if registries.contains_text(kind, &old_text) {
        warn!(%kind, text = %old_text, "another tag still carries the deleted text; its note references are cleared too");
    }
    let notes_touched = notes.clear_references(kind, &old_text);

    debug!(%kind, text = %old_text, notes_touched, "deleted tag");
    Ok(CascadeReport {
        kind,
        old_text,
        new_text: None,
        notes_touched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Rejected;
    use crate::models::{NoteId, TagId};

    struct Fixture {
        registries: TagRegistries,
        notes: NoteRepository,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registries: TagRegistries::new(),
                notes: NoteRepository::new(),
            }
        }

        fn tagged_note(&mut self, content: &str, kind: TagKind, text: &str) -> NoteId {
            let id = self.notes.add(content).unwrap();
            self.notes.attach(id, kind, text).unwrap();
            id
        }
    }

    #[test]
    fn rename_rewrites_all_matching_references() {
        let mut fx = Fixture::new();
        let tag = fx.registries.add(TagKind::Place, "書斎", None).unwrap();
        let a = fx.tagged_note("a", TagKind::Place, "書斎");
        let b = fx.tagged_note("b", TagKind::Place, "書斎");
        let c = fx.tagged_note("c", TagKind::Place, "台所");

        let report = rename_tag(
            &mut fx.registries,
            &mut fx.notes,
            TagKind::Place,
            TagKey::Id(tag),
            "図書室",
            None,
        )
        .unwrap();

        assert_eq!(report.notes_touched, 2);
        assert_eq!(report.old_text, "書斎");
        assert_eq!(fx.notes.get(a).unwrap().place(), Some("図書室"));
        assert_eq!(fx.notes.get(b).unwrap().place(), Some("図書室"));
        assert_eq!(fx.notes.get(c).unwrap().place(), Some("台所"));
    }

    #[test]
    fn color_only_edit_touches_no_notes() {
        let mut fx = Fixture::new();
        let tag = fx.registries.add(TagKind::Character, "A", None).unwrap();
        fx.tagged_note("a", TagKind::Character, "A");

        let report = rename_tag(
            &mut fx.registries,
            &mut fx.notes,
            TagKind::Character,
            TagKey::Id(tag),
            "A",
            Some(Color::new("#00ff00")),
        )
        .unwrap();

        assert_eq!(report.notes_touched, 0);
        assert_eq!(
            fx.registries.color_of(TagKind::Character, "A"),
            "#00ff00"
        );
    }

    #[test]
    fn rejected_rename_leaves_notes_untouched() {
        let mut fx = Fixture::new();
        fx.registries.add(TagKind::Time, "朝", None).unwrap();
        let note = fx.tagged_note("a", TagKind::Time, "朝");

        let result = rename_tag(
            &mut fx.registries,
            &mut fx.notes,
            TagKind::Time,
            TagKey::Id(TagId::new(42)),
            "夜",
            None,
        );

        assert!(matches!(result, Err(Rejected::UnknownTag { .. })));
        assert_eq!(fx.notes.get(note).unwrap().time(), Some("朝"));
    }

    #[test]
    fn delete_clears_only_the_deleted_kind() {
        let mut fx = Fixture::new();
        fx.registries.add(TagKind::Date, "1日目", None).unwrap();
        let note = fx.tagged_note("a", TagKind::Date, "1日目");
        fx.notes.attach(note, TagKind::Time, "1日目").unwrap();

        let report = delete_tag(
            &mut fx.registries,
            &mut fx.notes,
            TagKind::Date,
            TagKey::Position(0),
        )
        .unwrap();

        assert_eq!(report.new_text, None);
        assert_eq!(report.notes_touched, 1);
        let note = fx.notes.get(note).unwrap();
        assert_eq!(note.date(), None);
        assert_eq!(note.time(), Some("1日目"));
    }

    #[test]
    fn delete_by_stale_position_hits_whatever_is_there_now() {
        let mut fx = Fixture::new();
        fx.registries.add(TagKind::Time, "09:00", None).unwrap();
        let ten = fx.registries.add(TagKind::Time, "10:00", None).unwrap();
        let note = fx.tagged_note("a", TagKind::Time, "10:00");

        delete_tag(
            &mut fx.registries,
            &mut fx.notes,
            TagKind::Time,
            TagKey::Position(0),
        )
        .unwrap();
        // position 0 now names "10:00"; the id still does too
        assert_eq!(
            fx.registries
                .entry(TagKind::Time, TagKey::Id(ten))
                .unwrap()
                .text,
            "10:00"
        );
        assert_eq!(fx.notes.get(note).unwrap().time(), Some("10:00"));
    }
}
