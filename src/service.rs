use time::OffsetDateTime;
use tracing::{debug, trace};

use crate::cascade::{self, CascadeReport};
use crate::config::Config;
use crate::drag::{DragPayload, DragSession, DropAction, DropMode};
use crate::error::{Outcome, Rejected};
use crate::models::{Color, Note, NoteId, TagEntry, TagId, TagKey, TagKind};
use crate::notes::NoteRepository;
use crate::registry::TagRegistries;
use crate::timeline::{self, DateGroup, TimelineOptions};

/// The application state: four tag registries, the notes, and the drag
/// in flight.
///
/// Workspace is the only owner of this state. Every operation that has to
/// touch both a registry and the notes takes `&mut self`, so a registry
/// write and its note cascade can never interleave with another mutation.
///
/// Mutations return an [`Outcome`]. A rejected operation leaves the
/// workspace exactly as it was; callers that don't care why can drop the
/// error.
///
/// # Examples
///
/// ```
/// use casebook::{TagKind, Workspace};
///
/// let mut workspace = Workspace::new();
/// let note = workspace.add_note("Aが包丁を持っていた").unwrap();
/// workspace.add_tag(TagKind::Character, "A", None).unwrap();
/// workspace.attach_tag(note, TagKind::Character, "A").unwrap();
///
/// assert_eq!(workspace.get_note(note).unwrap().character(), Some("A"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    registries: TagRegistries,
    notes: NoteRepository,
    drag: DragSession,
    timeline: TimelineOptions,
    drop_mode: DropMode,
}

impl Workspace {
    /// Creates an empty workspace with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty workspace using the drop mode and timeline options
    /// from `config`.
    pub fn with_config(config: &Config) -> Self {
        Self {
            timeline: config.timeline_options(),
            drop_mode: config.drop_mode,
            ..Self::default()
        }
    }

    pub fn drop_mode(&self) -> DropMode {
        self.drop_mode
    }

    pub fn set_drop_mode(&mut self, mode: DropMode) {
        self.drop_mode = mode;
    }

    pub fn timeline_options(&self) -> &TimelineOptions {
        &self.timeline
    }

    /// Direct read access to the registries.
    pub fn registries(&self) -> &TagRegistries {
        &self.registries
    }

    // Notes

    /// Creates a note with no references.
    ///
    /// Whitespace-only content is rejected.
    pub fn add_note(&mut self, content: &str) -> Outcome<NoteId> {
        self.add_note_at(content, OffsetDateTime::now_utc())
    }

    /// Creates a note with an explicit creation time.
    pub fn add_note_at(&mut self, content: &str, created_at: OffsetDateTime) -> Outcome<NoteId> {
        let id = logged("add_note", self.notes.add_at(content, created_at))?;
        debug!(note = %id, "added note");
        Ok(id)
    }

    /// Deletes a note. Returns false if no note had that id.
    pub fn delete_note(&mut self, id: NoteId) -> bool {
        let removed = self.notes.remove(id);
        if removed {
            debug!(note = %id, "deleted note");
        } else {
            trace!(note = %id, "delete_note ignored: no such note");
        }
        removed
    }

    /// Replaces a note's content. Any text is accepted, including empty.
    pub fn edit_note_content(&mut self, id: NoteId, content: &str) -> Outcome {
        logged("edit_note_content", self.notes.set_content(id, content))?;
        debug!(note = %id, "edited note");
        Ok(())
    }

    pub fn get_note(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    /// Returns every note in creation order.
    pub fn list_notes(&self) -> &[Note] {
        self.notes.as_slice()
    }

    // Tags

    /// Registers a tag. `color` only applies to characters and places.
    ///
    /// Blank names are rejected, as are time or date labels that already
    /// exist.
    pub fn add_tag(&mut self, kind: TagKind, name: &str, color: Option<Color>) -> Outcome<TagId> {
        let id = logged("add_tag", self.registries.add(kind, name, color))?;
        debug!(%kind, tag = %id, name, "added tag");
        Ok(id)
    }

    /// Renames (and optionally recolors) a tag, then rewrites every note
    /// that referenced the old name.
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook::{TagKey, TagKind, Workspace};
    ///
    /// let mut workspace = Workspace::new();
    /// let tag = workspace.add_tag(TagKind::Place, "書斎", None).unwrap();
    /// let note = workspace.add_note("窓が開いていた").unwrap();
    /// workspace.attach_tag(note, TagKind::Place, "書斎").unwrap();
    ///
    /// let report = workspace
    ///     .rename_tag(TagKind::Place, TagKey::Id(tag), "図書室", None)
    ///     .unwrap();
    ///
    /// assert_eq!(report.notes_touched, 1);
    /// assert_eq!(workspace.get_note(note).unwrap().place(), Some("図書室"));
    /// ```
    pub fn rename_tag(
        &mut self,
        kind: TagKind,
        key: TagKey,
        new_name: &str,
        new_color: Option<Color>,
    ) -> Outcome<CascadeReport> {
        logged(
            "rename_tag",
            cascade::rename_tag(
                &mut self.registries,
                &mut self.notes,
                kind,
                key,
                new_name,
                new_color,
            ),
        )
    }

    /// Deletes a tag and clears every note reference to it.
    pub fn delete_tag(&mut self, kind: TagKind, key: TagKey) -> Outcome<CascadeReport> {
        logged(
            "delete_tag",
            cascade::delete_tag(&mut self.registries, &mut self.notes, kind, key),
        )
    }

    /// Lists the tags of `kind` in display order: insertion order for
    /// characters and places, sorted for times and dates.
    pub fn list_tags(&self, kind: TagKind) -> Vec<TagEntry> {
        self.registries.list(kind)
    }

    /// Returns the color registered for `name`, or `#000000` if there is
    /// none.
    pub fn color_of(&self, kind: TagKind, name: &str) -> &str {
        self.registries.color_of(kind, name)
    }

    // References

    /// Points a note's `kind` reference at `value`, replacing any previous
    /// reference.
    ///
    /// `value` must be the text of a live tag of that kind, otherwise the
    /// reference would dangle and the call is rejected.
    pub fn attach_tag(&mut self, id: NoteId, kind: TagKind, value: &str) -> Outcome {
        logged("attach_tag", self.attach_registered(id, kind, value))?;
        debug!(note = %id, %kind, value, "attached tag");
        Ok(())
    }

    /// Clears a note's `kind` reference and returns what it held.
    ///
    /// Detaching an empty slot succeeds with `None`, so detaching twice is
    /// the same as detaching once.
    pub fn detach_tag(&mut self, id: NoteId, kind: TagKind) -> Outcome<Option<String>> {
        let previous = logged("detach_tag", self.notes.detach(id, kind))?;
        debug!(note = %id, %kind, previous = previous.as_deref(), "detached tag");
        Ok(previous)
    }

    fn attach_registered(&mut self, id: NoteId, kind: TagKind, value: &str) -> Outcome {
        if value.trim().is_empty() {
            return Err(Rejected::EmptyText);
        }
        if !self.registries.contains_text(kind, value) {
            return Err(Rejected::UnregisteredText {
                kind,
                text: value.to_string(),
            });
        }
        self.notes.attach(id, kind, value)
    }

    // Drag and drop

    /// Starts dragging a tag and returns the serialized payload.
    pub fn begin_drag(&mut self, kind: TagKind, key: TagKey) -> Outcome<String> {
        let entry = self
            .registries
            .entry(kind, key)
            .ok_or(Rejected::UnknownTag { kind, key });
        let entry = logged("begin_drag", entry)?;
        Ok(self.drag.begin(DragPayload::from(entry)))
    }

    /// Ends the drag in flight, whether or not anything was dropped.
    pub fn end_drag(&mut self) {
        if self.drag.end().is_some() {
            trace!("drag ended");
        }
    }

    /// Returns the drag in flight, if any.
    pub fn dragging(&self) -> Option<&DragPayload> {
        self.drag.in_flight()
    }

    /// Applies a dropped payload to a note.
    ///
    /// A missing or malformed payload is rejected without touching the
    /// note. What a well-formed payload does depends on the [`DropMode`].
    /// The drag in flight ends either way.
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook::{TagKey, TagKind, Workspace};
    ///
    /// let mut workspace = Workspace::new();
    /// let note = workspace.add_note("Aが包丁を持っていた").unwrap();
    /// let tag = workspace.add_tag(TagKind::Character, "A", None).unwrap();
    ///
    /// let payload = workspace.begin_drag(TagKind::Character, TagKey::Id(tag)).unwrap();
    /// workspace.drop_on_note(note, Some(&payload)).unwrap();
    ///
    /// assert_eq!(workspace.get_note(note).unwrap().character(), Some("A"));
    /// assert!(workspace.drop_on_note(note, Some("{oops")).is_err());
    /// assert_eq!(workspace.get_note(note).unwrap().character(), Some("A"));
    /// ```
    pub fn drop_on_note(&mut self, id: NoteId, payload: Option<&str>) -> Outcome<DropAction> {
        self.drag.end();
        let applied = logged("drop_on_note", self.apply_drop(id, payload))?;
        debug!(note = %id, action = ?applied, "dropped tag");
        Ok(applied)
    }

    fn apply_drop(&mut self, id: NoteId, payload: Option<&str>) -> Outcome<DropAction> {
        let payload = DragPayload::decode(payload)?;
        let current = self
            .notes
            .get(id)
            .ok_or(Rejected::UnknownNote(id))?
            .reference(payload.kind);

        let action = self.drop_mode.resolve(current, &payload);
        match &action {
            DropAction::Attach { kind, text } => self.attach_registered(id, *kind, text)?,
            DropAction::Detach { kind } => {
                self.notes.detach(id, *kind)?;
            }
        }
        Ok(action)
    }

    // Timeline

    /// Groups the current notes into the date → time → character timeline.
    ///
    /// Recomputed on every call.
    pub fn group_for_timeline(&self) -> Vec<DateGroup<'_>> {
        timeline::group_with(self.notes.as_slice(), &self.timeline)
    }
}

fn logged<T>(operation: &str, outcome: Outcome<T>) -> Outcome<T> {
    if let Err(reason) = &outcome {
        trace!(operation, %reason, "ignored");
    }
    outcome
}
