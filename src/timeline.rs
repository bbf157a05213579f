//! Timeline grouping.
//!
//! Derives the nested date → time → character view (and the place
//! re-projection inside each time bucket) from a snapshot of notes. Nothing
//! is cached: callers regroup on every read, and the groups borrow the
//! notes so the snapshot cannot be mutated through them.
//!
//! Ordering rules:
//! - date buckets appear in the order their key is first seen in the
//!   snapshot, unless [`TimelineOptions::unknown_date_last`] is set;
//! - time buckets sort ascending by label text, with the unknown bucket
//!   always last;
//! - character buckets sort ascending by display label, the unknown
//!   bucket included under its sentinel label;
//! - place buckets and the characters inside them keep encounter order.

mod expansion;

pub use expansion::FoldState;

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::models::Note;

/// Bucket key for one level of the timeline.
///
/// `Unknown` is a separate variant rather than a reserved string, so a
/// label whose text happens to equal a sentinel never merges with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Known(String),
    Unknown,
}

impl Bucket {
    /// Builds a bucket from a note reference.
    pub fn from_reference(reference: Option<&str>) -> Self {
        match reference {
            Some(text) => Self::Known(text.to_string()),
            None => Self::Unknown,
        }
    }

    /// Returns the display label, substituting `sentinel` for `Unknown`.
    pub fn label<'a>(&'a self, sentinel: &'a str) -> &'a str {
        match self {
            Self::Known(text) => text,
            Self::Unknown => sentinel,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns the referenced text for known buckets.
    pub fn as_known(&self) -> Option<&str> {
        match self {
            Self::Known(text) => Some(text),
            Self::Unknown => None,
        }
    }
}

/// Display labels for the unknown buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentinelLabels {
    pub date: String,
    pub time: String,
    pub character: String,
    pub place: String,
}

impl Default for SentinelLabels {
    fn default() -> Self {
        Self {
            date: "日付不明".to_string(),
            time: "--:--".to_string(),
            character: "人物不明".to_string(),
            place: "場所不明".to_string(),
        }
    }
}

/// Knobs for [`group_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineOptions {
    pub labels: SentinelLabels,
    /// Move the unknown-date bucket after every known date.
    pub unknown_date_last: bool,
}

/// All notes sharing one date reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateGroup<'a> {
    pub date: Bucket,
    pub times: Vec<TimeGroup<'a>>,
}

/// All notes of one date sharing one time reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeGroup<'a> {
    pub time: Bucket,
    pub characters: Vec<CharacterGroup<'a>>,
}

/// Notes sharing one character reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterGroup<'a> {
    pub character: Bucket,
    pub notes: Vec<&'a Note>,
}

/// Notes of one time bucket sharing one place, split by owning character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceGroup<'a> {
    pub place: Bucket,
    pub characters: Vec<CharacterGroup<'a>>,
}

impl<'a> DateGroup<'a> {
    /// Iterates every note in this date, in display order.
    pub fn notes(&self) -> impl Iterator<Item = &'a Note> + '_ {
        self.times.iter().flat_map(|group| group.notes())
    }

    pub fn note_count(&self) -> usize {
        self.times.iter().map(TimeGroup::note_count).sum()
    }
}

impl<'a> TimeGroup<'a> {
    /// Iterates every note in this time bucket, in display order.
    pub fn notes(&self) -> impl Iterator<Item = &'a Note> + '_ {
        self.characters
            .iter()
            .flat_map(|group| group.notes.iter().copied())
    }

    pub fn note_count(&self) -> usize {
        self.characters.iter().map(|group| group.notes.len()).sum()
    }

    /// Re-projects this time bucket by place.
    ///
    /// Places appear in the order first met while walking the character
    /// buckets; inside each place, notes stay grouped under the character
    /// that owns them. Each note lands in exactly one place group, since a
    /// note carries a single character and a single place.
    pub fn by_place(&self) -> Vec<PlaceGroup<'a>> {
        let owned = self.characters.iter().flat_map(|group| {
            group
                .notes
                .iter()
                .map(move |note| (group.character.clone(), *note))
        });

        partition(owned, |(_, note)| Bucket::from_reference(note.place()))
            .into_iter()
            .map(|(place, members)| PlaceGroup {
                place,
                characters: partition(members, |(character, _)| character.clone())
                    .into_iter()
                    .map(|(character, members)| CharacterGroup {
                        character,
                        notes: members.into_iter().map(|(_, note)| note).collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Groups notes into the date → time → character timeline with default
/// options.
///
/// # Examples
///
/// ```
/// use casebook::{NoteBuilder, NoteId, TagKind};
/// use casebook::timeline::{Bucket, group_for_timeline};
///
/// let notes = vec![
///     NoteBuilder::new().id(NoteId::new(1)).content("a")
///         .reference(TagKind::Date, "2日目").build(),
///     NoteBuilder::new().id(NoteId::new(2)).content("b")
///         .reference(TagKind::Date, "1日目").build(),
/// ];
///
/// let dates = group_for_timeline(&notes);
/// assert_eq!(dates[0].date, Bucket::Known("2日目".to_string()));
/// assert_eq!(dates[1].date, Bucket::Known("1日目".to_string()));
/// ```
pub fn group_for_timeline(notes: &[Note]) -> Vec<DateGroup<'_>> {
    group_with(notes, &TimelineOptions::default())
}

/// Groups notes into the date → time → character timeline.
pub fn group_with<'a>(notes: &'a [Note], options: &TimelineOptions) -> Vec<DateGroup<'a>> {
    let mut dates: Vec<DateGroup<'a>> =
        partition(notes.iter(), |note| Bucket::from_reference(note.date()))
            .into_iter()
            .map(|(date, members)| DateGroup {
                date,
                times: group_times(members, &options.labels.character),
            })
            .collect();

    if options.unknown_date_last {
        // stable, so known dates keep their encounter order
        dates.sort_by_key(|group| group.date.is_unknown());
    }
    dates
}

fn group_times<'a>(notes: Vec<&'a Note>, character_sentinel: &str) -> Vec<TimeGroup<'a>> {
    let mut times = partition(notes, |note| Bucket::from_reference(note.time()));
    times.sort_by(|(a, _), (b, _)| compare_times(a, b));

    times
        .into_iter()
        .map(|(time, members)| TimeGroup {
            time,
            characters: group_characters(members, character_sentinel),
        })
        .collect()
}

fn group_characters<'a>(notes: Vec<&'a Note>, sentinel: &str) -> Vec<CharacterGroup<'a>> {
    let mut characters = partition(notes, |note| Bucket::from_reference(note.character()));
    characters.sort_by(|(a, _), (b, _)| {
        a.label(sentinel)
            .cmp(b.label(sentinel))
            .then_with(|| a.is_unknown().cmp(&b.is_unknown()))
    });

    characters
        .into_iter()
        .map(|(character, notes)| CharacterGroup { character, notes })
        .collect()
}

/// Lexicographic on label text; the unknown bucket sorts after everything.
fn compare_times(a: &Bucket, b: &Bucket) -> Ordering {
    match (a, b) {
        (Bucket::Known(a), Bucket::Known(b)) => a.cmp(b),
        (Bucket::Known(_), Bucket::Unknown) => Ordering::Less,
        (Bucket::Unknown, Bucket::Known(_)) => Ordering::Greater,
        (Bucket::Unknown, Bucket::Unknown) => Ordering::Equal,
    }
}

/// Splits items by key, keeping keys in first-seen order and items in
/// input order within each key.
fn partition<T, I, F>(items: I, key: F) -> Vec<(Bucket, Vec<T>)>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> Bucket,
{
    let mut slots: HashMap<Bucket, usize> = HashMap::new();
    let mut groups: Vec<(Bucket, Vec<T>)> = Vec::new();

    for item in items {
        let bucket = key(&item);
        match slots.get(&bucket) {
            Some(&slot) => groups[slot].1.push(item),
            None => {
                slots.insert(bucket.clone(), groups.len());
                groups.push((bucket, vec![item]));
            }
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NoteBuilder, NoteId, TagKind};

    fn note(id: i64, refs: &[(TagKind, &str)]) -> Note {
        refs.iter()
            .fold(
                NoteBuilder::new()
                    .id(NoteId::new(id))
                    .content(format!("note {id}")),
                |builder, (kind, text)| builder.reference(*kind, *text),
            )
            .build()
    }

    fn known(text: &str) -> Bucket {
        Bucket::Known(text.to_string())
    }

    fn ids<'a>(notes: impl Iterator<Item = &'a Note>) -> Vec<i64> {
        notes.map(|note| note.id().get()).collect()
    }

    #[test]
    fn empty_snapshot_yields_no_groups() {
        assert!(group_for_timeline(&[]).is_empty());
    }

    #[test]
    fn dates_follow_first_seen_order() {
        let notes = vec![
            note(1, &[(TagKind::Date, "2日目")]),
            note(2, &[]),
            note(3, &[(TagKind::Date, "1日目")]),
            note(4, &[(TagKind::Date, "2日目")]),
        ];

        let dates = group_for_timeline(&notes);
        let keys: Vec<&Bucket> = dates.iter().map(|group| &group.date).collect();

        assert_eq!(keys, vec![&known("2日目"), &Bucket::Unknown, &known("1日目")]);
        assert_eq!(ids(dates[0].notes()), vec![1, 4]);
    }

    #[test]
    fn unknown_date_can_be_moved_last() {
        let notes = vec![
            note(1, &[]),
            note(2, &[(TagKind::Date, "2日目")]),
            note(3, &[(TagKind::Date, "1日目")]),
        ];
        let options = TimelineOptions {
            unknown_date_last: true,
            ..Default::default()
        };

        let dates = group_with(&notes, &options);
        let keys: Vec<&Bucket> = dates.iter().map(|group| &group.date).collect();

        assert_eq!(keys, vec![&known("2日目"), &known("1日目"), &Bucket::Unknown]);
    }

    #[test]
    fn unknown_time_sorts_after_every_known_time() {
        let notes = vec![
            note(1, &[]),
            note(2, &[(TagKind::Time, "10:00")]),
            note(3, &[(TagKind::Time, "09:00")]),
            // a real label that looks like the sentinel is still a known time
            note(4, &[(TagKind::Time, "~~")]),
        ];

        let dates = group_for_timeline(&notes);
        let times: Vec<&Bucket> = dates[0].times.iter().map(|group| &group.time).collect();

        assert_eq!(
            times,
            vec![&known("09:00"), &known("10:00"), &known("~~"), &Bucket::Unknown]
        );
    }

    #[test]
    fn characters_sort_by_label_with_sentinel_included() {
        let labels = SentinelLabels {
            character: "M".to_string(),
            ..Default::default()
        };
        let options = TimelineOptions {
            labels,
            ..Default::default()
        };
        let notes = vec![
            note(1, &[(TagKind::Character, "Z")]),
            note(2, &[]),
            note(3, &[(TagKind::Character, "A")]),
        ];

        let dates = group_with(&notes, &options);
        let characters: Vec<&Bucket> = dates[0].times[0]
            .characters
            .iter()
            .map(|group| &group.character)
            .collect();

        assert_eq!(characters, vec![&known("A"), &Bucket::Unknown, &known("Z")]);
    }

    #[test]
    fn sentinel_text_never_merges_with_unknown_bucket() {
        let sentinel = SentinelLabels::default().date;
        let notes = vec![note(1, &[(TagKind::Date, sentinel.as_str())]), note(2, &[])];

        let dates = group_for_timeline(&notes);

        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].date, Bucket::Known(sentinel));
        assert_eq!(dates[1].date, Bucket::Unknown);
    }

    #[test]
    fn character_tie_on_label_puts_known_first() {
        let sentinel = SentinelLabels::default().character;
        let notes = vec![note(1, &[]), note(2, &[(TagKind::Character, sentinel.as_str())])];

        let dates = group_for_timeline(&notes);
        let characters = &dates[0].times[0].characters;

        assert_eq!(characters.len(), 2);
        assert_eq!(characters[0].character, Bucket::Known(sentinel));
        assert!(characters[1].character.is_unknown());
    }

    #[test]
    fn every_note_appears_exactly_once() {
        let notes = vec![
            note(1, &[(TagKind::Date, "1日目"), (TagKind::Time, "朝")]),
            note(2, &[(TagKind::Date, "1日目"), (TagKind::Character, "A")]),
            note(3, &[(TagKind::Time, "夜"), (TagKind::Character, "B")]),
            note(4, &[(TagKind::Date, "2日目"), (TagKind::Time, "朝")]),
            note(5, &[]),
        ];

        let dates = group_for_timeline(&notes);
        let mut seen: Vec<i64> = dates.iter().flat_map(|group| ids(group.notes())).collect();
        seen.sort();

        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        let total: usize = dates.iter().map(DateGroup::note_count).sum();
        assert_eq!(total, notes.len());
    }

    #[test]
    fn by_place_regroups_with_owning_character() {
        let notes = vec![
            note(1, &[(TagKind::Character, "B"), (TagKind::Place, "台所")]),
            note(2, &[(TagKind::Character, "A"), (TagKind::Place, "書斎")]),
            note(3, &[(TagKind::Character, "A"), (TagKind::Place, "台所")]),
            note(4, &[(TagKind::Character, "B")]),
        ];

        let dates = group_for_timeline(&notes);
        let places = dates[0].times[0].by_place();

        // characters are walked A then B, so 書斎 (from A) is met first
        let keys: Vec<&Bucket> = places.iter().map(|group| &group.place).collect();
        assert_eq!(keys, vec![&known("書斎"), &known("台所"), &Bucket::Unknown]);

        let kitchen = &places[1];
        assert_eq!(kitchen.characters.len(), 2);
        assert_eq!(kitchen.characters[0].character, known("A"));
        assert_eq!(ids(kitchen.characters[0].notes.iter().copied()), vec![3]);
        assert_eq!(kitchen.characters[1].character, known("B"));
        assert_eq!(ids(kitchen.characters[1].notes.iter().copied()), vec![1]);

        let placed: usize = places
            .iter()
            .flat_map(|group| &group.characters)
            .map(|group| group.notes.len())
            .sum();
        assert_eq!(placed, 4);
    }
}
