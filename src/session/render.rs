//! Text and JSON views of workspace state.

use serde_json::{Value, json};

use crate::models::{Color, Note, TagEntry, TagKind};
use crate::service::Workspace;
use crate::timeline::{Bucket, CharacterGroup, DateGroup, FoldState, PlaceGroup, TimeGroup};

const INDENT: &str = "  ";

/// Alpha for bucket background tints.
const TINT_ALPHA: f64 = 0.1;
/// Alpha for place bucket borders.
const BORDER_ALPHA: f64 = 0.3;

/// One line per note: id, content, then every reference it carries.
pub fn notes_text(notes: &[Note]) -> String {
    if notes.is_empty() {
        return "no notes".to_string();
    }
    notes.iter().map(note_line).collect::<Vec<_>>().join("\n")
}

fn note_line(note: &Note) -> String {
    let mut line = format!("#{} {}", note.id(), note.content());
    for kind in TagKind::ALL {
        if let Some(value) = note.reference(kind) {
            line.push_str(&format!(" [{kind}: {value}]"));
        }
    }
    line
}

pub fn notes_json(notes: &[Note]) -> Value {
    json!({ "notes": notes })
}

/// One line per tag: display position, id, text and color if any.
pub fn tags_text(kind: TagKind, tags: &[TagEntry]) -> String {
    if tags.is_empty() {
        return format!("no {kind} tags");
    }
    tags.iter()
        .enumerate()
        .map(|(position, tag)| match &tag.color {
            Some(color) => format!("@{position} [{}] {} {color}", tag.id, tag.text),
            None => format!("@{position} [{}] {}", tag.id, tag.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn tags_json(kind: TagKind, tags: &[TagEntry]) -> Value {
    json!({ "kind": kind, "tags": tags })
}

/// Renders the timeline as an indented outline.
///
/// Buckets are prefixed with their fold address (`[d]`, `[d.t]`,
/// `[d.t.p]`) so they can be toggled. Folded buckets show their note count
/// and hide their contents.
pub fn timeline_text(
    workspace: &Workspace,
    dates: &[DateGroup<'_>],
    folds: &FoldState,
    places: bool,
) -> String {
    if dates.is_empty() {
        return "no notes".to_string();
    }

    let labels = &workspace.timeline_options().labels;
    let mut out = Vec::new();

    for (d, date) in dates.iter().enumerate() {
        let header = format!("[{d}] {}", date.date.label(&labels.date));
        if !folds.is_date_expanded(d) {
            out.push(folded(header, date.note_count()));
            continue;
        }
        out.push(header);

        for (t, time) in date.times.iter().enumerate() {
            let header = format!("{INDENT}[{d}.{t}] {}", time.time.label(&labels.time));
            if !folds.is_time_expanded(d, t) {
                out.push(folded(header, time.note_count()));
                continue;
            }
            out.push(header);

            if places {
                for (p, place) in time.by_place().iter().enumerate() {
                    let header = format!(
                        "{INDENT}{INDENT}[{d}.{t}.{p}] {}",
                        tag_label(workspace, TagKind::Place, &place.place)
                    );
                    if !folds.is_place_expanded(d, t, p) {
                        let count = place.characters.iter().map(|c| c.notes.len()).sum();
                        out.push(folded(header, count));
                        continue;
                    }
                    out.push(header);
                    push_characters(&mut out, workspace, &place.characters, 3);
                }
            } else {
                push_characters(&mut out, workspace, &time.characters, 2);
            }
        }
    }
    out.join("\n")
}

fn push_characters(
    out: &mut Vec<String>,
    workspace: &Workspace,
    groups: &[CharacterGroup<'_>],
    depth: usize,
) {
    let indent = INDENT.repeat(depth);
    for group in groups {
        out.push(format!(
            "{indent}{}",
            tag_label(workspace, TagKind::Character, &group.character)
        ));
        for note in &group.notes {
            out.push(format!("{indent}{INDENT}#{} {}", note.id(), note.content()));
        }
    }
}

fn folded(header: String, count: usize) -> String {
    let noun = if count == 1 { "note" } else { "notes" };
    format!("{header} (folded, {count} {noun})")
}

/// Sentinel or name, with the registered color for known buckets.
fn tag_label(workspace: &Workspace, kind: TagKind, bucket: &Bucket) -> String {
    let labels = &workspace.timeline_options().labels;
    let sentinel = match kind {
        TagKind::Character => &labels.character,
        TagKind::Place => &labels.place,
        TagKind::Time => &labels.time,
        TagKind::Date => &labels.date,
    };
    match bucket.as_known() {
        Some(name) => format!("{name} ({})", workspace.color_of(kind, name)),
        None => sentinel.clone(),
    }
}

/// Structured timeline with display labels, fold flags and colors.
pub fn timeline_json(
    workspace: &Workspace,
    dates: &[DateGroup<'_>],
    folds: &FoldState,
    places: bool,
) -> Value {
    let labels = &workspace.timeline_options().labels;
    let dates: Vec<Value> = dates
        .iter()
        .enumerate()
        .map(|(d, date)| {
            let times: Vec<Value> = date
                .times
                .iter()
                .enumerate()
                .map(|(t, time)| time_json(workspace, time, folds, (d, t), places))
                .collect();
            json!({
                "label": date.date.label(&labels.date),
                "unknown": date.date.is_unknown(),
                "expanded": folds.is_date_expanded(d),
                "times": times,
            })
        })
        .collect();
    json!({ "timeline": dates })
}

fn time_json(
    workspace: &Workspace,
    time: &TimeGroup<'_>,
    folds: &FoldState,
    (d, t): (usize, usize),
    places: bool,
) -> Value {
    let labels = &workspace.timeline_options().labels;
    let mut value = json!({
        "label": time.time.label(&labels.time),
        "unknown": time.time.is_unknown(),
        "expanded": folds.is_time_expanded(d, t),
    });

    if places {
        let places: Vec<Value> = time
            .by_place()
            .iter()
            .enumerate()
            .map(|(p, place)| place_json(workspace, place, folds.is_place_expanded(d, t, p)))
            .collect();
        value["places"] = Value::Array(places);
    } else {
        value["characters"] = characters_json(workspace, &time.characters);
    }
    value
}

fn place_json(workspace: &Workspace, place: &PlaceGroup<'_>, expanded: bool) -> Value {
    json!({
        "label": place.place.label(&workspace.timeline_options().labels.place),
        "unknown": place.place.is_unknown(),
        "color": bucket_color(workspace, TagKind::Place, &place.place),
        "tint": bucket_tint(workspace, TagKind::Place, &place.place, TINT_ALPHA),
        "border": bucket_tint(workspace, TagKind::Place, &place.place, BORDER_ALPHA),
        "expanded": expanded,
        "characters": characters_json(workspace, &place.characters),
    })
}

fn characters_json(workspace: &Workspace, groups: &[CharacterGroup<'_>]) -> Value {
    let sentinel = &workspace.timeline_options().labels.character;
    groups
        .iter()
        .map(|group| {
            json!({
                "label": group.character.label(sentinel),
                "unknown": group.character.is_unknown(),
                "color": bucket_color(workspace, TagKind::Character, &group.character),
                "tint": bucket_tint(workspace, TagKind::Character, &group.character, TINT_ALPHA),
                "notes": group.notes,
            })
        })
        .collect()
}

fn bucket_color(workspace: &Workspace, kind: TagKind, bucket: &Bucket) -> Option<String> {
    bucket
        .as_known()
        .map(|name| workspace.color_of(kind, name).to_string())
}

fn bucket_tint(workspace: &Workspace, kind: TagKind, bucket: &Bucket, alpha: f64) -> Option<String> {
    bucket_color(workspace, kind, bucket).map(|color| Color::new(color).with_alpha(alpha))
}
