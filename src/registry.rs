//! The four tag registries.
//!
//! Characters and places are named, colored entities kept in insertion
//! order. Times and dates are unique text labels kept sorted. Registries
//! never touch notes; every mutation that can invalidate a note reference
//! hands back the affected text so the cascade can follow up.

mod labels;
mod named;

pub use labels::LabelRegistry;
pub use named::NamedRegistry;

use crate::error::Outcome;
use crate::models::{Color, DEFAULT_COLOR, TagEntry, TagId, TagKey, TagKind};

/// All four registries, addressed by [`TagKind`].
#[derive(Debug, Clone)]
pub struct TagRegistries {
    characters: NamedRegistry,
    places: NamedRegistry,
    times: LabelRegistry,
    dates: LabelRegistry,
}

impl Default for TagRegistries {
    fn default() -> Self {
        Self::new()
    }
}

impl TagRegistries {
    /// Creates four empty registries.
    pub fn new() -> Self {
        Self {
            characters: NamedRegistry::new(TagKind::Character),
            places: NamedRegistry::new(TagKind::Place),
            times: LabelRegistry::new(TagKind::Time),
            dates: LabelRegistry::new(TagKind::Date),
        }
    }

    pub fn characters(&self) -> &NamedRegistry {
        &self.characters
    }

    pub fn places(&self) -> &NamedRegistry {
        &self.places
    }

    pub fn times(&self) -> &LabelRegistry {
        &self.times
    }

    pub fn dates(&self) -> &LabelRegistry {
        &self.dates
    }

    /// Adds a tag of `kind`. `color` is ignored for time and date labels.
    pub fn add(&mut self, kind: TagKind, text: &str, color: Option<Color>) -> Outcome<TagId> {
        match kind {
            TagKind::Character => self.characters.add(text, color),
            TagKind::Place => self.places.add(text, color),
            TagKind::Time => self.times.add(text),
            TagKind::Date => self.dates.add(text),
        }
    }

    /// Renames a tag of `kind` and returns its previous text.
    pub fn rename(
        &mut self,
        kind: TagKind,
        key: TagKey,
        new_text: &str,
        new_color: Option<Color>,
    ) -> Outcome<String> {
        match kind {
            TagKind::Character => self.characters.rename(key, new_text, new_color),
            TagKind::Place => self.places.rename(key, new_text, new_color),
            TagKind::Time => self.times.rename(key, new_text),
            TagKind::Date => self.dates.rename(key, new_text),
        }
    }

    /// Removes a tag of `kind` and returns its text.
    pub fn remove(&mut self, kind: TagKind, key: TagKey) -> Outcome<String> {
        match kind {
            TagKind::Character => self.characters.remove(key),
            TagKind::Place => self.places.remove(key),
            TagKind::Time => self.times.remove(key),
            TagKind::Date => self.dates.remove(key),
        }
    }

    /// Returns the listing row for one tag.
    pub fn entry(&self, kind: TagKind, key: TagKey) -> Option<TagEntry> {
        match kind {
            TagKind::Character => self.characters.get(key).map(|tag| (kind, tag).into()),
            TagKind::Place => self.places.get(key).map(|tag| (kind, tag).into()),
            TagKind::Time => self.times.get(key).map(|label| (kind, label).into()),
            TagKind::Date => self.dates.get(key).map(|label| (kind, label).into()),
        }
    }

    /// Lists every tag of `kind` in display order.
    pub fn list(&self, kind: TagKind) -> Vec<TagEntry> {
        match kind {
            TagKind::Character => self.characters.iter().map(|tag| (kind, tag).into()).collect(),
            TagKind::Place => self.places.iter().map(|tag| (kind, tag).into()).collect(),
            TagKind::Time => self.times.iter().map(|label| (kind, label).into()).collect(),
            TagKind::Date => self.dates.iter().map(|label| (kind, label).into()).collect(),
        }
    }

    /// Looks up a color by name, defaulting to [`DEFAULT_COLOR`].
    ///
    /// Labels carry no color, so time and date lookups always return the
    /// default.
    pub fn color_of(&self, kind: TagKind, name: &str) -> &str {
        match kind {
            TagKind::Character => self.characters.color_of(name),
            TagKind::Place => self.places.color_of(name),
            TagKind::Time | TagKind::Date => DEFAULT_COLOR,
        }
    }

    /// Returns true if some live tag of `kind` has exactly this text.
    pub fn contains_text(&self, kind: TagKind, text: &str) -> bool {
        match kind {
            TagKind::Character => self.characters.find_by_name(text).is_some(),
            TagKind::Place => self.places.find_by_name(text).is_some(),
            TagKind::Time => self.times.contains(text),
            TagKind::Date => self.dates.contains(text),
        }
    }
}
