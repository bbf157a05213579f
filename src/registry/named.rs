use crate::error::{Outcome, Rejected};
use crate::models::{Color, DEFAULT_COLOR, NamedTag, TagId, TagKey, TagKind};

/// Registry of named, colored tags (characters or places).
///
/// Entries keep insertion order, which is also the display order. Names are
/// not forced to be unique, but notes reference tags by name, so two entries
/// sharing a name are indistinguishable to the cascade.
#[derive(Debug, Clone)]
pub struct NamedRegistry {
    kind: TagKind,
    tags: Vec<NamedTag>,
    next_id: i64,
}

impl NamedRegistry {
    /// Creates an empty registry for `kind`.
    pub fn new(kind: TagKind) -> Self {
        Self {
            kind,
            tags: Vec::new(),
            next_id: 1,
        }
    }

    /// Returns the kind of tag this registry holds.
    pub fn kind(&self) -> TagKind {
        self.kind
    }

    /// Appends a new tag and returns its id.
    ///
    /// A missing color falls back to [`DEFAULT_COLOR`].
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook::{Color, TagKind};
    /// use casebook::registry::NamedRegistry;
    ///
    /// let mut characters = NamedRegistry::new(TagKind::Character);
    /// let id = characters.add("A", Some(Color::new("#ff0000"))).unwrap();
    ///
    /// assert_eq!(characters.color_of("A"), "#ff0000");
    /// assert!(characters.add("   ", None).is_err());
    /// assert_eq!(characters.len(), 1);
    /// # let _ = id;
    /// ```
    pub fn add(&mut self, name: &str, color: Option<Color>) -> Outcome<TagId> {
        if name.trim().is_empty() {
            return Err(Rejected::EmptyText);
        }

        let id = TagId::new(self.next_id);
        self.next_id += 1;
        self.tags
            .push(NamedTag::new(id, name, color.unwrap_or_default()));
        Ok(id)
    }

    /// Renames a tag in place, optionally recoloring it.
    ///
    /// Returns the name the tag had before, which drives the cascade.
    /// The color is kept when `new_color` is `None`. An edit that changes
    /// neither name nor color is rejected as [`Rejected::Unchanged`].
    pub fn rename(
        &mut self,
        key: TagKey,
        new_name: &str,
        new_color: Option<Color>,
    ) -> Outcome<String> {
        let index = self.index_of(key).ok_or(Rejected::UnknownTag {
            kind: self.kind,
            key,
        })?;
        if new_name.trim().is_empty() {
            return Err(Rejected::EmptyText);
        }

        let tag = &mut self.tags[index];
        if tag.name() == new_name && new_color.as_ref().is_none_or(|color| color == tag.color()) {
            return Err(Rejected::Unchanged);
        }
        let old_name = tag.name().to_string();
        tag.set_name(new_name);
        if let Some(color) = new_color {
            tag.set_color(color);
        }
        Ok(old_name)
    }

    /// Removes a tag and returns the name it had.
    pub fn remove(&mut self, key: TagKey) -> Outcome<String> {
        let index = self.index_of(key).ok_or(Rejected::UnknownTag {
            kind: self.kind,
            key,
        })?;
        let removed = self.tags.remove(index);
        Ok(removed.name().to_string())
    }

    /// Looks up the color for a name, defaulting to [`DEFAULT_COLOR`].
    pub fn color_of(&self, name: &str) -> &str {
        self.find_by_name(name)
            .map(|tag| tag.color().as_str())
            .unwrap_or(DEFAULT_COLOR)
    }

    /// Returns the first tag with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&NamedTag> {
        self.tags.iter().find(|tag| tag.name() == name)
    }

    /// Returns the tag addressed by `key`.
    pub fn get(&self, key: TagKey) -> Option<&NamedTag> {
        self.index_of(key).map(|index| &self.tags[index])
    }

    /// Iterates tags in display order.
    pub fn iter(&self) -> impl Iterator<Item = &NamedTag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn index_of(&self, key: TagKey) -> Option<usize> {
        match key {
            TagKey::Id(id) => self.tags.iter().position(|tag| tag.id() == id),
            TagKey::Position(index) => (index < self.tags.len()).then_some(index),
        }
    }
}
