use crate::error::{Outcome, Rejected};
use crate::models::{Label, TagId, TagKey, TagKind};

/// Registry of plain-text labels (times or dates).
///
/// Label text is unique and the sequence is kept in ascending lexicographic
/// order after every mutation, so display positions are not insertion order.
#[derive(Debug, Clone)]
pub struct LabelRegistry {
    kind: TagKind,
    labels: Vec<Label>,
    next_id: i64,
}

impl LabelRegistry {
    /// Creates an empty registry for `kind`.
    pub fn new(kind: TagKind) -> Self {
        Self {
            kind,
            labels: Vec::new(),
            next_id: 1,
        }
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    /// Inserts a label, keeping the sequence sorted.
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook::TagKind;
    /// use casebook::registry::LabelRegistry;
    ///
    /// let mut dates = LabelRegistry::new(TagKind::Date);
    /// dates.add("2日目").unwrap();
    /// dates.add("1日目").unwrap();
    /// assert!(dates.add("1日目").is_err());
    ///
    /// let texts: Vec<&str> = dates.iter().map(|label| label.text()).collect();
    /// assert_eq!(texts, vec!["1日目", "2日目"]);
    /// ```
    pub fn add(&mut self, text: &str) -> Outcome<TagId> {
        if text.trim().is_empty() {
            return Err(Rejected::EmptyText);
        }
        if self.contains(text) {
            return Err(Rejected::DuplicateLabel {
                kind: self.kind,
                text: text.to_string(),
            });
        }

        let id = TagId::new(self.next_id);
        self.next_id += 1;
        self.labels.push(Label::new(id, text));
        self.sort();
        Ok(id)
    }

    /// Replaces a label's text and returns the previous text.
    ///
    /// Renaming onto the text of a different label merges the two: the
    /// renamed entry is dropped and the existing label keeps its id.
    pub fn rename(&mut self, key: TagKey, new_text: &str) -> Outcome<String> {
        let index = self.index_of(key).ok_or(Rejected::UnknownTag {
            kind: self.kind,
            key,
        })?;
        if new_text.trim().is_empty() {
            return Err(Rejected::EmptyText);
        }

        let old_text = self.labels[index].text().to_string();
        if old_text == new_text {
            return Err(Rejected::Unchanged);
        }
        if self.contains(new_text) {
            self.labels.remove(index);
            return Ok(old_text);
        }

        self.labels[index].set_text(new_text);
        self.sort();
        Ok(old_text)
    }

    /// Renames the label at display position `index`.
    pub fn rename_at(&mut self, index: usize, new_text: &str) -> Outcome<String> {
        self.rename(TagKey::Position(index), new_text)
    }

    /// Removes a label and returns its text.
    pub fn remove(&mut self, key: TagKey) -> Outcome<String> {
        let index = self.index_of(key).ok_or(Rejected::UnknownTag {
            kind: self.kind,
            key,
        })?;
        Ok(self.labels.remove(index).text().to_string())
    }

    /// Removes the label at display position `index`.
    ///
    /// Every later label moves down one position afterwards.
    pub fn remove_at(&mut self, index: usize) -> Outcome<String> {
        self.remove(TagKey::Position(index))
    }

    /// Returns true if a label with exactly this text exists.
    pub fn contains(&self, text: &str) -> bool {
        self.labels.iter().any(|label| label.text() == text)
    }

    pub fn get(&self, key: TagKey) -> Option<&Label> {
        self.index_of(key).map(|index| &self.labels[index])
    }

    /// Iterates labels in sorted display order.
    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn index_of(&self, key: TagKey) -> Option<usize> {
        match key {
            TagKey::Id(id) => self.labels.iter().position(|label| label.id() == id),
            TagKey::Position(index) => (index < self.labels.len()).then_some(index),
        }
    }

    fn sort(&mut self) {
        self.labels.sort_by(|a, b| a.text().cmp(b.text()));
    }
}
