//! Mood tag selection

use serde::{Deserialize, Serialize};

/// Mood tags picked by the user, in the order they were picked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoodSelection(Vec<String>);

impl MoodSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tag` if absent, remove it if present
    ///
    /// Returns whether the tag is selected afterwards. Blank tags are ignored.
    pub fn toggle(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }

        match self.0.iter().position(|t| t == tag) {
            Some(index) => {
                self.0.remove(index);
                false
            }
            None => {
                self.0.push(tag.to_string());
                true
            }
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag.trim())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
