//! Project-level metadata tags.
//!
//! The live project holds its tags behind an `Arc`. Edits build a new
//! `Tags` value and swap the handle, so checkpoints that captured the old
//! handle keep seeing the old values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const TAG_TITLE: &str = "TITLE";
pub const TAG_ARTIST: &str = "ARTIST";
pub const TAG_ALBUM: &str = "ALBUM";
pub const TAG_YEAR: &str = "YEAR";
pub const TAG_GENRE: &str = "GENRE";
pub const TAG_COMMENTS: &str = "COMMENTS";

/// Name → value metadata. Names are stored upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tags {
    entries: BTreeMap<String, String>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Sets a tag. An empty value removes it.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let key = name.trim().to_ascii_uppercase();
        if key.is_empty() {
            return;
        }
        if value.is_empty() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, value);
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&name.to_ascii_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_case_insensitive() {
        let mut tags = Tags::new();
        tags.set("title", "Demo");
        assert_eq!(tags.get(TAG_TITLE), Some("Demo"));
        assert_eq!(tags.get("Title"), Some("Demo"));
    }

    #[test]
    fn test_empty_value_removes() {
        let mut tags = Tags::new();
        tags.set(TAG_ARTIST, "Someone");
        tags.set(TAG_ARTIST, "");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_blank_name_ignored() {
        let mut tags = Tags::new();
        tags.set("  ", "value");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_iter_sorted_by_name() {
        let mut tags = Tags::new();
        tags.set(TAG_YEAR, "2024");
        tags.set(TAG_ALBUM, "Rough Mixes");
        let names: Vec<&str> = tags.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec![TAG_ALBUM, TAG_YEAR]);
        assert_eq!(tags.remove("album"), Some("Rough Mixes".to_string()));
        assert_eq!(tags.len(), 1);
    }
}
