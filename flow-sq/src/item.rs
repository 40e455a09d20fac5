//! Sortable item model
//!
//! An [`Item`] is built once per source record. Only `id` and
//! `primary_author_id` are known up front; tags, mood and embedding are
//! filled in place by enrichment. Sequencers never modify items.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Scalar mood coordinates, each conventionally in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodCoordinates {
    /// Perceived intensity
    pub energy: f64,
    /// Musical positiveness
    pub valence: f64,
}

impl MoodCoordinates {
    pub fn new(energy: f64, valence: f64) -> Self {
        Self { energy, valence }
    }
}

/// One track in the collection being sequenced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier, unique within a collection
    pub id: String,

    /// First author's identifier, used for author separation
    pub primary_author_id: String,

    /// Track title
    #[serde(default)]
    pub title: String,

    /// Display names of all authors, primary first
    #[serde(default)]
    pub author_names: Vec<String>,

    /// Album title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    /// International Standard Recording Code (tag lookup key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<String>,

    /// Genre tags; `None` until enrichment has run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Embedding vector; `None` until enrichment has run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Mood coordinates; `None` until enrichment has run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<MoodCoordinates>,
}

impl Item {
    pub fn new(id: impl Into<String>, primary_author_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            primary_author_id: primary_author_id.into(),
            title: String::new(),
            author_names: Vec::new(),
            album: None,
            isrc: None,
            tags: None,
            embedding: None,
            mood: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_isrc(mut self, isrc: impl Into<String>) -> Self {
        self.isrc = Some(isrc.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_mood(mut self, energy: f64, valence: f64) -> Self {
        self.mood = Some(MoodCoordinates::new(energy, valence));
        self
    }

    /// Tags, treating absent tags as an empty set
    pub fn tags_or_empty(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }

    /// True when at least one tag is present
    pub fn has_tags(&self) -> bool {
        !self.tags_or_empty().is_empty()
    }

    /// Expanded tag set (see [`expand_tags`])
    pub fn expanded_tags(&self) -> Vec<String> {
        expand_tags(self.tags_or_empty())
    }

    /// Embedding, treating an absent vector as empty
    pub fn embedding_or_empty(&self) -> &[f32] {
        self.embedding.as_deref().unwrap_or(&[])
    }

    /// Mood coordinates, `(0, 0)` when absent
    pub fn mood_or_default(&self) -> MoodCoordinates {
        self.mood.unwrap_or_default()
    }
}

/// Expand tags into the comparison token set
///
/// Each tag contributes itself plus each of its whitespace-separated words,
/// so "jazz fusion" matches "jazz". Duplicates are dropped, keeping first
/// appearance order. Expanding an expanded set yields the same set.
pub fn expand_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut expanded = Vec::new();

    for tag in tags {
        let tag = tag.as_ref().trim();
        for token in std::iter::once(tag).chain(tag.split_whitespace()) {
            if !token.is_empty() && seen.insert(token) {
                expanded.push(token.to_string());
            }
        }
    }

    expanded
}
