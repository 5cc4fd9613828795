//! # Query Engine
//!
//! Stateless functions over a snapshot of notes. Nothing here touches storage.
//!
//! Both operations keep a subsequence of their input in the original order, decided
//! note-by-note by an independent predicate. That is what makes them commute:
//!
//! ```text
//! filter_by_category(&search(notes, q), c) == search(&filter_by_category(notes, c), q)
//! ```
//!
//! Matching is case-insensitive substring matching on `title` or `content`. The query is
//! not trimmed and no other normalization (accents, whitespace) is applied.

use crate::model::{CategoryFilter, Note};

/// Combined text + category selection, as driven by a search bar and category tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteQuery {
    pub text: Option<String>,
    pub category: CategoryFilter,
}

impl NoteQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn category(mut self, category: impl Into<CategoryFilter>) -> Self {
        self.category = category.into();
        self
    }
}

pub fn filter_by_category(notes: &[Note], category: CategoryFilter) -> Vec<Note> {
    match category {
        CategoryFilter::All => notes.to_vec(),
        CategoryFilter::Only(_) => notes
            .iter()
            .filter(|n| category.matches(n.category))
            .cloned()
            .collect(),
    }
}

pub fn search(notes: &[Note], query: &str) -> Vec<Note> {
    if query.is_empty() {
        return notes.to_vec();
    }
    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|n| matches_text(n, &needle))
        .cloned()
        .collect()
}

/// Search then filter.
pub fn apply(notes: &[Note], query: &NoteQuery) -> Vec<Note> {
    let found = match query.text.as_deref() {
        Some(text) => search(notes, text),
        None => notes.to_vec(),
    };
    filter_by_category(&found, query.category)
}

/// `needle` must already be lower-cased.
fn matches_text(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle) || note.content.to_lowercase().contains(needle)
}
