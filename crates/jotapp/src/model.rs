//! # Domain Model: Notes and their Persisted Shape
//!
//! This module defines the core data structures for jot: [`Note`], [`Category`],
//! [`AudioMemo`], and the inputs used to create and edit notes ([`NoteDraft`],
//! [`NotePatch`], [`AudioClip`]).
//!
//! ## Persisted Layout
//!
//! The whole collection lives under a single key as a JSON array. Each entry is
//! written field-for-field in camelCase, with the voice memo flattened into two
//! sibling fields (the layout older clients already wrote):
//!
//! ```text
//! {
//!   "id": "18c0f3a9b2e-0000000000000000-4f1c2a",
//!   "title": "Groceries",
//!   "content": "Milk, eggs",
//!   "category": "Personal",
//!   "createdAt": "2025-01-14T09:12:44.120Z",
//!   "updatedAt": "2025-01-14T09:12:44.120Z",
//!   "audioBlob": "data:audio/wav;base64,UklGR...",   <-- optional
//!   "audioDuration": 12                              <-- only with audioBlob
//! }
//! ```
//!
//! ## Reading Legacy Entries
//!
//! Entries are validated on the way in. A small set of omissions seen in the
//! wild is tolerated, anything else is a shape mismatch and surfaces as
//! [`crate::error::JotError::CorruptData`] from the store:
//!
//! - **Numeric ids** (`1736845964120`) are read as their decimal string.
//! - **Missing `content`** reads as the empty string.
//! - **Missing or null `category`** reads as [`Category::Uncategorised`].
//! - **Missing `updatedAt`** reads as `createdAt`.
//! - **`audioDuration` without `audioBlob`** is dropped; an empty `audioBlob` means no memo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a note, unique within the collection.
///
/// Kept as an opaque string so ids written by earlier clients round-trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Personal,
    Work,
    Ideas,
    #[default]
    #[serde(alias = "Uncategorized")]
    Uncategorised,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 4] = [
        Category::Personal,
        Category::Work,
        Category::Ideas,
        Category::Uncategorised,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::Work => "Work",
            Category::Ideas => "Ideas",
            Category::Uncategorised => "Uncategorised",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(String);

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown category \"{}\" (expected one of: personal, work, ideas, uncategorised, all)",
            self.0
        )
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Ok(Category::Personal),
            "work" => Ok(Category::Work),
            "ideas" => Ok(Category::Ideas),
            "uncategorised" | "uncategorized" => Ok(Category::Uncategorised),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

/// Category selection for listing and filtering.
///
/// `All` is the sentinel that disables filtering. An omitted filter means `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(value: Category) -> Self {
        CategoryFilter::Only(value)
    }
}

impl From<Option<Category>> for CategoryFilter {
    fn from(value: Option<Category>) -> Self {
        value.map(CategoryFilter::Only).unwrap_or_default()
    }
}

impl FromStr for CategoryFilter {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(c) => c.fmt(f),
        }
    }
}

/// An encoded voice memo as stored alongside a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioMemo {
    /// Self-describing data URL (`data:<media-type>;base64,<payload>`).
    pub encoded_data: String,
    pub duration_seconds: u32,
}

/// Raw audio as handed over by the capture collaborator, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub duration_seconds: u32,
    /// Overrides the configured default media type when set.
    pub media_type: Option<String>,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, duration_seconds: u32) -> Self {
        Self {
            bytes,
            duration_seconds,
            media_type: None,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NoteRecord", into = "NoteRecord")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub audio: Option<AudioMemo>,
}

impl Note {
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

/// Wire shape of a [`Note`]. Conversion in both directions goes through here so the
/// tolerated legacy omissions live in one place.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteRecord {
    id: RecordId,
    title: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    category: Option<Category>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio_blob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio_duration: Option<u32>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Text(String),
    Number(u64),
}

impl TryFrom<NoteRecord> for Note {
    type Error = String;

    fn try_from(record: NoteRecord) -> Result<Self, Self::Error> {
        let id = match record.id {
            RecordId::Text(s) if s.is_empty() => return Err("note id is empty".to_string()),
            RecordId::Text(s) => NoteId(s),
            RecordId::Number(n) => NoteId(n.to_string()),
        };

        let audio = record
            .audio_blob
            .filter(|blob| !blob.is_empty())
            .map(|encoded_data| AudioMemo {
                encoded_data,
                duration_seconds: record.audio_duration.unwrap_or(0),
            });

        Ok(Note {
            id,
            title: record.title,
            content: record.content.unwrap_or_default(),
            category: record.category.unwrap_or_default(),
            created_at: record.created_at,
            updated_at: record.updated_at.unwrap_or(record.created_at),
            audio,
        })
    }
}

impl From<Note> for NoteRecord {
    fn from(note: Note) -> Self {
        let (audio_blob, audio_duration) = match note.audio {
            Some(memo) => (Some(memo.encoded_data), Some(memo.duration_seconds)),
            None => (None, None),
        };
        NoteRecord {
            id: RecordId::Text(note.id.0),
            title: note.title,
            content: Some(note.content),
            category: Some(note.category),
            created_at: note.created_at,
            updated_at: Some(note.updated_at),
            audio_blob,
            audio_duration,
        }
    }
}

/// Input for creating a note. Only the title is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub audio: Option<AudioClip>,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn audio(mut self, clip: AudioClip) -> Self {
        self.audio = Some(clip);
        self
    }
}

/// What an update does with the voice memo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AudioChange {
    #[default]
    Keep,
    Replace(AudioClip),
    Remove,
}

/// Partial update of a note. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Category>,
    pub audio: AudioChange,
}

impl NotePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn audio(mut self, change: AudioChange) -> Self {
        self.audio = change;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.audio == AudioChange::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_note() -> Note {
        let ts = Utc.with_ymd_and_hms(2025, 1, 14, 9, 12, 44).unwrap();
        Note {
            id: NoteId::new("abc"),
            title: "Trip plan".to_string(),
            content: "Book flights to Rome".to_string(),
            category: Category::Personal,
            created_at: ts,
            updated_at: ts,
            audio: None,
        }
    }

    #[test]
    fn test_serializes_camel_case_without_audio_fields() {
        let json = serde_json::to_value(sample_note()).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["category"], "Personal");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("audioBlob").is_none());
        assert!(json.get("audioDuration").is_none());
    }

    #[test]
    fn test_audio_flattened_into_blob_and_duration() {
        let mut note = sample_note();
        note.audio = Some(AudioMemo {
            encoded_data: "data:audio/wav;base64,AAEC".to_string(),
            duration_seconds: 7,
        });
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["audioBlob"], "data:audio/wav;base64,AAEC");
        assert_eq!(json["audioDuration"], 7);

        let back: Note = serde_json::from_value(json).unwrap();
        assert_eq!(back, note);
    }

    #[test]
    fn test_reads_legacy_entry_with_numeric_id_and_missing_fields() {
        let raw = r#"{"id": 1736845964120, "title": "Old", "createdAt": "2025-01-14T09:12:44.120Z"}"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note.id.as_str(), "1736845964120");
        assert_eq!(note.content, "");
        assert_eq!(note.category, Category::Uncategorised);
        assert_eq!(note.updated_at, note.created_at);
        assert!(note.audio.is_none());
    }

    #[test]
    fn test_null_category_reads_as_uncategorised() {
        let raw = r#"{"id": "x", "title": "T", "category": null, "createdAt": "2025-01-14T09:12:44Z"}"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note.category, Category::Uncategorised);
    }

    #[test]
    fn test_duration_without_blob_is_dropped() {
        let raw = r#"{"id": "x", "title": "T", "createdAt": "2025-01-14T09:12:44Z", "audioDuration": 5}"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert!(note.audio.is_none());
        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("audioDuration").is_none());
    }

    #[test]
    fn test_blob_without_duration_defaults_to_zero() {
        let raw = r#"{"id": "x", "title": "T", "createdAt": "2025-01-14T09:12:44Z", "audioBlob": "data:audio/wav;base64,"}"#;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note.audio.unwrap().duration_seconds, 0);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let raw = r#"{"id": "x", "title": "T", "category": "Shopping", "createdAt": "2025-01-14T09:12:44Z"}"#;
        assert!(serde_json::from_str::<Note>(raw).is_err());
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let raw = r#"{"id": "x", "createdAt": "2025-01-14T09:12:44Z"}"#;
        assert!(serde_json::from_str::<Note>(raw).is_err());
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let raw = r#"{"id": "", "title": "T", "createdAt": "2025-01-14T09:12:44Z"}"#;
        assert!(serde_json::from_str::<Note>(raw).is_err());
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("work".parse::<Category>().unwrap(), Category::Work);
        assert_eq!(" Ideas ".parse::<Category>().unwrap(), Category::Ideas);
        assert_eq!(
            "Uncategorized".parse::<Category>().unwrap(),
            Category::Uncategorised
        );
        assert!("all".parse::<Category>().is_err());
        assert!("shopping".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_filter_parsing() {
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "personal".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Personal)
        );
        assert_eq!(CategoryFilter::from(None), CategoryFilter::All);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(NotePatch::default().is_empty());
        assert!(!NotePatch::default().title("x").is_empty());
        assert!(!NotePatch::default().audio(AudioChange::Remove).is_empty());
    }
}
