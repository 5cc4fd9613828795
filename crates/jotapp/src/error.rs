use crate::model::NoteId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JotError {
    #[error("Invalid note: {0}")]
    Validation(String),

    #[error("Note not found: {0}")]
    NotFound(NoteId),

    #[error("Stored value under \"{key}\" is corrupt: {reason}")]
    CorruptData { key: String, reason: String },

    #[error("Storage full writing \"{key}\": need {needed} bytes, {available} available")]
    StorageQuota {
        key: String,
        needed: usize,
        available: usize,
    },

    #[error("Audio encoding error: {0}")]
    Encoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl JotError {
    pub fn corrupt(key: impl Into<String>, reason: impl ToString) -> Self {
        JotError::CorruptData {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_corruption(&self) -> bool {
        matches!(self, JotError::CorruptData { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, JotError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, JotError>;
