//! # Voice Memo Encoding
//!
//! Backends only store text, so audio bytes are turned into a self-describing data URL
//! before they are attached to a note:
//!
//! ```text
//! data:audio/wav;base64,UklGRiQAAABXQVZFZm10IBAAAAABAAEA...
//! ```
//!
//! The store only ever encodes. Decoding happens lazily in whoever plays or exports
//! the memo, via [`decode`].

use crate::error::{JotError, Result};
use crate::model::{AudioClip, AudioMemo};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const DEFAULT_MEDIA_TYPE: &str = "audio/wav";

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Audio bytes recovered from an encoded memo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct AudioCodec {
    default_media_type: String,
    max_bytes: usize,
}

impl Default for AudioCodec {
    fn default() -> Self {
        Self {
            default_media_type: DEFAULT_MEDIA_TYPE.to_string(),
            max_bytes: usize::MAX,
        }
    }
}

impl AudioCodec {
    pub fn new(default_media_type: impl Into<String>, max_bytes: usize) -> Result<Self> {
        let default_media_type = default_media_type.into();
        validate_media_type(&default_media_type)?;
        Ok(Self {
            default_media_type,
            max_bytes,
        })
    }

    pub fn default_media_type(&self) -> &str {
        &self.default_media_type
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn encode(&self, clip: &AudioClip) -> Result<AudioMemo> {
        let media_type = clip
            .media_type
            .as_deref()
            .unwrap_or(&self.default_media_type);
        validate_media_type(media_type)?;

        if clip.bytes.len() > self.max_bytes {
            return Err(JotError::Encoding(format!(
                "recording is {} bytes, limit is {}",
                clip.bytes.len(),
                self.max_bytes
            )));
        }

        let mut encoded_data = String::with_capacity(
            DATA_PREFIX.len() + media_type.len() + BASE64_MARKER.len() + clip.bytes.len() * 4 / 3 + 4,
        );
        encoded_data.push_str(DATA_PREFIX);
        encoded_data.push_str(media_type);
        encoded_data.push_str(BASE64_MARKER);
        STANDARD.encode_string(&clip.bytes, &mut encoded_data);

        Ok(AudioMemo {
            encoded_data,
            duration_seconds: clip.duration_seconds,
        })
    }
}

pub fn decode(encoded: &str) -> Result<DecodedAudio> {
    let rest = encoded
        .strip_prefix(DATA_PREFIX)
        .ok_or_else(|| JotError::Encoding("not a data URL".to_string()))?;
    let (media_type, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or_else(|| JotError::Encoding("data URL is not base64 encoded".to_string()))?;
    if media_type.is_empty() {
        return Err(JotError::Encoding("data URL has no media type".to_string()));
    }
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| JotError::Encoding(format!("invalid base64 payload: {}", e)))?;
    Ok(DecodedAudio {
        media_type: media_type.to_string(),
        bytes,
    })
}

/// `m:ss`, as shown next to a note's memo.
pub fn format_duration(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn validate_media_type(media_type: &str) -> Result<()> {
    let valid = match media_type.split_once('/') {
        Some((kind, subtype)) => {
            !kind.is_empty()
                && !subtype.is_empty()
                && !subtype.contains('/')
                && !media_type
                    .chars()
                    .any(|c| c.is_whitespace() || c == ';' || c == ',')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(JotError::Encoding(format!(
            "invalid media type \"{}\"",
            media_type
        )))
    }
}
