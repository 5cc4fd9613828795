use super::backend::{entry_size, KvBackend};
use crate::error::{JotError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const VALUE_EXT: &str = "value";

/// Directory-backed key-value store: one file per key.
///
/// ```text
/// <root>/
/// ├── notes.value
/// └── appSettings.value
/// ```
///
/// Keys are percent-encoded into file names, so any key maps to exactly one file. A file
/// that is not valid UTF-8 reads as [`JotError::CorruptData`].
/// Writes go to a temp file and are renamed into place, so a failed write never leaves a
/// truncated value behind.
pub struct FsBackend {
    root: PathBuf,
    quota: Option<usize>,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            quota: None,
        }
    }

    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{}", encode_key(key), VALUE_EXT))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    /// Bytes held by every key except `skip`.
    fn used_by_others(&self, skip: &str) -> Result<usize> {
        let mut used = 0;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXT) {
                continue;
            }
            let Some(key) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(decode_key)
            else {
                continue;
            };
            if key == skip {
                continue;
            }
            let len = fs::metadata(&path)?.len() as usize;
            used += key.len() + len;
        }
        Ok(used)
    }
}

impl KvBackend for FsBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let bytes = match fs::read(self.value_path(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(JotError::Io(e)),
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| JotError::corrupt(key, e))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.ensure_dir()?;

        if let Some(quota) = self.quota {
            let others = self.used_by_others(key)?;
            let needed = entry_size(key, value);
            if others + needed > quota {
                return Err(JotError::StorageQuota {
                    key: key.to_string(),
                    needed,
                    available: quota.saturating_sub(others),
                });
            }
        }

        let target = self.value_path(key);
        let tmp = self.root.join(format!(".{}-{}.tmp", encode_key(key), Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, value) {
            let _ = fs::remove_file(&tmp);
            return Err(map_write_error(key, value, e));
        }
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(map_write_error(key, value, e));
        }
        debug!(key, bytes = value.len(), path = %target.display(), "wrote value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.value_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(JotError::Io(e)),
        }
    }
}

fn map_write_error(key: &str, value: &str, e: std::io::Error) -> JotError {
    if e.kind() == ErrorKind::StorageFull {
        JotError::StorageQuota {
            key: key.to_string(),
            needed: entry_size(key, value),
            available: 0,
        }
    } else {
        JotError::Io(e)
    }
}

fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'_' || b == b'-' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

fn decode_key(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
