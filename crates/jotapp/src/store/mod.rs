//! # Storage Layer
//!
//! This module defines the storage abstraction for jot. The [`KvBackend`] trait is the
//! only thing jot needs from a platform: string keys, string values, `get` and `set`.
//!
//! ## Whole-Collection Writes
//!
//! Backends have no partial update, no transaction and no compare-and-swap, so the
//! [`NoteStore`] treats the collection as one value:
//!
//! 1. **Read**: `get("notes")` and validate it into `Vec<Note>`.
//! 2. **Transform**: apply the mutation in memory.
//! 3. **Write**: serialize and `set("notes", ...)` in one call.
//!
//! Everything that can fail without touching storage (title validation, audio encoding)
//! happens before step 1, and nothing runs between steps 1 and 3 except the pure
//! transform. A failure at any step leaves the stored value exactly as it was.
//!
//! ## Missing vs Corrupt
//!
//! - **Missing key** (or an empty value): the initial state, an empty collection.
//! - **Present but invalid** (bad JSON, wrong shape, unknown category, duplicate ids):
//!   [`crate::error::JotError::CorruptData`]. Corrupt values are reported, never
//!   silently replaced by a mutation.
//!
//! ## Key Layout
//!
//! ```text
//! notes        <- the note collection (JSON array), owned by NoteStore
//! appSettings  <- application settings, owned by the settings subsystem
//! ```
//!
//! The note store never reads or writes the settings key.
//!
//! ## Implementations
//!
//! - [`mem_backend::MemBackend`]: in-memory, with quota and write-failure simulation.
//! - [`fs_backend::FsBackend`]: one file per key in a directory, atomic replace.

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod note_store;

pub use backend::KvBackend;
pub use note_store::NoteStore;

/// Key holding the note collection.
pub const NOTES_KEY: &str = "notes";

/// Key owned by the settings subsystem. Listed here only so the store can stay away from it.
pub const SETTINGS_KEY: &str = "appSettings";
