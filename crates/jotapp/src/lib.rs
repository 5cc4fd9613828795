//! # Jot Architecture
//!
//! Jot is a **UI-agnostic note store**: text notes with optional voice memos, kept in a
//! plain string key-value backend. The `jot` binary is one client of this library; an
//! embedded view or a test harness can drive it the same way.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Presentation (jot CLI, or any other client)                │
//! │  - Parses input, renders output, owns the terminal          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - JotApi: mutations → NoteStore, queries → cached snapshot │
//! │  - Drops its cache on change notifications (notify.rs)      │
//! └─────────────────────────────────────────────────────────────┘
//!                  │                              │
//!                  ▼                              ▼
//! ┌───────────────────────────────┐  ┌──────────────────────────┐
//! │  Note Store (store/)          │  │  Query Engine (query.rs) │
//! │  - read → transform → write   │  │  - filter_by_category    │
//! │  - ids, timestamps, audio     │  │  - search                │
//! └───────────────────────────────┘  └──────────────────────────┘
//!                  │
//!                  ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  KvBackend (store/backend.rs)                               │
//! │  - MemBackend (tests, embedding), FsBackend (on disk)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Nothing in this crate writes to stdout/stderr, exits the process, or assumes a
//! terminal. Diagnostics go through `tracing`; the host decides whether to collect them.
//!
//! ## Concurrency
//!
//! Single-threaded and synchronous: every operation finishes in one call with no
//! suspension between its read and its write. Several contexts may still share one
//! backend; they coordinate only through change notifications, and the last writer
//! wins when two read-modify-write cycles overlap.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for presentation layers
//! - [`store`]: Key-value backends and the [`store::NoteStore`]
//! - [`query`]: Pure filtering and search over snapshots
//! - [`model`]: Core data types (`Note`, `Category`, drafts and patches)
//! - [`audio`]: Voice memo encoding to and from data URLs
//! - [`notify`]: Cross-context change notification
//! - [`ids`]: Collision-free note ids
//! - [`clock`]: Injectable time source
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod audio;
pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod model;
pub mod notify;
pub mod query;
pub mod store;
