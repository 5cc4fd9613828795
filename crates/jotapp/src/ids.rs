//! # Note Identifiers
//!
//! Ids must stay unique across rapid successive creates and across several contexts
//! (windows, processes) writing the same backend. A bare timestamp cannot do that: two
//! creates inside one clock tick collide. Each generated id therefore has three parts:
//!
//! ```text
//! 0194f1c2a3b-000000000000002a-9f31c07e
//! └────┬────┘ └──────┬───────┘ └──┬───┘
//!   millis          seq          node
//! ```
//!
//! - **millis**: wall-clock milliseconds, fixed-width hex so ids sort by creation time.
//! - **seq**: per-generator counter, bumped on every call, also fixed-width hex so ids
//!   from one tick keep their creation order. Never repeats for the life of the
//!   generator, whatever the clock does.
//! - **node**: random tag chosen once per generator (from a v4 UUID), separating contexts.
//!
//! The store still checks a fresh id against the collection before using it.

use crate::model::NoteId;
use chrono::{DateTime, Utc};
use std::cell::Cell;
use uuid::Uuid;

#[derive(Debug)]
pub struct IdGenerator {
    node: String,
    seq: Cell<u64>,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        let node = Uuid::new_v4().simple().to_string()[..8].to_string();
        Self::with_node(node)
    }

    /// Generator with a fixed node tag, for deterministic ids.
    pub fn with_node(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            seq: Cell::new(0),
        }
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    pub fn next_id(&self, now: DateTime<Utc>) -> NoteId {
        let seq = self.seq.get();
        self.seq.set(seq.wrapping_add(1));
        let millis = now.timestamp_millis().max(0) as u64;
        NoteId::new(format!("{:011x}-{:016x}-{}", millis, seq, self.node))
    }
}
