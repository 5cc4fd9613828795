//! # API Facade
//!
//! The API layer is a **thin facade** over the note store and the query engine. It is
//! the single entry point for a presentation layer (the `jot` CLI, an embedded view, a
//! test harness).
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Dispatches** mutations to [`NoteStore`]
//! - **Answers queries** from a cached snapshot run through [`crate::query`]
//! - **Keeps the cache honest**: it is dropped after this context's own writes and
//!   whenever another context announces a change on the [`ChangeBus`]
//!
//! Everything handed out is an owned clone; callers cannot reach into the cache or
//! bypass the store's validation.
//!
//! ## Staleness
//!
//! ```text
//! notes(query)
//!   ├─ subscription has an event for the notes key? → drop cache
//!   ├─ cache empty?                                 → store.snapshot()
//!   └─ query::apply(cache, query)
//! ```
//!
//! The cache only saves repeated reads between changes. It does not make concurrent
//! writers safe; see [`crate::notify`].

use crate::error::Result;
use crate::model::{CategoryFilter, Note, NoteDraft, NoteId, NotePatch};
use crate::notify::{ChangeBus, Subscription};
use crate::query::{self, NoteQuery};
use crate::store::{KvBackend, NoteStore};
use std::cell::RefCell;

pub struct JotApi<B: KvBackend> {
    store: NoteStore<B>,
    subscription: Option<Subscription>,
    cache: RefCell<Option<Vec<Note>>>,
}

impl<B: KvBackend> JotApi<B> {
    /// A standalone context that assumes nobody else writes the backend.
    pub fn new(store: NoteStore<B>) -> Self {
        Self {
            store,
            subscription: None,
            cache: RefCell::new(None),
        }
    }

    /// A context that shares the backend with others on `bus`: it announces its own
    /// writes and listens for theirs.
    pub fn connect(store: NoteStore<B>, bus: &ChangeBus) -> Self {
        let subscription = bus.subscribe();
        let store = store.with_notifier(subscription.publisher());
        Self {
            store,
            subscription: Some(subscription),
            cache: RefCell::new(None),
        }
    }

    pub fn store(&self) -> &NoteStore<B> {
        &self.store
    }

    /// Notes matching `query`, answered from the cached snapshot when it is current.
    pub fn notes(&self, query: &NoteQuery) -> Result<Vec<Note>> {
        self.refresh_if_stale()?;
        let cache = self.cache.borrow();
        let notes = query::apply(cache.as_deref().unwrap_or_default(), query);
        Ok(notes)
    }

    /// Fresh read straight from the store.
    pub fn list(&self, filter: CategoryFilter) -> Result<Vec<Note>> {
        self.store.list(filter)
    }

    pub fn search(&self, text: &str) -> Result<Vec<Note>> {
        self.notes(&NoteQuery::new().text(text))
    }

    pub fn get(&self, id: &NoteId) -> Result<Option<Note>> {
        self.store.get(id)
    }

    pub fn create(&mut self, draft: NoteDraft) -> Result<Note> {
        self.invalidate();
        self.store.create(draft)
    }

    pub fn update(&mut self, id: &NoteId, patch: NotePatch) -> Result<Note> {
        self.invalidate();
        self.store.update(id, patch)
    }

    pub fn delete(&mut self, id: &NoteId) -> Result<()> {
        self.invalidate();
        self.store.delete(id)
    }

    /// Drop the cache and read the collection again.
    pub fn reload(&self) -> Result<()> {
        self.invalidate();
        self.refresh_if_stale()
    }

    /// True when the next query will re-read the backend.
    pub fn is_stale(&self) -> bool {
        self.cache.borrow().is_none()
            || self
                .subscription
                .as_ref()
                .is_some_and(|s| s.has_pending())
    }

    fn invalidate(&self) {
        self.cache.borrow_mut().take();
    }

    fn refresh_if_stale(&self) -> Result<()> {
        if let Some(subscription) = &self.subscription {
            if subscription.take_changed(self.store.key()) {
                self.invalidate();
            }
        }
        if self.cache.borrow().is_none() {
            let snapshot = self.store.snapshot()?;
            *self.cache.borrow_mut() = Some(snapshot);
        }
        Ok(())
    }
}
