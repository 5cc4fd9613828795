//! # Change Notification
//!
//! Several contexts (windows, tabs, embedded views) may share one backend. None of them
//! can lock it, so each keeps its view fresh by listening for changes made elsewhere:
//!
//! ```text
//!   context A                 ChangeBus                 context B
//!   store.create() ──set──▶ backend
//!        └─ publish("notes") ──▶ queue B ──▶ B.subscription.has_pending_for("notes")
//!                                                └─ drop cached snapshot, re-read
//! ```
//!
//! A context never receives its own events; it already holds the value it just wrote.
//!
//! This narrows the lost-update window but does not close it. Two contexts that both
//! read before either writes will still race, and the last `set` wins.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub key: String,
    pub origin: ContextId,
}

type Queue = RefCell<VecDeque<ChangeEvent>>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<(ContextId, Weak<Queue>)>,
}

impl BusInner {
    fn allocate(&mut self) -> ContextId {
        let id = ContextId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// In-process broadcast hub shared by every context attached to the same backend.
#[derive(Clone, Default)]
pub struct ChangeBus {
    inner: Rc<RefCell<BusInner>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listening context.
    pub fn subscribe(&self) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.allocate();
        let queue = Rc::new(RefCell::new(VecDeque::new()));
        inner.subscribers.push((id, Rc::downgrade(&queue)));
        Subscription {
            id,
            queue,
            bus: self.clone(),
        }
    }

    /// A publisher for a context that writes but never listens.
    pub fn publisher(&self) -> ChangePublisher {
        let id = self.inner.borrow_mut().allocate();
        ChangePublisher {
            bus: self.clone(),
            origin: id,
        }
    }

    /// Deliver a change of `key` to every live subscriber other than `origin`.
    /// Returns the number of contexts notified.
    pub fn publish(&self, origin: ContextId, key: &str) -> usize {
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|(_, queue)| queue.strong_count() > 0);

        let mut delivered = 0;
        for (id, queue) in &inner.subscribers {
            if *id == origin {
                continue;
            }
            if let Some(queue) = queue.upgrade() {
                queue.borrow_mut().push_back(ChangeEvent {
                    key: key.to_string(),
                    origin,
                });
                delivered += 1;
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|(_, q)| q.strong_count() > 0)
            .count()
    }
}

/// A context's inbox. Dropping it unsubscribes.
pub struct Subscription {
    id: ContextId,
    queue: Rc<Queue>,
    bus: ChangeBus,
}

impl Subscription {
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Publisher tagged with this context, so its own writes do not come back to it.
    pub fn publisher(&self) -> ChangePublisher {
        ChangePublisher {
            bus: self.bus.clone(),
            origin: self.id,
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }

    pub fn drain(&self) -> Vec<ChangeEvent> {
        self.queue.borrow_mut().drain(..).collect()
    }

    /// Drain the inbox, reporting whether any event touched `key`.
    pub fn take_changed(&self, key: &str) -> bool {
        self.drain().iter().any(|e| e.key == key)
    }
}

#[derive(Clone)]
pub struct ChangePublisher {
    bus: ChangeBus,
    origin: ContextId,
}

impl ChangePublisher {
    pub fn origin(&self) -> ContextId {
        self.origin
    }

    pub fn publish(&self, key: &str) -> usize {
        self.bus.publish(self.origin, key)
    }
}
