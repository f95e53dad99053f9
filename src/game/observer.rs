//! Change subscribers
//!
//! Callbacks take no arguments; a subscriber re-queries the engine. They are
//! called synchronously in registration order. The engine owns the closures,
//! so a callback cannot reach back into the engine to (un)subscribe while a
//! dispatch is running.

use std::fmt;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut()>)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, callback: Box<dyn FnMut()>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, callback));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub(crate) fn notify(&mut self) {
        for (_, callback) in self.subscribers.iter_mut() {
            callback();
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
