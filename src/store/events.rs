//! Same-process notification of active-chat changes.
//!
//! The sidebar and the main panel share no view state; the panel subscribes
//! here and reloads whenever the pointer moves.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveChatChanged {
    /// New active chat id; empty when no chat remains.
    pub chat_id: String,
}

impl ActiveChatChanged {
    pub fn is_cleared(&self) -> bool {
        self.chat_id.is_empty()
    }
}

type Handler = Arc<dyn Fn(&ActiveChatChanged) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

#[derive(Clone, Default)]
pub struct ActiveChatChannel {
    inner: Arc<Mutex<Subscribers>>,
}

impl ActiveChatChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ActiveChatChanged) + Send + Sync + 'static,
    {
        let mut subs = lock(&self.inner);
        subs.next_id += 1;
        let id = subs.next_id;
        subs.handlers.push((id, Arc::new(handler)));
        Subscription {
            id,
            channel: Arc::downgrade(&self.inner),
        }
    }

    /// Invoke every handler in subscription order. Handlers run without the
    /// subscriber list locked, so they may subscribe, unsubscribe or publish.
    pub fn publish(&self, chat_id: &str) {
        let handlers: Vec<Handler> = lock(&self.inner)
            .handlers
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        log::debug!(
            "Active chat changed to {:?} ({} subscribers)",
            chat_id,
            handlers.len()
        );

        let event = ActiveChatChanged {
            chat_id: chat_id.to_string(),
        };
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).handlers.len()
    }
}

fn lock(inner: &Mutex<Subscribers>) -> MutexGuard<'_, Subscribers> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registration handle. Dropping it deregisters the handler.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    channel: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.channel.upgrade() {
            lock(&inner).handlers.retain(|(id, _)| *id != self.id);
        }
    }
}
