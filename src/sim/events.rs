//! Lifecycle event hub
//!
//! Components subscribe handlers to the four lifecycle signals. Handlers get
//! mutable access to the context passed to [`EventHub::publish`], so the hub
//! never holds references into the components it notifies.

use serde::{Deserialize, Serialize};

/// Lifecycle signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Start,
    Pause,
    Resume,
    End,
}

/// Handle returned by [`EventHub::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<C> = Box<dyn FnMut(&mut C, Signal)>;

struct Subscription<C> {
    id: SubscriptionId,
    signal: Signal,
    handler: Handler<C>,
}

/// Multicast publish/subscribe point for lifecycle signals
pub struct EventHub<C> {
    subscriptions: Vec<Subscription<C>>,
    next_id: u64,
}

impl<C> Default for EventHub<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for EventHub<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl<C> EventHub<C> {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 1,
        }
    }

    /// Register `handler` for `signal`. Handlers run in subscription order.
    pub fn subscribe<F>(&mut self, signal: Signal, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut C, Signal) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            signal,
            handler: Box::new(handler),
        });
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Invoke every handler subscribed to `signal`; returns how many ran
    pub fn publish(&mut self, signal: Signal, ctx: &mut C) -> usize {
        log::debug!("Publishing {:?}", signal);
        let mut invoked = 0;
        for sub in self.subscriptions.iter_mut().filter(|s| s.signal == signal) {
            (sub.handler)(ctx, signal);
            invoked += 1;
        }
        invoked
    }

    /// Number of handlers currently subscribed to `signal`
    pub fn subscriber_count(&self, signal: Signal) -> usize {
        self.subscriptions.iter().filter(|s| s.signal == signal).count()
    }
}
