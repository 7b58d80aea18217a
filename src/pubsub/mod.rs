//! Broadcast propagation between pipeline stages
//!
//! A [`Topic`] fans every published value out to all current subscribers.
//! Each subscriber has its own unbounded queue, so it receives every value
//! published after it joined, in publish order, regardless of how slowly it
//! consumes. Values are `Arc`s of whole sets: a producer builds a new set,
//! publishes it, and never touches it again.
//!
//! # Usage
//!
//! ```ignore
//! use playout_controller::pubsub::Topic;
//!
//! let topic = Topic::new("jobs");
//! let mut sub = topic.subscribe();
//! topic.publish(42);
//! assert_eq!(sub.recv().await, Some(42));
//! ```

use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::models::{JobSet, ScheduledSet};

/// A named broadcast group
pub struct Topic<T> {
    name: &'static str,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<T>>>,
}

impl<T: Clone + Send + 'static> Topic<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Join the group; only values published from now on are delivered
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().push(tx);
        Subscription {
            topic: self.name,
            rx,
        }
    }

    /// Deliver `value` to every live subscriber, returning how many got it.
    /// Dropped subscriptions are pruned.
    pub fn publish(&self, value: T) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| tx.send(value.clone()).is_ok());
        let delivered = subscribers.len();
        tracing::trace!(topic = self.name, delivered, "Published");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<mpsc::UnboundedSender<T>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Receiving end of a [`Topic`]
pub struct Subscription<T> {
    topic: &'static str,
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    pub fn topic(&self) -> &'static str {
        self.topic
    }

    /// Wait for the next value; `None` once the topic is gone
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Next queued value, if any, without waiting
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Drain the queue and keep only the newest value
    pub fn latest(&mut self) -> Option<T> {
        let mut newest = None;
        while let Ok(value) = self.rx.try_recv() {
            newest = Some(value);
        }
        newest
    }
}

/// The three groups connecting pollers, store and dispatcher
pub struct Hub {
    /// Full job set, published by the schedule poller
    pub jobs: Topic<Arc<JobSet>>,

    /// Upcoming set, published by the upcoming poller
    pub upcoming: Topic<Arc<JobSet>>,

    /// Scheduled set, published by the dispatch scheduler
    pub scheduled: Topic<Arc<ScheduledSet>>,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            jobs: Topic::new("jobs"),
            upcoming: Topic::new("upcoming"),
            scheduled: Topic::new("scheduled"),
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}
