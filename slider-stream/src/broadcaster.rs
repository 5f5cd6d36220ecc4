//! Fan-out of slider move events to subscribers
//!
//! Each subscriber owns a bounded queue and a [`DeliveryPolicy`] that decides
//! what happens when the queue is full, so a consumer that stops reading can
//! delay the poll loop by at most its backpressure timeout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};
use tracing::debug;

use crate::config::DeliveryPolicy;
use crate::events::SliderEvents;
use crate::types::SliderMoveEvent;

#[derive(Clone)]
struct Subscriber {
    sender: mpsc::Sender<SliderMoveEvent>,
    policy: DeliveryPolicy,
    dropped: Arc<AtomicU64>,
}

enum Delivery {
    Delivered,
    Dropped,
    Closed,
}

/// Registry of event subscribers shared between the facade and the worker
#[derive(Clone)]
pub struct EventBroadcaster {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    default_buffer: usize,
    default_policy: DeliveryPolicy,
}

impl EventBroadcaster {
    /// Create a broadcaster whose `subscribe()` uses the given queue settings
    pub fn new(default_buffer: usize, default_policy: DeliveryPolicy) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(Vec::new())),
            default_buffer: default_buffer.max(1),
            default_policy,
        }
    }

    /// Register a subscriber with the default queue settings
    pub fn subscribe(&self) -> SliderEvents {
        self.subscribe_with(self.default_buffer, self.default_policy)
    }

    /// Register a subscriber with its own queue size and delivery policy
    ///
    /// The subscriber only receives events published after this call.
    pub fn subscribe_with(&self, buffer: usize, policy: DeliveryPolicy) -> SliderEvents {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let dropped = Arc::new(AtomicU64::new(0));

        let mut subscribers = self.subscribers.write();
        subscribers.push(Subscriber {
            sender,
            policy,
            dropped: Arc::clone(&dropped),
        });
        debug!("Registered slider event subscriber #{}", subscribers.len());

        SliderEvents::new(receiver, dropped)
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Deliver a batch to every subscriber, in registration order
    ///
    /// Returns the number of successful deliveries. Subscribers whose receiver
    /// was dropped are removed.
    pub async fn publish(&self, events: &[SliderMoveEvent]) -> usize {
        if events.is_empty() {
            return 0;
        }

        // Snapshot so no lock is held while waiting on a slow subscriber
        let subscribers: Vec<Subscriber> = self.subscribers.read().clone();

        let mut delivered = 0;
        let mut saw_closed = false;

        for subscriber in &subscribers {
            for event in events {
                match Self::deliver(subscriber, *event).await {
                    Delivery::Delivered => delivered += 1,
                    Delivery::Dropped => {
                        let total = subscriber.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                        debug!("Subscriber queue full, dropped {} ({} total)", event, total);
                    }
                    Delivery::Closed => {
                        saw_closed = true;
                        break;
                    }
                }
            }
        }

        if saw_closed {
            let mut registry = self.subscribers.write();
            let before = registry.len();
            registry.retain(|s| !s.sender.is_closed());
            debug!("Removed {} closed subscribers", before - registry.len());
        }

        delivered
    }

    async fn deliver(subscriber: &Subscriber, event: SliderMoveEvent) -> Delivery {
        match subscriber.policy {
            DeliveryPolicy::DropWhenFull => match subscriber.sender.try_send(event) {
                Ok(()) => Delivery::Delivered,
                Err(TrySendError::Full(_)) => Delivery::Dropped,
                Err(TrySendError::Closed(_)) => Delivery::Closed,
            },
            DeliveryPolicy::Backpressure { timeout } => {
                match subscriber.sender.send_timeout(event, timeout).await {
                    Ok(()) => Delivery::Delivered,
                    Err(SendTimeoutError::Timeout(_)) => Delivery::Dropped,
                    Err(SendTimeoutError::Closed(_)) => Delivery::Closed,
                }
            }
        }
    }
}
