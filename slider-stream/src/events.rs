//! Subscriber handle for slider move events
//!
//! Wraps the receiving end of a subscriber queue with async, non-blocking
//! and blocking accessors, so both async consumers and plain threads can
//! drain it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::types::SliderMoveEvent;

/// Receiving end of one slider event subscription
///
/// Events arrive in the order they were produced. The stream ends (`recv`
/// returns `None`) once the connection that created it is gone.
pub struct SliderEvents {
    rx: mpsc::Receiver<SliderMoveEvent>,
    dropped: Arc<AtomicU64>,
}

impl SliderEvents {
    pub(crate) fn new(rx: mpsc::Receiver<SliderMoveEvent>, dropped: Arc<AtomicU64>) -> Self {
        Self { rx, dropped }
    }

    /// Wait for the next event
    ///
    /// Returns `None` if the publishing side is gone.
    pub async fn recv(&mut self) -> Option<SliderMoveEvent> {
        self.rx.recv().await
    }

    /// Wait for the next event for at most `timeout`
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Option<SliderMoveEvent> {
        tokio::time::timeout(timeout, self.rx.recv()).await.ok()?
    }

    /// Take an event if one is queued
    pub fn try_recv(&mut self) -> Option<SliderMoveEvent> {
        self.rx.try_recv().ok()
    }

    /// Block the current thread until the next event
    ///
    /// # Panics
    ///
    /// Panics when called from inside an async execution context, like
    /// `tokio::sync::mpsc::Receiver::blocking_recv`.
    pub fn blocking_recv(&mut self) -> Option<SliderMoveEvent> {
        self.rx.blocking_recv()
    }

    /// Iterator over the events queued right now
    pub fn try_iter(&mut self) -> TryIter<'_> {
        TryIter { inner: self }
    }

    /// Blocking iterator that ends when the publishing side is gone
    pub fn blocking_iter(&mut self) -> BlockingIter<'_> {
        BlockingIter { inner: self }
    }

    /// Events discarded because this subscriber's queue was full
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Non-blocking iterator over currently queued events
pub struct TryIter<'a> {
    inner: &'a mut SliderEvents,
}

impl<'a> Iterator for TryIter<'a> {
    type Item = SliderMoveEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

/// Blocking iterator over events
pub struct BlockingIter<'a> {
    inner: &'a mut SliderEvents,
}

impl<'a> Iterator for BlockingIter<'a> {
    type Item = SliderMoveEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.blocking_recv()
    }
}
