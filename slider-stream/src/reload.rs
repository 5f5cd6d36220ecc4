//! Configuration reload handling
//!
//! Every configuration update is reported right away so the new settings can
//! be applied, and arms a reset timer. When the timer fires the worker forgets
//! its slider count, which makes the next reading re-report every slider.
//! The delay gives consumers rebuilt by the same reload time to get ready.
//! A further update while the timer is armed restarts it. Updates that fail
//! validation are skipped and leave any armed timer alone.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

use crate::config::SliderConfig;

/// What the watcher observed
#[derive(Debug, Clone, PartialEq)]
pub enum ReloadSignal {
    /// A new configuration was published
    Reloaded(SliderConfig),
    /// The post-reload delay elapsed; slider tracking should be reset
    ResetDue,
}

/// Watches the configuration channel and owns the reset timer
pub struct ReloadWatcher {
    updates: watch::Receiver<SliderConfig>,
    delay: Duration,
    deadline: Option<Instant>,
    closed: bool,
}

impl ReloadWatcher {
    pub fn new(updates: watch::Receiver<SliderConfig>, delay: Duration) -> Self {
        Self {
            updates,
            delay,
            deadline: None,
            closed: false,
        }
    }

    /// The most recently published configuration
    pub fn current(&self) -> SliderConfig {
        self.updates.borrow().clone()
    }

    /// Whether a reset is scheduled
    pub fn reset_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Wait for the next reload or reset
    ///
    /// Cancel safe: dropping the future keeps any armed timer. Once the
    /// configuration sender is gone only a pending reset can still fire.
    pub async fn next(&mut self) -> ReloadSignal {
        loop {
            tokio::select! {
                changed = self.updates.changed(), if !self.closed => {
                    match changed {
                        Ok(()) => {
                            let config = self.updates.borrow_and_update().clone();
                            match config.validate() {
                                Ok(()) => {
                                    self.deadline = Some(Instant::now() + self.delay);
                                    return ReloadSignal::Reloaded(config);
                                }
                                Err(e) => {
                                    tracing::warn!("Ignoring invalid slider configuration: {}", e);
                                }
                            }
                        }
                        Err(_) => {
                            tracing::debug!("Configuration channel closed, no further reloads");
                            self.closed = true;
                        }
                    }
                }
                _ = wait_for(self.deadline) => {
                    self.deadline = None;
                    return ReloadSignal::ResetDue;
                }
            }
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
