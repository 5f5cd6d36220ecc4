//! Background task that owns the device state
//!
//! The facade talks to the worker only through [`Command`]s. The worker is
//! the single owner of the fetcher and change detector, so reloads, resets
//! and poll cycles never race each other.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::broadcaster::EventBroadcaster;
use crate::detector::ChangeDetector;
use crate::error::{Result, SliderError};
use crate::fetcher::SensorFetcher;
use crate::reload::{ReloadSignal, ReloadWatcher};
use crate::types::{ConnectionState, ReadingVector};

/// Commands sent from [`SliderConnection`](crate::SliderConnection) to the worker
#[derive(Debug)]
pub enum Command {
    /// Begin polling; the reply reports `AlreadyConnected` if already polling
    Start { reply: oneshot::Sender<Result<()>> },
    /// Stop polling; acknowledged once the worker is idle
    Stop { ack: oneshot::Sender<()> },
    /// Exit the worker
    Shutdown,
}

pub(crate) struct Worker {
    commands: mpsc::Receiver<Command>,
    reload: ReloadWatcher,
    fetcher: SensorFetcher,
    detector: ChangeDetector,
    broadcaster: EventBroadcaster,
    state: watch::Sender<ConnectionState>,
    verbose: bool,
}

impl Worker {
    pub(crate) fn new(
        commands: mpsc::Receiver<Command>,
        reload: ReloadWatcher,
        fetcher: SensorFetcher,
        detector: ChangeDetector,
        broadcaster: EventBroadcaster,
        state: watch::Sender<ConnectionState>,
        verbose: bool,
    ) -> Self {
        Self {
            commands,
            reload,
            fetcher,
            detector,
            broadcaster,
            state,
            verbose,
        }
    }

    /// Spawn the worker on the current tokio runtime
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        let span = tracing::info_span!("esphome", device = %self.fetcher.device_address());
        tokio::spawn(self.run().instrument(span))
    }

    fn is_connected(&self) -> bool {
        *self.state.borrow() == ConnectionState::Connected
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    async fn run(mut self) {
        tracing::debug!("Slider worker started");

        loop {
            let connected = self.is_connected();

            tokio::select! {
                biased;

                command = self.commands.recv() => {
                    match command {
                        Some(command) => {
                            if !self.handle_command(command) {
                                break;
                            }
                        }
                        None => {
                            tracing::debug!("Command channel closed, shutting down worker");
                            break;
                        }
                    }
                }

                signal = self.reload.next() => self.handle_reload(signal),

                vector = self.fetcher.next_vector(), if connected => {
                    self.handle_vector(vector).await;
                    // A device that answers instantly must not starve the runtime
                    tokio::task::yield_now().await;
                }
            }
        }

        if self.is_connected() {
            tracing::debug!("ESPHome connection closed");
        }
        self.set_state(ConnectionState::Idle);
        tracing::debug!("Slider worker shut down");
    }

    /// Returns false when the worker should exit
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Start { reply } => {
                let result = if self.is_connected() {
                    tracing::warn!("Already connected, can't start another without closing first");
                    Err(SliderError::AlreadyConnected)
                } else {
                    tracing::info!(
                        "Polling {} sliders on {}",
                        self.fetcher.slider_count(),
                        self.fetcher.device_address()
                    );
                    self.set_state(ConnectionState::Connected);
                    Ok(())
                };
                // The caller may have given up waiting
                let _ = reply.send(result);
                true
            }
            Command::Stop { ack } => {
                if self.is_connected() {
                    tracing::debug!("ESPHome connection closed");
                    self.set_state(ConnectionState::Idle);
                }
                let _ = ack.send(());
                true
            }
            Command::Shutdown => {
                tracing::debug!("Worker received shutdown command");
                false
            }
        }
    }

    fn handle_reload(&mut self, signal: ReloadSignal) {
        match signal {
            ReloadSignal::Reloaded(config) => {
                tracing::info!(
                    "Slider configuration reloaded ({} sliders on {})",
                    config.slider_count(),
                    config.device_address
                );
                self.fetcher.apply_config(&config);
                self.detector
                    .set_options(config.invert_sliders, config.noise_reduction.threshold());
                self.verbose = config.verbose;
            }
            ReloadSignal::ResetDue => {
                tracing::debug!("Resetting slider count after configuration reload");
                self.detector.reset_slider_count();
            }
        }
    }

    async fn handle_vector(&mut self, vector: ReadingVector) {
        let events = self.detector.process(&vector);
        if events.is_empty() {
            return;
        }

        if self.verbose {
            for event in &events {
                tracing::debug!("Slider moved: {}", event);
            }
        }

        self.broadcaster.publish(&events).await;
    }
}
