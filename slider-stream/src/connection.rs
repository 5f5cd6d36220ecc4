//! Public facade over the slider worker

use std::sync::Arc;

use esphome_client::EspHomeClient;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::broadcaster::EventBroadcaster;
use crate::config::{DeliveryPolicy, SliderConfig, StreamConfig};
use crate::detector::ChangeDetector;
use crate::error::{Result, SliderError};
use crate::events::SliderEvents;
use crate::fetcher::{SensorFetcher, SensorSource};
use crate::reload::ReloadWatcher;
use crate::types::ConnectionState;
use crate::worker::{Command, Worker};

/// Connection to one ESPHome slider controller
///
/// Creating a connection spawns a background worker on the current tokio
/// runtime; polling begins with [`start`](Self::start). The configuration is
/// read from a `watch` channel, and every value sent on it is applied live.
///
/// # Example
///
/// ```rust,ignore
/// use slider_stream::{SliderConfig, SliderConnection};
/// use tokio::sync::watch;
///
/// let config = SliderConfig::new("192.168.1.40", ["slider_1", "slider_2"]);
/// let (config_tx, config_rx) = watch::channel(config);
///
/// let connection = SliderConnection::new(config_rx)?;
/// let mut events = connection.subscribe();
/// connection.start().await?;
///
/// while let Some(event) = events.recv().await {
///     println!("{}", event);
/// }
/// ```
pub struct SliderConnection {
    commands: mpsc::Sender<Command>,
    broadcaster: EventBroadcaster,
    state: watch::Receiver<ConnectionState>,
    worker: Option<JoinHandle<()>>,
}

impl SliderConnection {
    /// Create a connection that polls over HTTP with default stream settings
    pub fn new(config: watch::Receiver<SliderConfig>) -> Result<Self> {
        Self::with_stream_config(config, StreamConfig::default())
    }

    /// Create a connection that polls over HTTP with custom stream settings
    pub fn with_stream_config(
        config: watch::Receiver<SliderConfig>,
        stream: StreamConfig,
    ) -> Result<Self> {
        stream.validate()?;
        let client = EspHomeClient::with_timeout(stream.request_timeout)?;
        Self::with_source(config, stream, Arc::new(client))
    }

    /// Create a connection that reads sensors from `source`
    pub fn with_source(
        config: watch::Receiver<SliderConfig>,
        stream: StreamConfig,
        source: Arc<dyn SensorSource>,
    ) -> Result<Self> {
        stream.validate()?;

        let initial = config.borrow().clone();
        initial.validate()?;

        if tokio::runtime::Handle::try_current().is_err() {
            return Err(SliderError::Configuration(
                "slider connection must be created inside a tokio runtime".to_string(),
            ));
        }

        let (command_tx, command_rx) = mpsc::channel(stream.command_buffer);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let broadcaster = EventBroadcaster::new(stream.subscriber_buffer, stream.delivery_policy);

        let worker = Worker::new(
            command_rx,
            ReloadWatcher::new(config, stream.reload_reset_delay),
            SensorFetcher::new(source, &initial),
            ChangeDetector::from_config(&initial),
            broadcaster.clone(),
            state_tx,
            initial.verbose,
        );

        tracing::debug!("Created slider connection for {}", initial.device_address);

        Ok(Self {
            commands: command_tx,
            broadcaster,
            state: state_rx,
            worker: Some(worker.spawn()),
        })
    }

    /// Begin polling the device
    ///
    /// Fails with [`SliderError::AlreadyConnected`] if polling is already
    /// active. Sensor failures after this point never surface here.
    pub async fn start(&self) -> Result<()> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Start { reply }).await?;
        response
            .await
            .map_err(|_| SliderError::WorkerDisconnected)?
    }

    /// Stop polling and wait until the worker is idle
    ///
    /// Does nothing if polling is not active. A fetch cycle in progress is
    /// abandoned.
    pub async fn stop(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.send(Command::Stop { ack }).await?;
        done.await.map_err(|_| SliderError::WorkerDisconnected)
    }

    /// Register a new event subscriber
    ///
    /// May be called at any time, including before [`start`](Self::start).
    /// The subscriber sees only events produced after registration.
    pub fn subscribe(&self) -> SliderEvents {
        self.broadcaster.subscribe()
    }

    /// Register a subscriber with its own queue size and delivery policy
    pub fn subscribe_with(&self, buffer: usize, policy: DeliveryPolicy) -> SliderEvents {
        self.broadcaster.subscribe_with(buffer, policy)
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Receiver notified on every lifecycle change
    pub fn state_updates(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }

    /// Stop the worker and wait for it to exit
    ///
    /// Subscribers see their streams end once this returns.
    pub async fn shutdown(mut self) -> Result<()> {
        // A worker that already exited has nothing left to shut down
        let _ = self.commands.send(Command::Shutdown).await;

        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                tracing::warn!("Slider worker ended abnormally: {}", e);
                return Err(SliderError::WorkerDisconnected);
            }
        }
        Ok(())
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SliderError::WorkerDisconnected)
    }
}

impl Drop for SliderConnection {
    fn drop(&mut self) {
        if self.worker.is_some() {
            tracing::debug!(
                "SliderConnection dropping, {} subscribers",
                self.broadcaster.subscriber_count()
            );
            // The worker also exits once the command channel closes
            let _ = self.commands.try_send(Command::Shutdown);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_runtime() {
        let (_tx, rx) = watch::channel(SliderConfig::new("10.0.0.1", ["a"]));

        let result = SliderConnection::new(rx);

        assert!(matches!(result, Err(SliderError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_rejects_invalid_slider_config() {
        let (_tx, rx) = watch::channel(SliderConfig::new("", ["a"]));

        let result = SliderConnection::new(rx);

        assert!(matches!(result, Err(SliderError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_rejects_config_without_sliders() {
        let (_tx, rx) = watch::channel(SliderConfig::new("10.0.0.1", Vec::<String>::new()));

        let result = SliderConnection::new(rx);

        assert!(matches!(result, Err(SliderError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_rejects_invalid_stream_config() {
        let (_tx, rx) = watch::channel(SliderConfig::new("10.0.0.1", ["a"]));

        let result =
            SliderConnection::with_stream_config(rx, StreamConfig::new().with_subscriber_buffer(0));

        assert!(matches!(result, Err(SliderError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_shutdown_ends_subscriptions() {
        let (_tx, rx) = watch::channel(SliderConfig::new("10.0.0.1", ["a"]));
        let connection = SliderConnection::new(rx).unwrap();
        let mut events = connection.subscribe();
        assert_eq!(connection.state(), ConnectionState::Idle);

        connection.shutdown().await.unwrap();

        assert!(events.recv().await.is_none());
    }
}
