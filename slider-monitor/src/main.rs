use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use slider_stream::{SliderConfig, SliderConnection, SliderMoveEvent};
use tokio::sync::watch;
use tracing::{error, info, warn};

pub mod config_file;

use config_file::{default_config_path, load_config, watch_config_file, ConfigFileWatcher};

/// ESPHome Slider Monitor
///
/// Polls the slider sensors of an ESPHome device and prints every slider
/// movement. Edits to the config file are picked up while running.
#[derive(Parser, Debug)]
#[command(name = "slider-monitor")]
#[command(about = "Print slider movements from an ESPHome mixer controller")]
#[command(version)]
pub struct Args {
    /// Slider config file (JSON); defaults to <config dir>/mixer-sliders/config.json
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// How often to check the config file for changes, in milliseconds
    #[arg(short = 'w', long, default_value = "1000")]
    pub watch_interval_ms: u64,

    /// Log every read cycle and slider move, whatever the config file says
    #[arg(short, long)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Parse command line arguments, letting environment variables override them
    pub fn from_env() -> Result<Self> {
        let mut args = Args::parse();

        if let Ok(path) = std::env::var("SLIDER_MONITOR_CONFIG") {
            args.config = Some(PathBuf::from(path));
        }

        if let Ok(interval) = std::env::var("SLIDER_MONITOR_WATCH_INTERVAL_MS") {
            args.watch_interval_ms = interval
                .parse()
                .context("Invalid SLIDER_MONITOR_WATCH_INTERVAL_MS environment variable")?;
        }

        if let Ok(log_level) = std::env::var("SLIDER_MONITOR_LOG_LEVEL") {
            args.log_level = log_level;
        }

        args.validate()?;
        Ok(args)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }

    /// Validate command line arguments
    pub fn validate(&self) -> Result<()> {
        if self.watch_interval_ms == 0 {
            return Err(anyhow::anyhow!("Watch interval must be positive"));
        }

        match self.log_level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            _ => {
                return Err(anyhow::anyhow!(
                    "Invalid log level '{}'. Valid levels: error, warn, info, debug, trace",
                    self.log_level
                ));
            }
        }

        Ok(())
    }
}

/// Initialize tracing; `RUST_LOG` wins over the log level argument
fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.to_lowercase())),
        )
        .init();
}

fn describe(event: &SliderMoveEvent, config: &SliderConfig) -> String {
    match config.slider_names.get(event.slider_index) {
        Some(name) => format!("{:<16} {:>4.0}%", name, event.percent_value * 100.0),
        None => format!("{:<16} {:>4.0}%", event.slider_index, event.percent_value * 100.0),
    }
}

async fn run(args: Args) -> Result<()> {
    let path = args.config_path();
    info!("Loading slider config from {}", path.display());

    let mut config = load_config(&path)?;
    config.verbose |= args.verbose;
    info!(
        "Monitoring {} sliders on {}",
        config.slider_count(),
        config.device_address
    );

    let (config_tx, config_rx) = watch::channel(config);
    let current_config = config_tx.subscribe();

    let connection =
        SliderConnection::new(config_rx).context("Failed to create slider connection")?;
    let mut events = connection.subscribe();

    let watcher = ConfigFileWatcher::new(&path).with_force_verbose(args.verbose);
    let watch_task = tokio::spawn(watch_config_file(watcher, args.watch_interval(), config_tx));

    connection.start().await.context("Failed to start polling")?;
    println!("Watching sliders, press Ctrl+C to stop");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => println!("{}", describe(&event, &current_config.borrow())),
                None => {
                    warn!("Slider event stream ended");
                    break;
                }
            },
            result = &mut shutdown => {
                if let Err(e) = result {
                    error!("Failed to listen for Ctrl+C: {}", e);
                }
                info!("Shutting down");
                break;
            }
        }
    }

    watch_task.abort();
    connection.stop().await?;
    connection.shutdown().await?;

    if events.dropped_events() > 0 {
        warn!(
            "{} slider events were dropped because output fell behind",
            events.dropped_events()
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::from_env()?;
    init_tracing(&args.log_level);

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        return Err(e);
    }

    Ok(())
}
