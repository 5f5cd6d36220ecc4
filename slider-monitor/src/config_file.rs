//! Slider configuration file loading and live reload

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use slider_stream::SliderConfig;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Directory under the user config dir holding the default config file
const CONFIG_DIR: &str = "mixer-sliders";
const CONFIG_FILE: &str = "config.json";

/// Default config file location, `<config dir>/mixer-sliders/config.json`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Parse and validate a JSON slider configuration
pub fn parse_config(contents: &str) -> Result<SliderConfig> {
    let config: SliderConfig =
        serde_json::from_str(contents).context("Invalid slider configuration JSON")?;
    config.validate()?;
    Ok(config)
}

/// Read, parse and validate the config file at `path`
pub fn load_config(path: &Path) -> Result<SliderConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Failed to load {}", path.display()))
}

/// Detects config file changes by modification time
pub struct ConfigFileWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
    force_verbose: bool,
}

impl ConfigFileWatcher {
    /// Watch `path`; the file as it is now counts as already loaded
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let last_modified = modified(&path);
        Self {
            path,
            last_modified,
            force_verbose: false,
        }
    }

    /// Keep verbose logging on regardless of what reloaded files say
    pub fn with_force_verbose(mut self, force_verbose: bool) -> Self {
        self.force_verbose = force_verbose;
        self
    }

    /// Load the file if it changed since the last poll
    ///
    /// A missing file is not an error; the previous configuration stays.
    pub fn poll(&mut self) -> Result<Option<SliderConfig>> {
        let Some(modified) = modified(&self.path) else {
            return Ok(None);
        };
        if self.last_modified == Some(modified) {
            return Ok(None);
        }
        self.last_modified = Some(modified);

        let mut config = load_config(&self.path)?;
        config.verbose |= self.force_verbose;
        Ok(Some(config))
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Poll the config file every `interval` and publish changes to `updates`
///
/// Runs until every receiver of `updates` is gone. Files that fail to parse
/// are logged and skipped.
pub async fn watch_config_file(
    mut watcher: ConfigFileWatcher,
    interval: Duration,
    updates: watch::Sender<SliderConfig>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match watcher.poll() {
            Ok(Some(config)) => {
                info!("Config file changed, reloading {} sliders", config.slider_count());
                if updates.send(config).is_err() {
                    debug!("No configuration receivers left, stopping config watcher");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Ignoring config file change: {:#}", e),
        }
    }
}
