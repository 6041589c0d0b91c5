//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Simulator configuration model and loader."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::debug;

use crate::logging::LogFormat;

fn default_broker_host() -> String {
    "broker.hivemq.com".to_owned()
}

fn default_broker_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "panel-simulator".to_owned()
}

fn default_keep_alive() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_request_capacity() -> usize {
    10
}

fn default_topic() -> String {
    "sensor/panel/utama".to_owned()
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Primary configuration object for the panel simulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
///
/// `source` is `None` when no file was found and built-in defaults apply.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "PANELSIM_CONFIG";

    /// Load configuration, respecting the `PANELSIM_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration together with the effective source path.
    ///
    /// An explicit `PANELSIM_CONFIG` path must exist. Missing candidates are skipped and the
    /// defaults are returned when none of them is present.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path.to_path_buf()),
                });
            }
        }

        debug!("no configuration file found; using built-in defaults");
        let config = Self::default();
        config.validate()?;
        Ok(LoadedAppConfig {
            config,
            source: None,
        })
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.broker.validate()?;
        self.publish.validate()?;
        self.simulation.validate()?;
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

/// MQTT broker session settings.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_broker_host")]
    pub host: String,
    #[serde(default = "default_broker_port")]
    pub port: u16,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_keep_alive")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub keep_alive: Duration,
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub connect_timeout: Duration,
    /// Bound of the client request queue.
    #[serde(default = "default_request_capacity")]
    pub request_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: default_broker_host(),
            port: default_broker_port(),
            client_id: default_client_id(),
            keep_alive: default_keep_alive(),
            connect_timeout: default_connect_timeout(),
            request_capacity: default_request_capacity(),
        }
    }
}

impl BrokerConfig {
    /// `host:port` form used in log lines.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(anyhow!("broker host cannot be empty"));
        }
        if self.port == 0 {
            return Err(anyhow!("broker port must be non-zero"));
        }
        if self.client_id.trim().is_empty() {
            return Err(anyhow!("broker client_id cannot be empty"));
        }
        if !self.keep_alive.is_zero() && self.keep_alive < Duration::from_secs(1) {
            return Err(anyhow!("broker keep_alive must be zero or at least one second"));
        }
        if self.connect_timeout.is_zero() {
            return Err(anyhow!("broker connect_timeout must be greater than zero"));
        }
        if self.request_capacity == 0 {
            return Err(anyhow!("broker request_capacity must be greater than zero"));
        }
        Ok(())
    }
}

/// Destination of the panel records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default = "default_topic")]
    pub topic: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
        }
    }
}

impl PublishConfig {
    pub fn validate(&self) -> Result<()> {
        if self.topic.is_empty() {
            return Err(anyhow!("publish topic cannot be empty"));
        }
        if self.topic.contains(['+', '#']) {
            return Err(anyhow!(
                "publish topic '{}' must not contain MQTT wildcards",
                self.topic
            ));
        }
        Ok(())
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_tick_interval")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub tick_interval: Duration,
    /// Fixed RNG seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Stop after this many ticks; unbounded when absent.
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
            seed: None,
            max_ticks: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(anyhow!("simulation tick_interval must be greater than zero"));
        }
        if self.max_ticks == Some(0) {
            return Err(anyhow!("simulation max_ticks must be greater than zero when set"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_reference_panel() {
        let config = AppConfig::default();
        assert_eq!(config.broker.endpoint(), "broker.hivemq.com:1883");
        assert_eq!(config.publish.topic, "sensor/panel/utama");
        assert_eq!(config.simulation.tick_interval, Duration::from_secs(5));
        assert!(config.simulation.seed.is_none());
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn parses_partial_toml() {
        let config: AppConfig = r#"
            [broker]
            host = "localhost"

            [simulation]
            tick_interval = 1
            seed = 7
        "#
        .parse()
        .expect("config parses");
        assert_eq!(config.broker.host, "localhost");
        assert_eq!(config.broker.port, 1883);
        assert_eq!(config.simulation.tick_interval, Duration::from_secs(1));
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn rejects_wildcard_topic() {
        let err = r#"
            [publish]
            topic = "sensor/+/utama"
        "#
        .parse::<AppConfig>()
        .unwrap_err();
        assert!(err.to_string().contains("wildcards"));
    }

    #[test]
    fn rejects_zero_interval() {
        let mut config = AppConfig::default();
        config.simulation.tick_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_prefers_first_existing_candidate() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[publish]\ntopic = \"lab/panel\"")?;
        file.flush()?;
        let missing = PathBuf::from("does/not/exist.toml");
        let loaded = AppConfig::load_with_source(&[missing, file.path().to_path_buf()])?;
        assert_eq!(loaded.config.publish.topic, "lab/panel");
        assert_eq!(loaded.source.as_deref(), Some(file.path()));
        Ok(())
    }

    #[test]
    fn load_falls_back_to_defaults() -> Result<()> {
        let loaded = AppConfig::load_with_source(&[PathBuf::from("does/not/exist.toml")])?;
        assert!(loaded.source.is_none());
        assert_eq!(loaded.config.publish.topic, "sensor/panel/utama");
        Ok(())
    }
}
