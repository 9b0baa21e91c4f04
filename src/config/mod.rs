//! Configuration for feedbell runs.
//!
//! Values are layered, highest precedence first: command-line flags,
//! `FEEDBELL_*` environment variables (both handled by clap), the TOML
//! config file, then built-in defaults. The config file lives at
//! `~/.config/feedbell/config.toml` unless `--config` points elsewhere; a
//! missing default file simply means defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::app::FeedbellError;
use crate::domain::Topic;
use crate::fetcher::http_fetcher::DEFAULT_TIMEOUT_SECS;
use crate::notify::{Priority, DEFAULT_SERVER};
use crate::pipeline::{RunOptions, TopicMode};

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: Option<String>,
    pub topic: Option<String>,
    pub priority: Option<u8>,
    pub state_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub topic_per_feed: Option<bool>,
}

impl Config {
    /// Load from `path`, or from the default location when `path` is None.
    ///
    /// An explicitly named file must exist; the default one may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config_path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_config_path() {
                Ok(p) => (p, false),
                Err(_) => return Ok(Self::default()),
            },
        };

        if !required && !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %config_path.display(), "Loaded config file");
        Ok(config)
    }

    /// `~/.config/feedbell/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("feedbell").join("config.toml"))
    }

    /// `<data dir>/feedbell`, where dedup records live by default.
    pub fn default_state_dir() -> Result<PathBuf, ConfigError> {
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        Ok(data_dir.join("feedbell"))
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server: Option<String>,
    pub topic: Option<String>,
    pub priority: Option<u8>,
    pub state_dir: Option<PathBuf>,
    pub topic_per_feed: bool,
    pub dry_run: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: String,
    pub topic: Option<Topic>,
    pub topic_mode: TopicMode,
    pub priority: Priority,
    pub state_dir: PathBuf,
    pub timeout: Duration,
    pub dry_run: bool,
}

impl Settings {
    pub fn resolve(overrides: Overrides, config: Config) -> Result<Self, ConfigError> {
        let server = overrides
            .server
            .or(config.server)
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());
        if !server.starts_with("http://") && !server.starts_with("https://") {
            return Err(ConfigError::InvalidServer(server));
        }

        let priority = match overrides.priority.or(config.priority) {
            Some(value) => Priority::new(value).ok_or(ConfigError::InvalidPriority(value))?,
            None => Priority::default(),
        };

        let topic = overrides
            .topic
            .or(config.topic)
            .filter(|t| !t.trim().is_empty())
            .map(|t| Topic::new(t.clone()).map_err(|_| ConfigError::InvalidTopic(t)))
            .transpose()?;

        let topic_mode = if overrides.topic_per_feed || config.topic_per_feed.unwrap_or(false) {
            TopicMode::PerFeed
        } else {
            TopicMode::Sticky
        };

        let state_dir = match overrides.state_dir.or(config.state_dir) {
            Some(dir) => dir,
            None => Config::default_state_dir()?,
        };

        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            server,
            topic,
            topic_mode,
            priority,
            state_dir,
            timeout,
            dry_run: overrides.dry_run,
        })
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            topic: self.topic.clone(),
            topic_mode: self.topic_mode,
            priority: self.priority,
            dry_run: self.dry_run,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Could not determine data directory; pass --state-dir")]
    NoDataDir,

    #[error("Failed to read config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Priority must be between 1 and 5, got {0}")]
    InvalidPriority(u8),

    #[error("Topic {0:?} has no usable characters")]
    InvalidTopic(String),

    #[error("Relay server must be an http(s) URL, got {0:?}")]
    InvalidServer(String),
}

impl From<ConfigError> for FeedbellError {
    fn from(e: ConfigError) -> Self {
        FeedbellError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides_with_dir() -> Overrides {
        Overrides {
            state_dir: Some(PathBuf::from("/tmp/feedbell-test")),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(overrides_with_dir(), Config::default()).unwrap();
        assert_eq!(settings.server, DEFAULT_SERVER);
        assert_eq!(settings.priority, Priority::default());
        assert_eq!(settings.topic, None);
        assert_eq!(settings.topic_mode, TopicMode::Sticky);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(!settings.dry_run);
    }

    #[test]
    fn test_file_values_apply() {
        let config: Config = toml::from_str(
            r#"
server = "https://relay.example"
topic = "alerts"
priority = 5
timeout_secs = 7
topic_per_feed = true
"#,
        )
        .unwrap();
        let settings = Settings::resolve(overrides_with_dir(), config).unwrap();
        assert_eq!(settings.server, "https://relay.example");
        assert_eq!(settings.topic.as_ref().map(Topic::as_str), Some("alerts"));
        assert_eq!(settings.priority.value(), 5);
        assert_eq!(settings.timeout, Duration::from_secs(7));
        assert_eq!(settings.topic_mode, TopicMode::PerFeed);
    }

    #[test]
    fn test_overrides_beat_file() {
        let config = Config {
            server: Some("https://file.example".into()),
            priority: Some(1),
            state_dir: Some(PathBuf::from("/from/file")),
            ..Default::default()
        };
        let overrides = Overrides {
            server: Some("https://cli.example".into()),
            priority: Some(4),
            state_dir: Some(PathBuf::from("/from/cli")),
            dry_run: true,
            ..Default::default()
        };
        let settings = Settings::resolve(overrides, config).unwrap();
        assert_eq!(settings.server, "https://cli.example");
        assert_eq!(settings.priority.value(), 4);
        assert_eq!(settings.state_dir, PathBuf::from("/from/cli"));
        assert!(settings.run_options().dry_run);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = Config {
            priority: Some(9),
            ..Default::default()
        };
        assert!(matches!(
            Settings::resolve(overrides_with_dir(), config),
            Err(ConfigError::InvalidPriority(9))
        ));

        let overrides = Overrides {
            server: Some("ntfy.sh".into()),
            ..overrides_with_dir()
        };
        assert!(matches!(
            Settings::resolve(overrides, Config::default()),
            Err(ConfigError::InvalidServer(_))
        ));

        let overrides = Overrides {
            topic: Some("./()".into()),
            ..overrides_with_dir()
        };
        assert!(matches!(
            Settings::resolve(overrides, Config::default()),
            Err(ConfigError::InvalidTopic(_))
        ));
    }

    #[test]
    fn test_blank_topic_means_unset() {
        let overrides = Overrides {
            topic: Some("   ".into()),
            ..overrides_with_dir()
        };
        let settings = Settings::resolve(overrides, Config::default()).unwrap();
        assert!(settings.topic.is_none());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<Config>("colour = \"red\"").is_err());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "priority = 2\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.priority, Some(2));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "priority = \"high\"\n").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }
}
