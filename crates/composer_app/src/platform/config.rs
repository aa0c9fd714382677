//! Start-up configuration for the terminal composer.
//!
//! Read from `./composer.ron` (or the path given on the command line).
//! Every field is optional; anything missing falls back to its default.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use composer_core::ComposerSettings;
use composer_engine::AgentSettings;
use composer_logging::{LogDestination, DEFAULT_LOG_FILE};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "./composer.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `queue.ron` and `history.ron`.
    pub state_dir: PathBuf,
    pub agent_reply_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub log_target: LogTarget,
    pub log_file: PathBuf,
    pub log_level: LogLevel,
    pub settle_delay_ms: u64,
    pub mount_drain_delay_ms: u64,
    pub interruption_words: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let settings = ComposerSettings::default();
        Self {
            state_dir: PathBuf::from("./.composer"),
            agent_reply_delay_ms: duration_ms(AgentSettings::default().reply_delay),
            tick_interval_ms: 75,
            log_target: LogTarget::File,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: LogLevel::Info,
            settle_delay_ms: duration_ms(settings.settle_delay),
            mount_drain_delay_ms: duration_ms(settings.mount_drain_delay),
            interruption_words: settings.interruption_words,
        }
    }
}

impl AppConfig {
    /// Reads the config at `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config {:?}", path))
            }
        };
        ron::from_str(&content).with_context(|| format!("failed to parse config {:?}", path))
    }

    pub fn composer_settings(&self) -> ComposerSettings {
        ComposerSettings {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            mount_drain_delay: Duration::from_millis(self.mount_drain_delay_ms),
            interruption_words: self
                .interruption_words
                .iter()
                .map(|word| word.trim().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect(),
        }
    }

    pub fn agent_settings(&self) -> AgentSettings {
        AgentSettings {
            reply_delay: Duration::from_millis(self.agent_reply_delay_ms),
        }
    }

    pub fn log_destination(&self) -> LogDestination {
        match self.log_target {
            LogTarget::File => LogDestination::File(self.log_file.clone()),
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both(self.log_file.clone()),
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.into()
    }

    /// Never zero, so the tick thread cannot spin.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
