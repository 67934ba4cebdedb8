use std::path::{Path, PathBuf};

use hlog_audit::logger::DEFAULT_QUEUE_CAPACITY;
use hlog_audit::LogPaths;
use serde::Deserialize;

use crate::error::ClientError;

#[derive(Debug, Default, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub audit: AuditSection,
}

#[derive(Debug, Deserialize)]
pub struct PathsSection {
    /// Directory holding the area file and both logs.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_area_file")]
    pub area_file: String,
    #[serde(default = "default_jsonl_log")]
    pub jsonl_log: String,
    #[serde(default = "default_text_log")]
    pub text_log: String,
}

fn default_data_dir() -> String {
    "config".into()
}

fn default_area_file() -> String {
    "hitlist-blockaudit-area.json".into()
}

fn default_jsonl_log() -> String {
    "hitlist-blockaudit-log.jsonl".into()
}

fn default_text_log() -> String {
    "hitlist-blockaudit.log".into()
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            area_file: default_area_file(),
            jsonl_log: default_jsonl_log(),
            text_log: default_text_log(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuditSection {
    /// Pending disk tasks allowed before new ones are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl ClientConfig {
    /// Read a TOML config. A missing file gives the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ClientError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Config with every file under `dir`.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.paths.data_dir = dir.into().to_string_lossy().into_owned();
        config
    }

    pub fn log_paths(&self) -> LogPaths {
        LogPaths::in_dir(
            Path::new(&self.paths.data_dir),
            &self.paths.area_file,
            &self.paths.jsonl_log,
            &self.paths.text_log,
        )
    }
}
