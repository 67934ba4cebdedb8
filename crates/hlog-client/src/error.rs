use hlog_audit::AreaFileError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("area file: {0}")]
    AreaFile(#[from] AreaFileError),
    #[error("scenario line {line}: {source}")]
    Scenario {
        line: usize,
        source: serde_json::Error,
    },
}
