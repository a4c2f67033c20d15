use crate::types::report::MetricKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealthError {
    #[error("invalid input: {0}")]
    Input(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("{0} extractor failed")]
    ExtractorFailed(MetricKind),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HealthError>;
