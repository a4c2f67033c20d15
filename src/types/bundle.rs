use crate::error::{HealthError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Already-fetched activity data as handed over by a collector. Record
/// sequences stay loosely typed until the normalizer coerces them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBundle {
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub basic_info: Value,
    #[serde(default)]
    pub repository_stats: Value,
    #[serde(default)]
    pub commits: Value,
    #[serde(default)]
    pub pull_requests: Value,
    #[serde(default)]
    pub issues: Value,
    #[serde(default)]
    pub contributors: Value,
    #[serde(default)]
    pub branches: Value,
}

impl RawBundle {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| HealthError::Input(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HealthError::PathNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| HealthError::Input(format!("{}: {}", path.display(), e)))
    }

    pub fn repository_name(&self) -> String {
        self.repository
            .clone()
            .or_else(|| {
                ["full_name", "name"].iter().find_map(|key| {
                    self.basic_info
                        .get(key)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
            })
            .unwrap_or_else(|| "unknown".to_string())
    }
}
