use crate::error::{HealthError, Result};
use crate::types::config::EngineConfig;
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "repo-health.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".repo-health/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/repo-health/config.toml";

/// Loads the layered configuration for `dir`: user-global, then the
/// directory's `repo-health.toml`, then its untracked local override.
/// Missing layers are skipped; with no layers at all the defaults apply.
pub fn load_config(dir: &Path) -> Result<EngineConfig> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(dir, global.as_deref())
}

pub(crate) fn load_config_with_global(
    dir: &Path,
    global_path: Option<&Path>,
) -> Result<EngineConfig> {
    let mut merged = Value::Table(Map::new());
    if let Some(path) = global_path {
        merge_file_if_exists(&mut merged, path)?;
    }
    merge_file_if_exists(&mut merged, &dir.join(DEFAULT_CONFIG_FILE))?;
    merge_file_if_exists(&mut merged, &dir.join(DEFAULT_LOCAL_FILE))?;

    let cfg: EngineConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| HealthError::ConfigParse(e.to_string()))?;
    cfg.validate()?;
    Ok(cfg)
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    debug!(path = %path.display(), "merging config layer");
    let value = read_toml_value(path)?;
    merge_toml(merged, value);
    Ok(())
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| HealthError::ConfigParse(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}
