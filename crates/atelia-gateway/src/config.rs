//! TOML configuration with standard-location discovery.

use std::path::{Path, PathBuf};

use {
    serde::{Deserialize, Serialize},
    tracing::{debug, warn},
};

/// Config file name, checked project-local first, then user-global.
const CONFIG_FILENAME: &str = "atelia.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AteliaConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the generation backend's REST surface.
    pub base_url: String,
    pub connect_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000".into(),
            connect_timeout_secs: 10,
        }
    }
}

/// Load config from the given path.
pub fn load_config(path: &Path) -> anyhow::Result<AteliaConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    Ok(toml::from_str(&raw)?)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./atelia.toml` (project-local)
/// 2. `~/.config/atelia/atelia.toml` (user-global)
///
/// Returns `AteliaConfig::default()` if no config file is found.
pub fn discover_and_load() -> AteliaConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    AteliaConfig::default()
}

fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }
    if let Some(dirs) = directories::ProjectDirs::from("", "", "atelia") {
        let p = dirs.config_dir().join(CONFIG_FILENAME);
        if p.exists() {
            return Some(p);
        }
    }
    None
}
