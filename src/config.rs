//! Simulator configuration: TOML file on disk plus environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default roster/admin/ws settings for the simulator process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ws_url: String,
    pub roster_path: PathBuf,
    pub call_timeout_secs: u64,
    pub meter_tick_secs: u64,
    pub shutdown_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://proxy.plugchoice.com/v1".to_string(),
            roster_path: PathBuf::from("roster.json"),
            call_timeout_secs: 120,
            meter_tick_secs: 15,
            shutdown_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults if the file is absent or
    /// unreadable. The `WS_URL` environment variable always wins, matching
    /// the original single env override.
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);

        let mut config = match std::fs::read_to_string(&resolved) {
            Ok(text) => match toml::from_str::<AppConfig>(&text) {
                Ok(cfg) => {
                    info!(path = %resolved.display(), "loaded configuration");
                    cfg
                }
                Err(e) => {
                    warn!(path = %resolved.display(), error = %e, "failed to parse configuration, using defaults");
                    AppConfig::default()
                }
            },
            Err(_) => AppConfig::default(),
        };

        if let Ok(url) = std::env::var("WS_URL") {
            config.ws_url = url;
        }

        config
    }
}

/// `~/.config/vcpsim/config.toml`, or `./vcpsim.toml` if the home directory
/// cannot be resolved.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("vcpsim").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("vcpsim.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.call_timeout_secs, 120);
        assert_eq!(config.meter_tick_secs, 15);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/path/vcpsim.toml")));
        assert_eq!(config.roster_path, PathBuf::from("roster.json"));
    }
}
