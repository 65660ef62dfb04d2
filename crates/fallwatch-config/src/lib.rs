mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Per-user directory holding the service config, created on first use.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("fallwatch");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// `config.toml` inside [`config_dir`].
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load the per-user service config. A fresh install runs on defaults.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path()?)
}

/// Load the service config at `path`.
///
/// Missing sections and keys take their defaults, and zero durations are
/// replaced (see [`AppConfig::sanitize`]). A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        info!(?path, "No config found, using defaults");
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)?;
    let mut config: AppConfig = toml::from_str(&contents)?;
    config.sanitize();
    info!(
        ?path,
        sensor = %config.sensor.base_url,
        interval_ms = config.poll.interval_ms,
        "Loaded config"
    );
    Ok(config)
}

/// Write the service config to the per-user location, as `init-config` does.
pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(config, &config_path()?)
}

/// Write the service config to `path` as pretty TOML.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    info!(?path, "Saved config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.filter.beta, 0.1);
        assert_eq!(config.filter.sample_freq, 50.0);
        assert_eq!(config.sensor.fetch_timeout().as_millis(), 1000);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = AppConfig::default();
        config.sensor.base_url = "http://10.0.0.7".into();
        config.poll.interval_ms = 250;

        save_config_to(&config, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[filter]\nbeta = 0.05\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.filter.beta, 0.05);
        assert_eq!(config.filter.sample_freq, 50.0);
        assert_eq!(config.sensor, SensorConfig::default());
    }

    #[test]
    fn zero_durations_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[poll]\ninterval_ms = 0\n\n[sensor]\nfetch_timeout_ms = 0\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.poll.interval_ms, 500);
        assert_eq!(config.sensor.fetch_timeout_ms, 1000);
        assert!(!config.poll.interval().is_zero());
    }

    #[test]
    fn zero_durations_are_never_handed_out() {
        let poll = PollConfig { interval_ms: 0 };
        let sensor = SensorConfig {
            fetch_timeout_ms: 0,
            ..SensorConfig::default()
        };
        assert_eq!(poll.interval(), MIN_DURATION);
        assert_eq!(sensor.fetch_timeout(), MIN_DURATION);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[filter\nbeta = ").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
