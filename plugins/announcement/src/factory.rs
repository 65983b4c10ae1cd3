use std::path::PathBuf;

use bootkit_core::config::ConfigError;
use bootkit_core::logging::SharedLogger;
use bootkit_core::plugin_system::{PluginFactory, Result};

use crate::config::Config;
use crate::consts::{HOST_CONFIG_PATH, PLUGIN_NAME, PLUGIN_VERSION};
use crate::plugin::AnnouncementPlugin;

static EMBEDDED_CONFIG: &str = include_str!("../config.yaml");

/// Builds [`AnnouncementPlugin`]s.
///
/// The default configuration comes from the host override file when it
/// exists, then from the embedded `config.yaml`, then `Config::default()`.
#[derive(Debug, Clone)]
pub struct AnnouncementFactory {
    host_config_path: PathBuf,
}

impl Default for AnnouncementFactory {
    fn default() -> Self {
        Self {
            host_config_path: PathBuf::from(HOST_CONFIG_PATH),
        }
    }
}

impl AnnouncementFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for the host override somewhere other than `plugins/announcement/config.yaml`.
    pub fn with_host_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.host_config_path = path.into();
        self
    }

    fn load_default(&self) -> std::result::Result<Config, serde_yaml::Error> {
        match std::fs::read_to_string(&self.host_config_path) {
            Ok(text) => serde_yaml::from_str(&text),
            Err(_) => serde_yaml::from_str(EMBEDDED_CONFIG),
        }
    }
}

impl PluginFactory for AnnouncementFactory {
    type Config = Config;
    type Plugin = AnnouncementPlugin;

    fn plugin_type(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> &str {
        PLUGIN_VERSION
    }

    fn description(&self) -> &str {
        "Polls announcement sources on a fixed interval"
    }

    fn default_config(&self) -> Config {
        self.load_default().unwrap_or_else(|e| {
            log::warn!("[{}] Failed to load default config: {}", PLUGIN_NAME, e);
            Config::default()
        })
    }

    fn validate_config(&self, config: &Config) -> std::result::Result<(), ConfigError> {
        if config.sources.is_empty() {
            return Err(ConfigError::invalid("no announcement sources configured"));
        }
        for (i, source) in config.sources.iter().enumerate() {
            if source.name.is_empty() {
                return Err(ConfigError::invalid(format!("source[{}]: name is required", i)));
            }
            if source.url.is_empty() {
                return Err(ConfigError::invalid(format!("source[{}]: url is required", i)));
            }
            if source.interval == 0 {
                return Err(ConfigError::invalid(format!("source[{}]: interval must be positive", i)));
            }
        }
        Ok(())
    }

    fn create(&self, instance_id: &str, config: Config, logger: SharedLogger) -> Result<AnnouncementPlugin> {
        Ok(AnnouncementPlugin::new(instance_id, config, logger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Source;

    fn source(name: &str, url: &str, interval: u64) -> Source {
        Source {
            name: name.to_string(),
            url: url.to_string(),
            interval,
        }
    }

    fn missing_override() -> AnnouncementFactory {
        AnnouncementFactory::new().with_host_config_path("/nonexistent/announcement/config.yaml")
    }

    #[test]
    fn test_default_config_comes_from_embedded_yaml() {
        let factory = missing_override();
        let config = factory.default_config();
        assert_eq!(config.name, "default");
        assert!(config.enabled);
        assert_eq!(config.sources.len(), 1);
        assert!(factory.validate_config(&config).is_ok());
    }

    #[test]
    fn test_host_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "name: host\nenabled: false\nsources:\n  - name: a\n    url: https://a\n    interval: 9\n",
        )
        .unwrap();

        let config = AnnouncementFactory::new().with_host_config_path(&path).default_config();
        assert_eq!(config.name, "host");
        assert!(!config.enabled);
        assert_eq!(config.sources[0].interval, 9);
    }

    #[test]
    fn test_unparseable_override_falls_back_to_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "sources: {not: [a list").unwrap();

        let config = AnnouncementFactory::new().with_host_config_path(&path).default_config();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validation_rules() {
        let factory = missing_override();
        let mut config = Config::default();

        let err = factory.validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("no announcement sources"));

        config.sources = vec![source("", "https://a", 1)];
        assert!(factory.validate_config(&config).unwrap_err().to_string().contains("source[0]: name"));

        config.sources = vec![source("a", "https://a", 1), source("b", "", 1)];
        assert!(factory.validate_config(&config).unwrap_err().to_string().contains("source[1]: url"));

        config.sources = vec![source("a", "https://a", 0)];
        assert!(factory.validate_config(&config).unwrap_err().to_string().contains("interval"));

        config.sources = vec![source("a", "https://a", 30)];
        assert!(factory.validate_config(&config).is_ok());
    }
}
