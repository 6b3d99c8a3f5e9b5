//! Server configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Main configuration for the mock host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the HTTP edge listens on.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Base domain mock hosts hang off (`demo.<base_domain>`). When
    /// unset, the slug is taken from the host's labels beyond the
    /// registrable two.
    #[serde(default)]
    pub base_domain: Option<String>,

    /// Subdomain reserved for the admin routes.
    #[serde(default = "default_admin_subdomain")]
    pub admin_subdomain: String,

    /// Observer channel settings.
    #[serde(default)]
    pub observer: ObserverSettings,

    /// Global settings.
    #[serde(default)]
    pub settings: GlobalSettings,
}

fn default_listen() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_admin_subdomain() -> String {
    "api".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            base_domain: None,
            admin_subdomain: default_admin_subdomain(),
            observer: ObserverSettings::default(),
            settings: GlobalSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.listen
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {:?}: {}", self.listen, e))?;

        if self.admin_subdomain.is_empty() || self.admin_subdomain.contains('.') {
            anyhow::bail!(
                "Invalid admin subdomain {:?}: must be a single non-empty label",
                self.admin_subdomain
            );
        }

        if let Some(base) = &self.base_domain {
            if base.is_empty() || base.starts_with('.') || base.ends_with('.') {
                anyhow::bail!("Invalid base domain {:?}", base);
            }
        }

        if self.observer.channel_capacity == 0 {
            anyhow::bail!("observer.channel_capacity must be at least 1");
        }

        Ok(())
    }
}

/// Observer channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObserverSettings {
    /// Events a lagging subscriber can fall behind before missing some.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for ObserverSettings {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Global settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalSettings {
    /// Log every inbound mock request.
    #[serde(default = "default_true")]
    pub log_requests: bool,

    /// Log admin (registry) operations.
    #[serde(default = "default_true")]
    pub log_admin: bool,
}

fn default_true() -> bool {
    true
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            log_requests: true,
            log_admin: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen, "0.0.0.0:8000");
        assert_eq!(config.admin_subdomain, "api");
        assert_eq!(config.base_domain, None);
        assert_eq!(config.observer.channel_capacity, 64);
        assert!(config.settings.log_requests);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
listen: "127.0.0.1:9000"
base_domain: roketo.cloud
admin_subdomain: admin
observer:
  channel_capacity: 128
settings:
  log_requests: false
"#;
        let config: ServerConfig = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.listen, "127.0.0.1:9000");
        assert_eq!(config.base_domain.as_deref(), Some("roketo.cloud"));
        assert_eq!(config.admin_subdomain, "admin");
        assert_eq!(config.observer.channel_capacity, 128);
        assert!(!config.settings.log_requests);
        assert!(config.settings.log_admin);
    }

    #[test]
    fn test_validate_rejects_bad_listen() {
        let config = ServerConfig {
            listen: "not-an-address".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_dotted_admin_subdomain() {
        let config = ServerConfig {
            admin_subdomain: "api.internal".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = ServerConfig {
            observer: ObserverSettings {
                channel_capacity: 0,
            },
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.yaml");
        std::fs::write(&path, "listen: \"127.0.0.1:8001\"\n").unwrap();

        let config = ServerConfig::from_file(&path).unwrap();
        assert_eq!(config.listen, "127.0.0.1:8001");
        assert_eq!(config.admin_subdomain, "api");
    }
}
