//! TTS audio cache configuration

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

/// Where synthesized audio is kept between requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// `<hex>.audio` files under a directory (survives restarts)
    #[default]
    File,
    /// In-process Moka cache
    Memory,
    /// No caching
    Disabled,
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Memory => write!(f, "memory"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            "disabled" | "none" => Ok(Self::Disabled),
            _ => Err(format!(
                "Invalid cache backend: {s}. Use 'file', 'memory' or 'disabled'"
            )),
        }
    }
}

/// TTS cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtsCacheConfig {
    /// Storage backend
    #[serde(default)]
    pub backend: CacheBackend,

    /// Cache directory for the file backend (default: platform cache dir)
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Entry lifetime in seconds (default: 24 hours)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// How often expired files are swept in seconds (default: 1 hour)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Memory budget for the in-process backend in megabytes
    #[serde(default = "default_max_capacity_mb")]
    pub max_capacity_mb: u64,
}

const fn default_ttl_secs() -> u64 {
    24 * 60 * 60 // 24 hours
}

const fn default_sweep_interval_secs() -> u64 {
    60 * 60 // 1 hour
}

const fn default_max_capacity_mb() -> u64 {
    64
}

impl Default for TtsCacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            dir: None,
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_capacity_mb: default_max_capacity_mb(),
        }
    }
}

impl TtsCacheConfig {
    /// Entry lifetime
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Sweep period
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Directory used by the file backend
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("classroom-relay")
                .join("tts")
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.ttl_secs == 0 {
            return Err("ttl_secs must be greater than 0".to_string());
        }
        if self.sweep_interval_secs == 0 {
            return Err("sweep_interval_secs must be greater than 0".to_string());
        }
        if self.backend == CacheBackend::Memory && self.max_capacity_mb == 0 {
            return Err("max_capacity_mb must be greater than 0 for the memory backend".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TtsCacheConfig::default();
        assert_eq!(config.backend, CacheBackend::File);
        assert_eq!(config.ttl(), Duration::from_secs(86_400));
        assert_eq!(config.sweep_interval(), Duration::from_secs(3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn explicit_dir_wins() {
        let config = TtsCacheConfig {
            dir: Some(PathBuf::from("/var/cache/relay")),
            ..Default::default()
        };
        assert_eq!(config.resolved_dir(), PathBuf::from("/var/cache/relay"));
    }

    #[test]
    fn default_dir_is_namespaced() {
        let dir = TtsCacheConfig::default().resolved_dir();
        assert!(dir.ends_with("classroom-relay/tts"));
    }

    #[test]
    fn backend_parses_and_displays() {
        assert_eq!("MEMORY".parse::<CacheBackend>().unwrap(), CacheBackend::Memory);
        assert_eq!("none".parse::<CacheBackend>().unwrap(), CacheBackend::Disabled);
        assert!("redis".parse::<CacheBackend>().is_err());
        assert_eq!(CacheBackend::File.to_string(), "file");
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let config = TtsCacheConfig {
            ttl_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("ttl_secs"));
    }

    #[test]
    fn deserializes_from_toml() {
        let config: TtsCacheConfig = toml::from_str(
            r#"
            backend = "memory"
            ttl_secs = 600
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, CacheBackend::Memory);
        assert_eq!(config.ttl_secs, 600);
        assert_eq!(config.sweep_interval_secs, 3600);
    }
}
