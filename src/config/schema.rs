//! Configuration schema for fragcache
//!
//! Configuration is stored at `~/.config/fragcache/config.toml`

use crate::cache::{KeyPolicy, Region, DEFAULT_COMMENT_REGION, DEFAULT_SEPARATOR};
use crate::error::{CacheError, CacheResult};
use crate::log::LogLevel;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Two days, the lifetime of every default region
pub const DEFAULT_TTL_SECS: u64 = 172_800;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache behavior
    pub cache: CacheConfig,

    /// Where blobs and metadata live
    pub storage: StorageConfig,

    /// Content event wiring
    pub events: EventsConfig,

    /// Cache regions and their TTLs, in invalidation order
    pub regions: Vec<RegionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            cache: CacheConfig::default(),
            storage: StorageConfig::default(),
            events: EventsConfig::default(),
            regions: vec![
                RegionConfig::new("sidebar", DEFAULT_TTL_SECS),
                RegionConfig::new("pages", DEFAULT_TTL_SECS),
                RegionConfig::new("homepage", DEFAULT_TTL_SECS),
            ],
        }
    }
}

impl Config {
    /// Build the key policy described by this configuration
    pub fn key_policy(&self) -> CacheResult<KeyPolicy> {
        KeyPolicy::new(
            self.cache.separator,
            self.regions
                .iter()
                .map(|r| Region::new(r.name.clone(), r.ttl_secs)),
        )
    }

    /// Check everything that must hold before a cache is built from this
    /// configuration
    pub fn validate(&self) -> CacheResult<()> {
        let policy = self.key_policy()?;

        if let Some(region) = &self.events.comment_region {
            if policy.region(region).is_err() {
                return Err(CacheError::PolicyInvalid(format!(
                    "events.comment_region '{}' is not a configured region",
                    region
                )));
            }
        }

        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Tracing output format for the binary
    pub log_format: LogFormat,
}

/// Tracing output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Cache behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Master switch; when off every lookup misses and writes are no-ops
    pub enabled: bool,

    /// Separator between region and sub-key
    pub separator: char,

    /// Diagnostic log level: off, basic or verbose
    pub log_level: LogLevel,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            separator: DEFAULT_SEPARATOR,
            log_level: LogLevel::Off,
        }
    }
}

/// Storage locations. Unset paths fall back to the data directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one file per cached fragment
    pub blob_dir: Option<PathBuf>,

    /// Prefix prepended to every blob file name
    pub file_prefix: String,

    /// JSON file holding freshness metadata
    pub metadata_path: Option<PathBuf>,

    /// Diagnostic log file
    pub log_path: Option<PathBuf>,
}

/// Content event wiring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Region invalidated on comment events (unset to ignore them)
    pub comment_region: Option<String>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            comment_region: Some(DEFAULT_COMMENT_REGION.to_string()),
        }
    }
}

/// One cache region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Region name, used as the key prefix
    pub name: String,

    /// Time to live in seconds, shared by all sub-keys
    pub ttl_secs: u64,
}

impl RegionConfig {
    pub fn new(name: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            name: name.into(),
            ttl_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("[[regions]]"));
        assert!(toml.contains("name = \"sidebar\""));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.separator, '_');
        assert_eq!(config.regions.len(), 3);
        assert_eq!(config.events.comment_region.as_deref(), Some("pages"));
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [cache]
            enabled = false
            log_level = "verbose"

            [[regions]]
            name = "pages"
            ttl_secs = 100
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.log_level, LogLevel::Verbose);
        assert_eq!(config.cache.separator, '_'); // default preserved
        assert_eq!(config.general.log_format, LogFormat::Text);
        assert_eq!(config.regions, vec![RegionConfig::new("pages", 100)]);
    }

    #[test]
    fn log_format_is_checked_at_parse() {
        let config: Config = toml::from_str("[general]\nlog_format = \"json\"").unwrap();
        assert_eq!(config.general.log_format, LogFormat::Json);

        let err = toml::from_str::<Config>("[general]\nlog_format = \"jsno\"").unwrap_err();
        assert!(err.to_string().contains("jsno"));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
        let policy = Config::default().key_policy().unwrap();
        assert_eq!(
            policy.ttl("homepage").unwrap().as_secs(),
            DEFAULT_TTL_SECS
        );
    }

    #[test]
    fn separator_inside_region_is_rejected() {
        let mut config = Config::default();
        config.regions.push(RegionConfig::new("cache_extra", 10));

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("separator"));
    }

    #[test]
    fn unknown_comment_region_is_rejected() {
        let mut config = Config::default();
        config.events.comment_region = Some("comments".to_string());

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("comment_region"));
    }

    #[test]
    fn comment_region_can_be_disabled() {
        let mut config = Config::default();
        config.regions = vec![RegionConfig::new("sidebar", 60)];
        config.events.comment_region = None;

        assert!(config.validate().is_ok());
    }
}
