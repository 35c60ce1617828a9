//! Analyzer configuration file and environment variable support.
//!
//! Configuration is read from a `presence.toml` file and may be overridden through
//! environment variables.
//!
//! ```toml
//! [source]
//! csv_path = "runtime/data/sample_data.csv"
//! schema = "basic"        # or "extended"
//!
//! [cache]
//! ttl_secs = 600
//! totals_ttl_secs = 600   # optional, defaults to ttl_secs
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::parsing::SchemaVariant;

/// Environment variable overriding `source.csv_path`.
pub const ENV_DATA_CSV: &str = "PRESENCE_DATA_CSV";
/// Environment variable overriding `source.schema`.
pub const ENV_SCHEMA: &str = "PRESENCE_SCHEMA";
/// Environment variable overriding `cache.ttl_secs`.
pub const ENV_CACHE_TTL: &str = "PRESENCE_CACHE_TTL_SECS";

/// Analyzer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub source: SourceSettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Attendance source settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub csv_path: PathBuf,
    #[serde(default)]
    pub schema: SchemaVariant,
}

/// Freshness windows for the cached producers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default)]
    pub totals_ttl_secs: Option<u64>,
}

fn default_ttl_secs() -> u64 {
    600
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            totals_ttl_secs: None,
        }
    }
}

impl CacheSettings {
    /// Freshness window of the ingested store.
    pub fn store_ttl(&self) -> Duration {
        secs_to_duration(self.ttl_secs)
    }

    /// Freshness window of the month/location totals.
    pub fn totals_ttl(&self) -> Duration {
        secs_to_duration(self.totals_ttl_secs.unwrap_or(self.ttl_secs))
    }
}

fn secs_to_duration(secs: u64) -> Duration {
    Duration::try_seconds(i64::try_from(secs).unwrap_or(i64::MAX)).unwrap_or(Duration::MAX)
}

impl AnalyzerConfig {
    /// Configuration for a source path with default cache settings.
    pub fn new(csv_path: impl Into<PathBuf>, schema: SchemaVariant) -> Self {
        Self {
            source: SourceSettings {
                csv_path: csv_path.into(),
                schema,
            },
            cache: CacheSettings::default(),
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns a configuration error if the file cannot be read, parsed, or validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnalyzerResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AnalyzerError::configuration(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> AnalyzerResult<Self> {
        let config: AnalyzerConfig = toml::from_str(content).map_err(|e| {
            AnalyzerError::configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `presence.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> AnalyzerResult<Self> {
        let search_paths = [
            PathBuf::from("presence.toml"),
            PathBuf::from("backend/presence.toml"),
            PathBuf::from("../presence.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(AnalyzerError::configuration(
            "No presence.toml found in standard locations",
        ))
    }

    /// Build configuration from environment variables alone.
    ///
    /// # Environment Variables
    /// - `PRESENCE_DATA_CSV` (required): path of the attendance CSV
    /// - `PRESENCE_SCHEMA` (optional, default: basic): `basic` | `extended`
    /// - `PRESENCE_CACHE_TTL_SECS` (optional, default: 600)
    pub fn from_env() -> AnalyzerResult<Self> {
        let csv_path = env::var(ENV_DATA_CSV).map_err(|_| {
            AnalyzerError::configuration(format!("{} environment variable not set", ENV_DATA_CSV))
        })?;
        let mut config = Self::new(csv_path, SchemaVariant::default());
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Overlay any `PRESENCE_*` environment variables onto this configuration.
    pub fn apply_env_overrides(&mut self) -> AnalyzerResult<()> {
        if let Ok(path) = env::var(ENV_DATA_CSV) {
            self.source.csv_path = PathBuf::from(path);
        }
        if let Ok(schema) = env::var(ENV_SCHEMA) {
            self.source.schema = schema.parse().map_err(AnalyzerError::configuration)?;
        }
        if let Ok(ttl) = env::var(ENV_CACHE_TTL) {
            self.cache.ttl_secs = ttl.trim().parse().map_err(|_| {
                AnalyzerError::configuration(format!(
                    "{} must be a non-negative number of seconds",
                    ENV_CACHE_TTL
                ))
            })?;
        }
        self.validate()
    }

    /// Reject configurations that cannot name a source.
    pub fn validate(&self) -> AnalyzerResult<()> {
        if self.source.csv_path.as_os_str().is_empty() {
            return Err(AnalyzerError::configuration(
                "'source.csv_path' must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let config = AnalyzerConfig::from_toml_str(
            r#"
            [source]
            csv_path = "data/presence.csv"
            schema = "extended"

            [cache]
            ttl_secs = 30
            totals_ttl_secs = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.source.csv_path, PathBuf::from("data/presence.csv"));
        assert_eq!(config.source.schema, SchemaVariant::Extended);
        assert_eq!(config.cache.store_ttl(), Duration::seconds(30));
        assert_eq!(config.cache.totals_ttl(), Duration::seconds(120));
    }

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::from_toml_str(
            r#"
            [source]
            csv_path = "data/presence.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.schema, SchemaVariant::Basic);
        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.cache.totals_ttl(), Duration::seconds(600));
    }

    #[test]
    fn test_missing_source_section_rejected() {
        let err = AnalyzerConfig::from_toml_str("[cache]\nttl_secs = 5\n").unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigurationError { .. }));
    }

    #[test]
    fn test_unknown_schema_rejected() {
        let err = AnalyzerConfig::from_toml_str(
            "[source]\ncsv_path = \"a.csv\"\nschema = \"wide\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_empty_path_rejected() {
        let err = AnalyzerConfig::from_toml_str("[source]\ncsv_path = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("csv_path"));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[source]\ncsv_path = \"x.csv\"\n[cache]\nttl_secs = 0\n").unwrap();

        let config = AnalyzerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cache.store_ttl(), Duration::zero());
    }

    #[test]
    fn test_from_missing_file() {
        let err = AnalyzerConfig::from_file("/nonexistent/presence.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let settings = CacheSettings {
            ttl_secs: u64::MAX,
            totals_ttl_secs: None,
        };
        assert!(settings.store_ttl() > Duration::days(365 * 1000));
    }
}
