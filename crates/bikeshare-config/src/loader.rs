//! Configuration loading utilities

use crate::Config;
use bikeshare_common::{BikeshareError, LogFormat};
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "BIKESHARE_CONFIG_PATH";

/// Configuration files probed in the working directory, in order.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["bikeshare.yaml", "bikeshare.yml", "bikeshare.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading or writing a configuration file
    #[error("Failed to access configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Offending variable.
        var: String,
        /// Underlying parse failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// File extension is neither YAML nor TOML
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(PathBuf),
}

impl From<ConfigError> for BikeshareError {
    fn from(err: ConfigError) -> Self {
        BikeshareError::config(err.to_string())
    }
}

/// Serialization format of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.toml`
    Toml,
}

impl ConfigFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Configuration loader for the dashboard
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML or TOML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::parse_file(path)?;
        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration from the first available source.
    ///
    /// Order: `explicit`, then `BIKESHARE_CONFIG_PATH`, then the default
    /// file names in the working directory, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_config(path);
        }
        if let Ok(path) = env::var(CONFIG_PATH_VAR) {
            return Self::load_config(path);
        }
        if let Some(path) = DEFAULT_CONFIG_FILES
            .iter()
            .map(Path::new)
            .find(|candidate| candidate.exists())
        {
            return Self::load_config(path);
        }

        debug!("No configuration file found, using defaults");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Parse a configuration file without overrides or validation.
    pub fn parse_file(path: &Path) -> Result<Config, ConfigError> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content, format)
    }

    /// Parse configuration text in the given format.
    pub fn parse_str(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
        Ok(match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        })
    }

    /// Serialize configuration in the given format.
    pub fn to_string(config: &Config, format: ConfigFormat) -> Result<String, ConfigError> {
        Ok(match format {
            ConfigFormat::Yaml => serde_yaml::to_string(config)?,
            ConfigFormat::Toml => toml::to_string_pretty(config)?,
        })
    }

    /// Save configuration atomically: write a sibling temporary file, then rename it over `path`.
    pub fn save<P: AsRef<Path>>(config: &Config, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = Self::to_string(config, ConfigFormat::from_path(path)?)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;
        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        temp.write_all(content.as_bytes())?;
        temp.flush()?;
        temp.persist(path).map_err(|e| ConfigError::IoError(e.error))?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |var| env::var(var).ok())
    }

    /// Apply overrides read through `lookup`, which maps a variable name to its value.
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("BIKESHARE_DATA_PATH") {
            config.data.source = PathBuf::from(path);
        }

        if let Some(dir) = lookup("BIKESHARE_OUTPUT_DIR") {
            config.output.directory = PathBuf::from(dir);
        }

        if let Some(level) = lookup("BIKESHARE_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(format) = lookup("BIKESHARE_LOG_FORMAT") {
            config.logging.format = format.parse::<LogFormat>().map_err(|e| ConfigError::EnvParseError {
                var: "BIKESHARE_LOG_FORMAT".to_string(),
                source: Box::new(e),
            })?;
        }

        if let Some(width) = lookup("BIKESHARE_GRAPH_WIDTH") {
            config.graphs.width = width.parse().map_err(|e| ConfigError::EnvParseError {
                var: "BIKESHARE_GRAPH_WIDTH".to_string(),
                source: Box::new(e),
            })?;
        }

        if let Some(height) = lookup("BIKESHARE_GRAPH_HEIGHT") {
            config.graphs.height = height.parse().map_err(|e| ConfigError::EnvParseError {
                var: "BIKESHARE_GRAPH_HEIGHT".to_string(),
                source: Box::new(e),
            })?;
        }

        if let Some(ttl) = lookup("BIKESHARE_CACHE_TTL_SECONDS") {
            let seconds: u64 = ttl.parse().map_err(|e| ConfigError::EnvParseError {
                var: "BIKESHARE_CACHE_TTL_SECONDS".to_string(),
                source: Box::new(e),
            })?;
            config.cache.ttl_seconds = (seconds > 0).then_some(seconds);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Create a temporary config file with the given suffix
    fn create_test_config_file(content: &str, suffix: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file
    }

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = "data:\n  source: \"trips/2025-10.csv\"\n  skip_invalid_rows: false\ngraphs:\n  width: 1200\n  member_color: \"#000080\"\nlogging:\n  level: debug\n  format: json\n";
        let temp_file = create_test_config_file(yaml, ".yaml");
        let config = ConfigLoader::parse_file(temp_file.path()).expect("Failed to parse config");

        assert_eq!(config.data.source, PathBuf::from("trips/2025-10.csv"));
        assert!(!config.data.skip_invalid_rows);
        assert_eq!(config.graphs.width, 1200);
        assert_eq!(config.graphs.height, 600); // default value
        assert_eq!(config.graphs.member_color, "#000080");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml_text = "[data]\nmin_duration_minutes = 2.0\nmax_duration_minutes = 180.0\n\n[cache]\nmax_entries = 8\nttl_seconds = 600\n";
        let temp_file = create_test_config_file(toml_text, ".toml");
        let config = ConfigLoader::parse_file(temp_file.path()).expect("Failed to parse config");

        assert_eq!(config.data.min_duration_minutes, 2.0);
        assert_eq!(config.data.max_duration_minutes, 180.0);
        assert_eq!(config.cache.max_entries, 8);
        assert_eq!(config.cache.ttl_seconds, Some(600));
    }

    #[test]
    fn test_invalid_yaml() {
        let temp_file = create_test_config_file("graphs:\n  width: [unclosed", ".yaml");
        let result = ConfigLoader::parse_file(temp_file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::YamlError(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let temp_file = create_test_config_file("[graphs\nwidth = 1", ".toml");
        let result = ConfigLoader::parse_file(temp_file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::TomlError(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let temp_file = create_test_config_file("{}", ".json");
        let result = ConfigLoader::parse_file(temp_file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_config_file() {
        let result = ConfigLoader::load_config("/nonexistent/path/bikeshare.yaml");
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_environment_variable_overrides() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("BIKESHARE_DATA_PATH", "/srv/trips.csv"),
            ("BIKESHARE_OUTPUT_DIR", "/tmp/charts"),
            ("BIKESHARE_LOG_LEVEL", "debug"),
            ("BIKESHARE_LOG_FORMAT", "compact"),
            ("BIKESHARE_GRAPH_WIDTH", "1500"),
            ("BIKESHARE_GRAPH_HEIGHT", "900"),
            ("BIKESHARE_CACHE_TTL_SECONDS", "300"),
        ]);

        ConfigLoader::apply_overrides_from(&mut config, lookup).expect("Overrides should apply");

        assert_eq!(config.data.source, PathBuf::from("/srv/trips.csv"));
        assert_eq!(config.output.directory, PathBuf::from("/tmp/charts"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert_eq!(config.graphs.width, 1500);
        assert_eq!(config.graphs.height, 900);
        assert_eq!(config.cache.ttl_seconds, Some(300));
    }

    #[test]
    fn test_zero_ttl_disables_expiry() {
        let mut config = Config::default();
        config.cache.ttl_seconds = Some(60);
        ConfigLoader::apply_overrides_from(&mut config, lookup_from(&[("BIKESHARE_CACHE_TTL_SECONDS", "0")]))
            .expect("Overrides should apply");
        assert_eq!(config.cache.ttl_seconds, None);
    }

    #[test]
    fn test_env_parse_error() {
        let mut config = Config::default();
        let result = ConfigLoader::apply_overrides_from(
            &mut config,
            lookup_from(&[("BIKESHARE_GRAPH_WIDTH", "not_a_number")]),
        );

        match result.unwrap_err() {
            ConfigError::EnvParseError { var, .. } => assert_eq!(var, "BIKESHARE_GRAPH_WIDTH"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validation_error() {
        let yaml = "data:\n  min_duration_minutes: 30\n  max_duration_minutes: 10\n";
        let config = ConfigLoader::parse_str(yaml, ConfigFormat::Yaml).expect("Failed to parse");
        assert!(config.validate_all().is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = Config::default();
        config.graphs.top_stations = 15;
        config.output.report_file_name = "october.md".to_string();

        for name in ["saved.yaml", "saved.toml"] {
            let path = dir.path().join(name);
            ConfigLoader::save(&config, &path).expect("Failed to save config");
            let loaded = ConfigLoader::parse_file(&path).expect("Failed to reload config");
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_config_error_converts_to_common_error() {
        let err: BikeshareError = ConfigError::UnsupportedFormat(PathBuf::from("a.ini")).into();
        assert!(err.to_string().contains("a.ini"));
    }
}
