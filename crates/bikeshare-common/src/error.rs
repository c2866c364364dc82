//! Error types and utilities for the bikeshare workspace

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bikeshare operations
pub type Result<T> = std::result::Result<T, BikeshareError>;

/// Main error type for bikeshare operations
#[derive(Error, Debug)]
pub enum BikeshareError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The trip source is missing or malformed
    #[error("Data load error{}: {message}", location(.path, .line))]
    DataLoad {
        message: String,
        path: Option<PathBuf>,
        line: Option<u64>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single value could not be parsed
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        field: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Graph generation and plotting errors
    #[error("Graph error: {message}")]
    Graph {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

fn location(path: &Option<PathBuf>, line: &Option<u64>) -> String {
    match (path, line) {
        (Some(path), Some(line)) => format!(" in {} at line {}", path.display(), line),
        (Some(path), None) => format!(" in {}", path.display()),
        (None, Some(line)) => format!(" at line {line}"),
        (None, None) => String::new(),
    }
}

impl BikeshareError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new data load error for a source file
    pub fn data_load(msg: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::DataLoad {
            message: msg.into(),
            path: Some(path.into()),
            line: None,
            source: None,
        }
    }

    /// Create a new data load error pointing at a line of the source
    pub fn data_load_at(msg: impl Into<String>, path: impl Into<PathBuf>, line: u64) -> Self {
        Self::DataLoad {
            message: msg.into(),
            path: Some(path.into()),
            line: Some(line),
            source: None,
        }
    }

    /// Create a new data load error with source
    pub fn data_load_with_source(
        msg: impl Into<String>,
        path: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DataLoad {
            message: msg.into(),
            path: Some(path.into()),
            line: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new parse error naming the offending field
    pub fn parse_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new graph error with source
    pub fn graph_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Graph {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether this error came from reading the trip source
    pub fn is_data_load(&self) -> bool {
        matches!(self, Self::DataLoad { .. })
    }
}

// Error conversion implementations for external types

/// Convert from csv::Error to BikeshareError
impl From<csv::Error> for BikeshareError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|pos| pos.line());
        Self::DataLoad {
            message: "CSV parsing failed".to_string(),
            path: None,
            line,
            source: Some(Box::new(err)),
        }
    }
}

/// Convert from toml::de::Error to BikeshareError
impl From<toml::de::Error> for BikeshareError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML parsing error", err)
    }
}

/// Convert from serde_yaml::Error to BikeshareError
impl From<serde_yaml::Error> for BikeshareError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::config_with_source("YAML parsing error", err)
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to BikeshareError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for BikeshareError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::graph_with_source("Chart rendering failed", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_creation() {
        let error = BikeshareError::new("test message");
        assert!(error.to_string().contains("test message"));

        let config_error = BikeshareError::config("config issue");
        assert!(config_error.to_string().contains("Configuration error"));
        assert!(config_error.to_string().contains("config issue"));

        let validation_error = BikeshareError::validation_field("Invalid input", "width");
        assert!(validation_error.to_string().contains("Validation error"));
        assert!(validation_error.to_string().contains("Invalid input"));

        let parse_error = BikeshareError::parse_field("bad timestamp", "started_at");
        assert_eq!(parse_error.to_string(), "Parse error: bad timestamp");
    }

    #[test]
    fn test_data_load_display_includes_location() {
        let error = BikeshareError::data_load("file not found", "data/trips.csv");
        assert_eq!(
            error.to_string(),
            "Data load error in data/trips.csv: file not found"
        );
        assert!(error.is_data_load());

        let error = BikeshareError::data_load_at("unknown user type", "trips.csv", 42);
        assert_eq!(
            error.to_string(),
            "Data load error in trips.csv at line 42: unknown user type"
        );
    }

    #[test]
    fn test_error_with_source() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let wrapped_error = BikeshareError::data_load_with_source("Failed to open", "a.csv", io_error);

        assert!(wrapped_error.to_string().contains("Failed to open"));
        assert!(wrapped_error.source().is_some());

        let config_source_error = BikeshareError::config_with_source(
            "Config loading failed",
            io::Error::new(io::ErrorKind::PermissionDenied, "Access denied"),
        );
        assert!(config_source_error.to_string().contains("Configuration error"));
        assert!(config_source_error.source().is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: BikeshareError = io_error.into();

        assert!(error.to_string().contains("I/O error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_serde_error_conversion() {
        let invalid_json = r#"{"invalid": json}"#;
        let serde_error = serde_json::from_str::<serde_json::Value>(invalid_json).unwrap_err();
        let error: BikeshareError = serde_error.into();

        assert!(error.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_csv_error_conversion_is_data_load() {
        let data = "a,b\n1,2,3\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let err = reader
            .records()
            .find_map(|r| r.err())
            .expect("ragged row should fail");
        let error: BikeshareError = err.into();
        assert!(error.is_data_load());
    }

    #[test]
    fn test_error_chain_preservation() {
        let root_error = io::Error::new(io::ErrorKind::NotFound, "Root cause");
        let middle_error = BikeshareError::config_with_source("Middle layer", root_error);
        let top_error = BikeshareError::with_source("Top layer", middle_error);

        let mut current_error: &dyn std::error::Error = &top_error;
        let mut error_count = 0;
        while let Some(source) = current_error.source() {
            current_error = source;
            error_count += 1;
        }

        assert_eq!(error_count, 2);
    }
}
