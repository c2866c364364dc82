//! Configuration schema definitions using serde with validation attributes.

use bikeshare_common::{LogFormat, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

/// Main configuration structure for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Trip source and cleaning rules.
    #[validate(nested)]
    pub data: DataConfig,
    /// Dataset cache settings.
    #[validate(nested)]
    pub cache: CacheConfig,
    /// Chart rendering settings.
    #[validate(nested)]
    pub graphs: GraphsConfig,
    /// Output locations.
    #[validate(nested)]
    pub output: OutputConfig,
    /// Logging settings.
    #[validate(nested)]
    pub logging: LoggingSettings,
}

/// Trip source and cleaning rules.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
#[validate(schema(function = "crate::validation::validate_duration_window"))]
pub struct DataConfig {
    /// Path of the trip CSV.
    #[validate(custom(function = "crate::validation::validate_file_path"))]
    pub source: PathBuf,
    /// Skip malformed rows instead of failing the load.
    pub skip_invalid_rows: bool,
    /// Shortest ride kept, in minutes.
    #[validate(range(min = 0.0, max = 1440.0, message = "Minimum duration must be between 0 and 1440 minutes"))]
    pub min_duration_minutes: f64,
    /// Longest ride kept, in minutes.
    #[validate(range(min = 1.0, max = 10080.0, message = "Maximum duration must be between 1 and 10080 minutes"))]
    pub max_duration_minutes: f64,
}

/// Dataset cache settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached datasets.
    #[validate(range(min = 1, max = 64, message = "Cache capacity must be between 1 and 64 datasets"))]
    pub max_entries: u64,
    /// Optional time-to-live of a cached dataset, in seconds.
    pub ttl_seconds: Option<u64>,
}

impl CacheConfig {
    /// Time-to-live as a duration.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_seconds.map(Duration::from_secs)
    }
}

/// Chart rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct GraphsConfig {
    /// Chart width in pixels.
    #[validate(range(min = 200, max = 4000, message = "Width must be between 200 and 4000 pixels"))]
    pub width: u32,
    /// Chart height in pixels.
    #[validate(range(min = 200, max = 4000, message = "Height must be between 200 and 4000 pixels"))]
    pub height: u32,
    /// Background colour (hex).
    #[validate(custom(function = "crate::validation::validate_hex_color"))]
    pub background_color: String,
    /// Series colour for members (hex).
    #[validate(custom(function = "crate::validation::validate_hex_color"))]
    pub member_color: String,
    /// Series colour for casual riders (hex).
    #[validate(custom(function = "crate::validation::validate_hex_color"))]
    pub casual_color: String,
    /// Font family for text rendering.
    #[validate(length(min = 1, message = "Font family cannot be empty"))]
    pub font_family: String,
    /// Font size for captions.
    #[validate(range(min = 8, max = 72, message = "Font size must be between 8 and 72"))]
    pub font_size: u32,
    /// Whether to draw grid lines.
    pub show_grid: bool,
    /// Points drawn by the duration/distance scatter.
    #[validate(range(min = 10, max = 100000, message = "Scatter sample must be between 10 and 100000"))]
    pub scatter_sample_size: usize,
    /// Points drawn by the ride-location map.
    #[validate(range(min = 10, max = 100000, message = "Map sample must be between 10 and 100000"))]
    pub map_sample_size: usize,
    /// Seed for reproducible sampling.
    pub random_seed: u64,
    /// Stations listed in the top-station charts.
    #[validate(range(min = 1, max = 50, message = "Top station count must be between 1 and 50"))]
    pub top_stations: usize,
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving charts and reports.
    #[validate(custom(function = "crate::validation::validate_file_path"))]
    pub directory: PathBuf,
    /// File name of the Markdown report.
    #[validate(length(min = 1, message = "Report file name cannot be empty"))]
    pub report_file_name: String,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `bikeshare_data=debug`.
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,
    /// Output format.
    pub format: LogFormat,
    /// Optional log file; stderr when absent.
    pub file: Option<PathBuf>,
    /// Log span open/close events.
    pub include_spans: bool,
}

impl LoggingSettings {
    /// Converts to the logging initializer's configuration.
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            format: self.format,
            file_path: self.file.clone(),
            include_spans: self.include_spans,
            ..LoggingConfig::default()
        }
    }
}

impl Config {
    /// Validates every section.
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()
    }

    /// Path of the Markdown report.
    pub fn report_path(&self) -> PathBuf {
        self.output.directory.join(&self.output.report_file_name)
    }
}
