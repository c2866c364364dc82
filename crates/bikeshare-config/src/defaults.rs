//! Default values for every configuration section.

use crate::schema::*;
use bikeshare_common::LogFormat;
use std::path::PathBuf;

/// Location of the October 2025 export used by the dashboard.
pub const DEFAULT_DATA_SOURCE: &str = "data/202510-capitalbikeshare-tripdata.csv";

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            cache: CacheConfig::default(),
            graphs: GraphsConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from(DEFAULT_DATA_SOURCE),
            skip_invalid_rows: true,
            min_duration_minutes: 1.0,
            max_duration_minutes: 24.0 * 60.0,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 4,
            ttl_seconds: None,
        }
    }
}

impl Default for GraphsConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            background_color: "#ffffff".to_string(),
            member_color: "#1f77b4".to_string(),
            casual_color: "#ff7f0e".to_string(),
            font_family: "sans-serif".to_string(),
            font_size: 20,
            show_grid: true,
            scatter_sample_size: 1000,
            map_sample_size: 5000,
            random_seed: 42,
            top_stations: 10,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            report_file_name: "report.md".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: None,
            include_spans: false,
        }
    }
}
