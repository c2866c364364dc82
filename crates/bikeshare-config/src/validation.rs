//! Validation utilities and regex patterns

use crate::schema::DataConfig;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use validator::ValidationError;

/// Regex pattern for validating hex color codes (e.g., #FFFFFF, #1f77b4)
pub static HEX_COLOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid hex color regex pattern")
});

/// Validate a `#RRGGBB` colour string
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR_REGEX.is_match(color) {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_hex_color");
        error.message = Some(format!("'{color}' is not a #RRGGBB colour").into());
        Err(error)
    }
}

/// Validate file path (basic check for valid path characters)
pub fn validate_file_path(path: &Path) -> Result<(), ValidationError> {
    let path = path.to_string_lossy();
    if path.trim().is_empty() {
        return Err(ValidationError::new("empty_file_path"));
    }

    // Colon stays allowed for Windows drive letters
    let invalid_chars = ['<', '>', '"', '|', '?', '*'];
    if path.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(ValidationError::new("invalid_file_path_characters"));
    }

    Ok(())
}

/// The kept-duration window must be non-empty.
pub fn validate_duration_window(data: &DataConfig) -> Result<(), ValidationError> {
    if data.min_duration_minutes < data.max_duration_minutes {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_duration_window");
        error.message = Some(
            format!(
                "min_duration_minutes ({}) must be below max_duration_minutes ({})",
                data.min_duration_minutes, data.max_duration_minutes
            )
            .into(),
        );
        Err(error)
    }
}
