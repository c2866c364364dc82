//! # Bikeshare Common
//!
//! Shared types, errors, logging and utilities for the bikeshare analytics
//! workspace.
//!
//! This crate provides the foundational types used across the loader, the
//! chart renderers and the dashboard binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

// Re-export commonly used types
pub use error::{BikeshareError, Result};
pub use logging::{init_default_logging, init_logging, LogFormat, LoggingConfig, LoggingGuard};
pub use types::*;
pub use utils::*;
