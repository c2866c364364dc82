//! # Bikeshare Config
//!
//! Type-safe configuration management for the bikeshare dashboard.
//!
//! Configuration is read from YAML or TOML, overridden from `BIKESHARE_*`
//! environment variables and validated before use.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::*;
pub use schema::*;
