//! # Bikeshare Dash
//!
//! Command-line dashboard for Capital Bikeshare trip data.
//!
//! Loads a trip export once through the dataset cache, narrows it with the
//! filters given on the command line and prints summaries, or renders the
//! dashboard pages to PNG charts and a Markdown report.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod cli;
pub mod dashboard;
pub mod error;
pub mod pages;
pub mod report;

pub use app::{load_config, run};
pub use cli::{Cli, Command, FilterArgs};
pub use dashboard::{Dashboard, RenderedChart, Session, SummaryReport};
pub use error::*;
pub use pages::{Metric, Page};
