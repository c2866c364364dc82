//! # Bikeshare Graphs
//!
//! Chart rendering for the bikeshare dashboard.
//!
//! [`aggregator`] turns a filtered trip view into chart-ready tables,
//! [`charts`] draws them with plotters, and [`views`] names every chart the
//! dashboard shows and wires the two together.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod charts;
pub mod renderer;
pub mod types;
pub mod views;

pub use charts::*;
pub use renderer::{ChartRenderer, ColorBar};
pub use types::{ChartStyle, ColorScale};
pub use views::{Chart, ChartCategory, ChartKind, ViewOptions};
