//! # Bikeshare Data
//!
//! Loading, caching and filtering of Capital Bikeshare trip exports.
//!
//! The loader turns a trip CSV into an immutable [`Dataset`] with derived
//! fields, [`DatasetCache`] memoizes datasets per source file, and
//! [`TripFilter`] narrows a dataset into the view the charts consume.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod export;
pub mod filter;
pub mod loader;
pub mod prepare;
pub mod summary;
pub mod tables;
pub mod trip;

pub use cache::{CacheMetrics, DatasetCache, DatasetKey};
pub use export::{write_trips_csv, write_trips_csv_to};
pub use filter::TripFilter;
pub use loader::{load_trips, load_trips_blocking, read_trips, LoadOptions};
pub use summary::{DataQuality, DataSummary, DurationStats, Kpis};
pub use tables::AnalysisTables;
pub use trip::{Dataset, GeoPoint, LoadStats, Trip};
