//! Trip CSV loading.

use crate::prepare::{RawTrip, REQUIRED_COLUMNS};
use crate::trip::{Dataset, LoadStats};
use bikeshare_common::{BikeshareError, Result};
use bikeshare_config::DataConfig;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Rejected rows logged individually before switching to a summary.
const MAX_LOGGED_REJECTIONS: usize = 10;

/// Cleaning rules applied while loading.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Skip malformed rows instead of failing the load.
    pub skip_invalid_rows: bool,
    /// Shortest ride kept, in minutes (inclusive).
    pub min_duration_minutes: f64,
    /// Longest ride kept, in minutes (inclusive).
    pub max_duration_minutes: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            skip_invalid_rows: true,
            min_duration_minutes: 1.0,
            max_duration_minutes: 24.0 * 60.0,
        }
    }
}

impl From<&DataConfig> for LoadOptions {
    fn from(config: &DataConfig) -> Self {
        Self {
            skip_invalid_rows: config.skip_invalid_rows,
            min_duration_minutes: config.min_duration_minutes,
            max_duration_minutes: config.max_duration_minutes,
        }
    }
}

impl LoadOptions {
    /// Whether a ride of this length is kept.
    pub fn in_window(&self, duration_minutes: f64) -> bool {
        duration_minutes >= self.min_duration_minutes && duration_minutes <= self.max_duration_minutes
    }
}

/// Loads a trip CSV on the blocking thread pool.
pub async fn load_trips(path: impl AsRef<Path>, options: LoadOptions) -> Result<Dataset> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || load_trips_blocking(&path, &options))
        .await
        .map_err(|e| BikeshareError::with_source("Trip loading task failed", e))?
}

/// Loads a trip CSV on the current thread.
#[instrument(skip(path, options), fields(path = %path.display()))]
pub fn load_trips_blocking(path: &Path, options: &LoadOptions) -> Result<Dataset> {
    let file = File::open(path)
        .map_err(|e| BikeshareError::data_load_with_source("Failed to open trip file", path, e))?;
    let dataset = read_trips(BufReader::new(file), path, options)?;

    let stats = dataset.stats();
    info!(
        rows_read = stats.rows_read,
        rows_kept = stats.rows_kept(),
        rows_rejected = stats.rows_rejected,
        rows_out_of_window = stats.rows_out_of_window,
        "Loaded trip data"
    );
    Ok(dataset)
}

/// Parses trip CSV text from any reader. `source` is used for error reporting.
pub fn read_trips<R: Read>(reader: R, source: &Path, options: &LoadOptions) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| BikeshareError::data_load_with_source("Failed to read CSV header", source, e))?
        .clone();
    check_required_columns(&headers, source)?;

    let mut trips = Vec::new();
    let mut stats = LoadStats::default();
    let mut record = csv::StringRecord::new();

    loop {
        let line = csv_reader.position().line();
        match csv_reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {}
            Err(e) if e.is_io_error() => {
                return Err(BikeshareError::data_load_with_source("Failed to read trip file", source, e));
            }
            Err(e) => {
                stats.rows_read += 1;
                reject(&mut stats, options, source, line, e.to_string())?;
                continue;
            }
        }
        stats.rows_read += 1;
        let line = record.position().map_or(line, |pos| pos.line());

        let parsed = record
            .deserialize::<RawTrip>(Some(&headers))
            .map_err(|e| e.to_string())
            .and_then(|raw| raw.into_trip().map_err(|e| e.to_string()));

        match parsed {
            Ok(trip) if options.in_window(trip.duration_minutes) => trips.push(trip),
            Ok(trip) => {
                stats.rows_out_of_window += 1;
                debug!(line, ride_id = %trip.ride_id, duration = trip.duration_minutes, "Dropped ride outside duration window");
            }
            Err(message) => reject(&mut stats, options, source, line, message)?,
        }
    }

    if stats.rows_rejected > MAX_LOGGED_REJECTIONS {
        warn!(
            rows_rejected = stats.rows_rejected,
            "Skipped malformed rows (only the first {MAX_LOGGED_REJECTIONS} were logged individually)"
        );
    }

    Ok(Dataset::new(PathBuf::from(source), trips, stats))
}

fn check_required_columns(headers: &csv::StringRecord, source: &Path) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(BikeshareError::data_load(
            format!("Missing required column(s): {}", missing.join(", ")),
            source,
        ))
    }
}

fn reject(
    stats: &mut LoadStats,
    options: &LoadOptions,
    source: &Path,
    line: u64,
    message: String,
) -> Result<()> {
    if !options.skip_invalid_rows {
        return Err(BikeshareError::data_load_at(
            format!("Malformed row: {message}"),
            source,
            line,
        ));
    }
    stats.rows_rejected += 1;
    if stats.rows_rejected <= MAX_LOGGED_REJECTIONS {
        warn!(line, reason = %message, "Skipping malformed row");
    }
    Ok(())
}
