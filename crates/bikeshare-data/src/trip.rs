//! Trip records and the loaded dataset.

use bikeshare_common::{BikeType, TimeOfDay, UserType};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a point.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One cleaned ride with its derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    /// Unique ride identifier.
    pub ride_id: String,
    /// Vehicle used for the ride.
    pub bike_type: BikeType,
    /// Ride start.
    pub started_at: NaiveDateTime,
    /// Ride end.
    pub ended_at: NaiveDateTime,
    /// Start station name, absent for dockless starts.
    pub start_station_name: Option<String>,
    /// Start station identifier.
    pub start_station_id: Option<String>,
    /// End station name, absent for dockless ends.
    pub end_station_name: Option<String>,
    /// End station identifier.
    pub end_station_id: Option<String>,
    /// Start coordinates.
    pub start: Option<GeoPoint>,
    /// End coordinates.
    pub end: Option<GeoPoint>,
    /// Member or casual rider.
    pub user_type: UserType,
    /// Ride length in fractional minutes.
    pub duration_minutes: f64,
    /// Start hour, 0-23.
    pub hour: u32,
    /// Start weekday.
    pub weekday: Weekday,
    /// Start date.
    pub date: NaiveDate,
    /// Start month, 1-12.
    pub month: u32,
    /// Started on a Saturday or Sunday.
    pub is_weekend: bool,
    /// Bucket of the start hour.
    pub time_of_day: TimeOfDay,
    /// Great-circle distance between start and end, 0 when unknown.
    pub distance_km: f64,
}

impl Trip {
    /// Builds a trip and computes every derived field.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ride_id: impl Into<String>,
        bike_type: BikeType,
        started_at: NaiveDateTime,
        ended_at: NaiveDateTime,
        start_station: (Option<String>, Option<String>),
        end_station: (Option<String>, Option<String>),
        start: Option<GeoPoint>,
        end: Option<GeoPoint>,
        user_type: UserType,
    ) -> Self {
        let duration_minutes = (ended_at - started_at).num_milliseconds() as f64 / 60_000.0;
        let hour = started_at.hour();
        let weekday = started_at.weekday();
        let distance_km = match (start, end) {
            (Some(a), Some(b)) => crate::prepare::haversine_km(a, b),
            _ => 0.0,
        };

        Self {
            ride_id: ride_id.into(),
            bike_type,
            started_at,
            ended_at,
            start_station_name: start_station.0,
            start_station_id: start_station.1,
            end_station_name: end_station.0,
            end_station_id: end_station.1,
            start,
            end,
            user_type,
            duration_minutes,
            hour,
            weekday,
            date: started_at.date(),
            month: started_at.month(),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            time_of_day: TimeOfDay::from_hour(hour),
            distance_km,
        }
    }

    /// Member ride.
    pub fn is_member(&self) -> bool {
        self.user_type == UserType::Member
    }
}

/// Row accounting for one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    /// Data rows read from the source.
    pub rows_read: usize,
    /// Rows skipped as malformed.
    pub rows_rejected: usize,
    /// Rows dropped by the duration window.
    pub rows_out_of_window: usize,
}

impl LoadStats {
    /// Rows that made it into the dataset.
    pub fn rows_kept(&self) -> usize {
        self.rows_read - self.rows_rejected - self.rows_out_of_window
    }
}

/// The cleaned trips of one source, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    source: PathBuf,
    trips: Vec<Trip>,
    stats: LoadStats,
}

impl Dataset {
    /// Wraps already-cleaned trips.
    pub fn new(source: impl Into<PathBuf>, trips: Vec<Trip>, stats: LoadStats) -> Self {
        Self {
            source: source.into(),
            trips,
            stats,
        }
    }

    /// Builds a dataset from in-memory trips.
    pub fn from_trips(trips: Vec<Trip>) -> Self {
        let stats = LoadStats {
            rows_read: trips.len(),
            ..LoadStats::default()
        };
        Self::new(PathBuf::new(), trips, stats)
    }

    /// Source file the trips came from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// All trips.
    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// Row accounting of the load.
    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// Number of trips.
    pub fn len(&self) -> usize {
        self.trips.len()
    }

    /// No trips survived loading.
    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Iterates over the trips in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Trip> {
        self.trips.iter()
    }

    /// Every trip as a view, unfiltered.
    pub fn view(&self) -> Vec<&Trip> {
        self.trips.iter().collect()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Trip;
    type IntoIter = std::slice::Iter<'a, Trip>;

    fn into_iter(self) -> Self::IntoIter {
        self.trips.iter()
    }
}
