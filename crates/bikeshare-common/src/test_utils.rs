//! Test utilities and shared fixtures.
//!
//! Enabled for this crate's own tests and, through the `testing` feature, for
//! the unit and integration tests of the other workspace crates.

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Test fixture for creating a naive timestamp.
pub fn mock_timestamp(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, min, sec))
        .expect("valid fixture timestamp")
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// CSV fixtures in the Capital Bikeshare export layout.
pub mod trip_csv {
    use super::*;
    use std::io::Write;

    /// Header row of the public trip exports.
    pub const HEADER: &str = "ride_id,rideable_type,started_at,ended_at,start_station_name,start_station_id,end_station_name,end_station_id,start_lat,start_lng,end_lat,end_lng,member_casual";

    /// Stations used by the generated rows: (name, id, lat, lng).
    pub const STATIONS: [(&str, &str, f64, f64); 4] = [
        ("Columbus Circle / Union Station", "31623", 38.8974, -77.0063),
        ("Lincoln Memorial", "31258", 38.8882, -77.0502),
        ("New Hampshire Ave & T St NW", "31229", 38.9155, -77.0441),
        ("15th & P St NW", "31201", 38.9098, -77.0344),
    ];

    /// One complete row; stations are picked from [`STATIONS`].
    pub fn row(
        ride_id: &str,
        rideable_type: &str,
        started_at: NaiveDateTime,
        ended_at: NaiveDateTime,
        start_station: usize,
        end_station: usize,
        member_casual: &str,
    ) -> String {
        let (start_name, start_id, start_lat, start_lng) = STATIONS[start_station % STATIONS.len()];
        let (end_name, end_id, end_lat, end_lng) = STATIONS[end_station % STATIONS.len()];
        format!(
            "{ride_id},{rideable_type},{},{},{start_name},{start_id},{end_name},{end_id},{start_lat},{start_lng},{end_lat},{end_lng},{member_casual}",
            started_at.format("%Y-%m-%d %H:%M:%S%.3f"),
            ended_at.format("%Y-%m-%d %H:%M:%S%.3f"),
        )
    }

    /// A dockless row: no stations, start coordinates only.
    pub fn dockless_row(
        ride_id: &str,
        started_at: NaiveDateTime,
        ended_at: NaiveDateTime,
        member_casual: &str,
    ) -> String {
        format!(
            "{ride_id},electric_bike,{},{},,,,,38.90,-77.03,,,{member_casual}",
            started_at.format("%Y-%m-%d %H:%M:%S"),
            ended_at.format("%Y-%m-%d %H:%M:%S"),
        )
    }

    /// `count` valid rides spread over October 2025: the first `members`
    /// are members, the rest casual. Durations are 5-34 minutes.
    pub fn generate_rows(count: usize, members: usize) -> Vec<String> {
        (0..count)
            .map(|i| {
                let day = 1 + (i % 28) as u32;
                let hour = (i * 7 % 24) as u32;
                let minute = (i * 13 % 60) as u32;
                let started = mock_timestamp(2025, 10, day, hour, minute, 0);
                let ended = started + chrono::Duration::minutes(5 + (i % 30) as i64);
                let bike = if i % 3 == 0 { "electric_bike" } else { "classic_bike" };
                let user = if i < members { "member" } else { "casual" };
                row(&format!("RIDE{i:05}"), bike, started, ended, i, i + 1, user)
            })
            .collect()
    }

    /// Joins the header and rows into CSV text.
    pub fn document(rows: &[String]) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');
        for row in rows {
            out.push_str(row);
            out.push('\n');
        }
        out
    }

    /// Writes the rows to a temporary `.csv` file.
    #[cfg(feature = "testing")]
    pub fn write_temp(rows: &[String]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("Failed to create temporary file");
        file.write_all(document(rows).as_bytes())
            .expect("Failed to write fixture CSV");
        file.flush().expect("Failed to flush fixture CSV");
        file
    }

    /// Writes the rows to `path`, replacing any existing file.
    pub fn write_to(path: &std::path::Path, rows: &[String]) {
        let mut file = std::fs::File::create(path).expect("Failed to create fixture CSV");
        file.write_all(document(rows).as_bytes())
            .expect("Failed to write fixture CSV");
    }
}

/// Property-based testing strategies.
#[cfg(feature = "testing")]
pub mod property_testing {
    use crate::{BikeType, TimeOfDay, UserType};
    use proptest::prelude::*;

    /// Strategy for user types.
    pub fn user_type_strategy() -> impl Strategy<Value = UserType> {
        prop::sample::select(UserType::ALL.to_vec())
    }

    /// Strategy for bike types.
    pub fn bike_type_strategy() -> impl Strategy<Value = BikeType> {
        prop::sample::select(BikeType::ALL.to_vec())
    }

    /// Strategy for time-of-day buckets.
    pub fn time_of_day_strategy() -> impl Strategy<Value = TimeOfDay> {
        prop::sample::select(TimeOfDay::ALL.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_multiple_calls() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0001, 0.001);
        assert_approx_eq(1.0, 0.9999, 0.001);
    }

    #[test]
    #[should_panic]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq(1.0, 1.1, 0.05);
    }

    #[test]
    fn test_generated_rows_have_header_width() {
        let columns = trip_csv::HEADER.split(',').count();
        for row in trip_csv::generate_rows(10, 4) {
            assert_eq!(row.split(',').count(), columns);
        }
        let dockless = trip_csv::dockless_row(
            "X1",
            mock_timestamp(2025, 10, 1, 9, 0, 0),
            mock_timestamp(2025, 10, 1, 9, 20, 0),
            "casual",
        );
        assert_eq!(dockless.split(',').count(), columns);
    }
}
