//! CSV export of a filtered view.

use crate::trip::{GeoPoint, Trip};
use bikeshare_common::{format_timestamp, BikeshareError, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

const EXPORT_HEADER: [&str; 19] = [
    "ride_id",
    "rideable_type",
    "started_at",
    "ended_at",
    "start_station_name",
    "start_station_id",
    "end_station_name",
    "end_station_id",
    "start_lat",
    "start_lng",
    "end_lat",
    "end_lng",
    "member_casual",
    "ride_duration_minutes",
    "hour",
    "day_of_week",
    "weekend",
    "time_of_day",
    "distance_km",
];

fn coordinates(point: Option<GeoPoint>) -> (String, String) {
    point.map_or_else(
        || (String::new(), String::new()),
        |p| (p.lat.to_string(), p.lng.to_string()),
    )
}

/// Writes trips in source layout followed by the derived columns.
pub fn write_trips_csv_to<W: Write>(writer: W, trips: &[&Trip]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADER)?;

    for trip in trips {
        let (start_lat, start_lng) = coordinates(trip.start);
        let (end_lat, end_lng) = coordinates(trip.end);
        let started_at = format_timestamp(trip.started_at);
        let ended_at = format_timestamp(trip.ended_at);
        let duration = format!("{:.2}", trip.duration_minutes);
        let hour = trip.hour.to_string();
        let weekday = trip.weekday.to_string();
        let weekend = trip.is_weekend.to_string();
        let distance = format!("{:.3}", trip.distance_km);

        let record: [&str; 19] = [
            &trip.ride_id,
            trip.bike_type.as_str(),
            &started_at,
            &ended_at,
            trip.start_station_name.as_deref().unwrap_or(""),
            trip.start_station_id.as_deref().unwrap_or(""),
            trip.end_station_name.as_deref().unwrap_or(""),
            trip.end_station_id.as_deref().unwrap_or(""),
            &start_lat,
            &start_lng,
            &end_lat,
            &end_lng,
            trip.user_type.as_str(),
            &duration,
            &hour,
            &weekday,
            &weekend,
            trip.time_of_day.label(),
            &distance,
        ];
        wtr.write_record(record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes trips to a CSV file, creating parent directories as needed.
pub fn write_trips_csv(path: &Path, trips: &[&Trip]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)
        .map_err(|e| BikeshareError::with_source(format!("Failed to create {}", path.display()), e))?;
    write_trips_csv_to(std::io::BufWriter::new(file), trips)?;
    info!(path = %path.display(), rows = trips.len(), "Exported trips");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{read_trips, LoadOptions};
    use bikeshare_common::test_utils::trip_csv;

    #[test]
    fn test_export_round_trips_through_loader() {
        let text = trip_csv::document(&trip_csv::generate_rows(8, 3));
        let dataset = read_trips(text.as_bytes(), Path::new("in.csv"), &LoadOptions::default()).expect("load");

        let mut out = Vec::new();
        write_trips_csv_to(&mut out, &dataset.view()).expect("export");

        let reloaded = read_trips(out.as_slice(), Path::new("out.csv"), &LoadOptions::default()).expect("reload");
        assert_eq!(reloaded.len(), dataset.len());
        for (a, b) in dataset.iter().zip(reloaded.iter()) {
            assert_eq!(a.ride_id, b.ride_id);
            assert_eq!(a.user_type, b.user_type);
            assert_eq!(a.hour, b.hour);
        }
    }

    #[test]
    fn test_export_header_only_for_empty_view() {
        let mut out = Vec::new();
        write_trips_csv_to(&mut out, &[]).expect("export");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("ride_id,rideable_type"));
    }
}
