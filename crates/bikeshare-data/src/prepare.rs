//! Row parsing and derived-field computation.

use crate::trip::{GeoPoint, Trip};
use bikeshare_common::{BikeType, BikeshareError, Result, UserType};
use chrono::NaiveDateTime;
use serde::Deserialize;

/// Mean Earth radius used for distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Columns a trip export must provide.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "ride_id",
    "rideable_type",
    "started_at",
    "ended_at",
    "member_casual",
];

const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// One CSV row as found in the export, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrip {
    /// `ride_id`
    pub ride_id: String,
    /// `rideable_type`
    pub rideable_type: String,
    /// `started_at`
    pub started_at: String,
    /// `ended_at`
    pub ended_at: String,
    /// `start_station_name`
    #[serde(default)]
    pub start_station_name: Option<String>,
    /// `start_station_id`
    #[serde(default)]
    pub start_station_id: Option<String>,
    /// `end_station_name`
    #[serde(default)]
    pub end_station_name: Option<String>,
    /// `end_station_id`
    #[serde(default)]
    pub end_station_id: Option<String>,
    /// `start_lat`
    #[serde(default)]
    pub start_lat: Option<String>,
    /// `start_lng`
    #[serde(default)]
    pub start_lng: Option<String>,
    /// `end_lat`
    #[serde(default)]
    pub end_lat: Option<String>,
    /// `end_lng`
    #[serde(default)]
    pub end_lng: Option<String>,
    /// `member_casual`
    pub member_casual: String,
}

/// Parses a start/end timestamp in any of the layouts seen in the exports.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches('Z');
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Great-circle distance between two points.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_coordinate(value: &Option<String>, field: &str) -> Result<Option<f64>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| BikeshareError::parse_field(format!("invalid coordinate '{text}'"), field)),
    }
}

fn parse_point(
    lat: &Option<String>,
    lng: &Option<String>,
    lat_field: &str,
    lng_field: &str,
) -> Result<Option<GeoPoint>> {
    let lat = parse_coordinate(lat, lat_field)?;
    let lng = parse_coordinate(lng, lng_field)?;
    Ok(match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
        _ => None,
    })
}

fn required_timestamp(raw: &str, field: &str) -> Result<NaiveDateTime> {
    parse_timestamp(raw)
        .ok_or_else(|| BikeshareError::parse_field(format!("invalid timestamp '{}'", raw.trim()), field))
}

impl RawTrip {
    /// Validates the row and computes the derived fields.
    pub fn into_trip(self) -> Result<Trip> {
        let ride_id = self.ride_id.trim();
        if ride_id.is_empty() {
            return Err(BikeshareError::parse_field("ride id is empty", "ride_id"));
        }

        let bike_type: BikeType = self.rideable_type.parse()?;
        let user_type: UserType = self.member_casual.parse()?;
        let started_at = required_timestamp(&self.started_at, "started_at")?;
        let ended_at = required_timestamp(&self.ended_at, "ended_at")?;
        let start = parse_point(&self.start_lat, &self.start_lng, "start_lat", "start_lng")?;
        let end = parse_point(&self.end_lat, &self.end_lng, "end_lat", "end_lng")?;

        Ok(Trip::new(
            ride_id,
            bike_type,
            started_at,
            ended_at,
            (non_empty(self.start_station_name), non_empty(self.start_station_id)),
            (non_empty(self.end_station_name), non_empty(self.end_station_id)),
            start,
            end,
            user_type,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bikeshare_common::test_utils::{assert_approx_eq, mock_timestamp};
    use bikeshare_common::TimeOfDay;

    fn raw() -> RawTrip {
        RawTrip {
            ride_id: "ABC123".to_string(),
            rideable_type: "electric_bike".to_string(),
            started_at: "2025-10-01 08:15:00.123".to_string(),
            ended_at: "2025-10-01 08:45:00.123".to_string(),
            start_station_name: Some("15th & P St NW".to_string()),
            start_station_id: Some("31201".to_string()),
            end_station_name: Some(" ".to_string()),
            end_station_id: None,
            start_lat: Some("38.9098".to_string()),
            start_lng: Some("-77.0344".to_string()),
            end_lat: Some("38.8974".to_string()),
            end_lng: Some("-77.0063".to_string()),
            member_casual: "Member".to_string(),
        }
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = mock_timestamp(2025, 10, 1, 8, 15, 0);
        assert_eq!(parse_timestamp("2025-10-01 08:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-10-01T08:15:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-10-01T08:15:00Z"), Some(expected));
        assert_eq!(parse_timestamp(" 2025-10-01 08:15 "), Some(expected));
        assert_eq!(parse_timestamp("10/01/2025 08:15"), Some(expected));
        assert_eq!(parse_timestamp("10/01/2025 08:15:00"), Some(expected));
        assert!(parse_timestamp("2025-10-01 08:15:00.500").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_haversine() {
        let union_station = GeoPoint::new(38.8974, -77.0063);
        assert_eq!(haversine_km(union_station, union_station), 0.0);

        // One degree of latitude is about 111.19 km on a 6371 km sphere.
        let a = GeoPoint::new(38.0, -77.0);
        let b = GeoPoint::new(39.0, -77.0);
        assert_approx_eq(haversine_km(a, b), 111.195, 0.01);
        assert_approx_eq(haversine_km(a, b), haversine_km(b, a), 1e-12);
    }

    #[test]
    fn test_into_trip_normalizes_and_derives() {
        let trip = raw().into_trip().expect("valid row");
        assert_eq!(trip.ride_id, "ABC123");
        assert_eq!(trip.bike_type, BikeType::ElectricBike);
        assert_eq!(trip.user_type, UserType::Member);
        assert_eq!(trip.end_station_name, None);
        assert_eq!(trip.time_of_day, TimeOfDay::Morning);
        assert_approx_eq(trip.duration_minutes, 30.0, 1e-9);
        assert!(trip.distance_km > 2.0 && trip.distance_km < 3.5);
    }

    #[test]
    fn test_partial_coordinates_are_missing() {
        let mut row = raw();
        row.end_lng = None;
        let trip = row.into_trip().expect("valid row");
        assert!(trip.end.is_none());
        assert_eq!(trip.distance_km, 0.0);
    }

    #[test]
    fn test_rejects_malformed_values() {
        let mut row = raw();
        row.member_casual = "tourist".to_string();
        assert!(row.into_trip().is_err());

        let mut row = raw();
        row.rideable_type = "unicycle".to_string();
        assert!(row.into_trip().is_err());

        let mut row = raw();
        row.started_at = "not a date".to_string();
        match row.into_trip().unwrap_err() {
            BikeshareError::Parse { field, .. } => assert_eq!(field.as_deref(), Some("started_at")),
            other => panic!("unexpected error: {other}"),
        }

        let mut row = raw();
        row.start_lat = Some("north".to_string());
        assert!(row.into_trip().is_err());

        let mut row = raw();
        row.ride_id = "  ".to_string();
        assert!(row.into_trip().is_err());
    }
}
