//! Headline numbers for a trip view.
//!
//! All functions are total: an empty view yields zero counts, zero
//! percentages and `None` where no value exists.

use crate::trip::Trip;
use bikeshare_common::{percentage, BikeType, UserType};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// Overview of a view: size, time span and category mix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    /// Number of trips.
    pub total_records: usize,
    /// Earliest start.
    pub first_start: Option<NaiveDateTime>,
    /// Latest start.
    pub last_start: Option<NaiveDateTime>,
    /// Share of each user type, summing to 1 for a non-empty view.
    pub user_type_share: BTreeMap<UserType, f64>,
    /// Trips per bike type.
    pub bike_type_counts: BTreeMap<BikeType, usize>,
}

impl DataSummary {
    /// Summarizes `trips`.
    pub fn from_trips(trips: &[&Trip]) -> Self {
        let mut user_counts: BTreeMap<UserType, usize> = BTreeMap::new();
        let mut bike_type_counts = BTreeMap::new();
        for trip in trips {
            *user_counts.entry(trip.user_type).or_insert(0) += 1;
            *bike_type_counts.entry(trip.bike_type).or_insert(0) += 1;
        }

        let total = trips.len();
        let user_type_share = user_counts
            .into_iter()
            .map(|(user, count)| (user, count as f64 / total as f64))
            .collect();

        Self {
            total_records: total,
            first_start: trips.iter().map(|t| t.started_at).min(),
            last_start: trips.iter().map(|t| t.started_at).max(),
            user_type_share,
            bike_type_counts,
        }
    }
}

/// Key performance indicators shown at the top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    /// Number of rides.
    pub total_rides: usize,
    /// Rides by members.
    pub member_rides: usize,
    /// Casual rides.
    pub casual_rides: usize,
    /// Member share in percent.
    pub member_pct: f64,
    /// Mean ride length in minutes.
    pub avg_duration_minutes: f64,
    /// Rides on electric bikes.
    pub electric_rides: usize,
    /// Electric share in percent.
    pub electric_pct: f64,
}

impl Kpis {
    /// Computes the indicators for `trips`.
    pub fn from_trips(trips: &[&Trip]) -> Self {
        let total = trips.len();
        let member_rides = trips.iter().filter(|t| t.user_type == UserType::Member).count();
        let electric_rides = trips
            .iter()
            .filter(|t| t.bike_type == BikeType::ElectricBike)
            .count();

        Self {
            total_rides: total,
            member_rides,
            casual_rides: total - member_rides,
            member_pct: percentage(member_rides, total),
            avg_duration_minutes: mean(trips.iter().map(|t| t.duration_minutes)).unwrap_or(0.0),
            electric_rides,
            electric_pct: percentage(electric_rides, total),
        }
    }
}

/// Station coverage of a view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataQuality {
    /// Number of trips.
    pub total_records: usize,
    /// Trips without a start station.
    pub missing_start_stations: usize,
    /// Percentage of trips without a start station.
    pub missing_start_pct: f64,
    /// Trips without an end station.
    pub missing_end_stations: usize,
    /// Percentage of trips without an end station.
    pub missing_end_pct: f64,
}

impl DataQuality {
    /// Counts missing stations in `trips`.
    pub fn from_trips(trips: &[&Trip]) -> Self {
        let total = trips.len();
        let missing_start = trips.iter().filter(|t| t.start_station_name.is_none()).count();
        let missing_end = trips.iter().filter(|t| t.end_station_name.is_none()).count();
        Self {
            total_records: total,
            missing_start_stations: missing_start,
            missing_start_pct: percentage(missing_start, total),
            missing_end_stations: missing_end,
            missing_end_pct: percentage(missing_end, total),
        }
    }
}

/// Descriptive statistics of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DurationStats {
    /// Sample size.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation; `None` below two values.
    pub std: Option<f64>,
    /// Smallest value.
    pub min: f64,
    /// First quartile.
    pub p25: f64,
    /// Median.
    pub median: f64,
    /// Third quartile.
    pub p75: f64,
    /// Largest value.
    pub max: f64,
}

impl DurationStats {
    /// Describes `values`; `None` when empty.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        Some(Self {
            count,
            mean,
            std,
            min: sorted[0],
            p25: quantile_sorted(&sorted, 0.25),
            median: quantile_sorted(&sorted, 0.5),
            p75: quantile_sorted(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }

    /// Ride durations of `trips`.
    pub fn of_durations(trips: &[&Trip]) -> Option<Self> {
        Self::from_values(trips.iter().map(|t| t.duration_minutes))
    }

    /// Ride durations per user type.
    pub fn by_user_type(trips: &[&Trip]) -> BTreeMap<UserType, Self> {
        UserType::ALL
            .iter()
            .filter_map(|&user| {
                Self::from_values(
                    trips
                        .iter()
                        .filter(|t| t.user_type == user)
                        .map(|t| t.duration_minutes),
                )
                .map(|stats| (user, stats))
            })
            .collect()
    }
}

/// Quantile of sorted data with linear interpolation between closest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Mean of the values; `None` when empty.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::GeoPoint;
    use bikeshare_common::test_utils::{assert_approx_eq, mock_timestamp};

    fn trip(minutes: i64, user: UserType, bike: BikeType, station: Option<&str>) -> Trip {
        let start = mock_timestamp(2025, 10, 6, 8, 0, 0);
        Trip::new(
            format!("T{minutes}"),
            bike,
            start,
            start + chrono::Duration::minutes(minutes),
            (station.map(String::from), None),
            (None, None),
            Some(GeoPoint::new(38.9, -77.0)),
            None,
            user,
        )
    }

    #[test]
    fn test_quantiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_approx_eq(quantile_sorted(&sorted, 0.25), 1.75, 1e-12);
        assert_approx_eq(quantile_sorted(&sorted, 0.5), 2.5, 1e-12);
        assert_approx_eq(quantile_sorted(&sorted, 0.75), 3.25, 1e-12);
        assert_eq!(quantile_sorted(&[7.0], 0.9), 7.0);
    }

    #[test]
    fn test_duration_stats() {
        let stats = DurationStats::from_values([4.0, 2.0, 8.0, 6.0]).expect("stats");
        assert_eq!(stats.count, 4);
        assert_approx_eq(stats.mean, 5.0, 1e-12);
        assert_approx_eq(stats.std.unwrap(), (20.0f64 / 3.0).sqrt(), 1e-12);
        assert_eq!(stats.min, 2.0);
        assert_approx_eq(stats.median, 5.0, 1e-12);
        assert_eq!(stats.max, 8.0);

        let single = DurationStats::from_values([3.0]).expect("stats");
        assert_eq!(single.std, None);
        assert!(DurationStats::from_values(Vec::new()).is_none());
    }

    #[test]
    fn test_kpis() {
        let trips = [
            trip(10, UserType::Member, BikeType::ElectricBike, Some("A")),
            trip(20, UserType::Member, BikeType::ClassicBike, Some("A")),
            trip(30, UserType::Casual, BikeType::ElectricBike, None),
            trip(40, UserType::Casual, BikeType::DockedBike, Some("B")),
        ];
        let view: Vec<&Trip> = trips.iter().collect();
        let kpis = Kpis::from_trips(&view);

        assert_eq!(kpis.total_rides, 4);
        assert_eq!(kpis.member_rides, 2);
        assert_eq!(kpis.casual_rides, 2);
        assert_approx_eq(kpis.member_pct, 50.0, 1e-12);
        assert_approx_eq(kpis.avg_duration_minutes, 25.0, 1e-12);
        assert_eq!(kpis.electric_rides, 2);
        assert_approx_eq(kpis.electric_pct, 50.0, 1e-12);

        let quality = DataQuality::from_trips(&view);
        assert_eq!(quality.missing_start_stations, 1);
        assert_approx_eq(quality.missing_start_pct, 25.0, 1e-12);
        assert_eq!(quality.missing_end_stations, 4);

        let by_user = DurationStats::by_user_type(&view);
        assert_approx_eq(by_user[&UserType::Member].mean, 15.0, 1e-12);
        assert_approx_eq(by_user[&UserType::Casual].mean, 35.0, 1e-12);
    }

    #[test]
    fn test_empty_view_is_all_zero() {
        let kpis = Kpis::from_trips(&[]);
        assert_eq!(kpis.total_rides, 0);
        assert_eq!(kpis.member_pct, 0.0);
        assert_eq!(kpis.avg_duration_minutes, 0.0);
        assert_eq!(kpis.electric_pct, 0.0);

        let summary = DataSummary::from_trips(&[]);
        assert_eq!(summary.total_records, 0);
        assert!(summary.first_start.is_none());
        assert!(summary.user_type_share.is_empty());

        assert_eq!(DataQuality::from_trips(&[]).missing_start_pct, 0.0);
        assert!(DurationStats::by_user_type(&[]).is_empty());
    }

    #[test]
    fn test_summary_shares_sum_to_one() {
        let trips = [
            trip(10, UserType::Member, BikeType::ElectricBike, None),
            trip(12, UserType::Member, BikeType::ElectricBike, None),
            trip(14, UserType::Casual, BikeType::ClassicBike, None),
        ];
        let view: Vec<&Trip> = trips.iter().collect();
        let summary = DataSummary::from_trips(&view);
        let total: f64 = summary.user_type_share.values().sum();
        assert_approx_eq(total, 1.0, 1e-12);
        assert_eq!(summary.bike_type_counts[&BikeType::ElectricBike], 2);
    }
}
