//! Aggregations feeding the charts.
//!
//! Every function takes a filtered view and is total: an empty view yields
//! empty or all-zero results, never an error.

use bikeshare_common::{BikeType, TimeOfDay, UserType};
use bikeshare_data::summary::{mean, quantile_sorted};
use bikeshare_data::tables::{counts_by, UserTypeCounts, WEEKDAYS};
use bikeshare_data::Trip;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Month names indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Full weekday names, Monday first.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Name of a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("Unknown")
}

/// Rides per start hour, all 24 hours present.
pub fn hourly_counts(trips: &[&Trip]) -> [UserTypeCounts; 24] {
    let mut hours = [UserTypeCounts::default(); 24];
    for trip in trips {
        hours[(trip.hour % 24) as usize].add(trip.user_type);
    }
    hours
}

/// Rides per start date.
pub fn daily_counts(trips: &[&Trip]) -> BTreeMap<NaiveDate, UserTypeCounts> {
    counts_by(trips, |t| t.date)
}

/// Rides per month number of the start date.
pub fn monthly_counts(trips: &[&Trip]) -> BTreeMap<u32, UserTypeCounts> {
    counts_by(trips, |t| t.month)
}

/// Rides per user type over the whole view.
pub fn overall_counts(trips: &[&Trip]) -> UserTypeCounts {
    let mut counts = UserTypeCounts::default();
    for trip in trips {
        counts.add(trip.user_type);
    }
    counts
}

/// Rides per bike type split by user type.
pub fn bike_type_counts(trips: &[&Trip]) -> BTreeMap<BikeType, UserTypeCounts> {
    counts_by(trips, |t| t.bike_type)
}

/// Rides per time-of-day bucket in bucket order, empty buckets included.
pub fn time_of_day_counts(trips: &[&Trip]) -> Vec<(TimeOfDay, UserTypeCounts)> {
    let table = counts_by(trips, |t| t.time_of_day);
    TimeOfDay::ALL
        .iter()
        .map(|&bucket| (bucket, table.get(&bucket).copied().unwrap_or_default()))
        .collect()
}

/// Trailing mean of daily rides per user type on one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingPoint {
    /// Last date of the window.
    pub date: NaiveDate,
    /// Mean member rides per day.
    pub member: f64,
    /// Mean casual rides per day.
    pub casual: f64,
}

impl RollingPoint {
    /// Value for one user type.
    pub fn get(&self, user: UserType) -> f64 {
        match user {
            UserType::Member => self.member,
            UserType::Casual => self.casual,
        }
    }
}

/// Rolling mean over the dates that have rides.
///
/// The window covers the last `window` dates present in `daily` (at least
/// one), so the first points average over fewer days. A user type with no
/// rides on a present date counts as zero.
pub fn rolling_average(daily: &BTreeMap<NaiveDate, UserTypeCounts>, window: usize) -> Vec<RollingPoint> {
    let window = window.max(1);
    let rows: Vec<(NaiveDate, UserTypeCounts)> = daily.iter().map(|(d, c)| (*d, *c)).collect();

    rows.iter()
        .enumerate()
        .map(|(i, (date, _))| {
            let slice = &rows[(i + 1).saturating_sub(window)..=i];
            let n = slice.len() as f64;
            RollingPoint {
                date: *date,
                member: slice.iter().map(|(_, c)| c.member as f64).sum::<f64>() / n,
                casual: slice.iter().map(|(_, c)| c.casual as f64).sum::<f64>() / n,
            }
        })
        .collect()
}

/// A labelled matrix of counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    /// One label per row.
    pub row_labels: Vec<String>,
    /// One label per column.
    pub col_labels: Vec<String>,
    /// `values[row][col]`.
    pub values: Vec<Vec<f64>>,
}

impl Grid {
    fn zeros(row_labels: Vec<String>, col_labels: Vec<String>) -> Self {
        let values = vec![vec![0.0; col_labels.len()]; row_labels.len()];
        Self {
            row_labels,
            col_labels,
            values,
        }
    }

    /// Sum of all cells.
    pub fn total(&self) -> f64 {
        self.values.iter().flatten().sum()
    }

    /// Largest cell, zero for an empty grid.
    pub fn max(&self) -> f64 {
        self.values.iter().flatten().copied().fold(0.0, f64::max)
    }
}

fn weekday_labels() -> Vec<String> {
    WEEKDAY_NAMES.iter().map(|d| d.to_string()).collect()
}

fn hour_labels() -> Vec<String> {
    (0..24).map(|h| h.to_string()).collect()
}

/// Hour of day (rows) by weekday (columns).
pub fn hour_weekday_grid(trips: &[&Trip]) -> Grid {
    let mut grid = Grid::zeros(hour_labels(), weekday_labels());
    for trip in trips {
        let col = trip.weekday.num_days_from_monday() as usize;
        grid.values[(trip.hour % 24) as usize][col] += 1.0;
    }
    grid
}

/// User type (rows) by hour of day (columns).
pub fn user_hour_grid(trips: &[&Trip]) -> Grid {
    let rows = UserType::ALL.iter().map(|u| u.to_string()).collect();
    let mut grid = Grid::zeros(rows, hour_labels());
    for trip in trips {
        grid.values[trip.user_type.index()][(trip.hour % 24) as usize] += 1.0;
    }
    grid
}

/// Month (rows, only months with rides) by weekday (columns).
pub fn month_weekday_grid(trips: &[&Trip]) -> Grid {
    let months: Vec<u32> = monthly_counts(trips).into_keys().collect();
    let rows = months.iter().map(|&m| month_name(m).to_string()).collect();
    let mut grid = Grid::zeros(rows, weekday_labels());
    for trip in trips {
        if let Ok(row) = months.binary_search(&trip.month) {
            grid.values[row][trip.weekday.num_days_from_monday() as usize] += 1.0;
        }
    }
    grid
}

/// Five-number summary with whiskers at 1.5 IQR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxSummary {
    /// Sample size.
    pub count: usize,
    /// Lowest value within 1.5 IQR of the first quartile.
    pub lower_whisker: f64,
    /// First quartile.
    pub q1: f64,
    /// Median.
    pub median: f64,
    /// Third quartile.
    pub q3: f64,
    /// Highest value within 1.5 IQR of the third quartile.
    pub upper_whisker: f64,
    /// Values outside the whiskers.
    pub outliers: usize,
}

impl BoxSummary {
    /// Summarizes `values`; `None` when empty.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let fence = 1.5 * (q3 - q1);
        let (low_fence, high_fence) = (q1 - fence, q3 + fence);

        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| (low_fence..=high_fence).contains(v))
            .collect();

        Some(Self {
            count: sorted.len(),
            lower_whisker: inside.first().copied().unwrap_or(q1),
            q1,
            median: quantile_sorted(&sorted, 0.5),
            q3,
            upper_whisker: inside.last().copied().unwrap_or(q3),
            outliers: sorted.len() - inside.len(),
        })
    }
}

fn boxes_by_user<F>(trips: &[&Trip], value: F) -> Vec<(UserType, BoxSummary)>
where
    F: Fn(&Trip) -> Option<f64>,
{
    UserType::ALL
        .iter()
        .filter_map(|&user| {
            let values = trips
                .iter()
                .filter(|t| t.user_type == user)
                .filter_map(|t| value(t));
            BoxSummary::from_values(values).map(|summary| (user, summary))
        })
        .collect()
}

/// Ride durations up to `max_minutes` per user type.
pub fn duration_boxes(trips: &[&Trip], max_minutes: f64) -> Vec<(UserType, BoxSummary)> {
    boxes_by_user(trips, |t| (t.duration_minutes <= max_minutes).then_some(t.duration_minutes))
}

/// Positive ride distances up to `max_km` per user type.
pub fn distance_boxes(trips: &[&Trip], max_km: f64) -> Vec<(UserType, BoxSummary)> {
    boxes_by_user(trips, |t| {
        (t.distance_km > 0.0 && t.distance_km <= max_km).then_some(t.distance_km)
    })
}

/// Equal-width bins over `lo..=hi`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Left edge of the first bin.
    pub lo: f64,
    /// Right edge of the last bin.
    pub hi: f64,
    /// Count per bin.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bins `values`, dropping those outside `lo..=hi`. The last bin is
    /// closed on the right.
    pub fn new(values: impl IntoIterator<Item = f64>, lo: f64, hi: f64, bins: usize) -> Self {
        let bins = bins.max(1);
        let mut counts = vec![0; bins];
        let width = (hi - lo) / bins as f64;
        if width > 0.0 {
            for v in values.into_iter().filter(|v| (lo..=hi).contains(v)) {
                let index = (((v - lo) / width) as usize).min(bins - 1);
                counts[index] += 1;
            }
        }
        Self { lo, hi, counts }
    }

    /// Width of one bin.
    pub fn bin_width(&self) -> f64 {
        (self.hi - self.lo) / self.counts.len() as f64
    }

    /// Values counted.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Duration histograms per user type over `0..=max_minutes`.
pub fn duration_histograms(trips: &[&Trip], max_minutes: f64, bins: usize) -> Vec<(UserType, Histogram)> {
    UserType::ALL
        .iter()
        .filter(|&&user| trips.iter().any(|t| t.user_type == user))
        .map(|&user| {
            let values = trips
                .iter()
                .filter(|t| t.user_type == user)
                .map(|t| t.duration_minutes);
            (user, Histogram::new(values, 0.0, max_minutes, bins))
        })
        .collect()
}

/// Sorted indices of up to `n` items drawn from `0..len` without
/// replacement. Deterministic for a given seed; all indices when
/// `len <= n`.
pub fn sample_indices(len: usize, n: usize, seed: u64) -> Vec<usize> {
    if len <= n {
        return (0..len).collect();
    }
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut indices: Vec<usize> = (0..len).collect();
    for i in 0..n {
        let j = rng.usize(i..len);
        indices.swap(i, j);
    }
    indices.truncate(n);
    indices.sort_unstable();
    indices
}

/// Up to `n` items of `items`, in their original order.
pub fn sample<T: Clone>(items: &[T], n: usize, seed: u64) -> Vec<T> {
    sample_indices(items.len(), n, seed)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

/// Start location of one ride.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Start hour.
    pub hour: u32,
}

/// Start locations of up to `n` sampled rides that have coordinates.
pub fn ride_locations(trips: &[&Trip], n: usize, seed: u64) -> Vec<LocationPoint> {
    let located: Vec<LocationPoint> = trips
        .iter()
        .filter_map(|t| {
            t.start.map(|p| LocationPoint {
                lat: p.lat,
                lng: p.lng,
                hour: t.hour,
            })
        })
        .collect();
    sample(&located, n, seed)
}

/// A start station with its position and usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationPoint {
    /// Station name.
    pub station: String,
    /// Mean start latitude.
    pub lat: f64,
    /// Mean start longitude.
    pub lng: f64,
    /// Rides started.
    pub rides: usize,
    /// Mean ride duration in minutes.
    pub avg_duration: f64,
    /// Share of member rides, `0.0..=1.0`.
    pub member_ratio: f64,
}

#[derive(Default)]
struct StationAccumulator {
    lat: f64,
    lng: f64,
    rides: usize,
    minutes: f64,
    members: usize,
}

/// The `limit` busiest named start stations with coordinates. Positions
/// are averaged over the rides, since dockless rides report slightly
/// different coordinates for the same station.
pub fn station_points(trips: &[&Trip], limit: usize) -> Vec<StationPoint> {
    let mut stations: HashMap<&str, StationAccumulator> = HashMap::new();
    for trip in trips {
        let (Some(name), Some(point)) = (trip.start_station_name.as_deref(), trip.start) else {
            continue;
        };
        let acc = stations.entry(name).or_default();
        acc.lat += point.lat;
        acc.lng += point.lng;
        acc.rides += 1;
        acc.minutes += trip.duration_minutes;
        if trip.is_member() {
            acc.members += 1;
        }
    }

    let mut points: Vec<StationPoint> = stations
        .into_iter()
        .map(|(name, acc)| {
            let n = acc.rides as f64;
            StationPoint {
                station: name.to_string(),
                lat: acc.lat / n,
                lng: acc.lng / n,
                rides: acc.rides,
                avg_duration: acc.minutes / n,
                member_ratio: acc.members as f64 / n,
            }
        })
        .collect();
    points.sort_by(|a, b| b.rides.cmp(&a.rides).then_with(|| a.station.cmp(&b.station)));
    points.truncate(limit);
    points
}

/// Starts and ends of one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationActivity {
    /// Station name.
    pub station: String,
    /// Rides started there.
    pub starts: usize,
    /// Rides ended there.
    pub ends: usize,
    /// Starts plus ends.
    pub total: usize,
    /// Starts minus ends.
    pub net_flow: i64,
}

/// The `limit` stations with the most starts plus ends.
pub fn station_activity(trips: &[&Trip], limit: usize) -> Vec<StationActivity> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for trip in trips {
        if let Some(name) = trip.start_station_name.as_deref() {
            counts.entry(name).or_default().0 += 1;
        }
        if let Some(name) = trip.end_station_name.as_deref() {
            counts.entry(name).or_default().1 += 1;
        }
    }

    let mut rows: Vec<StationActivity> = counts
        .into_iter()
        .map(|(name, (starts, ends))| StationActivity {
            station: name.to_string(),
            starts,
            ends,
            total: starts + ends,
            net_flow: starts as i64 - ends as i64,
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.station.cmp(&b.station)));
    rows.truncate(limit);
    rows
}

/// One cell of the start-location density grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityCell {
    /// Cell centre latitude.
    pub lat: f64,
    /// Cell centre longitude.
    pub lng: f64,
    /// Rides starting in the cell.
    pub rides: usize,
}

/// Bins start coordinates into a `bins` x `bins` grid over their bounding
/// box and returns the non-empty cells.
pub fn density_grid(trips: &[&Trip], bins: usize) -> Vec<DensityCell> {
    let points: Vec<(f64, f64)> = trips.iter().filter_map(|t| t.start.map(|p| (p.lat, p.lng))).collect();
    if points.is_empty() {
        return Vec::new();
    }
    let bins = bins.max(1);
    let (lat_min, lat_max) = bounds(points.iter().map(|p| p.0));
    let (lng_min, lng_max) = bounds(points.iter().map(|p| p.1));
    let lat_step = ((lat_max - lat_min) / bins as f64).max(f64::EPSILON);
    let lng_step = ((lng_max - lng_min) / bins as f64).max(f64::EPSILON);

    let mut cells: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    for (lat, lng) in points {
        let row = (((lat - lat_min) / lat_step) as usize).min(bins - 1);
        let col = (((lng - lng_min) / lng_step) as usize).min(bins - 1);
        *cells.entry((row, col)).or_insert(0) += 1;
    }

    cells
        .into_iter()
        .map(|((row, col), rides)| DensityCell {
            lat: lat_min + (row as f64 + 0.5) * lat_step,
            lng: lng_min + (col as f64 + 0.5) * lng_step,
            rides,
        })
        .collect()
}

/// Smallest and largest of `values`.
pub fn bounds(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Duration and distance of one ride.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DurationDistance {
    /// Great-circle distance in km.
    pub distance_km: f64,
    /// Duration in minutes.
    pub duration_minutes: f64,
    /// Rider category.
    pub user_type: UserType,
}

/// Up to `n` sampled rides no longer than `max_minutes` and `max_km`.
pub fn duration_distance_points(
    trips: &[&Trip],
    max_minutes: f64,
    max_km: f64,
    n: usize,
    seed: u64,
) -> Vec<DurationDistance> {
    let eligible: Vec<DurationDistance> = trips
        .iter()
        .filter(|t| t.duration_minutes <= max_minutes && t.distance_km <= max_km)
        .map(|t| DurationDistance {
            distance_km: t.distance_km,
            duration_minutes: t.duration_minutes,
            user_type: t.user_type,
        })
        .collect();
    sample(&eligible, n, seed)
}

/// Mean ride of one user type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UserAverages {
    /// Rider category.
    pub user_type: UserType,
    /// Mean duration in minutes.
    pub avg_duration: f64,
    /// Mean distance in km.
    pub avg_distance: f64,
    /// Rides averaged.
    pub rides: usize,
    /// Mean distance over mean duration, in km/h.
    pub speed_kmh: f64,
}

/// Per-user-type means of `points`.
pub fn user_averages(points: &[DurationDistance]) -> Vec<UserAverages> {
    UserType::ALL
        .iter()
        .filter_map(|&user| {
            let rides: Vec<&DurationDistance> = points.iter().filter(|p| p.user_type == user).collect();
            let avg_duration = mean(rides.iter().map(|p| p.duration_minutes))?;
            let avg_distance = mean(rides.iter().map(|p| p.distance_km))?;
            let speed_kmh = if avg_duration > 0.0 {
                avg_distance / (avg_duration / 60.0)
            } else {
                0.0
            };
            Some(UserAverages {
                user_type: user,
                avg_duration,
                avg_distance,
                rides: rides.len(),
                speed_kmh,
            })
        })
        .collect()
}

/// The most used bike type of one hour and user type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsagePattern {
    /// Start hour.
    pub hour: u32,
    /// Rider category.
    pub user_type: UserType,
    /// Most used bike type; ties go to the earlier type in [`BikeType::ALL`].
    pub bike_type: BikeType,
    /// Rides on that bike type.
    pub rides: usize,
}

/// Dominant bike type for every (hour, user type) pair that has rides.
pub fn dominant_bike_types(trips: &[&Trip]) -> Vec<UsagePattern> {
    let table = counts_by(trips, |t| (t.hour, t.user_type, t.bike_type));
    let mut best: BTreeMap<(u32, UserType), (BikeType, usize)> = BTreeMap::new();
    for (&(hour, user, bike), counts) in &table {
        let rides = counts.total();
        let entry = best.entry((hour, user)).or_insert((bike, rides));
        if rides > entry.1 {
            *entry = (bike, rides);
        }
    }

    best.into_iter()
        .map(|((hour, user_type), (bike_type, rides))| UsagePattern {
            hour,
            user_type,
            bike_type,
            rides,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bikeshare_common::test_utils::{assert_approx_eq, trip_csv};
    use bikeshare_data::{read_trips, Dataset, LoadOptions};
    use std::path::Path;

    fn dataset(count: usize, members: usize) -> Dataset {
        let text = trip_csv::document(&trip_csv::generate_rows(count, members));
        read_trips(text.as_bytes(), Path::new("t.csv"), &LoadOptions::default()).expect("load")
    }

    fn counts(member: usize, casual: usize) -> UserTypeCounts {
        UserTypeCounts { member, casual }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
    }

    #[test]
    fn test_rolling_average_min_periods() {
        let daily: BTreeMap<NaiveDate, UserTypeCounts> = [
            (date(1), counts(2, 0)),
            (date(2), counts(4, 2)),
            (date(5), counts(6, 4)),
        ]
        .into_iter()
        .collect();

        let points = rolling_average(&daily, 2);
        assert_eq!(points.len(), 3);
        assert_approx_eq(points[0].member, 2.0, 1e-12);
        assert_approx_eq(points[0].casual, 0.0, 1e-12);
        assert_approx_eq(points[1].member, 3.0, 1e-12);
        assert_approx_eq(points[1].casual, 1.0, 1e-12);
        // Window runs over present dates, so 2 and 5 are neighbours.
        assert_approx_eq(points[2].member, 5.0, 1e-12);
        assert_approx_eq(points[2].get(UserType::Casual), 3.0, 1e-12);

        let weekly = rolling_average(&daily, 7);
        assert_approx_eq(weekly[2].member, 4.0, 1e-12);
        assert!(rolling_average(&BTreeMap::new(), 7).is_empty());
    }

    #[test]
    fn test_hourly_and_overall_counts() {
        let dataset = dataset(48, 20);
        let view = dataset.view();
        let hours = hourly_counts(&view);
        let total: usize = hours.iter().map(UserTypeCounts::total).sum();
        assert_eq!(total, 48);

        let overall = overall_counts(&view);
        assert_eq!(overall, counts(20, 28));
        assert_eq!(time_of_day_counts(&view).len(), 4);
        assert_eq!(
            time_of_day_counts(&view).iter().map(|(_, c)| c.total()).sum::<usize>(),
            48
        );
    }

    #[test]
    fn test_grids_preserve_totals() {
        let dataset = dataset(60, 25);
        let view = dataset.view();

        let hour_weekday = hour_weekday_grid(&view);
        assert_eq!(hour_weekday.row_labels.len(), 24);
        assert_eq!(hour_weekday.col_labels[0], "Monday");
        assert_eq!(hour_weekday.total(), 60.0);

        let user_hour = user_hour_grid(&view);
        assert_eq!(user_hour.row_labels, vec!["member", "casual"]);
        assert_eq!(user_hour.values[0].iter().sum::<f64>(), 25.0);

        let month_weekday = month_weekday_grid(&view);
        assert_eq!(month_weekday.row_labels, vec!["October"]);
        assert_eq!(month_weekday.total(), 60.0);

        let empty = month_weekday_grid(&[]);
        assert!(empty.values.is_empty());
        assert_eq!(empty.max(), 0.0);
    }

    #[test]
    fn test_box_summary_whiskers() {
        let summary = BoxSummary::from_values([1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).expect("summary");
        assert_eq!(summary.count, 6);
        assert_approx_eq(summary.q1, 2.25, 1e-12);
        assert_approx_eq(summary.median, 3.5, 1e-12);
        assert_approx_eq(summary.q3, 4.75, 1e-12);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 5.0);
        assert_eq!(summary.outliers, 1);
        assert!(BoxSummary::from_values(Vec::new()).is_none());
    }

    #[test]
    fn test_histogram_bins() {
        let hist = Histogram::new([0.0, 1.0, 2.4, 2.5, 120.0, 121.0, -1.0], 0.0, 120.0, 50);
        assert_eq!(hist.counts.len(), 50);
        assert_approx_eq(hist.bin_width(), 2.4, 1e-12);
        assert_eq!(hist.counts[0], 2);
        assert_eq!(hist.counts[1], 2);
        assert_eq!(hist.counts[49], 1);
        assert_eq!(hist.total(), 5);
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let a = sample_indices(1000, 50, 42);
        let b = sample_indices(1000, 50, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 50);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(sample_indices(10, 50, 42), (0..10).collect::<Vec<_>>());
        assert_ne!(sample_indices(1000, 50, 7), a);
    }

    #[test]
    fn test_station_aggregates() {
        let dataset = dataset(40, 10);
        let view = dataset.view();

        let points = station_points(&view, 3);
        assert_eq!(points.len(), 3);
        assert!(points.windows(2).all(|w| w[0].rides >= w[1].rides));
        assert!(points.iter().all(|p| (0.0..=1.0).contains(&p.member_ratio)));

        let activity = station_activity(&view, 30);
        assert_eq!(activity.iter().map(|a| a.starts).sum::<usize>(), 40);
        assert_eq!(activity.iter().map(|a| a.net_flow).sum::<i64>(), 0);

        let cells = density_grid(&view, 10);
        assert_eq!(cells.iter().map(|c| c.rides).sum::<usize>(), 40);
        assert!(density_grid(&[], 10).is_empty());
    }

    #[test]
    fn test_user_averages_speed() {
        let points = [
            DurationDistance {
                distance_km: 2.0,
                duration_minutes: 10.0,
                user_type: UserType::Member,
            },
            DurationDistance {
                distance_km: 4.0,
                duration_minutes: 20.0,
                user_type: UserType::Member,
            },
        ];
        let averages = user_averages(&points);
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].rides, 2);
        assert_approx_eq(averages[0].avg_distance, 3.0, 1e-12);
        assert_approx_eq(averages[0].speed_kmh, 12.0, 1e-12);
    }

    #[test]
    fn test_dominant_bike_types() {
        let dataset = dataset(72, 36);
        let view = dataset.view();
        let patterns = dominant_bike_types(&view);
        assert!(!patterns.is_empty());
        for pattern in &patterns {
            let best = view
                .iter()
                .filter(|t| t.hour == pattern.hour && t.user_type == pattern.user_type)
                .filter(|t| t.bike_type == pattern.bike_type)
                .count();
            assert_eq!(best, pattern.rides);
        }
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "Unknown");
        assert_eq!(month_name(13), "Unknown");
    }
}
