//! Aggregated tables behind the dashboard charts.

use crate::summary::DurationStats;
use crate::trip::Trip;
use bikeshare_common::{BikeType, UserType};
use chrono::{NaiveDate, Weekday};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Stations listed in the popular-station tables.
pub const TOP_STATION_ROWS: usize = 20;

/// Weekdays in calendar order, Monday first.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Ride counts split by user type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserTypeCounts {
    /// Member rides.
    pub member: usize,
    /// Casual rides.
    pub casual: usize,
}

impl UserTypeCounts {
    /// Adds one ride of `user`.
    pub fn add(&mut self, user: UserType) {
        match user {
            UserType::Member => self.member += 1,
            UserType::Casual => self.casual += 1,
        }
    }

    /// Count for one user type.
    pub fn get(&self, user: UserType) -> usize {
        match user {
            UserType::Member => self.member,
            UserType::Casual => self.casual,
        }
    }

    /// Both user types together.
    pub fn total(&self) -> usize {
        self.member + self.casual
    }
}

/// Which end of a ride a station table counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationEnd {
    /// Start station.
    Start,
    /// End station.
    End,
}

/// A station and its ride count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationCount {
    /// Station name.
    pub station: String,
    /// Rides starting or ending there.
    pub rides: usize,
}

/// Groups rides by `key` and splits each group by user type.
pub fn counts_by<K, F>(trips: &[&Trip], key: F) -> BTreeMap<K, UserTypeCounts>
where
    K: Ord,
    F: Fn(&Trip) -> K,
{
    let mut table: BTreeMap<K, UserTypeCounts> = BTreeMap::new();
    for trip in trips {
        table.entry(key(trip)).or_default().add(trip.user_type);
    }
    table
}

/// Ride counts per weekday, Monday first, including empty weekdays.
pub fn weekday_counts(trips: &[&Trip]) -> Vec<(Weekday, UserTypeCounts)> {
    let by_index = counts_by(trips, |t| t.weekday.num_days_from_monday());
    WEEKDAYS
        .iter()
        .map(|&day| {
            let counts = by_index
                .get(&day.num_days_from_monday())
                .copied()
                .unwrap_or_default();
            (day, counts)
        })
        .collect()
}

/// Every named station at one end of the rides with its count, busiest
/// first and ties broken by name.
pub fn station_counts(trips: &[&Trip], end: StationEnd) -> Vec<StationCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for trip in trips {
        let name = match end {
            StationEnd::Start => trip.start_station_name.as_deref(),
            StationEnd::End => trip.end_station_name.as_deref(),
        };
        if let Some(name) = name {
            *counts.entry(name).or_insert(0) += 1;
        }
    }

    let mut rows: Vec<StationCount> = counts
        .into_iter()
        .map(|(station, rides)| StationCount {
            station: station.to_string(),
            rides,
        })
        .collect();
    rows.sort_by(|a, b| b.rides.cmp(&a.rides).then_with(|| a.station.cmp(&b.station)));
    rows
}

/// The `limit` busiest stations at one end of the rides.
pub fn top_stations(trips: &[&Trip], end: StationEnd, limit: usize) -> Vec<StationCount> {
    let mut rows = station_counts(trips, end);
    rows.truncate(limit);
    rows
}

/// The analysis tables of a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisTables {
    /// Rides per start hour.
    pub hourly_usage: BTreeMap<u32, UserTypeCounts>,
    /// Rides per start date.
    pub daily_usage: BTreeMap<NaiveDate, UserTypeCounts>,
    /// Rides per weekday, Monday first.
    pub weekday_usage: Vec<(Weekday, UserTypeCounts)>,
    /// Busiest start stations.
    pub top_start_stations: Vec<StationCount>,
    /// Busiest end stations.
    pub top_end_stations: Vec<StationCount>,
    /// Rides per bike type.
    pub bike_type_usage: BTreeMap<BikeType, UserTypeCounts>,
    /// Ride duration statistics per user type.
    pub duration_stats: BTreeMap<UserType, DurationStats>,
}

impl AnalysisTables {
    /// Builds every table for `trips`.
    pub fn from_trips(trips: &[&Trip]) -> Self {
        Self {
            hourly_usage: counts_by(trips, |t| t.hour),
            daily_usage: counts_by(trips, |t| t.date),
            weekday_usage: weekday_counts(trips),
            top_start_stations: top_stations(trips, StationEnd::Start, TOP_STATION_ROWS),
            top_end_stations: top_stations(trips, StationEnd::End, TOP_STATION_ROWS),
            bike_type_usage: counts_by(trips, |t| t.bike_type),
            duration_stats: DurationStats::by_user_type(trips),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{read_trips, LoadOptions};
    use bikeshare_common::test_utils::trip_csv;
    use std::path::Path;

    fn tables(count: usize, members: usize) -> (crate::Dataset, AnalysisTables) {
        let text = trip_csv::document(&trip_csv::generate_rows(count, members));
        let dataset = read_trips(text.as_bytes(), Path::new("t.csv"), &LoadOptions::default()).expect("load");
        let tables = AnalysisTables::from_trips(&dataset.view());
        (dataset, tables)
    }

    #[test]
    fn test_counts_add_up() {
        let (dataset, tables) = tables(40, 15);
        let hourly: usize = tables.hourly_usage.values().map(UserTypeCounts::total).sum();
        let daily: usize = tables.daily_usage.values().map(UserTypeCounts::total).sum();
        let weekday: usize = tables.weekday_usage.iter().map(|(_, c)| c.total()).sum();
        let members: usize = tables.bike_type_usage.values().map(|c| c.member).sum();

        assert_eq!(hourly, dataset.len());
        assert_eq!(daily, dataset.len());
        assert_eq!(weekday, dataset.len());
        assert_eq!(members, 15);
        assert_eq!(tables.weekday_usage[0].0, Weekday::Mon);
        assert_eq!(tables.weekday_usage.len(), 7);
    }

    #[test]
    fn test_station_ranking() {
        let (dataset, tables) = tables(10, 5);
        // Rows cycle through four stations, so starts split 3/3/2/2.
        assert_eq!(tables.top_start_stations.len(), 4);
        assert_eq!(tables.top_start_stations[0].rides, 3);
        assert!(tables
            .top_start_stations
            .windows(2)
            .all(|w| w[0].rides >= w[1].rides));

        let top_two = top_stations(&dataset.view(), StationEnd::End, 2);
        assert_eq!(top_two.len(), 2);
    }

    #[test]
    fn test_empty_view() {
        let tables = AnalysisTables::from_trips(&[]);
        assert!(tables.hourly_usage.is_empty());
        assert!(tables.top_start_stations.is_empty());
        assert_eq!(tables.weekday_usage.len(), 7);
        assert!(tables.weekday_usage.iter().all(|(_, c)| c.total() == 0));
    }
}
