//! Filter predicates over a dataset.
//!
//! Every dimension is optional. `None` leaves the dimension unrestricted,
//! `Some(set)` keeps trips whose value is in the set, so an empty set keeps
//! nothing. Dimensions combine with logical AND.

use crate::trip::{Dataset, Trip};
use bikeshare_common::{BikeType, TimeOfDay, UserType};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Display;

/// Selection applied to a dataset before aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TripFilter {
    /// Inclusive range on the start date.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Allowed user types.
    pub user_types: Option<BTreeSet<UserType>>,
    /// Allowed bike types.
    pub bike_types: Option<BTreeSet<BikeType>>,
    /// Allowed time-of-day buckets.
    pub times_of_day: Option<BTreeSet<TimeOfDay>>,
}

impl TripFilter {
    /// A filter that keeps every trip.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts start dates to `start..=end`.
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start, end));
        self
    }

    /// Restricts user types.
    pub fn with_user_types(mut self, user_types: impl IntoIterator<Item = UserType>) -> Self {
        self.user_types = Some(user_types.into_iter().collect());
        self
    }

    /// Restricts bike types.
    pub fn with_bike_types(mut self, bike_types: impl IntoIterator<Item = BikeType>) -> Self {
        self.bike_types = Some(bike_types.into_iter().collect());
        self
    }

    /// Restricts time-of-day buckets.
    pub fn with_times_of_day(mut self, buckets: impl IntoIterator<Item = TimeOfDay>) -> Self {
        self.times_of_day = Some(buckets.into_iter().collect());
        self
    }

    /// True when no dimension is restricted.
    pub fn is_unrestricted(&self) -> bool {
        self.date_range.is_none()
            && self.user_types.is_none()
            && self.bike_types.is_none()
            && self.times_of_day.is_none()
    }

    /// Whether a single trip passes every dimension.
    pub fn matches(&self, trip: &Trip) -> bool {
        let in_dates = self
            .date_range
            .map_or(true, |(start, end)| start <= trip.date && trip.date <= end);

        in_dates
            && allowed(&self.user_types, &trip.user_type)
            && allowed(&self.bike_types, &trip.bike_type)
            && allowed(&self.times_of_day, &trip.time_of_day)
    }

    /// The trips of `dataset` that pass the filter, in dataset order.
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a Trip> {
        self.apply_to(dataset.iter())
    }

    /// The trips of `trips` that pass the filter, in input order.
    pub fn apply_to<'a>(&self, trips: impl IntoIterator<Item = &'a Trip>) -> Vec<&'a Trip> {
        trips.into_iter().filter(|trip| self.matches(trip)).collect()
    }

    /// One-line description for reports and logs.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some((start, end)) = self.date_range {
            parts.push(format!("dates {start} to {end}"));
        }
        if let Some(set) = &self.user_types {
            parts.push(format!("user types [{}]", join(set)));
        }
        if let Some(set) = &self.bike_types {
            parts.push(format!("bike types [{}]", join(set)));
        }
        if let Some(set) = &self.times_of_day {
            parts.push(format!("time of day [{}]", join(set)));
        }

        if parts.is_empty() {
            "all trips".to_string()
        } else {
            parts.join("; ")
        }
    }
}

fn allowed<T: Ord>(set: &Option<BTreeSet<T>>, value: &T) -> bool {
    set.as_ref().map_or(true, |set| set.contains(value))
}

fn join<T: Display>(set: &BTreeSet<T>) -> String {
    set.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{read_trips, LoadOptions};
    use bikeshare_common::test_utils::trip_csv;
    use std::path::Path;

    fn dataset(count: usize, members: usize) -> Dataset {
        let text = trip_csv::document(&trip_csv::generate_rows(count, members));
        read_trips(text.as_bytes(), Path::new("trips.csv"), &LoadOptions::default()).expect("load")
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, day).unwrap()
    }

    #[test]
    fn test_member_filter_selects_forty_of_hundred() {
        let dataset = dataset(100, 40);
        let view = TripFilter::new()
            .with_user_types([UserType::Member])
            .apply(&dataset);

        assert_eq!(view.len(), 40);
        assert!(view.iter().all(|trip| trip.user_type == UserType::Member));
    }

    #[test]
    fn test_unrestricted_filter_keeps_everything_in_order() {
        let dataset = dataset(25, 10);
        let filter = TripFilter::new();
        assert!(filter.is_unrestricted());

        let view = filter.apply(&dataset);
        let expected: Vec<&Trip> = dataset.iter().collect();
        assert_eq!(view, expected);
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        let dataset = dataset(10, 5);
        let view = TripFilter::new()
            .with_bike_types(Vec::<BikeType>::new())
            .apply(&dataset);
        assert!(view.is_empty());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let dataset = dataset(56, 20);
        let view = TripFilter::new()
            .with_date_range(date(3), date(4))
            .apply(&dataset);

        assert!(!view.is_empty());
        assert!(view.iter().all(|t| t.date == date(3) || t.date == date(4)));
        let expected = dataset
            .iter()
            .filter(|t| t.date == date(3) || t.date == date(4))
            .count();
        assert_eq!(view.len(), expected);

        let inverted = TripFilter::new().with_date_range(date(4), date(3));
        assert!(inverted.apply(&dataset).is_empty());
    }

    #[test]
    fn test_time_of_day_is_applied() {
        let dataset = dataset(48, 20);
        let view = TripFilter::new()
            .with_times_of_day([TimeOfDay::EarlyMorning])
            .apply(&dataset);
        assert!(!view.is_empty());
        assert!(view.iter().all(|t| t.hour < 6));
    }

    #[test]
    fn test_dimensions_combine_with_and() {
        let dataset = dataset(60, 30);
        let filter = TripFilter::new()
            .with_user_types([UserType::Casual])
            .with_bike_types([BikeType::ElectricBike]);
        let view = filter.apply(&dataset);
        assert!(view
            .iter()
            .all(|t| t.user_type == UserType::Casual && t.bike_type == BikeType::ElectricBike));
        let expected = dataset
            .iter()
            .filter(|t| t.user_type == UserType::Casual && t.bike_type == BikeType::ElectricBike)
            .count();
        assert_eq!(view.len(), expected);
    }

    #[test]
    fn test_describe() {
        assert_eq!(TripFilter::new().describe(), "all trips");
        let filter = TripFilter::new()
            .with_date_range(date(1), date(7))
            .with_user_types([UserType::Member]);
        assert_eq!(
            filter.describe(),
            "dates 2025-10-01 to 2025-10-07; user types [member]"
        );
    }
}
