//! Property tests for the filter layer

use bikeshare_common::test_utils::property_testing::{
    bike_type_strategy, time_of_day_strategy, user_type_strategy,
};
use bikeshare_common::test_utils::trip_csv;
use bikeshare_data::{read_trips, Dataset, LoadOptions, Trip, TripFilter};
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

static DATASET: LazyLock<Dataset> = LazyLock::new(|| {
    let text = trip_csv::document(&trip_csv::generate_rows(120, 50));
    read_trips(text.as_bytes(), Path::new("fixture.csv"), &LoadOptions::default())
        .expect("fixture loads")
});

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, d).expect("valid day")
}

fn filter_strategy() -> impl Strategy<Value = TripFilter> {
    (
        prop::option::of((1u32..=28, 0u32..10)),
        prop::option::of(prop::collection::btree_set(user_type_strategy(), 0..=2)),
        prop::option::of(prop::collection::btree_set(bike_type_strategy(), 0..=4)),
        prop::option::of(prop::collection::btree_set(time_of_day_strategy(), 0..=4)),
    )
        .prop_map(|(dates, user_types, bike_types, times_of_day)| TripFilter {
            date_range: dates.map(|(start, span)| (day(start), day((start + span).min(28)))),
            user_types,
            bike_types,
            times_of_day,
        })
}

/// Restricts an optional set to at most `value`.
fn narrow_set<T: Ord + Copy>(current: &Option<BTreeSet<T>>, value: T) -> BTreeSet<T> {
    match current {
        Some(set) => set.iter().copied().filter(|v| *v == value).collect(),
        None => [value].into_iter().collect(),
    }
}

fn assert_narrower(base: &TripFilter, narrowed: &TripFilter) -> Result<(), TestCaseError> {
    let base_view = base.apply(&DATASET);
    let narrowed_view = narrowed.apply(&DATASET);
    prop_assert!(narrowed_view.len() <= base_view.len());
    prop_assert!(narrowed_view
        .iter()
        .all(|trip| base_view.iter().any(|kept| std::ptr::eq(*kept, *trip))));
    Ok(())
}

fn is_subsequence(view: &[&Trip], dataset: &Dataset) -> bool {
    let mut remaining = dataset.iter();
    view.iter()
        .all(|wanted| remaining.any(|trip| std::ptr::eq(trip, *wanted)))
}

proptest! {
    #[test]
    fn filtered_view_is_ordered_subset(filter in filter_strategy()) {
        let view = filter.apply(&DATASET);
        prop_assert!(view.len() <= DATASET.len());
        prop_assert!(is_subsequence(&view, &DATASET));
        prop_assert!(view.iter().all(|trip| filter.matches(trip)));
    }

    #[test]
    fn narrowing_user_type_never_grows_result(filter in filter_strategy(), user in user_type_strategy()) {
        let mut narrowed = filter.clone();
        narrowed.user_types = Some(narrow_set(&filter.user_types, user));
        assert_narrower(&filter, &narrowed)?;
    }

    #[test]
    fn narrowing_bike_type_never_grows_result(filter in filter_strategy(), bike in bike_type_strategy()) {
        let mut narrowed = filter.clone();
        narrowed.bike_types = Some(narrow_set(&filter.bike_types, bike));
        assert_narrower(&filter, &narrowed)?;
    }

    #[test]
    fn narrowing_time_of_day_never_grows_result(filter in filter_strategy(), bucket in time_of_day_strategy()) {
        let mut narrowed = filter.clone();
        narrowed.times_of_day = Some(narrow_set(&filter.times_of_day, bucket));
        assert_narrower(&filter, &narrowed)?;
    }

    #[test]
    fn narrowing_date_range_never_grows_result(
        filter in filter_strategy(),
        start in 1u32..=28,
        span in 0u32..10,
        trim_start in 0i64..5,
        trim_end in 0i64..5,
    ) {
        let mut narrowed = filter.clone();
        narrowed.date_range = Some(match filter.date_range {
            Some((from, to)) => (from + Duration::days(trim_start), to - Duration::days(trim_end)),
            None => (day(start), day((start + span).min(28))),
        });
        assert_narrower(&filter, &narrowed)?;
    }

    #[test]
    fn filtering_is_idempotent(filter in filter_strategy()) {
        let once = filter.apply(&DATASET);
        let twice = filter.apply_to(once.iter().copied());
        prop_assert_eq!(once, twice);
    }
}

#[test]
fn unrestricted_filter_returns_dataset_in_order() {
    let view = TripFilter::new().apply(&DATASET);
    assert_eq!(view.len(), DATASET.len());
    assert!(view.iter().zip(DATASET.iter()).all(|(a, b)| std::ptr::eq(*a, b)));
}
