//! Integration tests for the chart catalogue.
//!
//! Rendering goes through plotters' `ttf` backend and needs a system font.

use bikeshare_common::test_utils::{init_test_logging, trip_csv};
use bikeshare_common::UserType;
use bikeshare_data::{read_trips, Dataset, LoadOptions, TripFilter};
use bikeshare_graphs::{Chart, ChartCategory, ChartKind, ChartRenderer, ChartStyle, ViewOptions};
use std::path::Path;

fn fixture(count: usize, members: usize) -> Dataset {
    let text = trip_csv::document(&trip_csv::generate_rows(count, members));
    read_trips(text.as_bytes(), Path::new("fixture.csv"), &LoadOptions::default()).expect("fixture loads")
}

#[test]
fn test_member_only_view_has_no_casual_series_data() {
    init_test_logging();
    let dataset = fixture(90, 30);
    let members = TripFilter::new().with_user_types([UserType::Member]).apply(&dataset);
    assert_eq!(members.len(), 30);

    let chart = ChartKind::HourlyUsage.build(&members, &ChartStyle::default(), &ViewOptions::default());
    let Chart::Line(line) = chart else {
        panic!("hourly usage should be a line chart");
    };
    let casual = line
        .series
        .iter()
        .find(|s| s.name == "casual")
        .expect("casual series");
    assert!(casual.values.iter().all(|v| *v == 0.0));
    let member_total: f64 = line
        .series
        .iter()
        .find(|s| s.name == "member")
        .expect("member series")
        .values
        .iter()
        .sum();
    assert_eq!(member_total, 30.0);
}

#[test]
fn test_pie_drops_absent_user_type() {
    let dataset = fixture(40, 40);
    let chart = ChartKind::UserTypePie.build(&dataset.view(), &ChartStyle::default(), &ViewOptions::default());
    let Chart::Pie(pie) = chart else {
        panic!("user type share should be a pie chart");
    };
    assert_eq!(pie.slices.len(), 1);
    assert_eq!(pie.slices[0].label, "member");
}

#[test]
fn test_pages_cover_the_catalogue_once() {
    let mut seen: Vec<ChartKind> = [
        ChartCategory::Time,
        ChartCategory::UserBehavior,
        ChartCategory::Geographic,
        ChartCategory::DeepDive,
    ]
    .into_iter()
    .flat_map(ChartKind::in_category)
    .collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), ChartKind::ALL.len());
}

#[test]
fn test_render_every_chart_to_directory() {
    init_test_logging();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let dataset = fixture(150, 60);
    let view = dataset.view();
    let style = ChartStyle::default();
    let options = ViewOptions::default();

    for kind in ChartKind::ALL {
        let path = kind
            .render_to_dir(&view, &style, &options, dir.path())
            .expect("chart renders");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some(kind.file_name().as_str()));
        let metadata = std::fs::metadata(&path).expect("file exists");
        assert!(metadata.len() > 0);
    }
}

#[test]
fn test_empty_view_renders_placeholder() {
    let style = ChartStyle::default();
    for kind in ChartKind::ALL {
        let bytes = kind
            .render_to_bytes(&[], &style, &ViewOptions::default())
            .expect("placeholder renders");
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}

#[test]
fn test_built_chart_renders_to_bytes() {
    let dataset = fixture(60, 20);
    let chart = ChartKind::StationActivity.build(&dataset.view(), &ChartStyle::default(), &ViewOptions::default());
    assert!(chart.has_data());
    let png = chart.render_to_bytes(&ChartStyle::default()).expect("renders");
    assert!(png.len() > 8);
}
