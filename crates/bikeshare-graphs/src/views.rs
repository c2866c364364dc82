//! The chart catalogue: which charts exist and how each is built from a
//! filtered trip view.

use crate::aggregator::{self, month_name, WEEKDAY_NAMES};
use crate::charts::{
    BarChart, BoxGroup, BoxPlotChart, HeatmapChart, HistogramChart, HistogramSeries, LineChart, Marker, Orientation,
    PieChart, PieSlice, ScatterChart, ScatterGroup, ScatterPoint, Series,
};
use crate::renderer::{bubble_radius, ChartRenderer, ColorBar};
use crate::types::{palette_color, ChartStyle, ColorScale};
use bikeshare_common::{BikeType, BikeshareError, Result, UserType};
use bikeshare_config::GraphsConfig;
use bikeshare_data::tables::{top_stations, StationEnd, UserTypeCounts};
use bikeshare_data::Trip;
use plotters::coord::Shift;
use plotters::prelude::{DrawingArea, DrawingBackend};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, instrument};

/// Longest ride kept in duration charts, in minutes.
pub const MAX_DURATION_MINUTES: f64 = 120.0;
/// Longest ride kept in distance charts, in km.
pub const MAX_DISTANCE_KM: f64 = 10.0;
/// Bins of the duration histogram.
pub const HISTOGRAM_BINS: usize = 50;
/// Days in the rolling average window.
pub const ROLLING_WINDOW_DAYS: usize = 7;
/// Stations in the popularity density chart.
pub const DENSITY_STATIONS: usize = 50;
/// Stations in the activity bubble chart.
pub const ACTIVITY_STATIONS: usize = 30;
/// Stations in the bubble map.
pub const BUBBLE_MAP_STATIONS: usize = 100;
/// Cells per side of the ride density grid.
pub const DENSITY_GRID_BINS: usize = 40;

/// Dashboard section a chart belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartCategory {
    /// Usage over hours, days and months.
    Time,
    /// Differences between members and casual riders.
    UserBehavior,
    /// Stations and locations.
    Geographic,
    /// Duration, distance and bike choice in detail.
    DeepDive,
}

/// Every chart the dashboard can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Rides per hour of day by user type.
    HourlyUsage,
    /// Rides per date by user type.
    DailyUsage,
    /// Rides per weekday by user type.
    WeekdayUsage,
    /// Rides per month by user type.
    MonthlyUsage,
    /// Seven-day rolling mean of daily rides.
    RollingAverage,
    /// Total rides per user type.
    OverallUsage,
    /// Hour of day against weekday.
    HourWeekdayHeatmap,
    /// User type against hour of day.
    UserHourHeatmap,
    /// Month against weekday.
    MonthWeekdayHeatmap,
    /// Ride duration box plots.
    DurationBox,
    /// Bike types per user type.
    BikeTypePreference,
    /// Rides per time-of-day bucket.
    TimeOfDayUsage,
    /// Ride distance box plots.
    DistanceBox,
    /// Overlaid ride duration histograms.
    DurationHistogram,
    /// User type shares.
    UserTypePie,
    /// Sampled start locations coloured by hour.
    RideLocations,
    /// Busiest start stations sized by rides.
    StationDensity,
    /// Busiest start stations.
    TopStartStations,
    /// Busiest end stations.
    TopEndStations,
    /// Starts against ends per station.
    StationActivity,
    /// Stations sized by rides and coloured by member share.
    StationBubbleMap,
    /// Binned start locations.
    RideDensity,
    /// Sampled rides, distance against duration.
    DurationVsDistance,
    /// Mean duration against mean distance per user type.
    UserAverages,
    /// Dominant bike type per hour and user type.
    TimeUsagePattern,
}

impl ChartKind {
    /// Every chart in dashboard order.
    pub const ALL: [ChartKind; 25] = [
        ChartKind::HourlyUsage,
        ChartKind::DailyUsage,
        ChartKind::WeekdayUsage,
        ChartKind::MonthlyUsage,
        ChartKind::RollingAverage,
        ChartKind::OverallUsage,
        ChartKind::HourWeekdayHeatmap,
        ChartKind::UserHourHeatmap,
        ChartKind::MonthWeekdayHeatmap,
        ChartKind::DurationBox,
        ChartKind::BikeTypePreference,
        ChartKind::TimeOfDayUsage,
        ChartKind::DistanceBox,
        ChartKind::DurationHistogram,
        ChartKind::UserTypePie,
        ChartKind::RideLocations,
        ChartKind::StationDensity,
        ChartKind::TopStartStations,
        ChartKind::TopEndStations,
        ChartKind::StationActivity,
        ChartKind::StationBubbleMap,
        ChartKind::RideDensity,
        ChartKind::DurationVsDistance,
        ChartKind::UserAverages,
        ChartKind::TimeUsagePattern,
    ];

    /// Stable identifier, also the PNG file stem.
    pub const fn id(self) -> &'static str {
        match self {
            ChartKind::HourlyUsage => "hourly_usage",
            ChartKind::DailyUsage => "daily_usage",
            ChartKind::WeekdayUsage => "weekday_usage",
            ChartKind::MonthlyUsage => "monthly_usage",
            ChartKind::RollingAverage => "rolling_average",
            ChartKind::OverallUsage => "overall_usage",
            ChartKind::HourWeekdayHeatmap => "hour_weekday_heatmap",
            ChartKind::UserHourHeatmap => "user_hour_heatmap",
            ChartKind::MonthWeekdayHeatmap => "month_weekday_heatmap",
            ChartKind::DurationBox => "duration_box",
            ChartKind::BikeTypePreference => "bike_type_preference",
            ChartKind::TimeOfDayUsage => "time_of_day_usage",
            ChartKind::DistanceBox => "distance_box",
            ChartKind::DurationHistogram => "duration_histogram",
            ChartKind::UserTypePie => "user_type_pie",
            ChartKind::RideLocations => "ride_locations",
            ChartKind::StationDensity => "station_density",
            ChartKind::TopStartStations => "top_start_stations",
            ChartKind::TopEndStations => "top_end_stations",
            ChartKind::StationActivity => "station_activity",
            ChartKind::StationBubbleMap => "station_bubble_map",
            ChartKind::RideDensity => "ride_density",
            ChartKind::DurationVsDistance => "duration_vs_distance",
            ChartKind::UserAverages => "user_averages",
            ChartKind::TimeUsagePattern => "time_usage_pattern",
        }
    }

    /// Caption of the chart.
    pub const fn title(self) -> &'static str {
        match self {
            ChartKind::HourlyUsage => "Hourly Usage Patterns",
            ChartKind::DailyUsage => "Daily Usage Trends",
            ChartKind::WeekdayUsage => "Usage by Day of Week",
            ChartKind::MonthlyUsage => "Monthly Usage Distribution",
            ChartKind::RollingAverage => "7-Day Rolling Average of Daily Rides",
            ChartKind::OverallUsage => "Overall Usage by User Type",
            ChartKind::HourWeekdayHeatmap => "Ride Frequency: Hour of Day vs Day of Week",
            ChartKind::UserHourHeatmap => "Ride Frequency: User Type vs Hour of Day",
            ChartKind::MonthWeekdayHeatmap => "Ride Frequency: Month vs Day of Week",
            ChartKind::DurationBox => "Ride Duration Distribution by User Type",
            ChartKind::BikeTypePreference => "Bike Type Preference by User Type",
            ChartKind::TimeOfDayUsage => "Usage by Time of Day",
            ChartKind::DistanceBox => "Ride Distance Distribution by User Type",
            ChartKind::DurationHistogram => "Ride Duration Distribution",
            ChartKind::UserTypePie => "User Type Distribution",
            ChartKind::RideLocations => "Ride Locations Colored by Hour",
            ChartKind::StationDensity => "Station Usage Heatmap",
            ChartKind::TopStartStations => "Top 10 Most Popular Start Stations",
            ChartKind::TopEndStations => "Top 10 Most Popular End Stations",
            ChartKind::StationActivity => "Station Activity Bubble Chart",
            ChartKind::StationBubbleMap => "Station Usage Bubble Map",
            ChartKind::RideDensity => "Ride Density Map",
            ChartKind::DurationVsDistance => "Ride Duration vs Distance",
            ChartKind::UserAverages => "Average Ride Duration vs Distance by User Type",
            ChartKind::TimeUsagePattern => "Usage Patterns by Hour, User Type and Bike Type",
        }
    }

    /// Dashboard section.
    pub const fn category(self) -> ChartCategory {
        match self {
            ChartKind::HourlyUsage
            | ChartKind::DailyUsage
            | ChartKind::WeekdayUsage
            | ChartKind::MonthlyUsage
            | ChartKind::RollingAverage
            | ChartKind::OverallUsage
            | ChartKind::HourWeekdayHeatmap
            | ChartKind::UserHourHeatmap
            | ChartKind::MonthWeekdayHeatmap => ChartCategory::Time,
            ChartKind::DurationBox
            | ChartKind::BikeTypePreference
            | ChartKind::TimeOfDayUsage
            | ChartKind::DistanceBox
            | ChartKind::DurationHistogram
            | ChartKind::UserTypePie => ChartCategory::UserBehavior,
            ChartKind::RideLocations
            | ChartKind::StationDensity
            | ChartKind::TopStartStations
            | ChartKind::TopEndStations
            | ChartKind::StationActivity
            | ChartKind::StationBubbleMap
            | ChartKind::RideDensity => ChartCategory::Geographic,
            ChartKind::DurationVsDistance | ChartKind::UserAverages | ChartKind::TimeUsagePattern => {
                ChartCategory::DeepDive
            }
        }
    }

    /// Charts of one section in dashboard order.
    pub fn in_category(category: ChartCategory) -> Vec<ChartKind> {
        Self::ALL.into_iter().filter(|k| k.category() == category).collect()
    }

    /// PNG file name.
    pub fn file_name(self) -> String {
        format!("{}.png", self.id())
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ChartKind {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace('-', "_").to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.id() == wanted)
            .ok_or_else(|| BikeshareError::parse_field(format!("Unknown chart '{s}'"), "chart"))
    }
}

/// Sampling and size limits of the charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// Rides kept in the duration/distance scatter.
    pub scatter_sample_size: usize,
    /// Rides kept in the location map.
    pub map_sample_size: usize,
    /// Seed of the sampling.
    pub random_seed: u64,
    /// Stations in the top station bars.
    pub top_stations: usize,
}

impl From<&GraphsConfig> for ViewOptions {
    fn from(config: &GraphsConfig) -> Self {
        Self {
            scatter_sample_size: config.scatter_sample_size,
            map_sample_size: config.map_sample_size,
            random_seed: config.random_seed,
            top_stations: config.top_stations,
        }
    }
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self::from(&GraphsConfig::default())
    }
}

/// A chart ready to render.
#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    /// Line chart.
    Line(LineChart),
    /// Bar chart.
    Bar(BarChart),
    /// Heatmap.
    Heatmap(HeatmapChart),
    /// Box plots.
    Box(BoxPlotChart),
    /// Histograms.
    Histogram(HistogramChart),
    /// Scatter or bubble chart.
    Scatter(ScatterChart),
    /// Pie chart.
    Pie(PieChart),
}

impl ChartRenderer for Chart {
    fn title(&self) -> &str {
        match self {
            Chart::Line(c) => c.title(),
            Chart::Bar(c) => c.title(),
            Chart::Heatmap(c) => c.title(),
            Chart::Box(c) => c.title(),
            Chart::Histogram(c) => c.title(),
            Chart::Scatter(c) => c.title(),
            Chart::Pie(c) => c.title(),
        }
    }

    fn has_data(&self) -> bool {
        match self {
            Chart::Line(c) => c.has_data(),
            Chart::Bar(c) => c.has_data(),
            Chart::Heatmap(c) => c.has_data(),
            Chart::Box(c) => c.has_data(),
            Chart::Histogram(c) => c.has_data(),
            Chart::Scatter(c) => c.has_data(),
            Chart::Pie(c) => c.has_data(),
        }
    }

    fn draw_chart<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, style: &ChartStyle) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        match self {
            Chart::Line(c) => c.draw_chart(root, style),
            Chart::Bar(c) => c.draw_chart(root, style),
            Chart::Heatmap(c) => c.draw_chart(root, style),
            Chart::Box(c) => c.draw_chart(root, style),
            Chart::Histogram(c) => c.draw_chart(root, style),
            Chart::Scatter(c) => c.draw_chart(root, style),
            Chart::Pie(c) => c.draw_chart(root, style),
        }
    }
}

fn user_series(style: &ChartStyle, counts: &[UserTypeCounts]) -> Vec<Series> {
    UserType::ALL
        .iter()
        .map(|&user| {
            Series::new(
                user.as_str(),
                style.user_color(user),
                counts.iter().map(|c| c.get(user) as f64).collect(),
            )
        })
        .collect()
}

fn line(kind: ChartKind, x_desc: &str, x_labels: Vec<String>, series: Vec<Series>) -> Chart {
    Chart::Line(LineChart {
        title: kind.title().to_string(),
        x_desc: x_desc.to_string(),
        y_desc: "Number of Rides".to_string(),
        x_labels,
        series,
    })
}

fn grouped_bars(kind: ChartKind, category_desc: &str, categories: Vec<String>, series: Vec<Series>) -> Chart {
    Chart::Bar(BarChart {
        title: kind.title().to_string(),
        category_desc: category_desc.to_string(),
        value_desc: "Number of Rides".to_string(),
        categories,
        series,
        orientation: Orientation::Vertical,
        show_values: false,
    })
}

fn heatmap(kind: ChartKind, x_desc: &str, y_desc: &str, grid: aggregator::Grid, scale: ColorScale) -> Chart {
    Chart::Heatmap(HeatmapChart {
        title: kind.title().to_string(),
        x_desc: x_desc.to_string(),
        y_desc: y_desc.to_string(),
        grid,
        scale,
        value_desc: "Number of Rides".to_string(),
        annotate: true,
    })
}

fn boxes(kind: ChartKind, y_desc: &str, style: &ChartStyle, summaries: Vec<(UserType, aggregator::BoxSummary)>) -> Chart {
    Chart::Box(BoxPlotChart {
        title: kind.title().to_string(),
        x_desc: "User Type".to_string(),
        y_desc: y_desc.to_string(),
        groups: summaries
            .into_iter()
            .map(|(user, summary)| BoxGroup {
                name: user.to_string(),
                color: style.user_color(user),
                summary,
            })
            .collect(),
    })
}

fn station_bars(kind: ChartKind, trips: &[&Trip], end: StationEnd, limit: usize) -> Chart {
    let rows = top_stations(trips, end, limit);
    let color = match end {
        StationEnd::Start => palette_color(0),
        StationEnd::End => palette_color(2),
    };
    Chart::Bar(BarChart {
        title: kind.title().replace("10", &limit.to_string()),
        category_desc: "Station Name".to_string(),
        value_desc: "Number of Rides".to_string(),
        categories: rows.iter().map(|r| r.station.clone()).collect(),
        series: vec![Series::new(
            "rides",
            color,
            rows.iter().map(|r| r.rides as f64).collect(),
        )],
        orientation: Orientation::Horizontal,
        show_values: true,
    })
}

fn map_chart(kind: ChartKind) -> ScatterChart {
    ScatterChart::new(kind.title(), "Longitude", "Latitude")
}

impl ChartKind {
    /// Aggregates `trips` into this chart.
    #[instrument(skip(self, trips, style, options), fields(chart = self.id(), trips = trips.len()))]
    pub fn build(self, trips: &[&Trip], style: &ChartStyle, options: &ViewOptions) -> Chart {
        debug!("Building chart");
        match self {
            ChartKind::HourlyUsage => {
                let hours = aggregator::hourly_counts(trips);
                let labels = (0..24).map(|h| h.to_string()).collect();
                let series = if trips.is_empty() {
                    Vec::new()
                } else {
                    user_series(style, &hours)
                };
                line(self, "Hour of Day", labels, series)
            }
            ChartKind::DailyUsage => {
                let daily = aggregator::daily_counts(trips);
                let labels = daily.keys().map(|d| d.format("%m-%d").to_string()).collect();
                let counts: Vec<UserTypeCounts> = daily.values().copied().collect();
                line(self, "Date", labels, user_series(style, &counts))
            }
            ChartKind::WeekdayUsage => {
                let counts: Vec<UserTypeCounts> = bikeshare_data::tables::weekday_counts(trips)
                    .into_iter()
                    .map(|(_, c)| c)
                    .collect();
                let labels = WEEKDAY_NAMES.iter().map(|d| d.to_string()).collect();
                grouped_bars(self, "Day of Week", labels, user_series(style, &counts))
            }
            ChartKind::MonthlyUsage => {
                let monthly = aggregator::monthly_counts(trips);
                let labels = monthly.keys().map(|&m| month_name(m).to_string()).collect();
                let counts: Vec<UserTypeCounts> = monthly.values().copied().collect();
                grouped_bars(self, "Month", labels, user_series(style, &counts))
            }
            ChartKind::RollingAverage => {
                let points = aggregator::rolling_average(&aggregator::daily_counts(trips), ROLLING_WINDOW_DAYS);
                let labels = points.iter().map(|p| p.date.format("%m-%d").to_string()).collect();
                let series = UserType::ALL
                    .iter()
                    .map(|&user| {
                        Series::new(
                            user.as_str(),
                            style.user_color(user),
                            points.iter().map(|p| p.get(user)).collect(),
                        )
                    })
                    .collect();
                line(self, "Date", labels, series)
            }
            ChartKind::OverallUsage => {
                let counts = aggregator::overall_counts(trips);
                let mut chart = grouped_bars(
                    self,
                    "User Type",
                    UserType::ALL.iter().map(|u| u.to_string()).collect(),
                    vec![Series::new(
                        "rides",
                        palette_color(0),
                        UserType::ALL.iter().map(|&u| counts.get(u) as f64).collect(),
                    )],
                );
                if let Chart::Bar(bar) = &mut chart {
                    bar.show_values = true;
                }
                chart
            }
            ChartKind::HourWeekdayHeatmap => heatmap(
                self,
                "Day of Week",
                "Hour of Day",
                aggregator::hour_weekday_grid(trips),
                ColorScale::Viridis,
            ),
            ChartKind::UserHourHeatmap => heatmap(
                self,
                "Hour of Day",
                "User Type",
                aggregator::user_hour_grid(trips),
                ColorScale::Plasma,
            ),
            ChartKind::MonthWeekdayHeatmap => heatmap(
                self,
                "Day of Week",
                "Month",
                aggregator::month_weekday_grid(trips),
                ColorScale::Blues,
            ),
            ChartKind::DurationBox => boxes(
                self,
                "Ride Duration (minutes)",
                style,
                aggregator::duration_boxes(trips, MAX_DURATION_MINUTES),
            ),
            ChartKind::DistanceBox => boxes(
                self,
                "Distance (km)",
                style,
                aggregator::distance_boxes(trips, MAX_DISTANCE_KM),
            ),
            ChartKind::BikeTypePreference => {
                let table = aggregator::bike_type_counts(trips);
                let labels = table.keys().map(|b| b.to_string()).collect();
                let counts: Vec<UserTypeCounts> = table.values().copied().collect();
                grouped_bars(self, "Bike Type", labels, user_series(style, &counts))
            }
            ChartKind::TimeOfDayUsage => {
                let buckets = aggregator::time_of_day_counts(trips);
                let labels = buckets.iter().map(|(b, _)| b.label().to_string()).collect();
                let counts: Vec<UserTypeCounts> = buckets.iter().map(|(_, c)| *c).collect();
                let series = if trips.is_empty() {
                    Vec::new()
                } else {
                    user_series(style, &counts)
                };
                grouped_bars(self, "Time of Day", labels, series)
            }
            ChartKind::DurationHistogram => Chart::Histogram(HistogramChart {
                title: self.title().to_string(),
                x_desc: "Ride Duration (minutes)".to_string(),
                y_desc: "Number of Rides".to_string(),
                series: aggregator::duration_histograms(trips, MAX_DURATION_MINUTES, HISTOGRAM_BINS)
                    .into_iter()
                    .map(|(user, histogram)| HistogramSeries {
                        name: user.to_string(),
                        color: style.user_color(user),
                        histogram,
                    })
                    .collect(),
            }),
            ChartKind::UserTypePie => {
                let counts = aggregator::overall_counts(trips);
                Chart::Pie(PieChart {
                    title: self.title().to_string(),
                    slices: UserType::ALL
                        .iter()
                        .filter(|&&u| counts.get(u) > 0)
                        .map(|&u| PieSlice {
                            label: u.to_string(),
                            value: counts.get(u) as f64,
                            color: style.user_color(u),
                        })
                        .collect(),
                })
            }
            ChartKind::RideLocations => {
                let locations = aggregator::ride_locations(trips, options.map_sample_size, options.random_seed);
                let mut chart = map_chart(self);
                chart.opacity = 0.6;
                chart.groups.push(ScatterGroup::unnamed(
                    locations
                        .iter()
                        .map(|p| ScatterPoint::new(p.lng, p.lat, 2, ColorScale::Viridis.map(f64::from(p.hour), 0.0, 23.0)))
                        .collect(),
                ));
                chart.color_bar = Some(ColorBar {
                    label: "Hour of Day".to_string(),
                    scale: ColorScale::Viridis,
                    min: 0.0,
                    max: 23.0,
                });
                Chart::Scatter(chart)
            }
            ChartKind::StationDensity => {
                let stations = aggregator::station_points(trips, DENSITY_STATIONS);
                let max = stations.first().map_or(0.0, |s| s.rides as f64);
                let mut chart = map_chart(self);
                chart.groups.push(ScatterGroup::unnamed(
                    stations
                        .iter()
                        .map(|s| {
                            let rides = s.rides as f64;
                            ScatterPoint::new(s.lng, s.lat, bubble_radius(rides, max, 20.0), ColorScale::Viridis.map(rides, 0.0, max))
                        })
                        .collect(),
                ));
                chart.color_bar = Some(ColorBar {
                    label: "Number of Rides".to_string(),
                    scale: ColorScale::Viridis,
                    min: 0.0,
                    max,
                });
                Chart::Scatter(chart)
            }
            ChartKind::TopStartStations => station_bars(self, trips, StationEnd::Start, options.top_stations),
            ChartKind::TopEndStations => station_bars(self, trips, StationEnd::End, options.top_stations),
            ChartKind::StationActivity => {
                let rows = aggregator::station_activity(trips, ACTIVITY_STATIONS);
                let max_total = rows.first().map_or(0.0, |r| r.total as f64);
                let max_flow = rows.iter().map(|r| r.net_flow.unsigned_abs()).max().unwrap_or(0) as f64;
                let flow_bound = max_flow.max(1.0);

                let mut chart = ScatterChart::new(self.title(), "Number of Rides Started", "Number of Rides Ended");
                chart.groups.push(ScatterGroup::unnamed(
                    rows.iter()
                        .map(|r| {
                            ScatterPoint::new(
                                r.starts as f64,
                                r.ends as f64,
                                bubble_radius(r.total as f64, max_total, 30.0),
                                ColorScale::RdBu.map(r.net_flow as f64, -flow_bound, flow_bound),
                            )
                        })
                        .collect(),
                ));
                chart.balance_line = true;
                chart.opacity = 0.7;
                chart.color_bar = Some(ColorBar {
                    label: "Net Flow (Start - End)".to_string(),
                    scale: ColorScale::RdBu,
                    min: -flow_bound,
                    max: flow_bound,
                });
                Chart::Scatter(chart)
            }
            ChartKind::StationBubbleMap => {
                let stations = aggregator::station_points(trips, BUBBLE_MAP_STATIONS);
                let max = stations.first().map_or(0.0, |s| s.rides as f64);
                let mut chart = map_chart(self);
                chart.opacity = 0.7;
                chart.groups.push(ScatterGroup::unnamed(
                    stations
                        .iter()
                        .map(|s| {
                            ScatterPoint::new(
                                s.lng,
                                s.lat,
                                bubble_radius(s.rides as f64, max, 15.0),
                                ColorScale::Viridis.at(s.member_ratio),
                            )
                        })
                        .collect(),
                ));
                chart.color_bar = Some(ColorBar {
                    label: "Member Ratio".to_string(),
                    scale: ColorScale::Viridis,
                    min: 0.0,
                    max: 1.0,
                });
                Chart::Scatter(chart)
            }
            ChartKind::RideDensity => {
                let cells = aggregator::density_grid(trips, DENSITY_GRID_BINS);
                let max = cells.iter().map(|c| c.rides).max().unwrap_or(0) as f64;
                let mut chart = map_chart(self);
                chart.opacity = 0.9;
                chart.groups.push(ScatterGroup::unnamed(
                    cells
                        .iter()
                        .map(|c| ScatterPoint::new(c.lng, c.lat, 5, ColorScale::Plasma.map(c.rides as f64, 0.0, max)))
                        .collect(),
                ));
                chart.color_bar = Some(ColorBar {
                    label: "Number of Rides".to_string(),
                    scale: ColorScale::Plasma,
                    min: 0.0,
                    max,
                });
                Chart::Scatter(chart)
            }
            ChartKind::DurationVsDistance => {
                let points = aggregator::duration_distance_points(
                    trips,
                    MAX_DURATION_MINUTES,
                    MAX_DISTANCE_KM,
                    options.scatter_sample_size,
                    options.random_seed,
                );
                let mut chart = ScatterChart::new(self.title(), "Distance (km)", "Ride Duration (minutes)");
                chart.opacity = 0.6;
                for user in UserType::ALL {
                    let color = style.user_color(user);
                    chart.groups.push(ScatterGroup {
                        name: Some(user.to_string()),
                        color,
                        marker: Marker::Circle,
                        points: points
                            .iter()
                            .filter(|p| p.user_type == user)
                            .map(|p| ScatterPoint::new(p.distance_km, p.duration_minutes, 3, color))
                            .collect(),
                    });
                }
                chart.groups.retain(|g| !g.points.is_empty());
                Chart::Scatter(chart)
            }
            ChartKind::UserAverages => {
                let points = aggregator::duration_distance_points(
                    trips,
                    MAX_DURATION_MINUTES,
                    MAX_DISTANCE_KM,
                    options.scatter_sample_size,
                    options.random_seed,
                );
                let averages = aggregator::user_averages(&points);
                let max = averages.iter().map(|a| a.rides).max().unwrap_or(0) as f64;
                let mut chart = ScatterChart::new(self.title(), "Average Distance (km)", "Average Duration (minutes)");
                for avg in &averages {
                    let color = style.user_color(avg.user_type);
                    chart.groups.push(ScatterGroup {
                        name: Some(avg.user_type.to_string()),
                        color,
                        marker: Marker::Circle,
                        points: vec![ScatterPoint::new(
                            avg.avg_distance,
                            avg.avg_duration,
                            bubble_radius(avg.rides as f64, max, 20.0),
                            color,
                        )
                        .with_label(format!("{:.1} km/h", avg.speed_kmh))],
                    });
                }
                Chart::Scatter(chart)
            }
            ChartKind::TimeUsagePattern => {
                let patterns = aggregator::dominant_bike_types(trips);
                let max = patterns.iter().map(|p| p.rides).max().unwrap_or(0) as f64;
                let mut chart = ScatterChart::new(self.title(), "Hour of Day", "Number of Rides");
                chart.x_range = Some(-1.0..24.0);
                chart.opacity = 0.7;
                for user in UserType::ALL {
                    for bike in BikeType::ALL {
                        let color = style.user_color(user);
                        let points: Vec<ScatterPoint> = patterns
                            .iter()
                            .filter(|p| p.user_type == user && p.bike_type == bike)
                            .map(|p| {
                                ScatterPoint::new(
                                    f64::from(p.hour),
                                    p.rides as f64,
                                    bubble_radius(p.rides as f64, max, 15.0),
                                    color,
                                )
                            })
                            .collect();
                        if !points.is_empty() {
                            chart.groups.push(ScatterGroup {
                                name: Some(format!("{user}, {bike}")),
                                color,
                                marker: bike_marker(bike),
                                points,
                            });
                        }
                    }
                }
                Chart::Scatter(chart)
            }
        }
    }

    /// Builds this chart and writes it as `<dir>/<id>.png`.
    pub fn render_to_dir(self, trips: &[&Trip], style: &ChartStyle, options: &ViewOptions, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        self.build(trips, style, options).render_to_file(style, &path)?;
        Ok(path)
    }

    /// Builds this chart and encodes it as PNG bytes.
    pub fn render_to_bytes(self, trips: &[&Trip], style: &ChartStyle, options: &ViewOptions) -> Result<Vec<u8>> {
        self.build(trips, style, options).render_to_bytes(style)
    }
}

/// Marker shape of a bike type.
pub fn bike_marker(bike: BikeType) -> Marker {
    match bike {
        BikeType::ClassicBike => Marker::Circle,
        BikeType::ElectricBike => Marker::Triangle,
        BikeType::DockedBike | BikeType::ElectricScooter => Marker::Cross,
    }
}
