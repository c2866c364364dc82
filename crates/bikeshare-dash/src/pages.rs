//! Dashboard pages: which charts and metrics each shows, and its narrative.

use bikeshare_common::format_count;
use bikeshare_data::{DataQuality, DurationStats, Kpis, Trip};
use bikeshare_graphs::{ChartCategory, ChartKind};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// A dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    /// KPIs and data quality.
    ExecutiveSummary,
    /// Usage over time.
    TimeAnalysis,
    /// Members against casual riders.
    UserBehavior,
    /// Stations and locations.
    GeographicInsights,
    /// Duration, distance and bike choice.
    DeepDives,
    /// Findings and recommendations.
    Conclusions,
}

/// One headline number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    /// What is measured.
    pub label: String,
    /// Formatted value.
    pub value: String,
    /// Formatted share or change shown next to the value.
    pub delta: Option<String>,
}

impl Metric {
    fn new(label: &str, value: String) -> Self {
        Self {
            label: label.to_string(),
            value,
            delta: None,
        }
    }

    fn with_delta(mut self, delta: String) -> Self {
        self.delta = Some(delta);
        self
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)?;
        if let Some(delta) = &self.delta {
            write!(f, " ({delta})")?;
        }
        Ok(())
    }
}

impl Page {
    /// Every page in navigation order.
    pub const ALL: [Page; 6] = [
        Page::ExecutiveSummary,
        Page::TimeAnalysis,
        Page::UserBehavior,
        Page::GeographicInsights,
        Page::DeepDives,
        Page::Conclusions,
    ];

    /// Identifier used on the command line and in file names.
    pub const fn id(self) -> &'static str {
        match self {
            Page::ExecutiveSummary => "executive-summary",
            Page::TimeAnalysis => "time-analysis",
            Page::UserBehavior => "user-behavior",
            Page::GeographicInsights => "geographic-insights",
            Page::DeepDives => "deep-dives",
            Page::Conclusions => "conclusions",
        }
    }

    /// Page heading.
    pub const fn title(self) -> &'static str {
        match self {
            Page::ExecutiveSummary => "Executive Summary",
            Page::TimeAnalysis => "Time-Based Analysis",
            Page::UserBehavior => "User Behavior Analysis",
            Page::GeographicInsights => "Geographic Insights",
            Page::DeepDives => "Deep Dive Analysis",
            Page::Conclusions => "Conclusions & Recommendations",
        }
    }

    /// Chart section shown on the page, if any.
    pub const fn category(self) -> Option<ChartCategory> {
        match self {
            Page::TimeAnalysis => Some(ChartCategory::Time),
            Page::UserBehavior => Some(ChartCategory::UserBehavior),
            Page::GeographicInsights => Some(ChartCategory::Geographic),
            Page::DeepDives => Some(ChartCategory::DeepDive),
            Page::ExecutiveSummary | Page::Conclusions => None,
        }
    }

    /// Charts on the page, in display order.
    pub fn charts(self) -> Vec<ChartKind> {
        self.category().map(ChartKind::in_category).unwrap_or_default()
    }

    /// Headline numbers of the page for `trips`.
    pub fn metrics(self, trips: &[&Trip]) -> Vec<Metric> {
        match self {
            Page::ExecutiveSummary => {
                let kpis = Kpis::from_trips(trips);
                let quality = DataQuality::from_trips(trips);
                let mut metrics = kpi_metrics(&kpis);
                metrics.extend([
                    Metric::new("Missing Start Stations", format_count(quality.missing_start_stations))
                        .with_delta(format!("{:.1}%", quality.missing_start_pct)),
                    Metric::new("Missing End Stations", format_count(quality.missing_end_stations))
                        .with_delta(format!("{:.1}%", quality.missing_end_pct)),
                    Metric::new("Total Records", format_count(quality.total_records)),
                ]);
                metrics
            }
            Page::DeepDives => {
                let stats = DurationStats::of_durations(trips);
                let minutes = |value: Option<f64>| format!("{:.1} min", value.unwrap_or(0.0));
                vec![
                    Metric::new("Avg Ride Duration", minutes(stats.map(|s| s.mean))),
                    Metric::new("Median Duration", minutes(stats.map(|s| s.median))),
                    Metric::new("Max Duration", minutes(stats.map(|s| s.max))),
                ]
            }
            Page::Conclusions => {
                let kpis = Kpis::from_trips(trips);
                vec![
                    Metric::new("Total Rides", format_count(kpis.total_rides)),
                    Metric::new("Member Percentage", format!("{:.1}%", kpis.member_pct)),
                    Metric::new("Average Duration", format!("{:.1} min", kpis.avg_duration_minutes)),
                    Metric::new("Electric Bike Usage", format!("{:.1}%", kpis.electric_pct)),
                ]
            }
            Page::TimeAnalysis | Page::UserBehavior | Page::GeographicInsights => Vec::new(),
        }
    }

    /// Markdown commentary shown below the charts.
    pub const fn narrative(self) -> &'static str {
        match self {
            Page::ExecutiveSummary => EXECUTIVE_SUMMARY,
            Page::TimeAnalysis => TIME_ANALYSIS,
            Page::UserBehavior => USER_BEHAVIOR,
            Page::GeographicInsights => GEOGRAPHIC_INSIGHTS,
            Page::DeepDives => DEEP_DIVES,
            Page::Conclusions => CONCLUSIONS,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The four KPI tiles at the top of the dashboard.
pub fn kpi_metrics(kpis: &Kpis) -> Vec<Metric> {
    vec![
        Metric::new("Total Rides", format_count(kpis.total_rides)),
        Metric::new("Member Rides", format_count(kpis.member_rides)).with_delta(format!("{:.1}%", kpis.member_pct)),
        Metric::new("Avg Duration", format!("{:.1} min", kpis.avg_duration_minutes)),
        Metric::new("Electric Bike Rides", format_count(kpis.electric_rides))
            .with_delta(format!("{:.1}%", kpis.electric_pct)),
    ]
}

const EXECUTIVE_SUMMARY: &str = "\
### Analysis Overview

This dashboard explores Capital Bikeshare usage patterns to understand:
- **When** are bikes most frequently used?
- **Who** uses the service (members vs casual riders)?
- **Where** are the most popular stations and routes?
- **How** do riding patterns differ across user types?

Understanding these patterns can help optimize bike distribution, marketing strategies, and service improvements.

**Data Notes:**
- Some rides have missing station information (likely dockless electric bikes)
- Ride duration calculations exclude extreme outliers
- Geographic analysis uses available coordinate data
";

const TIME_ANALYSIS: &str = "\
### Key Time-Based Insights

**Peak Usage Patterns:**
- **Members**: Show strong commute patterns with peaks at 8-9am and 5-6pm
- **Casual Riders**: More weekend and evening usage, suggesting recreational use

**Seasonal Trends:**
- Higher usage on weekdays for members (work commutes)
- Weekend peaks for casual riders (leisure activities)
";

const USER_BEHAVIOR: &str = "\
### User Segmentation Insights

**Member Riders:**
- Shorter, more frequent rides
- Primarily use classic bikes for commuting
- Consistent weekday usage patterns

**Casual Riders:**
- Longer, less frequent rides
- Prefer electric bikes for ease of use
- More flexible, recreational usage patterns
";

const GEOGRAPHIC_INSIGHTS: &str = "\
### Geographic Patterns & Insights

**Station Activity Patterns:**
- **Downtown Core**: High activity with balanced start/end patterns
- **Tourist Areas**: More ride starts than ends, suggesting one-way tourist usage
- **Residential Areas**: Higher member usage with consistent commute patterns

**Usage Hotspots:**
- Morning/evening peaks around business districts
- Weekend hotspots in recreational areas
- Consistent member usage in residential-to-downtown corridors
";

const DEEP_DIVES: &str = "\
### Ride Duration vs Distance

The scatter compares distance and duration of a sample of rides; the bubble
charts compare average trips per user type and the bike type that dominates
each hour.
";

const CONCLUSIONS: &str = "\
### Key Success Factors

**Strong Member Base:**
- Consistent commuter usage patterns
- High frequency of short trips
- Predictable demand patterns

**Popular Service Areas:**
- Well-utilized downtown stations
- Good geographic coverage

### Improvement Opportunities

**Casual Rider Engagement:**
- Convert more casual users to members
- Target marketing for weekend usage patterns

**Station Optimization:**
- Address station imbalance issues
- Improve electric bike distribution

### Strategic Recommendations

1. **Member Retention & Growth**
   - Develop loyalty programs for frequent casual riders
   - Target commuter-focused marketing campaigns

2. **Operational Optimization**
   - Redistribute bikes based on time and usage patterns
   - Increase electric bike availability in tourist areas

3. **Service Expansion**
   - Identify underserved areas for new station placement
   - Develop partnerships with local businesses
";

#[cfg(test)]
mod tests {
    use super::*;
    use bikeshare_common::test_utils::trip_csv;
    use bikeshare_data::{read_trips, LoadOptions};
    use std::path::Path;

    #[test]
    fn test_chart_pages_cover_catalogue() {
        let charts: usize = Page::ALL.iter().map(|p| p.charts().len()).sum();
        assert_eq!(charts, ChartKind::ALL.len());
        assert!(Page::ExecutiveSummary.charts().is_empty());
        assert!(Page::Conclusions.charts().is_empty());
    }

    #[test]
    fn test_ids_match_cli_names() {
        for page in Page::ALL {
            let parsed = Page::from_str(page.id(), false).expect("page parses");
            assert_eq!(parsed, page);
        }
    }

    #[test]
    fn test_executive_metrics() {
        let text = trip_csv::document(&trip_csv::generate_rows(100, 40));
        let dataset = read_trips(text.as_bytes(), Path::new("t.csv"), &LoadOptions::default()).expect("load");
        let metrics = Page::ExecutiveSummary.metrics(&dataset.view());

        assert_eq!(metrics[0].to_string(), "Total Rides: 100");
        assert_eq!(metrics[1].to_string(), "Member Rides: 40 (40.0%)");
        let missing = metrics
            .iter()
            .find(|m| m.label == "Missing Start Stations")
            .expect("data quality metric");
        assert_eq!(missing.delta.as_deref(), Some("0.0%"));
    }

    #[test]
    fn test_metrics_of_empty_view() {
        let metrics = Page::Conclusions.metrics(&[]);
        assert_eq!(metrics.len(), 4);
        assert_eq!(metrics[1].value, "0.0%");
        let deep = Page::DeepDives.metrics(&[]);
        assert_eq!(deep[2].value, "0.0 min");
    }

    #[test]
    fn test_every_page_has_narrative() {
        assert!(Page::ALL.iter().all(|p| p.narrative().starts_with("### ")));
    }
}
