//! Markdown output: the analysis tables and the full dashboard report.

use crate::dashboard::{RenderedChart, Session, SummaryReport};
use crate::error::DashResult;
use crate::pages::{kpi_metrics, Metric, Page};
use bikeshare_common::{format_count, format_timestamp};
use bikeshare_data::tables::{StationCount, UserTypeCounts};
use bikeshare_data::AnalysisTables;
use chrono::NaiveDateTime;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// One page of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSection {
    /// Which page.
    pub page: Page,
    /// Headline numbers.
    pub metrics: Vec<Metric>,
    /// Chart files of the page.
    pub charts: Vec<RenderedChart>,
}

/// Text safe inside a Markdown table cell.
fn cell(value: impl std::fmt::Display) -> String {
    value.to_string().replace('|', "\\|")
}

fn user_table<K: std::fmt::Display>(out: &mut String, key_header: &str, rows: impl IntoIterator<Item = (K, UserTypeCounts)>) {
    let _ = writeln!(out, "| {key_header} | member | casual | total |");
    out.push_str("|---|---:|---:|---:|\n");
    for (key, counts) in rows {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            cell(key),
            format_count(counts.member),
            format_count(counts.casual),
            format_count(counts.total())
        );
    }
}

fn station_table(out: &mut String, rows: &[StationCount]) {
    out.push_str("| # | station | rides |\n|---:|---|---:|\n");
    for (rank, row) in rows.iter().enumerate() {
        let _ = writeln!(out, "| {} | {} | {} |", rank + 1, cell(&row.station), format_count(row.rides));
    }
}

/// Renders the analysis tables as Markdown.
pub fn tables_markdown(tables: &AnalysisTables) -> String {
    let mut out = String::new();

    out.push_str("## Hourly usage\n\n");
    user_table(&mut out, "hour", tables.hourly_usage.iter().map(|(h, c)| (h, *c)));

    out.push_str("\n## Daily usage\n\n");
    user_table(&mut out, "date", tables.daily_usage.iter().map(|(d, c)| (d, *c)));

    out.push_str("\n## Weekday usage\n\n");
    user_table(&mut out, "weekday", tables.weekday_usage.iter().map(|(d, c)| (d, *c)));

    out.push_str("\n## Bike type usage\n\n");
    user_table(&mut out, "bike type", tables.bike_type_usage.iter().map(|(b, c)| (b, *c)));

    out.push_str("\n## Top start stations\n\n");
    station_table(&mut out, &tables.top_start_stations);

    out.push_str("\n## Top end stations\n\n");
    station_table(&mut out, &tables.top_end_stations);

    out.push_str("\n## Ride duration (minutes)\n\n");
    out.push_str("| user type | count | mean | std | min | 25% | 50% | 75% | max |\n");
    out.push_str("|---|---:|---:|---:|---:|---:|---:|---:|---:|\n");
    for (user, stats) in &tables.duration_stats {
        let std = stats.std.map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));
        let _ = writeln!(
            out,
            "| {user} | {} | {:.2} | {std} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} |",
            format_count(stats.count),
            stats.mean,
            stats.min,
            stats.p25,
            stats.median,
            stats.p75,
            stats.max
        );
    }
    out
}

fn metric_table(out: &mut String, metrics: &[Metric]) {
    if metrics.is_empty() {
        return;
    }
    out.push_str("| metric | value | share |\n|---|---:|---:|\n");
    for metric in metrics {
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            cell(&metric.label),
            cell(&metric.value),
            cell(metric.delta.as_deref().unwrap_or(""))
        );
    }
    out.push('\n');
}

fn relative_link(path: &Path, report_dir: &Path) -> String {
    path.strip_prefix(report_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Builds the report document. Chart links are relative to `report_dir`.
pub fn build_report(
    summary: &SummaryReport,
    sections: &[PageSection],
    report_dir: &Path,
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::from("# Capital Bikeshare Data Analysis\n\n");
    let _ = writeln!(out, "- Source: `{}`", summary.source.display());
    let _ = writeln!(out, "- Filter: {}", summary.filter);
    let _ = writeln!(
        out,
        "- Trips in view: {} of {}",
        format_count(summary.summary.total_records),
        format_count(summary.dataset_rows)
    );
    if let (Some(first), Some(last)) = (summary.summary.first_start, summary.summary.last_start) {
        let _ = writeln!(out, "- Period: {} to {}", format_timestamp(first), format_timestamp(last));
    }
    let _ = writeln!(out, "- Generated: {}", format_timestamp(generated_at));
    out.push('\n');

    out.push_str("## Key Performance Indicators\n\n");
    metric_table(&mut out, &kpi_metrics(&summary.kpis));

    for section in sections {
        let _ = writeln!(out, "## {}\n", section.page.title());
        metric_table(&mut out, &section.metrics);
        for chart in &section.charts {
            let _ = writeln!(
                out,
                "![{}]({})\n",
                chart.kind.title(),
                relative_link(&chart.path, report_dir)
            );
        }
        out.push_str(section.page.narrative());
        out.push('\n');
    }
    out
}

/// Renders every page into `dir` and writes the report to
/// `dir/file_name`.
#[instrument(skip(session, dir), fields(dir = %dir.display()))]
pub async fn write_report(session: &Session, dir: &Path, file_name: &str) -> DashResult<PathBuf> {
    let rendered = session.render_pages(&Page::ALL, dir).await?;
    let view = session.view();

    let sections: Vec<PageSection> = Page::ALL
        .iter()
        .map(|&page| {
            let charts: Vec<RenderedChart> = rendered
                .iter()
                .filter(|chart| page.charts().contains(&chart.kind))
                .cloned()
                .collect();
            PageSection {
                page,
                metrics: page.metrics(&view),
                charts,
            }
        })
        .collect();

    let generated_at = chrono::Local::now().naive_local();
    let document = build_report(&session.summary(), &sections, dir, generated_at);
    let path = dir.join(file_name);
    tokio::fs::write(&path, document).await?;

    info!(path = %path.display(), charts = rendered.len(), "Wrote dashboard report");
    Ok(path)
}
