//! Dashboard state: the dataset cache, the active filter and rendering of
//! pages.

use crate::error::DashResult;
use crate::pages::Page;
use bikeshare_common::format_count;
use bikeshare_config::Config;
use bikeshare_data::{
    AnalysisTables, DataQuality, DataSummary, Dataset, DatasetCache, Kpis, LoadOptions, LoadStats, Trip, TripFilter,
};
use bikeshare_graphs::{ChartKind, ChartStyle, ViewOptions};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// Long-lived dashboard state shared by every command.
pub struct Dashboard {
    config: Arc<Config>,
    cache: DatasetCache,
}

impl Dashboard {
    /// Creates a dashboard with an empty dataset cache.
    pub fn new(config: Config) -> Self {
        let cache = DatasetCache::new(&config.cache);
        Self {
            config: Arc::new(config),
            cache,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Dataset cache.
    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// Loads the configured source through the cache and pairs it with
    /// `filter`.
    #[instrument(skip(self, filter), fields(source = %self.config.data.source.display()))]
    pub async fn open(&self, filter: TripFilter) -> DashResult<Session> {
        let options = LoadOptions::from(&self.config.data);
        let dataset = self.cache.get_or_load(&self.config.data.source, &options).await?;
        let session = Session::new(dataset, filter, Arc::clone(&self.config));
        info!(
            trips = session.dataset.len(),
            filter = %session.filter.describe(),
            "Dashboard session ready"
        );
        Ok(session)
    }
}

/// A loaded dataset seen through one filter.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Arc<Dataset>,
    filter: TripFilter,
    config: Arc<Config>,
}

/// A chart written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedChart {
    /// Which chart.
    pub kind: ChartKind,
    /// Where it was written.
    pub path: PathBuf,
}

impl Session {
    /// Pairs a dataset with a filter.
    pub fn new(dataset: Arc<Dataset>, filter: TripFilter, config: Arc<Config>) -> Self {
        Self {
            dataset,
            filter,
            config,
        }
    }

    /// The unfiltered dataset.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The active filter.
    pub fn filter(&self) -> &TripFilter {
        &self.filter
    }

    /// Filtered trips in source order.
    pub fn view(&self) -> Vec<&Trip> {
        self.filter.apply(&self.dataset)
    }

    /// Headline numbers of the filtered view.
    pub fn summary(&self) -> SummaryReport {
        let view = self.view();
        SummaryReport {
            source: self.dataset.source().to_path_buf(),
            filter: self.filter.describe(),
            load_stats: self.dataset.stats(),
            dataset_rows: self.dataset.len(),
            summary: DataSummary::from_trips(&view),
            kpis: Kpis::from_trips(&view),
            quality: DataQuality::from_trips(&view),
        }
    }

    /// Analysis tables of the filtered view.
    pub fn tables(&self) -> AnalysisTables {
        AnalysisTables::from_trips(&self.view())
    }

    /// Renders the charts of `pages` into `dir` as `<chart id>.png`.
    ///
    /// Rendering runs on the blocking thread pool.
    #[instrument(skip(self, pages, dir), fields(dir = %dir.display()))]
    pub async fn render_pages(&self, pages: &[Page], dir: &Path) -> DashResult<Vec<RenderedChart>> {
        let kinds: Vec<ChartKind> = pages.iter().flat_map(|p| p.charts()).collect();
        let dataset = Arc::clone(&self.dataset);
        let filter = self.filter.clone();
        let style = ChartStyle::from(&self.config.graphs);
        let options = ViewOptions::from(&self.config.graphs);
        let dir = dir.to_path_buf();

        let rendered = tokio::task::spawn_blocking(move || -> DashResult<Vec<RenderedChart>> {
            std::fs::create_dir_all(&dir)?;
            let view = filter.apply(&dataset);
            kinds
                .into_iter()
                .map(|kind| -> DashResult<RenderedChart> {
                    let path = kind.render_to_dir(&view, &style, &options, &dir)?;
                    Ok(RenderedChart { kind, path })
                })
                .collect()
        })
        .await??;

        info!(charts = rendered.len(), "Rendered dashboard charts");
        Ok(rendered)
    }

    /// Writes the filtered trips to `path` as CSV. Returns the row count.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn export(&self, path: &Path) -> DashResult<usize> {
        let dataset = Arc::clone(&self.dataset);
        let filter = self.filter.clone();
        let path = path.to_path_buf();
        let rows = tokio::task::spawn_blocking(move || -> DashResult<usize> {
            let view = filter.apply(&dataset);
            bikeshare_data::write_trips_csv(&path, &view)?;
            Ok(view.len())
        })
        .await??;
        Ok(rows)
    }
}

/// Everything the `summary` command prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    /// Trip file.
    pub source: PathBuf,
    /// Active filter in words.
    pub filter: String,
    /// Row accounting of the load.
    pub load_stats: LoadStats,
    /// Trips in the unfiltered dataset.
    pub dataset_rows: usize,
    /// Overview of the filtered view.
    pub summary: DataSummary,
    /// Headline indicators of the filtered view.
    pub kpis: Kpis,
    /// Station coverage of the filtered view.
    pub quality: DataQuality,
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Source: {}", self.source.display())?;
        writeln!(
            f,
            "Rows: {} read, {} rejected, {} outside the duration window, {} kept",
            format_count(self.load_stats.rows_read),
            format_count(self.load_stats.rows_rejected),
            format_count(self.load_stats.rows_out_of_window),
            format_count(self.dataset_rows),
        )?;
        writeln!(f, "Filter: {}", self.filter)?;
        writeln!(f)?;

        writeln!(f, "Records: {}", format_count(self.summary.total_records))?;
        if let (Some(first), Some(last)) = (self.summary.first_start, self.summary.last_start) {
            writeln!(f, "Period: {first} to {last}")?;
        }
        for (user, share) in &self.summary.user_type_share {
            writeln!(f, "  {user}: {:.1}%", share * 100.0)?;
        }
        for (bike, count) in &self.summary.bike_type_counts {
            writeln!(f, "  {bike}: {}", format_count(*count))?;
        }
        writeln!(f)?;

        for metric in crate::pages::kpi_metrics(&self.kpis) {
            writeln!(f, "{metric}")?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "Missing start stations: {} ({:.1}%)",
            format_count(self.quality.missing_start_stations),
            self.quality.missing_start_pct
        )?;
        write!(
            f,
            "Missing end stations: {} ({:.1}%)",
            format_count(self.quality.missing_end_stations),
            self.quality.missing_end_pct
        )
    }
}
