//! Command line arguments.

use crate::error::{DashError, DashResult};
use crate::pages::Page;
use bikeshare_common::{BikeType, TimeOfDay, UserType};
use bikeshare_config::Config;
use bikeshare_data::TripFilter;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(
    name = "bikeshare-dash",
    author,
    version,
    about = "Capital Bikeshare trip data dashboard",
    long_about = "Loads a Capital Bikeshare trip export, applies the filters given on the\n\
                  command line and prints summaries or renders the dashboard pages to PNG\n\
                  charts and a Markdown report."
)]
pub struct Cli {
    /// Configuration file path (YAML or TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Trip CSV to analyse, overriding the configured source
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,

    /// Log level or filter directive, overriding the configured level
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Filter flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct FilterArgs {
    /// First start date to keep (YYYY-MM-DD)
    #[arg(long, global = true, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last start date to keep (YYYY-MM-DD)
    #[arg(long, global = true, requires = "from")]
    pub to: Option<NaiveDate>,

    /// Keep only these user types (member, casual)
    #[arg(long = "user-type", global = true, value_delimiter = ',')]
    pub user_types: Vec<UserType>,

    /// Keep only these bike types (classic_bike, electric_bike, ...)
    #[arg(long = "bike-type", global = true, value_delimiter = ',')]
    pub bike_types: Vec<BikeType>,

    /// Keep only these times of day (early_morning, morning, afternoon, evening)
    #[arg(long = "time-of-day", global = true, value_delimiter = ',')]
    pub times_of_day: Vec<TimeOfDay>,
}

impl FilterArgs {
    /// Builds the trip filter. Flags that were not given leave their
    /// dimension unrestricted.
    pub fn to_filter(&self) -> DashResult<TripFilter> {
        let mut filter = TripFilter::new();
        match (self.from, self.to) {
            (Some(start), Some(end)) => filter = filter.with_date_range(start, end),
            (None, None) => {}
            _ => return Err(DashError::Usage("--from and --to must be given together".to_string())),
        }
        if !self.user_types.is_empty() {
            filter = filter.with_user_types(self.user_types.iter().copied());
        }
        if !self.bike_types.is_empty() {
            filter = filter.with_bike_types(self.bike_types.iter().copied());
        }
        if !self.times_of_day.is_empty() {
            filter = filter.with_times_of_day(self.times_of_day.iter().copied());
        }
        Ok(filter)
    }
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the data summary, KPIs and data quality of the filtered view
    Summary {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the analysis tables of the filtered view
    Tables {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Render the charts of one page to PNG files
    Render {
        /// Page to render
        #[arg(short, long, value_enum)]
        page: Page,
        /// Output directory, overriding the configured one
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Render every page and write the Markdown report
    Report {
        /// Output directory, overriding the configured one
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Write the filtered trips as CSV
    Export {
        /// Destination file
        #[arg(short, long)]
        out: PathBuf,
    },
    /// List the dashboard pages and their charts
    Pages,
    /// Print the effective configuration as YAML, or save it to a file
    ShowConfig {
        /// Destination file (.yaml, .yml or .toml)
        #[arg(short, long)]
        write: Option<PathBuf>,
    },
}


impl Cli {
    /// Applies the global flags on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(data) = &self.data {
            config.data.source = data.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        match &self.command {
            Command::Render { out: Some(dir), .. } | Command::Report { out: Some(dir) } => {
                config.output.directory = dir.clone();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bikeshare-dash").chain(args.iter().copied())).expect("arguments parse")
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_filter_flags() {
        let cli = parse(&[
            "summary",
            "--from",
            "2025-10-01",
            "--to",
            "2025-10-07",
            "--user-type",
            "member",
            "--bike-type",
            "electric_bike,classic_bike",
            "--time-of-day",
            "morning",
        ]);
        let filter = cli.filter.to_filter().expect("filter");
        let day = |d| NaiveDate::from_ymd_opt(2025, 10, d).expect("date");
        assert_eq!(filter.date_range, Some((day(1), day(7))));
        assert_eq!(filter.user_types.as_ref().map(|s| s.len()), Some(1));
        assert_eq!(filter.bike_types.as_ref().map(|s| s.len()), Some(2));
        assert_eq!(filter.times_of_day.as_ref().map(|s| s.len()), Some(1));
        assert_eq!(cli.command, Command::Summary { json: false });
    }

    #[test]
    fn test_no_flags_is_unrestricted() {
        let cli = parse(&["pages"]);
        assert!(cli.filter.to_filter().expect("filter").is_unrestricted());
    }

    #[test]
    fn test_half_date_range_is_rejected() {
        assert!(Cli::try_parse_from(["bikeshare-dash", "summary", "--from", "2025-10-01"]).is_err());
        let args = FilterArgs {
            from: NaiveDate::from_ymd_opt(2025, 10, 1),
            ..FilterArgs::default()
        };
        assert!(matches!(args.to_filter(), Err(DashError::Usage(_))));
    }

    #[test]
    fn test_unknown_user_type_is_rejected() {
        assert!(Cli::try_parse_from(["bikeshare-dash", "summary", "--user-type", "tourist"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = parse(&["--data", "trips.csv", "-l", "debug", "report", "--out", "site"]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.data.source, PathBuf::from("trips.csv"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.output.directory, PathBuf::from("site"));
    }

    #[test]
    fn test_render_requires_known_page() {
        let cli = parse(&["render", "--page", "time-analysis"]);
        assert_eq!(
            cli.command,
            Command::Render {
                page: Page::TimeAnalysis,
                out: None
            }
        );
        assert!(Cli::try_parse_from(["bikeshare-dash", "render", "--page", "weather"]).is_err());
    }

    #[test]
    fn test_show_config_write_target() {
        let cli = parse(&["show-config", "--write", "effective.toml"]);
        assert_eq!(
            cli.command,
            Command::ShowConfig {
                write: Some(PathBuf::from("effective.toml"))
            }
        );
        assert_eq!(parse(&["show-config"]).command, Command::ShowConfig { write: None });
    }
}
