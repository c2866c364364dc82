//! Command dispatch.

use crate::cli::{Cli, Command};
use crate::dashboard::Dashboard;
use crate::error::DashResult;
use crate::pages::Page;
use crate::report::{tables_markdown, write_report};
use bikeshare_config::{Config, ConfigFormat, ConfigLoader};
use std::io::Write;
use tracing::info;

/// Loads the configuration named on the command line (or found by the
/// loader) and applies the global flags on top of it.
pub fn load_config(cli: &Cli) -> DashResult<Config> {
    let mut config = ConfigLoader::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    Ok(config)
}

/// Runs one command against `dashboard`, writing human-readable output to
/// `out`.
pub async fn run<W: Write>(cli: &Cli, dashboard: &Dashboard, out: &mut W) -> DashResult<()> {
    match &cli.command {
        Command::Pages => return list_pages(out),
        Command::ShowConfig { write } => return show_config(dashboard.config(), write.as_deref(), out),
        _ => {}
    }

    let session = dashboard.open(cli.filter.to_filter()?).await?;
    let config = dashboard.config();

    match &cli.command {
        Command::Summary { json } => {
            let summary = session.summary();
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
            } else {
                writeln!(out, "{summary}")?;
            }
        }
        Command::Tables { json } => {
            let tables = session.tables();
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&tables)?)?;
            } else {
                write!(out, "{}", tables_markdown(&tables))?;
            }
        }
        Command::Render { page, .. } => {
            let rendered = session.render_pages(&[*page], &config.output.directory).await?;
            for chart in &rendered {
                writeln!(out, "{}", chart.path.display())?;
            }
            if rendered.is_empty() {
                writeln!(out, "Page '{page}' has no charts")?;
            }
        }
        Command::Report { .. } => {
            let path = write_report(&session, &config.output.directory, &config.output.report_file_name).await?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Export { out: path } => {
            let rows = session.export(path).await?;
            info!(rows, "Export finished");
            writeln!(out, "Wrote {rows} trips to {}", path.display())?;
        }
        Command::Pages | Command::ShowConfig { .. } => {}
    }
    Ok(())
}

fn show_config<W: Write>(config: &Config, path: Option<&std::path::Path>, out: &mut W) -> DashResult<()> {
    match path {
        Some(path) => {
            ConfigLoader::save(config, path)?;
            writeln!(out, "Saved configuration to {}", path.display())?;
        }
        None => write!(out, "{}", ConfigLoader::to_string(config, ConfigFormat::Yaml)?)?,
    }
    Ok(())
}

fn list_pages<W: Write>(out: &mut W) -> DashResult<()> {
    for page in Page::ALL {
        writeln!(out, "{} ({})", page.id(), page.title())?;
        for chart in page.charts() {
            writeln!(out, "  {:<24} {}", chart.id(), chart.title())?;
        }
    }
    Ok(())
}
