mod config;
mod export;
mod providers;

use anyhow::Result;
use cal_exporter_core::{DateRange, EventFilter, HashtagExpression};
use cal_exporter_google::TokenStore;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use config::{Config, expand_path};
use export::ExportFormat;
use providers::{FetchOptions, Source};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cal-exporter", version)]
#[command(about = "Export calendar events filtered by date range and hashtags")]
struct Cli {
    /// Google calendar id, iCal feed URL or webcal:// URL
    #[arg(short = 'c', long, conflicts_with = "local")]
    calendar: Option<String>,

    /// Local .ics file
    #[arg(short = 'l', long, value_name = "FILE")]
    local: Option<PathBuf>,

    /// Hashtags to match; commas mean AND, repeating -s means OR
    #[arg(short = 's', long = "search", value_name = "HASHTAGS")]
    search: Vec<String>,

    /// today, YYYY-MM-DD, YYYY-MM-DD:YYYY-MM-DD or YYYY-MM-DDThh:mm:YYYY-MM-DDThh:mm
    #[arg(short = 'd', long, default_value = "today")]
    date: String,

    /// Write the events to this file
    #[arg(short = 'w', long, value_name = "PATH")]
    write: Option<PathBuf>,

    /// Output format (defaults to the extension of --write)
    #[arg(short = 'e', long, value_enum, requires = "write")]
    export: Option<ExportFormat>,

    /// Also print the table when writing a file
    #[arg(short = 't', long)]
    terminal: bool,

    /// Google OAuth client file
    #[arg(short = 'g', long, value_name = "FILE")]
    credentials: Option<PathBuf>,

    /// Google token file
    #[arg(long, value_name = "FILE")]
    token: Option<PathBuf>,

    /// HTTP timeout for iCal feeds, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Where results go.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Output {
    file: Option<(PathBuf, ExportFormat)>,
    terminal: bool,
}

/// Everything a run needs, resolved from flags and config.
#[derive(Debug)]
struct Plan {
    source: Source,
    date: String,
    search: Vec<String>,
    output: Output,
    fetch: FetchOptions,
}

impl Plan {
    fn resolve(cli: Cli, config: &Config, source: Source, output: Output) -> Result<Self> {
        let credentials = match cli.credentials {
            Some(path) => path,
            None => config.credentials_path()?,
        };
        let tokens = match cli.token {
            Some(path) => path,
            None => config.token_path()?,
        };
        let timeout = cli.timeout.unwrap_or_else(|| config.timeout_secs());

        Ok(Plan {
            source,
            date: cli.date,
            search: cli.search,
            output,
            fetch: FetchOptions {
                timeout: Duration::from_secs(timeout),
                credentials,
                tokens: TokenStore::new(tokens),
            },
        })
    }
}

fn resolve_source(cli: &Cli, config: &Config) -> Result<Source, clap::Error> {
    if let Some(path) = &cli.local {
        return Ok(Source::Local {
            path: expand_path(&path.to_string_lossy()),
        });
    }

    match cli.calendar.as_deref().or(config.calendar.as_deref()) {
        Some(descriptor) => Ok(Source::detect(descriptor)),
        None => Err(Cli::command().error(
            ErrorKind::MissingRequiredArgument,
            "one of --calendar or --local is required (or set `calendar` in config.toml)",
        )),
    }
}

fn resolve_output(cli: &Cli) -> Result<Output, clap::Error> {
    let Some(path) = &cli.write else {
        return Ok(Output {
            file: None,
            terminal: true,
        });
    };

    let format = match cli.export {
        Some(format) => format,
        None => ExportFormat::from_path(path).ok_or_else(|| {
            Cli::command().error(
                ErrorKind::InvalidValue,
                format!(
                    "cannot infer the export format from '{}'; use an extension of pdf, xlsx, ods, csv or json, or pass --export",
                    path.display()
                ),
            )
        })?,
    };

    Ok(Output {
        file: Some((path.clone(), format)),
        terminal: cli.terminal,
    })
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::load_config()?;
    let source = resolve_source(&cli, &config).unwrap_or_else(|e| e.exit());
    let output = resolve_output(&cli).unwrap_or_else(|e| e.exit());
    let plan = Plan::resolve(cli, &config, source, output)?;

    run(plan).await
}

async fn run(plan: Plan) -> Result<()> {
    // Validate both filters before touching the network
    let range = DateRange::parse(&plan.date)?;
    let hashtags = HashtagExpression::compile(&plan.search)?;
    let filter = EventFilter::new(range, hashtags);

    tracing::info!(
        "Filtering events from {} to {}",
        range.from().format("%Y-%m-%d %H:%M"),
        range.to().format("%Y-%m-%d %H:%M")
    );
    tracing::debug!(source = ?plan.source, "Fetching from {}", plan.source.kind());

    let events = plan.source.fetch(&plan.fetch, &range).await?;

    let events = filter.apply_range(events);
    tracing::info!("Found {} events", events.len());

    let events = if filter.hashtags().is_empty() {
        events
    } else {
        let events = filter.apply_hashtags(events);
        tracing::info!("After hashtag filter: {} events", events.len());
        events
    };

    if events.is_empty() {
        tracing::info!("No events found matching your criteria.");
        return Ok(());
    }

    if let Some((path, format)) = &plan.output.file {
        export::write_file(path, *format, &events)?;
        tracing::info!("Exported to {}", path.display());
    }

    if plan.output.terminal {
        export::print_table(&events);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cal-exporter").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn date_defaults_to_today() {
        assert_eq!(parse(&["-c", "primary"]).date, "today");
    }

    #[test]
    fn search_is_repeatable() {
        let cli = parse(&["-c", "primary", "-s", "#a,#b", "-s", "#c"]);
        assert_eq!(cli.search, vec!["#a,#b", "#c"]);
    }

    #[test]
    fn calendar_and_local_conflict() {
        let result = Cli::try_parse_from(["cal-exporter", "-c", "primary", "-l", "x.ics"]);
        assert!(result.is_err());
    }

    #[test]
    fn export_requires_write() {
        let result = Cli::try_parse_from(["cal-exporter", "-c", "primary", "-e", "pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn format_inferred_from_extension() {
        let cli = parse(&["-c", "primary", "-w", "out/report.xlsx"]);
        let output = resolve_output(&cli).unwrap();
        assert_eq!(
            output.file,
            Some((PathBuf::from("out/report.xlsx"), ExportFormat::Xlsx))
        );
        assert!(!output.terminal);
    }

    #[test]
    fn explicit_format_wins() {
        let cli = parse(&["-c", "primary", "-w", "report.txt", "-e", "csv", "-t"]);
        let output = resolve_output(&cli).unwrap();
        assert_eq!(output.file, Some((PathBuf::from("report.txt"), ExportFormat::Csv)));
        assert!(output.terminal);
    }

    #[test]
    fn unknown_extension_is_a_usage_error() {
        let cli = parse(&["-c", "primary", "-w", "report.txt"]);
        let err = resolve_output(&cli).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn no_write_means_terminal() {
        let output = resolve_output(&parse(&["-c", "primary"])).unwrap();
        assert_eq!(output.file, None);
        assert!(output.terminal);
    }

    #[test]
    fn config_calendar_is_the_default_source() {
        let config = Config {
            calendar: Some("team@group.calendar.google.com".to_string()),
            ..Config::default()
        };
        let cli = Cli::try_parse_from(["cal-exporter"]).unwrap();
        assert_eq!(
            resolve_source(&cli, &config).unwrap(),
            Source::Google {
                calendar_id: "team@group.calendar.google.com".to_string()
            }
        );
    }

    #[test]
    fn missing_source_is_a_usage_error() {
        let cli = Cli::try_parse_from(["cal-exporter"]).unwrap();
        let err = resolve_source(&cli, &Config::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn local_wins_over_config_calendar() {
        let config = Config {
            calendar: Some("primary".to_string()),
            ..Config::default()
        };
        let cli = parse(&["-l", "/tmp/work.ics"]);
        assert_eq!(
            resolve_source(&cli, &config).unwrap(),
            Source::Local {
                path: PathBuf::from("/tmp/work.ics")
            }
        );
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }
}
