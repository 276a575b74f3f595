//! Command-line interface.

use std::path::{Path, PathBuf};

use agrilend_browser::{Dir, ExportFormat, SortSpec, TotalsScope};
use agrilend_picker::parse_day;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands;
use crate::config::{AppConfig, Overrides};
use crate::env::EnvReader;
use crate::output::OutputFormat;
use crate::records::{Crop, CropReport, Farmer};
use crate::screen::{BrowseRequest, DateSelection};

#[derive(Debug, Parser)]
#[command(
    name = "agrilend",
    version,
    about = "Browse farmer, crop and damage report records"
)]
pub struct Cli {
    /// Configuration file (default: ./agrilend.yaml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Backend base URL; without one, screens use seed data
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[arg(long, global = true)]
    pub tenant: Option<String>,

    #[arg(long, global = true)]
    pub branch: Option<String>,

    #[arg(long, global = true)]
    pub token: Option<String>,

    /// off, error, warn, info, debug or trace
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScreenKind {
    Farmers,
    Crops,
    Reports,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List one page of records
    Browse(BrowseArgs),
    /// Search as you type: each stdin line is the current search text
    Live(LiveArgs),
    /// Show the options of a select filter
    Options(OptionsArgs),
    /// Assess crop damage in a photo
    Analyze(AnalyzeArgs),
    /// Delete records from the mock service and list the rest
    Delete(DeleteArgs),
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
    pub screen: ScreenKind,

    /// Read records from a JSON or YAML file instead of the service
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    #[arg(long, short)]
    pub search: Option<String>,

    /// Filter as ID=VALUE; an empty value or "all" clears it
    #[arg(
        long = "filter",
        short = 'f',
        value_name = "ID=VALUE",
        value_parser = parse_key_value
    )]
    pub filters: Vec<(String, String)>,

    /// Single day for the date filter (YYYY-MM-DD)
    #[arg(
        long,
        value_name = "DATE",
        value_parser = parse_date,
        conflicts_with_all = ["from", "to"]
    )]
    pub on: Option<NaiveDate>,

    /// Start of a date range (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// End of a date range (YYYY-MM-DD); requires --from
    #[arg(
        long,
        value_name = "DATE",
        value_parser = parse_date,
        requires = "from"
    )]
    pub to: Option<NaiveDate>,

    /// Filter the dates apply to (default: the screen's date column)
    #[arg(long, value_name = "ID")]
    pub date_filter: Option<String>,

    /// Sort as COLUMN or COLUMN:asc|desc
    #[arg(long, value_name = "COLUMN[:DIR]", value_parser = parse_sort)]
    pub sort: Option<SortSpec>,

    #[arg(long, short)]
    pub page: Option<usize>,

    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Rows summed in the footer
    #[arg(long, value_enum, default_value_t = TotalsArg::All)]
    pub totals: TotalsArg,

    /// Select every record on the displayed page
    #[arg(long)]
    pub select_all: bool,

    /// Toggle selection of a record key (repeatable)
    #[arg(long, value_name = "KEY")]
    pub select: Vec<String>,

    /// Run a row action as LABEL=KEY
    #[arg(long, value_name = "LABEL=KEY", value_parser = parse_key_value)]
    pub action: Option<(String, String)>,

    /// Run a bulk action on the selection
    #[arg(long, value_name = "LABEL")]
    pub bulk: Option<String>,

    #[arg(long, value_enum)]
    pub export: Option<ExportArg>,

    /// Write the export here instead of stdout
    #[arg(long, value_name = "FILE", requires = "export")]
    pub export_file: Option<PathBuf>,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TotalsArg {
    /// Rows on the displayed page
    Page,
    /// Every row matching search and filters
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportArg {
    Csv,
    Pdf,
}

#[derive(Debug, Args)]
pub struct LiveArgs {
    pub screen: ScreenKind,

    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct OptionsArgs {
    pub screen: ScreenKind,

    pub filter: String,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Image file or http(s) URL
    pub image: String,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub screen: ScreenKind,

    #[arg(required = true, value_name = "ID")]
    pub ids: Vec<String>,

    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_day(s).map_err(|e| e.to_string())
}

fn parse_sort(s: &str) -> Result<SortSpec, String> {
    let (column, dir) = match s.split_once(':') {
        Some((column, dir)) => (column, dir),
        None => (s, "asc"),
    };
    if column.trim().is_empty() {
        return Err("missing sort column".to_string());
    }
    let dir = match dir.trim().to_ascii_lowercase().as_str() {
        "asc" => Dir::Asc,
        "desc" => Dir::Desc,
        other => return Err(format!("sort direction must be asc or desc, got '{other}'")),
    };
    Ok(SortSpec::new(column.trim(), dir))
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            tenant: self.tenant.clone(),
            branch: self.branch.clone(),
            token: self.token.clone(),
            page_size: None,
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

impl BrowseArgs {
    pub fn request(&self) -> BrowseRequest {
        let dates = match (self.on, self.from) {
            (Some(day), _) => DateSelection::On(day),
            (None, Some(from)) => DateSelection::Range { from, to: self.to },
            (None, None) => DateSelection::None,
        };
        BrowseRequest {
            search: self.search.clone(),
            filters: self.filters.clone(),
            dates,
            date_filter: self.date_filter.clone(),
            sort: self.sort.clone(),
            page: self.page,
            page_size: self.page_size,
            totals: match self.totals {
                TotalsArg::Page => TotalsScope::Page,
                TotalsArg::All => TotalsScope::Filtered,
            },
            select: self.select.clone(),
            select_all: self.select_all,
            action: self.action.clone(),
            bulk_action: self.bulk.clone(),
            export: self.export.map(|e| match e {
                ExportArg::Csv => ExportFormat::Csv,
                ExportArg::Pdf => ExportFormat::Pdf,
            }),
            export_file: self.export_file.clone(),
        }
    }
}

macro_rules! for_screen {
    ($screen:expr, $f:ident ( $($arg:expr),* )) => {
        match $screen {
            ScreenKind::Farmers => $f::<Farmer>($($arg),*).await,
            ScreenKind::Crops => $f::<Crop>($($arg),*).await,
            ScreenKind::Reports => $f::<CropReport>($($arg),*).await,
        }
    };
}

/// Runs a parsed command and returns its stdout text.
pub async fn run(command: &Command, config: &AppConfig) -> anyhow::Result<String> {
    use commands::{browse, delete, live, options};

    match command {
        Command::Browse(args) => {
            let request = args.request();
            let data = args.data.as_deref();
            for_screen!(args.screen, browse(config, data, &request, args.output))
        }
        Command::Live(args) => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            let out = &mut stdout;
            let data: Option<&Path> = args.data.as_deref();
            let format = args.output;
            let renders = match args.screen {
                ScreenKind::Farmers => {
                    live::<Farmer, _, _>(config, data, stdin, out, format).await?
                }
                ScreenKind::Crops => live::<Crop, _, _>(config, data, stdin, out, format).await?,
                ScreenKind::Reports => {
                    live::<CropReport, _, _>(config, data, stdin, out, format).await?
                }
            };
            log::debug!("live search rendered {renders} time(s)");
            Ok(String::new())
        }
        Command::Options(args) => {
            for_screen!(args.screen, options(config, &args.filter, args.output))
        }
        Command::Analyze(args) => commands::analyze(config, &args.image, args.output).await,
        Command::Delete(args) => {
            let data = args.data.as_deref();
            for_screen!(args.screen, delete(config, data, &args.ids, args.output))
        }
    }
}

/// Resolves configuration for a parsed command line.
pub fn load_config(cli: &Cli, env: &dyn EnvReader, dir: &Path) -> anyhow::Result<AppConfig> {
    let config = AppConfig::load(cli.config.as_deref(), dir, env, &cli.overrides())?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sort_argument() {
        assert_eq!(parse_sort("name").unwrap(), SortSpec::asc("name"));
        assert_eq!(
            parse_sort("loan_amount:DESC").unwrap(),
            SortSpec::desc("loan_amount")
        );
        assert!(parse_sort("name:up").is_err());
        assert!(parse_sort(":asc").is_err());
    }

    #[test]
    fn filter_argument_keeps_empty_value() {
        assert_eq!(
            parse_key_value("status=").unwrap(),
            ("status".into(), String::new())
        );
        assert!(parse_key_value("status").is_err());
    }

    #[test]
    fn browse_request_from_flags() {
        let cli = Cli::parse_from([
            "agrilend", "browse", "reports", "--from", "2024-05-01", "--to", "2024-05-31", "-f",
            "verified=true", "--sort", "estimated_loss:desc", "--totals", "page",
        ]);
        let Command::Browse(args) = cli.command else {
            panic!("expected browse");
        };
        let request = args.request();
        assert!(matches!(
            request.dates,
            DateSelection::Range { to: Some(_), .. }
        ));
        assert_eq!(
            request.filters,
            vec![("verified".to_string(), "true".to_string())]
        );
        assert_eq!(request.totals, TotalsScope::Page);
        assert_eq!(request.sort, Some(SortSpec::desc("estimated_loss")));
    }

    #[test]
    fn on_conflicts_with_range() {
        let result = Cli::try_parse_from([
            "agrilend",
            "browse",
            "crops",
            "--on",
            "2024-05-01",
            "--from",
            "2024-05-01",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn bad_date_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["agrilend", "browse", "crops", "--on", "May 1"]);
        assert!(result.is_err());
    }
}
