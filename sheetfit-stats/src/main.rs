use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use sheetfit_core::model::parse_iso_date;
use sheetfit_core::{SheetfitConfig, Tracker, WeekStart, aggregate};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod formatter;

#[derive(Parser)]
#[command(name = "sheetfit-stats")]
#[command(about = "Weekly overview, rep totals and charts from the training spreadsheet", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Log relay activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for scripts
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Per-week summaries, newest first
    Overview {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// The week holding today, else the latest week
    Current {
        #[arg(long)]
        limit: Option<u32>,
        /// Reference date instead of the local date
        #[arg(long, value_name = "DATE")]
        today: Option<String>,
    },
    /// Total reps per week from the exercise log
    Reps,
    /// Reps per exercise on Monday, Wednesday and Friday of one week
    Chart {
        /// Monday of the week (default: the current week)
        #[arg(long, value_name = "DATE")]
        week: Option<String>,
        #[arg(long, value_name = "DATE")]
        today: Option<String>,
    },
    /// Tab names and ids
    Tabs,
    /// Raw cells of a range
    #[command(group(ArgGroup::new("source").required(true).args(["tab", "gid"])))]
    Dump {
        /// Tab name, resolved through the tab list
        #[arg(long)]
        tab: Option<String>,
        /// Tab id
        #[arg(long)]
        gid: Option<String>,
        /// A1 range, e.g. "B7:I14" or "A1:L"
        #[arg(long)]
        range: String,
        /// Ask the relay to split off the first row as headers
        #[arg(long)]
        header_row: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = SheetfitConfig::load(cli.config.as_deref())?;
    let tracker = Tracker::from_config(config).context("Invalid configuration")?;
    let local_today = Local::now().date_naive();

    match &cli.command {
        Command::Overview { limit } => {
            let weeks = tracker.overview(*limit)?;
            let weeks = aggregate::weeks_newest_first(&weeks);
            match cli.format {
                OutputFormat::Human => formatter::print_overview(&weeks),
                OutputFormat::Json => formatter::print_json(&weeks)?,
            }
        }
        Command::Current { limit, today } => {
            let today = reference_date(today.as_deref(), local_today)?;
            let week = tracker.current_week(*limit, today)?;
            match cli.format {
                OutputFormat::Human => formatter::print_current(week.as_ref()),
                OutputFormat::Json => formatter::print_json(&week)?,
            }
        }
        Command::Reps => {
            let totals = tracker.weekly_reps()?;
            match cli.format {
                OutputFormat::Human => formatter::print_reps(&totals),
                OutputFormat::Json => formatter::print_json(&totals)?,
            }
        }
        Command::Chart { week, today } => {
            let week = match week {
                Some(text) => text.parse()?,
                None => {
                    let today = reference_date(today.as_deref(), local_today)?;
                    current_week_start(&tracker, today)?
                }
            };
            let series = tracker.exercise_chart(week)?;
            match cli.format {
                OutputFormat::Human => formatter::print_chart(week, &series),
                OutputFormat::Json => formatter::print_json(&serde_json::json!({
                    "week_start": week,
                    "days": aggregate::DAY_AXIS,
                    "series": series,
                }))?,
            }
        }
        Command::Tabs => {
            let tabs = tracker.tabs()?;
            match cli.format {
                OutputFormat::Human => formatter::print_tabs(&tabs),
                OutputFormat::Json => formatter::print_json(&tabs)?,
            }
        }
        Command::Dump {
            tab,
            gid,
            range,
            header_row,
        } => {
            let gid = match (gid, tab) {
                (Some(gid), _) => gid.clone(),
                (None, Some(name)) => tracker.resolve_tab(name)?.gid,
                (None, None) => anyhow::bail!("pass --tab or --gid"),
            };
            let dump = tracker.dump(&gid, range, *header_row)?;
            match cli.format {
                OutputFormat::Human => formatter::print_dump(&dump),
                OutputFormat::Json => formatter::print_json(&dump)?,
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn reference_date(today: Option<&str>, local_today: NaiveDate) -> Result<NaiveDate> {
    Ok(match today {
        Some(text) => parse_iso_date(text)?,
        None => local_today,
    })
}

/// Week picked by the overview for `today`, else the calendar week
fn current_week_start<T: sheetfit_core::Transport>(tracker: &Tracker<T>, today: NaiveDate) -> Result<WeekStart> {
    let picked = tracker
        .current_week(None, today)?
        .and_then(|w| w.start_date())
        .and_then(|d| WeekStart::new(d).ok());

    Ok(match picked {
        Some(week) => week,
        None => {
            info!(%today, "no week tabs to pick from; using the calendar week");
            WeekStart::containing(today)
        }
    })
}
