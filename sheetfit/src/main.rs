use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use sheetfit_core::model::{SlotInput, parse_iso_date};
use sheetfit_core::{Day, DayEntry, DayFile, LogOutcome, SheetfitConfig, Tracker, WeekStart};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod input;

use input::{LoadedDay, TargetFlags};

/// Overview size used when listing week tabs
const WEEK_PICKER_LIMIT: u32 = 200;

#[derive(Parser)]
#[command(name = "sheetfit")]
#[command(about = "Log workouts and bodyweight to the training spreadsheet", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format for commands that print data
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
    /// JSON output
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Create the week tab if it does not exist
    EnsureWeek {
        /// Monday of the week (default: the current week)
        #[arg(long, value_name = "DATE")]
        week: Option<String>,
    },
    /// Overwrite a day block with the slots of a day file
    WriteDay(DayArgs),
    /// Append a day file's slots to the exercise log
    LogDay(DatedDayArgs),
    /// Write the day block, then append it to the exercise log
    SaveDay(DatedDayArgs),
    /// Append a bodyweight entry
    Weight {
        #[arg(long)]
        weight: String,
        /// Name recorded with the entry (default: weight.user from config)
        #[arg(long)]
        user: Option<String>,
        /// Weekday label (default: today's, e.g. "Tue")
        #[arg(long)]
        day: Option<String>,
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },
    /// List week tabs, newest first
    Weeks {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Print a blank day file
    Template {
        #[arg(long, default_value = "Monday")]
        day: String,
    },
    /// Read a day block back from its week tab
    ShowDay {
        #[arg(long, value_name = "DATE")]
        week: String,
        #[arg(long)]
        day: String,
    },
    /// Check that the relay answers
    Ping,
}

#[derive(Args)]
struct DayArgs {
    /// Monday of the week (default: `week_start` in the file)
    #[arg(long, value_name = "DATE")]
    week: Option<String>,

    /// Monday, Wednesday or Friday (default: `day` in the file)
    #[arg(long)]
    day: Option<String>,

    /// Day file (TOML)
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

#[derive(Args)]
struct DatedDayArgs {
    #[command(flatten)]
    day: DayArgs,

    /// Date recorded on log rows (default: `date` in the file, else today)
    #[arg(long, value_name = "DATE")]
    date: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let today = Local::now().date_naive();

    // Needs no relay
    if let Command::Template { day } = &cli.command {
        let day: Day = day.parse()?;
        print!("{}", DayFile::template(day));
        return Ok(());
    }

    let config = SheetfitConfig::load(cli.config.as_deref())?;
    let tracker = Tracker::from_config(config).context("Invalid configuration")?;

    match &cli.command {
        Command::EnsureWeek { week } => {
            let week = input::week_or_current(week.as_deref(), today)?;
            tracker.ensure_week(week)?;
            println!("{} {}", "✓".green().bold(), week.sheet_name());
        }
        Command::WriteDay(args) => {
            let loaded = load(args, None, today)?;
            let cells = tracker.write_day(loaded.target.week, loaded.target.day, &loaded.entry)?;
            print_cells_written(&loaded, cells);
        }
        Command::LogDay(args) => {
            let loaded = load(&args.day, args.date.as_deref(), today)?;
            let target = loaded.target;
            let outcome = tracker.log_day(target.week, target.day, target.date, &loaded.entry)?;
            print_log_outcome(outcome);
        }
        Command::SaveDay(args) => {
            let loaded = load(&args.day, args.date.as_deref(), today)?;
            let target = loaded.target;
            let report = tracker.save_day(target.week, target.day, target.date, &loaded.entry);

            match &report.cells {
                Ok(cells) => print_cells_written(&loaded, *cells),
                Err(e) => eprintln!("{} cells: {}", "✗".red().bold(), e),
            }
            match &report.log {
                Ok(outcome) => print_log_outcome(*outcome),
                Err(e) => eprintln!("{} log: {}", "✗".red().bold(), e),
            }

            if !report.is_complete() {
                std::process::exit(1);
            }
        }
        Command::Weight {
            weight,
            user,
            day,
            date,
        } => {
            let date = date.as_deref().map(parse_iso_date).transpose()?;
            let entry = tracker.log_weight(weight, user.as_deref(), day.as_deref(), date, today)?;
            println!(
                "{} {} {} ({} {})",
                "✓".green().bold(),
                entry.weight,
                entry.user.cyan(),
                entry.day,
                entry.date
            );
        }
        Command::Weeks { limit } => {
            let names = tracker.week_names(Some(limit.unwrap_or(WEEK_PICKER_LIMIT)))?;
            match cli.format {
                OutputFormat::Human => {
                    if names.is_empty() {
                        println!("{}", "No week tabs yet".yellow());
                    }
                    for name in &names {
                        println!("{}", name);
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
            }
        }
        Command::ShowDay { week, day } => {
            let week: WeekStart = week.parse()?;
            let day: Day = day.parse()?;
            let entry = tracker.load_day(week, day)?;
            match cli.format {
                OutputFormat::Human => print_day(week, day, &entry),
                OutputFormat::Json => print_day_json(week, day, &entry)?,
            }
        }
        Command::Ping => {
            let status = tracker.ping()?;
            println!("{} relay {}", "✓".green().bold(), status);
        }
        Command::Template { .. } => {}
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

fn load(args: &DayArgs, date: Option<&str>, today: NaiveDate) -> Result<LoadedDay> {
    let flags = TargetFlags {
        week: args.week.as_deref(),
        day: args.day.as_deref(),
        date,
    };
    let loaded = input::load_day_file(&args.file, &flags, today)?;

    for (slot, name) in input::uncatalogued(&loaded.entry) {
        eprintln!(
            "{} slot {}: '{}' is not in the exercise catalog",
            "warning:".yellow().bold(),
            slot,
            name
        );
    }
    Ok(loaded)
}

fn print_cells_written(loaded: &LoadedDay, cells: usize) {
    println!(
        "{} {} {}: {} cells written",
        "✓".green().bold(),
        loaded.target.week.sheet_name(),
        loaded.target.day.as_str().cyan(),
        cells
    );
}

fn print_log_outcome(outcome: LogOutcome) {
    match outcome {
        LogOutcome::NothingToLog => println!("{}", "nothing to log".yellow()),
        LogOutcome::Logged(rows) => println!("{} {} rows logged", "✓".green().bold(), rows),
    }
}

fn print_day(week: WeekStart, day: Day, entry: &DayEntry) {
    println!(
        "{} {} ({})",
        week.sheet_name().bold(),
        day.as_str().cyan().bold(),
        week.date_of(day)
    );
    println!();

    for (slot, e) in entry.iter() {
        if e.is_vacuous() && slot.is_prunable() {
            println!("  {}", format!("{}  -", slot).bright_black());
            continue;
        }
        let mut detail = Vec::new();
        if let Some(v) = e.variation {
            detail.push(v.as_str().to_string());
        }
        if let Some(sets) = e.sets {
            detail.push(format!("{} sets", sets));
        }
        if !e.reps.is_empty() {
            detail.push(format!("reps {}", e.reps));
        }
        if !e.weight.is_empty() {
            detail.push(e.weight.clone());
        }
        if let Some(rpe) = e.rpe {
            detail.push(format!("RPE {}", rpe));
        }

        let mark = if e.done { "✓".green() } else { " ".normal() };
        println!("  {} {} {} {}", slot, mark, e.exercise.bold(), detail.join(", "));
        if !e.notes.is_empty() {
            println!("      {}", e.notes.bright_black());
        }
    }
}

fn print_day_json(week: WeekStart, day: Day, entry: &DayEntry) -> Result<()> {
    let slots: Vec<SlotInput> = entry
        .iter()
        .map(|(slot, e)| SlotInput {
            slot: slot.get().into(),
            entry: e.clone(),
        })
        .collect();

    let output = serde_json::json!({
        "week_start": week,
        "day": day,
        "date": week.date_of(day),
        "slots": slots,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
