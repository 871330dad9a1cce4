use std::collections::HashSet;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use logsieve_logs::{ErrorPolicy, LogLevel, LogParser, LogRecord, RecordFilter, TimeRange};
use logsieve_types::parse_date;

mod config;

use config::Config;

/// Logsieve - Filter web-server access logs by level and date range
///
/// Parse errors are reported per line and skipped unless --strict is given.
/// Invalid arguments or configuration stop the run before any file is read.
#[derive(Parser, Debug)]
#[command(name = "logsieve")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log file, or directory whose *.log files are read
    #[arg(value_name = "LOGS_PATH")]
    logs_path: PathBuf,

    /// Require LOGS_PATH to be a single file
    #[arg(short = 'f', long, alias = "single_file")]
    single_file: bool,

    /// Level to keep; repeat for several (DEBUG, INFO, WARNING, ERROR)
    #[arg(long = "level", value_name = "LEVEL", value_parser = LogLevel::from_str)]
    levels: Vec<LogLevel>,

    /// Earliest date to keep, inclusive (YYYY/MM/DD)
    #[arg(
        short = 'i',
        long,
        alias = "initial_timestamp",
        value_name = "YYYY/MM/DD",
        value_parser = parse_date
    )]
    initial_timestamp: Option<NaiveDate>,

    /// Latest date to keep, inclusive (YYYY/MM/DD)
    #[arg(
        short = 't',
        long,
        alias = "final_timestamp",
        value_name = "YYYY/MM/DD",
        value_parser = parse_date
    )]
    final_timestamp: Option<NaiveDate>,

    /// Abort on the first malformed line
    #[arg(long)]
    strict: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", anyhow::Error::from(e));
            return ExitCode::FAILURE;
        }
    };

    // Logs go to stderr so stdout only carries records
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = run(&args, &config, &mut out).and_then(|count| {
        out.flush().context("failed to write output")?;
        Ok(count)
    });

    match result {
        Ok(count) => {
            debug!(count, "done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Filter settings resolved from arguments and configuration
struct Settings {
    filter: RecordFilter,
    policy: ErrorPolicy,
}

impl Settings {
    fn resolve(args: &Args, config: &Config) -> Result<Self> {
        let levels: HashSet<LogLevel> = if args.levels.is_empty() {
            config.level_set()?
        } else {
            args.levels.iter().copied().collect()
        };

        let range = TimeRange::from_dates(args.initial_timestamp, args.final_timestamp)
            .context("invalid date range")?;

        let policy = if args.strict {
            ErrorPolicy::Abort
        } else {
            config.error_policy()
        };

        Ok(Self {
            filter: RecordFilter::new().with_levels(levels).with_range(range),
            policy,
        })
    }
}

/// Read, parse, filter, and print; returns the number of records printed
fn run(args: &Args, config: &Config, out: &mut impl Write) -> Result<usize> {
    let settings = Settings::resolve(args, config)?;

    let files = logsieve_source::discover(&args.logs_path, args.single_file)?;
    let lines = logsieve_source::read_all(&files)?;
    let batch = LogParser::parse_batch(lines, settings.policy)?;

    if batch.skipped() > 0 {
        warn!(skipped = batch.skipped(), "skipped malformed lines");
    }

    let kept = settings.filter.apply(&batch.records);
    render(&kept, out)?;
    Ok(kept.len())
}

/// Print each record as it appeared in the log, then the total count
fn render(records: &[&LogRecord], out: &mut impl Write) -> io::Result<()> {
    for record in records {
        writeln!(out, "{}", record)?;
    }
    writeln!(out, "{}", records.len())
}
