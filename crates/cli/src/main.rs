// ledgercheck - verify a billing ledger against the work log it invoices

mod exit_codes;
mod render;
mod settings;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{ArgAction, Parser};
use ledgercheck_io::WorkbookSource;
use ledgercheck_recon::dates::{LEDGER_DATE_FORMAT, LOG_DATE_FORMAT};
use ledgercheck_recon::model::{LogEntry, WorkType};
use ledgercheck_recon::scope::scoped_log;
use ledgercheck_recon::ReconError;

use exit_codes::{exit_code_for, EXIT_DISCREPANCIES, EXIT_OUTPUT, EXIT_SUCCESS, EXIT_USAGE};
use render::{render_listing, render_report, Palette};

#[derive(Parser)]
#[command(name = "ledgercheck")]
#[command(about = "Check a billing ledger against the work log it invoices")]
#[command(long_version = long_version())]
#[command(version)]
#[command(after_help = "\
Examples:
  ledgercheck shuho.xlsx invoice.xlsx
  ledgercheck shuho.xlsx invoice.xlsx --translations --checks
  ledgercheck shuho.xlsx invoice.xlsx --json --today 2023-06-30
  ledgercheck shuho.xlsx invoice.xlsx --strict || echo 'needs review'")]
struct Cli {
    /// Work log workbook (first sheet is a template and is ignored)
    log: PathBuf,

    /// Billing ledger workbook (the last sheet is the current period)
    ledger: PathBuf,

    /// Print every ledger entry after the report
    #[arg(long)]
    ledger_entries: bool,

    /// Print every work log entry in the ledger's date range
    #[arg(long)]
    log_entries: bool,

    /// Print in-range work log translations
    #[arg(long)]
    translations: bool,

    /// Print in-range work log checks
    #[arg(long)]
    checks: bool,

    /// Print the full report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Exit 1 when any check fails
    #[arg(long)]
    strict: bool,

    /// Config file (default: <config dir>/ledgercheck/config.toml if present)
    #[arg(long, env = "LEDGERCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Reference date for inferring the year of M/D dates (YYYY-MM-DD)
    #[arg(long, env = "LEDGERCHECK_TODAY")]
    today: Option<NaiveDate>,

    /// More log output on stderr (-v debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  ledgercheck-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let level = if verbose > 0 { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cmd_check(cli) {
        Ok(code) => ExitCode::from(code),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self { code: EXIT_OUTPUT, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::DateParse { .. } => {
                Some("fix the cell, or pass --today if the year was inferred wrongly".to_string())
            }
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => {
                Some("see `ledgercheck --help` for the config file location".to_string())
            }
            e if e.is_source_error() => {
                Some("expected an .xlsx, .xls, .xlsb or .ods workbook".to_string())
            }
            _ => None,
        };
        Self { code: exit_code_for(&err), message: err.to_string(), hint }
    }
}

// ============================================================================
// check
// ============================================================================

fn cmd_check(cli: Cli) -> Result<u8, CliError> {
    let config = settings::load_config(cli.config.as_deref())?;
    let today = cli.today.unwrap_or_else(|| chrono::Local::now().date_naive());
    log::debug!("reference date {today}");

    let mut log_source = WorkbookSource::open(&cli.log, LOG_DATE_FORMAT)?;
    let mut ledger_source = WorkbookSource::open(&cli.ledger, LEDGER_DATE_FORMAT)?;

    let input = ledgercheck_recon::load(&config, today, &mut ledger_source, &mut log_source)?;
    let report = ledgercheck_recon::run(&config, &input);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::output(format!("JSON serialization error: {e}")))?;
        writeln!(out, "{}", json).map_err(|e| CliError::output(e.to_string()))?;
    } else {
        let palette = Palette::detect();
        let mut text = render_report(&report, palette);

        if cli.ledger_entries {
            text.push('\n');
            text.push_str(&render_listing(
                "All ledger entries",
                input.ledger.entries.iter().enumerate(),
                palette,
            ));
        }

        let scoped: Vec<&LogEntry> = scoped_log(&input.log.entries, report.window.as_ref());
        if cli.log_entries {
            text.push('\n');
            text.push_str(&render_listing(
                "All work log entries",
                scoped.iter().copied().enumerate(),
                palette,
            ));
        }
        if cli.translations {
            text.push('\n');
            text.push_str(&render_listing(
                "All translations",
                of_type(&scoped, &WorkType::Translation),
                palette,
            ));
        }
        if cli.checks {
            text.push('\n');
            text.push_str(&render_listing("All checks", of_type(&scoped, &WorkType::Check), palette));
        }

        writeln!(out, "{}", text).map_err(|e| CliError::output(e.to_string()))?;
    }

    if cli.strict && !report.all_passed() {
        return Err(CliError {
            code: EXIT_DISCREPANCIES,
            message: format!("{} of {} checks failed", report.summary.failed_checks, report.checks.len()),
            hint: None,
        }
        .with_hint("drop --strict to treat check failures as advisory"));
    }
    Ok(EXIT_SUCCESS)
}

/// Scoped log entries of one type, keeping their index in the scoped log.
fn of_type<'a>(
    scoped: &'a [&'a LogEntry],
    work_type: &'a WorkType,
) -> impl Iterator<Item = (usize, &'a LogEntry)> + 'a {
    scoped
        .iter()
        .copied()
        .enumerate()
        .filter(move |(_, entry)| &entry.work_type == work_type)
}
