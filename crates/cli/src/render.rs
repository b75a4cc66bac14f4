//! Human-readable report and entry listings.

use std::fmt::Display;

use crossterm::style::{style, Stylize};
use ledgercheck_recon::model::{CheckOutcome, LoadStats, ReconReport};

/// Terminal styling, disabled when stdout is not a terminal or NO_COLOR is set.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn detect() -> Self {
        let enabled = atty::is(atty::Stream::Stdout) && std::env::var_os("NO_COLOR").is_none();
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self { enabled: false }
    }

    fn error(self, text: &str) -> String {
        if self.enabled {
            style(text).red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn heading(self, text: &str) -> String {
        if self.enabled {
            style(text).green().to_string()
        } else {
            text.to_string()
        }
    }

    fn count(self, n: usize) -> String {
        if self.enabled {
            style(n).cyan().bold().to_string()
        } else {
            n.to_string()
        }
    }
}

/// Minor units as `1,234.56`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let whole = (abs / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{:02}", abs % 100)
}

pub fn render_report(report: &ReconReport, palette: Palette) -> String {
    let mut lines = vec![
        "------------------------------".to_string(),
        "Verify Work Log and Ledger".to_string(),
        "------------------------------".to_string(),
        String::new(),
    ];

    let summary = &report.summary;
    lines.push(format!("Ledger entries: {}", summary.ledger_entries));
    match report.window {
        Some(window) => lines.push(format!(
            "Work log entries: {} ({} between {} and {})",
            summary.log_entries, summary.scoped_log_entries, window.start, window.end
        )),
        None => lines.push(format!(
            "Work log entries: {} (none in scope: ledger is empty)",
            summary.log_entries
        )),
    }
    if let Some(line) = skipped_line("ledger", &report.ledger_stats) {
        lines.push(line);
    }
    if let Some(line) = skipped_line("work log", &report.log_stats) {
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format!("Total translations: {}", palette.count(summary.translations)));
    lines.push(format!("Total checks: {}", summary.checks));
    lines.push(String::new());

    for outcome in &report.checks {
        lines.extend(check_lines(outcome, palette));
    }

    let totals = &report.totals;
    lines.push(String::new());
    lines.push(format!("Total for translations: {:>16}", format_cents(totals.translation_cents)));
    lines.push(format!("Total for checks:       {:>16}", format_cents(totals.check_cents)));
    let period = format!("Pre-surcharge total:    {:>16}", format_cents(totals.period_total_cents));
    lines.push(format!(
        "{} ({} /YR)",
        palette.error(&period),
        format_cents(totals.annualized_cents)
    ));

    lines.join("\n")
}

fn check_lines(outcome: &CheckOutcome, palette: Palette) -> Vec<String> {
    if outcome.passed {
        return vec![format!("OKAY... {}", outcome.kind.success_message())];
    }
    outcome
        .violations
        .iter()
        .map(|v| format!("{} {}", palette.error("ERROR:"), outcome.kind.describe(v)))
        .collect()
}

fn skipped_line(source: &str, stats: &LoadStats) -> Option<String> {
    let total = stats.skipped_total();
    if total == 0 {
        return None;
    }
    let reasons: Vec<String> = stats
        .skipped
        .iter()
        .map(|(reason, n)| format!("{reason}: {n}"))
        .collect();
    Some(format!("Skipped {source} rows: {total} ({})", reasons.join(", ")))
}

/// A titled list of `index: entry` lines.
pub fn render_listing<'a, T: Display + 'a>(
    title: &str,
    entries: impl IntoIterator<Item = (usize, &'a T)>,
    palette: Palette,
) -> String {
    let mut lines = vec![String::new(), palette.heading(&format!("** {title}:"))];
    lines.extend(entries.into_iter().map(|(i, entry)| format!("{i}: {entry}")));
    lines.join("\n")
}
