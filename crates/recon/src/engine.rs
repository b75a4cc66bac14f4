use chrono::NaiveDate;

use crate::aggregate::{compute_totals, count_of};
use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::matcher::{check_duplicates, check_ledger_in_log, check_log_in_ledger, check_rates};
use crate::model::{
    Entry, LedgerEntry, LoadStats, LoadedSet, LogEntry, ReconInput, ReconMeta, ReconReport,
    ReconSummary, WorkType,
};
use crate::normalize::{Normalizer, RowOutcome, RowRole};
use crate::scope::{scope_window, scoped_log};
use crate::source::TabularSource;

/// Load and normalize both sources against one reference date.
pub fn load(
    config: &ReconConfig,
    today: NaiveDate,
    ledger_source: &mut dyn TabularSource,
    log_source: &mut dyn TabularSource,
) -> Result<ReconInput, ReconError> {
    let normalizer = Normalizer::new(config, today);
    let ledger = load_ledger(&normalizer, ledger_source)?;
    let log = load_log(&normalizer, log_source)?;
    Ok(ReconInput { today, ledger, log })
}

/// Ledger workbooks keep the current period on their last sheet.
pub fn load_ledger(
    normalizer: &Normalizer<'_>,
    source: &mut dyn TabularSource,
) -> Result<LoadedSet<LedgerEntry>, ReconError> {
    let sheet = source
        .sheet_names()
        .pop()
        .ok_or_else(|| ReconError::EmptySource { name: source.name().to_string() })?;
    log::debug!("ledger '{}': reading sheet '{sheet}'", source.name());

    let mut set = LoadedSet { entries: Vec::new(), stats: LoadStats::default() };
    read_sheet(normalizer, RowRole::Ledger, source, &sheet, &mut set)?;

    log::info!(
        "ledger '{}': {} entries, {} rows skipped",
        source.name(),
        set.stats.accepted,
        set.stats.skipped_total()
    );
    Ok(set)
}

/// Work-log workbooks start with a template sheet; every other sheet is data.
pub fn load_log(
    normalizer: &Normalizer<'_>,
    source: &mut dyn TabularSource,
) -> Result<LoadedSet<LogEntry>, ReconError> {
    let sheets = source.sheet_names();
    if sheets.is_empty() {
        return Err(ReconError::EmptySource { name: source.name().to_string() });
    }
    if sheets.len() == 1 {
        log::warn!("work log '{}' has only its template sheet", source.name());
    }

    let mut set = LoadedSet { entries: Vec::new(), stats: LoadStats::default() };
    for sheet in sheets.iter().skip(1) {
        log::debug!("work log '{}': reading sheet '{sheet}'", source.name());
        read_sheet(normalizer, RowRole::Log, source, sheet, &mut set)?;
    }

    log::info!(
        "work log '{}': {} entries, {} rows skipped",
        source.name(),
        set.stats.accepted,
        set.stats.skipped_total()
    );
    Ok(set)
}

/// Normalize every row of one sheet under `role` into `set`.
fn read_sheet<T: TryFrom<Entry>>(
    normalizer: &Normalizer<'_>,
    role: RowRole,
    source: &mut dyn TabularSource,
    sheet: &str,
    set: &mut LoadedSet<T>,
) -> Result<(), ReconError> {
    let rows = source.rows(sheet)?;
    if rows.is_empty() {
        log::warn!("'{}': sheet '{sheet}' has no rows", source.name());
    }

    set.stats.sheets.push(sheet.to_string());
    for (i, row) in rows.iter().enumerate() {
        set.stats.rows_read += 1;
        match normalizer.normalize(role, row)? {
            RowOutcome::Accepted(entry) => match T::try_from(entry) {
                Ok(entry) => {
                    set.stats.accepted += 1;
                    set.entries.push(entry);
                }
                Err(_) => log::error!("'{}': sheet '{sheet}' row {} is not a {role:?} entry", source.name(), i + 1),
            },
            RowOutcome::Rejected(reason) => {
                log::debug!("'{}': sheet '{sheet}' row {} skipped: {reason}", source.name(), i + 1);
                *set.stats.skipped.entry(reason.to_string()).or_insert(0) += 1;
            }
        }
    }
    Ok(())
}

/// Scope the log to the ledger's period, run every check, and total the ledger.
/// Check failures are part of the report, never errors.
pub fn run(config: &ReconConfig, input: &ReconInput) -> ReconReport {
    let ledger = &input.ledger.entries;
    let window = scope_window(ledger);
    let scoped = scoped_log(&input.log.entries, window.as_ref());
    if let Some(w) = window {
        log::debug!("scope window {} .. {}: {} log entries", w.start, w.end, scoped.len());
    }

    let checks = vec![
        check_rates(ledger, &config.rates),
        check_duplicates(ledger),
        check_ledger_in_log(ledger, &scoped),
        check_log_in_ledger(&scoped, ledger),
    ];

    let summary = ReconSummary {
        ledger_entries: ledger.len(),
        log_entries: input.log.entries.len(),
        scoped_log_entries: scoped.len(),
        translations: count_of(ledger, &WorkType::Translation),
        checks: count_of(ledger, &WorkType::Check),
        failed_checks: checks.iter().filter(|c| !c.passed).count(),
    };

    ReconReport {
        meta: ReconMeta {
            today: input.today,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        summary,
        window,
        ledger_stats: input.ledger.stats.clone(),
        log_stats: input.log.stats.clone(),
        checks,
        totals: compute_totals(ledger, &config.totals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CheckKind;
    use crate::source::InMemorySource;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 20).unwrap()
    }

    #[test]
    fn ledger_uses_last_sheet_only() {
        let config = ReconConfig::default();
        let normalizer = Normalizer::new(&config, today());
        let mut source = InMemorySource::new("invoice.xlsx")
            .with_sheet("May", [["1", "ALP-1", "翻訳", "05-02-23", "100", "18"]])
            .with_sheet("June", [["1", "ALP-2", "翻訳", "06-02-23", "200", "18"]]);

        let set = load_ledger(&normalizer, &mut source).unwrap();
        assert_eq!(set.entries.len(), 1);
        assert_eq!(set.entries[0].case_number, "ALP-2");
        assert_eq!(set.stats.sheets, vec!["June"]);
    }

    #[test]
    fn log_skips_template_sheet() {
        let config = ReconConfig::default();
        let normalizer = Normalizer::new(&config, today());
        let mut source = InMemorySource::new("shuho.xlsx")
            .with_sheet("template", [["6/1", "ALP-9", "翻訳", "", "100", "", "tmpl"]])
            .with_sheet("W22", [["6/1", "ALP-1", "翻訳", "", "100", "", "kato"]])
            .with_sheet("W23", [["6/8", "ALP-2", "英文チェック", "40", "", "", "kato"]]);

        let set = load_log(&normalizer, &mut source).unwrap();
        let cases: Vec<&str> = set.entries.iter().map(|e| e.case_number.as_str()).collect();
        assert_eq!(cases, vec!["ALP-1", "ALP-2"]);
        assert_eq!(set.stats.sheets, vec!["W22", "W23"]);
    }

    #[test]
    fn skipped_rows_counted_by_reason() {
        let config = ReconConfig::default();
        let normalizer = Normalizer::new(&config, today());
        let mut source = InMemorySource::new("invoice.xlsx").with_sheet(
            "June",
            vec![
                vec!["No.", "Case", "Type", "Date", "Words", "Rate"],
                vec!["1", "ALP-1", "翻訳", "06-02-23", "200", "18"],
                vec!["2", "ALP-", "翻訳", "06-02-23", "200", "18"],
                vec!["3", "ALP-3", "翻訳", "06-02-23", "200", ""],
                vec![""],
            ],
        );

        let set = load_ledger(&normalizer, &mut source).unwrap();
        assert_eq!(set.stats.rows_read, 5);
        assert_eq!(set.stats.accepted, 1);
        assert_eq!(set.stats.skipped_total(), 4);
        assert_eq!(set.stats.skipped["placeholder case number"], 1);
        assert_eq!(set.stats.skipped["missing rate"], 1);
        assert_eq!(set.stats.skipped["not a dated row"], 1);
        assert_eq!(set.stats.skipped["too few columns"], 1);
    }

    #[test]
    fn empty_workbooks_are_errors() {
        let config = ReconConfig::default();
        let normalizer = Normalizer::new(&config, today());
        let mut empty = InMemorySource::new("empty.xlsx");
        assert!(matches!(
            load_ledger(&normalizer, &mut empty),
            Err(ReconError::EmptySource { .. })
        ));
        assert!(matches!(
            load_log(&normalizer, &mut empty),
            Err(ReconError::EmptySource { .. })
        ));
    }

    #[test]
    fn bad_date_aborts_load() {
        let config = ReconConfig::default();
        let mut ledger = InMemorySource::new("invoice.xlsx")
            .with_sheet("June", [["1", "ALP-1", "翻訳", "06-02-23", "200", "18"]]);
        let mut log = InMemorySource::new("shuho.xlsx")
            .with_sheet("template", Vec::<Vec<String>>::new())
            .with_sheet("W1", [["2/30", "ALP-1", "翻訳", "", "200", "", "kato"]]);

        let err = load(&config, today(), &mut ledger, &mut log).unwrap_err();
        assert!(matches!(err, ReconError::DateParse { ref value } if value == "2/30"));
    }

    #[test]
    fn run_orders_checks() {
        let config = ReconConfig::default();
        let input = ReconInput {
            today: today(),
            ledger: LoadedSet { entries: Vec::new(), stats: LoadStats::default() },
            log: LoadedSet { entries: Vec::new(), stats: LoadStats::default() },
        };
        let report = run(&config, &input);
        let kinds: Vec<CheckKind> = report.checks.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CheckKind::RatesMatchTypes,
                CheckKind::NoDuplicateLedgerEntries,
                CheckKind::LedgerEntriesInLog,
                CheckKind::LogEntriesInLedger,
            ]
        );
        assert!(report.all_passed());
        assert!(report.window.is_none());
        assert_eq!(report.totals.period_total_cents, 8_116);
    }
}
