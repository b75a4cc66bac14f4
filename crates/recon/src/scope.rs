use chrono::NaiveDate;

use crate::model::{LedgerEntry, LogEntry, ScopeWindow};

impl ScopeWindow {
    /// Inclusive on both ends: after `start - 1 day` and before `end + 1 day`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Earliest and latest ledger dates, or `None` for an empty ledger.
pub fn scope_window(ledger: &[LedgerEntry]) -> Option<ScopeWindow> {
    let start = ledger.iter().map(|e| e.date).min()?;
    let end = ledger.iter().map(|e| e.date).max()?;
    Some(ScopeWindow { start, end })
}

/// Log entries dated inside the ledger's window. The log spans a whole year;
/// the ledger covers one billing period.
pub fn scoped_log<'a>(log: &'a [LogEntry], window: Option<&ScopeWindow>) -> Vec<&'a LogEntry> {
    let Some(window) = window else {
        return Vec::new();
    };
    log.iter().filter(|e| window.contains(e.date)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Rate, WordCount, WorkType};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ledger(d: &str) -> LedgerEntry {
        LedgerEntry {
            row_id: "1".into(),
            date: date(d),
            case_number: "ALP-1".into(),
            work_type: WorkType::Translation,
            word_count: WordCount(100),
            rate: Rate::parse("18"),
            rate_text: "18".into(),
        }
    }

    fn log(d: &str) -> LogEntry {
        LogEntry {
            date: date(d),
            case_number: "ALP-1".into(),
            work_type: WorkType::Translation,
            check_words: None,
            translation_words: Some(WordCount(100)),
            author: "kato".into(),
        }
    }

    #[test]
    fn window_uses_min_and_max_not_row_order() {
        let entries = vec![ledger("2023-06-15"), ledger("2023-06-01"), ledger("2023-06-30"), ledger("2023-06-10")];
        let window = scope_window(&entries).unwrap();
        assert_eq!(window.start, date("2023-06-01"));
        assert_eq!(window.end, date("2023-06-30"));
    }

    #[test]
    fn empty_ledger_has_no_window() {
        assert!(scope_window(&[]).is_none());
        let log = vec![log("2023-06-01")];
        assert!(scoped_log(&log, None).is_empty());
    }

    #[test]
    fn boundaries_inclusive() {
        let window = scope_window(&[ledger("2023-06-01"), ledger("2023-06-30")]).unwrap();
        let entries = vec![
            log("2023-05-31"),
            log("2023-06-01"),
            log("2023-06-15"),
            log("2023-06-30"),
            log("2023-07-01"),
            log("2022-06-15"),
        ];
        let scoped = scoped_log(&entries, Some(&window));
        let dates: Vec<NaiveDate> = scoped.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date("2023-06-01"), date("2023-06-15"), date("2023-06-30")]);
    }

    #[test]
    fn single_day_window() {
        let window = scope_window(&[ledger("2023-06-01")]).unwrap();
        assert!(window.contains(date("2023-06-01")));
        assert!(!window.contains(date("2023-05-31")));
        assert!(!window.contains(date("2023-06-02")));
    }
}
