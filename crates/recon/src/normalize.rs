use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::config::ReconConfig;
use crate::dates::resolve_date;
use crate::error::ReconError;
use crate::model::{Entry, LedgerEntry, LogEntry, Rate, WordCount, WorkType};

/// Real ledger rows carry a full `MM-DD-YY` date; template rows do not.
static LEDGER_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+-\d+-\d+$").expect("ledger date pattern"));

/// Work-log rows carry a bare `M/D`.
static LOG_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+/\d+$").expect("log date pattern"));

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRole {
    Ledger,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    RowId,
    Date,
    CaseNumber,
    WorkType,
    WordCount,
    Rate,
    Author,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowId => write!(f, "row id"),
            Self::Date => write!(f, "date"),
            Self::CaseNumber => write!(f, "case number"),
            Self::WorkType => write!(f, "type"),
            Self::WordCount => write!(f, "word count"),
            Self::Rate => write!(f, "rate"),
            Self::Author => write!(f, "author"),
        }
    }
}

/// Why a row was skipped. None of these abort a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowRejection {
    TooShort,
    MissingField(Field),
    PlaceholderCase,
    DatePattern,
    InvalidWordCount,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "too few columns"),
            Self::MissingField(field) => write!(f, "missing {field}"),
            Self::PlaceholderCase => write!(f, "placeholder case number"),
            Self::DatePattern => write!(f, "not a dated row"),
            Self::InvalidWordCount => write!(f, "invalid word count"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<T> {
    Accepted(T),
    Rejected(RowRejection),
}

impl<T> RowOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RowOutcome<U> {
        match self {
            Self::Accepted(v) => RowOutcome::Accepted(f(v)),
            Self::Rejected(r) => RowOutcome::Rejected(r),
        }
    }

    pub fn accepted(self) -> Option<T> {
        match self {
            Self::Accepted(v) => Some(v),
            Self::Rejected(_) => None,
        }
    }
}

macro_rules! reject {
    ($reason:expr) => {
        return Ok(RowOutcome::Rejected($reason))
    };
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Turns raw text rows into typed entries against a fixed reference date.
pub struct Normalizer<'a> {
    config: &'a ReconConfig,
    today: NaiveDate,
}

impl<'a> Normalizer<'a> {
    pub fn new(config: &'a ReconConfig, today: NaiveDate) -> Self {
        Self { config, today }
    }

    pub fn normalize(&self, role: RowRole, row: &[String]) -> Result<RowOutcome<Entry>, ReconError> {
        Ok(match role {
            RowRole::Ledger => self.ledger_row(row)?.map(Entry::Ledger),
            RowRole::Log => self.log_row(row)?.map(Entry::Log),
        })
    }

    /// Normalize one ledger row.
    ///
    /// Only a date that passes the `MM-DD-YY` gate but is not a real date
    /// produces an error; every other problem skips the row.
    pub fn ledger_row(&self, row: &[String]) -> Result<RowOutcome<LedgerEntry>, ReconError> {
        let cols = &self.config.ledger.columns;
        if row.len() < cols.min_len() {
            reject!(RowRejection::TooShort);
        }

        let row_id = cell(row, cols.row_id);
        let date = cell(row, cols.date);
        let case_number = strip_separators(cell(row, cols.case_number));
        let label = cell(row, cols.work_type);
        let words = strip_separators(cell(row, cols.word_count));
        let rate = cell(row, cols.rate);

        for (value, field) in [
            (row_id, Field::RowId),
            (date, Field::Date),
            (case_number.as_str(), Field::CaseNumber),
            (label, Field::WorkType),
            (words.as_str(), Field::WordCount),
            (rate, Field::Rate),
        ] {
            if value.is_empty() {
                reject!(RowRejection::MissingField(field));
            }
        }

        if self.is_placeholder(&case_number) {
            reject!(RowRejection::PlaceholderCase);
        }
        if !LEDGER_DATE_RE.is_match(date) {
            reject!(RowRejection::DatePattern);
        }

        let Some(word_count) = WordCount::parse(&words) else {
            log::warn!(
                "ledger row {row_id}: word count {words:?} for case {case_number} is not a whole number; \
                 row skipped"
            );
            reject!(RowRejection::InvalidWordCount);
        };
        let date = resolve_date(date, self.today, self.config.lookahead_days)?;
        let work_type = self.resolve_type(label, &case_number, date);
        let rate_text = rate;
        let rate = Rate::from_cell(rate_text);
        if rate.is_none() {
            log::warn!(
                "ledger row {row_id}: rate {rate_text:?} for case {case_number} is not a number; \
                 excluded from the rate check and totals"
            );
        }

        Ok(RowOutcome::Accepted(LedgerEntry {
            row_id: row_id.to_string(),
            date,
            case_number,
            work_type,
            word_count,
            rate,
            rate_text: rate_text.to_string(),
        }))
    }

    /// Normalize one work-log row. At least one of the two word-count
    /// columns must be filled; which one counts depends on the type.
    pub fn log_row(&self, row: &[String]) -> Result<RowOutcome<LogEntry>, ReconError> {
        let cols = &self.config.log.columns;
        if row.len() < cols.min_len() {
            reject!(RowRejection::TooShort);
        }

        let date = cell(row, cols.date);
        let case_number = strip_separators(cell(row, cols.case_number));
        let label = cell(row, cols.work_type);
        let author = cell(row, cols.author);
        let check_words = strip_separators(cell(row, cols.check_words));
        let translation_words = strip_separators(cell(row, cols.translation_words));

        for (value, field) in [
            (date, Field::Date),
            (case_number.as_str(), Field::CaseNumber),
            (label, Field::WorkType),
            (author, Field::Author),
        ] {
            if value.is_empty() {
                reject!(RowRejection::MissingField(field));
            }
        }
        if check_words.is_empty() && translation_words.is_empty() {
            reject!(RowRejection::MissingField(Field::WordCount));
        }

        if self.is_placeholder(&case_number) {
            reject!(RowRejection::PlaceholderCase);
        }
        if !LOG_DATE_RE.is_match(date) {
            reject!(RowRejection::DatePattern);
        }

        let (Some(check_words), Some(translation_words)) =
            (parse_optional_words(&check_words), parse_optional_words(&translation_words))
        else {
            log::warn!(
                "work log {date} case {case_number}: word counts {check_words:?} / {translation_words:?} \
                 are not whole numbers; row skipped"
            );
            reject!(RowRejection::InvalidWordCount);
        };

        let date = resolve_date(date, self.today, self.config.lookahead_days)?;
        let work_type = self.resolve_type(label, &case_number, date);

        Ok(RowOutcome::Accepted(LogEntry {
            date,
            case_number,
            work_type,
            check_words,
            translation_words,
            author: author.to_string(),
        }))
    }

    fn is_placeholder(&self, case_number: &str) -> bool {
        case_number.eq_ignore_ascii_case(self.config.placeholder_case.trim())
    }

    fn resolve_type(&self, label: &str, case_number: &str, date: NaiveDate) -> WorkType {
        let work_type = self.config.labels.resolve(label);
        if let WorkType::Unknown(ref raw) = work_type {
            log::warn!("unrecognized work type {raw:?} for case {case_number} on {date}; keeping it as unknown");
        }
        work_type
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

/// Drop thousands separators and any whitespace, including interior spaces.
pub fn strip_separators(text: &str) -> String {
    text.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect()
}

/// `Some(None)` for an empty cell, `None` for an unparseable one.
fn parse_optional_words(text: &str) -> Option<Option<WordCount>> {
    if text.is_empty() {
        Some(None)
    } else {
        WordCount::parse(text).map(Some)
    }
}
