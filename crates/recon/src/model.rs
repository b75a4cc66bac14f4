use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// Work type of an entry, resolved from the sheet's type label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Translation,
    Check,
    /// Label matched neither configured type. The raw label is kept.
    Unknown(String),
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translation => write!(f, "Translation"),
            Self::Check => write!(f, "Check"),
            Self::Unknown(label) => write!(f, "UNKNOWN({label})"),
        }
    }
}

/// Non-negative word count, stored with separators stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WordCount(pub u64);

impl WordCount {
    /// Parse a cleaned word-count cell. Accepts integers, and floats with no
    /// fractional part (spreadsheets sometimes hand back `1200.0`).
    pub fn parse(text: &str) -> Option<Self> {
        if let Ok(n) = text.parse::<u64>() {
            return Some(Self(n));
        }
        let n: f64 = text.parse().ok()?;
        if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n < u64::MAX as f64 {
            Some(Self(n as u64))
        } else {
            None
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-word billing rate held as an exact decimal in ten-thousandths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rate {
    ten_thousandths: u64,
}

impl Rate {
    pub const SCALE: u64 = 10_000;
    const FRACTION_DIGITS: usize = 4;

    pub const fn from_ten_thousandths(ten_thousandths: u64) -> Self {
        Self { ten_thousandths }
    }

    /// Parse a decimal rate such as `18`, `1.4` or `0.0525`.
    /// More than four fractional digits, signs and exponents are rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if fraction.len() > Self::FRACTION_DIGITS
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut scaled_fraction: u64 = if fraction.is_empty() { 0 } else { fraction.parse().ok()? };
        for _ in fraction.len()..Self::FRACTION_DIGITS {
            scaled_fraction *= 10;
        }

        whole
            .checked_mul(Self::SCALE)?
            .checked_add(scaled_fraction)
            .map(Self::from_ten_thousandths)
    }

    /// Read a ledger rate cell. Exact decimals are taken as-is; anything else
    /// that reads as a non-negative float (formula results such as
    /// `1.4000000000000001`) is rounded to the nearest ten-thousandth.
    pub fn from_cell(text: &str) -> Option<Self> {
        Self::parse(text).or_else(|| Self::from_f64(text.trim().parse().ok()?))
    }

    /// Convert a configured float, rounding to the nearest ten-thousandth.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let scaled = (value * Self::SCALE as f64).round();
        if scaled >= u64::MAX as f64 {
            return None;
        }
        Some(Self::from_ten_thousandths(scaled as u64))
    }

    pub fn ten_thousandths(self) -> u64 {
        self.ten_thousandths
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.ten_thousandths / Self::SCALE;
        let fraction = self.ten_thousandths % Self::SCALE;
        if fraction == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{fraction:04}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RateRepr {
            Number(f64),
            Text(String),
        }

        let parsed = match RateRepr::deserialize(deserializer)? {
            RateRepr::Number(n) => Rate::from_f64(n),
            RateRepr::Text(s) => Rate::parse(&s),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("rate must be a non-negative decimal"))
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Identity key used for cross-set matching. Dates never participate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Signature {
    pub case_number: String,
    pub work_type: WorkType,
    /// `None` when a log entry's word count could not be resolved for its type.
    pub word_count: Option<WordCount>,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.case_number, self.work_type)?;
        match self.word_count {
            Some(words) => write!(f, "{words}"),
            None => write!(f, "UNKNOWN"),
        }
    }
}

/// Read-only view shared by ledger and log entries.
pub trait Billable {
    fn date(&self) -> NaiveDate;
    fn case_number(&self) -> &str;
    fn work_type(&self) -> &WorkType;
    fn word_count(&self) -> Option<WordCount>;

    fn rate(&self) -> Option<Rate> {
        None
    }

    fn signature(&self) -> Signature {
        Signature {
            case_number: self.case_number().to_string(),
            work_type: self.work_type().clone(),
            word_count: self.word_count(),
        }
    }
}

/// One invoiced line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub row_id: String,
    pub date: NaiveDate,
    pub case_number: String,
    pub work_type: WorkType,
    pub word_count: WordCount,
    /// `None` when the rate cell is not a number. Such entries still take
    /// part in matching but not in the rate check or totals.
    pub rate: Option<Rate>,
    /// Rate cell as read, for reporting.
    pub rate_text: String,
}

impl Billable for LedgerEntry {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn case_number(&self) -> &str {
        &self.case_number
    }

    fn work_type(&self) -> &WorkType {
        &self.work_type
    }

    fn word_count(&self) -> Option<WordCount> {
        Some(self.word_count)
    }

    fn rate(&self) -> Option<Rate> {
        self.rate
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}, ",
            self.row_id, self.case_number, self.date, self.work_type, self.word_count
        )?;
        match self.rate {
            Some(rate) => write!(f, "{rate}"),
            None => write!(f, "{}", self.rate_text),
        }
    }
}

/// One recorded day of work. Translations and checks keep their word counts
/// in separate columns; the one that counts depends on the work type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    pub case_number: String,
    pub work_type: WorkType,
    pub check_words: Option<WordCount>,
    pub translation_words: Option<WordCount>,
    pub author: String,
}

impl Billable for LogEntry {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn case_number(&self) -> &str {
        &self.case_number
    }

    fn work_type(&self) -> &WorkType {
        &self.work_type
    }

    fn word_count(&self) -> Option<WordCount> {
        match self.work_type {
            WorkType::Translation => self.translation_words,
            WorkType::Check => self.check_words,
            WorkType::Unknown(_) => None,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, ", self.date, self.case_number, self.work_type)?;
        match self.word_count() {
            Some(words) => write!(f, "{words}")?,
            None => write!(f, "UNKNOWN")?,
        }
        write!(f, ", {}", self.author)
    }
}

/// Either kind of entry, as produced by role-tagged normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Entry {
    Ledger(LedgerEntry),
    Log(LogEntry),
}

impl Entry {
    fn inner(&self) -> &dyn Billable {
        match self {
            Self::Ledger(e) => e,
            Self::Log(e) => e,
        }
    }
}

impl Billable for Entry {
    fn date(&self) -> NaiveDate {
        self.inner().date()
    }

    fn case_number(&self) -> &str {
        self.inner().case_number()
    }

    fn work_type(&self) -> &WorkType {
        self.inner().work_type()
    }

    fn word_count(&self) -> Option<WordCount> {
        self.inner().word_count()
    }

    fn rate(&self) -> Option<Rate> {
        self.inner().rate()
    }
}

impl TryFrom<Entry> for LedgerEntry {
    type Error = Entry;

    fn try_from(entry: Entry) -> Result<Self, Entry> {
        match entry {
            Entry::Ledger(e) => Ok(e),
            other => Err(other),
        }
    }
}

impl TryFrom<Entry> for LogEntry {
    type Error = Entry;

    fn try_from(entry: Entry) -> Result<Self, Entry> {
        match entry {
            Entry::Log(e) => Ok(e),
            other => Err(other),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ledger(e) => e.fmt(f),
            Self::Log(e) => e.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Counts collected while normalizing one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub sheets: Vec<String>,
    pub rows_read: usize,
    pub accepted: usize,
    /// Skipped rows keyed by rejection reason.
    pub skipped: BTreeMap<String, usize>,
}

impl LoadStats {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Normalized entries from one source plus how they were obtained.
#[derive(Debug, Clone, Serialize)]
pub struct LoadedSet<T> {
    pub entries: Vec<T>,
    pub stats: LoadStats,
}

/// Both record sets, fully normalized against one reference date.
#[derive(Debug, Clone)]
pub struct ReconInput {
    pub today: NaiveDate,
    pub ledger: LoadedSet<LedgerEntry>,
    pub log: LoadedSet<LogEntry>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    NoDuplicateLedgerEntries,
    RatesMatchTypes,
    LedgerEntriesInLog,
    LogEntriesInLedger,
}

impl CheckKind {
    pub fn success_message(self) -> &'static str {
        match self {
            Self::NoDuplicateLedgerEntries => "No duplicate ledger entries",
            Self::RatesMatchTypes => "Ledger rates are correct",
            Self::LedgerEntriesInLog => "All ledger entries are in the work log",
            Self::LogEntriesInLedger => "All work log entries are in the ledger",
        }
    }

    /// One-line description of a single violation of this check.
    pub fn describe(self, violation: &Violation) -> String {
        let matches = violation.matches.unwrap_or(0);
        match self {
            Self::NoDuplicateLedgerEntries => {
                format!("Duplicate ledger entry ({matches} copies): {}", violation.record)
            }
            Self::RatesMatchTypes => format!("Rate does not match type: {}", violation.record),
            Self::LedgerEntriesInLog => format!("Ledger entry not in work log: {}", violation.record),
            Self::LogEntriesInLedger => format!(
                "Work log entry matched {matches} ledger entries (expected 1): {}",
                violation.record
            ),
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDuplicateLedgerEntries => write!(f, "no_duplicate_ledger_entries"),
            Self::RatesMatchTypes => write!(f, "rates_match_types"),
            Self::LedgerEntriesInLog => write!(f, "ledger_entries_in_log"),
            Self::LogEntriesInLedger => write!(f, "log_entries_in_ledger"),
        }
    }
}

/// One offending entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Display form of the offending entry.
    pub record: String,
    pub date: NaiveDate,
    pub signature: Signature,
    /// Occurrences of the signature in the set it was counted against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<usize>,
}

impl Violation {
    pub fn new<E: Billable + fmt::Display>(entry: &E, matches: Option<usize>) -> Self {
        Self {
            record: entry.to_string(),
            date: entry.date(),
            signature: entry.signature(),
            matches,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub kind: CheckKind,
    pub passed: bool,
    pub violations: Vec<Violation>,
}

impl CheckOutcome {
    pub fn from_violations(kind: CheckKind, violations: Vec<Violation>) -> Self {
        Self {
            kind,
            passed: violations.is_empty(),
            violations,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

/// Inclusive date range spanned by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScopeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Billable amounts in minor units (hundredths).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub translation_cents: i64,
    pub check_cents: i64,
    pub fixed_fee_cents: i64,
    pub period_total_cents: i64,
    pub annualized_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub ledger_entries: usize,
    pub log_entries: usize,
    pub scoped_log_entries: usize,
    pub translations: usize,
    pub checks: usize,
    pub failed_checks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub today: NaiveDate,
    pub engine_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<ScopeWindow>,
    pub ledger_stats: LoadStats,
    pub log_stats: LoadStats,
    pub checks: Vec<CheckOutcome>,
    pub totals: Totals,
}

impl ReconReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}
