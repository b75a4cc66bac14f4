use serde::Deserialize;

use crate::error::ReconError;
use crate::model::{Rate, WorkType};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Reconciliation settings. Every key is optional; defaults reproduce the
/// labels and constants of the agency's spreadsheets.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    pub labels: TypeLabels,
    pub rates: RateConfig,
    /// Default "unassigned" case marker. Compared case-insensitively.
    pub placeholder_case: String,
    /// Days added to today before deciding which year a bare `M/D` belongs to.
    pub lookahead_days: u32,
    pub totals: TotalsConfig,
    pub ledger: LedgerLayout,
    pub log: LogLayout,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            labels: TypeLabels::default(),
            rates: RateConfig::default(),
            placeholder_case: "ALP-".into(),
            lookahead_days: 7,
            totals: TotalsConfig::default(),
            ledger: LedgerLayout::default(),
            log: LogLayout::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Labels + Rates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeLabels {
    pub translation: String,
    pub check: String,
}

impl Default for TypeLabels {
    fn default() -> Self {
        Self {
            translation: "翻訳".into(),
            check: "英文チェック".into(),
        }
    }
}

impl TypeLabels {
    /// Map a sheet label onto a work type. Anything else is `Unknown`.
    pub fn resolve(&self, label: &str) -> WorkType {
        let label = label.trim();
        if label == self.translation {
            WorkType::Translation
        } else if label == self.check {
            WorkType::Check
        } else {
            WorkType::Unknown(label.to_string())
        }
    }
}

/// Rates that imply a work type. Other rates are never checked.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateConfig {
    pub translation: Rate,
    pub check: Rate,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            translation: Rate::from_ten_thousandths(18 * Rate::SCALE),
            check: Rate::from_ten_thousandths(14_000),
        }
    }
}

impl RateConfig {
    /// The work type a rate implies, if any.
    pub fn implied_type(&self, rate: Rate) -> Option<WorkType> {
        if rate == self.translation {
            Some(WorkType::Translation)
        } else if rate == self.check {
            Some(WorkType::Check)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TotalsConfig {
    /// Fixed-cost surcharge added to every period total.
    pub fixed_fee: f64,
    pub periods_per_year: u32,
}

impl Default for TotalsConfig {
    fn default() -> Self {
        Self {
            fixed_fee: 81.16,
            periods_per_year: 12,
        }
    }
}

impl TotalsConfig {
    pub fn fixed_fee_cents(&self) -> i64 {
        (self.fixed_fee * 100.0).round() as i64
    }
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerLayout {
    pub columns: LedgerColumns,
}

/// Zero-based column indices of a ledger row.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerColumns {
    pub row_id: usize,
    pub case_number: usize,
    pub work_type: usize,
    pub date: usize,
    pub word_count: usize,
    pub rate: usize,
}

impl Default for LedgerColumns {
    fn default() -> Self {
        Self {
            row_id: 0,
            case_number: 1,
            work_type: 2,
            date: 3,
            word_count: 4,
            rate: 5,
        }
    }
}

impl LedgerColumns {
    fn all(&self) -> [usize; 6] {
        [
            self.row_id,
            self.case_number,
            self.work_type,
            self.date,
            self.word_count,
            self.rate,
        ]
    }

    /// Rows shorter than this are skipped.
    pub fn min_len(&self) -> usize {
        self.all().iter().max().map_or(0, |m| m + 1)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogLayout {
    pub columns: LogColumns,
}

/// Zero-based column indices of a work-log row.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogColumns {
    pub date: usize,
    pub case_number: usize,
    pub work_type: usize,
    pub check_words: usize,
    pub translation_words: usize,
    pub author: usize,
}

impl Default for LogColumns {
    fn default() -> Self {
        Self {
            date: 0,
            case_number: 1,
            work_type: 2,
            check_words: 3,
            translation_words: 4,
            author: 6,
        }
    }
}

impl LogColumns {
    fn all(&self) -> [usize; 6] {
        [
            self.date,
            self.case_number,
            self.work_type,
            self.check_words,
            self.translation_words,
            self.author,
        ]
    }

    /// Rows shorter than this are skipped.
    pub fn min_len(&self) -> usize {
        self.all().iter().max().map_or(0, |m| m + 1)
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let labels = &self.labels;
        if labels.translation.trim().is_empty() || labels.check.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "work type labels must not be empty".into(),
            ));
        }
        if labels.translation.trim() == labels.check.trim() {
            return Err(ReconError::ConfigValidation(format!(
                "translation and check labels are both '{}'",
                labels.translation
            )));
        }

        if self.rates.translation == self.rates.check {
            return Err(ReconError::ConfigValidation(format!(
                "translation and check rates are both {}",
                self.rates.translation
            )));
        }

        if !self.totals.fixed_fee.is_finite() || self.totals.fixed_fee < 0.0 {
            return Err(ReconError::ConfigValidation(
                "totals.fixed_fee must be a non-negative number".into(),
            ));
        }
        if self.totals.periods_per_year == 0 {
            return Err(ReconError::ConfigValidation(
                "totals.periods_per_year must be at least 1".into(),
            ));
        }

        if !distinct(&self.ledger.columns.all()) {
            return Err(ReconError::ConfigValidation(
                "ledger columns must be distinct".into(),
            ));
        }
        if !distinct(&self.log.columns.all()) {
            return Err(ReconError::ConfigValidation(
                "log columns must be distinct".into(),
            ));
        }

        Ok(())
    }
}

fn distinct(columns: &[usize]) -> bool {
    columns
        .iter()
        .enumerate()
        .all(|(i, c)| !columns[i + 1..].contains(c))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert_eq!(config.labels.translation, "翻訳");
        assert_eq!(config.labels.check, "英文チェック");
        assert_eq!(config.rates.translation.to_string(), "18");
        assert_eq!(config.rates.check.to_string(), "1.4");
        assert_eq!(config.placeholder_case, "ALP-");
        assert_eq!(config.lookahead_days, 7);
        assert_eq!(config.totals.fixed_fee_cents(), 8116);
        assert_eq!(config.totals.periods_per_year, 12);
        assert_eq!(config.ledger.columns.min_len(), 6);
        assert_eq!(config.log.columns.min_len(), 7);
    }

    #[test]
    fn parse_overrides() {
        let config = ReconConfig::from_toml(
            r#"
placeholder_case = "TBD"
lookahead_days = 3

[labels]
translation = "Translation"
check = "Proofread"

[rates]
translation = "20.5"
check = 2

[totals]
fixed_fee = 0
periods_per_year = 4

[log.columns]
author = 5
"#,
        )
        .unwrap();

        assert_eq!(config.placeholder_case, "TBD");
        assert_eq!(config.lookahead_days, 3);
        assert_eq!(config.labels.resolve("Proofread"), WorkType::Check);
        assert_eq!(config.rates.translation.to_string(), "20.5");
        assert_eq!(config.rates.check.to_string(), "2");
        assert_eq!(config.totals.fixed_fee_cents(), 0);
        assert_eq!(config.log.columns.author, 5);
        assert_eq!(config.log.columns.min_len(), 6);
    }

    #[test]
    fn resolve_labels() {
        let labels = TypeLabels::default();
        assert_eq!(labels.resolve("翻訳"), WorkType::Translation);
        assert_eq!(labels.resolve(" 英文チェック "), WorkType::Check);
        assert_eq!(labels.resolve("会議"), WorkType::Unknown("会議".into()));
    }

    #[test]
    fn implied_type_only_for_configured_rates() {
        let rates = RateConfig::default();
        assert_eq!(rates.implied_type(Rate::parse("18").unwrap()), Some(WorkType::Translation));
        assert_eq!(rates.implied_type(Rate::parse("1.40").unwrap()), Some(WorkType::Check));
        assert_eq!(rates.implied_type(Rate::parse("12").unwrap()), None);
    }

    #[test]
    fn reject_unknown_key() {
        let err = ReconConfig::from_toml("placeholder = \"ALP-\"").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_same_labels() {
        let err = ReconConfig::from_toml("[labels]\ntranslation = \"x\"\ncheck = \"x\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn reject_same_rates() {
        let err = ReconConfig::from_toml("[rates]\ntranslation = 2\ncheck = 2\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn reject_overlapping_columns() {
        let err = ReconConfig::from_toml("[ledger.columns]\nrate = 0\n").unwrap_err();
        assert!(err.to_string().contains("ledger columns"));
    }

    #[test]
    fn reject_bad_rate() {
        let err = ReconConfig::from_toml("[rates]\ntranslation = \"eighteen\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn reject_zero_periods() {
        let err = ReconConfig::from_toml("[totals]\nperiods_per_year = 0\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }
}
