use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (duplicate labels, overlapping columns, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// A date cell passed the row's date pattern but is not a real calendar date.
    #[error("invalid date '{value}'")]
    DateParse { value: String },

    /// The tabular source could not be opened or read.
    #[error("source '{name}': {message}")]
    Source { name: String, message: String },

    /// A sheet listed by the source could not be found when read.
    #[error("source '{name}': sheet '{sheet}' not found")]
    SheetNotFound { name: String, sheet: String },

    /// The source lists no sheets at all.
    #[error("source '{name}' contains no sheets")]
    EmptySource { name: String },
}

impl ReconError {
    /// True for errors caused by the input workbooks rather than configuration.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Self::Source { .. } | Self::SheetNotFound { .. } | Self::EmptySource { .. }
        )
    }
}
