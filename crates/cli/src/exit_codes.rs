//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success (check failures are advisory)                |
//! | 1    | Discrepancies found (only with `--strict`)           |
//! | 2    | CLI usage error (bad args, unreadable config file)   |
//! | 3    | A dated cell is not a real calendar date             |
//! | 4    | Workbook could not be opened or read                 |
//! | 5    | Invalid configuration                                |
//! | 6    | Output failure (JSON serialization, stdout write)    |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `exit_code_for`

use ledgercheck_recon::ReconError;

/// Success - report printed.
pub const EXIT_SUCCESS: u8 = 0;

/// At least one check failed and `--strict` was given.
pub const EXIT_DISCREPANCIES: u8 = 1;

/// Usage error - bad arguments, missing config file.
pub const EXIT_USAGE: u8 = 2;

/// A cell matched the date pattern but is not a valid date.
/// The run aborts rather than reconcile against a guessed date.
pub const EXIT_INVALID_DATE: u8 = 3;

/// Workbook missing, unreadable, or without sheets.
pub const EXIT_SOURCE: u8 = 4;

/// Config failed to parse or validate.
pub const EXIT_CONFIG: u8 = 5;

/// Report could not be serialized or written.
pub const EXIT_OUTPUT: u8 = 6;

/// Map an engine error to its exit code.
pub fn exit_code_for(err: &ReconError) -> u8 {
    match err {
        ReconError::DateParse { .. } => EXIT_INVALID_DATE,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::Source { .. } | ReconError::SheetNotFound { .. } | ReconError::EmptySource { .. } => {
            EXIT_SOURCE
        }
    }
}
