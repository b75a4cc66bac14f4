//! `ledgercheck-recon`: billing ledger vs. work log reconciliation engine.
//!
//! Pure engine crate: receives sheets of raw text rows, returns a report.
//! No CLI or file-format dependencies.

pub mod aggregate;
pub mod config;
pub mod dates;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod scope;
pub mod source;

pub use config::ReconConfig;
pub use engine::{load, run};
pub use error::ReconError;
pub use model::{Billable, Entry, LedgerEntry, LogEntry, ReconInput, ReconReport, Signature, WorkType};
pub use source::{InMemorySource, TabularSource};
