use std::collections::HashMap;

use crate::config::RateConfig;
use crate::model::{Billable, CheckKind, CheckOutcome, LedgerEntry, LogEntry, Signature, Violation};

/// Occurrence count per signature.
#[derive(Debug, Default)]
pub struct SignatureIndex {
    counts: HashMap<Signature, usize>,
}

impl SignatureIndex {
    pub fn build<'a, E, I>(entries: I) -> Self
    where
        E: Billable + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let mut counts = HashMap::new();
        for entry in entries {
            *counts.entry(entry.signature()).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, signature: &Signature) -> usize {
        self.counts.get(signature).copied().unwrap_or(0)
    }
}

/// Every ledger signature must be unique. Each entry sharing a signature is
/// reported with the number of copies.
pub fn check_duplicates(ledger: &[LedgerEntry]) -> CheckOutcome {
    let index = SignatureIndex::build(ledger);
    let violations = ledger
        .iter()
        .filter_map(|entry| {
            let copies = index.count(&entry.signature());
            (copies != 1).then(|| Violation::new(entry, Some(copies)))
        })
        .collect();
    CheckOutcome::from_violations(CheckKind::NoDuplicateLedgerEntries, violations)
}

/// A configured rate implies a work type; other rates, and rates that are
/// not numbers, are not checked.
pub fn check_rates(ledger: &[LedgerEntry], rates: &RateConfig) -> CheckOutcome {
    let violations = ledger
        .iter()
        .filter(|entry| {
            entry
                .rate
                .and_then(|rate| rates.implied_type(rate))
                .is_some_and(|implied| implied != entry.work_type)
        })
        .map(|entry| Violation::new(entry, None))
        .collect();
    CheckOutcome::from_violations(CheckKind::RatesMatchTypes, violations)
}

/// Each ledger entry must appear at least once in the scoped log.
pub fn check_ledger_in_log(ledger: &[LedgerEntry], scoped_log: &[&LogEntry]) -> CheckOutcome {
    let index = SignatureIndex::build(scoped_log.iter().copied());
    let violations = ledger
        .iter()
        .filter_map(|entry| {
            let found = index.count(&entry.signature());
            (found == 0).then(|| Violation::new(entry, Some(found)))
        })
        .collect();
    CheckOutcome::from_violations(CheckKind::LedgerEntriesInLog, violations)
}

/// Each scoped log entry must match exactly one ledger entry.
pub fn check_log_in_ledger(scoped_log: &[&LogEntry], ledger: &[LedgerEntry]) -> CheckOutcome {
    let index = SignatureIndex::build(ledger);
    let violations = scoped_log
        .iter()
        .filter_map(|entry| {
            let found = index.count(&entry.signature());
            (found != 1).then(|| Violation::new(*entry, Some(found)))
        })
        .collect();
    CheckOutcome::from_violations(CheckKind::LogEntriesInLedger, violations)
}
