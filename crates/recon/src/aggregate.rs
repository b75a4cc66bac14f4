use crate::config::TotalsConfig;
use crate::model::{LedgerEntry, Rate, Totals, WorkType};

/// `word_count × rate` summed over entries of one work type, in cents.
///
/// Products are summed exactly in ten-thousandths and the sum is rounded
/// once, half away from zero, to two decimals. An entry without a numeric
/// rate contributes nothing.
pub fn subtotal_cents(ledger: &[LedgerEntry], work_type: &WorkType) -> i64 {
    let exact: u128 = ledger
        .iter()
        .filter(|e| &e.work_type == work_type)
        .filter_map(|e| {
            let rate = e.rate?;
            Some(u128::from(e.word_count.get()) * u128::from(rate.ten_thousandths()))
        })
        .sum();
    ten_thousandths_to_cents(exact)
}

fn ten_thousandths_to_cents(value: u128) -> i64 {
    let per_cent = u128::from(Rate::SCALE / 100);
    let cents = (value + per_cent / 2) / per_cent;
    i64::try_from(cents).unwrap_or(i64::MAX)
}

/// Number of ledger entries of one work type.
pub fn count_of(ledger: &[LedgerEntry], work_type: &WorkType) -> usize {
    ledger.iter().filter(|e| &e.work_type == work_type).count()
}

/// Per-type subtotals plus the fixed fee, and the annual projection.
/// Entries of unknown type are in neither subtotal.
pub fn compute_totals(ledger: &[LedgerEntry], config: &TotalsConfig) -> Totals {
    let translation_cents = subtotal_cents(ledger, &WorkType::Translation);
    let check_cents = subtotal_cents(ledger, &WorkType::Check);
    let fixed_fee_cents = config.fixed_fee_cents();
    let period_total_cents = translation_cents
        .saturating_add(check_cents)
        .saturating_add(fixed_fee_cents);

    Totals {
        translation_cents,
        check_cents,
        fixed_fee_cents,
        period_total_cents,
        annualized_cents: period_total_cents.saturating_mul(i64::from(config.periods_per_year)),
    }
}
