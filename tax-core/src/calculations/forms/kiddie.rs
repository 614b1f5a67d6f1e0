//! Tax on a child's unearned income at the parent's rate (Form 8615).
//!
//! Net unearned income above twice the threshold has already been taxed at
//! the child's own marginal rate; this adds the difference up to the
//! parent's rate.

use rust_decimal::Decimal;

use crate::calculations::common::{min, non_negative, round_half_up};
use crate::error::TaxEngineError;
use crate::models::{FormConfig, FormOutcome, KiddieTax};

use super::TaxPhaseContext;

/// # Errors
/// [`TaxEngineError::ArithmeticInvariant`] when taxable income or the
/// marginal rate has not been finalized yet.
pub fn evaluate(
    record: &KiddieTax,
    ctx: &TaxPhaseContext,
    config: &FormConfig,
) -> Result<FormOutcome, TaxEngineError> {
    let taxable_income = ctx.taxable_income()?;
    let child_rate = ctx.marginal_rate()?;

    let excess = min(
        non_negative(record.net_unearned_income - config.kiddie_unearned_threshold * Decimal::TWO),
        non_negative(taxable_income),
    );
    let rate_gap = non_negative(record.parent_marginal_rate - child_rate);

    Ok(FormOutcome {
        additional_tax: round_half_up(excess * rate_gap),
        ..FormOutcome::default()
    })
}
