//! Child tax credit, credit for other dependents, and the additional child tax credit.
//!
//! Both credits share one phase-out: $50 for each $1,000, or fraction of
//! $1,000, of AGI over the threshold. The reduction consumes the child credit
//! before the other-dependent credit.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{ceil_steps, min, non_negative, round_half_up};
use crate::error::TaxEngineError;
use crate::models::ChildTaxCreditConfig;

use super::{CreditContext, TentativeCredit};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildCredits {
    pub child_tax: TentativeCredit,
    pub other_dependent: TentativeCredit,
}

/// # Errors
/// A missing phase-out threshold for the filing status is a configuration error.
pub fn child_credits(
    ctx: &CreditContext<'_>,
    config: &ChildTaxCreditConfig,
) -> Result<ChildCredits, TaxEngineError> {
    let dependents = &ctx.profile.dependents;
    let children = dependents
        .iter()
        .filter(|d| d.ctc_qualifying(config.max_child_age))
        .count();
    let others = dependents.len() - children;
    if dependents.is_empty() {
        return Ok(ChildCredits::default());
    }

    let threshold = config
        .phase_out_threshold
        .value(ctx.profile.filing_status, "credits.child_tax_credit.phase_out_threshold")?;
    let reduction =
        ceil_steps(ctx.agi - threshold, config.phase_out_step) * config.phase_out_per_step;

    let child_total = Decimal::from(children) * config.per_child;
    let other_total = Decimal::from(others) * config.per_other_dependent;
    let child_allowed = non_negative(child_total - reduction);
    let other_allowed = non_negative(other_total - non_negative(reduction - child_total));

    let refundable_cap = min(
        Decimal::from(children) * config.refundable_per_child,
        non_negative(ctx.earned_income - config.refundable_earned_income_floor)
            * config.refundable_rate,
    );

    debug!(
        children,
        others,
        reduction = %reduction,
        child_allowed = %child_allowed,
        other_allowed = %other_allowed,
        "child tax credit"
    );

    Ok(ChildCredits {
        child_tax: TentativeCredit {
            nonrefundable: round_half_up(child_allowed),
            unused_refundable_cap: round_half_up(refundable_cap),
            ..TentativeCredit::default()
        },
        other_dependent: TentativeCredit::nonrefundable(round_half_up(other_allowed)),
    })
}
