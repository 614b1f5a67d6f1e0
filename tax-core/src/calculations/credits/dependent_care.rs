//! Child and dependent care credit (Form 2441).

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{ceil_steps, max, min, non_negative, round_half_up};
use crate::models::DependentCareConfig;

use super::{CreditContext, TentativeCredit};

/// Credit rate at `agi`: the maximum less one step per increment, or
/// fraction of one, over the threshold, never below the minimum.
pub fn credit_rate(
    agi: Decimal,
    config: &DependentCareConfig,
) -> Decimal {
    let steps = ceil_steps(agi - config.agi_threshold, config.agi_step);
    max(config.min_rate, config.max_rate - steps * config.rate_step)
}

pub fn dependent_care_credit(
    ctx: &CreditContext<'_>,
    config: &DependentCareConfig,
) -> TentativeCredit {
    let persons = ctx.credits.dependent_care_qualifying_persons;
    if persons == 0 {
        return TentativeCredit::default();
    }

    let cap = if persons == 1 {
        config.one_person_cap
    } else {
        config.two_or_more_cap
    };
    let earned_limit = if ctx.profile.filing_status.is_joint() {
        min(ctx.taxpayer_earned_income, ctx.spouse_earned_income)
    } else {
        ctx.taxpayer_earned_income
    };
    let qualifying = min(
        min(ctx.credits.dependent_care_expenses, cap),
        non_negative(earned_limit),
    );
    let rate = credit_rate(ctx.agi, config);
    let credit = round_half_up(qualifying * rate);

    debug!(qualifying = %qualifying, rate = %rate, credit = %credit, "dependent care credit");
    TentativeCredit::nonrefundable(credit)
}
