//! Retirement savings contributions credit (Form 8880).

use rust_decimal::Decimal;

use crate::calculations::common::{min, round_half_up};
use crate::error::TaxEngineError;
use crate::models::SaversCreditConfig;

use super::{CreditContext, TentativeCredit};

/// # Errors
/// A missing tier table for the filing status is a configuration error.
pub fn savers_credit(
    ctx: &CreditContext<'_>,
    config: &SaversCreditConfig,
) -> Result<TentativeCredit, TaxEngineError> {
    if ctx.profile.can_be_claimed_as_dependent {
        return Ok(TentativeCredit::default());
    }
    let status = ctx.profile.filing_status;
    let tiers = config.tiers.require(status, "credits.savers.tiers")?;

    let Some(rate) = tiers
        .iter()
        .find(|tier| ctx.agi <= tier.agi_ceiling)
        .map(|tier| tier.rate)
    else {
        return Ok(TentativeCredit::default());
    };

    let taxpayer = min(ctx.credits.retirement_contributions_taxpayer, config.contribution_cap);
    let spouse = if status.is_joint() {
        min(ctx.credits.retirement_contributions_spouse, config.contribution_cap)
    } else {
        Decimal::ZERO
    };

    Ok(TentativeCredit::nonrefundable(round_half_up(
        (taxpayer + spouse) * rate,
    )))
}
