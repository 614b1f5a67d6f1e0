//! American opportunity and lifetime learning credits (Form 8863).

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{min, non_negative, phase_out_ratio, round_half_up};
use crate::error::TaxEngineError;
use crate::models::{EducationCreditConfig, FilingStatus};

use super::{CreditContext, TentativeCredit};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EducationCredits {
    pub american_opportunity: TentativeCredit,
    pub lifetime_learning: TentativeCredit,
}

fn american_opportunity_per_student(
    expenses: Decimal,
    config: &EducationCreditConfig,
) -> Decimal {
    let full = min(expenses, config.aotc_full_rate_expenses);
    let partial = min(non_negative(expenses - full), config.aotc_partial_rate_expenses);
    full + partial * config.aotc_partial_rate
}

/// # Errors
/// A missing phase-out band for the filing status is a configuration error.
pub fn education_credits(
    ctx: &CreditContext<'_>,
    config: &EducationCreditConfig,
) -> Result<EducationCredits, TaxEngineError> {
    let status = ctx.profile.filing_status;
    if status == FilingStatus::MarriedFilingSeparately || ctx.credits.education.is_empty() {
        return Ok(EducationCredits::default());
    }

    let band = config
        .phase_out
        .value(status, "credits.education.phase_out")?;
    let retained = Decimal::ONE - phase_out_ratio(ctx.agi, band.start, band.end);

    let aotc: Decimal = ctx
        .credits
        .education
        .iter()
        .filter(|e| e.american_opportunity)
        .map(|e| american_opportunity_per_student(e.qualified_expenses, config))
        .sum();
    let llc_expenses: Decimal = ctx
        .credits
        .education
        .iter()
        .filter(|e| !e.american_opportunity)
        .map(|e| e.qualified_expenses)
        .sum();

    let aotc = round_half_up(aotc * retained);
    let aotc_refundable = if ctx.profile.can_be_claimed_as_dependent {
        Decimal::ZERO
    } else {
        round_half_up(aotc * config.aotc_refundable_rate)
    };
    let llc = round_half_up(min(llc_expenses, config.llc_expense_limit) * config.llc_rate * retained);

    debug!(aotc = %aotc, llc = %llc, retained = %retained, "education credits");

    Ok(EducationCredits {
        american_opportunity: TentativeCredit {
            nonrefundable: aotc - aotc_refundable,
            refundable: aotc_refundable,
            ..TentativeCredit::default()
        },
        lifetime_learning: TentativeCredit::nonrefundable(llc),
    })
}
