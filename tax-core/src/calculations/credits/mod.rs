//! Credits, computed tentatively and then stacked against liability.
//!
//! Each credit module returns a [`TentativeCredit`]. [`apply_credits`] walks
//! them in [`CreditKind`] order, lets each nonrefundable amount consume what
//! is left of the tax, and converts unused child credit into the additional
//! child tax credit up to its own cap.

pub mod child;
pub mod dependent_care;
pub mod earned_income;
pub mod education;
pub mod energy;
pub mod foreign_tax;
pub mod minimum_tax;
pub mod premium_tax;
pub mod savers;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{min, non_negative, round_half_up, sum_money};
use crate::error::TaxEngineError;
use crate::models::{
    CalculationWarning, CreditAmount, CreditConfig, CreditInputs, CreditKind, TaxpayerProfile,
};

/// Figures from earlier passes that credits are keyed on.
#[derive(Debug, Clone, Copy)]
pub struct CreditContext<'a> {
    pub profile: &'a TaxpayerProfile,
    pub credits: &'a CreditInputs,
    pub agi: Decimal,
    /// AGI plus tax-exempt interest, for the premium tax credit.
    pub household_income: Decimal,
    pub earned_income: Decimal,
    pub taxpayer_earned_income: Decimal,
    pub spouse_earned_income: Decimal,
    pub investment_income: Decimal,
    pub taxable_income: Decimal,
    pub regular_tax: Decimal,
    pub tentative_minimum_tax: Decimal,
}

#[cfg(test)]
impl<'a> CreditContext<'a> {
    pub(crate) fn for_test(
        profile: &'a TaxpayerProfile,
        credits: &'a CreditInputs,
        agi: Decimal,
        earned_income: Decimal,
    ) -> Self {
        Self {
            profile,
            credits,
            agi,
            household_income: agi,
            earned_income,
            taxpayer_earned_income: earned_income,
            spouse_earned_income: earned_income,
            investment_income: Decimal::ZERO,
            taxable_income: Decimal::ZERO,
            regular_tax: Decimal::ZERO,
            tentative_minimum_tax: Decimal::ZERO,
        }
    }
}

/// A credit before it meets the tax it offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TentativeCredit {
    pub nonrefundable: Decimal,
    pub refundable: Decimal,
    /// How much of the nonrefundable amount left unused may be refunded instead.
    pub unused_refundable_cap: Decimal,
}

impl TentativeCredit {
    pub fn nonrefundable(amount: Decimal) -> Self {
        Self {
            nonrefundable: amount,
            ..Self::default()
        }
    }

    pub fn refundable(amount: Decimal) -> Self {
        Self {
            refundable: amount,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TentativeCredits {
    pub credits: BTreeMap<CreditKind, TentativeCredit>,
    /// Advance premium tax credit above the allowed credit; added to tax.
    pub excess_advance_repayment: Decimal,
    pub warnings: Vec<CalculationWarning>,
}

/// Computes every credit the return qualifies for. Zero credits are omitted.
///
/// # Errors
/// Missing per-status credit tables are a configuration error.
pub fn tentative_credits(
    ctx: &CreditContext<'_>,
    config: &CreditConfig,
) -> Result<TentativeCredits, TaxEngineError> {
    let mut result = TentativeCredits::default();
    let mut insert = |kind: CreditKind, credit: TentativeCredit| {
        if credit != TentativeCredit::default() {
            result.credits.insert(kind, credit);
        }
    };

    let foreign = foreign_tax::foreign_tax_credit(ctx, &config.foreign_tax)?;
    insert(CreditKind::ForeignTax, foreign.credit);
    insert(
        CreditKind::DependentCare,
        dependent_care::dependent_care_credit(ctx, &config.dependent_care),
    );
    let education = education::education_credits(ctx, &config.education)?;
    insert(CreditKind::AmericanOpportunity, education.american_opportunity);
    insert(CreditKind::LifetimeLearning, education.lifetime_learning);
    insert(CreditKind::Savers, savers::savers_credit(ctx, &config.savers)?);
    let child = child::child_credits(ctx, &config.child_tax_credit)?;
    insert(CreditKind::ChildTax, child.child_tax);
    insert(CreditKind::OtherDependent, child.other_dependent);
    insert(
        CreditKind::ResidentialCleanEnergy,
        energy::residential_clean_energy(ctx.credits, &config.energy),
    );
    insert(
        CreditKind::HomeImprovement,
        energy::home_improvement(ctx.credits, &config.energy),
    );
    insert(
        CreditKind::PriorYearMinimumTax,
        minimum_tax::minimum_tax_credit(
            ctx.credits.prior_year_minimum_tax_credit,
            ctx.regular_tax,
            ctx.tentative_minimum_tax,
        ),
    );
    insert(
        CreditKind::EarnedIncome,
        earned_income::earned_income_credit(ctx, &config.earned_income),
    );

    let mut excess_advance_repayment = Decimal::ZERO;
    if let Some(coverage) = &ctx.credits.marketplace {
        let ptc = premium_tax::reconcile(
            coverage,
            ctx.household_income,
            ctx.profile.filing_status,
            &config.premium_tax_credit,
        );
        insert(CreditKind::PremiumTax, TentativeCredit::refundable(ptc.net_credit));
        excess_advance_repayment = ptc.excess_advance_repayment;
    }

    result.excess_advance_repayment = excess_advance_repayment;
    if foreign.disallowed > Decimal::ZERO {
        result.warnings.push(CalculationWarning::ForeignTaxCreditLimited {
            disallowed: foreign.disallowed,
        });
    }
    Ok(result)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreditStack {
    pub amounts: BTreeMap<CreditKind, CreditAmount>,
    pub nonrefundable_total: Decimal,
    pub refundable_total: Decimal,
}

/// Applies nonrefundable credits in order until the tax is exhausted.
///
/// # Errors
/// [`TaxEngineError::ArithmeticInvariant`] if the applied nonrefundable
/// credits would exceed the tax they offset.
pub fn apply_credits(
    tentatives: &BTreeMap<CreditKind, TentativeCredit>,
    tax_before_credits: Decimal,
) -> Result<CreditStack, TaxEngineError> {
    let liability = non_negative(tax_before_credits);
    let mut remaining = liability;
    let mut amounts = BTreeMap::new();

    for (&kind, credit) in tentatives {
        let applied = min(non_negative(credit.nonrefundable), remaining);
        remaining -= applied;

        let unused = credit.nonrefundable - applied;
        let converted = non_negative(min(unused, credit.unused_refundable_cap));
        let refundable = round_half_up(credit.refundable + converted);

        debug!(
            credit = kind.key(),
            tentative = %credit.nonrefundable,
            applied = %applied,
            refundable = %refundable,
            "credit applied"
        );

        amounts.insert(kind, CreditAmount {
            tentative: credit.nonrefundable,
            nonrefundable: applied,
            refundable,
        });
    }

    let nonrefundable_total = sum_money(amounts.values().map(|a| a.nonrefundable));
    let refundable_total = sum_money(amounts.values().map(|a| a.refundable));
    if nonrefundable_total > liability {
        return Err(TaxEngineError::ArithmeticInvariant(format!(
            "nonrefundable credits {nonrefundable_total} exceed tax before credits {liability}"
        )));
    }

    Ok(CreditStack {
        amounts,
        nonrefundable_total,
        refundable_total,
    })
}
