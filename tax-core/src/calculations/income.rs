//! Gross income and adjustments to income.
//!
//! The IRA deduction and the student loan interest deduction each phase out
//! against their own modified AGI, and each MAGI excludes the deductions that
//! depend on it:
//!
//! | Deduction | MAGI |
//! |-----------|------|
//! | Traditional IRA | gross income − every other adjustment |
//! | Student loan interest | IRA MAGI − IRA deduction |
//! | Roth eligibility (reported, not deducted) | AGI |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{
    max, min, non_negative, phase_out_ratio, round_half_up, round_up_to_multiple, sum_money,
};
use crate::error::TaxEngineError;
use crate::models::{
    AdjustmentConfig, Adjustments, FilingStatus, IncomeSources, RetirementConfig,
    TaxpayerProfile,
};

/// Income figures resolved by earlier passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedIncome {
    pub taxable_social_security: Decimal,
    pub capital_gain_included: Decimal,
    pub form_income: Decimal,
}

/// Total income (Form 1040 line 9).
pub fn gross_income(
    income: &IncomeSources,
    resolved: ResolvedIncome,
) -> Decimal {
    sum_money([
        income.total_wages(),
        income.taxable_interest,
        income.ordinary_dividends,
        income.net_self_employment_profit(),
        income.crp_payments,
        income.partnership_ordinary_income(),
        resolved.taxable_social_security,
        resolved.capital_gain_included,
        income.unemployment_compensation,
        income.total_gambling_winnings(),
        income.alimony_received,
        income.other_income,
        resolved.form_income,
    ])
}

/// Every adjustment that does not depend on a MAGI, including half of SE tax.
pub fn base_adjustments(
    adjustments: &Adjustments,
    se_tax_deduction: Decimal,
    config: &AdjustmentConfig,
) -> Decimal {
    sum_money([
        min(adjustments.educator_expenses, config.educator_expense_limit),
        adjustments.hsa_deduction,
        adjustments.self_employed_health_insurance,
        adjustments.self_employed_retirement,
        adjustments.alimony_paid,
        adjustments.other_adjustments,
        se_tax_deduction,
    ])
}

/// Annual IRA contribution limit including the catch-up.
pub fn contribution_limit(
    age: u32,
    config: &RetirementConfig,
) -> Decimal {
    if age >= config.catch_up_age {
        config.ira_contribution_limit + config.ira_catch_up
    } else {
        config.ira_contribution_limit
    }
}

/// Limit remaining after a phase-out at `ratio`.
///
/// A partially reduced limit is rounded up to the next multiple and never
/// drops below the minimum until the phase-out is complete.
pub fn reduced_limit(
    limit: Decimal,
    ratio: Decimal,
    config: &RetirementConfig,
) -> Decimal {
    if ratio.is_zero() {
        return limit;
    }
    if ratio >= Decimal::ONE {
        return Decimal::ZERO;
    }
    let reduced = round_up_to_multiple(limit * (Decimal::ONE - ratio), config.reduced_limit_multiple);
    min(limit, max(reduced, config.reduced_limit_minimum))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IraDeduction {
    pub taxpayer: Decimal,
    pub spouse: Decimal,
}

impl IraDeduction {
    pub fn total(&self) -> Decimal {
        self.taxpayer + self.spouse
    }
}

fn ira_band(
    covered: bool,
    other_covered: bool,
    status: FilingStatus,
    config: &RetirementConfig,
) -> Result<Option<(Decimal, Decimal)>, TaxEngineError> {
    if covered {
        let band = config
            .ira_covered_phase_out
            .value(status, "retirement.ira_covered_phase_out")?;
        return Ok(Some((band.start, band.end)));
    }
    if other_covered && status.is_joint() {
        let band = config.ira_spouse_covered_phase_out;
        return Ok(Some((band.start, band.end)));
    }
    if other_covered && status == FilingStatus::MarriedFilingSeparately {
        let band = config
            .ira_covered_phase_out
            .value(status, "retirement.ira_covered_phase_out")?;
        return Ok(Some((band.start, band.end)));
    }
    Ok(None)
}

/// Traditional IRA deduction for each spouse.
///
/// # Errors
/// Missing phase-out bands for the filing status are a configuration error.
pub fn ira_deduction(
    adjustments: &Adjustments,
    profile: &TaxpayerProfile,
    magi: Decimal,
    config: &RetirementConfig,
) -> Result<IraDeduction, TaxEngineError> {
    let status = profile.filing_status;

    let person = |contribution: Decimal,
                  age: u32,
                  covered: bool,
                  other_covered: bool|
     -> Result<Decimal, TaxEngineError> {
        if contribution <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        let limit = contribution_limit(age, config);
        let allowed = match ira_band(covered, other_covered, status, config)? {
            Some((start, end)) => reduced_limit(limit, phase_out_ratio(magi, start, end), config),
            None => limit,
        };
        Ok(round_half_up(min(contribution, allowed)))
    };

    let taxpayer = person(
        adjustments.ira_contributions,
        profile.taxpayer_age,
        profile.taxpayer_covered_by_workplace_plan,
        profile.spouse_covered_by_workplace_plan,
    )?;
    let spouse = if status.is_joint() {
        person(
            adjustments.spouse_ira_contributions,
            profile.spouse_age.unwrap_or_default(),
            profile.spouse_covered_by_workplace_plan,
            profile.taxpayer_covered_by_workplace_plan,
        )?
    } else {
        Decimal::ZERO
    };

    debug!(magi = %magi, taxpayer = %taxpayer, spouse = %spouse, "ira deduction");
    Ok(IraDeduction { taxpayer, spouse })
}

/// Largest Roth IRA contribution the taxpayer may make at `magi`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::income::roth_eligible_contribution;
/// use tax_core::models::{FilingStatus, YearConfig};
///
/// let config = YearConfig::tax_year_2025();
/// let eligible =
///     roth_eligible_contribution(40, dec!(157500), FilingStatus::Single, &config.retirement)
///         .unwrap();
///
/// assert_eq!(eligible, dec!(3500.00));
/// ```
///
/// # Errors
/// A missing Roth band for the filing status is a configuration error.
pub fn roth_eligible_contribution(
    age: u32,
    magi: Decimal,
    status: FilingStatus,
    config: &RetirementConfig,
) -> Result<Decimal, TaxEngineError> {
    let band = config
        .roth_phase_out
        .value(status, "retirement.roth_phase_out")?;
    let limit = contribution_limit(age, config);
    let ratio = phase_out_ratio(magi, band.start, band.end);
    Ok(round_half_up(reduced_limit(limit, ratio, config)))
}

/// # Errors
/// A missing phase-out band for the filing status is a configuration error.
pub fn student_loan_interest_deduction(
    interest_paid: Decimal,
    magi: Decimal,
    status: FilingStatus,
    config: &AdjustmentConfig,
) -> Result<Decimal, TaxEngineError> {
    if status == FilingStatus::MarriedFilingSeparately || interest_paid <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    let band = config
        .student_loan_phase_out
        .value(status, "adjustments.student_loan_phase_out")?;
    let capped = min(interest_paid, config.student_loan_interest_limit);
    let ratio = phase_out_ratio(magi, band.start, band.end);
    Ok(round_half_up(non_negative(capped * (Decimal::ONE - ratio))))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{W2, YearConfig};

    fn retirement() -> RetirementConfig {
        YearConfig::tax_year_2025().retirement
    }

    // =========================================================================
    // gross income
    // =========================================================================

    #[test]
    fn gross_income_sums_every_source() {
        let income = IncomeSources {
            w2: vec![W2 {
                wages: dec!(50000),
                ..W2::default()
            }],
            taxable_interest: dec!(100.005),
            ordinary_dividends: dec!(200),
            business_net_profit: dec!(-1000),
            unemployment_compensation: dec!(300),
            ..IncomeSources::default()
        };

        let total = gross_income(
            &income,
            ResolvedIncome {
                taxable_social_security: dec!(0),
                capital_gain_included: dec!(-3000),
                form_income: dec!(500),
            },
        );

        assert_eq!(total, dec!(47100.01));
    }

    #[test]
    fn base_adjustments_cap_educator_expenses() {
        let adjustments = Adjustments {
            educator_expenses: dec!(450),
            hsa_deduction: dec!(1000),
            ..Adjustments::default()
        };

        let total = base_adjustments(
            &adjustments,
            dec!(706.50),
            &YearConfig::tax_year_2025().adjustments,
        );

        assert_eq!(total, dec!(2006.50));
    }

    // =========================================================================
    // IRA and Roth limits
    // =========================================================================

    #[test]
    fn roth_midpoint_halves_the_limit() {
        let eligible =
            roth_eligible_contribution(35, dec!(157500), FilingStatus::Single, &retirement())
                .unwrap();

        assert_eq!(eligible, dec!(3500.00));
    }

    #[test]
    fn roth_reduced_limit_rounds_up_to_ten() {
        // 7000 × (1 − 1000/15000) = 6533.33 → 6540
        let eligible =
            roth_eligible_contribution(35, dec!(151000), FilingStatus::Single, &retirement())
                .unwrap();

        assert_eq!(eligible, dec!(6540.00));
    }

    #[test]
    fn roth_minimum_applies_near_end_of_band() {
        let eligible =
            roth_eligible_contribution(35, dec!(164900), FilingStatus::Single, &retirement())
                .unwrap();

        assert_eq!(eligible, dec!(200.00));
    }

    #[test]
    fn roth_zero_past_band_and_catch_up_before_it() {
        let config = retirement();

        assert_eq!(
            roth_eligible_contribution(35, dec!(165000), FilingStatus::Single, &config).unwrap(),
            dec!(0)
        );
        assert_eq!(
            roth_eligible_contribution(55, dec!(100000), FilingStatus::Single, &config).unwrap(),
            dec!(8000.00)
        );
    }

    #[test]
    fn ira_not_limited_without_workplace_plan() {
        let profile = TaxpayerProfile {
            taxpayer_age: 40,
            ..TaxpayerProfile::default()
        };
        let adjustments = Adjustments {
            ira_contributions: dec!(7000),
            ..Adjustments::default()
        };

        let result = ira_deduction(&adjustments, &profile, dec!(500000), &retirement()).unwrap();

        assert_eq!(result.total(), dec!(7000.00));
    }

    #[test]
    fn ira_phased_out_for_covered_taxpayer() {
        let profile = TaxpayerProfile {
            taxpayer_age: 40,
            taxpayer_covered_by_workplace_plan: true,
            ..TaxpayerProfile::default()
        };
        let adjustments = Adjustments {
            ira_contributions: dec!(7000),
            ..Adjustments::default()
        };

        let result = ira_deduction(&adjustments, &profile, dec!(84000), &retirement()).unwrap();

        assert_eq!(result.taxpayer, dec!(3500.00));
    }

    #[test]
    fn ira_spouse_band_when_only_spouse_covered() {
        let profile = TaxpayerProfile {
            filing_status: FilingStatus::MarriedFilingJointly,
            taxpayer_age: 40,
            spouse_age: Some(40),
            spouse_covered_by_workplace_plan: true,
            ..TaxpayerProfile::default()
        };
        let adjustments = Adjustments {
            ira_contributions: dec!(7000),
            spouse_ira_contributions: dec!(7000),
            ..Adjustments::default()
        };

        let result = ira_deduction(&adjustments, &profile, dec!(200000), &retirement()).unwrap();

        // taxpayer uses the 236000 band (unreduced); spouse the covered band (gone)
        assert_eq!(result.taxpayer, dec!(7000.00));
        assert_eq!(result.spouse, dec!(0));
    }

    // =========================================================================
    // student loan interest
    // =========================================================================

    #[test]
    fn student_loan_capped_and_phased() {
        let config = YearConfig::tax_year_2025().adjustments;

        assert_eq!(
            student_loan_interest_deduction(dec!(4000), dec!(60000), FilingStatus::Single, &config)
                .unwrap(),
            dec!(2500.00)
        );
        assert_eq!(
            student_loan_interest_deduction(dec!(2000), dec!(92500), FilingStatus::Single, &config)
                .unwrap(),
            dec!(1000.00)
        );
    }

    #[test]
    fn student_loan_not_allowed_when_filing_separately() {
        let config = YearConfig::tax_year_2025().adjustments;

        let result = student_loan_interest_deduction(
            dec!(2000),
            dec!(10000),
            FilingStatus::MarriedFilingSeparately,
            &config,
        )
        .unwrap();

        assert_eq!(result, dec!(0));
    }
}
