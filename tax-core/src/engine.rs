//! The orchestrating engine.
//!
//! [`TaxEngine::calculate`] runs a fixed pass sequence. Each pass reads raw
//! input plus the results of strictly earlier passes:
//!
//! | Pass | Produces |
//! |------|----------|
//! | Social Security taxability | taxable benefits |
//! | Self-employment tax | SE tax and its deductible half |
//! | Income-phase forms | form income against the preliminary AGI |
//! | Capital netting | included gain or allowed loss, carryforwards |
//! | Adjustments | IRA and student loan deductions, AGI |
//! | Deductions and QBI | taxable income |
//! | Income split and brackets | ordinary and preferential tax |
//! | Surtaxes and AMT | additional Medicare tax, NIIT, AMT |
//! | Tax-phase forms | standalone additional taxes |
//! | Credits | nonrefundable and refundable amounts |
//! | Reconciliation and penalty | refund or balance due, underpayment penalty |
//! | Rates | effective and marginal rate |
//!
//! The caller's [`TaxReturnInput`] is only ever borrowed immutably. Figures
//! that later passes need adjusted (the SE tax deduction, resolved Social
//! Security, form income) are carried as pass results instead of being
//! written back into the input.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::brackets::{marginal_rate, ordinary_tax, preferential_tax};
use crate::calculations::common::{
    min, non_negative, round_half_up, round_rate, safe_ratio, sum_money,
};
use crate::calculations::credits::{CreditContext, apply_credits, tentative_credits};
use crate::calculations::deductions::{choose_deduction, itemized_deduction, standard_deduction};
use crate::calculations::forms::{self, IncomePhaseContext, TaxPhaseContext};
use crate::calculations::income::{
    ResolvedIncome, base_adjustments, gross_income, ira_deduction, roth_eligible_contribution,
    student_loan_interest_deduction,
};
use crate::calculations::surtaxes::{additional_medicare_tax, net_investment_income_tax};
use crate::calculations::worksheets::{
    AmtInput, CapitalGainResult, SeWorksheet, SeWorksheetConfig, SeWorksheetInput,
    SeWorksheetResult, UnderpaymentWorksheet, UnderpaymentWorksheetConfig,
    UnderpaymentWorksheetInput, alternative_minimum_tax, net_capital_gains, qbi_deduction,
    taxable_benefits,
};
use crate::error::TaxEngineError;
use crate::models::{
    CalculationResult, CalculationWarning, FilingStatus, FormKind, IncomeSources, Person,
    TaxReturnInput, YearConfig,
};

/// Computes federal liability for returns of one tax year.
///
/// The engine holds nothing but a shared handle to its [`YearConfig`], so
/// one instance can serve any number of threads.
///
/// ```
/// use std::sync::Arc;
///
/// use rust_decimal_macros::dec;
/// use tax_core::engine::TaxEngine;
/// use tax_core::models::{FilingStatus, TaxReturnInput, W2, YearConfig};
///
/// let engine = TaxEngine::new(Arc::new(YearConfig::tax_year_2025()));
///
/// let mut input = TaxReturnInput::new(2025, FilingStatus::Single);
/// input.income.w2.push(W2 {
///     wages: dec!(25750),
///     ..W2::default()
/// });
///
/// let result = engine.calculate(&input).unwrap();
///
/// // 25750 − 15750 standard deduction
/// assert_eq!(result.taxable_income, dec!(10000.00));
/// assert_eq!(result.ordinary_tax, dec!(1000.00));
/// ```
#[derive(Debug, Clone)]
pub struct TaxEngine {
    config: Arc<YearConfig>,
}

impl TaxEngine {
    pub fn new(config: Arc<YearConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &YearConfig {
        &self.config
    }

    /// Runs every pass and returns the complete breakdown.
    ///
    /// # Errors
    ///
    /// * [`TaxEngineError::Input`] when the return fails validation or is
    ///   for a different year than the engine's configuration.
    /// * [`TaxEngineError::Configuration`] when a table the return needs is
    ///   missing for its filing status.
    /// * [`TaxEngineError::ArithmeticInvariant`] when an internal
    ///   consistency check fails; no partial result is returned.
    pub fn calculate(
        &self,
        input: &TaxReturnInput,
    ) -> Result<CalculationResult, TaxEngineError> {
        input.validate()?;
        if input.tax_year != self.config.tax_year {
            return Err(TaxEngineError::input(
                "tax_year",
                format!(
                    "return is for {} but the engine is configured for {}",
                    input.tax_year, self.config.tax_year
                ),
            ));
        }

        let config = &*self.config;
        let profile = &input.profile;
        let income = &input.income;
        let status = profile.filing_status;
        let brackets = config.brackets_for(status)?;
        let mut warnings = Vec::new();

        // Social Security taxability, before anything that depends on gross income
        let taxable_social_security = self.taxable_social_security(input)?;

        // Self-employment tax; half of it is an adjustment to income
        let se = self.self_employment(income)?;
        if se.below_threshold && se.net_earnings > Decimal::ZERO {
            warnings.push(CalculationWarning::SelfEmploymentBelowThreshold {
                net_earnings: round_half_up(se.net_earnings),
            });
        }

        // Preliminary AGI: no form income and no MAGI-dependent adjustments
        let base_adjustment =
            base_adjustments(&input.adjustments, se.se_tax_deduction, &config.adjustments);
        let transaction_capital = self.capital(income, status, Decimal::ZERO)?;
        let preliminary_agi = gross_income(income, ResolvedIncome {
            taxable_social_security,
            capital_gain_included: transaction_capital.included,
            form_income: Decimal::ZERO,
        }) - base_adjustment;

        let income_forms = forms::income_phase(
            &input.forms,
            &IncomePhaseContext {
                status,
                preliminary_agi,
            },
            &config.forms,
        )?;
        warnings.extend(income_forms.warnings.iter().cloned());

        let capital = self.capital(income, status, income_forms.long_term_gain())?;
        let form_income = income_forms.ordinary_income();
        let gross = gross_income(income, ResolvedIncome {
            taxable_social_security,
            capital_gain_included: capital.included,
            form_income,
        });

        // Adjustments, each against its own MAGI
        let ira_magi = gross - base_adjustment;
        let ira = ira_deduction(&input.adjustments, profile, ira_magi, &config.retirement)?;
        let student_loan = student_loan_interest_deduction(
            input.adjustments.student_loan_interest,
            ira_magi - ira.total(),
            status,
            &config.adjustments,
        )?;
        let total_adjustments = sum_money([base_adjustment, ira.total(), student_loan]);
        let agi = round_half_up(gross - total_adjustments);
        let roth =
            roth_eligible_contribution(profile.taxpayer_age, agi, status, &config.retirement)?;

        debug!(
            gross_income = %gross,
            adjustments = %total_adjustments,
            agi = %agi,
            "adjusted gross income"
        );

        // Deductions
        let standard = standard_deduction(profile, income.earned_income(), &config.standard_deduction)?;
        let itemized = itemized_deduction(
            &input.itemized,
            agi,
            income.total_gambling_winnings(),
            status,
            &config.itemized,
        )?;
        let deduction = choose_deduction(standard, itemized, profile.must_itemize);
        let taxable_income_before_qbi = round_half_up(non_negative(agi - deduction.taken));

        let qbi = qbi_deduction(
            taxable_income_before_qbi,
            capital.net_capital_gain + income.qualified_dividends,
            status,
            &income.business_activities,
            &config.qbi,
        )?;
        warnings.extend(qbi.warnings.iter().cloned());
        let taxable_income = round_half_up(non_negative(taxable_income_before_qbi - qbi.deduction));

        // Income split and regular tax
        let preferential_income = round_half_up(min(
            non_negative(income.qualified_dividends + capital.net_capital_gain),
            taxable_income,
        ));
        let ordinary_income = taxable_income - preferential_income;
        let ordinary = ordinary_tax(ordinary_income, brackets);
        let preferential = preferential_tax(
            ordinary_income,
            preferential_income,
            status,
            brackets,
            config.preferential.as_ref(),
        )?;
        if preferential.used_ordinary_fallback {
            warnings.push(CalculationWarning::PreferentialRatesMissing);
        }
        let regular_tax = sum_money([ordinary.tax, preferential.tax]);

        // Surtaxes
        let se_net_earnings = if se.below_threshold {
            Decimal::ZERO
        } else {
            se.net_earnings
        };
        let additional_medicare =
            additional_medicare_tax(income.medicare_wages(), se_net_earnings, status, &config.surtaxes)?;
        let passive_income = income_forms
            .outcomes
            .get(&FormKind::PassiveActivities)
            .map_or(Decimal::ZERO, |outcome| non_negative(outcome.ordinary_income));
        let investment_income = sum_money([
            income.taxable_interest,
            income.ordinary_dividends,
            non_negative(capital.included),
            passive_income,
        ]);
        let niit = net_investment_income_tax(investment_income, agi, status, &config.surtaxes)?;

        // Alternative minimum tax
        let amt = alternative_minimum_tax(
            &AmtInput {
                taxable_income,
                salt_addback: if deduction.itemize {
                    deduction.itemized.taxes
                } else {
                    Decimal::ZERO
                },
                adjustments: sum_money([
                    input.amt.private_activity_bond_interest,
                    input.amt.loss_limitation_adjustment,
                    input.amt.other_preferences,
                    income_forms.amt_adjustment(),
                ]),
                regular_tax,
            },
            status,
            &config.amt,
        )?;

        // Tax-phase forms see the finalized figures
        let marginal = marginal_rate(taxable_income, brackets);
        let tax_forms = forms::tax_phase(
            &input.forms,
            &TaxPhaseContext {
                agi: Some(agi),
                taxable_income: Some(taxable_income),
                marginal_rate: Some(marginal),
            },
            &config.forms,
        )?;
        let form_additional_tax =
            sum_money([income_forms.additional_tax(), tax_forms.additional_tax()]);

        let total_tax_before_credits = sum_money([
            ordinary.tax,
            preferential.tax,
            se.self_employment_tax,
            additional_medicare,
            niit,
            amt.alternative_minimum_tax,
            form_additional_tax,
        ]);

        // Credits
        let se_earned = non_negative(income.net_self_employment_profit() + income.partnership_se_earnings());
        let ctx = CreditContext {
            profile,
            credits: &input.credits,
            agi,
            household_income: agi + income.tax_exempt_interest,
            earned_income: income.earned_income(),
            taxpayer_earned_income: income.wages_of(Person::Taxpayer) + se_earned,
            spouse_earned_income: income.wages_of(Person::Spouse),
            investment_income: sum_money([
                income.taxable_interest,
                income.tax_exempt_interest,
                income.ordinary_dividends,
                non_negative(capital.included),
            ]),
            taxable_income,
            regular_tax,
            tentative_minimum_tax: amt.tentative_minimum_tax,
        };
        let tentatives = tentative_credits(&ctx, &config.credits)?;
        warnings.extend(tentatives.warnings.iter().cloned());
        let stack = apply_credits(&tentatives.credits, total_tax_before_credits)?;

        // Reconciliation
        let total_tax = round_half_up(
            total_tax_before_credits - stack.nonrefundable_total
                + tentatives.excess_advance_repayment,
        );
        if total_tax < Decimal::ZERO {
            return Err(TaxEngineError::ArithmeticInvariant(format!(
                "total tax {total_tax} is negative"
            )));
        }

        let withholding = round_half_up(income.federal_withholding());
        let excess_ss = self.excess_social_security_withholding(income);
        let estimated_payments = round_half_up(input.payments.estimated_payments);
        let extension_payment = round_half_up(input.payments.extension_payment);
        let total_payments =
            sum_money([withholding, estimated_payments, extension_payment, excess_ss]);
        let balance = total_tax - stack.refundable_total - total_payments;

        // Underpayment penalty; the extension payment is made after the due dates
        let penalty = UnderpaymentWorksheet::new(UnderpaymentWorksheetConfig::from_year_config(
            config, status,
        )?)
        .calculate(&UnderpaymentWorksheetInput {
            current_year_tax: non_negative(total_tax - stack.refundable_total),
            prior_year_tax: input.payments.prior_year_tax,
            prior_year_agi: input.payments.prior_year_agi,
            is_farmer_or_fisher: profile.is_farmer_or_fisher,
            payments: sum_money([withholding, estimated_payments, excess_ss]),
        })?;

        let effective_rate = if agi > Decimal::ZERO {
            round_rate(safe_ratio(total_tax, agi))
        } else {
            Decimal::ZERO
        };

        debug!(
            taxable_income = %taxable_income,
            total_tax_before_credits = %total_tax_before_credits,
            total_tax = %total_tax,
            balance = %balance,
            "calculation complete"
        );

        let mut form_outcomes = income_forms.outcomes;
        form_outcomes.extend(tax_forms.outcomes);

        Ok(CalculationResult {
            tax_year: input.tax_year,
            filing_status: status,

            total_wages: round_half_up(income.total_wages()),
            taxable_social_security,
            net_self_employment_earnings: round_half_up(se.net_earnings),
            self_employment_tax: se.self_employment_tax,
            self_employment_tax_deduction: se.se_tax_deduction,

            net_short_term_gain: capital.net_short_term,
            net_long_term_gain: capital.net_long_term,
            capital_gain_included: capital.included,
            short_term_loss_carryforward: capital.short_term_carryforward,
            long_term_loss_carryforward: capital.long_term_carryforward,

            form_income,
            gross_income: gross,
            ira_deduction: ira.total(),
            student_loan_interest_deduction: student_loan,
            total_adjustments,
            roth_ira_eligible_contribution: roth,
            agi,

            standard_deduction: deduction.standard,
            itemized_deduction: deduction.itemized.total,
            deduction_taken: deduction.taken,
            itemized: deduction.itemize,
            taxable_income_before_qbi,
            qbi_deduction: qbi.deduction,
            qbi_activities: qbi.activities,
            taxable_income,

            preferential_income,
            ordinary_income,
            ordinary_tax: ordinary.tax,
            bracket_breakdown: ordinary.slices,
            preferential_tax: preferential.tax,
            regular_tax,

            additional_medicare_tax: additional_medicare,
            net_investment_income_tax: niit,

            amt_income: amt.amt_income,
            amt_exemption: amt.exemption,
            tentative_minimum_tax: amt.tentative_minimum_tax,
            alternative_minimum_tax: amt.alternative_minimum_tax,

            forms: form_outcomes,
            form_additional_tax,
            total_tax_before_credits,

            credits: stack.amounts,
            nonrefundable_credits: stack.nonrefundable_total,
            refundable_credits: stack.refundable_total,
            excess_advance_ptc_repayment: tentatives.excess_advance_repayment,
            total_tax,

            withholding,
            estimated_payments,
            extension_payment,
            excess_social_security_withholding: excess_ss,
            total_payments,
            refund: round_half_up(non_negative(-balance)),
            amount_owed: round_half_up(non_negative(balance)),

            required_annual_payment: penalty.required_annual_payment,
            underpayment_penalty: penalty.penalty,

            effective_rate,
            marginal_rate: marginal,

            warnings,
        })
    }

    fn taxable_social_security(
        &self,
        input: &TaxReturnInput,
    ) -> Result<Decimal, TaxEngineError> {
        let income = &input.income;
        let Some(benefits) = &income.social_security else {
            return Ok(Decimal::ZERO);
        };
        if let Some(resolved) = benefits.taxable_amount {
            return Ok(round_half_up(resolved));
        }

        // Provisional income counts capital transactions as reported; form
        // contributions are not known yet.
        let other_income = gross_income(income, ResolvedIncome {
            capital_gain_included: self
                .capital(income, input.filing_status(), Decimal::ZERO)?
                .included,
            ..ResolvedIncome::default()
        });
        let result = taxable_benefits(
            benefits.gross_benefits,
            other_income,
            income.tax_exempt_interest,
            input.filing_status(),
            &self.config.social_security,
        )?;
        Ok(result.taxable_benefits)
    }

    fn self_employment(
        &self,
        income: &IncomeSources,
    ) -> Result<SeWorksheetResult, TaxEngineError> {
        let worksheet = SeWorksheet::new(SeWorksheetConfig::from_year_config(&self.config));
        Ok(worksheet.calculate(&SeWorksheetInput {
            business_profit: income.business_net_profit,
            farm_profit: income.farm_net_profit,
            crp_payments: income.crp_payments,
            partnership_earnings: income.partnership_se_earnings(),
            ss_wages: income.social_security_wages(),
        })?)
    }

    fn capital(
        &self,
        income: &IncomeSources,
        status: FilingStatus,
        extra_long_term: Decimal,
    ) -> Result<CapitalGainResult, TaxEngineError> {
        let loss_limit = self
            .config
            .capital_gains
            .loss_limit
            .value(status, "capital_gains.loss_limit")?;
        Ok(net_capital_gains(&income.capital, extra_long_term, loss_limit))
    }

    /// Social security tax withheld above the employee maximum, per person
    /// with more than one employer.
    fn excess_social_security_withholding(
        &self,
        income: &IncomeSources,
    ) -> Decimal {
        let se = &self.config.self_employment;
        let maximum = round_half_up(se.ss_wage_max * se.employee_ss_rate);

        let excess = |person: Person| {
            let forms: Vec<_> = income.w2.iter().filter(|w| w.owner == person).collect();
            if forms.len() < 2 {
                return Decimal::ZERO;
            }
            let withheld: Decimal = forms.iter().map(|w| w.social_security_tax_withheld).sum();
            non_negative(withheld - maximum)
        };

        sum_money([excess(Person::Taxpayer), excess(Person::Spouse)])
    }
}
