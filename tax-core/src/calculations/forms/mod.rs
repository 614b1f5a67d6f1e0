//! Supplemental form contributions.
//!
//! Every form is an optional record on the return; an absent record
//! contributes nothing. Income-phase forms adjust gross income and see only
//! the preliminary AGI. Tax-phase forms run after taxable income and the
//! marginal rate are final and add a standalone tax.

pub mod cancellation_of_debt;
pub mod depreciation;
pub mod foreign_earned_income;
pub mod foreign_inclusion;
pub mod household;
pub mod hsa;
pub mod installment;
pub mod kiddie;
pub mod nol;
pub mod passive;
pub mod retirement;
pub mod stock_compensation;
pub mod uncollected_fica;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::sum_money;
use crate::error::TaxEngineError;
use crate::models::{
    CalculationWarning, FilingStatus, FormConfig, FormKind, FormOutcome, FormRecords,
};

/// Figures available to income-phase forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomePhaseContext {
    pub status: FilingStatus,
    /// Gross income without any form contribution, less the base adjustments.
    pub preliminary_agi: Decimal,
}

/// Figures available to tax-phase forms. Each is `None` until its pass has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaxPhaseContext {
    pub agi: Option<Decimal>,
    pub taxable_income: Option<Decimal>,
    pub marginal_rate: Option<Decimal>,
}

fn finalized(
    value: Option<Decimal>,
    name: &str,
) -> Result<Decimal, TaxEngineError> {
    value.ok_or_else(|| {
        TaxEngineError::ArithmeticInvariant(format!(
            "{name} read by a tax-phase form before it was finalized"
        ))
    })
}

impl TaxPhaseContext {
    pub fn agi(&self) -> Result<Decimal, TaxEngineError> {
        finalized(self.agi, "AGI")
    }

    pub fn taxable_income(&self) -> Result<Decimal, TaxEngineError> {
        finalized(self.taxable_income, "taxable income")
    }

    pub fn marginal_rate(&self) -> Result<Decimal, TaxEngineError> {
        finalized(self.marginal_rate, "marginal rate")
    }
}

/// Outcomes of one phase, keyed by form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPass {
    pub outcomes: BTreeMap<FormKind, FormOutcome>,
    pub warnings: Vec<CalculationWarning>,
}

impl FormPass {
    fn record(
        &mut self,
        kind: FormKind,
        outcome: FormOutcome,
    ) {
        debug!(
            form = kind.key(),
            ordinary_income = %outcome.ordinary_income,
            long_term_gain = %outcome.long_term_gain,
            additional_tax = %outcome.additional_tax,
            "form contribution"
        );
        self.outcomes.insert(kind, outcome);
    }

    pub fn ordinary_income(&self) -> Decimal {
        sum_money(self.outcomes.values().map(|o| o.ordinary_income))
    }

    pub fn long_term_gain(&self) -> Decimal {
        sum_money(self.outcomes.values().map(|o| o.long_term_gain))
    }

    pub fn additional_tax(&self) -> Decimal {
        sum_money(self.outcomes.values().map(|o| o.additional_tax))
    }

    pub fn amt_adjustment(&self) -> Decimal {
        sum_money(self.outcomes.values().map(|o| o.amt_adjustment))
    }
}

/// Evaluates every income-phase form present on the return.
///
/// The net operating loss runs last because its limit depends on the income
/// the other forms add.
///
/// # Errors
/// Missing per-status form tables are a configuration error.
pub fn income_phase(
    records: &FormRecords,
    ctx: &IncomePhaseContext,
    config: &FormConfig,
) -> Result<FormPass, TaxEngineError> {
    let mut pass = FormPass::default();

    if let Some(r) = &records.retirement_distributions {
        pass.record(FormKind::RetirementDistributions, retirement::evaluate(r, config));
    }
    if let Some(r) = &records.stock_compensation {
        pass.record(FormKind::StockCompensation, stock_compensation::evaluate(r));
    }
    if let Some(r) = &records.passive_activities {
        let result = passive::evaluate(r, ctx.preliminary_agi, ctx.status, config)?;
        if result.suspended_loss > Decimal::ZERO {
            pass.warnings.push(CalculationWarning::PassiveLossSuspended {
                amount: result.suspended_loss,
            });
        }
        pass.record(FormKind::PassiveActivities, result.outcome);
    }
    if let Some(r) = &records.installment_sales {
        pass.record(FormKind::InstallmentSales, installment::evaluate(r));
    }
    if let Some(r) = &records.depreciation {
        pass.record(FormKind::Depreciation, depreciation::evaluate(r, config));
    }
    if let Some(r) = &records.foreign_corporation_inclusion {
        pass.record(FormKind::ForeignCorporationInclusion, foreign_inclusion::evaluate(r));
    }
    if let Some(r) = &records.foreign_earned_income {
        pass.record(
            FormKind::ForeignEarnedIncome,
            foreign_earned_income::evaluate(r, config),
        );
    }
    if let Some(r) = &records.health_savings_account {
        pass.record(FormKind::HealthSavingsAccount, hsa::evaluate(r, config));
    }
    if let Some(r) = &records.cancellation_of_debt {
        pass.record(FormKind::CancellationOfDebt, cancellation_of_debt::evaluate(r));
    }
    if let Some(r) = &records.household_employment {
        pass.record(FormKind::HouseholdEmployment, household::evaluate(r, config));
    }
    if let Some(r) = &records.uncollected_fica {
        pass.record(FormKind::UncollectedFica, uncollected_fica::evaluate(r));
    }
    if let Some(r) = &records.net_operating_loss {
        let before_nol = ctx.preliminary_agi + pass.ordinary_income() + pass.long_term_gain();
        pass.record(FormKind::NetOperatingLoss, nol::evaluate(r, before_nol, config));
    }

    Ok(pass)
}

/// Evaluates every tax-phase form present on the return.
///
/// # Errors
/// [`TaxEngineError::ArithmeticInvariant`] when a form needs a figure the
/// context does not yet hold.
pub fn tax_phase(
    records: &FormRecords,
    ctx: &TaxPhaseContext,
    config: &FormConfig,
) -> Result<FormPass, TaxEngineError> {
    let mut pass = FormPass::default();

    if let Some(r) = &records.kiddie_tax {
        pass.record(FormKind::KiddieTax, kiddie::evaluate(r, ctx, config)?);
    }

    Ok(pass)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{
        FormPhase, HealthSavingsAccount, KiddieTax, NetOperatingLoss, PassiveActivities,
        StockCompensation, YearConfig,
    };

    fn ctx(preliminary_agi: Decimal) -> IncomePhaseContext {
        IncomePhaseContext {
            status: FilingStatus::Single,
            preliminary_agi,
        }
    }

    // =========================================================================
    // income phase
    // =========================================================================

    #[test]
    fn absent_records_contribute_nothing() {
        let pass = income_phase(
            &FormRecords::default(),
            &ctx(dec!(50000)),
            &YearConfig::tax_year_2025().forms,
        )
        .unwrap();

        assert!(pass.outcomes.is_empty());
        assert_eq!(pass.ordinary_income(), dec!(0));
        assert_eq!(pass.additional_tax(), dec!(0));
    }

    #[test]
    fn present_records_are_keyed_by_form() {
        let records = FormRecords {
            stock_compensation: Some(StockCompensation {
                iso_exercise_spread: dec!(30000),
                included_in_wages: true,
                ..StockCompensation::default()
            }),
            health_savings_account: Some(HealthSavingsAccount {
                nonqualified_distributions: dec!(1000),
                ..HealthSavingsAccount::default()
            }),
            ..FormRecords::default()
        };

        let pass = income_phase(&records, &ctx(dec!(50000)), &YearConfig::tax_year_2025().forms)
            .unwrap();

        assert_eq!(
            pass.outcomes.keys().copied().collect::<Vec<_>>(),
            vec![FormKind::StockCompensation, FormKind::HealthSavingsAccount]
        );
        assert_eq!(pass.ordinary_income(), dec!(1000.00));
        assert_eq!(pass.additional_tax(), dec!(200.00));
        assert_eq!(pass.amt_adjustment(), dec!(30000.00));
        assert!(pass
            .outcomes
            .keys()
            .all(|kind| kind.phase() == FormPhase::Income));
    }

    #[test]
    fn nol_limit_sees_other_form_income() {
        let records = FormRecords {
            health_savings_account: Some(HealthSavingsAccount {
                nonqualified_distributions: dec!(10000),
                exception_applies: true,
                ..HealthSavingsAccount::default()
            }),
            net_operating_loss: Some(NetOperatingLoss {
                carryforward: dec!(100000),
            }),
            ..FormRecords::default()
        };

        let pass = income_phase(&records, &ctx(dec!(40000)), &YearConfig::tax_year_2025().forms)
            .unwrap();

        // 80% × (40000 + 10000)
        assert_eq!(
            pass.outcomes[&FormKind::NetOperatingLoss].ordinary_income,
            dec!(-40000.00)
        );
    }

    #[test]
    fn suspended_passive_loss_is_reported() {
        let records = FormRecords {
            passive_activities: Some(PassiveActivities {
                other_passive_net: dec!(-4000),
                ..PassiveActivities::default()
            }),
            ..FormRecords::default()
        };

        let pass = income_phase(&records, &ctx(dec!(40000)), &YearConfig::tax_year_2025().forms)
            .unwrap();

        assert_eq!(
            pass.warnings,
            vec![CalculationWarning::PassiveLossSuspended {
                amount: dec!(4000.00)
            }]
        );
    }

    // =========================================================================
    // tax phase
    // =========================================================================

    #[test]
    fn tax_phase_requires_finalized_figures() {
        let records = FormRecords {
            kiddie_tax: Some(KiddieTax {
                net_unearned_income: dec!(9000),
                parent_marginal_rate: dec!(0.24),
            }),
            ..FormRecords::default()
        };

        let early = tax_phase(
            &records,
            &TaxPhaseContext {
                agi: Some(dec!(9000)),
                ..TaxPhaseContext::default()
            },
            &YearConfig::tax_year_2025().forms,
        );

        assert!(matches!(early, Err(TaxEngineError::ArithmeticInvariant(_))));
    }
}
