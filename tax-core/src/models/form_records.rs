//! Caller-supplied records for the supplemental forms.
//!
//! Each field of [`FormRecords`] is one form; `None` means the form does not
//! apply to the return.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxEngineError;
use crate::models::tax_return::{MAX_RECORDS, within_limit};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementDistribution {
    pub gross_distribution: Decimal,
    pub taxable_amount: Decimal,
    /// Taken before age 59½.
    pub early: bool,
    /// Portion of an early distribution covered by an exception.
    pub exception_amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementDistributions {
    pub distributions: Vec<RetirementDistribution>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCompensation {
    pub nonqualified_option_spread: Decimal,
    pub espp_ordinary_income: Decimal,
    pub disqualifying_disposition_income: Decimal,
    /// Bargain element of incentive stock options exercised and held at year end.
    pub iso_exercise_spread: Decimal,
    /// Compensation already reported in W-2 wages.
    pub included_in_wages: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveActivities {
    /// Net rental real estate income (positive) or loss (negative).
    pub rental_net: Decimal,
    pub other_passive_net: Decimal,
    pub prior_year_suspended_loss: Decimal,
    pub active_participation: bool,
    /// Difference between regular and AMT passive results; may be negative.
    pub amt_adjustment: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentSale {
    pub selling_price: Decimal,
    pub adjusted_basis: Decimal,
    pub selling_expenses: Decimal,
    pub depreciation_recapture: Decimal,
    pub payments_received: Decimal,
    pub year_of_sale: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentSales {
    pub sales: Vec<InstallmentSale>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Depreciation {
    pub section_179_cost: Decimal,
    pub section_179_elected: Decimal,
    pub section_179_carryover: Decimal,
    /// Business income available for the Section 179 limitation.
    pub business_income_limit: Decimal,
    pub regular_depreciation: Decimal,
    /// Depreciation allowed under the alternative system for the same assets.
    pub amt_depreciation: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignCorporationInclusion {
    pub subpart_f_income: Decimal,
    pub tested_income_inclusion: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignEarnedIncome {
    pub foreign_earned_income: Decimal,
    pub qualifying_days: u32,
    pub housing_expenses: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSavingsAccount {
    pub nonqualified_distributions: Decimal,
    pub excess_contributions: Decimal,
    /// Age 65, disability or death; waives the additional tax on distributions.
    pub exception_applies: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KiddieTax {
    pub net_unearned_income: Decimal,
    pub parent_marginal_rate: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdEmployment {
    pub cash_wages_per_employee: Vec<Decimal>,
    /// Paid $1,000 or more in any calendar quarter; triggers federal unemployment tax.
    pub quarterly_threshold_met: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationOfDebt {
    pub cancelled_amount: Decimal,
    pub liabilities_before: Decimal,
    pub assets_before: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetOperatingLoss {
    pub carryforward: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncollectedFica {
    pub social_security: Decimal,
    pub medicare: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecords {
    pub retirement_distributions: Option<RetirementDistributions>,
    pub stock_compensation: Option<StockCompensation>,
    pub passive_activities: Option<PassiveActivities>,
    pub installment_sales: Option<InstallmentSales>,
    pub depreciation: Option<Depreciation>,
    pub foreign_corporation_inclusion: Option<ForeignCorporationInclusion>,
    pub foreign_earned_income: Option<ForeignEarnedIncome>,
    pub health_savings_account: Option<HealthSavingsAccount>,
    pub kiddie_tax: Option<KiddieTax>,
    pub household_employment: Option<HouseholdEmployment>,
    pub cancellation_of_debt: Option<CancellationOfDebt>,
    pub net_operating_loss: Option<NetOperatingLoss>,
    pub uncollected_fica: Option<UncollectedFica>,
}

fn check(
    value: Decimal,
    field: &str,
) -> Result<(), TaxEngineError> {
    if value < Decimal::ZERO {
        return Err(TaxEngineError::input(
            format!("forms.{field}"),
            format!("must be non-negative, got {value}"),
        ));
    }
    signed(value, field)
}

fn signed(
    value: Decimal,
    field: &str,
) -> Result<(), TaxEngineError> {
    within_limit(value, &format!("forms.{field}"))
}

fn check_len(
    len: usize,
    field: &str,
) -> Result<(), TaxEngineError> {
    if len > MAX_RECORDS {
        return Err(TaxEngineError::input(
            format!("forms.{field}"),
            format!("{len} records exceeds the limit of {MAX_RECORDS}"),
        ));
    }
    Ok(())
}

impl FormRecords {
    pub(crate) fn validate(&self) -> Result<(), TaxEngineError> {
        if let Some(r) = &self.retirement_distributions {
            check_len(r.distributions.len(), "retirement_distributions.distributions")?;
            for (i, d) in r.distributions.iter().enumerate() {
                let base = format!("retirement_distributions.distributions[{i}]");
                check(d.gross_distribution, &format!("{base}.gross_distribution"))?;
                check(d.taxable_amount, &format!("{base}.taxable_amount"))?;
                check(d.exception_amount, &format!("{base}.exception_amount"))?;
                if d.taxable_amount > d.gross_distribution {
                    return Err(TaxEngineError::input(
                        format!("forms.{base}.taxable_amount"),
                        "taxable amount cannot exceed the gross distribution",
                    ));
                }
            }
        }
        if let Some(s) = &self.stock_compensation {
            check(
                s.nonqualified_option_spread,
                "stock_compensation.nonqualified_option_spread",
            )?;
            check(s.espp_ordinary_income, "stock_compensation.espp_ordinary_income")?;
            check(
                s.disqualifying_disposition_income,
                "stock_compensation.disqualifying_disposition_income",
            )?;
            check(s.iso_exercise_spread, "stock_compensation.iso_exercise_spread")?;
        }
        if let Some(p) = &self.passive_activities {
            check(
                p.prior_year_suspended_loss,
                "passive_activities.prior_year_suspended_loss",
            )?;
            signed(p.rental_net, "passive_activities.rental_net")?;
            signed(p.other_passive_net, "passive_activities.other_passive_net")?;
            signed(p.amt_adjustment, "passive_activities.amt_adjustment")?;
        }
        if let Some(sales) = &self.installment_sales {
            check_len(sales.sales.len(), "installment_sales.sales")?;
            for (i, sale) in sales.sales.iter().enumerate() {
                let base = format!("installment_sales.sales[{i}]");
                check(sale.selling_price, &format!("{base}.selling_price"))?;
                check(sale.adjusted_basis, &format!("{base}.adjusted_basis"))?;
                check(sale.selling_expenses, &format!("{base}.selling_expenses"))?;
                check(sale.depreciation_recapture, &format!("{base}.depreciation_recapture"))?;
                check(sale.payments_received, &format!("{base}.payments_received"))?;
            }
        }
        if let Some(d) = &self.depreciation {
            check(d.section_179_cost, "depreciation.section_179_cost")?;
            check(d.section_179_elected, "depreciation.section_179_elected")?;
            check(d.section_179_carryover, "depreciation.section_179_carryover")?;
            signed(d.business_income_limit, "depreciation.business_income_limit")?;
            check(d.regular_depreciation, "depreciation.regular_depreciation")?;
            check(d.amt_depreciation, "depreciation.amt_depreciation")?;
        }
        if let Some(f) = &self.foreign_corporation_inclusion {
            check(f.subpart_f_income, "foreign_corporation_inclusion.subpart_f_income")?;
            check(
                f.tested_income_inclusion,
                "foreign_corporation_inclusion.tested_income_inclusion",
            )?;
        }
        if let Some(f) = &self.foreign_earned_income {
            check(f.foreign_earned_income, "foreign_earned_income.foreign_earned_income")?;
            check(f.housing_expenses, "foreign_earned_income.housing_expenses")?;
            if f.qualifying_days > 366 {
                return Err(TaxEngineError::input(
                    "forms.foreign_earned_income.qualifying_days",
                    format!("{} days exceeds a calendar year", f.qualifying_days),
                ));
            }
        }
        if let Some(h) = &self.health_savings_account {
            check(
                h.nonqualified_distributions,
                "health_savings_account.nonqualified_distributions",
            )?;
            check(h.excess_contributions, "health_savings_account.excess_contributions")?;
        }
        if let Some(k) = &self.kiddie_tax {
            check(k.net_unearned_income, "kiddie_tax.net_unearned_income")?;
            if k.parent_marginal_rate < Decimal::ZERO || k.parent_marginal_rate > Decimal::ONE {
                return Err(TaxEngineError::input(
                    "forms.kiddie_tax.parent_marginal_rate",
                    format!("rate {} is outside [0, 1]", k.parent_marginal_rate),
                ));
            }
        }
        if let Some(h) = &self.household_employment {
            check_len(
                h.cash_wages_per_employee.len(),
                "household_employment.cash_wages_per_employee",
            )?;
            for (i, wages) in h.cash_wages_per_employee.iter().enumerate() {
                check(
                    *wages,
                    &format!("household_employment.cash_wages_per_employee[{i}]"),
                )?;
            }
        }
        if let Some(c) = &self.cancellation_of_debt {
            check(c.cancelled_amount, "cancellation_of_debt.cancelled_amount")?;
            check(c.liabilities_before, "cancellation_of_debt.liabilities_before")?;
            check(c.assets_before, "cancellation_of_debt.assets_before")?;
        }
        if let Some(n) = &self.net_operating_loss {
            check(n.carryforward, "net_operating_loss.carryforward")?;
        }
        if let Some(u) = &self.uncollected_fica {
            check(u.social_security, "uncollected_fica.social_security")?;
            check(u.medicare, "uncollected_fica.medicare")?;
        }
        Ok(())
    }
}
