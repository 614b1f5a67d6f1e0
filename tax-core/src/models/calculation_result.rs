//! The complete breakdown produced by one engine invocation.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::FilingStatus;

/// When a supplemental form is folded into the calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    /// Adjusts gross income before AGI is finalized.
    Income,
    /// Adds a standalone tax once taxable income and rates are known.
    Tax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    RetirementDistributions,
    StockCompensation,
    PassiveActivities,
    InstallmentSales,
    Depreciation,
    ForeignCorporationInclusion,
    ForeignEarnedIncome,
    HealthSavingsAccount,
    CancellationOfDebt,
    NetOperatingLoss,
    KiddieTax,
    HouseholdEmployment,
    UncollectedFica,
}

impl FormKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::RetirementDistributions => "retirement_distributions",
            Self::StockCompensation => "stock_compensation",
            Self::PassiveActivities => "passive_activities",
            Self::InstallmentSales => "installment_sales",
            Self::Depreciation => "depreciation",
            Self::ForeignCorporationInclusion => "foreign_corporation_inclusion",
            Self::ForeignEarnedIncome => "foreign_earned_income",
            Self::HealthSavingsAccount => "health_savings_account",
            Self::CancellationOfDebt => "cancellation_of_debt",
            Self::NetOperatingLoss => "net_operating_loss",
            Self::KiddieTax => "kiddie_tax",
            Self::HouseholdEmployment => "household_employment",
            Self::UncollectedFica => "uncollected_fica",
        }
    }

    pub fn phase(&self) -> FormPhase {
        match self {
            Self::KiddieTax => FormPhase::Tax,
            _ => FormPhase::Income,
        }
    }
}

/// What one form adds to the return. Income figures may be negative
/// (exclusions, loss allowances); `additional_tax` never is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormOutcome {
    pub ordinary_income: Decimal,
    pub long_term_gain: Decimal,
    pub additional_tax: Decimal,
    pub amt_adjustment: Decimal,
}

impl FormOutcome {
    pub fn income(&self) -> Decimal {
        self.ordinary_income + self.long_term_gain
    }
}

/// Credits in the order nonrefundable amounts are applied against liability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditKind {
    ForeignTax,
    DependentCare,
    AmericanOpportunity,
    LifetimeLearning,
    Savers,
    ChildTax,
    OtherDependent,
    ResidentialCleanEnergy,
    HomeImprovement,
    PriorYearMinimumTax,
    EarnedIncome,
    PremiumTax,
}

impl CreditKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::ForeignTax => "foreign_tax",
            Self::DependentCare => "dependent_care",
            Self::AmericanOpportunity => "american_opportunity",
            Self::LifetimeLearning => "lifetime_learning",
            Self::Savers => "savers",
            Self::ChildTax => "child_tax",
            Self::OtherDependent => "other_dependent",
            Self::ResidentialCleanEnergy => "residential_clean_energy",
            Self::HomeImprovement => "home_improvement",
            Self::PriorYearMinimumTax => "prior_year_minimum_tax",
            Self::EarnedIncome => "earned_income",
            Self::PremiumTax => "premium_tax",
        }
    }
}

/// One credit's figures. `tentative` is the nonrefundable amount computed
/// before stacking; `nonrefundable` is what the stack actually applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditAmount {
    pub tentative: Decimal,
    pub nonrefundable: Decimal,
    pub refundable: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QbiActivityDetail {
    pub name: String,
    pub qualified_business_income: Decimal,
    pub w2_wages: Decimal,
    pub ubia: Decimal,
    pub is_specified_service: bool,
    /// QBI after the specified-service reduction.
    pub applicable_income: Decimal,
    pub tentative_deduction: Decimal,
    pub wage_limitation: Decimal,
    pub deduction: Decimal,
}

/// Income falling into one ordinary bracket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    pub floor: Decimal,
    pub rate: Decimal,
    pub income: Decimal,
    pub tax: Decimal,
}

/// Degenerate but legal situations reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationWarning {
    QbiActivityWithoutWagesOrProperty { activity: String },
    SelfEmploymentBelowThreshold { net_earnings: Decimal },
    PreferentialRatesMissing,
    PassiveLossSuspended { amount: Decimal },
    ForeignTaxCreditLimited { disallowed: Decimal },
}

impl fmt::Display for CalculationWarning {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::QbiActivityWithoutWagesOrProperty { activity } => write!(
                f,
                "business activity '{activity}' has no W-2 wages or qualified property above the threshold; its deduction is zero"
            ),
            Self::SelfEmploymentBelowThreshold { net_earnings } => write!(
                f,
                "net self-employment earnings {net_earnings} are below the filing threshold; no self-employment tax"
            ),
            Self::PreferentialRatesMissing => f.write_str(
                "no preferential-rate thresholds for this year; qualified income taxed through ordinary brackets",
            ),
            Self::PassiveLossSuspended { amount } => {
                write!(f, "passive loss of {amount} suspended to next year")
            }
            Self::ForeignTaxCreditLimited { disallowed } => {
                write!(f, "foreign tax of {disallowed} exceeds the credit limitation")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub tax_year: i32,
    pub filing_status: FilingStatus,

    pub total_wages: Decimal,
    pub taxable_social_security: Decimal,
    pub net_self_employment_earnings: Decimal,
    pub self_employment_tax: Decimal,
    pub self_employment_tax_deduction: Decimal,

    pub net_short_term_gain: Decimal,
    pub net_long_term_gain: Decimal,
    /// Net capital gain, or the allowed loss, included in gross income.
    pub capital_gain_included: Decimal,
    pub short_term_loss_carryforward: Decimal,
    pub long_term_loss_carryforward: Decimal,

    pub form_income: Decimal,
    pub gross_income: Decimal,
    pub ira_deduction: Decimal,
    pub student_loan_interest_deduction: Decimal,
    pub total_adjustments: Decimal,
    pub roth_ira_eligible_contribution: Decimal,
    pub agi: Decimal,

    pub standard_deduction: Decimal,
    pub itemized_deduction: Decimal,
    pub deduction_taken: Decimal,
    pub itemized: bool,
    pub taxable_income_before_qbi: Decimal,
    pub qbi_deduction: Decimal,
    pub qbi_activities: Vec<QbiActivityDetail>,
    pub taxable_income: Decimal,

    pub preferential_income: Decimal,
    pub ordinary_income: Decimal,
    pub ordinary_tax: Decimal,
    pub bracket_breakdown: Vec<BracketSlice>,
    pub preferential_tax: Decimal,
    pub regular_tax: Decimal,

    pub additional_medicare_tax: Decimal,
    pub net_investment_income_tax: Decimal,

    pub amt_income: Decimal,
    pub amt_exemption: Decimal,
    pub tentative_minimum_tax: Decimal,
    pub alternative_minimum_tax: Decimal,

    pub forms: BTreeMap<FormKind, FormOutcome>,
    pub form_additional_tax: Decimal,
    pub total_tax_before_credits: Decimal,

    pub credits: BTreeMap<CreditKind, CreditAmount>,
    pub nonrefundable_credits: Decimal,
    pub refundable_credits: Decimal,
    pub excess_advance_ptc_repayment: Decimal,
    pub total_tax: Decimal,

    pub withholding: Decimal,
    pub estimated_payments: Decimal,
    pub extension_payment: Decimal,
    pub excess_social_security_withholding: Decimal,
    pub total_payments: Decimal,
    pub refund: Decimal,
    pub amount_owed: Decimal,

    pub required_annual_payment: Decimal,
    pub underpayment_penalty: Decimal,

    pub effective_rate: Decimal,
    pub marginal_rate: Decimal,

    pub warnings: Vec<CalculationWarning>,
}

struct FlatWriter {
    entries: BTreeMap<String, String>,
}

impl FlatWriter {
    fn money(
        &mut self,
        key: impl Into<String>,
        value: Decimal,
    ) {
        self.entries
            .insert(key.into(), format!(
                "{:.2}",
                value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            ));
    }

    fn rate(
        &mut self,
        key: impl Into<String>,
        value: Decimal,
    ) {
        self.entries
            .insert(key.into(), format!(
                "{:.4}",
                value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
            ));
    }

    fn text(
        &mut self,
        key: impl Into<String>,
        value: impl ToString,
    ) {
        self.entries.insert(key.into(), value.to_string());
    }
}

impl CalculationResult {
    /// Flattens every figure into independently named string entries.
    ///
    /// Money renders with two decimals and rates with four, so the map is
    /// stable across runs and suitable for persistence or downstream engines.
    pub fn to_flat_map(&self) -> BTreeMap<String, String> {
        let mut w = FlatWriter {
            entries: BTreeMap::new(),
        };

        w.text("tax_year", self.tax_year);
        w.text("filing_status", self.filing_status.as_str());

        for (key, value) in [
            ("total_wages", self.total_wages),
            ("taxable_social_security", self.taxable_social_security),
            ("net_self_employment_earnings", self.net_self_employment_earnings),
            ("self_employment_tax", self.self_employment_tax),
            ("self_employment_tax_deduction", self.self_employment_tax_deduction),
            ("net_short_term_gain", self.net_short_term_gain),
            ("net_long_term_gain", self.net_long_term_gain),
            ("capital_gain_included", self.capital_gain_included),
            ("short_term_loss_carryforward", self.short_term_loss_carryforward),
            ("long_term_loss_carryforward", self.long_term_loss_carryforward),
            ("form_income", self.form_income),
            ("gross_income", self.gross_income),
            ("ira_deduction", self.ira_deduction),
            ("student_loan_interest_deduction", self.student_loan_interest_deduction),
            ("total_adjustments", self.total_adjustments),
            ("roth_ira_eligible_contribution", self.roth_ira_eligible_contribution),
            ("agi", self.agi),
            ("standard_deduction", self.standard_deduction),
            ("itemized_deduction", self.itemized_deduction),
            ("deduction_taken", self.deduction_taken),
            ("taxable_income_before_qbi", self.taxable_income_before_qbi),
            ("qbi_deduction", self.qbi_deduction),
            ("taxable_income", self.taxable_income),
            ("preferential_income", self.preferential_income),
            ("ordinary_income", self.ordinary_income),
            ("ordinary_tax", self.ordinary_tax),
            ("preferential_tax", self.preferential_tax),
            ("regular_tax", self.regular_tax),
            ("additional_medicare_tax", self.additional_medicare_tax),
            ("net_investment_income_tax", self.net_investment_income_tax),
            ("amt_income", self.amt_income),
            ("amt_exemption", self.amt_exemption),
            ("tentative_minimum_tax", self.tentative_minimum_tax),
            ("alternative_minimum_tax", self.alternative_minimum_tax),
            ("form_additional_tax", self.form_additional_tax),
            ("total_tax_before_credits", self.total_tax_before_credits),
            ("nonrefundable_credits", self.nonrefundable_credits),
            ("refundable_credits", self.refundable_credits),
            ("excess_advance_ptc_repayment", self.excess_advance_ptc_repayment),
            ("total_tax", self.total_tax),
            ("withholding", self.withholding),
            ("estimated_payments", self.estimated_payments),
            ("extension_payment", self.extension_payment),
            (
                "excess_social_security_withholding",
                self.excess_social_security_withholding,
            ),
            ("total_payments", self.total_payments),
            ("refund", self.refund),
            ("amount_owed", self.amount_owed),
            ("required_annual_payment", self.required_annual_payment),
            ("underpayment_penalty", self.underpayment_penalty),
        ] {
            w.money(key, value);
        }
        w.text("itemized", self.itemized);
        w.rate("effective_rate", self.effective_rate);
        w.rate("marginal_rate", self.marginal_rate);

        for (i, slice) in self.bracket_breakdown.iter().enumerate() {
            w.money(format!("bracket.{i}.floor"), slice.floor);
            w.rate(format!("bracket.{i}.rate"), slice.rate);
            w.money(format!("bracket.{i}.income"), slice.income);
            w.money(format!("bracket.{i}.tax"), slice.tax);
        }

        for (i, activity) in self.qbi_activities.iter().enumerate() {
            let base = format!("qbi.activity.{i}");
            w.text(format!("{base}.name"), &activity.name);
            w.money(
                format!("{base}.qualified_business_income"),
                activity.qualified_business_income,
            );
            w.money(format!("{base}.w2_wages"), activity.w2_wages);
            w.money(format!("{base}.ubia"), activity.ubia);
            w.text(
                format!("{base}.is_specified_service"),
                activity.is_specified_service,
            );
            w.money(format!("{base}.applicable_income"), activity.applicable_income);
            w.money(
                format!("{base}.tentative_deduction"),
                activity.tentative_deduction,
            );
            w.money(format!("{base}.wage_limitation"), activity.wage_limitation);
            w.money(format!("{base}.deduction"), activity.deduction);
        }

        for (kind, outcome) in &self.forms {
            let base = format!("form.{}", kind.key());
            w.money(format!("{base}.income"), outcome.income());
            w.money(format!("{base}.long_term_gain"), outcome.long_term_gain);
            w.money(format!("{base}.additional_tax"), outcome.additional_tax);
            w.money(format!("{base}.amt_adjustment"), outcome.amt_adjustment);
        }

        for (kind, amount) in &self.credits {
            let base = format!("credit.{}", kind.key());
            w.money(format!("{base}.tentative"), amount.tentative);
            w.money(format!("{base}.nonrefundable"), amount.nonrefundable);
            w.money(format!("{base}.refundable"), amount.refundable);
        }

        for (i, warning) in self.warnings.iter().enumerate() {
            w.text(format!("warning.{i}"), warning);
        }

        w.entries
    }
}
