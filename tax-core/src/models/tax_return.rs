//! The caller-owned description of one return.
//!
//! The engine only ever borrows a [`TaxReturnInput`] immutably; intermediate
//! passes work on their own copies of the figures they adjust.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::TaxEngineError;
use crate::models::{FilingStatus, FormRecords};

/// Upper bound on any caller-supplied record list.
pub const MAX_RECORDS: usize = 1_000;

/// Upper bound on the magnitude of any caller-supplied amount. Sums over
/// [`MAX_RECORDS`] records of this size stay well inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Person {
    #[default]
    Taxpayer,
    Spouse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependent {
    pub age: u32,
    pub months_lived_with_taxpayer: u32,
    pub has_ssn: bool,
    pub is_student: bool,
    pub is_disabled: bool,
    /// Relationship and support tests for a qualifying child are met.
    pub qualifying_child: bool,
}

impl Dependent {
    /// Qualifying child for the earned income credit: under 19, a student
    /// under 24, or permanently disabled, living with the taxpayer over half the year.
    pub fn eitc_qualifying(&self) -> bool {
        let age_test = self.age < 19 || (self.is_student && self.age < 24) || self.is_disabled;
        self.qualifying_child && self.months_lived_with_taxpayer > 6 && age_test
    }

    pub fn ctc_qualifying(
        &self,
        max_child_age: u32,
    ) -> bool {
        self.qualifying_child && self.has_ssn && self.age <= max_child_age
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxpayerProfile {
    pub filing_status: FilingStatus,
    pub taxpayer_age: u32,
    pub spouse_age: Option<u32>,
    pub taxpayer_blind: bool,
    pub spouse_blind: bool,
    pub can_be_claimed_as_dependent: bool,
    pub dependents: Vec<Dependent>,
    pub is_farmer_or_fisher: bool,
    /// Forces itemizing (e.g. a separately-filing spouse itemizes).
    pub must_itemize: bool,
    pub taxpayer_covered_by_workplace_plan: bool,
    pub spouse_covered_by_workplace_plan: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct W2 {
    pub owner: Person,
    pub wages: Decimal,
    pub federal_withholding: Decimal,
    pub social_security_wages: Decimal,
    pub social_security_tax_withheld: Decimal,
    pub medicare_wages: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnershipK1 {
    pub ordinary_income: Decimal,
    pub self_employment_earnings: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityBenefits {
    pub gross_benefits: Decimal,
    /// Already-resolved taxable amount; when present the taxability pass is skipped.
    pub taxable_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalTransactions {
    pub short_term_gains: Decimal,
    pub short_term_losses: Decimal,
    pub long_term_gains: Decimal,
    pub long_term_losses: Decimal,
    pub capital_gain_distributions: Decimal,
    pub short_term_carryover: Decimal,
    pub long_term_carryover: Decimal,
}

/// One trade or business for the Section 199A deduction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessActivity {
    pub name: String,
    pub qualified_business_income: Decimal,
    pub w2_wages: Decimal,
    pub ubia: Decimal,
    pub is_specified_service: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSources {
    pub w2: Vec<W2>,
    pub taxable_interest: Decimal,
    pub tax_exempt_interest: Decimal,
    pub ordinary_dividends: Decimal,
    pub qualified_dividends: Decimal,
    pub business_net_profit: Decimal,
    pub farm_net_profit: Decimal,
    pub crp_payments: Decimal,
    pub partnership_k1s: Vec<PartnershipK1>,
    pub social_security: Option<SocialSecurityBenefits>,
    pub unemployment_compensation: Decimal,
    pub gambling_winnings: Decimal,
    pub alimony_received: Decimal,
    pub other_income: Decimal,
    pub capital: CapitalTransactions,
    pub business_activities: Vec<BusinessActivity>,
}

impl IncomeSources {
    pub fn total_wages(&self) -> Decimal {
        self.w2.iter().map(|w| w.wages).sum()
    }

    pub fn wages_of(
        &self,
        person: Person,
    ) -> Decimal {
        self.w2
            .iter()
            .filter(|w| w.owner == person)
            .map(|w| w.wages)
            .sum()
    }

    pub fn social_security_wages(&self) -> Decimal {
        self.w2.iter().map(|w| w.social_security_wages).sum()
    }

    pub fn medicare_wages(&self) -> Decimal {
        self.w2.iter().map(|w| w.medicare_wages).sum()
    }

    pub fn federal_withholding(&self) -> Decimal {
        self.w2.iter().map(|w| w.federal_withholding).sum()
    }

    pub fn partnership_ordinary_income(&self) -> Decimal {
        self.partnership_k1s.iter().map(|k| k.ordinary_income).sum()
    }

    pub fn partnership_se_earnings(&self) -> Decimal {
        self.partnership_k1s
            .iter()
            .map(|k| k.self_employment_earnings)
            .sum()
    }

    /// Schedule C plus Schedule F net profit.
    pub fn net_self_employment_profit(&self) -> Decimal {
        self.business_net_profit + self.farm_net_profit
    }

    pub fn total_gambling_winnings(&self) -> Decimal {
        self.gambling_winnings
    }

    /// Wages plus net earnings from self-employment, for credits keyed on earned income.
    pub fn earned_income(&self) -> Decimal {
        let se = self.net_self_employment_profit() + self.partnership_se_earnings();
        self.total_wages() + se.max(Decimal::ZERO)
    }

    pub fn gross_social_security(&self) -> Decimal {
        self.social_security
            .as_ref()
            .map_or(Decimal::ZERO, |ss| ss.gross_benefits)
    }
}

/// Above-the-line adjustments as entered by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustments {
    pub educator_expenses: Decimal,
    pub hsa_deduction: Decimal,
    pub self_employed_health_insurance: Decimal,
    pub self_employed_retirement: Decimal,
    pub alimony_paid: Decimal,
    pub ira_contributions: Decimal,
    pub spouse_ira_contributions: Decimal,
    pub student_loan_interest: Decimal,
    pub other_adjustments: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedInputs {
    pub medical_expenses: Decimal,
    pub state_local_taxes: Decimal,
    pub real_estate_taxes: Decimal,
    pub mortgage_interest: Decimal,
    pub charitable_cash: Decimal,
    pub charitable_noncash: Decimal,
    pub casualty_losses: Decimal,
    pub gambling_losses: Decimal,
    pub other_itemized: Decimal,
}

/// Alternative minimum tax add-backs entered directly.
///
/// State and local taxes come from the deduction pass; stock option,
/// depreciation and passive timing differences come from their form records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtAdjustments {
    pub private_activity_bond_interest: Decimal,
    pub loss_limitation_adjustment: Decimal,
    pub other_preferences: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationExpense {
    pub qualified_expenses: Decimal,
    /// Claim the American opportunity credit for this student instead of lifetime learning.
    pub american_opportunity: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceCoverage {
    pub annual_premium: Decimal,
    pub benchmark_premium: Decimal,
    pub advance_credit: Decimal,
    pub household_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditInputs {
    pub education: Vec<EducationExpense>,
    pub dependent_care_expenses: Decimal,
    pub dependent_care_qualifying_persons: u32,
    pub retirement_contributions_taxpayer: Decimal,
    pub retirement_contributions_spouse: Decimal,
    pub marketplace: Option<MarketplaceCoverage>,
    pub foreign_taxes_paid: Decimal,
    pub foreign_source_income: Decimal,
    pub residential_clean_energy_costs: Decimal,
    pub home_improvement_costs: Decimal,
    pub heat_pump_costs: Decimal,
    pub prior_year_minimum_tax_credit: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payments {
    pub estimated_payments: Decimal,
    pub extension_payment: Decimal,
    /// Prior-year total tax; `None` when no prior-year return was required.
    pub prior_year_tax: Option<Decimal>,
    pub prior_year_agi: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxReturnInput {
    pub tax_year: i32,
    pub profile: TaxpayerProfile,
    pub income: IncomeSources,
    pub adjustments: Adjustments,
    pub itemized: ItemizedInputs,
    pub amt: AmtAdjustments,
    pub credits: CreditInputs,
    pub payments: Payments,
    pub forms: FormRecords,
}

/// Rejects amounts whose magnitude exceeds [`MAX_AMOUNT`].
pub(crate) fn within_limit(
    value: Decimal,
    field: &str,
) -> Result<(), TaxEngineError> {
    if value.abs() > MAX_AMOUNT {
        return Err(TaxEngineError::input(
            field,
            format!("magnitude exceeds {MAX_AMOUNT}, got {value}"),
        ));
    }
    Ok(())
}

fn non_negative(
    value: Decimal,
    field: &str,
) -> Result<(), TaxEngineError> {
    if value < Decimal::ZERO {
        return Err(TaxEngineError::input(
            field,
            format!("must be non-negative, got {value}"),
        ));
    }
    within_limit(value, field)
}

fn bounded<T>(
    records: &[T],
    field: &str,
) -> Result<(), TaxEngineError> {
    if records.len() > MAX_RECORDS {
        return Err(TaxEngineError::input(
            field,
            format!("{} records exceeds the limit of {MAX_RECORDS}", records.len()),
        ));
    }
    Ok(())
}

impl TaxReturnInput {
    pub fn new(
        tax_year: i32,
        filing_status: FilingStatus,
    ) -> Self {
        Self {
            tax_year,
            profile: TaxpayerProfile {
                filing_status,
                ..TaxpayerProfile::default()
            },
            ..Self::default()
        }
    }

    pub fn filing_status(&self) -> FilingStatus {
        self.profile.filing_status
    }

    /// Structural checks the engine relies on.
    ///
    /// Net profit, partnership income and other income may be negative;
    /// every other amount must be non-negative. No amount may exceed
    /// [`MAX_AMOUNT`] in magnitude.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError::Input`] naming the first offending field.
    pub fn validate(&self) -> Result<(), TaxEngineError> {
        let income = &self.income;

        bounded(&self.profile.dependents, "profile.dependents")?;
        bounded(&income.w2, "income.w2")?;
        bounded(&income.partnership_k1s, "income.partnership_k1s")?;
        bounded(&income.business_activities, "income.business_activities")?;
        bounded(&self.credits.education, "credits.education")?;

        for (i, w2) in income.w2.iter().enumerate() {
            non_negative(w2.wages, &format!("income.w2[{i}].wages"))?;
            non_negative(
                w2.federal_withholding,
                &format!("income.w2[{i}].federal_withholding"),
            )?;
            non_negative(
                w2.social_security_wages,
                &format!("income.w2[{i}].social_security_wages"),
            )?;
            non_negative(
                w2.social_security_tax_withheld,
                &format!("income.w2[{i}].social_security_tax_withheld"),
            )?;
            non_negative(w2.medicare_wages, &format!("income.w2[{i}].medicare_wages"))?;
        }

        for (i, k1) in income.partnership_k1s.iter().enumerate() {
            within_limit(
                k1.ordinary_income,
                &format!("income.partnership_k1s[{i}].ordinary_income"),
            )?;
            within_limit(
                k1.self_employment_earnings,
                &format!("income.partnership_k1s[{i}].self_employment_earnings"),
            )?;
        }

        for (value, field) in [
            (income.business_net_profit, "income.business_net_profit"),
            (income.farm_net_profit, "income.farm_net_profit"),
            (income.other_income, "income.other_income"),
            (self.amt.loss_limitation_adjustment, "amt.loss_limitation_adjustment"),
            (self.amt.other_preferences, "amt.other_preferences"),
            (self.credits.foreign_source_income, "credits.foreign_source_income"),
            (self.payments.prior_year_agi, "payments.prior_year_agi"),
        ] {
            within_limit(value, field)?;
        }

        for (value, field) in [
            (income.taxable_interest, "income.taxable_interest"),
            (income.tax_exempt_interest, "income.tax_exempt_interest"),
            (income.ordinary_dividends, "income.ordinary_dividends"),
            (income.qualified_dividends, "income.qualified_dividends"),
            (income.crp_payments, "income.crp_payments"),
            (income.unemployment_compensation, "income.unemployment_compensation"),
            (income.gambling_winnings, "income.gambling_winnings"),
            (income.alimony_received, "income.alimony_received"),
            (income.capital.short_term_gains, "income.capital.short_term_gains"),
            (income.capital.short_term_losses, "income.capital.short_term_losses"),
            (income.capital.long_term_gains, "income.capital.long_term_gains"),
            (income.capital.long_term_losses, "income.capital.long_term_losses"),
            (
                income.capital.capital_gain_distributions,
                "income.capital.capital_gain_distributions",
            ),
            (income.capital.short_term_carryover, "income.capital.short_term_carryover"),
            (income.capital.long_term_carryover, "income.capital.long_term_carryover"),
        ] {
            non_negative(value, field)?;
        }

        if income.qualified_dividends > income.ordinary_dividends {
            return Err(TaxEngineError::input(
                "income.qualified_dividends",
                "qualified dividends cannot exceed ordinary dividends",
            ));
        }

        if let Some(ss) = &income.social_security {
            non_negative(ss.gross_benefits, "income.social_security.gross_benefits")?;
            if let Some(taxable) = ss.taxable_amount {
                non_negative(taxable, "income.social_security.taxable_amount")?;
            }
        }

        for (i, activity) in income.business_activities.iter().enumerate() {
            within_limit(
                activity.qualified_business_income,
                &format!("income.business_activities[{i}].qualified_business_income"),
            )?;
            non_negative(
                activity.w2_wages,
                &format!("income.business_activities[{i}].w2_wages"),
            )?;
            non_negative(activity.ubia, &format!("income.business_activities[{i}].ubia"))?;
        }

        let adj = &self.adjustments;
        for (value, field) in [
            (adj.educator_expenses, "adjustments.educator_expenses"),
            (adj.hsa_deduction, "adjustments.hsa_deduction"),
            (
                adj.self_employed_health_insurance,
                "adjustments.self_employed_health_insurance",
            ),
            (adj.self_employed_retirement, "adjustments.self_employed_retirement"),
            (adj.alimony_paid, "adjustments.alimony_paid"),
            (adj.ira_contributions, "adjustments.ira_contributions"),
            (adj.spouse_ira_contributions, "adjustments.spouse_ira_contributions"),
            (adj.student_loan_interest, "adjustments.student_loan_interest"),
            (adj.other_adjustments, "adjustments.other_adjustments"),
        ] {
            non_negative(value, field)?;
        }

        let item = &self.itemized;
        for (value, field) in [
            (item.medical_expenses, "itemized.medical_expenses"),
            (item.state_local_taxes, "itemized.state_local_taxes"),
            (item.real_estate_taxes, "itemized.real_estate_taxes"),
            (item.mortgage_interest, "itemized.mortgage_interest"),
            (item.charitable_cash, "itemized.charitable_cash"),
            (item.charitable_noncash, "itemized.charitable_noncash"),
            (item.casualty_losses, "itemized.casualty_losses"),
            (item.gambling_losses, "itemized.gambling_losses"),
            (item.other_itemized, "itemized.other_itemized"),
        ] {
            non_negative(value, field)?;
        }

        let credits = &self.credits;
        for (i, expense) in credits.education.iter().enumerate() {
            non_negative(
                expense.qualified_expenses,
                &format!("credits.education[{i}].qualified_expenses"),
            )?;
        }
        for (value, field) in [
            (credits.dependent_care_expenses, "credits.dependent_care_expenses"),
            (
                credits.retirement_contributions_taxpayer,
                "credits.retirement_contributions_taxpayer",
            ),
            (
                credits.retirement_contributions_spouse,
                "credits.retirement_contributions_spouse",
            ),
            (credits.foreign_taxes_paid, "credits.foreign_taxes_paid"),
            (
                credits.residential_clean_energy_costs,
                "credits.residential_clean_energy_costs",
            ),
            (credits.home_improvement_costs, "credits.home_improvement_costs"),
            (credits.heat_pump_costs, "credits.heat_pump_costs"),
            (
                credits.prior_year_minimum_tax_credit,
                "credits.prior_year_minimum_tax_credit",
            ),
        ] {
            non_negative(value, field)?;
        }
        if let Some(coverage) = &credits.marketplace {
            non_negative(coverage.annual_premium, "credits.marketplace.annual_premium")?;
            non_negative(
                coverage.benchmark_premium,
                "credits.marketplace.benchmark_premium",
            )?;
            non_negative(coverage.advance_credit, "credits.marketplace.advance_credit")?;
            if coverage.household_size == 0 {
                return Err(TaxEngineError::input(
                    "credits.marketplace.household_size",
                    "household size must be at least 1",
                ));
            }
        }

        non_negative(
            self.amt.private_activity_bond_interest,
            "amt.private_activity_bond_interest",
        )?;

        non_negative(self.payments.estimated_payments, "payments.estimated_payments")?;
        non_negative(self.payments.extension_payment, "payments.extension_payment")?;
        if let Some(prior) = self.payments.prior_year_tax {
            non_negative(prior, "payments.prior_year_tax")?;
        }

        self.forms.validate()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn w2(
        owner: Person,
        wages: Decimal,
    ) -> W2 {
        W2 {
            owner,
            wages,
            social_security_wages: wages,
            medicare_wages: wages,
            ..W2::default()
        }
    }

    #[test]
    fn accessors_sum_across_records() {
        let mut input = TaxReturnInput::new(2025, FilingStatus::MarriedFilingJointly);
        input.income.w2 = vec![
            w2(Person::Taxpayer, dec!(50000)),
            w2(Person::Spouse, dec!(30000)),
        ];
        input.income.business_net_profit = dec!(10000);
        input.income.farm_net_profit = dec!(-2000);

        assert_eq!(input.income.total_wages(), dec!(80000));
        assert_eq!(input.income.wages_of(Person::Spouse), dec!(30000));
        assert_eq!(input.income.net_self_employment_profit(), dec!(8000));
        assert_eq!(input.income.earned_income(), dec!(88000));
    }

    #[test]
    fn validate_accepts_default_return() {
        assert_eq!(TaxReturnInput::new(2025, FilingStatus::Single).validate(), Ok(()));
    }

    #[test]
    fn validate_reports_negative_wage_path() {
        let mut input = TaxReturnInput::new(2025, FilingStatus::Single);
        input.income.w2 = vec![
            w2(Person::Taxpayer, dec!(100)),
            w2(Person::Taxpayer, dec!(-5)),
        ];

        let result = input.validate();

        assert_eq!(
            result,
            Err(TaxEngineError::input(
                "income.w2[1].wages",
                "must be non-negative, got -5"
            ))
        );
    }

    #[test]
    fn validate_allows_business_loss() {
        let mut input = TaxReturnInput::new(2025, FilingStatus::Single);
        input.income.business_net_profit = dec!(-12000);

        assert_eq!(input.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_amounts_beyond_limit() {
        let mut input = TaxReturnInput::new(2025, FilingStatus::Single);
        input.income.w2 = vec![
            w2(Person::Taxpayer, Decimal::MAX),
            w2(Person::Taxpayer, Decimal::MAX),
        ];

        assert!(matches!(
            input.validate(),
            Err(TaxEngineError::Input { ref field, .. }) if field == "income.w2[0].wages"
        ));

        let mut input = TaxReturnInput::new(2025, FilingStatus::Single);
        input.income.business_net_profit = -MAX_AMOUNT - dec!(0.01);

        assert!(matches!(
            input.validate(),
            Err(TaxEngineError::Input { ref field, .. }) if field == "income.business_net_profit"
        ));
    }

    #[test]
    fn validate_accepts_amount_at_limit() {
        let mut input = TaxReturnInput::new(2025, FilingStatus::Single);
        input.income.w2 = vec![w2(Person::Taxpayer, MAX_AMOUNT)];
        input.income.other_income = -MAX_AMOUNT;

        assert_eq!(input.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_qualified_above_ordinary_dividends() {
        let mut input = TaxReturnInput::new(2025, FilingStatus::Single);
        input.income.ordinary_dividends = dec!(100);
        input.income.qualified_dividends = dec!(150);

        assert!(matches!(
            input.validate(),
            Err(TaxEngineError::Input { ref field, .. }) if field == "income.qualified_dividends"
        ));
    }

    #[test]
    fn validate_rejects_oversized_record_lists() {
        let mut input = TaxReturnInput::new(2025, FilingStatus::Single);
        input.profile.dependents = vec![Dependent::default(); MAX_RECORDS + 1];

        assert!(matches!(
            input.validate(),
            Err(TaxEngineError::Input { ref field, .. }) if field == "profile.dependents"
        ));
    }

    #[test]
    fn validate_rejects_empty_marketplace_household() {
        let mut input = TaxReturnInput::new(2025, FilingStatus::Single);
        input.credits.marketplace = Some(MarketplaceCoverage::default());

        assert!(matches!(
            input.validate(),
            Err(TaxEngineError::Input { ref field, .. }) if field == "credits.marketplace.household_size"
        ));
    }
}
