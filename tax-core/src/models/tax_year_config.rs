//! Immutable per-year parameter table.
//!
//! A [`YearConfig`] holds every bracket table, threshold, phase-out range,
//! rate and limit the engine reads. It is built once per tax year (from the
//! in-code 2025 literals or from an external file) and shared read-only
//! across calculations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxEngineError;
use crate::models::{FilingStatus, TaxBracket, validate_schedule};

/// A value per filing status. A missing slot is a configuration error at lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerStatus<T> {
    pub single: Option<T>,
    pub married_filing_jointly: Option<T>,
    pub married_filing_separately: Option<T>,
    pub head_of_household: Option<T>,
    pub qualifying_surviving_spouse: Option<T>,
}

impl<T> PerStatus<T> {
    pub fn new(
        single: T,
        married_filing_jointly: T,
        married_filing_separately: T,
        head_of_household: T,
        qualifying_surviving_spouse: T,
    ) -> Self {
        Self {
            single: Some(single),
            married_filing_jointly: Some(married_filing_jointly),
            married_filing_separately: Some(married_filing_separately),
            head_of_household: Some(head_of_household),
            qualifying_surviving_spouse: Some(qualifying_surviving_spouse),
        }
    }

    pub fn empty() -> Self {
        Self {
            single: None,
            married_filing_jointly: None,
            married_filing_separately: None,
            head_of_household: None,
            qualifying_surviving_spouse: None,
        }
    }

    pub fn get(
        &self,
        status: FilingStatus,
    ) -> Option<&T> {
        match status {
            FilingStatus::Single => self.single.as_ref(),
            FilingStatus::MarriedFilingJointly => self.married_filing_jointly.as_ref(),
            FilingStatus::MarriedFilingSeparately => self.married_filing_separately.as_ref(),
            FilingStatus::HeadOfHousehold => self.head_of_household.as_ref(),
            FilingStatus::QualifyingSurvivingSpouse => self.qualifying_surviving_spouse.as_ref(),
        }
    }

    /// Looks up `status`, reporting `"{path}.{status}"` when the slot is empty.
    pub fn require(
        &self,
        status: FilingStatus,
        path: &str,
    ) -> Result<&T, TaxEngineError> {
        self.get(status).ok_or_else(|| {
            TaxEngineError::configuration(
                format!("{path}.{}", status.key()),
                "no entry for filing status",
            )
        })
    }

    pub fn set(
        &mut self,
        status: FilingStatus,
        value: T,
    ) {
        let slot = match status {
            FilingStatus::Single => &mut self.single,
            FilingStatus::MarriedFilingJointly => &mut self.married_filing_jointly,
            FilingStatus::MarriedFilingSeparately => &mut self.married_filing_separately,
            FilingStatus::HeadOfHousehold => &mut self.head_of_household,
            FilingStatus::QualifyingSurvivingSpouse => &mut self.qualifying_surviving_spouse,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Iterates the populated slots in filing-status order.
    pub fn iter(&self) -> impl Iterator<Item = (FilingStatus, &T)> {
        FilingStatus::ALL
            .into_iter()
            .filter_map(move |status| self.get(status).map(|v| (status, v)))
    }
}

impl<T> Default for PerStatus<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Copy> PerStatus<T> {
    pub fn value(
        &self,
        status: FilingStatus,
        path: &str,
    ) -> Result<T, TaxEngineError> {
        self.require(status, path).copied()
    }
}

impl<T: Clone> PerStatus<T> {
    /// Same value for every status.
    pub fn uniform(value: T) -> Self {
        Self::new(
            value.clone(),
            value.clone(),
            value.clone(),
            value.clone(),
            value,
        )
    }
}

/// A linear phase-out (or phase-in) band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOutRange {
    pub start: Decimal,
    pub end: Decimal,
}

impl PhaseOutRange {
    pub fn new(
        start: Decimal,
        end: Decimal,
    ) -> Self {
        Self { start, end }
    }

    pub fn midpoint(&self) -> Decimal {
        (self.start + self.end) / Decimal::TWO
    }
}

/// Thresholds for the 0% / 15% / 20% preferential schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferentialRates {
    pub zero_rate_ceiling: PerStatus<Decimal>,
    pub fifteen_rate_ceiling: PerStatus<Decimal>,
    pub middle_rate: Decimal,
    pub top_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardDeductionConfig {
    pub base: PerStatus<Decimal>,
    /// Additional amount per age-65/blind box for married filers and surviving spouses.
    pub additional_married: Decimal,
    /// Additional amount per age-65/blind box for single and head-of-household filers.
    pub additional_unmarried: Decimal,
    /// Minimum standard deduction for someone claimable as a dependent.
    pub dependent_floor: Decimal,
    /// Added to a dependent's earned income before comparing to the floor.
    pub dependent_earned_addon: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedDeductionConfig {
    pub medical_agi_floor_rate: Decimal,
    pub salt_cap: PerStatus<Decimal>,
    pub salt_cap_floor: PerStatus<Decimal>,
    pub salt_phase_down_threshold: PerStatus<Decimal>,
    pub salt_phase_down_rate: Decimal,
    pub charitable_cash_agi_limit: Decimal,
    pub charitable_noncash_agi_limit: Decimal,
}

/// Self-employment tax parameters (Schedule SE).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfEmploymentConfig {
    pub ss_wage_max: Decimal,
    pub ss_tax_rate: Decimal,
    pub medicare_tax_rate: Decimal,
    pub net_earnings_factor: Decimal,
    pub deduction_factor: Decimal,
    pub min_se_threshold: Decimal,
    /// Employee share of social security tax, used for excess-withholding checks.
    pub employee_ss_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityBenefitsConfig {
    pub base_amount: PerStatus<Decimal>,
    pub adjusted_base_amount: PerStatus<Decimal>,
    pub lower_rate: Decimal,
    pub upper_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurtaxConfig {
    pub additional_medicare_rate: Decimal,
    pub additional_medicare_threshold: PerStatus<Decimal>,
    pub niit_rate: Decimal,
    pub niit_threshold: PerStatus<Decimal>,
}

/// Section 199A parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QbiConfig {
    pub deduction_rate: Decimal,
    pub wage_limit_rate: Decimal,
    pub alt_wage_limit_rate: Decimal,
    pub ubia_limit_rate: Decimal,
    pub threshold: PerStatus<PhaseOutRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtConfig {
    pub exemption: PerStatus<Decimal>,
    pub phase_out_start: PerStatus<Decimal>,
    pub phase_out_rate: Decimal,
    pub low_rate: Decimal,
    pub high_rate: Decimal,
    pub high_rate_threshold: PerStatus<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementConfig {
    pub ira_contribution_limit: Decimal,
    pub ira_catch_up: Decimal,
    pub catch_up_age: u32,
    pub ira_covered_phase_out: PerStatus<PhaseOutRange>,
    /// Band used when only the spouse is covered by a workplace plan.
    pub ira_spouse_covered_phase_out: PhaseOutRange,
    pub roth_phase_out: PerStatus<PhaseOutRange>,
    pub reduced_limit_multiple: Decimal,
    pub reduced_limit_minimum: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentConfig {
    pub educator_expense_limit: Decimal,
    pub student_loan_interest_limit: Decimal,
    pub student_loan_phase_out: PerStatus<PhaseOutRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainConfig {
    pub loss_limit: PerStatus<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildTaxCreditConfig {
    pub per_child: Decimal,
    pub per_other_dependent: Decimal,
    pub refundable_per_child: Decimal,
    pub max_child_age: u32,
    pub phase_out_threshold: PerStatus<Decimal>,
    pub phase_out_step: Decimal,
    pub phase_out_per_step: Decimal,
    pub refundable_earned_income_floor: Decimal,
    pub refundable_rate: Decimal,
}

/// One column of the earned income credit table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedIncomeTier {
    pub phase_in_rate: Decimal,
    pub earned_income_amount: Decimal,
    pub max_credit: Decimal,
    pub phase_out_rate: Decimal,
    pub phase_out_start: Decimal,
    pub phase_out_start_joint: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedIncomeCreditConfig {
    /// Indexed by qualifying children; the last tier covers "this many or more".
    pub tiers: Vec<EarnedIncomeTier>,
    pub investment_income_limit: Decimal,
    pub childless_min_age: u32,
    pub childless_max_age: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationCreditConfig {
    pub aotc_full_rate_expenses: Decimal,
    pub aotc_partial_rate_expenses: Decimal,
    pub aotc_partial_rate: Decimal,
    pub aotc_refundable_rate: Decimal,
    pub llc_expense_limit: Decimal,
    pub llc_rate: Decimal,
    pub phase_out: PerStatus<PhaseOutRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentCareConfig {
    pub max_rate: Decimal,
    pub min_rate: Decimal,
    pub agi_threshold: Decimal,
    pub agi_step: Decimal,
    pub rate_step: Decimal,
    pub one_person_cap: Decimal,
    pub two_or_more_cap: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaversTier {
    pub agi_ceiling: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaversCreditConfig {
    pub contribution_cap: Decimal,
    pub tiers: PerStatus<Vec<SaversTier>>,
}

/// Applicable-percentage band, interpolated linearly from `initial` to `final_rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicablePercentageBand {
    pub fpl_floor: Decimal,
    pub fpl_ceiling: Option<Decimal>,
    pub initial: Decimal,
    pub final_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentCap {
    /// Household income as a fraction of the poverty line, exclusive ceiling.
    pub fpl_ceiling: Decimal,
    pub single_cap: Decimal,
    pub other_cap: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumTaxCreditConfig {
    pub poverty_line_base: Decimal,
    pub poverty_line_per_person: Decimal,
    pub applicable_percentages: Vec<ApplicablePercentageBand>,
    /// Ascending by `fpl_ceiling`; above the last ceiling repayment is uncapped.
    pub repayment_caps: Vec<RepaymentCap>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignTaxCreditConfig {
    pub de_minimis: PerStatus<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyCreditConfig {
    pub clean_energy_rate: Decimal,
    pub home_improvement_rate: Decimal,
    pub home_improvement_cap: Decimal,
    pub heat_pump_cap: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditConfig {
    pub child_tax_credit: ChildTaxCreditConfig,
    pub earned_income: EarnedIncomeCreditConfig,
    pub education: EducationCreditConfig,
    pub dependent_care: DependentCareConfig,
    pub savers: SaversCreditConfig,
    pub premium_tax_credit: PremiumTaxCreditConfig,
    pub foreign_tax: ForeignTaxCreditConfig,
    pub energy: EnergyCreditConfig,
}

/// Safe-harbor and penalty parameters (Form 2210, simplified).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyConfig {
    pub current_year_rate: Decimal,
    pub farmer_current_year_rate: Decimal,
    pub prior_year_rate: Decimal,
    pub high_income_prior_year_rate: Decimal,
    pub high_income_prior_agi: PerStatus<Decimal>,
    pub minimum_shortfall: Decimal,
    pub annual_rate: Decimal,
}

/// Parameters used by the optional per-form contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    pub early_distribution_rate: Decimal,
    pub hsa_distribution_rate: Decimal,
    pub hsa_excess_contribution_rate: Decimal,
    pub passive_rental_allowance: PerStatus<Decimal>,
    pub passive_phase_out_start: PerStatus<Decimal>,
    pub passive_phase_out_rate: Decimal,
    pub section_179_limit: Decimal,
    pub section_179_phase_out_start: Decimal,
    pub foreign_earned_income_max: Decimal,
    pub foreign_housing_base_rate: Decimal,
    pub foreign_housing_cap_rate: Decimal,
    pub days_in_year: Decimal,
    pub kiddie_unearned_threshold: Decimal,
    pub household_wage_threshold: Decimal,
    pub household_fica_rate: Decimal,
    pub futa_wage_base: Decimal,
    pub futa_rate: Decimal,
    pub nol_taxable_income_limit: Decimal,
}

/// Every threshold and rate the engine needs for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearConfig {
    pub tax_year: i32,
    /// May be left out of a year file and supplied from a bracket CSV.
    #[serde(default)]
    pub brackets: PerStatus<Vec<TaxBracket>>,
    /// When absent, preferential income is taxed through the ordinary brackets.
    #[serde(default)]
    pub preferential: Option<PreferentialRates>,
    pub standard_deduction: StandardDeductionConfig,
    pub itemized: ItemizedDeductionConfig,
    pub self_employment: SelfEmploymentConfig,
    pub social_security: SocialSecurityBenefitsConfig,
    pub surtaxes: SurtaxConfig,
    pub qbi: QbiConfig,
    pub amt: AmtConfig,
    pub retirement: RetirementConfig,
    pub adjustments: AdjustmentConfig,
    pub capital_gains: CapitalGainConfig,
    pub credits: CreditConfig,
    pub penalty: PenaltyConfig,
    pub forms: FormConfig,
}

impl YearConfig {
    /// Bracket table for `status`; a missing table is fatal.
    pub fn brackets_for(
        &self,
        status: FilingStatus,
    ) -> Result<&[TaxBracket], TaxEngineError> {
        self.brackets
            .require(status, "brackets")
            .map(Vec::as_slice)
    }

    /// Structural checks over every table that is present.
    ///
    /// # Errors
    ///
    /// Returns [`TaxEngineError::Configuration`] naming the first bad entry.
    pub fn validate(&self) -> Result<(), TaxEngineError> {
        for (status, schedule) in self.brackets.iter() {
            validate_schedule(schedule, &format!("brackets.{}", status.key()))?;
        }
        if let Some(pref) = &self.preferential {
            for (status, zero_ceiling) in pref.zero_rate_ceiling.iter() {
                let fifteen = pref
                    .fifteen_rate_ceiling
                    .value(status, "preferential.fifteen_rate_ceiling")?;
                if fifteen < *zero_ceiling {
                    return Err(TaxEngineError::configuration(
                        format!("preferential.fifteen_rate_ceiling.{}", status.key()),
                        "15% ceiling is below the 0% ceiling",
                    ));
                }
            }
        }
        for (status, band) in self.qbi.threshold.iter() {
            if band.end < band.start {
                return Err(TaxEngineError::configuration(
                    format!("qbi.threshold.{}", status.key()),
                    "phase-in end precedes start",
                ));
            }
        }
        if self.credits.earned_income.tiers.is_empty() {
            return Err(TaxEngineError::configuration(
                "credits.earned_income.tiers",
                "at least one tier is required",
            ));
        }
        Ok(())
    }
}
