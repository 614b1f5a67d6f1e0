mod calculation_result;
mod filing_status;
mod form_records;
mod tax_bracket;
mod tax_return;
mod tax_year_config;

pub use calculation_result::{
    BracketSlice, CalculationResult, CalculationWarning, CreditAmount, CreditKind, FormKind, FormOutcome,
    FormPhase, QbiActivityDetail,
};
pub use filing_status::FilingStatus;
pub use form_records::{
    CancellationOfDebt, Depreciation, ForeignCorporationInclusion, ForeignEarnedIncome,
    FormRecords, HealthSavingsAccount, HouseholdEmployment, InstallmentSale, InstallmentSales,
    KiddieTax, NetOperatingLoss, PassiveActivities, RetirementDistribution,
    RetirementDistributions, StockCompensation, UncollectedFica,
};
pub use tax_bracket::{TaxBracket, validate_schedule};
pub use tax_return::{
    Adjustments, AmtAdjustments, BusinessActivity, CapitalTransactions, CreditInputs, Dependent,
    EducationExpense, IncomeSources, ItemizedInputs, MAX_AMOUNT, MAX_RECORDS,
    MarketplaceCoverage, PartnershipK1, Payments, Person, SocialSecurityBenefits, TaxReturnInput,
    TaxpayerProfile, W2,
};
pub use tax_year_config::{
    AdjustmentConfig, AmtConfig, ApplicablePercentageBand, CapitalGainConfig,
    ChildTaxCreditConfig, CreditConfig, DependentCareConfig, EarnedIncomeCreditConfig,
    EarnedIncomeTier, EducationCreditConfig, EnergyCreditConfig, ForeignTaxCreditConfig,
    FormConfig, ItemizedDeductionConfig, PenaltyConfig, PerStatus, PhaseOutRange,
    PreferentialRates, PremiumTaxCreditConfig, QbiConfig, RepaymentCap, RetirementConfig,
    SaversCreditConfig, SaversTier, SelfEmploymentConfig, SocialSecurityBenefitsConfig,
    StandardDeductionConfig, SurtaxConfig, YearConfig,
};
