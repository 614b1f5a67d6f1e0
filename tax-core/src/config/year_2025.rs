//! In-code parameters for tax year 2025.
//!
//! Brackets, preferential thresholds and most inflation adjustments follow
//! Rev. Proc. 2024-40. The standard deduction, child tax credit, SALT cap
//! and Section 179 amounts reflect the July 2025 amendments.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::{
    AdjustmentConfig, AmtConfig, ApplicablePercentageBand, CapitalGainConfig,
    ChildTaxCreditConfig, CreditConfig, DependentCareConfig, EarnedIncomeCreditConfig,
    EarnedIncomeTier, EducationCreditConfig, EnergyCreditConfig, ForeignTaxCreditConfig,
    FormConfig, ItemizedDeductionConfig, PenaltyConfig, PerStatus, PhaseOutRange,
    PreferentialRates, PremiumTaxCreditConfig, QbiConfig, RepaymentCap, RetirementConfig,
    SaversCreditConfig, SaversTier, SelfEmploymentConfig, SocialSecurityBenefitsConfig,
    StandardDeductionConfig, SurtaxConfig, TaxBracket, YearConfig,
};

fn schedule(tiers: &[(Decimal, Decimal)]) -> Vec<TaxBracket> {
    tiers
        .iter()
        .map(|&(floor, rate)| TaxBracket::new(floor, rate))
        .collect()
}

fn brackets_2025() -> PerStatus<Vec<TaxBracket>> {
    let single = schedule(&[
        (dec!(0), dec!(0.10)),
        (dec!(11925), dec!(0.12)),
        (dec!(48475), dec!(0.22)),
        (dec!(103350), dec!(0.24)),
        (dec!(197300), dec!(0.32)),
        (dec!(250525), dec!(0.35)),
        (dec!(626350), dec!(0.37)),
    ]);
    let joint = schedule(&[
        (dec!(0), dec!(0.10)),
        (dec!(23850), dec!(0.12)),
        (dec!(96950), dec!(0.22)),
        (dec!(206700), dec!(0.24)),
        (dec!(394600), dec!(0.32)),
        (dec!(501050), dec!(0.35)),
        (dec!(751600), dec!(0.37)),
    ]);
    let separate = schedule(&[
        (dec!(0), dec!(0.10)),
        (dec!(11925), dec!(0.12)),
        (dec!(48475), dec!(0.22)),
        (dec!(103350), dec!(0.24)),
        (dec!(197300), dec!(0.32)),
        (dec!(250525), dec!(0.35)),
        (dec!(375800), dec!(0.37)),
    ]);
    let head_of_household = schedule(&[
        (dec!(0), dec!(0.10)),
        (dec!(17000), dec!(0.12)),
        (dec!(64850), dec!(0.22)),
        (dec!(103350), dec!(0.24)),
        (dec!(197300), dec!(0.32)),
        (dec!(250500), dec!(0.35)),
        (dec!(626350), dec!(0.37)),
    ]);
    PerStatus::new(single, joint.clone(), separate, head_of_household, joint)
}

fn earned_income_tiers_2025() -> Vec<EarnedIncomeTier> {
    vec![
        EarnedIncomeTier {
            phase_in_rate: dec!(0.0765),
            earned_income_amount: dec!(8490),
            max_credit: dec!(649),
            phase_out_rate: dec!(0.0765),
            phase_out_start: dec!(10620),
            phase_out_start_joint: dec!(17730),
        },
        EarnedIncomeTier {
            phase_in_rate: dec!(0.34),
            earned_income_amount: dec!(12730),
            max_credit: dec!(4328),
            phase_out_rate: dec!(0.1598),
            phase_out_start: dec!(23350),
            phase_out_start_joint: dec!(30470),
        },
        EarnedIncomeTier {
            phase_in_rate: dec!(0.40),
            earned_income_amount: dec!(17880),
            max_credit: dec!(7152),
            phase_out_rate: dec!(0.2106),
            phase_out_start: dec!(23350),
            phase_out_start_joint: dec!(30470),
        },
        EarnedIncomeTier {
            phase_in_rate: dec!(0.45),
            earned_income_amount: dec!(17880),
            max_credit: dec!(8046),
            phase_out_rate: dec!(0.2106),
            phase_out_start: dec!(23350),
            phase_out_start_joint: dec!(30470),
        },
    ]
}

fn savers_tiers(
    fifty: Decimal,
    twenty: Decimal,
    ten: Decimal,
) -> Vec<SaversTier> {
    vec![
        SaversTier {
            agi_ceiling: fifty,
            rate: dec!(0.50),
        },
        SaversTier {
            agi_ceiling: twenty,
            rate: dec!(0.20),
        },
        SaversTier {
            agi_ceiling: ten,
            rate: dec!(0.10),
        },
    ]
}

impl YearConfig {
    /// Parameters for tax year 2025.
    pub fn tax_year_2025() -> Self {
        Self {
            tax_year: 2025,
            brackets: brackets_2025(),
            preferential: Some(PreferentialRates {
                zero_rate_ceiling: PerStatus::new(
                    dec!(48350),
                    dec!(96700),
                    dec!(48350),
                    dec!(64750),
                    dec!(96700),
                ),
                fifteen_rate_ceiling: PerStatus::new(
                    dec!(533400),
                    dec!(600050),
                    dec!(300000),
                    dec!(566700),
                    dec!(600050),
                ),
                middle_rate: dec!(0.15),
                top_rate: dec!(0.20),
            }),
            standard_deduction: StandardDeductionConfig {
                base: PerStatus::new(
                    dec!(15750),
                    dec!(31500),
                    dec!(15750),
                    dec!(23625),
                    dec!(31500),
                ),
                additional_married: dec!(1600),
                additional_unmarried: dec!(2000),
                dependent_floor: dec!(1350),
                dependent_earned_addon: dec!(450),
            },
            itemized: ItemizedDeductionConfig {
                medical_agi_floor_rate: dec!(0.075),
                salt_cap: PerStatus::new(
                    dec!(40000),
                    dec!(40000),
                    dec!(20000),
                    dec!(40000),
                    dec!(40000),
                ),
                salt_cap_floor: PerStatus::new(
                    dec!(10000),
                    dec!(10000),
                    dec!(5000),
                    dec!(10000),
                    dec!(10000),
                ),
                salt_phase_down_threshold: PerStatus::new(
                    dec!(500000),
                    dec!(500000),
                    dec!(250000),
                    dec!(500000),
                    dec!(500000),
                ),
                salt_phase_down_rate: dec!(0.30),
                charitable_cash_agi_limit: dec!(0.60),
                charitable_noncash_agi_limit: dec!(0.30),
            },
            self_employment: SelfEmploymentConfig {
                ss_wage_max: dec!(176100.00),
                ss_tax_rate: dec!(0.124),
                medicare_tax_rate: dec!(0.029),
                net_earnings_factor: dec!(0.9235),
                deduction_factor: dec!(0.50),
                min_se_threshold: dec!(400.00),
                employee_ss_rate: dec!(0.062),
            },
            social_security: SocialSecurityBenefitsConfig {
                base_amount: PerStatus::new(
                    dec!(25000),
                    dec!(32000),
                    dec!(0),
                    dec!(25000),
                    dec!(25000),
                ),
                adjusted_base_amount: PerStatus::new(
                    dec!(34000),
                    dec!(44000),
                    dec!(0),
                    dec!(34000),
                    dec!(34000),
                ),
                lower_rate: dec!(0.50),
                upper_rate: dec!(0.85),
            },
            surtaxes: SurtaxConfig {
                additional_medicare_rate: dec!(0.009),
                additional_medicare_threshold: PerStatus::new(
                    dec!(200000),
                    dec!(250000),
                    dec!(125000),
                    dec!(200000),
                    dec!(200000),
                ),
                niit_rate: dec!(0.038),
                niit_threshold: PerStatus::new(
                    dec!(200000),
                    dec!(250000),
                    dec!(125000),
                    dec!(200000),
                    dec!(250000),
                ),
            },
            qbi: QbiConfig {
                deduction_rate: dec!(0.20),
                wage_limit_rate: dec!(0.50),
                alt_wage_limit_rate: dec!(0.25),
                ubia_limit_rate: dec!(0.025),
                threshold: PerStatus::new(
                    PhaseOutRange::new(dec!(197300), dec!(247300)),
                    PhaseOutRange::new(dec!(394600), dec!(494600)),
                    PhaseOutRange::new(dec!(197300), dec!(247300)),
                    PhaseOutRange::new(dec!(197300), dec!(247300)),
                    PhaseOutRange::new(dec!(197300), dec!(247300)),
                ),
            },
            amt: AmtConfig {
                exemption: PerStatus::new(
                    dec!(88100),
                    dec!(137000),
                    dec!(68500),
                    dec!(88100),
                    dec!(137000),
                ),
                phase_out_start: PerStatus::new(
                    dec!(626350),
                    dec!(1252700),
                    dec!(626350),
                    dec!(626350),
                    dec!(1252700),
                ),
                phase_out_rate: dec!(0.25),
                low_rate: dec!(0.26),
                high_rate: dec!(0.28),
                high_rate_threshold: PerStatus::new(
                    dec!(239100),
                    dec!(239100),
                    dec!(119550),
                    dec!(239100),
                    dec!(239100),
                ),
            },
            retirement: RetirementConfig {
                ira_contribution_limit: dec!(7000),
                ira_catch_up: dec!(1000),
                catch_up_age: 50,
                ira_covered_phase_out: PerStatus::new(
                    PhaseOutRange::new(dec!(79000), dec!(89000)),
                    PhaseOutRange::new(dec!(126000), dec!(146000)),
                    PhaseOutRange::new(dec!(0), dec!(10000)),
                    PhaseOutRange::new(dec!(79000), dec!(89000)),
                    PhaseOutRange::new(dec!(126000), dec!(146000)),
                ),
                ira_spouse_covered_phase_out: PhaseOutRange::new(dec!(236000), dec!(246000)),
                roth_phase_out: PerStatus::new(
                    PhaseOutRange::new(dec!(150000), dec!(165000)),
                    PhaseOutRange::new(dec!(236000), dec!(246000)),
                    PhaseOutRange::new(dec!(0), dec!(10000)),
                    PhaseOutRange::new(dec!(150000), dec!(165000)),
                    PhaseOutRange::new(dec!(236000), dec!(246000)),
                ),
                reduced_limit_multiple: dec!(10),
                reduced_limit_minimum: dec!(200),
            },
            adjustments: AdjustmentConfig {
                educator_expense_limit: dec!(300),
                student_loan_interest_limit: dec!(2500),
                student_loan_phase_out: PerStatus::new(
                    PhaseOutRange::new(dec!(85000), dec!(100000)),
                    PhaseOutRange::new(dec!(170000), dec!(200000)),
                    PhaseOutRange::new(dec!(0), dec!(0)),
                    PhaseOutRange::new(dec!(85000), dec!(100000)),
                    PhaseOutRange::new(dec!(85000), dec!(100000)),
                ),
            },
            capital_gains: CapitalGainConfig {
                loss_limit: PerStatus::new(
                    dec!(3000),
                    dec!(3000),
                    dec!(1500),
                    dec!(3000),
                    dec!(3000),
                ),
            },
            credits: CreditConfig {
                child_tax_credit: ChildTaxCreditConfig {
                    per_child: dec!(2200),
                    per_other_dependent: dec!(500),
                    refundable_per_child: dec!(1700),
                    max_child_age: 16,
                    phase_out_threshold: PerStatus::new(
                        dec!(200000),
                        dec!(400000),
                        dec!(200000),
                        dec!(200000),
                        dec!(200000),
                    ),
                    phase_out_step: dec!(1000),
                    phase_out_per_step: dec!(50),
                    refundable_earned_income_floor: dec!(2500),
                    refundable_rate: dec!(0.15),
                },
                earned_income: EarnedIncomeCreditConfig {
                    tiers: earned_income_tiers_2025(),
                    investment_income_limit: dec!(11950),
                    childless_min_age: 25,
                    childless_max_age: 64,
                },
                education: EducationCreditConfig {
                    aotc_full_rate_expenses: dec!(2000),
                    aotc_partial_rate_expenses: dec!(2000),
                    aotc_partial_rate: dec!(0.25),
                    aotc_refundable_rate: dec!(0.40),
                    llc_expense_limit: dec!(10000),
                    llc_rate: dec!(0.20),
                    phase_out: PerStatus::new(
                        PhaseOutRange::new(dec!(80000), dec!(90000)),
                        PhaseOutRange::new(dec!(160000), dec!(180000)),
                        PhaseOutRange::new(dec!(0), dec!(0)),
                        PhaseOutRange::new(dec!(80000), dec!(90000)),
                        PhaseOutRange::new(dec!(80000), dec!(90000)),
                    ),
                },
                dependent_care: DependentCareConfig {
                    max_rate: dec!(0.35),
                    min_rate: dec!(0.20),
                    agi_threshold: dec!(15000),
                    agi_step: dec!(2000),
                    rate_step: dec!(0.01),
                    one_person_cap: dec!(3000),
                    two_or_more_cap: dec!(6000),
                },
                savers: SaversCreditConfig {
                    contribution_cap: dec!(2000),
                    tiers: PerStatus::new(
                        savers_tiers(dec!(23750), dec!(25500), dec!(39500)),
                        savers_tiers(dec!(47500), dec!(51000), dec!(79000)),
                        savers_tiers(dec!(23750), dec!(25500), dec!(39500)),
                        savers_tiers(dec!(35625), dec!(38250), dec!(59250)),
                        savers_tiers(dec!(23750), dec!(25500), dec!(39500)),
                    ),
                },
                premium_tax_credit: PremiumTaxCreditConfig {
                    poverty_line_base: dec!(15060),
                    poverty_line_per_person: dec!(5380),
                    applicable_percentages: vec![
                        ApplicablePercentageBand {
                            fpl_floor: dec!(0),
                            fpl_ceiling: Some(dec!(1.50)),
                            initial: dec!(0),
                            final_rate: dec!(0),
                        },
                        ApplicablePercentageBand {
                            fpl_floor: dec!(1.50),
                            fpl_ceiling: Some(dec!(2.00)),
                            initial: dec!(0),
                            final_rate: dec!(0.02),
                        },
                        ApplicablePercentageBand {
                            fpl_floor: dec!(2.00),
                            fpl_ceiling: Some(dec!(2.50)),
                            initial: dec!(0.02),
                            final_rate: dec!(0.04),
                        },
                        ApplicablePercentageBand {
                            fpl_floor: dec!(2.50),
                            fpl_ceiling: Some(dec!(3.00)),
                            initial: dec!(0.04),
                            final_rate: dec!(0.06),
                        },
                        ApplicablePercentageBand {
                            fpl_floor: dec!(3.00),
                            fpl_ceiling: Some(dec!(4.00)),
                            initial: dec!(0.06),
                            final_rate: dec!(0.085),
                        },
                        ApplicablePercentageBand {
                            fpl_floor: dec!(4.00),
                            fpl_ceiling: None,
                            initial: dec!(0.085),
                            final_rate: dec!(0.085),
                        },
                    ],
                    repayment_caps: vec![
                        RepaymentCap {
                            fpl_ceiling: dec!(2.00),
                            single_cap: dec!(375),
                            other_cap: dec!(750),
                        },
                        RepaymentCap {
                            fpl_ceiling: dec!(3.00),
                            single_cap: dec!(975),
                            other_cap: dec!(1950),
                        },
                        RepaymentCap {
                            fpl_ceiling: dec!(4.00),
                            single_cap: dec!(1625),
                            other_cap: dec!(3250),
                        },
                    ],
                },
                foreign_tax: ForeignTaxCreditConfig {
                    de_minimis: PerStatus::new(
                        dec!(300),
                        dec!(600),
                        dec!(300),
                        dec!(300),
                        dec!(300),
                    ),
                },
                energy: EnergyCreditConfig {
                    clean_energy_rate: dec!(0.30),
                    home_improvement_rate: dec!(0.30),
                    home_improvement_cap: dec!(1200),
                    heat_pump_cap: dec!(2000),
                },
            },
            penalty: PenaltyConfig {
                current_year_rate: dec!(0.90),
                farmer_current_year_rate: Decimal::TWO / Decimal::from(3),
                prior_year_rate: dec!(1.00),
                high_income_prior_year_rate: dec!(1.10),
                high_income_prior_agi: PerStatus::new(
                    dec!(150000),
                    dec!(150000),
                    dec!(75000),
                    dec!(150000),
                    dec!(150000),
                ),
                minimum_shortfall: dec!(1000),
                annual_rate: dec!(0.07),
            },
            forms: FormConfig {
                early_distribution_rate: dec!(0.10),
                hsa_distribution_rate: dec!(0.20),
                hsa_excess_contribution_rate: dec!(0.06),
                passive_rental_allowance: PerStatus::new(
                    dec!(25000),
                    dec!(25000),
                    dec!(12500),
                    dec!(25000),
                    dec!(25000),
                ),
                passive_phase_out_start: PerStatus::new(
                    dec!(100000),
                    dec!(100000),
                    dec!(50000),
                    dec!(100000),
                    dec!(100000),
                ),
                passive_phase_out_rate: dec!(0.50),
                section_179_limit: dec!(2500000),
                section_179_phase_out_start: dec!(4000000),
                foreign_earned_income_max: dec!(130000),
                foreign_housing_base_rate: dec!(0.16),
                foreign_housing_cap_rate: dec!(0.30),
                days_in_year: dec!(365),
                kiddie_unearned_threshold: dec!(2700),
                household_wage_threshold: dec!(2800),
                household_fica_rate: dec!(0.153),
                futa_wage_base: dec!(7000),
                futa_rate: dec!(0.006),
                nol_taxable_income_limit: dec!(0.80),
            },
        }
    }
}
