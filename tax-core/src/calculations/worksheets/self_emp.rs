//! Self-employment tax (Schedule SE) worksheet.
//!
//! Runs as the engine's pre-pass: the deductible half of SE tax has to be
//! known before AGI can be computed.
//!
//! # Worksheet Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1a   | Net farm profit or loss (Schedule F) |
//! | 1b   | Conservation Reserve Program payments |
//! | 2    | Net profit from Schedule C plus partnership SE earnings |
//! | 3    | Combined net earnings × 92.35% (net earnings factor) |
//! | 4    | Medicare portion: Line 3 × 2.9% |
//! | 5    | Maximum earnings subject to social security tax |
//! | 6    | W-2 wages already subject to social security tax |
//! | 7    | Line 5 minus Line 6, not below zero |
//! | 8    | Smaller of Line 3 or Line 7 |
//! | 9    | Social security portion: Line 8 × 12.4% |
//! | 10   | Self-employment tax: Line 4 + Line 9 |
//! | 11   | Deductible part of SE tax: Line 10 × 50% |
//!
//! # Minimum Threshold
//!
//! When net earnings (Line 3) are below $400 no SE tax is due. The threshold
//! is configurable via [`SeWorksheetConfig::min_se_threshold`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{SeWorksheet, SeWorksheetConfig, SeWorksheetInput};
//! use tax_core::models::YearConfig;
//!
//! let config = SeWorksheetConfig::from_year_config(&YearConfig::tax_year_2025());
//! let worksheet = SeWorksheet::new(config);
//!
//! let result = worksheet
//!     .calculate(&SeWorksheetInput {
//!         business_profit: dec!(100000.00),
//!         ss_wages: dec!(50000.00),
//!         ..SeWorksheetInput::default()
//!     })
//!     .unwrap();
//!
//! assert_eq!(result.self_employment_tax, dec!(14129.55));
//! assert_eq!(result.se_tax_deduction, dec!(7064.78));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::round_half_up;
use crate::error::TaxEngineError;
use crate::models::YearConfig;

/// Errors that can occur during SE worksheet calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeWorksheetError {
    #[error("net earnings factor must be between 0 and 1, got {0}")]
    InvalidNetEarningsFactor(Decimal),

    #[error("social security tax rate must be between 0 and 1, got {0}")]
    InvalidSocialSecurityRate(Decimal),

    #[error("medicare tax rate must be between 0 and 1, got {0}")]
    InvalidMedicareRate(Decimal),

    #[error("deduction factor must be between 0 and 1, got {0}")]
    InvalidDeductionFactor(Decimal),

    #[error("social security wage maximum must be positive, got {0}")]
    InvalidSsWageMax(Decimal),

    #[error("minimum SE threshold must be non-negative, got {0}")]
    InvalidMinSeThreshold(Decimal),
}

impl From<SeWorksheetError> for TaxEngineError {
    fn from(err: SeWorksheetError) -> Self {
        TaxEngineError::configuration("self_employment", err.to_string())
    }
}

/// Rates and limits for the SE worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeWorksheetConfig {
    /// Maximum earnings subject to social security tax (Line 5).
    pub ss_wage_max: Decimal,

    /// Combined employer and employee social security rate (Line 9).
    pub ss_tax_rate: Decimal,

    /// Combined employer and employee Medicare rate (Line 4).
    pub medicare_tax_rate: Decimal,

    /// Factor applied to combined earnings (Line 3), 92.35%.
    pub net_earnings_factor: Decimal,

    /// Deductible share of SE tax (Line 11).
    pub deduction_factor: Decimal,

    /// Net earnings below this amount owe no SE tax.
    pub min_se_threshold: Decimal,
}

impl SeWorksheetConfig {
    /// Creates a new configuration from a [`YearConfig`].
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::calculations::SeWorksheetConfig;
    /// use tax_core::models::YearConfig;
    ///
    /// let config = SeWorksheetConfig::from_year_config(&YearConfig::tax_year_2025());
    ///
    /// assert_eq!(config.ss_wage_max, dec!(176100.00));
    /// assert_eq!(config.min_se_threshold, dec!(400.00));
    /// ```
    pub fn from_year_config(config: &YearConfig) -> Self {
        let se = &config.self_employment;
        Self {
            ss_wage_max: se.ss_wage_max,
            ss_tax_rate: se.ss_tax_rate,
            medicare_tax_rate: se.medicare_tax_rate,
            net_earnings_factor: se.net_earnings_factor,
            deduction_factor: se.deduction_factor,
            min_se_threshold: se.min_se_threshold,
        }
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`SeWorksheetError`] if:
    /// - `net_earnings_factor` is not in (0, 1]
    /// - `ss_tax_rate`, `medicare_tax_rate` or `deduction_factor` is not in [0, 1]
    /// - `ss_wage_max` is not positive
    /// - `min_se_threshold` is negative
    pub fn validate(&self) -> Result<(), SeWorksheetError> {
        if self.net_earnings_factor <= Decimal::ZERO || self.net_earnings_factor > Decimal::ONE {
            return Err(SeWorksheetError::InvalidNetEarningsFactor(
                self.net_earnings_factor,
            ));
        }
        if self.ss_tax_rate < Decimal::ZERO || self.ss_tax_rate > Decimal::ONE {
            return Err(SeWorksheetError::InvalidSocialSecurityRate(
                self.ss_tax_rate,
            ));
        }
        if self.medicare_tax_rate < Decimal::ZERO || self.medicare_tax_rate > Decimal::ONE {
            return Err(SeWorksheetError::InvalidMedicareRate(
                self.medicare_tax_rate,
            ));
        }
        if self.deduction_factor < Decimal::ZERO || self.deduction_factor > Decimal::ONE {
            return Err(SeWorksheetError::InvalidDeductionFactor(
                self.deduction_factor,
            ));
        }
        if self.ss_wage_max <= Decimal::ZERO {
            return Err(SeWorksheetError::InvalidSsWageMax(self.ss_wage_max));
        }
        if self.min_se_threshold < Decimal::ZERO {
            return Err(SeWorksheetError::InvalidMinSeThreshold(
                self.min_se_threshold,
            ));
        }
        Ok(())
    }
}

/// Earnings feeding the worksheet. Profits may be negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeWorksheetInput {
    /// Schedule C net profit (Line 2).
    pub business_profit: Decimal,
    /// Schedule F net profit (Line 1a).
    pub farm_profit: Decimal,
    /// Conservation Reserve Program payments (Line 1b).
    pub crp_payments: Decimal,
    /// Partnership self-employment earnings from K-1s (Line 2).
    pub partnership_earnings: Decimal,
    /// W-2 wages already subject to social security tax (Line 6).
    pub ss_wages: Decimal,
}

/// Result of SE worksheet calculations, with every intermediate line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeWorksheetResult {
    /// Lines 1a + 1b + 2 before the net earnings factor.
    pub combined_se_income: Decimal,

    /// Line 3.
    pub net_earnings: Decimal,

    /// Line 4.
    pub medicare_tax: Decimal,

    /// Line 8.
    pub ss_taxable_earnings: Decimal,

    /// Line 9.
    pub social_security_tax: Decimal,

    /// Line 10.
    pub self_employment_tax: Decimal,

    /// Line 11, the above-the-line adjustment.
    pub se_tax_deduction: Decimal,

    /// Net earnings fell below the minimum threshold; every tax line is zero.
    pub below_threshold: bool,
}

impl SeWorksheetResult {
    fn below_threshold(
        combined_se_income: Decimal,
        net_earnings: Decimal,
    ) -> Self {
        Self {
            combined_se_income,
            net_earnings,
            medicare_tax: Decimal::ZERO,
            ss_taxable_earnings: Decimal::ZERO,
            social_security_tax: Decimal::ZERO,
            self_employment_tax: Decimal::ZERO,
            se_tax_deduction: Decimal::ZERO,
            below_threshold: true,
        }
    }
}

/// Calculator for the self-employment tax worksheet.
#[derive(Debug, Clone)]
pub struct SeWorksheet {
    config: SeWorksheetConfig,
}

impl SeWorksheet {
    pub fn new(config: SeWorksheetConfig) -> Self {
        Self { config }
    }

    /// Calculates the complete SE worksheet.
    ///
    /// When net earnings are below the minimum threshold the result is
    /// zero-valued with `below_threshold` set.
    ///
    /// # Errors
    ///
    /// Returns [`SeWorksheetError`] if the configuration is invalid.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::calculations::{SeWorksheet, SeWorksheetConfig, SeWorksheetInput};
    /// use tax_core::models::YearConfig;
    ///
    /// let worksheet =
    ///     SeWorksheet::new(SeWorksheetConfig::from_year_config(&YearConfig::tax_year_2025()));
    ///
    /// let result = worksheet
    ///     .calculate(&SeWorksheetInput {
    ///         business_profit: dec!(400.00),
    ///         ..SeWorksheetInput::default()
    ///     })
    ///     .unwrap();
    ///
    /// // 400 × 92.35% = 369.40, under the $400 threshold
    /// assert!(result.below_threshold);
    /// assert_eq!(result.self_employment_tax, dec!(0.00));
    /// ```
    pub fn calculate(
        &self,
        input: &SeWorksheetInput,
    ) -> Result<SeWorksheetResult, SeWorksheetError> {
        self.config.validate()?;

        // Lines 1a, 1b, 2
        let combined_income = self.combined_se_income(input);

        // Line 3
        let net_earnings = self.net_earnings_from_self_employment(combined_income);

        if net_earnings < self.config.min_se_threshold {
            warn!(
                net_earnings = %net_earnings,
                threshold = %self.config.min_se_threshold,
                "net SE earnings below minimum threshold; no SE tax due"
            );
            return Ok(SeWorksheetResult::below_threshold(
                combined_income,
                net_earnings,
            ));
        }

        // Line 4
        let medicare_tax = self.medicare_tax(net_earnings);

        // Line 7
        let remaining_ss_base = self.remaining_ss_wage_base(input.ss_wages);

        // Line 8
        let ss_taxable_earnings = self.ss_taxable_earnings(net_earnings, remaining_ss_base);

        // Line 9
        let social_security_tax = self.social_security_tax(ss_taxable_earnings);

        // Line 10
        let self_employment_tax = round_half_up(medicare_tax + social_security_tax);

        // Line 11
        let se_tax_deduction = round_half_up(self_employment_tax * self.config.deduction_factor);

        Ok(SeWorksheetResult {
            combined_se_income: combined_income,
            net_earnings,
            medicare_tax,
            ss_taxable_earnings,
            social_security_tax,
            self_employment_tax,
            se_tax_deduction,
            below_threshold: false,
        })
    }

    fn combined_se_income(
        &self,
        input: &SeWorksheetInput,
    ) -> Decimal {
        let combined = input.farm_profit
            + input.crp_payments
            + input.business_profit
            + input.partnership_earnings;
        if combined < Decimal::ZERO {
            warn!(
                business_profit = %input.business_profit,
                farm_profit = %input.farm_profit,
                partnership_earnings = %input.partnership_earnings,
                combined = %combined,
                "combined SE income is negative; SE tax will be zero"
            );
        }
        round_half_up(combined)
    }

    fn net_earnings_from_self_employment(
        &self,
        combined_income: Decimal,
    ) -> Decimal {
        round_half_up(combined_income * self.config.net_earnings_factor)
    }

    fn medicare_tax(
        &self,
        net_earnings: Decimal,
    ) -> Decimal {
        round_half_up(net_earnings * self.config.medicare_tax_rate)
    }

    fn remaining_ss_wage_base(
        &self,
        wages: Decimal,
    ) -> Decimal {
        let remaining = self.config.ss_wage_max - wages;

        if remaining <= Decimal::ZERO {
            warn!(
                ss_wage_max = %self.config.ss_wage_max,
                wages = %wages,
                "wages reach the SS wage maximum; no SS tax on SE income"
            );
            return Decimal::ZERO;
        }

        round_half_up(remaining)
    }

    fn ss_taxable_earnings(
        &self,
        net_earnings: Decimal,
        remaining_ss_base: Decimal,
    ) -> Decimal {
        round_half_up(net_earnings.min(remaining_ss_base).max(Decimal::ZERO))
    }

    fn social_security_tax(
        &self,
        ss_taxable_earnings: Decimal,
    ) -> Decimal {
        round_half_up(ss_taxable_earnings * self.config.ss_tax_rate)
    }
}
