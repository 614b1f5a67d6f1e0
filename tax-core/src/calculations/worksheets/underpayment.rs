//! Underpayment penalty worksheet (simplified Form 2210).
//!
//! # Worksheet Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Current-year tax after credits, less refundable credits |
//! | 2    | Line 1 × 90% (66⅔% for farmers and fishers) |
//! | 3    | Prior-year tax × 100% (110% when prior-year AGI exceeded the threshold) |
//! | 4    | Required annual payment: smaller of Line 2 and Line 3, or Line 2 alone without a prior-year return |
//! | 5    | Withholding plus timely estimated payments |
//! | 6    | Shortfall: Line 4 − Line 5, not below zero; under $1,000 means no penalty |
//! | 7    | Penalty: Line 6 × annual rate |
//!
//! The penalty is a flat annual charge on the shortfall; it does not
//! compound or track installment dates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::{non_negative, round_half_up};
use crate::error::TaxEngineError;
use crate::models::{FilingStatus, YearConfig};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnderpaymentWorksheetError {
    #[error("current-year safe harbor rate must be between 0 and 1, got {0}")]
    InvalidCurrentYearRate(Decimal),

    #[error("prior-year safe harbor rate must be positive, got {0}")]
    InvalidPriorYearRate(Decimal),

    #[error("annual penalty rate must be between 0 and 1, got {0}")]
    InvalidAnnualRate(Decimal),

    #[error("minimum shortfall must be non-negative, got {0}")]
    InvalidMinimumShortfall(Decimal),
}

impl From<UnderpaymentWorksheetError> for TaxEngineError {
    fn from(err: UnderpaymentWorksheetError) -> Self {
        TaxEngineError::configuration("penalty", err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderpaymentWorksheetConfig {
    pub current_year_rate: Decimal,
    pub farmer_current_year_rate: Decimal,
    pub prior_year_rate: Decimal,
    pub high_income_prior_year_rate: Decimal,
    /// Prior-year AGI above which the higher prior-year rate applies.
    pub high_income_prior_agi: Decimal,
    pub minimum_shortfall: Decimal,
    pub annual_rate: Decimal,
}

impl UnderpaymentWorksheetConfig {
    /// # Errors
    /// A missing prior-AGI threshold for `status` is a configuration error.
    pub fn from_year_config(
        config: &YearConfig,
        status: FilingStatus,
    ) -> Result<Self, TaxEngineError> {
        let penalty = &config.penalty;
        Ok(Self {
            current_year_rate: penalty.current_year_rate,
            farmer_current_year_rate: penalty.farmer_current_year_rate,
            prior_year_rate: penalty.prior_year_rate,
            high_income_prior_year_rate: penalty.high_income_prior_year_rate,
            high_income_prior_agi: penalty
                .high_income_prior_agi
                .value(status, "penalty.high_income_prior_agi")?,
            minimum_shortfall: penalty.minimum_shortfall,
            annual_rate: penalty.annual_rate,
        })
    }

    pub fn validate(&self) -> Result<(), UnderpaymentWorksheetError> {
        for rate in [self.current_year_rate, self.farmer_current_year_rate] {
            if rate <= Decimal::ZERO || rate > Decimal::ONE {
                return Err(UnderpaymentWorksheetError::InvalidCurrentYearRate(rate));
            }
        }
        for rate in [self.prior_year_rate, self.high_income_prior_year_rate] {
            if rate <= Decimal::ZERO {
                return Err(UnderpaymentWorksheetError::InvalidPriorYearRate(rate));
            }
        }
        if self.annual_rate < Decimal::ZERO || self.annual_rate > Decimal::ONE {
            return Err(UnderpaymentWorksheetError::InvalidAnnualRate(
                self.annual_rate,
            ));
        }
        if self.minimum_shortfall < Decimal::ZERO {
            return Err(UnderpaymentWorksheetError::InvalidMinimumShortfall(
                self.minimum_shortfall,
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderpaymentWorksheetInput {
    /// Line 1.
    pub current_year_tax: Decimal,
    /// `None` when no prior-year return was required.
    pub prior_year_tax: Option<Decimal>,
    pub prior_year_agi: Decimal,
    pub is_farmer_or_fisher: bool,
    /// Line 5.
    pub payments: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderpaymentWorksheetResult {
    pub current_year_safe_harbor: Decimal,
    pub prior_year_safe_harbor: Option<Decimal>,
    pub required_annual_payment: Decimal,
    pub shortfall: Decimal,
    pub penalty: Decimal,
}

#[derive(Debug, Clone)]
pub struct UnderpaymentWorksheet {
    config: UnderpaymentWorksheetConfig,
}

impl UnderpaymentWorksheet {
    pub fn new(config: UnderpaymentWorksheetConfig) -> Self {
        Self { config }
    }

    /// # Errors
    ///
    /// Returns [`UnderpaymentWorksheetError`] if the configuration is invalid.
    pub fn calculate(
        &self,
        input: &UnderpaymentWorksheetInput,
    ) -> Result<UnderpaymentWorksheetResult, UnderpaymentWorksheetError> {
        self.config.validate()?;

        let current_year_tax = non_negative(round_half_up(input.current_year_tax));

        // Line 2
        let current_year_safe_harbor =
            self.current_year_safe_harbor(current_year_tax, input.is_farmer_or_fisher);

        // Line 3
        let prior_year_safe_harbor = input
            .prior_year_tax
            .map(|tax| self.prior_year_safe_harbor(tax, input.prior_year_agi));

        // Line 4
        let required_annual_payment = match prior_year_safe_harbor {
            Some(prior) => current_year_safe_harbor.min(prior),
            None => current_year_safe_harbor,
        };

        // Line 6
        let shortfall = non_negative(round_half_up(required_annual_payment - input.payments));

        // Line 7
        let penalty = if shortfall.is_zero() || shortfall < self.config.minimum_shortfall {
            Decimal::ZERO
        } else {
            round_half_up(shortfall * self.config.annual_rate)
        };

        debug!(
            required_annual_payment = %required_annual_payment,
            payments = %input.payments,
            shortfall = %shortfall,
            penalty = %penalty,
            "underpayment worksheet"
        );

        Ok(UnderpaymentWorksheetResult {
            current_year_safe_harbor,
            prior_year_safe_harbor,
            required_annual_payment,
            shortfall,
            penalty,
        })
    }

    fn current_year_safe_harbor(
        &self,
        current_year_tax: Decimal,
        is_farmer_or_fisher: bool,
    ) -> Decimal {
        let rate = if is_farmer_or_fisher {
            self.config.farmer_current_year_rate
        } else {
            self.config.current_year_rate
        };
        round_half_up(current_year_tax * rate)
    }

    fn prior_year_safe_harbor(
        &self,
        prior_year_tax: Decimal,
        prior_year_agi: Decimal,
    ) -> Decimal {
        let rate = if prior_year_agi > self.config.high_income_prior_agi {
            self.config.high_income_prior_year_rate
        } else {
            self.config.prior_year_rate
        };
        round_half_up(prior_year_tax * rate)
    }
}
