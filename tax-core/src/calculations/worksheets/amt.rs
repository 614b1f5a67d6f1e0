//! Alternative minimum tax (Form 6251, simplified).
//!
//! Tentative minimum tax is a flat two-rate tax on AMT taxable income:
//! 26% up to the status threshold and 28% above it. Qualified dividends and
//! capital gains get no separate rate inside the minimum tax.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{min, non_negative, round_half_up};
use crate::error::TaxEngineError;
use crate::models::{AmtConfig, FilingStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmtInput {
    pub taxable_income: Decimal,
    /// State and local taxes deducted on Schedule A; zero when not itemizing.
    pub salt_addback: Decimal,
    /// Sum of preference items and timing differences.
    pub adjustments: Decimal,
    pub regular_tax: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmtResult {
    pub amt_income: Decimal,
    pub exemption: Decimal,
    pub amt_taxable_income: Decimal,
    pub tentative_minimum_tax: Decimal,
    pub alternative_minimum_tax: Decimal,
}

fn flat_rate_tax(
    amount: Decimal,
    high_rate_threshold: Decimal,
    config: &AmtConfig,
) -> Decimal {
    let amount = non_negative(amount);
    let low = min(amount, high_rate_threshold);
    low * config.low_rate + (amount - low) * config.high_rate
}

/// # Errors
/// Missing per-status AMT tables are a configuration error.
pub fn alternative_minimum_tax(
    input: &AmtInput,
    status: FilingStatus,
    config: &AmtConfig,
) -> Result<AmtResult, TaxEngineError> {
    let base_exemption = config.exemption.value(status, "amt.exemption")?;
    let phase_out_start = config
        .phase_out_start
        .value(status, "amt.phase_out_start")?;
    let high_rate_threshold = config
        .high_rate_threshold
        .value(status, "amt.high_rate_threshold")?;

    let amt_income = round_half_up(input.taxable_income + input.salt_addback + input.adjustments);
    let exemption = round_half_up(non_negative(
        base_exemption - non_negative(amt_income - phase_out_start) * config.phase_out_rate,
    ));
    let amt_taxable_income = non_negative(amt_income - exemption);

    let tentative_minimum_tax =
        round_half_up(flat_rate_tax(amt_taxable_income, high_rate_threshold, config));
    let alternative_minimum_tax =
        round_half_up(non_negative(tentative_minimum_tax - input.regular_tax));

    debug!(
        amt_income = %amt_income,
        exemption = %exemption,
        tentative_minimum_tax = %tentative_minimum_tax,
        alternative_minimum_tax = %alternative_minimum_tax,
        "alternative minimum tax"
    );

    Ok(AmtResult {
        amt_income,
        exemption,
        amt_taxable_income: round_half_up(amt_taxable_income),
        tentative_minimum_tax,
        alternative_minimum_tax,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::YearConfig;

    fn run(
        input: AmtInput,
        status: FilingStatus,
    ) -> AmtResult {
        alternative_minimum_tax(&input, status, &YearConfig::tax_year_2025().amt).unwrap()
    }

    // =========================================================================
    // exemption
    // =========================================================================

    #[test]
    fn exemption_eliminates_small_amti() {
        let result = run(
            AmtInput {
                taxable_income: dec!(80000),
                regular_tax: dec!(12000),
                ..AmtInput::default()
            },
            FilingStatus::Single,
        );

        assert_eq!(result.exemption, dec!(88100.00));
        assert_eq!(result.tentative_minimum_tax, dec!(0.00));
        assert_eq!(result.alternative_minimum_tax, dec!(0.00));
    }

    #[test]
    fn exemption_phases_out_at_quarter_rate() {
        let result = run(
            AmtInput {
                taxable_income: dec!(700000),
                ..AmtInput::default()
            },
            FilingStatus::Single,
        );

        // 88100 − 25% × (700000 − 626350)
        assert_eq!(result.exemption, dec!(69687.50));
    }

    #[test]
    fn exemption_floors_at_zero() {
        let result = run(
            AmtInput {
                taxable_income: dec!(2000000),
                ..AmtInput::default()
            },
            FilingStatus::Single,
        );

        assert_eq!(result.exemption, dec!(0));
    }

    // =========================================================================
    // tentative minimum tax
    // =========================================================================

    #[test]
    fn iso_spread_triggers_amt() {
        let result = run(
            AmtInput {
                taxable_income: dec!(100000),
                adjustments: dec!(200000),
                regular_tax: dec!(17000),
                ..AmtInput::default()
            },
            FilingStatus::Single,
        );

        // AMTI 300000, taxable 211900: 26% × 211900
        assert_eq!(result.amt_income, dec!(300000.00));
        assert_eq!(result.tentative_minimum_tax, dec!(55094.00));
        assert_eq!(result.alternative_minimum_tax, dec!(38094.00));
    }

    #[test]
    fn high_rate_applies_above_threshold() {
        let result = run(
            AmtInput {
                taxable_income: dec!(327300),
                ..AmtInput::default()
            },
            FilingStatus::Single,
        );

        // 239100 × 26% + 100 × 28% on AMT taxable income 239200
        assert_eq!(result.tentative_minimum_tax, dec!(62194.00));
    }

    #[test]
    fn salt_addback_increases_amti() {
        let result = run(
            AmtInput {
                taxable_income: dec!(150000),
                salt_addback: dec!(40000),
                ..AmtInput::default()
            },
            FilingStatus::MarriedFilingJointly,
        );

        assert_eq!(result.amt_income, dec!(190000.00));
        assert_eq!(result.exemption, dec!(137000.00));
    }

    #[test]
    fn separate_filer_uses_half_threshold() {
        let result = run(
            AmtInput {
                taxable_income: dec!(200000),
                ..AmtInput::default()
            },
            FilingStatus::MarriedFilingSeparately,
        );

        // AMT taxable 131500: 119550 × 26% + 11950 × 28%
        assert_eq!(result.exemption, dec!(68500.00));
        assert_eq!(result.tentative_minimum_tax, dec!(34429.00));
    }
}
