//! Premium tax credit reconciliation (Form 8962).
//!
//! The allowed credit is the benchmark premium less the household's
//! expected contribution, never more than the premium actually paid. Any
//! surplus over advance payments is refundable; any shortfall is repaid,
//! capped by household income as a multiple of the poverty line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{min, non_negative, round_half_up, round_rate, safe_ratio};
use crate::models::{FilingStatus, MarketplaceCoverage, PremiumTaxCreditConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumTaxCreditReconciliation {
    pub poverty_line_ratio: Decimal,
    pub applicable_percentage: Decimal,
    pub allowed_credit: Decimal,
    pub net_credit: Decimal,
    pub excess_advance_repayment: Decimal,
}

pub fn poverty_line(
    household_size: u32,
    config: &PremiumTaxCreditConfig,
) -> Decimal {
    let extra = Decimal::from(household_size.saturating_sub(1));
    config.poverty_line_base + extra * config.poverty_line_per_person
}

/// Applicable percentage interpolated inside the band containing `ratio`.
pub fn applicable_percentage(
    ratio: Decimal,
    config: &PremiumTaxCreditConfig,
) -> Decimal {
    let band = config.applicable_percentages.iter().find(|band| {
        ratio >= band.fpl_floor && band.fpl_ceiling.is_none_or(|ceiling| ratio < ceiling)
    });
    match band {
        Some(band) => match band.fpl_ceiling {
            Some(ceiling) => {
                let position = safe_ratio(ratio - band.fpl_floor, ceiling - band.fpl_floor);
                band.initial + (band.final_rate - band.initial) * position
            }
            None => band.initial,
        },
        None => config
            .applicable_percentages
            .last()
            .map_or(Decimal::ZERO, |band| band.final_rate),
    }
}

fn repayment_cap(
    ratio: Decimal,
    status: FilingStatus,
    config: &PremiumTaxCreditConfig,
) -> Option<Decimal> {
    config
        .repayment_caps
        .iter()
        .find(|cap| ratio < cap.fpl_ceiling)
        .map(|cap| {
            if status == FilingStatus::Single {
                cap.single_cap
            } else {
                cap.other_cap
            }
        })
}

pub fn reconcile(
    coverage: &MarketplaceCoverage,
    household_income: Decimal,
    status: FilingStatus,
    config: &PremiumTaxCreditConfig,
) -> PremiumTaxCreditReconciliation {
    let ratio = safe_ratio(household_income, poverty_line(coverage.household_size, config));
    let applicable = round_rate(applicable_percentage(ratio, config));
    let contribution = non_negative(household_income) * applicable;
    let allowed_credit = round_half_up(non_negative(min(
        coverage.annual_premium,
        coverage.benchmark_premium - contribution,
    )));

    let net = allowed_credit - coverage.advance_credit;
    let (net_credit, excess_advance_repayment) = if net >= Decimal::ZERO {
        (round_half_up(net), Decimal::ZERO)
    } else {
        let excess = -net;
        let repayment = repayment_cap(ratio, status, config).map_or(excess, |cap| min(excess, cap));
        (Decimal::ZERO, round_half_up(repayment))
    };

    debug!(
        ratio = %ratio,
        applicable = %applicable,
        allowed = %allowed_credit,
        net_credit = %net_credit,
        repayment = %excess_advance_repayment,
        "premium tax credit"
    );

    PremiumTaxCreditReconciliation {
        poverty_line_ratio: round_rate(ratio),
        applicable_percentage: applicable,
        allowed_credit,
        net_credit,
        excess_advance_repayment,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::YearConfig;

    fn config() -> PremiumTaxCreditConfig {
        YearConfig::tax_year_2025().credits.premium_tax_credit
    }

    fn coverage(advance: Decimal) -> MarketplaceCoverage {
        MarketplaceCoverage {
            annual_premium: dec!(5000),
            benchmark_premium: dec!(6000),
            advance_credit: advance,
            household_size: 1,
        }
    }

    #[test]
    fn applicable_percentage_interpolates_inside_band() {
        let config = config();

        assert_eq!(applicable_percentage(dec!(1.2), &config), dec!(0));
        assert_eq!(applicable_percentage(dec!(2.25), &config), dec!(0.03));
        assert_eq!(applicable_percentage(dec!(5), &config), dec!(0.085));
    }

    #[test]
    fn surplus_over_advance_is_refundable() {
        // 200% FPL: 2% of 30120 = 602.40; premium caps the credit
        let result = reconcile(&coverage(dec!(4000)), dec!(30120), FilingStatus::Single, &config());

        assert_eq!(result.allowed_credit, dec!(5000.00));
        assert_eq!(result.net_credit, dec!(1000.00));
        assert_eq!(result.excess_advance_repayment, dec!(0));
    }

    #[test]
    fn excess_advance_repayment_is_capped() {
        let result = reconcile(&coverage(dec!(7000)), dec!(30120), FilingStatus::Single, &config());

        assert_eq!(result.excess_advance_repayment, dec!(975.00));
    }

    #[test]
    fn repayment_uncapped_above_last_band() {
        let result = reconcile(&coverage(dec!(3000)), dec!(90000), FilingStatus::Single, &config());

        // 8.5% × 90000 exceeds the benchmark: no credit, full repayment
        assert_eq!(result.allowed_credit, dec!(0));
        assert_eq!(result.excess_advance_repayment, dec!(3000.00));
    }
}
