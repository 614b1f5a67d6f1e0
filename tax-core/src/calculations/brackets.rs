//! Ordinary bracket tax and 0% / 15% / 20% preferential stacking.

use rust_decimal::Decimal;

use crate::calculations::common::{max, min, non_negative, round_half_up};
use crate::error::TaxEngineError;
use crate::models::{BracketSlice, FilingStatus, PreferentialRates, TaxBracket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdinaryTax {
    /// Sum of partial bracket taxes, rounded once.
    pub tax: Decimal,
    pub slices: Vec<BracketSlice>,
}

/// Tax on `income` through a progressive schedule.
///
/// Each slice carries its own rounded tax for display; the total is
/// computed from the unrounded partials so it is rounded exactly once.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::brackets::ordinary_tax;
/// use tax_core::models::{FilingStatus, YearConfig};
///
/// let config = YearConfig::tax_year_2025();
/// let brackets = config.brackets_for(FilingStatus::Single).unwrap();
///
/// assert_eq!(ordinary_tax(dec!(20000), brackets).tax, dec!(2161.50));
/// ```
pub fn ordinary_tax(
    income: Decimal,
    brackets: &[TaxBracket],
) -> OrdinaryTax {
    let mut total = Decimal::ZERO;
    let mut slices = Vec::new();

    if income <= Decimal::ZERO {
        return OrdinaryTax {
            tax: Decimal::ZERO,
            slices,
        };
    }

    for (i, bracket) in brackets.iter().enumerate() {
        if income <= bracket.floor {
            break;
        }
        let ceiling = brackets
            .get(i + 1)
            .map_or(income, |next| min(income, next.floor));
        let slice_income = ceiling - bracket.floor;
        let partial = slice_income * bracket.rate;
        total += partial;
        slices.push(BracketSlice {
            floor: bracket.floor,
            rate: bracket.rate,
            income: slice_income,
            tax: round_half_up(partial),
        });
    }

    OrdinaryTax {
        tax: round_half_up(total),
        slices,
    }
}

/// Rate of the bracket the last dollar of `income` falls into; zero when
/// there is no taxable income.
pub fn marginal_rate(
    income: Decimal,
    brackets: &[TaxBracket],
) -> Decimal {
    if income <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    brackets
        .iter()
        .rev()
        .find(|b| income > b.floor)
        .map_or(Decimal::ZERO, |b| b.rate)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferentialTax {
    pub tax: Decimal,
    pub zero_rate_amount: Decimal,
    pub middle_rate_amount: Decimal,
    pub top_rate_amount: Decimal,
    /// No thresholds were configured; the amount was taxed through the ordinary brackets.
    pub used_ordinary_fallback: bool,
}

/// Tax on `preferential` income stacked on top of `ordinary` income.
///
/// Without configured thresholds the preferential amount is taxed as the
/// difference between ordinary tax on the combined amount and on ordinary
/// income alone.
///
/// # Errors
/// A threshold table missing the filing status is a configuration error.
pub fn preferential_tax(
    ordinary: Decimal,
    preferential: Decimal,
    status: FilingStatus,
    brackets: &[TaxBracket],
    rates: Option<&PreferentialRates>,
) -> Result<PreferentialTax, TaxEngineError> {
    let ordinary = non_negative(ordinary);
    let preferential = non_negative(preferential);

    if preferential.is_zero() {
        return Ok(PreferentialTax::default());
    }

    let Some(rates) = rates else {
        let combined = ordinary_tax(ordinary + preferential, brackets).tax;
        let alone = ordinary_tax(ordinary, brackets).tax;
        return Ok(PreferentialTax {
            tax: round_half_up(combined - alone),
            used_ordinary_fallback: true,
            ..PreferentialTax::default()
        });
    };

    let zero_ceiling = rates
        .zero_rate_ceiling
        .value(status, "preferential.zero_rate_ceiling")?;
    let fifteen_ceiling = rates
        .fifteen_rate_ceiling
        .value(status, "preferential.fifteen_rate_ceiling")?;

    let zero_rate_amount = min(preferential, non_negative(zero_ceiling - ordinary));
    let remaining = preferential - zero_rate_amount;
    let middle_rate_amount = min(
        remaining,
        non_negative(fifteen_ceiling - max(ordinary, zero_ceiling)),
    );
    let top_rate_amount = remaining - middle_rate_amount;

    let tax = round_half_up(
        middle_rate_amount * rates.middle_rate + top_rate_amount * rates.top_rate,
    );

    Ok(PreferentialTax {
        tax,
        zero_rate_amount,
        middle_rate_amount,
        top_rate_amount,
        used_ordinary_fallback: false,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::YearConfig;

    fn single() -> Vec<TaxBracket> {
        YearConfig::tax_year_2025()
            .brackets_for(FilingStatus::Single)
            .unwrap()
            .to_vec()
    }

    fn joint() -> Vec<TaxBracket> {
        YearConfig::tax_year_2025()
            .brackets_for(FilingStatus::MarriedFilingJointly)
            .unwrap()
            .to_vec()
    }

    // =========================================================================
    // ordinary_tax tests
    // =========================================================================

    #[test]
    fn ordinary_tax_first_bracket_only() {
        assert_eq!(ordinary_tax(dec!(10000), &single()).tax, dec!(1000.00));
    }

    #[test]
    fn ordinary_tax_spans_two_brackets() {
        let result = ordinary_tax(dec!(20000), &single());

        // 11925 × 10% + 8075 × 12%
        assert_eq!(result.tax, dec!(2161.50));
        assert_eq!(result.slices.len(), 2);
        assert_eq!(result.slices[1].income, dec!(8075));
    }

    #[test]
    fn ordinary_tax_joint_schedule() {
        // 23850 × 10% + 6150 × 12%
        assert_eq!(ordinary_tax(dec!(30000), &joint()).tax, dec!(3123.00));
    }

    #[test]
    fn ordinary_tax_top_bracket_is_unbounded() {
        // 188769.75 at the 37% floor
        let result = ordinary_tax(dec!(726350), &single());

        assert_eq!(result.tax, dec!(225769.75));
        assert_eq!(result.slices.len(), 7);
    }

    #[test]
    fn ordinary_tax_zero_and_negative_income() {
        assert_eq!(ordinary_tax(dec!(0), &single()).tax, dec!(0));
        assert!(ordinary_tax(dec!(-50), &single()).slices.is_empty());
    }

    #[test]
    fn ordinary_tax_rounds_once_within_a_cent_of_slice_sum() {
        let result = ordinary_tax(dec!(48475.05), &single());
        let slice_sum: Decimal = result.slices.iter().map(|s| s.tax).sum();

        assert!((result.tax - slice_sum).abs() <= dec!(0.01));
    }

    // =========================================================================
    // marginal_rate tests
    // =========================================================================

    #[test]
    fn marginal_rate_at_floor_stays_in_lower_bracket() {
        assert_eq!(marginal_rate(dec!(11925), &single()), dec!(0.10));
        assert_eq!(marginal_rate(dec!(11925.01), &single()), dec!(0.12));
    }

    #[test]
    fn marginal_rate_zero_without_income() {
        assert_eq!(marginal_rate(dec!(0), &single()), dec!(0));
    }

    // =========================================================================
    // preferential_tax tests
    // =========================================================================

    #[test]
    fn preferential_fits_entirely_in_zero_band() {
        let config = YearConfig::tax_year_2025();

        let result = preferential_tax(
            dec!(30000),
            dec!(10000),
            FilingStatus::Single,
            &single(),
            config.preferential.as_ref(),
        )
        .unwrap();

        assert_eq!(result.zero_rate_amount, dec!(10000));
        assert_eq!(result.tax, dec!(0));
    }

    #[test]
    fn preferential_straddles_zero_and_fifteen_bands() {
        let config = YearConfig::tax_year_2025();

        let result = preferential_tax(
            dec!(40000),
            dec!(20000),
            FilingStatus::Single,
            &single(),
            config.preferential.as_ref(),
        )
        .unwrap();

        // 8350 at 0%, 11650 at 15%
        assert_eq!(result.zero_rate_amount, dec!(8350));
        assert_eq!(result.middle_rate_amount, dec!(11650));
        assert_eq!(result.tax, dec!(1747.50));
    }

    #[test]
    fn preferential_reaches_top_band() {
        let config = YearConfig::tax_year_2025();

        let result = preferential_tax(
            dec!(500000),
            dec!(100000),
            FilingStatus::Single,
            &single(),
            config.preferential.as_ref(),
        )
        .unwrap();

        // 33400 at 15%, 66600 at 20%
        assert_eq!(result.middle_rate_amount, dec!(33400));
        assert_eq!(result.top_rate_amount, dec!(66600));
        assert_eq!(result.tax, dec!(18330.00));
    }

    #[test]
    fn preferential_falls_back_to_ordinary_brackets() {
        let result = preferential_tax(
            dec!(10000),
            dec!(10000),
            FilingStatus::Single,
            &single(),
            None,
        )
        .unwrap();

        assert!(result.used_ordinary_fallback);
        // 2161.50 − 1000.00
        assert_eq!(result.tax, dec!(1161.50));
    }

    #[test]
    fn preferential_missing_status_is_configuration_error() {
        let mut rates = YearConfig::tax_year_2025().preferential.unwrap();
        rates.zero_rate_ceiling.head_of_household = None;

        let result = preferential_tax(
            dec!(10000),
            dec!(10000),
            FilingStatus::HeadOfHousehold,
            &single(),
            Some(&rates),
        );

        assert!(matches!(result, Err(TaxEngineError::Configuration { .. })));
    }
}
