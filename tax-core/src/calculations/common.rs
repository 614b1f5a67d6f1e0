//! Common utility functions for tax calculations.
//!
//! This module provides shared functionality used across every worksheet
//! and sub-engine: money rounding, clamping, guarded division and the
//! phase-out arithmetic that recurs throughout the code.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Arguments
///
/// * `value` - The decimal value to round
///
/// # Returns
///
/// The value rounded to two decimal places.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(123.456)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a ratio (effective rate, phase-out fraction for display) to four places.
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(200.00), dec!(100.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns the minimum of two decimal values.
pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// Clamps a value at zero from below.
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// Rounds every component to the cent, then rounds the sum.
///
/// Totals built this way equal the money-rounded sum of their published
/// components, which is what the result aggregate promises its readers.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::sum_money;
///
/// assert_eq!(sum_money([dec!(0.005), dec!(0.005)]), dec!(0.02));
/// ```
pub fn sum_money<I>(components: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    round_half_up(
        components
            .into_iter()
            .map(round_half_up)
            .fold(Decimal::ZERO, |acc, v| acc + v),
    )
}

/// Divides `numerator` by `denominator`, yielding zero when the denominator is zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::safe_ratio;
///
/// assert_eq!(safe_ratio(dec!(1), dec!(4)), dec!(0.25));
/// assert_eq!(safe_ratio(dec!(1), dec!(0)), dec!(0));
/// ```
pub fn safe_ratio(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Number of `step`-sized increments (or fractions thereof) contained in `excess`.
///
/// This is ceiling division, used by every "$50 for each $1,000 or fraction
/// thereof" phase-out. Floor division here would overstate the credit.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::ceil_steps;
///
/// assert_eq!(ceil_steps(dec!(1000), dec!(1000)), dec!(1));
/// assert_eq!(ceil_steps(dec!(1000.01), dec!(1000)), dec!(2));
/// assert_eq!(ceil_steps(dec!(0), dec!(1000)), dec!(0));
/// ```
pub fn ceil_steps(
    excess: Decimal,
    step: Decimal,
) -> Decimal {
    if excess <= Decimal::ZERO || step <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (excess / step).ceil()
}

/// Rounds a positive value up to the next multiple of `multiple`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_up_to_multiple;
///
/// assert_eq!(round_up_to_multiple(dec!(3501), dec!(10)), dec!(3510));
/// assert_eq!(round_up_to_multiple(dec!(3500), dec!(10)), dec!(3500));
/// ```
pub fn round_up_to_multiple(
    value: Decimal,
    multiple: Decimal,
) -> Decimal {
    if multiple <= Decimal::ZERO {
        return value;
    }
    (value / multiple).ceil() * multiple
}

/// Linear position of `income` inside the band `[start, end]`, clamped to `[0, 1]`.
///
/// Zero at or below `start`, one at or above `end`. A degenerate band
/// (`end <= start`) behaves as a cliff at `start`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::phase_out_ratio;
///
/// assert_eq!(phase_out_ratio(dec!(157500), dec!(150000), dec!(165000)), dec!(0.5));
/// assert_eq!(phase_out_ratio(dec!(100000), dec!(150000), dec!(165000)), dec!(0));
/// assert_eq!(phase_out_ratio(dec!(200000), dec!(150000), dec!(165000)), dec!(1));
/// ```
pub fn phase_out_ratio(
    income: Decimal,
    start: Decimal,
    end: Decimal,
) -> Decimal {
    if income <= start {
        return Decimal::ZERO;
    }
    if income >= end || end <= start {
        return Decimal::ONE;
    }
    safe_ratio(income - start, end - start)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46)); // Away from zero
    }

    #[test]
    fn round_half_up_handles_small_values() {
        let result = round_half_up(dec!(0.001));

        assert_eq!(result, dec!(0.00));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        let result = round_half_up(dec!(999999.999));

        assert_eq!(result, dec!(1000000.00));
    }

    #[test]
    fn round_rate_keeps_four_places() {
        assert_eq!(round_rate(dec!(0.123456)), dec!(0.1235));
    }

    // =========================================================================
    // max / min / non_negative tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
        assert_eq!(max(dec!(-50.00), dec!(50.00)), dec!(50.00));
    }

    #[test]
    fn min_returns_smaller_value() {
        assert_eq!(min(dec!(100.00), dec!(200.00)), dec!(100.00));
        assert_eq!(min(dec!(-50.00), dec!(50.00)), dec!(-50.00));
    }

    #[test]
    fn non_negative_clamps_at_zero() {
        assert_eq!(non_negative(dec!(-0.01)), dec!(0));
        assert_eq!(non_negative(dec!(12.34)), dec!(12.34));
    }

    // =========================================================================
    // sum_money tests
    // =========================================================================

    #[test]
    fn sum_money_rounds_components_before_summing() {
        // Unrounded sum would be 0.015 -> 0.02; per-component rounding gives 0.03.
        let result = sum_money([dec!(0.005), dec!(0.005), dec!(0.005)]);

        assert_eq!(result, dec!(0.03));
    }

    #[test]
    fn sum_money_of_nothing_is_zero() {
        assert_eq!(sum_money(Vec::new()), dec!(0));
    }

    // =========================================================================
    // safe_ratio / ceil_steps / round_up_to_multiple tests
    // =========================================================================

    #[test]
    fn safe_ratio_guards_zero_denominator() {
        assert_eq!(safe_ratio(dec!(500), dec!(0)), dec!(0));
    }

    #[test]
    fn ceil_steps_counts_partial_step() {
        // $1 over the threshold is a whole $1,000 step.
        assert_eq!(ceil_steps(dec!(1), dec!(1000)), dec!(1));
        assert_eq!(ceil_steps(dec!(2000), dec!(1000)), dec!(2));
        assert_eq!(ceil_steps(dec!(2000.01), dec!(1000)), dec!(3));
    }

    #[test]
    fn ceil_steps_ignores_negative_excess() {
        assert_eq!(ceil_steps(dec!(-5), dec!(1000)), dec!(0));
    }

    #[test]
    fn round_up_to_multiple_handles_fractional_cents() {
        assert_eq!(round_up_to_multiple(dec!(3500.01), dec!(10)), dec!(3510));
    }

    // =========================================================================
    // phase_out_ratio tests
    // =========================================================================

    #[test]
    fn phase_out_ratio_is_linear_inside_band() {
        assert_eq!(
            phase_out_ratio(dec!(210000), dec!(197300), dec!(247300)),
            dec!(0.254)
        );
    }

    #[test]
    fn phase_out_ratio_degenerate_band_is_cliff() {
        assert_eq!(phase_out_ratio(dec!(10), dec!(0), dec!(0)), dec!(1));
        assert_eq!(phase_out_ratio(dec!(0), dec!(0), dec!(0)), dec!(0));
    }
}
