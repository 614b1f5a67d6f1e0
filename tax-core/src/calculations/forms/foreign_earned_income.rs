//! Foreign earned income and housing exclusions (Form 2555).
//!
//! Both limits are prorated by qualifying days. The housing exclusion is
//! taken first and the earned income exclusion covers what remains.

use rust_decimal::Decimal;

use crate::calculations::common::{min, non_negative, round_half_up, safe_ratio};
use crate::models::{ForeignEarnedIncome, FormConfig, FormOutcome};

pub fn evaluate(
    record: &ForeignEarnedIncome,
    config: &FormConfig,
) -> FormOutcome {
    let fraction = min(
        safe_ratio(Decimal::from(record.qualifying_days), config.days_in_year),
        Decimal::ONE,
    );
    let maximum = config.foreign_earned_income_max * fraction;
    let housing_base = maximum * config.foreign_housing_base_rate;
    let housing_cap = maximum * config.foreign_housing_cap_rate;

    let earned = non_negative(record.foreign_earned_income);
    let housing = min(
        non_negative(min(record.housing_expenses, housing_cap) - housing_base),
        earned,
    );
    let exclusion = min(earned - housing, maximum);

    FormOutcome {
        ordinary_income: round_half_up(-(housing + exclusion)),
        ..FormOutcome::default()
    }
}
