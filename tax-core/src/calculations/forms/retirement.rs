//! Retirement plan distributions (Form 1099-R) and the early-distribution tax (Form 5329).

use rust_decimal::Decimal;

use crate::calculations::common::{non_negative, round_half_up, sum_money};
use crate::models::{FormConfig, FormOutcome, RetirementDistributions};

pub fn evaluate(
    record: &RetirementDistributions,
    config: &FormConfig,
) -> FormOutcome {
    let taxable = sum_money(record.distributions.iter().map(|d| d.taxable_amount));
    let subject_to_additional: Decimal = record
        .distributions
        .iter()
        .filter(|d| d.early)
        .map(|d| non_negative(d.taxable_amount - d.exception_amount))
        .sum();

    FormOutcome {
        ordinary_income: taxable,
        additional_tax: round_half_up(subject_to_additional * config.early_distribution_rate),
        ..FormOutcome::default()
    }
}
