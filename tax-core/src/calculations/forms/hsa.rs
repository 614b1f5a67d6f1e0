//! Health savings account distributions and excess contributions (Form 8889 / 5329).

use rust_decimal::Decimal;

use crate::calculations::common::{round_half_up, sum_money};
use crate::models::{FormConfig, FormOutcome, HealthSavingsAccount};

pub fn evaluate(
    record: &HealthSavingsAccount,
    config: &FormConfig,
) -> FormOutcome {
    let distribution_tax = if record.exception_applies {
        Decimal::ZERO
    } else {
        record.nonqualified_distributions * config.hsa_distribution_rate
    };
    let excise = record.excess_contributions * config.hsa_excess_contribution_rate;

    FormOutcome {
        ordinary_income: round_half_up(record.nonqualified_distributions),
        additional_tax: sum_money([distribution_tax, excise]),
        ..FormOutcome::default()
    }
}
