//! Household employment taxes (Schedule H).

use rust_decimal::Decimal;

use crate::calculations::common::{min, round_half_up};
use crate::models::{FormConfig, FormOutcome, HouseholdEmployment};

pub fn evaluate(
    record: &HouseholdEmployment,
    config: &FormConfig,
) -> FormOutcome {
    let fica_wages: Decimal = record
        .cash_wages_per_employee
        .iter()
        .filter(|&&w| w >= config.household_wage_threshold)
        .sum();
    let futa_wages: Decimal = if record.quarterly_threshold_met {
        record
            .cash_wages_per_employee
            .iter()
            .map(|&w| min(w, config.futa_wage_base))
            .sum()
    } else {
        Decimal::ZERO
    };

    FormOutcome {
        additional_tax: round_half_up(
            fica_wages * config.household_fica_rate + futa_wages * config.futa_rate,
        ),
        ..FormOutcome::default()
    }
}
