//! Net operating loss carryforward deduction.
//!
//! Limited to a percentage of taxable income computed without the deduction;
//! preliminary AGI plus the other forms' income stands in for that figure.

use rust_decimal::Decimal;

use crate::calculations::common::{min, non_negative, round_half_up};
use crate::models::{FormConfig, FormOutcome, NetOperatingLoss};

pub fn evaluate(
    record: &NetOperatingLoss,
    income_before_nol: Decimal,
    config: &FormConfig,
) -> FormOutcome {
    let limit = non_negative(income_before_nol) * config.nol_taxable_income_limit;
    let deduction = min(non_negative(record.carryforward), limit);

    FormOutcome {
        ordinary_income: round_half_up(-deduction),
        ..FormOutcome::default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::YearConfig;

    #[test]
    fn deduction_limited_to_eighty_percent() {
        let config = YearConfig::tax_year_2025().forms;
        let record = NetOperatingLoss {
            carryforward: dec!(50000),
        };

        assert_eq!(
            evaluate(&record, dec!(40000), &config).ordinary_income,
            dec!(-32000.00)
        );
        assert_eq!(
            evaluate(&record, dec!(100000), &config).ordinary_income,
            dec!(-50000.00)
        );
        assert_eq!(
            evaluate(&record, dec!(-5000), &config).ordinary_income,
            dec!(0)
        );
    }
}
