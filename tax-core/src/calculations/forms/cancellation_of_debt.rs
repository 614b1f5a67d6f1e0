//! Cancelled debt and the insolvency exclusion (Form 982).

use crate::calculations::common::{min, non_negative, round_half_up};
use crate::models::{CancellationOfDebt, FormOutcome};

pub fn evaluate(record: &CancellationOfDebt) -> FormOutcome {
    let insolvency = non_negative(record.liabilities_before - record.assets_before);
    let excluded = min(record.cancelled_amount, insolvency);

    FormOutcome {
        ordinary_income: round_half_up(record.cancelled_amount - excluded),
        ..FormOutcome::default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn insolvency_excludes_up_to_the_deficit() {
        let record = CancellationOfDebt {
            cancelled_amount: dec!(20000),
            liabilities_before: dec!(100000),
            assets_before: dec!(88000),
        };

        assert_eq!(evaluate(&record).ordinary_income, dec!(8000.00));
    }

    #[test]
    fn solvent_taxpayer_includes_everything() {
        let record = CancellationOfDebt {
            cancelled_amount: dec!(5000),
            liabilities_before: dec!(10000),
            assets_before: dec!(50000),
        };

        assert_eq!(evaluate(&record).ordinary_income, dec!(5000.00));
    }
}
