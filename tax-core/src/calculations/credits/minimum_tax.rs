//! Credit for prior-year minimum tax (Form 8801).
//!
//! The credit is the carryforward, limited to regular tax minus tentative
//! minimum tax.

use rust_decimal::Decimal;

use crate::calculations::common::{min, non_negative, round_half_up};

use super::TentativeCredit;

pub fn minimum_tax_credit(
    carryforward: Decimal,
    regular_tax: Decimal,
    tentative_minimum_tax: Decimal,
) -> TentativeCredit {
    TentativeCredit::nonrefundable(round_half_up(min(
        non_negative(carryforward),
        non_negative(regular_tax - tentative_minimum_tax),
    )))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn limited_to_regular_tax_over_tentative_minimum() {
        assert_eq!(
            minimum_tax_credit(dec!(10000), dec!(30000), dec!(26000)).nonrefundable,
            dec!(4000.00)
        );
        assert_eq!(
            minimum_tax_credit(dec!(1000), dec!(30000), dec!(26000)).nonrefundable,
            dec!(1000.00)
        );
        assert_eq!(
            minimum_tax_credit(dec!(1000), dec!(20000), dec!(26000)).nonrefundable,
            dec!(0)
        );
    }
}
