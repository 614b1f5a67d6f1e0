//! Uncollected social security and Medicare tax on tips and group-term life insurance.

use crate::calculations::common::sum_money;
use crate::models::{FormOutcome, UncollectedFica};

pub fn evaluate(record: &UncollectedFica) -> FormOutcome {
    FormOutcome {
        additional_tax: sum_money([record.social_security, record.medicare]),
        ..FormOutcome::default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn both_shares_are_additional_tax() {
        let record = UncollectedFica {
            social_security: dec!(124.00),
            medicare: dec!(29.00),
        };

        assert_eq!(evaluate(&record).additional_tax, dec!(153.00));
    }
}
