//! Installment sales (Form 6252).
//!
//! Gain is recognized as payments arrive, at the gross profit ratio.
//! Depreciation recapture is ordinary income in full in the year of sale.

use rust_decimal::Decimal;

use crate::calculations::common::{round_half_up, safe_ratio};
use crate::models::{FormOutcome, InstallmentSale, InstallmentSales};

fn recognized_gain(sale: &InstallmentSale) -> Decimal {
    let gross_profit = sale.selling_price
        - sale.adjusted_basis
        - sale.selling_expenses
        - sale.depreciation_recapture;
    if gross_profit <= Decimal::ZERO {
        // losses cannot be deferred
        return if sale.year_of_sale {
            gross_profit
        } else {
            Decimal::ZERO
        };
    }
    sale.payments_received * safe_ratio(gross_profit, sale.selling_price)
}

pub fn evaluate(record: &InstallmentSales) -> FormOutcome {
    let long_term_gain: Decimal = record.sales.iter().map(recognized_gain).sum();
    let recapture: Decimal = record
        .sales
        .iter()
        .filter(|s| s.year_of_sale)
        .map(|s| s.depreciation_recapture)
        .sum();

    FormOutcome {
        ordinary_income: round_half_up(recapture),
        long_term_gain: round_half_up(long_term_gain),
        ..FormOutcome::default()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn gain_recognized_at_gross_profit_ratio() {
        let record = InstallmentSales {
            sales: vec![InstallmentSale {
                selling_price: dec!(200000),
                adjusted_basis: dec!(100000),
                selling_expenses: dec!(10000),
                depreciation_recapture: dec!(10000),
                payments_received: dec!(50000),
                year_of_sale: true,
            }],
        };

        let outcome = evaluate(&record);

        // ratio 80000 / 200000
        assert_eq!(outcome.long_term_gain, dec!(20000.00));
        assert_eq!(outcome.ordinary_income, dec!(10000.00));
    }

    #[test]
    fn later_year_has_no_recapture() {
        let record = InstallmentSales {
            sales: vec![InstallmentSale {
                selling_price: dec!(100000),
                adjusted_basis: dec!(40000),
                depreciation_recapture: dec!(5000),
                payments_received: dec!(10000),
                ..InstallmentSale::default()
            }],
        };

        let outcome = evaluate(&record);

        assert_eq!(outcome.long_term_gain, dec!(5500.00));
        assert_eq!(outcome.ordinary_income, dec!(0));
    }
}
