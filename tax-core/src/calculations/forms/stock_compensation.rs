//! Equity compensation: ordinary income not already on a W-2, and the ISO spread for AMT.

use rust_decimal::Decimal;

use crate::calculations::common::{round_half_up, sum_money};
use crate::models::{FormOutcome, StockCompensation};

pub fn evaluate(record: &StockCompensation) -> FormOutcome {
    let ordinary_income = if record.included_in_wages {
        Decimal::ZERO
    } else {
        sum_money([
            record.nonqualified_option_spread,
            record.espp_ordinary_income,
            record.disqualifying_disposition_income,
        ])
    };

    FormOutcome {
        ordinary_income,
        amt_adjustment: round_half_up(record.iso_exercise_spread),
        ..FormOutcome::default()
    }
}
