//! Section 179 expensing and regular depreciation (Form 4562).

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{min, non_negative, round_half_up};
use crate::models::{Depreciation, FormConfig, FormOutcome};

/// Section 179 deduction allowed this year and the amount carried to next year.
pub fn section_179(
    record: &Depreciation,
    config: &FormConfig,
) -> (Decimal, Decimal) {
    let dollar_limit = non_negative(
        config.section_179_limit
            - non_negative(record.section_179_cost - config.section_179_phase_out_start),
    );
    let available = record.section_179_elected + record.section_179_carryover;
    let allowed = min(
        min(available, dollar_limit),
        non_negative(record.business_income_limit),
    );
    (round_half_up(allowed), round_half_up(available - allowed))
}

pub fn evaluate(
    record: &Depreciation,
    config: &FormConfig,
) -> FormOutcome {
    let (allowed, carryover) = section_179(record, config);
    debug!(allowed = %allowed, carryover = %carryover, "section 179");

    FormOutcome {
        ordinary_income: round_half_up(-(allowed + record.regular_depreciation)),
        amt_adjustment: round_half_up(record.regular_depreciation - record.amt_depreciation),
        ..FormOutcome::default()
    }
}
