//! Subpart F and tested-income inclusions from controlled foreign corporations.

use crate::calculations::common::sum_money;
use crate::models::{ForeignCorporationInclusion, FormOutcome};

pub fn evaluate(record: &ForeignCorporationInclusion) -> FormOutcome {
    FormOutcome {
        ordinary_income: sum_money([record.subpart_f_income, record.tested_income_inclusion]),
        ..FormOutcome::default()
    }
}
