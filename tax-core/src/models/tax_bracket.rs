use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TaxEngineError;

/// One tier of a progressive rate schedule.
///
/// A schedule is an ordered list of tiers; each tier's ceiling is the next
/// tier's floor, and the last tier is unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub floor: Decimal,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn new(
        floor: Decimal,
        rate: Decimal,
    ) -> Self {
        Self { floor, rate }
    }
}

/// Checks that a schedule starts at zero, ascends strictly, and carries sane rates.
pub fn validate_schedule(
    brackets: &[TaxBracket],
    path: &str,
) -> Result<(), TaxEngineError> {
    let Some(first) = brackets.first() else {
        return Err(TaxEngineError::configuration(path, "bracket table is empty"));
    };
    if !first.floor.is_zero() {
        return Err(TaxEngineError::configuration(
            format!("{path}[0].floor"),
            format!("first bracket must start at 0, got {}", first.floor),
        ));
    }
    for (i, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(TaxEngineError::configuration(
                format!("{path}[{i}].rate"),
                format!("rate must be between 0 and 1, got {}", bracket.rate),
            ));
        }
        if i > 0 && bracket.floor <= brackets[i - 1].floor {
            return Err(TaxEngineError::configuration(
                format!("{path}[{i}].floor"),
                format!(
                    "floors must ascend strictly ({} follows {})",
                    bracket.floor,
                    brackets[i - 1].floor
                ),
            ));
        }
    }
    Ok(())
}
