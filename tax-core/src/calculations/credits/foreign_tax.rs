//! Foreign tax credit (Form 1116, simplified).

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::common::{min, non_negative, round_half_up, safe_ratio};
use crate::error::TaxEngineError;
use crate::models::ForeignTaxCreditConfig;

use super::{CreditContext, TentativeCredit};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForeignTaxCredit {
    pub credit: TentativeCredit,
    pub disallowed: Decimal,
}

/// Foreign taxes at or under the de minimis amount are credited in full;
/// above it the credit is limited to the share of regular tax that foreign
/// source income bears to taxable income.
///
/// # Errors
/// A missing de minimis amount for the filing status is a configuration error.
pub fn foreign_tax_credit(
    ctx: &CreditContext<'_>,
    config: &ForeignTaxCreditConfig,
) -> Result<ForeignTaxCredit, TaxEngineError> {
    let paid = non_negative(ctx.credits.foreign_taxes_paid);
    if paid.is_zero() {
        return Ok(ForeignTaxCredit::default());
    }

    let de_minimis = config
        .de_minimis
        .value(ctx.profile.filing_status, "credits.foreign_tax.de_minimis")?;
    if paid <= de_minimis {
        return Ok(ForeignTaxCredit {
            credit: TentativeCredit::nonrefundable(round_half_up(paid)),
            disallowed: Decimal::ZERO,
        });
    }

    let fraction = min(
        safe_ratio(
            non_negative(ctx.credits.foreign_source_income),
            ctx.taxable_income,
        ),
        Decimal::ONE,
    );
    let limitation = non_negative(ctx.regular_tax) * fraction;
    let allowed = round_half_up(min(paid, limitation));
    let disallowed = round_half_up(paid - allowed);

    if disallowed > Decimal::ZERO {
        warn!(paid = %paid, limitation = %limitation, "foreign tax credit limited");
    }

    Ok(ForeignTaxCredit {
        credit: TentativeCredit::nonrefundable(allowed),
        disallowed,
    })
}
