//! Taxable Social Security benefits worksheet.
//!
//! Provisional income is every other item of income plus tax-exempt
//! interest plus half the benefits. Up to the base amount nothing is
//! taxable; between the base and adjusted base half the excess is; above
//! the adjusted base 85% of the excess plus the lesser of the middle-tier
//! cap, never more than 85% of benefits.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{min, non_negative, round_half_up};
use crate::error::TaxEngineError;
use crate::models::{FilingStatus, SocialSecurityBenefitsConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialSecurityTaxability {
    pub provisional_income: Decimal,
    pub taxable_benefits: Decimal,
}

/// # Errors
/// Missing base amounts for `status` are a configuration error.
pub fn taxable_benefits(
    gross_benefits: Decimal,
    other_income: Decimal,
    tax_exempt_interest: Decimal,
    status: FilingStatus,
    config: &SocialSecurityBenefitsConfig,
) -> Result<SocialSecurityTaxability, TaxEngineError> {
    let base = config
        .base_amount
        .value(status, "social_security.base_amount")?;
    let adjusted_base = config
        .adjusted_base_amount
        .value(status, "social_security.adjusted_base_amount")?;

    let half_benefits = gross_benefits * config.lower_rate;
    let provisional_income = round_half_up(other_income + tax_exempt_interest + half_benefits);

    if gross_benefits <= Decimal::ZERO || provisional_income <= base {
        return Ok(SocialSecurityTaxability {
            provisional_income,
            taxable_benefits: Decimal::ZERO,
        });
    }

    let taxable = if provisional_income <= adjusted_base {
        min(
            (provisional_income - base) * config.lower_rate,
            half_benefits,
        )
    } else {
        let middle_tier = min(
            non_negative(adjusted_base - base) * config.lower_rate,
            half_benefits,
        );
        min(
            (provisional_income - adjusted_base) * config.upper_rate + middle_tier,
            gross_benefits * config.upper_rate,
        )
    };
    let taxable_benefits = round_half_up(non_negative(taxable));

    debug!(
        provisional_income = %provisional_income,
        taxable_benefits = %taxable_benefits,
        "social security taxability"
    );

    Ok(SocialSecurityTaxability {
        provisional_income,
        taxable_benefits,
    })
}
