//! Additional Medicare tax (Form 8959) and net investment income tax (Form 8960).

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{min, non_negative, round_half_up};
use crate::error::TaxEngineError;
use crate::models::{FilingStatus, SurtaxConfig};

/// Additional Medicare tax on wages and self-employment earnings.
///
/// The self-employment threshold is what is left of the filing-status
/// threshold after Medicare wages are counted against it.
///
/// # Errors
/// A missing threshold for the filing status is a configuration error.
pub fn additional_medicare_tax(
    medicare_wages: Decimal,
    se_net_earnings: Decimal,
    status: FilingStatus,
    config: &SurtaxConfig,
) -> Result<Decimal, TaxEngineError> {
    let threshold = config
        .additional_medicare_threshold
        .value(status, "surtaxes.additional_medicare_threshold")?;

    let wage_excess = non_negative(medicare_wages - threshold);
    let se_threshold = non_negative(threshold - medicare_wages);
    let se_excess = non_negative(non_negative(se_net_earnings) - se_threshold);

    Ok(round_half_up(
        (wage_excess + se_excess) * config.additional_medicare_rate,
    ))
}

/// # Errors
/// A missing threshold for the filing status is a configuration error.
pub fn net_investment_income_tax(
    net_investment_income: Decimal,
    magi: Decimal,
    status: FilingStatus,
    config: &SurtaxConfig,
) -> Result<Decimal, TaxEngineError> {
    let threshold = config
        .niit_threshold
        .value(status, "surtaxes.niit_threshold")?;
    let base = min(
        non_negative(net_investment_income),
        non_negative(magi - threshold),
    );
    let tax = round_half_up(base * config.niit_rate);

    debug!(base = %base, tax = %tax, "net investment income tax");
    Ok(tax)
}
