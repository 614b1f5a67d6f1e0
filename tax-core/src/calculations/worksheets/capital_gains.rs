//! Capital gain netting and the capital loss carryover worksheet.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{max, min, non_negative, round_half_up};
use crate::models::CapitalTransactions;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainResult {
    pub net_short_term: Decimal,
    pub net_long_term: Decimal,
    /// Amount entering gross income: the net gain, or the allowed loss as a negative.
    pub included: Decimal,
    /// Net long-term gain over any net short-term loss; taxed at preferential rates.
    pub net_capital_gain: Decimal,
    pub short_term_carryforward: Decimal,
    pub long_term_carryforward: Decimal,
}

/// Nets short against short and long against long, then crosses the two.
///
/// A net loss enters income only up to `loss_limit`; the short-term part of
/// the loss is absorbed by the allowance first and the rest carries forward
/// keeping its character. `extra_long_term` carries long-term gain that
/// originates outside the transaction record (installment sales).
pub fn net_capital_gains(
    capital: &CapitalTransactions,
    extra_long_term: Decimal,
    loss_limit: Decimal,
) -> CapitalGainResult {
    let short_term =
        capital.short_term_gains - capital.short_term_losses - capital.short_term_carryover;
    let long_term = capital.long_term_gains + capital.capital_gain_distributions + extra_long_term
        - capital.long_term_losses
        - capital.long_term_carryover;
    let net = short_term + long_term;

    let result = if net >= Decimal::ZERO {
        CapitalGainResult {
            net_short_term: round_half_up(short_term),
            net_long_term: round_half_up(long_term),
            included: round_half_up(net),
            net_capital_gain: round_half_up(non_negative(min(long_term, net))),
            short_term_carryforward: Decimal::ZERO,
            long_term_carryforward: Decimal::ZERO,
        }
    } else {
        let allowed = min(-net, loss_limit);
        let short_term_carryforward = if short_term < Decimal::ZERO {
            non_negative(-short_term - non_negative(long_term) - allowed)
        } else {
            Decimal::ZERO
        };
        let long_term_carryforward = if long_term < Decimal::ZERO {
            let allowance_left = non_negative(allowed - max(-short_term, Decimal::ZERO));
            non_negative(-long_term - non_negative(short_term) - allowance_left)
        } else {
            Decimal::ZERO
        };
        CapitalGainResult {
            net_short_term: round_half_up(short_term),
            net_long_term: round_half_up(long_term),
            included: round_half_up(-allowed),
            net_capital_gain: Decimal::ZERO,
            short_term_carryforward: round_half_up(short_term_carryforward),
            long_term_carryforward: round_half_up(long_term_carryforward),
        }
    };

    debug!(
        net_short_term = %result.net_short_term,
        net_long_term = %result.net_long_term,
        included = %result.included,
        "capital gain netting"
    );
    result
}
