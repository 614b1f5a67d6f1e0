//! Passive activity loss limitation (Form 8582).
//!
//! A net passive loss is allowed only through the rental real estate
//! allowance for active participants. The allowance shrinks by half of
//! MAGI over the phase-out start; what it does not absorb is suspended.

use rust_decimal::Decimal;
use tracing::warn;

use crate::calculations::common::{min, non_negative, round_half_up};
use crate::error::TaxEngineError;
use crate::models::{FilingStatus, FormConfig, FormOutcome, PassiveActivities};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassiveOutcome {
    pub outcome: FormOutcome,
    pub suspended_loss: Decimal,
}

/// # Errors
/// Missing per-status allowance tables are a configuration error.
pub fn evaluate(
    record: &PassiveActivities,
    magi: Decimal,
    status: FilingStatus,
    config: &FormConfig,
) -> Result<PassiveOutcome, TaxEngineError> {
    let net = record.rental_net + record.other_passive_net - record.prior_year_suspended_loss;
    let amt_adjustment = round_half_up(record.amt_adjustment);

    if net >= Decimal::ZERO {
        return Ok(PassiveOutcome {
            outcome: FormOutcome {
                ordinary_income: round_half_up(net),
                amt_adjustment,
                ..FormOutcome::default()
            },
            suspended_loss: Decimal::ZERO,
        });
    }

    let total_loss = -net;
    let allowed = if record.active_participation {
        let allowance = config
            .passive_rental_allowance
            .value(status, "forms.passive_rental_allowance")?;
        let start = config
            .passive_phase_out_start
            .value(status, "forms.passive_phase_out_start")?;
        let allowance =
            non_negative(allowance - non_negative(magi - start) * config.passive_phase_out_rate);
        let rental_loss = non_negative(-record.rental_net) + record.prior_year_suspended_loss;
        min(min(total_loss, rental_loss), allowance)
    } else {
        Decimal::ZERO
    };
    let suspended_loss = round_half_up(total_loss - allowed);

    if suspended_loss > Decimal::ZERO {
        warn!(
            loss = %total_loss,
            allowed = %allowed,
            suspended = %suspended_loss,
            "passive loss suspended"
        );
    }

    Ok(PassiveOutcome {
        outcome: FormOutcome {
            ordinary_income: round_half_up(-allowed),
            amt_adjustment,
            ..FormOutcome::default()
        },
        suspended_loss,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::YearConfig;

    fn config() -> FormConfig {
        YearConfig::tax_year_2025().forms
    }

    #[test]
    fn net_passive_income_included() {
        let record = PassiveActivities {
            rental_net: dec!(12000),
            other_passive_net: dec!(-2000),
            ..PassiveActivities::default()
        };

        let result = evaluate(&record, dec!(80000), FilingStatus::Single, &config()).unwrap();

        assert_eq!(result.outcome.ordinary_income, dec!(10000.00));
        assert_eq!(result.suspended_loss, dec!(0));
    }

    #[test]
    fn rental_loss_allowed_up_to_phased_allowance() {
        let record = PassiveActivities {
            rental_net: dec!(-30000),
            active_participation: true,
            ..PassiveActivities::default()
        };

        // allowance 25000 − 50% × 20000
        let result = evaluate(&record, dec!(120000), FilingStatus::Single, &config()).unwrap();

        assert_eq!(result.outcome.ordinary_income, dec!(-15000.00));
        assert_eq!(result.suspended_loss, dec!(15000.00));
    }

    #[test]
    fn loss_fully_suspended_without_active_participation() {
        let record = PassiveActivities {
            rental_net: dec!(-5000),
            prior_year_suspended_loss: dec!(1000),
            ..PassiveActivities::default()
        };

        let result = evaluate(&record, dec!(50000), FilingStatus::Single, &config()).unwrap();

        assert_eq!(result.outcome.ordinary_income, dec!(0));
        assert_eq!(result.suspended_loss, dec!(6000.00));
    }
}
