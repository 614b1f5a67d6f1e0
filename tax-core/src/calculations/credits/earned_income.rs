//! Earned income credit (Schedule EIC).
//!
//! Three regions: a phase-in proportional to earned income, a plateau at the
//! maximum credit, and a phase-out proportional to the greater of earned
//! income and AGI past the start for the filing status.

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{max, min, non_negative, round_half_up};
use crate::models::{EarnedIncomeCreditConfig, FilingStatus};

use super::{CreditContext, TentativeCredit};

const MAX_CHILD_TIER: usize = 3;

fn childless_age_ok(
    ctx: &CreditContext<'_>,
    config: &EarnedIncomeCreditConfig,
) -> bool {
    let in_range = |age: u32| (config.childless_min_age..=config.childless_max_age).contains(&age);
    in_range(ctx.profile.taxpayer_age)
        || (ctx.profile.filing_status.is_joint() && ctx.profile.spouse_age.is_some_and(in_range))
}

pub fn earned_income_credit(
    ctx: &CreditContext<'_>,
    config: &EarnedIncomeCreditConfig,
) -> TentativeCredit {
    let status = ctx.profile.filing_status;
    if status == FilingStatus::MarriedFilingSeparately
        || ctx.profile.can_be_claimed_as_dependent
        || ctx.investment_income > config.investment_income_limit
        || ctx.earned_income <= Decimal::ZERO
    {
        return TentativeCredit::default();
    }

    let children = ctx
        .profile
        .dependents
        .iter()
        .filter(|d| d.eitc_qualifying())
        .count();
    if children == 0 && !childless_age_ok(ctx, config) {
        return TentativeCredit::default();
    }

    let Some(tier) = config.tiers.get(tier_index(children, config.tiers.len())) else {
        return TentativeCredit::default();
    };

    let phase_in = min(
        min(ctx.earned_income, tier.earned_income_amount) * tier.phase_in_rate,
        tier.max_credit,
    );
    let start = if status.is_joint() {
        tier.phase_out_start_joint
    } else {
        tier.phase_out_start
    };
    let reduction = non_negative(max(ctx.earned_income, ctx.agi) - start) * tier.phase_out_rate;
    let credit = round_half_up(non_negative(phase_in - reduction));

    debug!(
        children,
        phase_in = %phase_in,
        reduction = %reduction,
        credit = %credit,
        "earned income credit"
    );
    TentativeCredit::refundable(credit)
}

fn tier_index(
    children: usize,
    tiers: usize,
) -> usize {
    children.min(MAX_CHILD_TIER).min(tiers.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{CreditInputs, Dependent, TaxpayerProfile, YearConfig};

    fn qualifying_child() -> Dependent {
        Dependent {
            age: 8,
            months_lived_with_taxpayer: 12,
            has_ssn: true,
            qualifying_child: true,
            ..Dependent::default()
        }
    }

    fn run(
        profile: &TaxpayerProfile,
        earned: Decimal,
        agi: Decimal,
    ) -> Decimal {
        let inputs = CreditInputs::default();
        let ctx = CreditContext::for_test(profile, &inputs, agi, earned);
        earned_income_credit(&ctx, &YearConfig::tax_year_2025().credits.earned_income).refundable
    }

    fn single_parent(children: usize) -> TaxpayerProfile {
        TaxpayerProfile {
            filing_status: FilingStatus::HeadOfHousehold,
            taxpayer_age: 30,
            dependents: vec![qualifying_child(); children],
            ..TaxpayerProfile::default()
        }
    }

    #[test]
    fn plateau_pays_maximum() {
        assert_eq!(
            run(&single_parent(1), dec!(20000), dec!(20000)),
            dec!(4328.00)
        );
    }

    #[test]
    fn phase_in_proportional_to_earnings() {
        // 5000 × 34%
        assert_eq!(
            run(&single_parent(1), dec!(5000), dec!(5000)),
            dec!(1700.00)
        );
    }

    #[test]
    fn phase_out_uses_greater_of_earned_and_agi() {
        // 4328 − 15.98% × (30000 − 23350)
        assert_eq!(
            run(&single_parent(1), dec!(20000), dec!(30000)),
            dec!(3265.33)
        );
    }

    #[test]
    fn four_children_use_three_child_table() {
        assert_eq!(
            run(&single_parent(4), dec!(20000), dec!(20000)),
            dec!(8046.00)
        );
    }

    #[test]
    fn childless_filer_outside_age_range_gets_nothing() {
        let mut profile = single_parent(0);
        profile.filing_status = FilingStatus::Single;
        profile.taxpayer_age = 22;

        assert_eq!(run(&profile, dec!(8000), dec!(8000)), dec!(0));

        profile.taxpayer_age = 30;
        // 8000 × 7.65%
        assert_eq!(run(&profile, dec!(8000), dec!(8000)), dec!(612.00));
    }

    #[test]
    fn separate_filer_and_investment_income_excluded() {
        let mut profile = single_parent(1);
        profile.filing_status = FilingStatus::MarriedFilingSeparately;
        assert_eq!(run(&profile, dec!(20000), dec!(20000)), dec!(0));

        let profile = single_parent(1);
        let inputs = CreditInputs::default();
        let mut ctx = CreditContext::for_test(&profile, &inputs, dec!(20000), dec!(20000));
        ctx.investment_income = dec!(12000);
        let credit =
            earned_income_credit(&ctx, &YearConfig::tax_year_2025().credits.earned_income);
        assert_eq!(credit.refundable, dec!(0));
    }
}
