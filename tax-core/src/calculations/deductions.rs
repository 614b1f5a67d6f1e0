//! Standard deduction, Schedule A, and the choice between them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{max, min, non_negative, round_half_up, sum_money};
use crate::error::TaxEngineError;
use crate::models::{
    FilingStatus, ItemizedDeductionConfig, ItemizedInputs, StandardDeductionConfig,
    TaxpayerProfile,
};

const SENIOR_AGE: u32 = 65;

fn additional_amount(
    status: FilingStatus,
    config: &StandardDeductionConfig,
) -> Decimal {
    match status {
        FilingStatus::Single | FilingStatus::HeadOfHousehold => config.additional_unmarried,
        FilingStatus::MarriedFilingJointly
        | FilingStatus::MarriedFilingSeparately
        | FilingStatus::QualifyingSurvivingSpouse => config.additional_married,
    }
}

/// Standard deduction including the age-65 and blindness additions.
///
/// Someone who can be claimed as a dependent is limited to the larger of the
/// dependent floor and earned income plus the add-on, never above the base.
///
/// # Errors
/// A missing base amount for the filing status is a configuration error.
pub fn standard_deduction(
    profile: &TaxpayerProfile,
    earned_income: Decimal,
    config: &StandardDeductionConfig,
) -> Result<Decimal, TaxEngineError> {
    let status = profile.filing_status;
    let base = config.base.value(status, "standard_deduction.base")?;

    let base = if profile.can_be_claimed_as_dependent {
        min(
            base,
            max(
                config.dependent_floor,
                non_negative(earned_income) + config.dependent_earned_addon,
            ),
        )
    } else {
        base
    };

    let mut boxes = u32::from(profile.taxpayer_age >= SENIOR_AGE) + u32::from(profile.taxpayer_blind);
    if status.is_joint() {
        boxes += u32::from(profile.spouse_age.is_some_and(|age| age >= SENIOR_AGE))
            + u32::from(profile.spouse_blind);
    }

    Ok(round_half_up(
        base + Decimal::from(boxes) * additional_amount(status, config),
    ))
}

/// Schedule A, line by line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedDeduction {
    pub medical: Decimal,
    pub taxes: Decimal,
    pub mortgage_interest: Decimal,
    pub charitable: Decimal,
    pub casualty: Decimal,
    pub gambling_losses: Decimal,
    pub other: Decimal,
    pub total: Decimal,
}

/// SALT cap after the high-income phase-down, never below the floor.
///
/// # Errors
/// Missing per-status SALT tables are a configuration error.
pub fn salt_cap(
    magi: Decimal,
    status: FilingStatus,
    config: &ItemizedDeductionConfig,
) -> Result<Decimal, TaxEngineError> {
    let cap = config.salt_cap.value(status, "itemized.salt_cap")?;
    let floor = config.salt_cap_floor.value(status, "itemized.salt_cap_floor")?;
    let threshold = config
        .salt_phase_down_threshold
        .value(status, "itemized.salt_phase_down_threshold")?;

    let reduction = non_negative(magi - threshold) * config.salt_phase_down_rate;
    Ok(round_half_up(max(floor, cap - reduction)))
}

/// # Errors
/// Missing per-status SALT tables are a configuration error.
pub fn itemized_deduction(
    inputs: &ItemizedInputs,
    agi: Decimal,
    gambling_winnings: Decimal,
    status: FilingStatus,
    config: &ItemizedDeductionConfig,
) -> Result<ItemizedDeduction, TaxEngineError> {
    let agi_base = non_negative(agi);

    let medical = round_half_up(non_negative(
        inputs.medical_expenses - agi_base * config.medical_agi_floor_rate,
    ));
    let taxes = round_half_up(min(
        inputs.state_local_taxes + inputs.real_estate_taxes,
        salt_cap(agi, status, config)?,
    ));
    let cash = min(
        inputs.charitable_cash,
        agi_base * config.charitable_cash_agi_limit,
    );
    let noncash = min(
        inputs.charitable_noncash,
        agi_base * config.charitable_noncash_agi_limit,
    );
    let charitable = round_half_up(min(
        cash + noncash,
        agi_base * config.charitable_cash_agi_limit,
    ));
    let gambling_losses = round_half_up(min(inputs.gambling_losses, non_negative(gambling_winnings)));

    let mut deduction = ItemizedDeduction {
        medical,
        taxes,
        mortgage_interest: round_half_up(inputs.mortgage_interest),
        charitable,
        casualty: round_half_up(inputs.casualty_losses),
        gambling_losses,
        other: round_half_up(inputs.other_itemized),
        total: Decimal::ZERO,
    };
    deduction.total = sum_money([
        deduction.medical,
        deduction.taxes,
        deduction.mortgage_interest,
        deduction.charitable,
        deduction.casualty,
        deduction.gambling_losses,
        deduction.other,
    ]);
    Ok(deduction)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionChoice {
    pub standard: Decimal,
    pub itemized: ItemizedDeduction,
    pub itemize: bool,
    pub taken: Decimal,
}

/// Takes the larger deduction unless the return must itemize.
pub fn choose_deduction(
    standard: Decimal,
    itemized: ItemizedDeduction,
    must_itemize: bool,
) -> DeductionChoice {
    let itemize = must_itemize || itemized.total > standard;
    let taken = if itemize { itemized.total } else { standard };

    debug!(
        standard = %standard,
        itemized = %itemized.total,
        itemize,
        "deduction choice"
    );

    DeductionChoice {
        standard,
        itemized,
        itemize,
        taken,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::YearConfig;

    fn profile(status: FilingStatus) -> TaxpayerProfile {
        TaxpayerProfile {
            filing_status: status,
            taxpayer_age: 40,
            ..TaxpayerProfile::default()
        }
    }

    // =========================================================================
    // standard deduction
    // =========================================================================

    #[test]
    fn standard_deduction_base_by_status() {
        let config = YearConfig::tax_year_2025().standard_deduction;

        assert_eq!(
            standard_deduction(&profile(FilingStatus::Single), dec!(0), &config).unwrap(),
            dec!(15750.00)
        );
        assert_eq!(
            standard_deduction(&profile(FilingStatus::HeadOfHousehold), dec!(0), &config)
                .unwrap(),
            dec!(23625.00)
        );
    }

    #[test]
    fn standard_deduction_adds_age_and_blindness_boxes() {
        let config = YearConfig::tax_year_2025().standard_deduction;
        let mut joint = profile(FilingStatus::MarriedFilingJointly);
        joint.taxpayer_age = 70;
        joint.spouse_age = Some(66);
        joint.spouse_blind = true;

        // 31500 + 3 × 1600
        assert_eq!(
            standard_deduction(&joint, dec!(0), &config).unwrap(),
            dec!(36300.00)
        );

        let mut single = profile(FilingStatus::Single);
        single.taxpayer_blind = true;
        assert_eq!(
            standard_deduction(&single, dec!(0), &config).unwrap(),
            dec!(17750.00)
        );
    }

    #[test]
    fn spouse_boxes_ignored_when_filing_separately() {
        let config = YearConfig::tax_year_2025().standard_deduction;
        let mut separate = profile(FilingStatus::MarriedFilingSeparately);
        separate.spouse_age = Some(70);

        assert_eq!(
            standard_deduction(&separate, dec!(0), &config).unwrap(),
            dec!(15750.00)
        );
    }

    #[test]
    fn dependent_limited_to_earned_income_plus_addon() {
        let config = YearConfig::tax_year_2025().standard_deduction;
        let mut dependent = profile(FilingStatus::Single);
        dependent.can_be_claimed_as_dependent = true;

        assert_eq!(
            standard_deduction(&dependent, dec!(500), &config).unwrap(),
            dec!(1350.00)
        );
        assert_eq!(
            standard_deduction(&dependent, dec!(4000), &config).unwrap(),
            dec!(4450.00)
        );
        assert_eq!(
            standard_deduction(&dependent, dec!(40000), &config).unwrap(),
            dec!(15750.00)
        );
    }

    // =========================================================================
    // itemized deduction
    // =========================================================================

    #[test]
    fn medical_floor_and_salt_cap() {
        let config = YearConfig::tax_year_2025().itemized;
        let inputs = ItemizedInputs {
            medical_expenses: dec!(10000),
            state_local_taxes: dec!(35000),
            real_estate_taxes: dec!(12000),
            mortgage_interest: dec!(15000),
            ..ItemizedInputs::default()
        };

        let result =
            itemized_deduction(&inputs, dec!(100000), dec!(0), FilingStatus::Single, &config)
                .unwrap();

        assert_eq!(result.medical, dec!(2500.00));
        assert_eq!(result.taxes, dec!(40000.00));
        assert_eq!(result.total, dec!(57500.00));
    }

    #[test]
    fn salt_cap_phases_down_to_floor() {
        let config = YearConfig::tax_year_2025().itemized;

        // 40000 − 30% × 50000
        assert_eq!(
            salt_cap(dec!(550000), FilingStatus::Single, &config).unwrap(),
            dec!(25000.00)
        );
        assert_eq!(
            salt_cap(dec!(900000), FilingStatus::Single, &config).unwrap(),
            dec!(10000.00)
        );
        assert_eq!(
            salt_cap(dec!(100000), FilingStatus::MarriedFilingSeparately, &config).unwrap(),
            dec!(20000.00)
        );
    }

    #[test]
    fn gambling_losses_limited_to_winnings_and_charity_to_agi() {
        let config = YearConfig::tax_year_2025().itemized;
        let inputs = ItemizedInputs {
            gambling_losses: dec!(8000),
            charitable_cash: dec!(50000),
            ..ItemizedInputs::default()
        };

        let result =
            itemized_deduction(&inputs, dec!(50000), dec!(3000), FilingStatus::Single, &config)
                .unwrap();

        assert_eq!(result.gambling_losses, dec!(3000.00));
        assert_eq!(result.charitable, dec!(30000.00));
    }

    // =========================================================================
    // choice
    // =========================================================================

    #[test]
    fn choose_takes_larger_unless_forced() {
        let itemized = ItemizedDeduction {
            total: dec!(9000),
            ..ItemizedDeduction::default()
        };

        let free = choose_deduction(dec!(15750), itemized.clone(), false);
        assert!(!free.itemize);
        assert_eq!(free.taken, dec!(15750));

        let forced = choose_deduction(dec!(15750), itemized, true);
        assert!(forced.itemize);
        assert_eq!(forced.taken, dec!(9000));
    }
}
