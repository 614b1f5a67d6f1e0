//! Qualified business income deduction (Section 199A).
//!
//! The W-2 wage / UBIA limitation and the specified-service reduction are
//! applied to each activity on its own; only the limited amounts are summed.
//! Summing QBI first and limiting the total lets a well-waged business lend
//! its wage capacity to an unwaged one, which overstates the deduction.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{max, min, non_negative, phase_out_ratio, round_half_up};
use crate::error::TaxEngineError;
use crate::models::{
    BusinessActivity, CalculationWarning, FilingStatus, QbiActivityDetail, QbiConfig,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QbiResult {
    pub deduction: Decimal,
    /// Position inside the threshold band: 0 below, 1 above.
    pub phase_in_ratio: Decimal,
    pub activity_total: Decimal,
    pub taxable_income_cap: Decimal,
    pub activities: Vec<QbiActivityDetail>,
    pub warnings: Vec<CalculationWarning>,
}

/// # Errors
/// A missing threshold band for `status` is a configuration error.
pub fn qbi_deduction(
    taxable_income_before_qbi: Decimal,
    net_capital_gain: Decimal,
    status: FilingStatus,
    activities: &[BusinessActivity],
    config: &QbiConfig,
) -> Result<QbiResult, TaxEngineError> {
    let band = config.threshold.value(status, "qbi.threshold")?;
    let ratio = phase_out_ratio(taxable_income_before_qbi, band.start, band.end);
    let retained = Decimal::ONE - ratio;

    let mut details = Vec::with_capacity(activities.len());
    let mut warnings = Vec::new();
    let mut activity_total = Decimal::ZERO;

    for activity in activities {
        let (applicable_income, wages, ubia) = if activity.is_specified_service {
            (
                activity.qualified_business_income * retained,
                activity.w2_wages * retained,
                activity.ubia * retained,
            )
        } else {
            (
                activity.qualified_business_income,
                activity.w2_wages,
                activity.ubia,
            )
        };

        let tentative = applicable_income * config.deduction_rate;
        let wage_limitation = max(
            wages * config.wage_limit_rate,
            wages * config.alt_wage_limit_rate + ubia * config.ubia_limit_rate,
        );

        let deduction = if tentative <= Decimal::ZERO || ratio.is_zero() {
            tentative
        } else if ratio == Decimal::ONE {
            min(tentative, wage_limitation)
        } else {
            let shortfall = non_negative(tentative - wage_limitation);
            tentative - shortfall * ratio
        };

        if ratio == Decimal::ONE
            && !activity.is_specified_service
            && activity.qualified_business_income > Decimal::ZERO
            && activity.w2_wages.is_zero()
            && activity.ubia.is_zero()
        {
            warn!(
                activity = %activity.name,
                qbi = %activity.qualified_business_income,
                taxable_income = %taxable_income_before_qbi,
                "activity above QBI threshold has no W-2 wages or UBIA; deduction is zero"
            );
            warnings.push(CalculationWarning::QbiActivityWithoutWagesOrProperty {
                activity: activity.name.clone(),
            });
        }

        activity_total += deduction;
        details.push(QbiActivityDetail {
            name: activity.name.clone(),
            qualified_business_income: activity.qualified_business_income,
            w2_wages: activity.w2_wages,
            ubia: activity.ubia,
            is_specified_service: activity.is_specified_service,
            applicable_income: round_half_up(applicable_income),
            tentative_deduction: round_half_up(tentative),
            wage_limitation: round_half_up(wage_limitation),
            deduction: round_half_up(deduction),
        });
    }

    let taxable_income_cap = round_half_up(
        non_negative(taxable_income_before_qbi - non_negative(net_capital_gain))
            * config.deduction_rate,
    );
    let deduction = round_half_up(non_negative(min(activity_total, taxable_income_cap)));

    debug!(
        phase_in_ratio = %ratio,
        activity_total = %activity_total,
        taxable_income_cap = %taxable_income_cap,
        deduction = %deduction,
        "qbi deduction"
    );

    Ok(QbiResult {
        deduction,
        phase_in_ratio: ratio,
        activity_total: round_half_up(activity_total),
        taxable_income_cap,
        activities: details,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::YearConfig;

    fn config() -> QbiConfig {
        YearConfig::tax_year_2025().qbi
    }

    fn activity(
        name: &str,
        qbi: Decimal,
        wages: Decimal,
        ubia: Decimal,
    ) -> BusinessActivity {
        BusinessActivity {
            name: name.into(),
            qualified_business_income: qbi,
            w2_wages: wages,
            ubia,
            is_specified_service: false,
        }
    }

    // =========================================================================
    // below threshold
    // =========================================================================

    #[test]
    fn below_threshold_skips_wage_limitation() {
        let result = qbi_deduction(
            dec!(150000),
            dec!(0),
            FilingStatus::Single,
            &[activity("shop", dec!(100000), dec!(0), dec!(0))],
            &config(),
        )
        .unwrap();

        assert_eq!(result.deduction, dec!(20000.00));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn taxable_income_cap_excludes_net_capital_gain() {
        let result = qbi_deduction(
            dec!(60000),
            dec!(20000),
            FilingStatus::Single,
            &[activity("shop", dec!(50000), dec!(0), dec!(0))],
            &config(),
        )
        .unwrap();

        // min(10000, 20% × 40000)
        assert_eq!(result.taxable_income_cap, dec!(8000.00));
        assert_eq!(result.deduction, dec!(8000.00));
    }

    // =========================================================================
    // above threshold
    // =========================================================================

    #[test]
    fn above_threshold_applies_wage_limitation_per_activity() {
        let activities = [
            activity("waged", dec!(200000), dec!(200000), dec!(0)),
            activity("unwaged", dec!(200000), dec!(0), dec!(0)),
        ];

        let result = qbi_deduction(
            dec!(600000),
            dec!(0),
            FilingStatus::Single,
            &activities,
            &config(),
        )
        .unwrap();

        // waged: min(40000, 100000); unwaged: min(40000, 0)
        assert_eq!(result.activities[0].deduction, dec!(40000.00));
        assert_eq!(result.activities[1].deduction, dec!(0.00));
        assert_eq!(result.deduction, dec!(40000.00));
        assert_eq!(
            result.warnings,
            vec![CalculationWarning::QbiActivityWithoutWagesOrProperty {
                activity: "unwaged".into()
            }]
        );
    }

    #[test]
    fn ubia_alternative_used_when_larger() {
        let result = qbi_deduction(
            dec!(600000),
            dec!(0),
            FilingStatus::Single,
            &[activity("rental", dec!(100000), dec!(10000), dec!(1000000))],
            &config(),
        )
        .unwrap();

        // max(5000, 2500 + 25000) = 27500 ≥ 20000
        assert_eq!(result.activities[0].wage_limitation, dec!(27500.00));
        assert_eq!(result.deduction, dec!(20000.00));
    }

    #[test]
    fn specified_service_fully_phased_out_above_band() {
        let mut consulting = activity("consulting", dec!(100000), dec!(100000), dec!(0));
        consulting.is_specified_service = true;

        let result = qbi_deduction(
            dec!(300000),
            dec!(0),
            FilingStatus::Single,
            &[consulting],
            &config(),
        )
        .unwrap();

        assert_eq!(result.deduction, dec!(0));
        assert!(result.warnings.is_empty());
    }

    // =========================================================================
    // phase-in band
    // =========================================================================

    #[test]
    fn phase_in_reduces_by_ratio_of_shortfall() {
        // 222300 is halfway through 197300–247300
        let result = qbi_deduction(
            dec!(222300),
            dec!(0),
            FilingStatus::Single,
            &[activity("shop", dec!(100000), dec!(10000), dec!(0))],
            &config(),
        )
        .unwrap();

        // tentative 20000, limit 5000, shortfall 15000 × 0.5
        assert_eq!(result.phase_in_ratio, dec!(0.5));
        assert_eq!(result.deduction, dec!(12500.00));
    }

    #[test]
    fn specified_service_scaled_inside_band() {
        let mut consulting = activity("consulting", dec!(100000), dec!(100000), dec!(0));
        consulting.is_specified_service = true;

        let result = qbi_deduction(
            dec!(222300),
            dec!(0),
            FilingStatus::Single,
            &[consulting],
            &config(),
        )
        .unwrap();

        // 50% retained: tentative 10000, limit 25000
        assert_eq!(result.activities[0].applicable_income, dec!(50000.00));
        assert_eq!(result.deduction, dec!(10000.00));
    }

    #[test]
    fn qualified_loss_reduces_total_floored_at_zero() {
        let activities = [
            activity("gain", dec!(10000), dec!(0), dec!(0)),
            activity("loss", dec!(-30000), dec!(0), dec!(0)),
        ];

        let result = qbi_deduction(
            dec!(100000),
            dec!(0),
            FilingStatus::Single,
            &activities,
            &config(),
        )
        .unwrap();

        assert_eq!(result.activity_total, dec!(-4000.00));
        assert_eq!(result.deduction, dec!(0));
    }
}
