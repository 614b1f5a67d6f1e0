//! Residential clean energy (Form 5695 Part I) and energy efficient home improvement (Part II).

use crate::calculations::common::{min, non_negative, round_half_up};
use crate::models::{CreditInputs, EnergyCreditConfig};

use super::TentativeCredit;

pub fn residential_clean_energy(
    inputs: &CreditInputs,
    config: &EnergyCreditConfig,
) -> TentativeCredit {
    TentativeCredit::nonrefundable(round_half_up(
        non_negative(inputs.residential_clean_energy_costs) * config.clean_energy_rate,
    ))
}

pub fn home_improvement(
    inputs: &CreditInputs,
    config: &EnergyCreditConfig,
) -> TentativeCredit {
    let general = min(
        non_negative(inputs.home_improvement_costs) * config.home_improvement_rate,
        config.home_improvement_cap,
    );
    let heat_pump = min(
        non_negative(inputs.heat_pump_costs) * config.home_improvement_rate,
        config.heat_pump_cap,
    );
    TentativeCredit::nonrefundable(round_half_up(general + heat_pump))
}
