//! Transfer Profiles
//!
//! Per-domain transit and cost rules. Cargo and crew transfers share the
//! state machine and the registry; only these numbers differ.

use crate::config::{CargoProfileConfig, CrewProfileConfig, LogisticsConfig};
use crate::core_types::{SimTime, Units};

use super::transfer::TransferRequest;
use super::types::TransferKind;

/// Domain-specific transit and cost computation.
pub trait TransferProfile: Send + Sync {
    fn kind(&self) -> TransferKind;

    /// Duration of one leg, in simulated seconds. Never negative.
    fn transit_duration(&self, transfer: &TransferRequest) -> SimTime;

    /// Transport credits a transfer of this size costs.
    fn calculate_cost(&self, transfer: &TransferRequest) -> Units;

    /// True for round trips: the delivery runs a return leg before
    /// completing.
    fn has_return_leg(&self) -> bool {
        false
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

/// One-way cargo: transit and cost scale with mass.
#[derive(Debug, Clone)]
pub struct CargoProfile {
    config: CargoProfileConfig,
}

impl CargoProfile {
    pub fn new(config: CargoProfileConfig) -> Self {
        Self { config }
    }
}

impl TransferProfile for CargoProfile {
    fn kind(&self) -> TransferKind {
        TransferKind::Cargo
    }

    fn transit_duration(&self, transfer: &TransferRequest) -> SimTime {
        non_negative(
            self.config.base_transit_secs + self.config.secs_per_tonne * transfer.total_mass(),
        )
    }

    fn calculate_cost(&self, transfer: &TransferRequest) -> Units {
        non_negative(self.config.credits_per_tonne * transfer.total_mass())
    }
}

/// Crew rotation: fixed leg duration, cost per seat, return leg.
#[derive(Debug, Clone)]
pub struct CrewProfile {
    config: CrewProfileConfig,
}

impl CrewProfile {
    pub fn new(config: CrewProfileConfig) -> Self {
        Self { config }
    }
}

impl TransferProfile for CrewProfile {
    fn kind(&self) -> TransferKind {
        TransferKind::Crew
    }

    fn transit_duration(&self, _transfer: &TransferRequest) -> SimTime {
        non_negative(self.config.transit_secs)
    }

    fn calculate_cost(&self, transfer: &TransferRequest) -> Units {
        non_negative(self.config.credits_per_seat * transfer.calculate_amount())
    }

    fn has_return_leg(&self) -> bool {
        true
    }
}

/// The profile for every [`TransferKind`].
#[derive(Debug, Clone)]
pub struct ProfileSet {
    cargo: CargoProfile,
    crew: CrewProfile,
}

impl ProfileSet {
    pub fn new(cargo: CargoProfileConfig, crew: CrewProfileConfig) -> Self {
        Self {
            cargo: CargoProfile::new(cargo),
            crew: CrewProfile::new(crew),
        }
    }

    pub fn from_config(config: &LogisticsConfig) -> Self {
        Self::new(config.cargo.clone(), config.crew.clone())
    }

    pub fn for_kind(&self, kind: TransferKind) -> &dyn TransferProfile {
        match kind {
            TransferKind::Cargo => &self.cargo,
            TransferKind::Crew => &self.crew,
        }
    }
}

impl Default for ProfileSet {
    fn default() -> Self {
        Self::new(CargoProfileConfig::default(), CrewProfileConfig::default())
    }
}
