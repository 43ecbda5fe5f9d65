//! Transfer Request
//!
//! A single scheduled movement of one resource between two endpoints, and
//! the lifecycle operations that drive it: launch, abort, deliver.

use std::cmp::Ordering;

use tracing::info;

use crate::core_types::{SimTime, Tonnes, Units};

use super::delivery::DeliveryTask;
use super::error::LogisticsError;
use super::profile::TransferProfile;
use super::registry::TransferRegistry;
use super::state::DeliveryStatus;
use super::types::{EndpointHandle, ResourceKind, TransferDirection, TransferId, TransferKind};

/// A deferred transfer.
///
/// `arrival_time >= launch_time` holds for every value of this type.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub(crate) id: TransferId,
    pub(crate) kind: TransferKind,
    pub(crate) origin: EndpointHandle,
    pub(crate) destination: EndpointHandle,
    pub(crate) resource: ResourceKind,
    pub(crate) amount: Units,
    pub(crate) cost: Units,
    pub(crate) launch_time: SimTime,
    pub(crate) arrival_time: SimTime,
    pub(crate) status: DeliveryStatus,
    pub(crate) direction: TransferDirection,
    /// Units moved by the outbound leg, zero until it has run
    pub(crate) delivered_amount: Units,
    pub(crate) abort_requested: bool,
}

impl TransferRequest {
    /// Create a new `Launched` outbound transfer with zero cost.
    ///
    /// Times are set when the transfer is launched into a registry.
    pub fn new(
        kind: TransferKind,
        origin: EndpointHandle,
        destination: EndpointHandle,
        resource: ResourceKind,
        amount: Units,
    ) -> Self {
        Self {
            id: TransferId::new(),
            kind,
            origin,
            destination,
            resource,
            amount,
            cost: 0.0,
            launch_time: 0.0,
            arrival_time: 0.0,
            status: DeliveryStatus::Launched,
            direction: TransferDirection::Outbound,
            delivered_amount: 0.0,
            abort_requested: false,
        }
    }

    pub fn with_cost(mut self, cost: Units) -> Self {
        self.cost = cost.max(0.0);
        self
    }

    pub fn with_direction(mut self, direction: TransferDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set explicit launch/arrival times. An arrival before the launch is
    /// clamped to the launch time.
    pub fn with_schedule(mut self, launch_time: SimTime, arrival_time: SimTime) -> Self {
        self.launch_time = launch_time;
        self.arrival_time = arrival_time.max(launch_time);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> TransferId {
        self.id
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    pub fn origin(&self) -> &EndpointHandle {
        &self.origin
    }

    pub fn destination(&self) -> &EndpointHandle {
        &self.destination
    }

    pub fn resource(&self) -> &ResourceKind {
        &self.resource
    }

    /// Requested amount, in resource units
    pub fn amount(&self) -> Units {
        self.amount
    }

    /// Transport credits paid for this transfer
    pub fn cost(&self) -> Units {
        self.cost
    }

    pub fn launch_time(&self) -> SimTime {
        self.launch_time
    }

    pub fn arrival_time(&self) -> SimTime {
        self.arrival_time
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn direction(&self) -> TransferDirection {
        self.direction
    }

    pub fn delivered_amount(&self) -> Units {
        self.delivered_amount
    }

    pub fn abort_requested(&self) -> bool {
        self.abort_requested
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Endpoints in the order the outbound leg moves resources: (source, target)
    pub fn outbound_route(&self) -> (&EndpointHandle, &EndpointHandle) {
        match self.direction {
            TransferDirection::Outbound => (&self.origin, &self.destination),
            TransferDirection::Inbound => (&self.destination, &self.origin),
        }
    }

    // ========================================================================
    // Pure calculations
    // ========================================================================

    /// Units to exchange on delivery.
    ///
    /// Crew are moved in whole seats.
    pub fn calculate_amount(&self) -> Units {
        let amount = if self.amount.is_finite() {
            self.amount.max(0.0)
        } else {
            0.0
        };

        match self.kind {
            TransferKind::Cargo => amount,
            TransferKind::Crew => amount.floor(),
        }
    }

    pub fn total_mass(&self) -> Tonnes {
        self.calculate_amount() * self.resource.density.max(0.0)
    }

    /// Registry sort key: arrival time ascending.
    pub fn arrival_cmp(&self, other: &Self) -> Ordering {
        self.arrival_time.total_cmp(&other.arrival_time)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start (or restart) the transit clock and insert into `registry`'s
    /// pending sequence.
    ///
    /// A transfer on its return leg keeps `Returning` so the outbound leg is
    /// never repeated. Any pending abort request is withdrawn.
    pub fn launch(
        mut self,
        registry: &mut TransferRegistry,
        now: SimTime,
        profile: &dyn TransferProfile,
    ) -> Result<TransferId, LogisticsError> {
        let transit = profile.transit_duration(&self);
        let transit = if transit.is_finite() {
            transit.max(0.0)
        } else {
            0.0
        };

        self.launch_time = now;
        self.arrival_time = now + transit;
        if self.status != DeliveryStatus::Returning {
            self.status = DeliveryStatus::Launched;
        }
        self.abort_requested = false;

        info!(
            transfer_id = %self.id,
            kind = %self.kind,
            origin = %self.origin,
            destination = %self.destination,
            resource = %self.resource.name,
            amount = self.amount,
            arrival_time = self.arrival_time,
            "Transfer launched"
        );

        let id = self.id;
        registry.add_pending(self)?;
        Ok(id)
    }

    /// Request cancellation. Honoured at the next delivery checkpoint; the
    /// transfer stays pending until then.
    pub fn abort(&mut self) -> Result<(), LogisticsError> {
        if !self.status.is_pending() {
            return Err(LogisticsError::InvalidStateTransition(format!(
                "cannot abort transfer {} in state {}",
                self.id, self.status
            )));
        }

        self.abort_requested = true;
        info!(transfer_id = %self.id, status = %self.status, "Transfer abort requested");
        Ok(())
    }

    /// Start delivering this transfer. Poll the returned task until it is
    /// ready.
    pub fn deliver(&self) -> DeliveryTask {
        DeliveryTask::new(self.id)
    }
}
