//! Delivery Task
//!
//! The suspendable part of a transfer's lifecycle, as an explicit state
//! value polled by the scheduler.
//!
//! # State Machine
//!
//! ```text
//! LAUNCHED ──outbound leg──→ DELIVERED                   (one-way)
//! LAUNCHED ──outbound leg──→ RETURNING ──return leg──→ DELIVERED  (round trip)
//! LAUNCHED + abort ──refund cost──→ ABORTED
//! RETURNING + abort ──return leg──→ ABORTED
//! ```
//!
//! # Completion Policy
//!
//! Partial exchanges are committed. Whatever the target cannot hold goes
//! back to the source, and `delivered_amount` records what actually moved.

use std::task::Poll;

use tracing::{info, warn};

use crate::core_types::Units;

use super::exchange::{EXCHANGE_EPSILON, exchange_resource, refund_transport_cost};
use super::host::{EndpointCapabilities, SimulationClock};
use super::profile::TransferProfile;
use super::state::DeliveryStatus;
use super::transfer::TransferRequest;
use super::types::{EndpointHandle, TransferId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeliveryPhase {
    /// Not yet looked at the transfer
    Start,
    /// Outbound leg done, waiting for the return arrival time
    AwaitingReturn,
    Finished(DeliveryStatus),
}

/// In-flight delivery of one transfer.
///
/// Created by [`TransferRequest::deliver`]. Polling a finished task again
/// returns the same status without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTask {
    transfer_id: TransferId,
    phase: DeliveryPhase,
}

impl DeliveryTask {
    pub(crate) fn new(transfer_id: TransferId) -> Self {
        Self {
            transfer_id,
            phase: DeliveryPhase::Start,
        }
    }

    pub fn transfer_id(&self) -> TransferId {
        self.transfer_id
    }

    /// Advance the delivery as far as the current simulated time allows.
    ///
    /// `Ready` carries the terminal status. `Pending` means the transfer is
    /// on its return leg and must be polled again later.
    pub fn poll<C, H>(
        &mut self,
        transfer: &mut TransferRequest,
        clock: &C,
        host: &mut H,
        profile: &dyn TransferProfile,
    ) -> Poll<DeliveryStatus>
    where
        C: SimulationClock + ?Sized,
        H: EndpointCapabilities + ?Sized,
    {
        debug_assert_eq!(transfer.id, self.transfer_id);

        loop {
            match self.phase {
                DeliveryPhase::Finished(status) => return Poll::Ready(status),

                DeliveryPhase::Start => match transfer.status() {
                    DeliveryStatus::Launched if transfer.abort_requested => {
                        let status = abort_before_departure(transfer, host);
                        self.phase = DeliveryPhase::Finished(status);
                    }
                    DeliveryStatus::Launched => {
                        let moved = run_outbound_leg(transfer, host);
                        transfer.delivered_amount = moved;

                        if profile.has_return_leg() {
                            let transit = profile.transit_duration(transfer).max(0.0);
                            transfer.status = DeliveryStatus::Returning;
                            transfer.arrival_time =
                                clock.now().max(transfer.launch_time) + transit;
                            info!(
                                transfer_id = %transfer.id,
                                delivered = moved,
                                return_arrival = transfer.arrival_time,
                                "Outbound leg delivered, returning"
                            );
                            self.phase = DeliveryPhase::AwaitingReturn;
                        } else {
                            transfer.status = DeliveryStatus::Delivered;
                            info!(
                                transfer_id = %transfer.id,
                                requested = transfer.calculate_amount(),
                                delivered = moved,
                                "Transfer delivered"
                            );
                            self.phase = DeliveryPhase::Finished(DeliveryStatus::Delivered);
                        }
                    }
                    // Reloaded while the return leg was in transit
                    DeliveryStatus::Returning => self.phase = DeliveryPhase::AwaitingReturn,
                    terminal => self.phase = DeliveryPhase::Finished(terminal),
                },

                DeliveryPhase::AwaitingReturn => {
                    if clock.now() < transfer.arrival_time {
                        return Poll::Pending;
                    }

                    let returned = run_return_leg(transfer, host);
                    transfer.status = if transfer.abort_requested {
                        DeliveryStatus::Aborted
                    } else {
                        DeliveryStatus::Delivered
                    };
                    info!(
                        transfer_id = %transfer.id,
                        returned = returned,
                        status = %transfer.status,
                        "Return leg completed"
                    );
                    self.phase = DeliveryPhase::Finished(transfer.status);
                }
            }
        }
    }
}

/// Abort semantics for a transfer that never left: refund the cost to the
/// origin, move nothing.
fn abort_before_departure<H>(transfer: &mut TransferRequest, host: &mut H) -> DeliveryStatus
where
    H: EndpointCapabilities + ?Sized,
{
    let refunded = if transfer.cost > 0.0 {
        refund_transport_cost(host, &transfer.origin, transfer.cost)
    } else {
        0.0
    };

    if transfer.cost - refunded >= EXCHANGE_EPSILON {
        warn!(
            transfer_id = %transfer.id,
            cost = transfer.cost,
            refunded = refunded,
            "Transport cost only partially refunded"
        );
    }

    transfer.delivered_amount = 0.0;
    transfer.status = DeliveryStatus::Aborted;
    info!(transfer_id = %transfer.id, refunded = refunded, "Transfer aborted");
    DeliveryStatus::Aborted
}

fn run_outbound_leg<H>(transfer: &TransferRequest, host: &mut H) -> Units
where
    H: EndpointCapabilities + ?Sized,
{
    let (source, target) = transfer.outbound_route();
    move_resource(
        host,
        source,
        target,
        &transfer.resource.name,
        transfer.calculate_amount(),
    )
}

fn run_return_leg<H>(transfer: &TransferRequest, host: &mut H) -> Units
where
    H: EndpointCapabilities + ?Sized,
{
    let (source, target) = transfer.outbound_route();
    move_resource(
        host,
        target,
        source,
        &transfer.resource.name,
        transfer.delivered_amount,
    )
}

/// Withdraw up to `quantity` from `source` and deposit it into `target`.
///
/// The withdrawal is capped at the target's free space, and anything the
/// deposit still leaves over is put back into `source`, so no amount is
/// lost. Returns the amount that ended up in `target`.
fn move_resource<H>(
    host: &mut H,
    source: &EndpointHandle,
    target: &EndpointHandle,
    resource: &str,
    quantity: Units,
) -> Units
where
    H: EndpointCapabilities + ?Sized,
{
    let headroom: Units = host
        .list_containers(target, resource)
        .iter()
        .map(|c| c.headroom())
        .sum();
    if quantity > headroom {
        warn!(
            source = %source,
            target = %target,
            resource = resource,
            requested = quantity,
            headroom = headroom,
            "Target full, remainder stays at source"
        );
    }
    let quantity = quantity.min(headroom);
    if quantity < EXCHANGE_EPSILON {
        return 0.0;
    }

    let withdrawn = -exchange_resource(host, source, resource, -quantity);
    let deposited = exchange_resource(host, target, resource, withdrawn);

    let surplus = withdrawn - deposited;
    if surplus > 0.0 {
        warn!(
            source = %source,
            target = %target,
            resource = resource,
            surplus = surplus,
            "Deposit short, returning surplus to source"
        );
        put_back(host, source, resource, surplus);
    }

    deposited
}

/// First-fit refill of `source`, with no epsilon cutoff.
fn put_back<H>(host: &mut H, source: &EndpointHandle, resource: &str, surplus: Units)
where
    H: EndpointCapabilities + ?Sized,
{
    let mut rest = surplus;
    for container in host.list_containers(source, resource) {
        let added = rest.min(container.headroom());
        container.amount += added;
        rest -= added;
        if rest <= 0.0 {
            return;
        }
    }
    warn!(source = %source, resource = resource, lost = rest, "Surplus exceeds source capacity");
}
