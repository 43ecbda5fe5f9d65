//! Transfer Scheduler
//!
//! Drives pending transfers to completion from the host's frame loop.
//!
//! # Tick
//!
//! ```text
//! tick ─→ poll in-flight deliveries (return legs)
//!      ─→ gate: no pending │ before next check │ fast-forward High > 1x  → skip
//!      ─→ next check = now + 2s
//!      ─→ for id in snapshot(pending):
//!             status not active  → reclassify (defensive)
//!             arrival <= now     → deliver; Ready → reclassify, Pending → park
//! ```
//!
//! A parked delivery stays in `pending` until its task finishes. Registry
//! sequences are only touched here, never from inside a delivery task.

use std::task::Poll;

use tracing::{debug, info, warn};

use crate::core_types::SimTime;

use super::codec::{self, SaveBlock};
use super::delivery::DeliveryTask;
use super::error::LogisticsError;
use super::exchange::{deduct_transport_cost, transport_capacity};
use super::host::{EndpointCapabilities, SimulationClock};
use super::profile::ProfileSet;
use super::registry::TransferRegistry;
use super::state::DeliveryStatus;
use super::transfer::TransferRequest;
use super::types::TransferId;

/// Simulated seconds between processing runs.
pub const POLL_INTERVAL_SECS: SimTime = 2.0;

/// What one [`TransferScheduler::tick`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// The processing run was gated off this tick
    pub skipped: bool,
    /// Deliveries started this tick
    pub started: Vec<TransferId>,
    /// Transfers moved to `expired`, with their final status
    pub completed: Vec<(TransferId, DeliveryStatus)>,
    /// Deliveries still waiting on a return leg
    pub in_flight: usize,
}

/// Result of [`TransferScheduler::abort_transfer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortOutcome {
    /// Was expired; dropped from the registry
    Removed,
    /// Still pending; cancellation honoured at delivery
    MarkedForAbort,
    /// Not in the registry
    Unknown,
}

pub struct TransferScheduler {
    registry: TransferRegistry,
    profiles: ProfileSet,
    next_check_time: SimTime,
    in_flight: Vec<DeliveryTask>,
}

impl TransferScheduler {
    pub fn new(profiles: ProfileSet, now: SimTime) -> Self {
        Self {
            registry: TransferRegistry::new(),
            profiles,
            next_check_time: now + POLL_INTERVAL_SECS,
            in_flight: Vec::new(),
        }
    }

    pub fn registry(&self) -> &TransferRegistry {
        &self.registry
    }

    pub fn next_check_time(&self) -> SimTime {
        self.next_check_time
    }

    fn is_in_flight(&self, id: TransferId) -> bool {
        self.in_flight.iter().any(|t| t.transfer_id() == id)
    }

    /// Status of a transfer in either sequence.
    pub fn status_of(&self, id: TransferId) -> Result<DeliveryStatus, LogisticsError> {
        self.registry
            .get(id)
            .map(|t| t.status())
            .ok_or(LogisticsError::TransferNotFound(id))
    }

    // ========================================================================
    // Frame Loop
    // ========================================================================

    /// One host frame.
    pub fn tick<C, H>(&mut self, clock: &C, host: &mut H) -> TickReport
    where
        C: SimulationClock + ?Sized,
        H: EndpointCapabilities + ?Sized,
    {
        let mut report = TickReport::default();
        self.poll_in_flight(clock, host, &mut report);

        let now = clock.now();
        if self.registry.pending().is_empty()
            || now < self.next_check_time
            || clock.suppresses_delivery()
        {
            report.skipped = true;
            report.in_flight = self.in_flight.len();
            return report;
        }
        self.next_check_time = now + POLL_INTERVAL_SECS;

        for id in self.registry.pending_ids() {
            if self.is_in_flight(id) {
                continue;
            }
            let Some(transfer) = self.registry.get(id) else {
                continue;
            };

            if !transfer.is_pending() {
                warn!(
                    transfer_id = %id,
                    status = %transfer.status(),
                    "Inactive transfer found in pending, reclassifying"
                );
                let status = transfer.status();
                if self.registry.reclassify_to_expired(id).is_ok() {
                    report.completed.push((id, status));
                }
                continue;
            }

            if transfer.arrival_time() > now {
                continue;
            }

            debug!(transfer_id = %id, now = now, "Transfer due, starting delivery");
            let task = transfer.deliver();
            report.started.push(id);
            self.drive(task, clock, host, &mut report);
        }

        report.in_flight = self.in_flight.len();
        if !report.started.is_empty() || !report.completed.is_empty() {
            info!(
                started = report.started.len(),
                completed = report.completed.len(),
                in_flight = report.in_flight,
                pending = self.registry.pending().len(),
                "Processing run finished"
            );
        }
        report
    }

    fn poll_in_flight<C, H>(&mut self, clock: &C, host: &mut H, report: &mut TickReport)
    where
        C: SimulationClock + ?Sized,
        H: EndpointCapabilities + ?Sized,
    {
        for task in std::mem::take(&mut self.in_flight) {
            self.drive(task, clock, host, report);
        }
    }

    /// Poll `task` once; reclassify on completion, park otherwise.
    fn drive<C, H>(
        &mut self,
        mut task: DeliveryTask,
        clock: &C,
        host: &mut H,
        report: &mut TickReport,
    ) where
        C: SimulationClock + ?Sized,
        H: EndpointCapabilities + ?Sized,
    {
        let id = task.transfer_id();
        let profiles = &self.profiles;
        let polled = self.registry.update_pending(id, |transfer| {
            let profile = profiles.for_kind(transfer.kind());
            task.poll(transfer, clock, host, profile)
        });

        match polled {
            Ok(Poll::Ready(status)) => match self.registry.reclassify_to_expired(id) {
                Ok(()) => report.completed.push((id, status)),
                Err(e) => warn!(transfer_id = %id, error = %e, "Completed transfer vanished"),
            },
            Ok(Poll::Pending) => self.in_flight.push(task),
            Err(e) => {
                warn!(transfer_id = %id, error = %e, "Dropping delivery for missing transfer")
            }
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Charge the transport cost to the origin and launch a new transfer.
    pub fn submit<H>(
        &mut self,
        transfer: TransferRequest,
        now: SimTime,
        host: &mut H,
    ) -> Result<TransferId, LogisticsError>
    where
        H: EndpointCapabilities + ?Sized,
    {
        if self.registry.contains(transfer.id()) {
            return Err(LogisticsError::DuplicateTransfer(transfer.id()));
        }
        if transfer.status() != DeliveryStatus::Launched {
            return Err(LogisticsError::InvalidStateTransition(format!(
                "cannot submit transfer {} in state {}",
                transfer.id(),
                transfer.status()
            )));
        }

        let profile = self.profiles.for_kind(transfer.kind());
        let cost = profile.calculate_cost(&transfer);
        if cost > 0.0 && !deduct_transport_cost(host, transfer.origin(), cost) {
            return Err(LogisticsError::InsufficientTransportCredits {
                required: cost,
                available: transport_capacity(host, transfer.origin()),
            });
        }

        transfer.with_cost(cost).launch(&mut self.registry, now, profile)
    }

    /// Cancel a transfer.
    ///
    /// Expired: removed outright. Pending: flagged, and the delivery decides
    /// what aborting means at its next checkpoint.
    pub fn abort_transfer(&mut self, id: TransferId) -> Result<AbortOutcome, LogisticsError> {
        if self.registry.remove_expired(id).is_some() {
            info!(transfer_id = %id, "Expired transfer removed");
            return Ok(AbortOutcome::Removed);
        }

        match self.registry.update_pending(id, |t| t.abort()) {
            Ok(aborted) => {
                aborted?;
                Ok(AbortOutcome::MarkedForAbort)
            }
            Err(e) if e.is_registry_miss() => {
                debug!(transfer_id = %id, "Abort of unknown transfer ignored");
                Ok(AbortOutcome::Unknown)
            }
            Err(e) => Err(e),
        }
    }

    /// Restart the transit clock of a pending transfer, withdrawing any
    /// abort request. Returns `false` when there was nothing to resume.
    ///
    /// A transfer whose delivery is already under way cannot be resumed.
    pub fn resume_transfer(
        &mut self,
        id: TransferId,
        now: SimTime,
    ) -> Result<bool, LogisticsError> {
        if self.is_in_flight(id) {
            debug!(transfer_id = %id, "Resume ignored, delivery under way");
            return Ok(false);
        }

        let transfer = match self.registry.remove_pending(id) {
            Ok(transfer) => transfer,
            Err(e) if e.is_registry_miss() => {
                debug!(transfer_id = %id, "Resume ignored, transfer not pending");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        let profile = self.profiles.for_kind(transfer.kind());
        transfer.launch(&mut self.registry, now, profile)?;
        Ok(true)
    }

    pub fn remove_expired(&mut self, id: TransferId) -> Option<TransferRequest> {
        self.registry.remove_expired(id)
    }

    pub fn clear_expired(&mut self) {
        let count = self.registry.expired().len();
        self.registry.clear_expired();
        info!(count = count, "Expired transfers cleared");
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn save(&self) -> SaveBlock {
        codec::save(self.registry.pending(), self.registry.expired())
    }

    /// Replace the registry with the contents of `block`.
    ///
    /// Nothing changes if any record is malformed. Deliveries in flight are
    /// dropped; a reloaded `Returning` transfer resumes its return leg on the
    /// next processing run.
    pub fn load(&mut self, block: &SaveBlock) -> Result<(), LogisticsError> {
        let (pending, expired) = codec::load(block)?;
        self.registry.load_all(pending, expired)?;
        self.in_flight.clear();
        Ok(())
    }
}
