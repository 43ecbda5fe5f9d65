//! Transfer Registry
//!
//! Owns the `pending` and `expired` sequences.
//!
//! # Invariants
//!
//! 1. Both sequences are sorted by arrival time ascending, ties in insertion
//!    order, after every mutating call
//! 2. Together they hold every known transfer exactly once
//!
//! Mutation of a stored transfer only happens through [`TransferRegistry::update_pending`],
//! which re-sorts afterwards.

use rustc_hash::FxHashSet;
use tracing::debug;

use super::error::LogisticsError;
use super::transfer::TransferRequest;
use super::types::TransferId;

#[derive(Debug, Default, Clone)]
pub struct TransferRegistry {
    pending: Vec<TransferRequest>,
    expired: Vec<TransferRequest>,
    known: FxHashSet<TransferId>,
}

fn sort_by_arrival(transfers: &mut [TransferRequest]) {
    // stable: equal arrival times keep insertion order
    transfers.sort_by(|a, b| a.arrival_cmp(b));
}

impl TransferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn pending(&self) -> &[TransferRequest] {
        &self.pending
    }

    pub fn expired(&self) -> &[TransferRequest] {
        &self.expired
    }

    /// Ids of the pending sequence, in order. Safe to iterate while mutating.
    pub fn pending_ids(&self) -> Vec<TransferId> {
        self.pending.iter().map(|t| t.id()).collect()
    }

    pub fn contains(&self, id: TransferId) -> bool {
        self.known.contains(&id)
    }

    pub fn is_pending(&self, id: TransferId) -> bool {
        self.pending.iter().any(|t| t.id() == id)
    }

    pub fn is_expired(&self, id: TransferId) -> bool {
        self.expired.iter().any(|t| t.id() == id)
    }

    pub fn get(&self, id: TransferId) -> Option<&TransferRequest> {
        self.pending
            .iter()
            .chain(self.expired.iter())
            .find(|t| t.id() == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len() + self.expired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insert into `pending`.
    pub fn add_pending(&mut self, transfer: TransferRequest) -> Result<(), LogisticsError> {
        let id = transfer.id();
        if !self.known.insert(id) {
            return Err(LogisticsError::DuplicateTransfer(id));
        }

        self.pending.push(transfer);
        sort_by_arrival(&mut self.pending);
        debug!(transfer_id = %id, pending = self.pending.len(), "Added pending transfer");
        Ok(())
    }

    /// Take a transfer out of `pending` (and out of the registry).
    pub fn remove_pending(&mut self, id: TransferId) -> Result<TransferRequest, LogisticsError> {
        let index = self
            .pending
            .iter()
            .position(|t| t.id() == id)
            .ok_or(LogisticsError::NotPending(id))?;

        self.known.remove(&id);
        Ok(self.pending.remove(index))
    }

    /// Move a transfer from `pending` to `expired`.
    pub fn reclassify_to_expired(&mut self, id: TransferId) -> Result<(), LogisticsError> {
        let index = self
            .pending
            .iter()
            .position(|t| t.id() == id)
            .ok_or(LogisticsError::NotPending(id))?;

        let transfer = self.pending.remove(index);
        debug!(transfer_id = %id, status = %transfer.status(), "Transfer expired");
        self.expired.push(transfer);
        sort_by_arrival(&mut self.expired);
        Ok(())
    }

    /// Take a transfer out of `expired`, failing with `NotExpired` if absent.
    pub fn take_expired(&mut self, id: TransferId) -> Result<TransferRequest, LogisticsError> {
        let index = self
            .expired
            .iter()
            .position(|t| t.id() == id)
            .ok_or(LogisticsError::NotExpired(id))?;

        self.known.remove(&id);
        Ok(self.expired.remove(index))
    }

    /// Remove a transfer from `expired`. No-op if it is not there.
    pub fn remove_expired(&mut self, id: TransferId) -> Option<TransferRequest> {
        self.take_expired(id).ok()
    }

    pub fn clear_expired(&mut self) {
        for transfer in &self.expired {
            self.known.remove(&transfer.id());
        }
        self.expired.clear();
    }

    /// Mutate a pending transfer, then restore the ordering.
    pub fn update_pending<R>(
        &mut self,
        id: TransferId,
        f: impl FnOnce(&mut TransferRequest) -> R,
    ) -> Result<R, LogisticsError> {
        let transfer = self
            .pending
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or(LogisticsError::NotPending(id))?;

        let result = f(transfer);
        sort_by_arrival(&mut self.pending);
        Ok(result)
    }

    /// Replace both sequences at once.
    ///
    /// The caller classifies; the order of the inputs is not trusted. On a
    /// duplicate identity nothing is replaced.
    pub fn load_all(
        &mut self,
        mut pending: Vec<TransferRequest>,
        mut expired: Vec<TransferRequest>,
    ) -> Result<(), LogisticsError> {
        let mut known = FxHashSet::default();
        for transfer in pending.iter().chain(expired.iter()) {
            if !known.insert(transfer.id()) {
                return Err(LogisticsError::DuplicateTransfer(transfer.id()));
            }
        }

        sort_by_arrival(&mut pending);
        sort_by_arrival(&mut expired);

        self.pending = pending;
        self.expired = expired;
        self.known = known;
        Ok(())
    }
}
