//! Delivery Status Definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transfer delivery status
///
/// Pending states: LAUNCHED, RETURNING
/// Terminal states: DELIVERED, ABORTED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Outbound leg in transit
    Launched,

    /// Return leg in transit (round-trip transfers only)
    Returning,

    /// Terminal: transfer completed
    Delivered,

    /// Terminal: transfer cancelled, cost refunded where possible
    Aborted,
}

impl DeliveryStatus {
    /// A transfer with this status belongs in the pending sequence
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, DeliveryStatus::Launched | DeliveryStatus::Returning)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Launched => "LAUNCHED",
            DeliveryStatus::Returning => "RETURNING",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
