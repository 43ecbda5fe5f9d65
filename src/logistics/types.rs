//! Logistics Core Types
//!
//! Identity, endpoint and resource types shared by the registry, the
//! delivery state machine and the codec.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the resource consumed to pay for transport.
pub const TRANSPORT_CREDITS: &str = "TransportCredits";

/// Transfer ID - ULID-based unique identifier
///
/// Sortable by creation time and needs no coordination between hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(ulid::Ulid);

impl TransferId {
    /// Generate a new unique TransferId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransferId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Opaque handle to a resource holder (a ship, a base).
///
/// The host resolves it; the engine only compares and stores it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointHandle(String);

impl EndpointHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resource type: its name and mass per unit (tonnes).
///
/// Massless resources (credits, electric charge) have a density of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceKind {
    pub name: String,
    pub density: f64,
}

impl ResourceKind {
    pub fn new(name: impl Into<String>, density: f64) -> Self {
        Self {
            name: name.into(),
            density,
        }
    }
}

/// Which way the resource moves on the outbound leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    /// Origin → destination
    Outbound,
    /// Destination → origin (pickup)
    Inbound,
}

impl TransferDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferDirection::Outbound => "OUTBOUND",
            TransferDirection::Inbound => "INBOUND",
        }
    }
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transfer domain. Selects the transit/cost profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferKind {
    /// One-way shipment of a resource
    Cargo,
    /// Crew rotation: outbound leg, then a return leg
    Crew,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::Cargo => "CARGO",
            TransferKind::Crew => "CREW",
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
