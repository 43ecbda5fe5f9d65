//! Deferred Resource Transfers
//!
//! Moves a quantity of a resource (cargo or crew) from one endpoint to
//! another after a simulated transit time. The host supplies time and
//! container access; the engine owns the transfer lifecycle.
//!
//! # State Machine
//!
//! ```text
//! LAUNCHED → RETURNING → DELIVERED
//!     ↓          ↓
//!  ABORTED    ABORTED
//! LAUNCHED → DELIVERED            (one-way cargo)
//! ```
//!
//! LAUNCHED and RETURNING are pending; DELIVERED and ABORTED are terminal.
//!
//! # Invariants
//!
//! 1. **Disjoint**: a transfer is in exactly one of `pending` / `expired`
//! 2. **Ordered**: both sequences are sorted by arrival time, ties in insertion order
//! 3. **Pending is active**: anything in `pending` is LAUNCHED or RETURNING
//! 4. **Capacity**: the exchanger never leaves a container below 0 or above capacity

pub mod codec;
pub mod delivery;
pub mod driver;
pub mod error;
pub mod exchange;
pub mod host;
pub mod profile;
pub mod registry;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod transfer;
pub mod types;

#[cfg(test)]
mod mock;

// Re-exports for convenience
pub use codec::{SaveBlock, SaveFormat, TransferRecord};
pub use delivery::DeliveryTask;
pub use driver::FrameDriver;
pub use error::LogisticsError;
pub use exchange::{EXCHANGE_EPSILON, ResourceContainer, exchange, exchange_resource};
pub use host::{EndpointCapabilities, FastForwardMode, SimulationClock};
pub use profile::{CargoProfile, CrewProfile, ProfileSet, TransferProfile};
pub use registry::TransferRegistry;
pub use scheduler::{AbortOutcome, POLL_INTERVAL_SECS, TickReport, TransferScheduler};
pub use state::DeliveryStatus;
pub use store::SaveStore;
pub use transfer::TransferRequest;
pub use types::{
    EndpointHandle, ResourceKind, TRANSPORT_CREDITS, TransferDirection, TransferId, TransferKind,
};
