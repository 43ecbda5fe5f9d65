//! Host Interfaces
//!
//! The engine never touches host types. The host supplies time through
//! [`SimulationClock`] and container access through [`EndpointCapabilities`].

use crate::core_types::{SimTime, Units};

use super::exchange::ResourceContainer;
use super::types::EndpointHandle;

/// Deliveries are suppressed while fast-forwarding faster than this in
/// [`FastForwardMode::High`].
pub const FAST_FORWARD_RATE_THRESHOLD: f64 = 1.0;

/// How the host advances time when running faster than real time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastForwardMode {
    /// Full simulation keeps running (physics warp)
    Low,
    /// Simulation is on rails, per-frame work must stay cheap
    High,
}

/// Host time authority.
pub trait SimulationClock {
    /// Current simulated universal time
    fn now(&self) -> SimTime;

    /// Current fast-forward multiplier (1.0 = real time)
    fn fast_forward_rate(&self) -> f64;

    fn fast_forward_mode(&self) -> FastForwardMode;

    /// True when the scheduler must not start delivery processing
    fn suppresses_delivery(&self) -> bool {
        self.fast_forward_mode() == FastForwardMode::High
            && self.fast_forward_rate() > FAST_FORWARD_RATE_THRESHOLD
    }
}

/// Host endpoint-capability layer.
///
/// Containers for one `(endpoint, resource)` pair must be listed in the same
/// order on every call: the exchanger fills and drains them first-fit.
pub trait EndpointCapabilities {
    /// Containers of `resource` on `endpoint`, in stable declaration order.
    /// Unknown endpoints or resources yield an empty list.
    fn list_containers(
        &mut self,
        endpoint: &EndpointHandle,
        resource: &str,
    ) -> Vec<&mut ResourceContainer>;

    fn has_resource(&self, endpoint: &EndpointHandle, resource: &str) -> bool;

    /// Transport credits currently held by `endpoint`
    fn available_transport_credits(&self, endpoint: &EndpointHandle) -> Units;
}
