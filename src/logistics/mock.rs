//! In-memory host doubles for tests

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core_types::{SimTime, Units};

use super::exchange::ResourceContainer;
use super::host::{EndpointCapabilities, FastForwardMode, SimulationClock};
use super::types::{EndpointHandle, TRANSPORT_CREDITS};

/// Clock whose time is set by the test.
pub struct ManualClock {
    now_bits: AtomicU64,
    warp: Mutex<(f64, FastForwardMode)>,
}

impl ManualClock {
    pub fn new(now: SimTime) -> Self {
        Self {
            now_bits: AtomicU64::new(now.to_bits()),
            warp: Mutex::new((1.0, FastForwardMode::Low)),
        }
    }

    pub fn set_now(&self, now: SimTime) {
        self.now_bits.store(now.to_bits(), Ordering::SeqCst);
    }

    pub fn set_warp(&self, rate: f64, mode: FastForwardMode) {
        *self.warp.lock().unwrap() = (rate, mode);
    }
}

impl SimulationClock for ManualClock {
    fn now(&self) -> SimTime {
        f64::from_bits(self.now_bits.load(Ordering::SeqCst))
    }

    fn fast_forward_rate(&self) -> f64 {
        self.warp.lock().unwrap().0
    }

    fn fast_forward_mode(&self) -> FastForwardMode {
        self.warp.lock().unwrap().1
    }
}

/// Endpoints and their containers, keyed by (endpoint, resource).
#[derive(Debug, Default)]
pub struct MemoryHost {
    stores: BTreeMap<(EndpointHandle, String), Vec<ResourceContainer>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a container; declaration order is exchange order.
    pub fn add_container(
        &mut self,
        endpoint: &EndpointHandle,
        resource: &str,
        container: ResourceContainer,
    ) {
        self.stores
            .entry((endpoint.clone(), resource.to_string()))
            .or_default()
            .push(container);
    }

    pub fn containers(&self, endpoint: &EndpointHandle, resource: &str) -> &[ResourceContainer] {
        self.stores
            .get(&(endpoint.clone(), resource.to_string()))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn total(&self, endpoint: &EndpointHandle, resource: &str) -> Units {
        self.containers(endpoint, resource)
            .iter()
            .map(|c| c.amount)
            .sum()
    }
}

impl EndpointCapabilities for MemoryHost {
    fn list_containers(
        &mut self,
        endpoint: &EndpointHandle,
        resource: &str,
    ) -> Vec<&mut ResourceContainer> {
        self.stores
            .get_mut(&(endpoint.clone(), resource.to_string()))
            .map(|v| v.iter_mut().collect())
            .unwrap_or_default()
    }

    fn has_resource(&self, endpoint: &EndpointHandle, resource: &str) -> bool {
        !self.containers(endpoint, resource).is_empty()
    }

    fn available_transport_credits(&self, endpoint: &EndpointHandle) -> Units {
        self.total(endpoint, TRANSPORT_CREDITS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(10.0);
        clock.set_now(12.5);
        assert_eq!(clock.now(), 12.5);
        assert!(!clock.suppresses_delivery());

        clock.set_warp(50.0, FastForwardMode::High);
        assert!(clock.suppresses_delivery());
    }

    #[test]
    fn test_memory_host_lists_in_declaration_order() {
        let base = EndpointHandle::new("base");
        let mut host = MemoryHost::new();
        host.add_container(&base, "Ore", ResourceContainer::new(1.0, 10.0));
        host.add_container(&base, "Ore", ResourceContainer::new(2.0, 10.0));

        let listed: Vec<f64> = host
            .list_containers(&base, "Ore")
            .iter()
            .map(|c| c.amount)
            .collect();
        assert_eq!(listed, vec![1.0, 2.0]);
        assert!(host.has_resource(&base, "Ore"));
        assert!(!host.has_resource(&base, "Water"));
        assert!(host.list_containers(&base, "Water").is_empty());
    }
}
