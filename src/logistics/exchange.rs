//! Resource Exchanger
//!
//! Greedy first-fit fill/drain over an ordered list of containers.
//!
//! # Contract
//!
//! - `|amount| < EXCHANGE_EPSILON`: nothing is touched, `amount` is returned
//! - `amount > 0`: deposit, filling containers in order
//! - `amount < 0`: withdraw, draining containers in order
//! - The return value is the amount actually exchanged (same sign). Unmet
//!   demand is reported there, never as an error.
//! - Container mutations are never rolled back here. The caller decides what
//!   to do with a partial result.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core_types::Units;

use super::host::EndpointCapabilities;
use super::types::{EndpointHandle, TRANSPORT_CREDITS};

/// Requests smaller than this are treated as already satisfied.
pub const EXCHANGE_EPSILON: f64 = 1e-6;

/// A bounded store of one resource type on an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceContainer {
    pub amount: Units,
    pub capacity: Units,
}

impl ResourceContainer {
    pub fn new(amount: Units, capacity: Units) -> Self {
        Self { amount, capacity }
    }

    pub fn empty(capacity: Units) -> Self {
        Self::new(0.0, capacity)
    }

    /// Free space left in the container
    #[inline]
    pub fn headroom(&self) -> Units {
        (self.capacity - self.amount).max(0.0)
    }
}

/// Deposit (`amount > 0`) into or withdraw (`amount < 0`) from `containers`.
///
/// Returns the signed amount actually exchanged.
pub fn exchange<'a, I>(containers: I, amount: Units) -> Units
where
    I: IntoIterator<Item = &'a mut ResourceContainer>,
{
    if amount.abs() < EXCHANGE_EPSILON {
        return amount;
    }

    let mut exchanged = 0.0;

    for container in containers {
        let outstanding = amount - exchanged;

        if amount < 0.0 {
            let available = container.amount.max(0.0);
            if available < outstanding.abs() {
                exchanged -= available;
                container.amount = 0.0;
            } else {
                container.amount = available + outstanding;
                exchanged = amount;
                break;
            }
        } else {
            let headroom = container.headroom();
            if headroom < outstanding {
                exchanged += headroom;
                container.amount = container.capacity;
            } else {
                container.amount += outstanding;
                exchanged = amount;
                break;
            }
        }
    }

    exchanged
}

/// Exchange `amount` of `resource` against the containers of `endpoint`.
pub fn exchange_resource<H>(
    host: &mut H,
    endpoint: &EndpointHandle,
    resource: &str,
    amount: Units,
) -> Units
where
    H: EndpointCapabilities + ?Sized,
{
    let containers = host.list_containers(endpoint, resource);
    let container_count = containers.len();
    let exchanged = exchange(containers, amount);

    debug!(
        endpoint = %endpoint,
        resource = resource,
        requested = amount,
        exchanged = exchanged,
        containers = container_count,
        "Resource exchange"
    );

    if (exchanged - amount).abs() >= EXCHANGE_EPSILON {
        warn!(
            endpoint = %endpoint,
            resource = resource,
            requested = amount,
            exchanged = exchanged,
            "Partial resource exchange"
        );
    }

    exchanged
}

/// Transport credits available on `endpoint`, zero if it cannot hold any.
pub fn transport_capacity<H>(host: &H, endpoint: &EndpointHandle) -> Units
where
    H: EndpointCapabilities + ?Sized,
{
    if !host.has_resource(endpoint, TRANSPORT_CREDITS) {
        return 0.0;
    }
    host.available_transport_credits(endpoint)
}

pub fn can_afford_transport<H>(host: &H, endpoint: &EndpointHandle, credits: Units) -> bool
where
    H: EndpointCapabilities + ?Sized,
{
    transport_capacity(host, endpoint) >= credits
}

/// Charge `credits` to `endpoint`. Returns `false` and charges nothing if
/// the endpoint cannot afford it.
pub fn deduct_transport_cost<H>(host: &mut H, endpoint: &EndpointHandle, credits: Units) -> bool
where
    H: EndpointCapabilities + ?Sized,
{
    if !can_afford_transport(host, endpoint, credits) {
        return false;
    }

    exchange_resource(host, endpoint, TRANSPORT_CREDITS, -credits);
    true
}

/// Give `credits` back to `endpoint`. Returns the amount actually refunded,
/// which is less than `credits` when the credit containers are nearly full.
pub fn refund_transport_cost<H>(host: &mut H, endpoint: &EndpointHandle, credits: Units) -> Units
where
    H: EndpointCapabilities + ?Sized,
{
    exchange_resource(host, endpoint, TRANSPORT_CREDITS, credits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logistics::mock::MemoryHost;

    fn amounts(containers: &[ResourceContainer]) -> Vec<f64> {
        containers.iter().map(|c| c.amount).collect()
    }

    fn three_empty() -> Vec<ResourceContainer> {
        vec![
            ResourceContainer::empty(10.0),
            ResourceContainer::empty(20.0),
            ResourceContainer::empty(5.0),
        ]
    }

    #[test]
    fn test_deposit_fits() {
        let mut containers = three_empty();
        let exchanged = exchange(containers.iter_mut(), 25.0);
        assert_eq!(exchanged, 25.0);
        assert_eq!(amounts(&containers), vec![10.0, 15.0, 0.0]);
    }

    #[test]
    fn test_deposit_overflows_capacity() {
        let mut containers = three_empty();
        let exchanged = exchange(containers.iter_mut(), 40.0);
        assert_eq!(exchanged, 35.0);
        assert_eq!(amounts(&containers), vec![10.0, 20.0, 5.0]);
    }

    #[test]
    fn test_withdraw_fits() {
        let mut containers = vec![ResourceContainer::new(8.0, 10.0)];
        let exchanged = exchange(containers.iter_mut(), -3.0);
        assert_eq!(exchanged, -3.0);
        assert_eq!(containers[0].amount, 5.0);
    }

    #[test]
    fn test_withdraw_drains_everything() {
        let mut containers = vec![ResourceContainer::new(8.0, 10.0)];
        let exchanged = exchange(containers.iter_mut(), -20.0);
        assert_eq!(exchanged, -8.0);
        assert_eq!(containers[0].amount, 0.0);
    }

    #[test]
    fn test_withdraw_spans_containers_in_order() {
        let mut containers = vec![
            ResourceContainer::new(4.0, 10.0),
            ResourceContainer::new(6.0, 10.0),
            ResourceContainer::new(9.0, 10.0),
        ];
        let exchanged = exchange(containers.iter_mut(), -7.0);
        assert_eq!(exchanged, -7.0);
        assert_eq!(amounts(&containers), vec![0.0, 3.0, 9.0]);
    }

    #[test]
    fn test_below_epsilon_is_untouched() {
        let mut containers = vec![ResourceContainer::new(1.0, 10.0)];
        for amount in [0.0, 5e-7, -5e-7] {
            let exchanged = exchange(containers.iter_mut(), amount);
            assert_eq!(exchanged, amount);
            assert_eq!(containers[0].amount, 1.0);
        }
    }

    #[test]
    fn test_no_containers_exchanges_nothing() {
        let mut containers: Vec<ResourceContainer> = Vec::new();
        assert_eq!(exchange(containers.iter_mut(), 12.0), 0.0);
        assert_eq!(exchange(containers.iter_mut(), -12.0), 0.0);
    }

    #[test]
    fn test_deposit_property_sum_increases_by_exchanged() {
        let cases: [(Vec<(f64, f64)>, f64); 4] = [
            (vec![(0.0, 4.0), (1.0, 2.0)], 3.0),
            (vec![(0.0, 4.0), (1.0, 2.0)], 8.0),
            (vec![(2.0, 2.0), (0.0, 8.0)], 8.0),
            (vec![(3.0, 4.0)], 0.5),
        ];

        for (layout, amount) in cases {
            let mut containers: Vec<ResourceContainer> = layout
                .iter()
                .map(|&(a, c)| ResourceContainer::new(a, c))
                .collect();
            let before: f64 = containers.iter().map(|c| c.amount).sum();
            let headroom: f64 = containers.iter().map(|c| c.headroom()).sum();

            let exchanged = exchange(containers.iter_mut(), amount);
            let after: f64 = containers.iter().map(|c| c.amount).sum();

            if headroom >= amount {
                assert_eq!(exchanged, amount);
            } else {
                assert_eq!(exchanged, headroom);
                assert!(containers.iter().all(|c| c.amount == c.capacity));
            }
            assert_eq!(after - before, exchanged);
        }
    }

    #[test]
    fn test_withdraw_property_mirrors_deposit() {
        let cases: [(Vec<(f64, f64)>, f64); 3] = [
            (vec![(2.0, 4.0), (1.0, 2.0)], -2.5),
            (vec![(2.0, 4.0), (1.0, 2.0)], -9.0),
            (vec![(0.0, 4.0), (4.0, 4.0)], -4.0),
        ];

        for (layout, amount) in cases {
            let mut containers: Vec<ResourceContainer> = layout
                .iter()
                .map(|&(a, c)| ResourceContainer::new(a, c))
                .collect();
            let held: f64 = containers.iter().map(|c| c.amount).sum();

            let exchanged = exchange(containers.iter_mut(), amount);
            let after: f64 = containers.iter().map(|c| c.amount).sum();

            if held >= amount.abs() {
                assert_eq!(exchanged, amount);
            } else {
                assert_eq!(exchanged, -held);
                assert!(containers.iter().all(|c| c.amount == 0.0));
            }
            assert_eq!(held - after, exchanged.abs());
        }
    }

    #[test]
    fn test_transport_cost_deduct_and_refund() {
        let base = EndpointHandle::new("base");
        let mut host = MemoryHost::new();
        host.add_container(&base, TRANSPORT_CREDITS, ResourceContainer::new(30.0, 50.0));

        assert!(can_afford_transport(&host, &base, 30.0));
        assert!(!deduct_transport_cost(&mut host, &base, 31.0));
        assert_eq!(host.total(&base, TRANSPORT_CREDITS), 30.0);

        assert!(deduct_transport_cost(&mut host, &base, 12.0));
        assert_eq!(host.total(&base, TRANSPORT_CREDITS), 18.0);

        assert_eq!(refund_transport_cost(&mut host, &base, 12.0), 12.0);
        assert_eq!(host.total(&base, TRANSPORT_CREDITS), 30.0);
    }

    #[test]
    fn test_transport_capacity_without_credit_storage() {
        let ship = EndpointHandle::new("ship");
        let host = MemoryHost::new();
        assert_eq!(transport_capacity(&host, &ship), 0.0);
        assert!(!can_afford_transport(&host, &ship, 1.0));
        assert!(can_afford_transport(&host, &ship, 0.0));
    }
}
