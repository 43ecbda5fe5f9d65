//! Logistics Engine - Deferred Resource Transfers
//!
//! Schedules transfers of a resource between simulation endpoints, delivers
//! them once their transit time has elapsed, and persists the registry
//! across host save/load.
//!
//! # Modules
//!
//! - [`core_types`] - Time and quantity aliases
//! - [`config`] - YAML configuration
//! - [`logging`] - Tracing subscriber setup
//! - [`logistics`] - Transfer state machine, registry, exchanger, scheduler, persistence

// Core types - must be first!
pub mod core_types;

pub mod config;
pub mod logging;
pub mod logistics;

// Convenient re-exports at crate root
pub use core_types::{SimTime, Tonnes, Units};
pub use logistics::{
    DeliveryStatus, EndpointCapabilities, EndpointHandle, LogisticsError, ResourceContainer,
    ResourceKind, SimulationClock, TransferId, TransferKind, TransferRequest, TransferScheduler,
};
