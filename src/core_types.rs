//! Core types used throughout the system
//!
//! Type aliases that give the raw `f64` quantities handled by the engine a
//! semantic name.

/// Simulated universal time, in seconds.
///
/// Supplied by the host clock. Never wall-clock time.
pub type SimTime = f64;

/// A quantity of resource units.
///
/// Signed where it describes an exchange: positive deposits, negative
/// withdraws.
pub type Units = f64;

/// Mass in tonnes.
pub type Tonnes = f64;
