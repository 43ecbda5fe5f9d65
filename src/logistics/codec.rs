//! Persistence Codec
//!
//! Converts the registry's two sequences to and from a save block.
//!
//! # Save Block Layout (YAML)
//!
//! ```text
//! logistics:
//!   saved_at: 2026-01-01T00:00:00Z
//!   pending:
//!     - id: 01J...
//!       kind: Cargo
//!       origin: Mun Base
//!       ...
//!   expired:
//!     - ...
//! ```
//!
//! Every record is self-contained. On load each record is classified by its
//! status, not by the group it was written in. A single malformed record
//! fails the whole load.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core_types::{SimTime, Units};

use super::error::LogisticsError;
use super::state::DeliveryStatus;
use super::transfer::TransferRequest;
use super::types::{EndpointHandle, ResourceKind, TransferDirection, TransferId, TransferKind};

/// Text encoding of a save block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Yaml,
    Json,
}

impl SaveFormat {
    /// Parse a config value ("yaml", "yml", "json"), defaulting to YAML
    pub fn from_config(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "json" => SaveFormat::Json,
            _ => SaveFormat::Yaml,
        }
    }
}

/// One persisted transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: String,
    pub kind: TransferKind,
    pub origin: EndpointHandle,
    pub destination: EndpointHandle,
    pub resource: String,
    pub density: f64,
    pub amount: Units,
    pub cost: Units,
    pub launch_time: SimTime,
    pub arrival_time: SimTime,
    pub status: DeliveryStatus,
    pub direction: TransferDirection,
    pub delivered_amount: Units,
    pub abort_requested: bool,
}

impl From<&TransferRequest> for TransferRecord {
    fn from(t: &TransferRequest) -> Self {
        Self {
            id: t.id.to_string(),
            kind: t.kind,
            origin: t.origin.clone(),
            destination: t.destination.clone(),
            resource: t.resource.name.clone(),
            density: t.resource.density,
            amount: t.amount,
            cost: t.cost,
            launch_time: t.launch_time,
            arrival_time: t.arrival_time,
            status: t.status,
            direction: t.direction,
            delivered_amount: t.delivered_amount,
            abort_requested: t.abort_requested,
        }
    }
}

impl TryFrom<TransferRecord> for TransferRequest {
    type Error = LogisticsError;

    fn try_from(record: TransferRecord) -> Result<Self, Self::Error> {
        let id: TransferId = record
            .id
            .parse()
            .map_err(|e| LogisticsError::MalformedRecord(format!("id {:?}: {}", record.id, e)))?;

        let malformed = |what: &str| LogisticsError::MalformedRecord(format!("{}: {}", id, what));

        for (field, value) in [
            ("density", record.density),
            ("amount", record.amount),
            ("cost", record.cost),
            ("launch_time", record.launch_time),
            ("arrival_time", record.arrival_time),
            ("delivered_amount", record.delivered_amount),
        ] {
            if !value.is_finite() {
                return Err(malformed(&format!("{} is not a finite number", field)));
            }
        }

        if record.arrival_time < record.launch_time {
            return Err(malformed("arrival_time is before launch_time"));
        }
        if record.origin.as_str().is_empty() || record.destination.as_str().is_empty() {
            return Err(malformed("empty endpoint handle"));
        }
        if record.resource.is_empty() {
            return Err(malformed("empty resource name"));
        }

        Ok(TransferRequest {
            id,
            kind: record.kind,
            origin: record.origin,
            destination: record.destination,
            resource: ResourceKind::new(record.resource, record.density),
            amount: record.amount,
            cost: record.cost,
            launch_time: record.launch_time,
            arrival_time: record.arrival_time,
            status: record.status,
            direction: record.direction,
            delivered_amount: record.delivered_amount,
            abort_requested: record.abort_requested,
        })
    }
}

/// The engine's section of the simulation save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveBlock {
    /// Wall-clock time of the save, informational only
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pending: Vec<TransferRecord>,
    #[serde(default)]
    pub expired: Vec<TransferRecord>,
}

impl SaveBlock {
    pub fn len(&self) -> usize {
        self.pending.len() + self.expired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SaveDocument {
    logistics: SaveBlock,
}

/// Serialize `pending` then `expired`, each in its current order.
pub fn save(pending: &[TransferRequest], expired: &[TransferRequest]) -> SaveBlock {
    SaveBlock {
        saved_at: Some(Utc::now()),
        pending: pending.iter().map(TransferRecord::from).collect(),
        expired: expired.iter().map(TransferRecord::from).collect(),
    }
}

/// Decode every record and classify it into (pending, expired), both
/// sorted by arrival time.
pub fn load(
    block: &SaveBlock,
) -> Result<(Vec<TransferRequest>, Vec<TransferRequest>), LogisticsError> {
    let mut seen = FxHashSet::default();
    let mut pending = Vec::new();
    let mut expired = Vec::new();

    for record in block.pending.iter().chain(block.expired.iter()) {
        let transfer = TransferRequest::try_from(record.clone())?;
        if !seen.insert(transfer.id()) {
            return Err(LogisticsError::DuplicateTransfer(transfer.id()));
        }

        if transfer.status().is_pending() {
            pending.push(transfer);
        } else {
            expired.push(transfer);
        }
    }

    pending.sort_by(|a, b| a.arrival_cmp(b));
    expired.sort_by(|a, b| a.arrival_cmp(b));

    info!(
        pending = pending.len(),
        expired = expired.len(),
        "Transfers loaded"
    );

    Ok((pending, expired))
}

/// Render a save block as text.
pub fn encode(block: &SaveBlock, format: SaveFormat) -> Result<String, LogisticsError> {
    let document = SaveDocument {
        logistics: block.clone(),
    };

    match format {
        SaveFormat::Yaml => serde_yaml::to_string(&document)
            .map_err(|e| LogisticsError::Serialization(e.to_string())),
        SaveFormat::Json => serde_json::to_string_pretty(&document)
            .map_err(|e| LogisticsError::Serialization(e.to_string())),
    }
}

/// Parse a save block from text. Missing fields and unknown enum values
/// are reported as `MalformedRecord`.
pub fn decode(text: &str, format: SaveFormat) -> Result<SaveBlock, LogisticsError> {
    let document: SaveDocument = match format {
        SaveFormat::Yaml => serde_yaml::from_str(text)
            .map_err(|e| LogisticsError::MalformedRecord(e.to_string()))?,
        SaveFormat::Json => serde_json::from_str(text)
            .map_err(|e| LogisticsError::MalformedRecord(e.to_string()))?,
    };
    Ok(document.logistics)
}
