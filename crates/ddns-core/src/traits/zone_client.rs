// # Zone Client Trait
//
// Defines the narrow capability the gateway needs from a DNS zone store:
// list the zone catalog one page at a time, and submit a batch of record
// set changes against one zone.
//
// ## Implementations
//
// - Route 53: `ddns-provider-route53` crate
// - In-memory: `ddns_core::zones::MemoryZoneClient`
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::ZoneClient;
//
// let page = client.list_zones(None).await?;
// for zone in &page.zones {
//     println!("{} -> {}", zone.name, zone.id);
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// DNS record type
///
/// Only address records are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// Address record
    A,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = crate::Error;

    /// Case-insensitive parse
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            other => Err(crate::Error::UnsupportedRecordType(other.to_string())),
        }
    }
}

/// One entry of the zone catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZone {
    /// Opaque zone id
    pub id: String,
    /// Fully-qualified zone name, trailing-dot terminated
    pub name: String,
}

impl HostedZone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One page of the zone catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZonePage {
    /// Zones on this page
    pub zones: Vec<HostedZone>,
    /// More pages follow
    pub is_truncated: bool,
    /// Marker to pass when requesting the next page
    pub next_marker: Option<String>,
}

impl ZonePage {
    /// A final (non-truncated) page
    pub fn last(zones: Vec<HostedZone>) -> Self {
        Self {
            zones,
            is_truncated: false,
            next_marker: None,
        }
    }

    /// A truncated page followed by `next_marker`
    pub fn truncated(zones: Vec<HostedZone>, next_marker: impl Into<String>) -> Self {
        Self {
            zones,
            is_truncated: true,
            next_marker: Some(next_marker.into()),
        }
    }
}

/// Change action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    /// Create the record set, or replace it if it exists
    Upsert,
}

/// The provider's view of one DNS record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecordSet {
    /// Fully-qualified record name
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Record values
    pub values: Vec<String>,
    /// Time-to-live in seconds
    pub ttl_secs: u32,
}

/// One change inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub action: ChangeAction,
    pub record_set: ResourceRecordSet,
}

/// A batch of changes submitted against one zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch {
    /// Free-text comment kept in the zone's change history
    pub comment: String,
    /// Changes applied together
    pub changes: Vec<Change>,
}

/// Propagation status reported for a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Pending,
    InSync,
}

/// Receipt for an accepted change batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    /// Provider change id
    pub id: String,
    /// Status at submission time
    pub status: ChangeStatus,
    /// When the provider accepted the batch
    pub submitted_at: DateTime<Utc>,
    /// Comment echoed back
    pub comment: Option<String>,
}

/// Capability interface over a DNS zone store
///
/// # Thread Safety
///
/// Implementations are shared read-only across concurrent requests and must
/// be `Send + Sync`.
///
/// # Contract
///
/// - Each method makes one call to the store; no retries, no waiting for
///   propagation. Retry policy belongs to the caller.
/// - Failures are returned as [`crate::Error::Upstream`].
#[async_trait]
pub trait ZoneClient: Send + Sync {
    /// List one page of the zone catalog
    ///
    /// `marker` is `None` for the first page and the previous page's
    /// `next_marker` afterwards.
    async fn list_zones(&self, marker: Option<&str>) -> Result<ZonePage, crate::Error>;

    /// Submit a change batch against a zone
    ///
    /// Upsert changes are idempotent: submitting the same batch twice yields
    /// the same end state.
    async fn change_record_sets(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, crate::Error>;

    /// Backend name (for logging)
    fn client_name(&self) -> &'static str;
}

/// Helper trait for constructing zone clients from configuration
#[async_trait]
pub trait ZoneClientFactory: Send + Sync {
    /// Create a ZoneClient from configuration
    ///
    /// Construction may need I/O (credential discovery), hence async.
    async fn create(
        &self,
        config: &crate::config::ZoneBackendConfig,
    ) -> Result<std::sync::Arc<dyn ZoneClient>, crate::Error>;
}
