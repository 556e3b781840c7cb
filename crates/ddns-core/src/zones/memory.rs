// # Memory Zone Client
//
// In-memory implementation of ZoneClient.
//
// ## Purpose
//
// Serves a fixed zone catalog and keeps upserted record sets in a HashMap.
// Nothing survives a restart. Useful for tests and for running the daemon
// locally without cloud credentials.
//
// ## Pagination
//
// The catalog is sorted by name and cut into pages of `page_size` zones.
// Like Route 53, the continuation marker of a truncated page is the id of the
// first zone on the next page.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::config::{MemoryZoneConfig, ZoneBackendConfig};
use crate::resolver::normalize_zone_name;
use crate::traits::{
    ChangeAction, ChangeBatch, ChangeInfo, ChangeStatus, HostedZone, RecordType,
    ResourceRecordSet, ZoneClient, ZoneClientFactory, ZonePage,
};
use crate::Error;

type RecordKey = (String, String, RecordType);

/// In-memory zone client
///
/// # Example
///
/// ```rust,no_run
/// use ddns_core::zones::MemoryZoneClient;
/// use ddns_core::traits::{HostedZone, ZoneClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = MemoryZoneClient::new(vec![HostedZone::new("Z1", "example.com.")], 100);
///
///     let page = client.list_zones(None).await?;
///     assert_eq!(page.zones.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryZoneClient {
    zones: Arc<Vec<HostedZone>>,
    page_size: usize,
    records: Arc<RwLock<HashMap<RecordKey, ResourceRecordSet>>>,
    change_seq: Arc<AtomicU64>,
}

impl MemoryZoneClient {
    /// Create a client serving `zones`, `page_size` zones per page
    ///
    /// Zone names are trailing-dot normalized. A zero page size is treated
    /// as one.
    pub fn new(zones: Vec<HostedZone>, page_size: usize) -> Self {
        let mut zones: Vec<HostedZone> = zones
            .into_iter()
            .map(|z| HostedZone::new(z.id, normalize_zone_name(&z.name)))
            .collect();
        zones.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            zones: Arc::new(zones),
            page_size: page_size.max(1),
            records: Arc::new(RwLock::new(HashMap::new())),
            change_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a client from backend zone entries
    pub fn from_config(zones: &[MemoryZoneConfig], page_size: usize) -> Self {
        Self::new(
            zones
                .iter()
                .map(|z| HostedZone::new(z.id.clone(), z.name.clone()))
                .collect(),
            page_size,
        )
    }

    /// Get a stored record set
    pub async fn record(
        &self,
        zone_id: &str,
        name: &str,
        record_type: RecordType,
    ) -> Option<ResourceRecordSet> {
        let guard = self.records.read().await;
        guard
            .get(&(zone_id.to_string(), name.to_string(), record_type))
            .cloned()
    }

    /// Number of stored record sets
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Number of change batches accepted
    pub fn change_count(&self) -> u64 {
        self.change_seq.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ZoneClient for MemoryZoneClient {
    async fn list_zones(&self, marker: Option<&str>) -> Result<ZonePage, Error> {
        let start = match marker {
            None => 0,
            Some(marker) => self
                .zones
                .iter()
                .position(|z| z.id == marker)
                .ok_or_else(|| Error::upstream_msg("invalid zone catalog marker"))?,
        };

        let end = (start + self.page_size).min(self.zones.len());
        let zones = self.zones[start..end].to_vec();

        Ok(match self.zones.get(end) {
            Some(next) => ZonePage::truncated(zones, next.id.clone()),
            None => ZonePage::last(zones),
        })
    }

    async fn change_record_sets(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, Error> {
        if !self.zones.iter().any(|z| z.id == zone_id) {
            return Err(Error::upstream_msg(format!("no such hosted zone: {}", zone_id)));
        }

        let mut guard = self.records.write().await;
        for change in &batch.changes {
            match change.action {
                ChangeAction::Upsert => {
                    let set = &change.record_set;
                    guard.insert(
                        (zone_id.to_string(), set.name.clone(), set.record_type),
                        set.clone(),
                    );
                }
            }
        }

        let seq = self.change_seq.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ChangeInfo {
            id: format!("/change/C{:08}", seq),
            status: ChangeStatus::InSync,
            submitted_at: Utc::now(),
            comment: Some(batch.comment.clone()),
        })
    }

    fn client_name(&self) -> &'static str {
        "memory"
    }
}

/// Factory for the `memory` backend
pub struct MemoryZoneFactory;

#[async_trait]
impl ZoneClientFactory for MemoryZoneFactory {
    async fn create(&self, config: &ZoneBackendConfig) -> Result<Arc<dyn ZoneClient>, Error> {
        match config {
            ZoneBackendConfig::Memory { zones, page_size } => {
                Ok(Arc::new(MemoryZoneClient::from_config(zones, *page_size)))
            }
            _ => Err(Error::config("Invalid config for memory backend")),
        }
    }
}
