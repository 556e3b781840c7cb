//! Record mutation
//!
//! Builds the single upsert change for a validated request against its
//! resolved zone and submits it as one batch. The contract is "change
//! accepted", not "change visible": propagation status is not awaited.

use tracing::debug;

use crate::error::Result;
use crate::resolver::ResolvedZone;
use crate::traits::{
    Change, ChangeAction, ChangeBatch, ChangeInfo, RecordType, ResourceRecordSet, ZoneClient,
};
use crate::validate::UpdateRequest;

/// TTL of every record written by the gateway
///
/// Kept short since these records are expected to change often.
pub const RECORD_TTL_SECS: u32 = 60;

/// Comment attached to every change batch
pub const CHANGE_COMMENT: &str = "DDNS update.";

/// The one change a request produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecordChange {
    pub zone_id: String,
    pub fqdn: String,
    pub record_type: RecordType,
    pub value: String,
    pub ttl_secs: u32,
}

impl DnsRecordChange {
    /// Derive the change from a request and its zone
    ///
    /// The FQDN is `record + "." + zone name`, and the zone name is already
    /// trailing-dot normalized.
    pub fn new(zone: &ResolvedZone, request: &UpdateRequest) -> Self {
        Self {
            zone_id: zone.zone_id.clone(),
            fqdn: format!("{}.{}", request.record, zone.name),
            record_type: request.record_type,
            value: request.value.clone(),
            ttl_secs: RECORD_TTL_SECS,
        }
    }

    /// Build the single-change upsert batch
    pub fn to_batch(&self) -> ChangeBatch {
        ChangeBatch {
            comment: CHANGE_COMMENT.to_string(),
            changes: vec![Change {
                action: ChangeAction::Upsert,
                record_set: ResourceRecordSet {
                    name: self.fqdn.clone(),
                    record_type: self.record_type,
                    values: vec![self.value.clone()],
                    ttl_secs: self.ttl_secs,
                },
            }],
        }
    }
}

/// Result of an accepted update
///
/// Only `domain`, `zone_id`, `record`, `record_type` and `value` go on the
/// wire; see [`crate::response`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    pub domain: String,
    pub zone_id: String,
    pub record: String,
    pub record_type: RecordType,
    pub value: String,
    pub fqdn: String,
    pub change_id: String,
}

/// Submits upsert changes
pub struct RecordMutator<'a> {
    client: &'a dyn ZoneClient,
}

impl<'a> RecordMutator<'a> {
    pub fn new(client: &'a dyn ZoneClient) -> Self {
        Self { client }
    }

    /// Upsert the requested record in the resolved zone
    ///
    /// Any client error is an upstream failure.
    pub async fn upsert(&self, zone: &ResolvedZone, request: &UpdateRequest) -> Result<UpdateSummary> {
        let change = DnsRecordChange::new(zone, request);
        debug!(
            "Submitting UPSERT {} {} -> {} (ttl {}) in zone {}",
            change.fqdn, change.record_type, change.value, change.ttl_secs, change.zone_id
        );

        let info: ChangeInfo = self
            .client
            .change_record_sets(&change.zone_id, &change.to_batch())
            .await
            .map_err(|e| e.into_upstream("changing resource record sets"))?;

        debug!(
            "Upsert accepted by {}: {} {} -> {} (change {})",
            self.client.client_name(),
            change.fqdn,
            change.record_type,
            change.value,
            info.id
        );

        Ok(UpdateSummary {
            domain: request.domain.clone(),
            zone_id: change.zone_id,
            record: request.record.clone(),
            record_type: change.record_type,
            value: change.value,
            fqdn: change.fqdn,
            change_id: info.id,
        })
    }
}
