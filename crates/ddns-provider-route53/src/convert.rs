//! Conversions between the gateway's zone types and the Route 53 SDK types

use aws_sdk_route53::primitives::DateTime as AwsDateTime;
use aws_sdk_route53::types as r53;
use chrono::{DateTime, Utc};
use ddns_core::traits::{
    Change, ChangeAction, ChangeBatch, ChangeInfo, ChangeStatus, HostedZone, RecordType,
    ZonePage,
};
use ddns_core::{Error, Result};

/// Build a catalog page from one `ListHostedZones` answer
pub fn zone_page(
    zones: &[r53::HostedZone],
    is_truncated: bool,
    next_marker: Option<&str>,
) -> ZonePage {
    ZonePage {
        zones: zones
            .iter()
            .map(|z| HostedZone::new(z.id(), z.name()))
            .collect(),
        is_truncated,
        next_marker: next_marker.map(str::to_string),
    }
}

pub fn rr_type(record_type: RecordType) -> r53::RrType {
    match record_type {
        RecordType::A => r53::RrType::A,
    }
}

fn change_action(action: ChangeAction) -> r53::ChangeAction {
    match action {
        ChangeAction::Upsert => r53::ChangeAction::Upsert,
    }
}

fn change(change: &Change) -> Result<r53::Change> {
    let set = &change.record_set;

    let mut builder = r53::ResourceRecordSet::builder()
        .name(&set.name)
        .r#type(rr_type(set.record_type))
        .ttl(i64::from(set.ttl_secs));
    for value in &set.values {
        let record = r53::ResourceRecord::builder()
            .value(value)
            .build()
            .map_err(|e| Error::upstream("building resource record", e))?;
        builder = builder.resource_records(record);
    }
    let record_set = builder
        .build()
        .map_err(|e| Error::upstream("building resource record set", e))?;

    r53::Change::builder()
        .action(change_action(change.action))
        .resource_record_set(record_set)
        .build()
        .map_err(|e| Error::upstream("building change", e))
}

/// Build the SDK change batch for `ChangeResourceRecordSets`
pub fn change_batch(batch: &ChangeBatch) -> Result<r53::ChangeBatch> {
    let changes = batch.changes.iter().map(change).collect::<Result<Vec<_>>>()?;

    r53::ChangeBatch::builder()
        .comment(&batch.comment)
        .set_changes(Some(changes))
        .build()
        .map_err(|e| Error::upstream("building change batch", e))
}

pub fn change_status(status: &r53::ChangeStatus) -> ChangeStatus {
    match status {
        r53::ChangeStatus::Insync => ChangeStatus::InSync,
        _ => ChangeStatus::Pending,
    }
}

pub fn timestamp(at: &AwsDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(at.secs(), at.subsec_nanos()).unwrap_or_else(Utc::now)
}

/// Map the SDK's change receipt
pub fn change_info(info: &r53::ChangeInfo) -> ChangeInfo {
    ChangeInfo {
        id: info.id().to_string(),
        status: change_status(info.status()),
        submitted_at: timestamp(info.submitted_at()),
        comment: info.comment().map(str::to_string),
    }
}
