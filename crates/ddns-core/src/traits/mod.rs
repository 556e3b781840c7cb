//! Core traits for the DDNS update gateway
//!
//! - [`ZoneClient`]: List the zone catalog and submit record set changes

pub mod zone_client;

pub use zone_client::{
    Change, ChangeAction, ChangeBatch, ChangeInfo, ChangeStatus, HostedZone, RecordType,
    ResourceRecordSet, ZoneClient, ZoneClientFactory, ZonePage,
};
