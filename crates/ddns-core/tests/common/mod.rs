//! Test doubles and common utilities for contract tests
//!
//! These doubles script the zone store's answers and count calls, so tests
//! can assert what the pipeline asked for as well as what it returned.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use ddns_core::config::{GatewayConfig, ReferenceCredential, ZoneBackendConfig};
use ddns_core::error::Result;
use ddns_core::traits::{
    ChangeBatch, ChangeInfo, ChangeStatus, HostedZone, ZoneClient, ZonePage,
};
use ddns_core::Error;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const IDENTITY: &str = "alice";
pub const SECRET: &str = "correct-horse:battery";

/// Build a `Basic` header value
pub fn basic_header(identity: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", identity, secret)))
}

/// Header carrying the reference credential
pub fn valid_header() -> String {
    basic_header(IDENTITY, SECRET)
}

/// One scripted answer to `list_zones`
#[derive(Debug, Clone)]
pub enum PageScript {
    Page(ZonePage),
    Fail,
}

/// A zone client whose catalog answers are scripted call by call
///
/// Call `n` of `list_zones` gets script entry `n`; calls past the end of the
/// script repeat the last entry.
pub struct ScriptedZoneClient {
    script: Vec<PageScript>,
    list_delay: Option<Duration>,
    fail_changes: bool,
    list_calls: Arc<AtomicUsize>,
    markers: Arc<Mutex<Vec<Option<String>>>>,
    changes: Arc<Mutex<Vec<(String, ChangeBatch)>>>,
}

impl ScriptedZoneClient {
    pub fn new(script: Vec<PageScript>) -> Self {
        Self {
            script,
            list_delay: None,
            fail_changes: false,
            list_calls: Arc::new(AtomicUsize::new(0)),
            markers: Arc::new(Mutex::new(Vec::new())),
            changes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Serve `pages` in order
    pub fn with_pages(pages: Vec<ZonePage>) -> Self {
        Self::new(pages.into_iter().map(PageScript::Page).collect())
    }

    /// Sleep before answering each `list_zones` call
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    /// Make every `change_record_sets` call fail
    pub fn failing_changes(mut self) -> Self {
        self.fail_changes = true;
        self
    }

    /// Number of `list_zones` calls so far
    pub fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Markers passed to `list_zones`, in call order
    pub fn markers(&self) -> Vec<Option<String>> {
        self.markers.lock().unwrap().clone()
    }

    /// Change batches submitted, with their zone ids
    pub fn changes(&self) -> Vec<(String, ChangeBatch)> {
        self.changes.lock().unwrap().clone()
    }

    /// Create a client that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            script: other.script.clone(),
            list_delay: other.list_delay,
            fail_changes: other.fail_changes,
            list_calls: Arc::clone(&other.list_calls),
            markers: Arc::clone(&other.markers),
            changes: Arc::clone(&other.changes),
        }
    }
}

#[async_trait]
impl ZoneClient for ScriptedZoneClient {
    async fn list_zones(&self, marker: Option<&str>) -> Result<ZonePage> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.markers
            .lock()
            .unwrap()
            .push(marker.map(str::to_string));

        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }

        let entry = self
            .script
            .get(call)
            .or_else(|| self.script.last())
            .cloned()
            .unwrap_or(PageScript::Page(ZonePage::last(Vec::new())));

        match entry {
            PageScript::Page(page) => Ok(page),
            PageScript::Fail => Err(Error::upstream(
                "ListHostedZones",
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
            )),
        }
    }

    async fn change_record_sets(&self, zone_id: &str, batch: &ChangeBatch) -> Result<ChangeInfo> {
        if self.fail_changes {
            return Err(Error::upstream_msg("ChangeResourceRecordSets throttled"));
        }

        let mut changes = self.changes.lock().unwrap();
        changes.push((zone_id.to_string(), batch.clone()));
        Ok(ChangeInfo {
            id: format!("/change/C{}", changes.len()),
            status: ChangeStatus::Pending,
            submitted_at: Utc::now(),
            comment: Some(batch.comment.clone()),
        })
    }

    fn client_name(&self) -> &'static str {
        "scripted"
    }
}

/// Split `zones` into pages of `per_page`, linked by markers `m1`, `m2`, ...
pub fn paged_catalog(zones: Vec<HostedZone>, per_page: usize) -> Vec<ZonePage> {
    let chunks: Vec<Vec<HostedZone>> = zones.chunks(per_page).map(|c| c.to_vec()).collect();
    let count = chunks.len();

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, zones)| {
            if i + 1 < count {
                ZonePage::truncated(zones, format!("m{}", i + 1))
            } else {
                ZonePage::last(zones)
            }
        })
        .collect()
}

/// `count` filler zones named `filler<i>.net.`
pub fn filler_zones(count: usize) -> Vec<HostedZone> {
    (0..count)
        .map(|i| HostedZone::new(format!("ZF{}", i), format!("filler{}.net.", i)))
        .collect()
}

/// Helper to create a minimal GatewayConfig for testing
pub fn minimal_config() -> GatewayConfig {
    GatewayConfig::new(
        ReferenceCredential::new(IDENTITY, SECRET),
        ZoneBackendConfig::Memory {
            zones: Vec::new(),
            page_size: 100,
        },
    )
}
