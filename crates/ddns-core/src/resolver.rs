//! Zone resolution
//!
//! Maps a human domain name to the opaque id of the hosted zone that serves
//! it, by walking the zone catalog page by page until an exact match or the
//! end of the catalog.
//!
//! ## Termination
//!
//! The nominal contract is that the upstream clears `is_truncated` on its last
//! page. [`ZonePager`] does not rely on that alone: it stops with an upstream
//! failure when the page cap is hit, when a truncated page carries no marker,
//! or when a marker repeats.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::traits::{ZoneClient, ZonePage};

/// A zone resolved for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedZone {
    /// Zone name, trailing-dot normalized
    pub name: String,
    /// Opaque zone id
    pub zone_id: String,
}

/// Append the trailing `.` the zone catalog uses, if absent
pub fn normalize_zone_name(domain: &str) -> String {
    if domain.ends_with('.') {
        domain.to_string()
    } else {
        format!("{}.", domain)
    }
}

/// Bounded, restartable sequence of zone catalog pages
pub struct ZonePager<'a> {
    client: &'a dyn ZoneClient,
    max_pages: usize,
    pages_fetched: usize,
    next_marker: Option<String>,
    seen_markers: HashSet<String>,
    // Raised on the call after a page whose marker cannot be followed
    pending_failure: Option<Error>,
    exhausted: bool,
}

impl<'a> ZonePager<'a> {
    /// Create a pager positioned before the first page
    pub fn new(client: &'a dyn ZoneClient, max_pages: usize) -> Self {
        Self {
            client,
            max_pages,
            pages_fetched: 0,
            next_marker: None,
            seen_markers: HashSet::new(),
            pending_failure: None,
            exhausted: false,
        }
    }

    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Rewind to the first page
    pub fn restart(&mut self) {
        self.pages_fetched = 0;
        self.next_marker = None;
        self.seen_markers.clear();
        self.pending_failure = None;
        self.exhausted = false;
    }

    /// Fetch the next page
    ///
    /// # Returns
    ///
    /// - `Some(Ok(page))`: the next page
    /// - `Some(Err(_))`: the request failed, or the previous page could not be
    ///   followed (missing or repeated marker); the pager is exhausted afterwards
    /// - `None`: the previous page was the last one
    pub async fn next_page(&mut self) -> Option<Result<ZonePage>> {
        if self.exhausted {
            return None;
        }

        if let Some(failure) = self.pending_failure.take() {
            self.exhausted = true;
            return Some(Err(failure));
        }

        if self.pages_fetched >= self.max_pages {
            self.exhausted = true;
            warn!(
                "Zone catalog still truncated after {} pages, giving up",
                self.max_pages
            );
            return Some(Err(Error::upstream_msg(format!(
                "zone catalog exceeded {} pages",
                self.max_pages
            ))));
        }

        let marker = self.next_marker.take();
        let result = self
            .client
            .list_zones(marker.as_deref())
            .await
            .map_err(|e| e.into_upstream("listing hosted zones"));
        self.pages_fetched += 1;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.exhausted = true;
                return Some(Err(e));
            }
        };

        debug!(
            "Fetched zone page {} ({} zones, truncated: {})",
            self.pages_fetched,
            page.zones.len(),
            page.is_truncated
        );

        if !page.is_truncated {
            self.exhausted = true;
            return Some(Ok(page));
        }

        match page.next_marker.as_deref() {
            None | Some("") => {
                self.pending_failure = Some(Error::upstream_msg(
                    "zone catalog truncated without a continuation marker",
                ));
            }
            Some(next) if !self.seen_markers.insert(next.to_string()) => {
                warn!("Zone catalog repeated continuation marker {}", next);
                self.pending_failure = Some(Error::upstream_msg(
                    "zone catalog repeated a continuation marker",
                ));
            }
            Some(next) => self.next_marker = Some(next.to_string()),
        }
        Some(Ok(page))
    }
}

/// Resolves domains to hosted zones
pub struct ZoneResolver<'a> {
    client: &'a dyn ZoneClient,
    max_pages: usize,
}

impl<'a> ZoneResolver<'a> {
    pub fn new(client: &'a dyn ZoneClient, max_pages: usize) -> Self {
        Self { client, max_pages }
    }

    /// Resolve `domain` to its hosted zone
    ///
    /// # Returns
    ///
    /// - `Ok(ResolvedZone)`: a catalog entry's name equals the normalized domain
    /// - `Err(Error::ZoneNotFound)`: the catalog was exhausted without a match
    /// - `Err(Error::Upstream)`: a page request failed; not retried
    pub async fn resolve(&self, domain: &str) -> Result<ResolvedZone> {
        let name = normalize_zone_name(domain);
        let mut pager = ZonePager::new(self.client, self.max_pages);

        while let Some(page) = pager.next_page().await {
            let page = page?;
            if let Some(zone) = page.zones.into_iter().find(|z| z.name == name) {
                debug!(
                    "Resolved zone {} to {} after {} page(s)",
                    name,
                    zone.id,
                    pager.pages_fetched()
                );
                return Ok(ResolvedZone {
                    name,
                    zone_id: zone.id,
                });
            }
        }

        debug!(
            "Zone {} not in catalog ({} page(s) searched)",
            name,
            pager.pages_fetched()
        );
        Err(Error::zone_not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_zone_name() {
        assert_eq!(normalize_zone_name("example.com"), "example.com.");
        assert_eq!(normalize_zone_name("example.com."), "example.com.");
    }
}
