//! Request validation
//!
//! Turns the raw path and query parameters of an update call into a typed
//! [`UpdateRequest`]. Pure: no I/O, and the same parameters always give the
//! same result.

use std::collections::HashMap;
use std::net::IpAddr;

use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::RecordType;

/// Path parameter: zone domain
pub const PARAM_DOMAIN: &str = "domain";
/// Path parameter: record label(s) inside the zone
pub const PARAM_RECORD: &str = "record";
/// Query parameter: record type
pub const PARAM_TYPE: &str = "type";
/// Query parameter: new record value
pub const PARAM_VALUE: &str = "value";

/// Longest DNS name (RFC 1035)
const MAX_NAME_LEN: usize = 253;
/// Longest DNS label (RFC 1035)
const MAX_LABEL_LEN: usize = 63;

/// A validated update request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Zone domain as supplied by the caller
    pub domain: String,
    /// Record label(s) inside the zone
    pub record: String,
    /// Record type
    pub record_type: RecordType,
    /// New value, already checked against `record_type`
    pub value: String,
}

/// Validate update parameters
///
/// Checks, in order:
/// 1. every required parameter is present (all missing ones reported together)
/// 2. `domain` and `record` are well-formed DNS names, and so is `record.domain`
/// 3. `type` is supported (case-insensitive)
/// 4. `value` is well-formed for that type
pub fn validate(params: &HashMap<String, String>) -> Result<UpdateRequest> {
    let missing: Vec<&str> = [PARAM_DOMAIN, PARAM_RECORD, PARAM_TYPE, PARAM_VALUE]
        .into_iter()
        .filter(|name| match params.get(*name) {
            None => true,
            // An empty path segment is as good as absent
            Some(v) => v.is_empty() && (*name == PARAM_DOMAIN || *name == PARAM_RECORD),
        })
        .collect();

    if !missing.is_empty() {
        debug!("Missing parameters: {:?}", missing);
        return Err(Error::missing(missing));
    }

    let domain = &params[PARAM_DOMAIN];
    let record = &params[PARAM_RECORD];
    let raw_type = &params[PARAM_TYPE];
    let value = &params[PARAM_VALUE];

    let bare_domain = domain.strip_suffix('.').unwrap_or(domain);
    validate_dns_name(bare_domain).map_err(|reason| invalid(PARAM_DOMAIN, reason))?;
    validate_dns_name(record).map_err(|reason| invalid(PARAM_RECORD, reason))?;
    // The composed name must fit as well
    if record.len() + 1 + bare_domain.len() > MAX_NAME_LEN {
        return Err(invalid(PARAM_RECORD, "record and domain together too long"));
    }

    let record_type: RecordType = raw_type.parse()?;
    validate_value(record_type, value)?;

    debug!("Validated {} record update for {}.{}", record_type, record, domain);
    Ok(UpdateRequest {
        domain: domain.clone(),
        record: record.clone(),
        record_type,
        value: value.clone(),
    })
}

/// Check a value is well-formed for a record type
///
/// Purely syntactic; nothing is resolved or probed.
pub fn validate_value(record_type: RecordType, value: &str) -> Result<()> {
    match record_type {
        RecordType::A => {
            if value.is_empty() {
                return Err(invalid(PARAM_VALUE, "value is empty"));
            }
            value
                .parse::<IpAddr>()
                .map(|_| ())
                .map_err(|_| invalid(PARAM_VALUE, "not an IP address literal"))
        }
    }
}

fn invalid(parameter: &str, reason: &str) -> Error {
    debug!("Invalid '{}' parameter: {}", parameter, reason);
    Error::invalid_value(parameter)
}

/// Basic DNS name validation per RFC 1035
///
/// Labels are 1-63 alphanumeric or hyphen characters and cannot start or end
/// with a hyphen.
fn validate_dns_name(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is empty");
    }
    if name.len() > MAX_NAME_LEN {
        return Err("name too long");
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err("empty label");
        }
        if label.len() > MAX_LABEL_LEN {
            return Err("label too long");
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("invalid characters");
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err("label starts or ends with hyphen");
        }
    }

    Ok(())
}
