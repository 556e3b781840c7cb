// # ddns-core
//
// Core library for the DDNS update gateway.
//
// ## Architecture Overview
//
// One HTTP call updates one DNS address record:
// - **CredentialGate**: Verifies the Basic credential and scopes the allow decision
// - **validate**: Checks parameters and the record type/value pair
// - **ZoneResolver**: Finds the hosted zone by paging through the zone catalog
// - **RecordMutator**: Submits one idempotent upsert against the zone
// - **response**: Maps every outcome to a status code and a stable JSON body
// - **UpdatePipeline**: Runs the stages above in order, short-circuiting on failure
// - **ZoneClient**: Trait over the DNS zone store (Route 53, in-memory, ...)
// - **ZoneClientRegistry**: Plugin-based registry of zone store backends
//
// ## Design Principles
//
// 1. **Stateless**: Nothing survives a request except the reference credential
//    and the zone client, both read-only
// 2. **Closed error taxonomy**: Callers branch on `ErrorKind`, never on messages
// 3. **No retries**: Upstream failures are surfaced, retry policy lives outside
// 4. **Library-First**: The daemon is a thin layer over this crate

pub mod auth;
pub mod config;
pub mod error;
pub mod mutator;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod response;
pub mod traits;
pub mod validate;
pub mod zones;

// Re-export core types for convenience
pub use auth::{AuthorizationDecision, AuthorizerRequest, AuthorizerResponse, CredentialGate};
pub use config::{GatewayConfig, PipelineConfig, ReferenceCredential, ZoneBackendConfig};
pub use error::{AuthFailure, Error, ErrorKind, Result};
pub use mutator::{DnsRecordChange, RecordMutator, UpdateSummary};
pub use pipeline::{UpdateInvocation, UpdatePipeline};
pub use registry::ZoneClientRegistry;
pub use resolver::{ResolvedZone, ZonePager, ZoneResolver};
pub use response::HttpReply;
pub use traits::{RecordType, ZoneClient};
pub use validate::UpdateRequest;
pub use zones::MemoryZoneClient;
