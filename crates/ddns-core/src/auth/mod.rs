//! Credential gate
//!
//! Verifies an HTTP `Basic` authorization header against the process-wide
//! reference credential and, on success, issues an [`AuthorizationDecision`]
//! scoped to exactly one action on exactly one resource.
//!
//! ## Security
//!
//! - Neither the presented nor the reference secret is ever logged.
//! - A mismatch yields [`AuthFailure::InvalidCredentials`] regardless of which
//!   field differed, and both fields are compared in constant time before
//!   deciding.

pub mod policy;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::config::ReferenceCredential;
use crate::error::AuthFailure;

pub use policy::{
    AuthorizerRequest, AuthorizerResponse, EXECUTE_API_INVOKE, POLICY_VERSION, PolicyDocument,
    PolicyStatement,
};

/// Credential presented with a request
///
/// Transient; parsed per request and dropped afterwards.
#[derive(Debug)]
pub struct Credential {
    pub identity: String,
    pub secret: SecretString,
}

impl Credential {
    /// Parse a `Basic <base64(identity:secret)>` header value
    ///
    /// The scheme is matched case-insensitively. The payload is split on the
    /// first `:`, so the secret may itself contain `:`.
    pub fn from_basic_header(header_value: &str) -> Result<Self, AuthFailure> {
        let (scheme, payload) = header_value
            .split_once(' ')
            .ok_or(AuthFailure::MalformedHeader)?;

        if !scheme.eq_ignore_ascii_case("basic") || payload.is_empty() {
            return Err(AuthFailure::MalformedHeader);
        }

        let decoded = STANDARD
            .decode(payload)
            .map_err(|_| AuthFailure::MalformedEncoding)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthFailure::MalformedEncoding)?;

        let (identity, secret) = decoded
            .split_once(':')
            .ok_or(AuthFailure::MalformedPayload)?;

        Ok(Self {
            identity: identity.to_string(),
            secret: SecretString::from(secret.to_string()),
        })
    }
}

/// Allow decision for one invocation
///
/// Grants exactly `allowed_action` on exactly `allowed_resource`, nothing
/// broader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationDecision {
    pub principal: String,
    pub allowed_action: String,
    pub allowed_resource: String,
}

/// Verifies presented credentials against the reference credential
#[derive(Debug, Clone)]
pub struct CredentialGate {
    reference: ReferenceCredential,
}

impl CredentialGate {
    /// Create a gate around an immutable reference credential
    pub fn new(reference: ReferenceCredential) -> Self {
        Self { reference }
    }

    /// Authenticate a header value and scope the decision to one action and resource
    ///
    /// # Returns
    ///
    /// - `Ok(AuthorizationDecision)`: credential matched
    /// - `Err(AuthFailure)`: malformed header, or credential mismatch
    pub fn authenticate(
        &self,
        header_value: &str,
        action: &str,
        resource: &str,
    ) -> Result<AuthorizationDecision, AuthFailure> {
        let credential = Credential::from_basic_header(header_value).inspect_err(|failure| {
            debug!("Rejecting credential for {}: {}", resource, failure);
        })?;

        if !self.matches(&credential) {
            debug!("Rejecting credential for {}: invalid credentials", resource);
            return Err(AuthFailure::InvalidCredentials);
        }

        debug!("Authorized {} for {} on {}", credential.identity, action, resource);
        Ok(AuthorizationDecision {
            principal: credential.identity,
            allowed_action: action.to_string(),
            allowed_resource: resource.to_string(),
        })
    }

    /// Same as [`authenticate`](Self::authenticate), for a possibly absent header
    pub fn authenticate_header(
        &self,
        header_value: Option<&str>,
        action: &str,
        resource: &str,
    ) -> Result<AuthorizationDecision, AuthFailure> {
        match header_value {
            Some(value) => self.authenticate(value, action, resource),
            None => {
                debug!("Rejecting request for {}: no authorization header", resource);
                Err(AuthFailure::MissingCredentials)
            }
        }
    }

    fn matches(&self, credential: &Credential) -> bool {
        let identity_ok = credential
            .identity
            .as_bytes()
            .ct_eq(self.reference.identity.as_bytes());
        let secret_ok = credential
            .secret
            .expose_secret()
            .as_bytes()
            .ct_eq(self.reference.secret.expose_secret().as_bytes());
        (identity_ok & secret_ok).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    fn gate() -> CredentialGate {
        CredentialGate::new(ReferenceCredential::new("alice", "s3cret"))
    }

    #[test]
    fn test_parse_basic_header() {
        let credential = Credential::from_basic_header(&basic("alice:s3cret")).unwrap();
        assert_eq!(credential.identity, "alice");
        assert_eq!(credential.secret.expose_secret(), "s3cret");
    }

    #[test]
    fn test_secret_may_contain_colon() {
        let credential = Credential::from_basic_header(&basic("alice:a:b:c")).unwrap();
        assert_eq!(credential.identity, "alice");
        assert_eq!(credential.secret.expose_secret(), "a:b:c");
    }

    #[test]
    fn test_scheme_case_insensitive() {
        let header = format!("bAsIc {}", STANDARD.encode("alice:s3cret"));
        assert!(Credential::from_basic_header(&header).is_ok());
    }

    #[test]
    fn test_malformed_headers() {
        assert_eq!(
            Credential::from_basic_header("Basic").unwrap_err(),
            AuthFailure::MalformedHeader
        );
        assert_eq!(
            Credential::from_basic_header("Bearer abc").unwrap_err(),
            AuthFailure::MalformedHeader
        );
        assert_eq!(
            Credential::from_basic_header("Basic !!notbase64!!").unwrap_err(),
            AuthFailure::MalformedEncoding
        );
        assert_eq!(
            Credential::from_basic_header(&basic("no-separator")).unwrap_err(),
            AuthFailure::MalformedPayload
        );
    }

    #[test]
    fn test_decision_is_scoped() {
        let decision = gate()
            .authenticate(&basic("alice:s3cret"), EXECUTE_API_INVOKE, "arn:method")
            .unwrap();
        assert_eq!(decision.principal, "alice");
        assert_eq!(decision.allowed_action, EXECUTE_API_INVOKE);
        assert_eq!(decision.allowed_resource, "arn:method");
    }

    #[test]
    fn test_missing_header() {
        let failure = gate()
            .authenticate_header(None, EXECUTE_API_INVOKE, "arn:method")
            .unwrap_err();
        assert_eq!(failure, AuthFailure::MissingCredentials);
    }

    #[test]
    fn test_credential_debug_redacts_secret() {
        let credential = Credential::from_basic_header(&basic("alice:topsecret")).unwrap();
        assert!(!format!("{:?}", credential).contains("topsecret"));
    }
}
