//! Error types for the DDNS update gateway
//!
//! Every failure a request can hit is one variant of [`Error`]. Callers branch
//! on [`Error::kind`], never on the rendered message.

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed upstream cause
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Reasons a presented credential is rejected
///
/// The `Display` output never contains any part of the presented header,
/// identity or secret.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No authorization header was presented
    #[error("missing credentials")]
    MissingCredentials,

    /// Header is not `<scheme> <payload>` or the scheme is not `basic`
    #[error("malformed authorization header")]
    MalformedHeader,

    /// Payload is not standard base64 (or not UTF-8 once decoded)
    #[error("malformed credential encoding")]
    MalformedEncoding,

    /// Decoded payload has no `:` separator
    #[error("malformed credential payload")]
    MalformedPayload,

    /// Identity or secret does not match the reference credential
    #[error("invalid credentials")]
    InvalidCredentials,
}

impl AuthFailure {
    /// Whether the credential could not even be parsed
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            AuthFailure::MalformedHeader
                | AuthFailure::MalformedEncoding
                | AuthFailure::MalformedPayload
        )
    }
}

/// Core error type for the gateway
#[derive(Error, Debug)]
pub enum Error {
    /// Credential rejected
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthFailure),

    /// One or more required parameters are absent
    #[error("Missing parameters: {}", .0.join(", "))]
    MissingParameter(Vec<String>),

    /// Record type outside the supported set
    #[error("Unsupported record type: {0}")]
    UnsupportedRecordType(String),

    /// Parameter present but syntactically invalid
    #[error("Invalid value for parameter '{parameter}'")]
    InvalidValue {
        /// Name of the offending parameter
        parameter: String,
    },

    /// No hosted zone matches the requested domain
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// The zone store (or the path to it) failed
    #[error("Upstream failure: {context}")]
    Upstream {
        /// What the gateway was doing
        context: String,
        /// Underlying cause, if any
        #[source]
        source: Option<BoxError>,
    },

    /// Response could not be serialized
    #[error("Encoding failure: {0}")]
    Encoding(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Machine-checkable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AuthFailure,
    MissingParameter,
    UnsupportedRecordType,
    InvalidValue,
    ZoneNotFound,
    UpstreamFailure,
    EncodingFailure,
    Config,
}

impl ErrorKind {
    /// Validation failures: missing parameter, unsupported type, invalid value
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ErrorKind::MissingParameter | ErrorKind::UnsupportedRecordType | ErrorKind::InvalidValue
        )
    }

    /// Failures attributable to the caller (answered with 4xx)
    pub fn is_client_error(&self) -> bool {
        self.is_validation() || matches!(self, ErrorKind::AuthFailure | ErrorKind::ZoneNotFound)
    }
}

impl Error {
    /// Get the category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Auth(_) => ErrorKind::AuthFailure,
            Error::MissingParameter(_) => ErrorKind::MissingParameter,
            Error::UnsupportedRecordType(_) => ErrorKind::UnsupportedRecordType,
            Error::InvalidValue { .. } => ErrorKind::InvalidValue,
            Error::ZoneNotFound(_) => ErrorKind::ZoneNotFound,
            Error::Upstream { .. } => ErrorKind::UpstreamFailure,
            Error::Encoding(_) => ErrorKind::EncodingFailure,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Create a missing parameter error
    pub fn missing<I, S>(parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingParameter(parameters.into_iter().map(Into::into).collect())
    }

    /// Create an invalid value error
    pub fn invalid_value(parameter: impl Into<String>) -> Self {
        Self::InvalidValue {
            parameter: parameter.into(),
        }
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(zone: impl Into<String>) -> Self {
        Self::ZoneNotFound(zone.into())
    }

    /// Create an upstream error wrapping its cause
    pub fn upstream<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Upstream {
            context: context.into(),
            source: Some(source.into()),
        }
    }

    /// Create an upstream error with no underlying cause
    pub fn upstream_msg(context: impl Into<String>) -> Self {
        Self::Upstream {
            context: context.into(),
            source: None,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Re-label any non-upstream error as an upstream failure
    ///
    /// Zone clients are expected to return `Upstream` already; anything else
    /// coming out of a client is still the upstream's fault.
    pub(crate) fn into_upstream(self, context: &str) -> Self {
        match self {
            Error::Upstream { .. } => self,
            other => Error::upstream(context.to_string(), other),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert!(Error::missing(["type"]).kind().is_validation());
        assert!(Error::UnsupportedRecordType("MX".into()).kind().is_validation());
        assert!(Error::invalid_value("value").kind().is_client_error());
        assert!(Error::zone_not_found("example.com.").kind().is_client_error());
        assert!(Error::from(AuthFailure::InvalidCredentials).kind().is_client_error());
        assert!(!Error::upstream_msg("boom").kind().is_client_error());
        assert!(!Error::Encoding("bad".into()).kind().is_client_error());
    }

    #[test]
    fn test_missing_parameter_lists_all() {
        let err = Error::missing(["type", "value"]);
        assert_eq!(err.to_string(), "Missing parameters: type, value");
    }

    #[test]
    fn test_upstream_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = Error::upstream("listing zones", io);
        let source = std::error::Error::source(&err).expect("source kept");
        assert_eq!(source.to_string(), "reset");
    }

    #[test]
    fn test_into_upstream_preserves_upstream() {
        let err = Error::upstream_msg("already upstream").into_upstream("ctx");
        assert_eq!(err.to_string(), "Upstream failure: already upstream");

        let err = Error::config("odd").into_upstream("listing zones");
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
    }

    #[test]
    fn test_auth_failure_categories() {
        assert!(AuthFailure::MalformedEncoding.is_malformed());
        assert!(AuthFailure::MalformedPayload.is_malformed());
        assert!(AuthFailure::MalformedHeader.is_malformed());
        assert!(!AuthFailure::InvalidCredentials.is_malformed());
        assert!(!AuthFailure::MissingCredentials.is_malformed());
    }
}
