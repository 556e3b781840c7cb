//! Response encoding
//!
//! Maps every pipeline outcome to a status code and a non-empty body with a
//! stable JSON shape:
//!
//! | outcome | status | body |
//! |---------|--------|------|
//! | success | 200 | `{"Domain","ZoneID","Record","RecordType","NewValue"}` |
//! | validation failure, zone not found | 400 | `{"ErrorMessage"}` |
//! | auth failure | 401 | `{"ErrorMessage"}` |
//! | upstream failure | 500 | `{"ErrorMessage"}` |
//! | success that could not be serialized | 206 | `{"ErrorMessage"}` |
//!
//! Messages are fixed per category and never echo request input. If even the
//! error envelope cannot be serialized, the message goes out as plain text.

use http::StatusCode;
use serde::Serialize;
use tracing::warn;

use crate::error::{Error, ErrorKind, Result};
use crate::mutator::UpdateSummary;
use crate::validate::{PARAM_DOMAIN, PARAM_RECORD};

pub const MISSING_PARAMS_MSG: &str = "missing query parameters";
pub const INVALID_PARAMS_MSG: &str = "invalid query parameters provided";
pub const INVALID_DOMAIN_MSG: &str = "domain provided is not valid";
pub const SERVER_ERROR_MSG: &str = "error processing request";
pub const UNAUTHORIZED_MSG: &str = "Unauthorized";
pub const PARTIAL_SUCCESS_MSG: &str = "update succeeded, error marshaling response";

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Encoded wire response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpReply {
    fn json(status: StatusCode, body: String) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_JSON,
            body,
        }
    }
}

/// Success body
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateBody<'a> {
    pub domain: &'a str,
    #[serde(rename = "ZoneID")]
    pub zone_id: &'a str,
    pub record: &'a str,
    pub record_type: &'a str,
    pub new_value: &'a str,
}

impl<'a> From<&'a UpdateSummary> for UpdateBody<'a> {
    fn from(summary: &'a UpdateSummary) -> Self {
        Self {
            domain: &summary.domain,
            zone_id: &summary.zone_id,
            record: &summary.record,
            record_type: summary.record_type.as_str(),
            new_value: &summary.value,
        }
    }
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope<'a> {
    #[serde(rename = "ErrorMessage")]
    pub error_message: &'a str,
}

/// Encode a pipeline outcome
pub fn encode(outcome: &Result<UpdateSummary>) -> HttpReply {
    match outcome {
        Ok(summary) => encode_success(&UpdateBody::from(summary)),
        Err(err) => encode_error(err),
    }
}

/// Encode a success body
///
/// A serialization failure here means the change was most likely accepted
/// but cannot be reported, which is answered with 206.
pub fn encode_success<T: Serialize>(body: &T) -> HttpReply {
    match serde_json::to_string(body) {
        Ok(json) => HttpReply::json(StatusCode::OK, json),
        Err(e) => {
            warn!("Update succeeded but response could not be encoded: {}", e);
            encode_error(&Error::from(e))
        }
    }
}

/// Encode an error
pub fn encode_error(err: &Error) -> HttpReply {
    let message = client_message(err);
    let envelope = ErrorEnvelope {
        error_message: message,
    };
    render_error(status_for(err.kind()), &envelope, message)
}

/// HTTP status for an error category
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::AuthFailure => StatusCode::UNAUTHORIZED,
        ErrorKind::MissingParameter
        | ErrorKind::UnsupportedRecordType
        | ErrorKind::InvalidValue
        | ErrorKind::ZoneNotFound => StatusCode::BAD_REQUEST,
        ErrorKind::EncodingFailure => StatusCode::PARTIAL_CONTENT,
        ErrorKind::UpstreamFailure | ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Fixed, non-leaky message for an error
pub fn client_message(err: &Error) -> &'static str {
    match err {
        Error::Auth(_) => UNAUTHORIZED_MSG,
        Error::MissingParameter(_) => MISSING_PARAMS_MSG,
        Error::UnsupportedRecordType(_) => INVALID_PARAMS_MSG,
        Error::InvalidValue { parameter }
            if parameter == PARAM_DOMAIN || parameter == PARAM_RECORD =>
        {
            INVALID_DOMAIN_MSG
        }
        Error::InvalidValue { .. } => INVALID_PARAMS_MSG,
        Error::ZoneNotFound(_) => INVALID_DOMAIN_MSG,
        Error::Encoding(_) => PARTIAL_SUCCESS_MSG,
        Error::Upstream { .. } | Error::Config(_) => SERVER_ERROR_MSG,
    }
}

fn render_error<T: Serialize>(status: StatusCode, envelope: &T, fallback: &'static str) -> HttpReply {
    match serde_json::to_string(envelope) {
        Ok(json) => HttpReply::json(status, json),
        Err(e) => {
            warn!("Could not encode error envelope: {}", e);
            HttpReply {
                status,
                content_type: CONTENT_TYPE_TEXT,
                body: fallback.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthFailure;
    use crate::traits::RecordType;

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    fn summary() -> UpdateSummary {
        UpdateSummary {
            domain: "example.com".to_string(),
            zone_id: "/hostedzone/Z1".to_string(),
            record: "home".to_string(),
            record_type: RecordType::A,
            value: "203.0.113.5".to_string(),
            fqdn: "home.example.com.".to_string(),
            change_id: "C1".to_string(),
        }
    }

    fn body_json(reply: &HttpReply) -> serde_json::Value {
        serde_json::from_str(&reply.body).unwrap()
    }

    #[test]
    fn test_success_shape() {
        let reply = encode(&Ok(summary()));
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content_type, CONTENT_TYPE_JSON);
        assert_eq!(
            body_json(&reply),
            serde_json::json!({
                "Domain": "example.com",
                "ZoneID": "/hostedzone/Z1",
                "Record": "home",
                "RecordType": "A",
                "NewValue": "203.0.113.5"
            })
        );
    }

    #[test]
    fn test_validation_failures_are_400() {
        let cases = [
            (Error::missing(["type"]), MISSING_PARAMS_MSG),
            (Error::UnsupportedRecordType("MX".into()), INVALID_PARAMS_MSG),
            (Error::invalid_value("value"), INVALID_PARAMS_MSG),
            (Error::invalid_value("domain"), INVALID_DOMAIN_MSG),
            (Error::zone_not_found("nope.com."), INVALID_DOMAIN_MSG),
        ];
        for (err, msg) in cases {
            let reply = encode_error(&err);
            assert_eq!(reply.status, StatusCode::BAD_REQUEST);
            assert_eq!(body_json(&reply)["ErrorMessage"], msg);
        }
    }

    #[test]
    fn test_message_does_not_echo_input() {
        let reply = encode_error(&Error::UnsupportedRecordType("<script>".into()));
        assert!(!reply.body.contains("<script>"));
    }

    #[test]
    fn test_upstream_is_500() {
        let reply = encode_error(&Error::upstream_msg("route53 down"));
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&reply)["ErrorMessage"], SERVER_ERROR_MSG);
        assert!(!reply.body.contains("route53"));
    }

    #[test]
    fn test_auth_is_401() {
        let reply = encode_error(&Error::Auth(AuthFailure::InvalidCredentials));
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(&reply)["ErrorMessage"], UNAUTHORIZED_MSG);
    }

    #[test]
    fn test_unencodable_success_is_206() {
        let reply = encode_success(&Unencodable);
        assert_eq!(reply.status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(body_json(&reply)["ErrorMessage"], PARTIAL_SUCCESS_MSG);
    }

    #[test]
    fn test_unencodable_error_falls_back_to_text() {
        let reply = render_error(StatusCode::INTERNAL_SERVER_ERROR, &Unencodable, SERVER_ERROR_MSG);
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.content_type, CONTENT_TYPE_TEXT);
        assert_eq!(reply.body, SERVER_ERROR_MSG);
    }

    #[test]
    fn test_every_outcome_has_body() {
        let errors = [
            Error::Auth(AuthFailure::MissingCredentials),
            Error::missing(["value"]),
            Error::Encoding("x".into()),
            Error::config("x"),
        ];
        for err in errors {
            assert!(!encode_error(&err).body.is_empty());
        }
    }
}
