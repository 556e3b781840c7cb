//! Gateway-native authorizer wire types
//!
//! An API gateway calls the authorizer with the raw `Authorization` header and
//! the ARN of the invoked method, and expects a policy document back. A deny is
//! signalled by an error, not by a `Deny` statement.

use serde::{Deserialize, Serialize};

use super::AuthorizationDecision;

/// Action granted to an authenticated caller
pub const EXECUTE_API_INVOKE: &str = "execute-api:Invoke";

/// Policy language version
pub const POLICY_VERSION: &str = "2012-10-17";

/// Token authorizer request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    /// Authorizer type (`TOKEN`)
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Raw `Authorization` header value
    #[serde(default)]
    pub authorization_token: Option<String>,

    /// ARN of the method being invoked
    pub method_arn: String,
}

/// Token authorizer response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub action: Vec<String>,
    pub effect: String,
    pub resource: Vec<String>,
}

impl From<&AuthorizationDecision> for AuthorizerResponse {
    fn from(decision: &AuthorizationDecision) -> Self {
        Self {
            principal_id: decision.principal.clone(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![PolicyStatement {
                    action: vec![decision.allowed_action.clone()],
                    effect: "Allow".to_string(),
                    resource: vec![decision.allowed_resource.clone()],
                }],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_from_gateway_json() {
        let json = serde_json::json!({
            "type": "TOKEN",
            "authorizationToken": "Basic YWxpY2U6czNjcmV0",
            "methodArn": "arn:aws:execute-api:eu-west-1:123:abc/prod/PUT/example.com/home"
        });
        let request: AuthorizerRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.kind.as_deref(), Some("TOKEN"));
        assert_eq!(
            request.authorization_token.as_deref(),
            Some("Basic YWxpY2U6czNjcmV0")
        );
        assert!(request.method_arn.ends_with("/PUT/example.com/home"));
    }

    #[test]
    fn test_response_shape() {
        let decision = AuthorizationDecision {
            principal: "alice".to_string(),
            allowed_action: EXECUTE_API_INVOKE.to_string(),
            allowed_resource: "arn:method".to_string(),
        };
        let value = serde_json::to_value(AuthorizerResponse::from(&decision)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "principalId": "alice",
                "policyDocument": {
                    "Version": "2012-10-17",
                    "Statement": [{
                        "Action": ["execute-api:Invoke"],
                        "Effect": "Allow",
                        "Resource": ["arn:method"]
                    }]
                }
            })
        );
    }
}
