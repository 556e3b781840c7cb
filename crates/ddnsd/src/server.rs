//! HTTP surface of the daemon
//!
//! Routes:
//! - `PUT|POST /{domain}/{record}?type=A&value=<ip>`: inline-authenticated update
//! - `POST /authorize`: gateway authorizer (policy document or 401)
//! - `GET /health`: liveness
//!
//! Handlers only translate between HTTP and [`UpdatePipeline`]; every
//! decision is made by the core.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use ddns_core::auth::AuthorizerRequest;
use ddns_core::response::{self, UNAUTHORIZED_MSG};
use ddns_core::validate::{PARAM_DOMAIN, PARAM_RECORD, PARAM_VALUE};
use ddns_core::{Error, HttpReply, UpdateInvocation, UpdatePipeline};
use serde_json::json;
use tracing::warn;

const WWW_AUTHENTICATE_BASIC: &str = "Basic realm=\"ddns\"";

/// Build the router
pub fn router(pipeline: Arc<UpdatePipeline>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/authorize", post(authorize))
        .route("/{domain}/{record}", put(update).post(update))
        .with_state(pipeline)
}

/// Pipeline reply rendered as an HTTP response
struct Reply(HttpReply);

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let Reply(reply) = self;
        let mut response = (
            reply.status,
            [(header::CONTENT_TYPE, reply.content_type)],
            reply.body,
        )
            .into_response();

        if reply.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(WWW_AUTHENTICATE_BASIC),
            );
        }
        response
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn update(
    State(pipeline): State<Arc<UpdatePipeline>>,
    method: Method,
    uri: Uri,
    path: Result<Path<(String, String)>, PathRejection>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    headers: HeaderMap,
) -> Reply {
    // A non-UTF-8 header is presented as-is and rejected as malformed
    let authorization = headers
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default().to_string());

    let (Path((domain, record)), Query(mut params)) = match (path, query) {
        (Ok(path), Ok(query)) => (path, query),
        (path, _) => {
            let undecodable = if path.is_err() { PARAM_DOMAIN } else { PARAM_VALUE };
            let invocation = UpdateInvocation {
                authorization,
                resource: format!("{} {}", method, uri.path()),
                params: HashMap::new(),
            };
            return Reply(reject_undecodable(&pipeline, &invocation, undecodable));
        }
    };

    let resource = format!("{} /{}/{}", method, domain, record);
    // Path segments win over same-named query parameters
    params.insert(PARAM_DOMAIN.to_string(), domain);
    params.insert(PARAM_RECORD.to_string(), record);

    let invocation = UpdateInvocation {
        authorization,
        resource,
        params,
    };

    Reply(pipeline.handle(&invocation).await)
}

/// Answer a request whose path or query could not be decoded
///
/// Credentials are still checked first, so an unauthenticated caller gets 401
/// whatever the shape of the URL.
fn reject_undecodable(
    pipeline: &UpdatePipeline,
    invocation: &UpdateInvocation,
    parameter: &str,
) -> HttpReply {
    let err = match pipeline.authenticate(invocation) {
        Ok(_) => Error::invalid_value(parameter),
        Err(failure) => Error::Auth(failure),
    };
    warn!("{} - undecodable request: {}", invocation.resource, err);
    response::encode_error(&err)
}

async fn authorize(
    State(pipeline): State<Arc<UpdatePipeline>>,
    Json(request): Json<AuthorizerRequest>,
) -> Response {
    match pipeline.authorize(&request) {
        Ok(policy) => Json(policy).into_response(),
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, WWW_AUTHENTICATE_BASIC)],
            Json(json!({ "message": UNAUTHORIZED_MSG })),
        )
            .into_response(),
    }
}
