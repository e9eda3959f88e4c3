//! JSON-RPC 2.0 server dispatcher — a single-endpoint axum router.
//!
//! - `POST /a2a` — JSON-RPC dispatch for all A2A methods
//! - `GET /.well-known/agent-card.json` — agent card discovery
//! - `GET /.well-known/agent.json` — pre-v0.3 discovery path
//!
//! Envelope validation is layered: a body that is not JSON at all answers
//! `-32700`, a JSON body that is not a valid JSON-RPC 2.0 request answers
//! `-32600`, an unknown method answers `-32601`, and params that do not
//! decode answer `-32602`. Streaming methods answer SSE where every `data:`
//! frame is a complete JSON-RPC envelope; a mid-stream failure is written
//! as an error envelope frame and ends the stream.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::stream::Stream;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::context::{
    format_extensions_header, CallMetadata, NoopUserBuilder, ServerCallContext, UserBuilder,
    EXTENSIONS_HEADER,
};
use crate::error::A2AError;
use crate::handler::{EventStream, Method, RequestHandler};
use crate::types::{AgentCard, JsonRpcId, JsonRpcResponse};

struct AppState {
    handler: Arc<dyn RequestHandler>,
    agent_card: AgentCard,
    user_builder: Arc<dyn UserBuilder>,
}

/// Create an axum `Router` serving the JSON-RPC binding.
///
/// Callers that want interceptors wrap the handler in an
/// [`InterceptedHandler`](crate::interceptor::InterceptedHandler) first.
pub fn jsonrpc_router(handler: Arc<dyn RequestHandler>, agent_card: AgentCard) -> Router {
    jsonrpc_router_with(handler, agent_card, Arc::new(NoopUserBuilder))
}

/// Create the JSON-RPC router with a custom caller-identity builder.
pub fn jsonrpc_router_with(
    handler: Arc<dyn RequestHandler>,
    agent_card: AgentCard,
    user_builder: Arc<dyn UserBuilder>,
) -> Router {
    let state = Arc::new(AppState {
        handler,
        agent_card,
        user_builder,
    });

    Router::new()
        .route("/.well-known/agent-card.json", get(handle_agent_card))
        .route("/.well-known/agent.json", get(handle_agent_card))
        .route("/a2a", post(handle_jsonrpc))
        .with_state(state)
}

async fn handle_agent_card(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(&state.agent_card).into_response()
}

/// Collect request headers into transport-neutral call metadata.
pub(crate) fn metadata_from_headers(headers: &HeaderMap) -> CallMetadata {
    let mut metadata = CallMetadata::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            metadata.insert(name.as_str(), value);
        }
    }
    metadata
}

/// Attach the activated-extensions header to an outgoing response.
pub(crate) fn apply_extensions_header(response: &mut Response, ctx: &ServerCallContext) {
    let activated = ctx.activated_extensions();
    if activated.is_empty() {
        return;
    }
    if let (Ok(name), Ok(value)) = (
        HeaderName::from_bytes(EXTENSIONS_HEADER.as_bytes()),
        HeaderValue::from_str(&format_extensions_header(&activated)),
    ) {
        response.headers_mut().insert(name, value);
    }
}

fn error_response(id: Option<JsonRpcId>, err: A2AError) -> Response {
    Json(JsonRpcResponse::from_a2a_error(id, err)).into_response()
}

fn success_response<R: Serialize>(
    id: Option<JsonRpcId>,
    result: &R,
    ctx: &ServerCallContext,
) -> Response {
    match serde_json::to_value(result) {
        Ok(value) => {
            let mut response = Json(JsonRpcResponse::success(id, value)).into_response();
            apply_extensions_header(&mut response, ctx);
            response
        }
        Err(e) => {
            error!(error = %e, "failed to serialize JSON-RPC result");
            error_response(id, A2AError::internal_error(format!("serialization failed: {e}")))
        }
    }
}

/// The validated parts of an incoming JSON-RPC request.
struct ValidRequest {
    id: Option<JsonRpcId>,
    method: String,
    params: Value,
}

/// Layered envelope validation: `Err` carries the ready-made error response.
fn validate_envelope(body: &str) -> Result<ValidRequest, Response> {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            return Err(error_response(
                None,
                A2AError::parse_error(format!("request body is not valid JSON: {e}")),
            ));
        }
    };

    let Some(obj) = value.as_object() else {
        return Err(error_response(
            None,
            A2AError::invalid_request("request must be a JSON object"),
        ));
    };

    // The id must be a primitive; recover it first so envelope errors can
    // still correlate, but reject structured ids outright.
    let id = match obj.get("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(JsonRpcId::String(s.clone())),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(n) => Some(JsonRpcId::Number(n)),
            None => {
                return Err(error_response(
                    None,
                    A2AError::invalid_request("request id must be an integer or string"),
                ));
            }
        },
        Some(_) => {
            return Err(error_response(
                None,
                A2AError::invalid_request("request id must be a primitive"),
            ));
        }
    };

    if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err(error_response(
            id,
            A2AError::invalid_request("jsonrpc version must be \"2.0\""),
        ));
    }

    let Some(method) = obj.get("method").and_then(Value::as_str) else {
        return Err(error_response(
            id,
            A2AError::invalid_request("request is missing the method member"),
        ));
    };

    Ok(ValidRequest {
        id,
        method: method.to_string(),
        params: obj.get("params").cloned().unwrap_or(Value::Null),
    })
}

fn parse_params<P: DeserializeOwned>(id: &Option<JsonRpcId>, params: Value) -> Result<P, Response> {
    serde_json::from_value(params).map_err(|e| {
        error_response(
            id.clone(),
            A2AError::invalid_params(format!("invalid params: {e}")),
        )
    })
}

async fn handle_jsonrpc(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let request = match validate_envelope(&body) {
        Ok(r) => r,
        Err(response) => return response,
    };

    let Some(method) = Method::from_json_rpc_name(&request.method) else {
        warn!(method = %request.method, "unknown JSON-RPC method");
        return error_response(
            request.id,
            A2AError::method_not_found(format!("method not found: {}", request.method)),
        );
    };

    debug!(method = %method, "JSON-RPC request received");

    let ctx = ServerCallContext::from_metadata(
        metadata_from_headers(&headers),
        state.user_builder.as_ref(),
    );
    let id = request.id;
    let params = request.params;

    match method {
        Method::SendMessage => {
            let params = match parse_params(&id, params) {
                Ok(p) => p,
                Err(r) => return r,
            };
            match state.handler.on_send_message(params, ctx.clone()).await {
                Ok(result) => success_response(id, &result, &ctx),
                Err(e) => error_response(id, e),
            }
        }
        Method::SendMessageStream => {
            let params = match parse_params(&id, params) {
                Ok(p) => p,
                Err(r) => return r,
            };
            match state
                .handler
                .on_send_message_stream(params, ctx.clone())
                .await
            {
                Ok(stream) => sse_response(id, stream, &ctx),
                Err(e) => error_response(id, e),
            }
        }
        Method::GetTask => {
            let params = match parse_params(&id, params) {
                Ok(p) => p,
                Err(r) => return r,
            };
            match state.handler.on_get_task(params, ctx.clone()).await {
                Ok(result) => success_response(id, &result, &ctx),
                Err(e) => error_response(id, e),
            }
        }
        Method::CancelTask => {
            let params = match parse_params(&id, params) {
                Ok(p) => p,
                Err(r) => return r,
            };
            match state.handler.on_cancel_task(params, ctx.clone()).await {
                Ok(result) => success_response(id, &result, &ctx),
                Err(e) => error_response(id, e),
            }
        }
        Method::Resubscribe => {
            let params = match parse_params(&id, params) {
                Ok(p) => p,
                Err(r) => return r,
            };
            match state.handler.on_resubscribe(params, ctx.clone()).await {
                Ok(stream) => sse_response(id, stream, &ctx),
                Err(e) => error_response(id, e),
            }
        }
        Method::SetPushConfig => {
            let params = match parse_params(&id, params) {
                Ok(p) => p,
                Err(r) => return r,
            };
            match state
                .handler
                .on_set_task_push_notification_config(params, ctx.clone())
                .await
            {
                Ok(result) => success_response(id, &result, &ctx),
                Err(e) => error_response(id, e),
            }
        }
        Method::GetPushConfig => {
            let params = match parse_params(&id, params) {
                Ok(p) => p,
                Err(r) => return r,
            };
            match state
                .handler
                .on_get_task_push_notification_config(params, ctx.clone())
                .await
            {
                Ok(result) => success_response(id, &result, &ctx),
                Err(e) => error_response(id, e),
            }
        }
        Method::ListPushConfigs => {
            let params = match parse_params(&id, params) {
                Ok(p) => p,
                Err(r) => return r,
            };
            match state
                .handler
                .on_list_task_push_notification_configs(params, ctx.clone())
                .await
            {
                Ok(configs) => {
                    let result = crate::types::ListTaskPushNotificationConfigResponse {
                        configs,
                        next_page_token: None,
                    };
                    success_response(id, &result, &ctx)
                }
                Err(e) => error_response(id, e),
            }
        }
        Method::DeletePushConfig => {
            let params = match parse_params(&id, params) {
                Ok(p) => p,
                Err(r) => return r,
            };
            match state
                .handler
                .on_delete_task_push_notification_config(params, ctx.clone())
                .await
            {
                Ok(()) => success_response(id, &Value::Null, &ctx),
                Err(e) => error_response(id, e),
            }
        }
        Method::ExtendedAgentCard => {
            match state.handler.on_get_extended_agent_card(ctx.clone()).await {
                Ok(result) => success_response(id, &result, &ctx),
                Err(e) => error_response(id, e),
            }
        }
    }
}

/// Answer a streaming method with SSE; each frame is a JSON-RPC envelope.
fn sse_response(id: Option<JsonRpcId>, stream: EventStream, ctx: &ServerCallContext) -> Response {
    let mut response = Sse::new(envelope_stream(id, stream))
        .keep_alive(KeepAlive::default())
        .into_response();
    apply_extensions_header(&mut response, ctx);
    response
}

fn envelope_stream(
    id: Option<JsonRpcId>,
    mut upstream: EventStream,
) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        use futures::StreamExt;
        while let Some(item) = upstream.next().await {
            // An error envelope is the last frame; already-sent items stand.
            let (envelope, terminal) = match item {
                Ok(event) => match serde_json::to_value(&event) {
                    Ok(value) => (JsonRpcResponse::success(id.clone(), value), false),
                    Err(e) => {
                        error!(error = %e, "failed to serialize stream event");
                        let err = A2AError::internal_error(format!("serialization failed: {e}"));
                        (JsonRpcResponse::from_a2a_error(id.clone(), err), true)
                    }
                },
                Err(e) => (JsonRpcResponse::from_a2a_error(id.clone(), e), true),
            };
            match serde_json::to_string(&envelope) {
                Ok(json) => yield Ok(Event::default().data(json)),
                Err(e) => {
                    error!(error = %e, "failed to serialize SSE envelope");
                    break;
                }
            }
            if terminal {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_rejects_non_json() {
        assert!(validate_envelope("{nope").is_err());
    }

    #[test]
    fn envelope_rejects_wrong_version() {
        let body = r#"{"jsonrpc":"1.0","id":1,"method":"tasks/get","params":{}}"#;
        assert!(validate_envelope(body).is_err());
    }

    #[test]
    fn envelope_rejects_structured_id() {
        let body = r#"{"jsonrpc":"2.0","id":{"a":1},"method":"tasks/get","params":{}}"#;
        assert!(validate_envelope(body).is_err());
    }

    #[test]
    fn envelope_accepts_valid_request() {
        let body = r#"{"jsonrpc":"2.0","id":"7","method":"tasks/get","params":{"id":"t1"}}"#;
        let request = validate_envelope(body).ok().unwrap();
        assert_eq!(request.method, "tasks/get");
        assert!(matches!(request.id, Some(JsonRpcId::String(_))));
    }

    #[test]
    fn metadata_keys_are_lowercased() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Custom-Header", HeaderValue::from_static("v"));
        let metadata = metadata_from_headers(&headers);
        assert_eq!(metadata.get("x-custom-header"), Some("v"));
    }
}
