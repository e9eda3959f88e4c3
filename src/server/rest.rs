//! REST/JSON server dispatcher — resource-routed axum endpoints.
//!
//! - `POST /v1/message:send`, `POST /v1/message:stream`
//! - `GET /v1/tasks/{id}` (`?historyLength=N`)
//! - `POST /v1/tasks/{id}:cancel`, `POST /v1/tasks/{id}:subscribe`
//! - `GET|POST /v1/tasks/{id}/pushNotificationConfigs` (`?pageSize&pageToken`)
//! - `GET|DELETE /v1/tasks/{id}/pushNotificationConfigs/{configId}`
//! - `GET /v1/card`
//!
//! Failures carry the canonical error envelope `{code, message, data}` under
//! the mapped HTTP status. Streaming routes answer SSE with one domain event
//! per `data:` frame; mid-stream failures are written as an `event: error`
//! frame carrying the envelope, then the stream ends.
//!
//! Custom-verb routes (`:cancel`, `:subscribe`) share one path parameter
//! with the verb attached, because a route parameter must span a whole
//! path segment; the handler splits on `:`.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::stream::Stream;
use serde::Deserialize;
use tracing::{debug, error};

use crate::codec::rest::{error_body, http_status, validate_pagination};
use crate::context::{NoopUserBuilder, ServerCallContext, UserBuilder};
use crate::error::A2AError;
use crate::handler::{EventStream, RequestHandler};
use crate::types::{
    AgentCard, CancelTaskParams, DeleteTaskPushNotificationConfigParams, GetTaskParams,
    GetTaskPushNotificationConfigParams, ListTaskPushNotificationConfigParams,
    PushNotificationConfig, SendMessageParams, SetTaskPushNotificationConfigParams, TaskIdParams,
};

use super::jsonrpc::{apply_extensions_header, metadata_from_headers};

struct AppState {
    handler: Arc<dyn RequestHandler>,
    agent_card: AgentCard,
    user_builder: Arc<dyn UserBuilder>,
}

/// Create an axum `Router` serving the REST binding.
pub fn rest_router(handler: Arc<dyn RequestHandler>, agent_card: AgentCard) -> Router {
    rest_router_with(handler, agent_card, Arc::new(NoopUserBuilder))
}

/// Create the REST router with a custom caller-identity builder.
pub fn rest_router_with(
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
        .route("/v1/message:send", post(handle_message_send))
        .route("/v1/message:stream", post(handle_message_stream))
        .route("/v1/tasks/{id}", get(handle_get_task).post(handle_task_verb))
        .route(
            "/v1/tasks/{id}/pushNotificationConfigs",
            get(handle_list_push_configs).post(handle_set_push_config),
        )
        .route(
            "/v1/tasks/{id}/pushNotificationConfigs/{config_id}",
            get(handle_get_push_config).delete(handle_delete_push_config),
        )
        .route("/v1/card", get(handle_extended_card))
        .route("/.well-known/agent-card.json", get(handle_agent_card))
        .with_state(state)
}

async fn handle_agent_card(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(&state.agent_card).into_response()
}

fn context(state: &AppState, headers: &HeaderMap) -> Arc<ServerCallContext> {
    ServerCallContext::from_metadata(
        metadata_from_headers(headers),
        state.user_builder.as_ref(),
    )
}

fn error_response(err: &A2AError) -> Response {
    let status =
        StatusCode::from_u16(http_status(err)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(error_body(err))).into_response()
}

fn json_response<R: serde::Serialize>(result: &R, ctx: &ServerCallContext) -> Response {
    match serde_json::to_value(result) {
        Ok(value) => {
            let mut response = Json(value).into_response();
            apply_extensions_header(&mut response, ctx);
            response
        }
        Err(e) => {
            error!(error = %e, "failed to serialize REST response");
            error_response(&A2AError::internal_error(format!(
                "serialization failed: {e}"
            )))
        }
    }
}

fn parse_body<P: serde::de::DeserializeOwned>(body: &str) -> Result<P, Response> {
    serde_json::from_str(body).map_err(|e| {
        error_response(&A2AError::invalid_params(format!("invalid request body: {e}")))
    })
}

async fn handle_message_send(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let params: SendMessageParams = match parse_body(&body) {
        Ok(p) => p,
        Err(r) => return r,
    };
    debug!("REST message:send");
    let ctx = context(&state, &headers);
    match state.handler.on_send_message(params, ctx.clone()).await {
        Ok(result) => json_response(&result, &ctx),
        Err(e) => error_response(&e),
    }
}

async fn handle_message_stream(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let params: SendMessageParams = match parse_body(&body) {
        Ok(p) => p,
        Err(r) => return r,
    };
    debug!("REST message:stream");
    let ctx = context(&state, &headers);
    match state
        .handler
        .on_send_message_stream(params, ctx.clone())
        .await
    {
        Ok(stream) => sse_response(stream, &ctx),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
struct GetTaskQuery {
    #[serde(rename = "historyLength")]
    history_length: Option<i32>,
}

async fn handle_get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<GetTaskQuery>,
    headers: HeaderMap,
) -> Response {
    let ctx = context(&state, &headers);
    let params = GetTaskParams {
        id,
        history_length: query.history_length,
        metadata: None,
    };
    match state.handler.on_get_task(params, ctx.clone()).await {
        Ok(task) => json_response(&task, &ctx),
        Err(e) => error_response(&e),
    }
}

/// `POST /v1/tasks/{id}:cancel` and `POST /v1/tasks/{id}:subscribe`; the
/// verb rides in the same path segment as the task id.
async fn handle_task_verb(
    State(state): State<Arc<AppState>>,
    Path(target): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some((id, verb)) = target.split_once(':') else {
        return error_response(&A2AError::method_not_found(format!(
            "no verb in '{target}'; POST supports ':cancel' and ':subscribe'"
        )));
    };
    if id.is_empty() {
        return error_response(&A2AError::invalid_params("task id must not be empty"));
    }
    let ctx = context(&state, &headers);
    match verb {
        "cancel" => {
            let params = CancelTaskParams {
                id: id.to_string(),
                metadata: None,
            };
            match state.handler.on_cancel_task(params, ctx.clone()).await {
                Ok(task) => json_response(&task, &ctx),
                Err(e) => error_response(&e),
            }
        }
        "subscribe" => {
            let params = TaskIdParams {
                id: id.to_string(),
                metadata: None,
            };
            match state.handler.on_resubscribe(params, ctx.clone()).await {
                Ok(stream) => sse_response(stream, &ctx),
                Err(e) => error_response(&e),
            }
        }
        other => error_response(&A2AError::method_not_found(format!(
            "unknown task verb ':{other}'"
        ))),
    }
}

async fn handle_set_push_config(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let config: PushNotificationConfig = match parse_body(&body) {
        Ok(c) => c,
        Err(r) => return r,
    };
    let ctx = context(&state, &headers);
    let params = SetTaskPushNotificationConfigParams {
        task_id: id,
        push_notification_config: config,
    };
    match state
        .handler
        .on_set_task_push_notification_config(params, ctx.clone())
        .await
    {
        Ok(result) => json_response(&result, &ctx),
        Err(e) => error_response(&e),
    }
}

async fn handle_get_push_config(
    State(state): State<Arc<AppState>>,
    Path((id, config_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let ctx = context(&state, &headers);
    let params = GetTaskPushNotificationConfigParams {
        id,
        push_notification_config_id: config_id,
        metadata: None,
    };
    match state
        .handler
        .on_get_task_push_notification_config(params, ctx.clone())
        .await
    {
        Ok(result) => json_response(&result, &ctx),
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(rename = "pageSize")]
    page_size: Option<i32>,
    #[serde(rename = "pageToken")]
    page_token: Option<String>,
}

async fn handle_list_push_configs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> Response {
    if let Err(e) = validate_pagination(query.page_size, query.page_token.as_deref()) {
        return error_response(&e);
    }
    let ctx = context(&state, &headers);
    let params = ListTaskPushNotificationConfigParams {
        id,
        page_size: query.page_size,
        page_token: query.page_token,
        metadata: None,
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
            json_response(&result, &ctx)
        }
        Err(e) => error_response(&e),
    }
}

async fn handle_delete_push_config(
    State(state): State<Arc<AppState>>,
    Path((id, config_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let ctx = context(&state, &headers);
    let params = DeleteTaskPushNotificationConfigParams {
        id,
        push_notification_config_id: config_id,
        metadata: None,
    };
    match state
        .handler
        .on_delete_task_push_notification_config(params, ctx.clone())
        .await
    {
        Ok(()) => {
            let mut response = StatusCode::NO_CONTENT.into_response();
            apply_extensions_header(&mut response, &ctx);
            response
        }
        Err(e) => error_response(&e),
    }
}

async fn handle_extended_card(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let ctx = context(&state, &headers);
    match state.handler.on_get_extended_agent_card(ctx.clone()).await {
        Ok(card) => json_response(&card, &ctx),
        Err(e) => error_response(&e),
    }
}

/// Answer a streaming route with SSE; each frame carries one domain event.
fn sse_response(stream: EventStream, ctx: &ServerCallContext) -> Response {
    let mut response = Sse::new(event_stream(stream))
        .keep_alive(KeepAlive::default())
        .into_response();
    apply_extensions_header(&mut response, ctx);
    response
}

fn event_stream(mut upstream: EventStream) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        use futures::StreamExt;
        while let Some(item) = upstream.next().await {
            match item {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => yield Ok(Event::default().data(json)),
                    Err(e) => {
                        error!(error = %e, "failed to serialize stream event");
                        let err = A2AError::internal_error(format!("serialization failed: {e}"));
                        if let Ok(json) = serde_json::to_string(&error_body(&err)) {
                            yield Ok(Event::default().event("error").data(json));
                        }
                        break;
                    }
                },
                Err(e) => {
                    // Already-sent items stand; the envelope ends the stream.
                    if let Ok(json) = serde_json::to_string(&error_body(&e)) {
                        yield Ok(Event::default().event("error").data(json));
                    }
                    break;
                }
            }
        }
    }
}
