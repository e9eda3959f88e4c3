//! JSON-RPC over HTTP client adapter.
//!
//! Sends POST requests with `Content-Type: application/json` to a single
//! A2A endpoint and parses the response as a JSON-RPC result or error.
//! Streaming methods interpret the response body as SSE, one JSON-RPC
//! envelope per `data:` frame.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::context::{format_extensions_header, parse_extensions_header, EXTENSIONS_HEADER};
use crate::error::{A2AError, A2AResult};
use crate::handler::{EventStream, Method};
use crate::types::{
    AgentCard, CancelTaskParams, DeleteTaskPushNotificationConfigParams, GetTaskParams,
    GetTaskPushNotificationConfigParams, JsonRpcRequest, JsonRpcResponse,
    ListTaskPushNotificationConfigParams, ListTaskPushNotificationConfigResponse,
    SendMessageParams, SendMessageResponse, SetTaskPushNotificationConfigParams, Task,
    TaskIdParams, TaskPushNotificationConfig,
};

use super::sse::{SseFormat, SseStream};
use super::transport::{
    cancellable_stream, with_cancellation, ClientResponse, ClientTransport, RequestOptions,
    TransportConfig,
};

/// JSON-RPC over HTTP client using `reqwest`.
///
/// # Example
///
/// ```no_run
/// use a2a_bridge::client::JsonRpcClient;
///
/// let client = JsonRpcClient::new("http://localhost:7420/a2a");
/// ```
#[derive(Debug, Clone)]
pub struct JsonRpcClient {
    client: reqwest::Client,
    url: String,
    // Applied per request; None when the caller brought their own client.
    timeout: Option<Duration>,
}

impl JsonRpcClient {
    /// Create a new client targeting the given A2A endpoint URL.
    ///
    /// Uses default configuration (60s timeout, no extra headers).
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout: Some(TransportConfig::default().timeout),
        }
    }

    /// Create a new client with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`A2AError::Transport`] when a configured header has an
    /// invalid name or value, or the underlying HTTP client cannot be
    /// built.
    pub fn with_config(url: impl Into<String>, config: TransportConfig) -> A2AResult<Self> {
        let mut default_headers = HeaderMap::new();
        for (key, value) in &config.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| A2AError::Transport(format!("invalid header name {key:?}: {e}")))?;
            let val = HeaderValue::from_str(value).map_err(|e| {
                A2AError::Transport(format!("invalid value for header {key:?}: {e}"))
            })?;
            default_headers.insert(name, val);
        }

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(|e| A2AError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout: Some(config.timeout),
        })
    }

    /// Create a client with an existing `reqwest::Client`.
    ///
    /// Useful when you want to share a connection pool or configure TLS
    /// settings externally. No per-request timeout is imposed on top of
    /// the client's own configuration.
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
            timeout: None,
        }
    }

    /// Returns the URL this client sends requests to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Change the request timeout (builder-style). Headers installed via
    /// [`with_config`](Self::with_config) are kept.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn build_request(
        &self,
        method: Method,
        params: Option<serde_json::Value>,
        options: &RequestOptions,
    ) -> reqwest::RequestBuilder {
        let envelope = JsonRpcRequest::new(Uuid::new_v4().to_string(), method.json_rpc_name(), params);

        let mut builder = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&envelope);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        for (key, value) in &options.service_parameters {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if !options.extensions.is_empty() {
            builder = builder.header(
                EXTENSIONS_HEADER,
                format_extensions_header(&options.extensions),
            );
        }
        builder
    }

    async fn dispatch(
        &self,
        method: Method,
        params: Option<serde_json::Value>,
        options: &RequestOptions,
    ) -> A2AResult<reqwest::Response> {
        let response = self
            .build_request(method, params, options)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(A2AError::Http {
                status: status.as_u16(),
                body: body_text,
            });
        }
        Ok(response)
    }

    /// Issue a unary JSON-RPC call and decode the result.
    async fn call<R: DeserializeOwned>(
        &self,
        method: Method,
        params: Option<serde_json::Value>,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<R>> {
        with_cancellation(options, async {
            let response = self.dispatch(method, params, options).await?;
            let activated_extensions = activated_extensions(response.headers());

            let bytes = response
                .bytes()
                .await
                .map_err(|e| A2AError::Transport(format!("failed to read response body: {e}")))?;

            let envelope: JsonRpcResponse = serde_json::from_slice(&bytes).map_err(|e| {
                A2AError::InvalidJson(format!("failed to parse JSON-RPC response: {e}"))
            })?;

            if let Some(error) = envelope.error {
                return Err(error.into());
            }
            // A null result (e.g. from delete) round-trips as an absent field.
            let result = envelope.result.unwrap_or(serde_json::Value::Null);
            let value = serde_json::from_value(result).map_err(|e| {
                A2AError::InvalidJson(format!("failed to decode JSON-RPC result: {e}"))
            })?;

            Ok(ClientResponse {
                value,
                activated_extensions,
            })
        })
        .await
    }

    /// Issue a streaming JSON-RPC call over SSE.
    async fn call_stream(
        &self,
        method: Method,
        params: Option<serde_json::Value>,
        options: &RequestOptions,
    ) -> A2AResult<EventStream> {
        let response = with_cancellation(options, async {
            let builder = self
                .build_request(method, params, options)
                .header("Accept", "text/event-stream");
            let response = builder.send().await.map_err(map_reqwest_error)?;

            let status = response.status();
            if !status.is_success() {
                let body_text = response.text().await.unwrap_or_default();
                return Err(A2AError::Http {
                    status: status.as_u16(),
                    body: body_text,
                });
            }

            // A failure before the stream starts comes back as a plain
            // JSON-RPC error envelope rather than an SSE body.
            let is_json = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|ct| ct.starts_with("application/json"));
            if is_json {
                let body = response.text().await.unwrap_or_default();
                let envelope: JsonRpcResponse = serde_json::from_str(&body).map_err(|e| {
                    A2AError::InvalidJson(format!("failed to parse JSON-RPC response: {e}"))
                })?;
                return match envelope.error {
                    Some(error) => Err(error.into()),
                    None => Err(A2AError::InvalidJson(
                        "expected an SSE body or an error envelope".to_string(),
                    )),
                };
            }
            Ok(response)
        })
        .await?;

        let stream = SseStream::from_response(response, SseFormat::JsonRpcEnvelope);
        Ok(cancellable_stream(
            stream.into_event_stream(),
            options.cancellation.clone(),
        ))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> A2AError {
    if e.is_timeout() {
        A2AError::Timeout(format!("request timed out: {e}"))
    } else if e.is_connect() {
        A2AError::Transport(format!("connection failed: {e}"))
    } else {
        A2AError::Transport(format!("HTTP request failed: {e}"))
    }
}

fn activated_extensions(headers: &HeaderMap) -> Vec<String> {
    headers
        .get(EXTENSIONS_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(parse_extensions_header)
        .unwrap_or_default()
}

fn to_params<T: serde::Serialize>(params: &T) -> A2AResult<Option<serde_json::Value>> {
    Ok(Some(serde_json::to_value(params)?))
}

#[async_trait]
impl ClientTransport for JsonRpcClient {
    async fn send_message(
        &self,
        params: SendMessageParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<SendMessageResponse>> {
        self.call(Method::SendMessage, to_params(&params)?, options)
            .await
    }

    async fn send_message_stream(
        &self,
        params: SendMessageParams,
        options: &RequestOptions,
    ) -> A2AResult<EventStream> {
        self.call_stream(Method::SendMessageStream, to_params(&params)?, options)
            .await
    }

    async fn get_task(
        &self,
        params: GetTaskParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<Task>> {
        self.call(Method::GetTask, to_params(&params)?, options)
            .await
    }

    async fn cancel_task(
        &self,
        params: CancelTaskParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<Task>> {
        self.call(Method::CancelTask, to_params(&params)?, options)
            .await
    }

    async fn resubscribe(
        &self,
        params: TaskIdParams,
        options: &RequestOptions,
    ) -> A2AResult<EventStream> {
        self.call_stream(Method::Resubscribe, to_params(&params)?, options)
            .await
    }

    async fn set_task_push_notification_config(
        &self,
        params: SetTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<TaskPushNotificationConfig>> {
        self.call(Method::SetPushConfig, to_params(&params)?, options)
            .await
    }

    async fn get_task_push_notification_config(
        &self,
        params: GetTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<TaskPushNotificationConfig>> {
        self.call(Method::GetPushConfig, to_params(&params)?, options)
            .await
    }

    async fn list_task_push_notification_configs(
        &self,
        params: ListTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<ListTaskPushNotificationConfigResponse>> {
        self.call(Method::ListPushConfigs, to_params(&params)?, options)
            .await
    }

    async fn delete_task_push_notification_config(
        &self,
        params: DeleteTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<()>> {
        // The delete result is JSON null; decode into unit.
        let response: ClientResponse<serde_json::Value> = self
            .call(Method::DeletePushConfig, to_params(&params)?, options)
            .await?;
        Ok(ClientResponse {
            value: (),
            activated_extensions: response.activated_extensions,
        })
    }

    async fn get_extended_agent_card(
        &self,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<AgentCard>> {
        self.call(Method::ExtendedAgentCard, None, options).await
    }
}
