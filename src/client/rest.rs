//! REST/JSON client adapter.
//!
//! Maps each operation onto a resource route under `/v1`, with custom verbs
//! (`:cancel`, `:subscribe`, `:stream`) expressed as POSTs. Streaming routes
//! return SSE with one domain event per frame; failures arrive as
//! `event: error` frames. Non-2xx responses carry the canonical error
//! envelope, which takes precedence over the HTTP status on decode.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use crate::codec::rest::{error_from_response, validate_pagination};
use crate::context::{format_extensions_header, parse_extensions_header, EXTENSIONS_HEADER};
use crate::error::{A2AError, A2AResult};
use crate::handler::EventStream;
use crate::types::{
    AgentCard, CancelTaskParams, DeleteTaskPushNotificationConfigParams, GetTaskParams,
    GetTaskPushNotificationConfigParams, ListTaskPushNotificationConfigParams,
    ListTaskPushNotificationConfigResponse, SendMessageParams, SendMessageResponse,
    SetTaskPushNotificationConfigParams, Task, TaskIdParams, TaskPushNotificationConfig,
};

use super::sse::{SseFormat, SseStream};
use super::transport::{
    cancellable_stream, with_cancellation, ClientResponse, ClientTransport, RequestOptions,
    TransportConfig,
};

fn normalize(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

/// REST/JSON client using `reqwest`.
///
/// # Example
///
/// ```no_run
/// use a2a_bridge::client::RestClient;
///
/// let client = RestClient::new("http://localhost:7420");
/// ```
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    // Applied per request; None when the caller brought their own client.
    timeout: Option<Duration>,
}

impl RestClient {
    /// Create a new client targeting the given base URL (no trailing `/v1`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: normalize(base_url),
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
    pub fn with_config(base_url: impl Into<String>, config: TransportConfig) -> A2AResult<Self> {
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
            base_url: normalize(base_url),
            timeout: Some(config.timeout),
        })
    }

    /// Create a client with an existing `reqwest::Client`. No per-request
    /// timeout is imposed on top of the client's own configuration.
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: normalize(base_url),
            timeout: None,
        }
    }

    /// Returns the base URL this client resolves routes against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Change the request timeout (builder-style). Headers installed via
    /// [`with_config`](Self::with_config) are kept.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_options(
        &self,
        mut builder: reqwest::RequestBuilder,
        options: &RequestOptions,
    ) -> reqwest::RequestBuilder {
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

    /// Issue a unary request and decode the JSON body.
    async fn execute<R: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<R>> {
        let builder = self.apply_options(builder, options);
        with_cancellation(options, async {
            let response = builder.send().await.map_err(map_reqwest_error)?;

            let status = response.status();
            let activated_extensions = activated_extensions(response.headers());
            let body = response
                .text()
                .await
                .map_err(|e| A2AError::Transport(format!("failed to read response body: {e}")))?;

            if !status.is_success() {
                return Err(error_from_response(status.as_u16(), &body));
            }

            // An empty 2xx body (delete) decodes as JSON null.
            let raw = if body.trim().is_empty() { "null" } else { &body };
            let value = serde_json::from_str(raw)
                .map_err(|e| A2AError::InvalidJson(format!("failed to decode response: {e}")))?;

            Ok(ClientResponse {
                value,
                activated_extensions,
            })
        })
        .await
    }

    /// Open an SSE stream of raw domain events.
    async fn execute_stream(
        &self,
        builder: reqwest::RequestBuilder,
        options: &RequestOptions,
    ) -> A2AResult<EventStream> {
        let builder = self
            .apply_options(builder, options)
            .header("Accept", "text/event-stream");

        let response = with_cancellation(options, async {
            let response = builder.send().await.map_err(map_reqwest_error)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(error_from_response(status.as_u16(), &body));
            }
            Ok(response)
        })
        .await?;

        let stream = SseStream::from_response(response, SseFormat::Raw);
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

#[async_trait]
impl ClientTransport for RestClient {
    async fn send_message(
        &self,
        params: SendMessageParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<SendMessageResponse>> {
        let builder = self.client.post(self.url("/v1/message:send")).json(&params);
        self.execute(builder, options).await
    }

    async fn send_message_stream(
        &self,
        params: SendMessageParams,
        options: &RequestOptions,
    ) -> A2AResult<EventStream> {
        let builder = self
            .client
            .post(self.url("/v1/message:stream"))
            .json(&params);
        self.execute_stream(builder, options).await
    }

    async fn get_task(
        &self,
        params: GetTaskParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<Task>> {
        let mut builder = self.client.get(self.url(&format!("/v1/tasks/{}", params.id)));
        if let Some(history_length) = params.history_length {
            builder = builder.query(&[("historyLength", history_length)]);
        }
        self.execute(builder, options).await
    }

    async fn cancel_task(
        &self,
        params: CancelTaskParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<Task>> {
        let builder = self
            .client
            .post(self.url(&format!("/v1/tasks/{}:cancel", params.id)));
        self.execute(builder, options).await
    }

    async fn resubscribe(
        &self,
        params: TaskIdParams,
        options: &RequestOptions,
    ) -> A2AResult<EventStream> {
        let builder = self
            .client
            .post(self.url(&format!("/v1/tasks/{}:subscribe", params.id)));
        self.execute_stream(builder, options).await
    }

    async fn set_task_push_notification_config(
        &self,
        params: SetTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<TaskPushNotificationConfig>> {
        let builder = self
            .client
            .post(self.url(&format!(
                "/v1/tasks/{}/pushNotificationConfigs",
                params.task_id
            )))
            .json(&params.push_notification_config);
        self.execute(builder, options).await
    }

    async fn get_task_push_notification_config(
        &self,
        params: GetTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<TaskPushNotificationConfig>> {
        let builder = self.client.get(self.url(&format!(
            "/v1/tasks/{}/pushNotificationConfigs/{}",
            params.id, params.push_notification_config_id
        )));
        self.execute(builder, options).await
    }

    async fn list_task_push_notification_configs(
        &self,
        params: ListTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<ListTaskPushNotificationConfigResponse>> {
        validate_pagination(params.page_size, params.page_token.as_deref())?;

        let mut builder = self.client.get(self.url(&format!(
            "/v1/tasks/{}/pushNotificationConfigs",
            params.id
        )));
        if let Some(page_size) = params.page_size {
            builder = builder.query(&[("pageSize", page_size)]);
        }
        if let Some(page_token) = &params.page_token {
            builder = builder.query(&[("pageToken", page_token)]);
        }
        self.execute(builder, options).await
    }

    async fn delete_task_push_notification_config(
        &self,
        params: DeleteTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<()>> {
        let builder = self.client.delete(self.url(&format!(
            "/v1/tasks/{}/pushNotificationConfigs/{}",
            params.id, params.push_notification_config_id
        )));
        let response: ClientResponse<serde_json::Value> = self.execute(builder, options).await?;
        Ok(ClientResponse {
            value: (),
            activated_extensions: response.activated_extensions,
        })
    }

    async fn get_extended_agent_card(
        &self,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<AgentCard>> {
        let builder = self.client.get(self.url("/v1/card"));
        self.execute(builder, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = RestClient::new("http://localhost:7420/");
        assert_eq!(client.base_url(), "http://localhost:7420");
        assert_eq!(client.url("/v1/card"), "http://localhost:7420/v1/card");
    }

    #[test]
    fn timeout_override_is_builder_style() {
        let client = RestClient::new("http://localhost:7420").with_timeout(Duration::from_secs(5));
        assert_eq!(client.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn invalid_configured_header_is_rejected() {
        let mut config = TransportConfig::default();
        config
            .headers
            .insert("bad header".to_string(), "x".to_string());

        let result = RestClient::with_config("http://localhost:7420", config);
        assert!(matches!(result, Err(A2AError::Transport(_))));
    }

    #[tokio::test]
    async fn oversized_page_size_fails_before_dispatch() {
        let client = RestClient::new("http://localhost:7420");
        let params = ListTaskPushNotificationConfigParams {
            id: "t1".to_string(),
            page_size: Some(5000),
            page_token: None,
            metadata: None,
        };
        let result = client
            .list_task_push_notification_configs(params, &RequestOptions::default())
            .await;
        assert!(matches!(result, Err(A2AError::InvalidParams { .. })));
    }
}
