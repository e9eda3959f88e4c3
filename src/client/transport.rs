//! The transport-neutral client interface.
//!
//! [`ClientTransport`] exposes one method per A2A operation in domain
//! types; the JSON-RPC, REST, and gRPC adapters implement it so callers
//! can swap bindings without touching call sites.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Future, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::{A2AError, A2AResult};
use crate::handler::EventStream;
use crate::types::{
    AgentCard, CancelTaskParams, DeleteTaskPushNotificationConfigParams, GetTaskParams,
    GetTaskPushNotificationConfigParams, ListTaskPushNotificationConfigParams,
    ListTaskPushNotificationConfigResponse, SendMessageParams, SendMessageResponse,
    SetTaskPushNotificationConfigParams, Task, TaskIdParams, TaskPushNotificationConfig,
};

/// Per-call options shared by all transport adapters.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Cancels the in-flight call when triggered. A token canceled before
    /// dispatch prevents the request from being issued at all.
    pub cancellation: Option<CancellationToken>,

    /// Extra transport metadata for this call: HTTP headers on the text
    /// bindings, metadata entries on gRPC. Keys should be lowercase.
    pub service_parameters: HashMap<String, String>,

    /// Protocol extension URIs to request for this call.
    pub extensions: Vec<String>,
}

impl RequestOptions {
    /// Options with a cancellation token and nothing else.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        RequestOptions {
            cancellation: Some(token),
            ..Default::default()
        }
    }
}

/// A unary call result plus the transport-level response metadata the
/// caller may care about.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientResponse<T> {
    /// The decoded domain value.
    pub value: T,

    /// Extensions the server reported as activated for this call.
    pub activated_extensions: Vec<String>,
}

impl<T> ClientResponse<T> {
    /// A response with no extension metadata.
    pub fn bare(value: T) -> Self {
        ClientResponse {
            value,
            activated_extensions: Vec::new(),
        }
    }
}

/// Configuration for the HTTP-based adapters.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout. Defaults to 60 seconds.
    pub timeout: Duration,
    /// Additional HTTP headers to include on every request.
    pub headers: HashMap<String, String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            headers: HashMap::new(),
        }
    }
}

/// A client-side adapter for one wire binding.
///
/// Every method takes protocol-neutral params and per-call
/// [`RequestOptions`]; adapters own the encode/decode and error mapping
/// for their binding.
#[async_trait]
pub trait ClientTransport: Send + Sync {
    /// Call `message/send`.
    async fn send_message(
        &self,
        params: SendMessageParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<SendMessageResponse>>;

    /// Call `message/stream`.
    async fn send_message_stream(
        &self,
        params: SendMessageParams,
        options: &RequestOptions,
    ) -> A2AResult<EventStream>;

    /// Call `tasks/get`.
    async fn get_task(
        &self,
        params: GetTaskParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<Task>>;

    /// Call `tasks/cancel`.
    async fn cancel_task(
        &self,
        params: CancelTaskParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<Task>>;

    /// Call `tasks/resubscribe`.
    async fn resubscribe(
        &self,
        params: TaskIdParams,
        options: &RequestOptions,
    ) -> A2AResult<EventStream>;

    /// Call `tasks/pushNotificationConfig/set`.
    async fn set_task_push_notification_config(
        &self,
        params: SetTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<TaskPushNotificationConfig>>;

    /// Call `tasks/pushNotificationConfig/get`.
    async fn get_task_push_notification_config(
        &self,
        params: GetTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<TaskPushNotificationConfig>>;

    /// Call `tasks/pushNotificationConfig/list`.
    async fn list_task_push_notification_configs(
        &self,
        params: ListTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<ListTaskPushNotificationConfigResponse>>;

    /// Call `tasks/pushNotificationConfig/delete`.
    async fn delete_task_push_notification_config(
        &self,
        params: DeleteTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<()>>;

    /// Call `agent/getAuthenticatedExtendedCard`.
    async fn get_extended_agent_card(
        &self,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<AgentCard>>;

    /// Close the transport and release any held resources.
    ///
    /// The default is a no-op; adapters holding persistent connections
    /// override it.
    async fn close(&self) -> A2AResult<()> {
        Ok(())
    }
}

/// Fail fast when the caller's token is already canceled, before any
/// bytes go on the wire.
pub(crate) fn ensure_not_canceled(options: &RequestOptions) -> A2AResult<()> {
    if let Some(token) = &options.cancellation {
        if token.is_cancelled() {
            return Err(A2AError::Canceled(
                "canceled before the request was issued".to_string(),
            ));
        }
    }
    Ok(())
}

/// Run a unary call under the caller's cancellation token.
pub(crate) async fn with_cancellation<T, F>(options: &RequestOptions, fut: F) -> A2AResult<T>
where
    F: Future<Output = A2AResult<T>>,
{
    ensure_not_canceled(options)?;
    match options.cancellation.clone() {
        None => fut.await,
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    Err(A2AError::Canceled("canceled while in flight".to_string()))
                }
                result = fut => result,
            }
        }
    }
}

/// Wrap a stream so the caller's token tears it down mid-flight: the
/// stream yields a final `Canceled` error and ends.
pub(crate) fn cancellable_stream(
    stream: EventStream,
    token: Option<CancellationToken>,
) -> EventStream {
    let Some(token) = token else {
        return stream;
    };
    Box::pin(async_stream::stream! {
        let mut stream = stream;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    yield Err(A2AError::Canceled("stream canceled".to_string()));
                    break;
                }
                item = stream.next() => match item {
                    Some(item) => yield item,
                    None => break,
                },
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn precanceled_token_prevents_dispatch() {
        let token = CancellationToken::new();
        token.cancel();
        let options = RequestOptions::with_cancellation(token);

        let mut dispatched = false;
        let result = with_cancellation(&options, async {
            dispatched = true;
            Ok(42)
        })
        .await;

        assert!(matches!(result, Err(A2AError::Canceled(_))));
        assert!(!dispatched);
    }

    #[tokio::test]
    async fn cancellation_tears_down_in_flight_call() {
        let token = CancellationToken::new();
        let options = RequestOptions::with_cancellation(token.clone());

        let call = with_cancellation(&options, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        });
        tokio::pin!(call);

        tokio::select! {
            _ = &mut call => panic!("call should not complete"),
            _ = tokio::time::sleep(Duration::from_millis(10)) => token.cancel(),
        }
        assert!(matches!(call.await, Err(A2AError::Canceled(_))));
    }

    #[tokio::test]
    async fn canceled_stream_yields_final_error() {
        use crate::types::{Message, StreamResponse};

        let token = CancellationToken::new();
        let upstream: EventStream = Box::pin(async_stream::stream! {
            yield Ok(StreamResponse::Message(Message::agent_text("one")));
            tokio::time::sleep(Duration::from_secs(30)).await;
            yield Ok(StreamResponse::Message(Message::agent_text("never")));
        });
        let mut wrapped = cancellable_stream(upstream, Some(token.clone()));

        let first = wrapped.next().await.unwrap();
        assert!(first.is_ok());

        token.cancel();
        let last = wrapped.next().await.unwrap();
        assert!(matches!(last, Err(A2AError::Canceled(_))));
        assert!(wrapped.next().await.is_none());
    }
}
