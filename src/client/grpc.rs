//! gRPC client adapter.
//!
//! Wraps the generated-style [`A2aServiceClient`] and converts between the
//! domain types and the `a2a.v1` protobuf messages. Construction requires an
//! explicit, already-configured [`Channel`]; this crate never picks a scheme
//! or credentials on the caller's behalf.

use async_trait::async_trait;
use futures::StreamExt;
use tonic::metadata::{MetadataKey, MetadataMap, MetadataValue};
use tonic::transport::{Channel, Endpoint};

use crate::codec::grpc as codec;
use crate::context::{format_extensions_header, parse_extensions_header, EXTENSIONS_HEADER};
use crate::error::{A2AError, A2AResult};
use crate::grpc::A2aServiceClient;
use crate::handler::{EventStream, Method};
use crate::types::{
    AgentCard, CancelTaskParams, DeleteTaskPushNotificationConfigParams, GetTaskParams,
    GetTaskPushNotificationConfigParams, ListTaskPushNotificationConfigParams,
    ListTaskPushNotificationConfigResponse, SendMessageParams, SendMessageResponse,
    SetTaskPushNotificationConfigParams, Task, TaskIdParams, TaskPushNotificationConfig,
};

use super::transport::{
    cancellable_stream, with_cancellation, ClientResponse, ClientTransport, RequestOptions,
};

/// gRPC client over an explicit tonic [`Channel`].
///
/// # Example
///
/// ```no_run
/// use a2a_bridge::client::GrpcClient;
/// use tonic::transport::Endpoint;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let channel = Endpoint::from_static("http://localhost:50051")
///     .connect()
///     .await?;
/// let client = GrpcClient::new(channel);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GrpcClient {
    inner: A2aServiceClient,
}

impl GrpcClient {
    /// Create a client over an established channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: A2aServiceClient::new(channel),
        }
    }

    /// Connect an endpoint and create a client over the resulting channel.
    pub async fn connect(endpoint: Endpoint) -> A2AResult<Self> {
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| A2AError::Transport(format!("gRPC connection failed: {e}")))?;
        Ok(Self::new(channel))
    }

    fn request<T>(&self, message: T, options: &RequestOptions) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        apply_metadata(request.metadata_mut(), options);
        request
    }
}

fn apply_metadata(metadata: &mut MetadataMap, options: &RequestOptions) {
    for (key, value) in &options.service_parameters {
        if let (Ok(name), Ok(val)) = (
            MetadataKey::from_bytes(key.as_bytes()),
            MetadataValue::try_from(value.as_str()),
        ) {
            metadata.insert(name, val);
        }
    }
    if !options.extensions.is_empty() {
        if let Ok(val) = MetadataValue::try_from(format_extensions_header(&options.extensions)) {
            metadata.insert(EXTENSIONS_HEADER, val);
        }
    }
}

fn activated_extensions(metadata: &MetadataMap) -> Vec<String> {
    metadata
        .get(EXTENSIONS_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(parse_extensions_header)
        .unwrap_or_default()
}

/// Adapt a tonic server stream into the transport-neutral event stream.
fn event_stream(
    streaming: tonic::Streaming<crate::grpc::pb::StreamResponse>,
    method: Method,
) -> EventStream {
    Box::pin(streaming.map(move |item| match item {
        Ok(event) => codec::stream_response_from_proto(event),
        Err(status) => Err(codec::error_from_status(status, method)),
    }))
}

#[async_trait]
impl ClientTransport for GrpcClient {
    async fn send_message(
        &self,
        params: SendMessageParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<SendMessageResponse>> {
        let request = self.request(codec::send_message_params_to_proto(params)?, options);
        let mut client = self.inner.clone();
        with_cancellation(options, async {
            let response = client
                .send_message(request)
                .await
                .map_err(|s| codec::error_from_status(s, Method::SendMessage))?;
            let activated_extensions = activated_extensions(response.metadata());
            Ok(ClientResponse {
                value: codec::send_message_response_from_proto(response.into_inner())?,
                activated_extensions,
            })
        })
        .await
    }

    async fn send_message_stream(
        &self,
        params: SendMessageParams,
        options: &RequestOptions,
    ) -> A2AResult<EventStream> {
        let request = self.request(codec::send_message_params_to_proto(params)?, options);
        let mut client = self.inner.clone();
        let streaming = with_cancellation(options, async {
            let response = client
                .send_streaming_message(request)
                .await
                .map_err(|s| codec::error_from_status(s, Method::SendMessageStream))?;
            Ok(response.into_inner())
        })
        .await?;
        Ok(cancellable_stream(
            event_stream(streaming, Method::SendMessageStream),
            options.cancellation.clone(),
        ))
    }

    async fn get_task(
        &self,
        params: GetTaskParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<Task>> {
        let request = self.request(codec::get_task_params_to_proto(params), options);
        let mut client = self.inner.clone();
        with_cancellation(options, async {
            let response = client
                .get_task(request)
                .await
                .map_err(|s| codec::error_from_status(s, Method::GetTask))?;
            let activated_extensions = activated_extensions(response.metadata());
            Ok(ClientResponse {
                value: codec::task_from_proto(response.into_inner())?,
                activated_extensions,
            })
        })
        .await
    }

    async fn cancel_task(
        &self,
        params: CancelTaskParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<Task>> {
        let request = self.request(codec::cancel_task_params_to_proto(params), options);
        let mut client = self.inner.clone();
        with_cancellation(options, async {
            let response = client
                .cancel_task(request)
                .await
                .map_err(|s| codec::error_from_status(s, Method::CancelTask))?;
            let activated_extensions = activated_extensions(response.metadata());
            Ok(ClientResponse {
                value: codec::task_from_proto(response.into_inner())?,
                activated_extensions,
            })
        })
        .await
    }

    async fn resubscribe(
        &self,
        params: TaskIdParams,
        options: &RequestOptions,
    ) -> A2AResult<EventStream> {
        let request = self.request(codec::subscription_params_to_proto(params), options);
        let mut client = self.inner.clone();
        let streaming = with_cancellation(options, async {
            let response = client
                .task_subscription(request)
                .await
                .map_err(|s| codec::error_from_status(s, Method::Resubscribe))?;
            Ok(response.into_inner())
        })
        .await?;
        Ok(cancellable_stream(
            event_stream(streaming, Method::Resubscribe),
            options.cancellation.clone(),
        ))
    }

    async fn set_task_push_notification_config(
        &self,
        params: SetTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<TaskPushNotificationConfig>> {
        let request = self.request(codec::set_push_config_params_to_proto(params), options);
        let mut client = self.inner.clone();
        with_cancellation(options, async {
            let response = client
                .create_task_push_notification_config(request)
                .await
                .map_err(|s| codec::error_from_status(s, Method::SetPushConfig))?;
            let activated_extensions = activated_extensions(response.metadata());
            Ok(ClientResponse {
                value: codec::task_push_config_from_proto(response.into_inner())?,
                activated_extensions,
            })
        })
        .await
    }

    async fn get_task_push_notification_config(
        &self,
        params: GetTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<TaskPushNotificationConfig>> {
        let request = self.request(codec::get_push_config_params_to_proto(&params), options);
        let mut client = self.inner.clone();
        with_cancellation(options, async {
            let response = client
                .get_task_push_notification_config(request)
                .await
                .map_err(|s| codec::error_from_status(s, Method::GetPushConfig))?;
            let activated_extensions = activated_extensions(response.metadata());
            Ok(ClientResponse {
                value: codec::task_push_config_from_proto(response.into_inner())?,
                activated_extensions,
            })
        })
        .await
    }

    async fn list_task_push_notification_configs(
        &self,
        params: ListTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<ListTaskPushNotificationConfigResponse>> {
        let request = self.request(codec::list_push_config_params_to_proto(&params), options);
        let mut client = self.inner.clone();
        with_cancellation(options, async {
            let response = client
                .list_task_push_notification_config(request)
                .await
                .map_err(|s| codec::error_from_status(s, Method::ListPushConfigs))?;
            let activated_extensions = activated_extensions(response.metadata());
            Ok(ClientResponse {
                value: codec::list_push_config_response_from_proto(response.into_inner())?,
                activated_extensions,
            })
        })
        .await
    }

    async fn delete_task_push_notification_config(
        &self,
        params: DeleteTaskPushNotificationConfigParams,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<()>> {
        let request = self.request(codec::delete_push_config_params_to_proto(&params), options);
        let mut client = self.inner.clone();
        with_cancellation(options, async {
            let response = client
                .delete_task_push_notification_config(request)
                .await
                .map_err(|s| codec::error_from_status(s, Method::DeletePushConfig))?;
            let activated_extensions = activated_extensions(response.metadata());
            Ok(ClientResponse {
                value: (),
                activated_extensions,
            })
        })
        .await
    }

    async fn get_extended_agent_card(
        &self,
        options: &RequestOptions,
    ) -> A2AResult<ClientResponse<AgentCard>> {
        let request = self.request(crate::grpc::pb::GetExtendedAgentCardRequest {}, options);
        let mut client = self.inner.clone();
        with_cancellation(options, async {
            let response = client
                .get_extended_agent_card(request)
                .await
                .map_err(|s| codec::error_from_status(s, Method::ExtendedAgentCard))?;
            let activated_extensions = activated_extensions(response.metadata());
            Ok(ClientResponse {
                value: codec::agent_card_from_proto(response.into_inner())?,
                activated_extensions,
            })
        })
        .await
    }
}
