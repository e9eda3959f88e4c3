//! gRPC server dispatcher.
//!
//! [`GrpcDispatcher`] exposes tonic-shaped unary and server-streaming
//! methods over a [`RequestHandler`]; registering the HTTP/2 routes with a
//! tonic server is left to the application. Domain errors map onto
//! `tonic::Status` via the shared taxonomy, with the canonical numeric code
//! preserved in the status message.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tonic::metadata::{KeyAndValueRef, MetadataMap, MetadataValue};
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::codec::grpc as codec;
use crate::context::{
    format_extensions_header, CallMetadata, NoopUserBuilder, ServerCallContext, UserBuilder,
    EXTENSIONS_HEADER,
};
use crate::grpc::pb;
use crate::handler::RequestHandler;

/// The server-streaming response stream type.
pub type GrpcEventStream =
    Pin<Box<dyn Stream<Item = Result<pb::StreamResponse, Status>> + Send + 'static>>;

/// Dispatches `a2a.v1.A2AService` calls to a [`RequestHandler`].
#[derive(Clone)]
pub struct GrpcDispatcher {
    handler: Arc<dyn RequestHandler>,
    user_builder: Arc<dyn UserBuilder>,
}

impl GrpcDispatcher {
    /// Create a dispatcher over the given handler.
    pub fn new(handler: Arc<dyn RequestHandler>) -> Self {
        Self::with_user_builder(handler, Arc::new(NoopUserBuilder))
    }

    /// Create a dispatcher with a custom caller-identity builder.
    pub fn with_user_builder(
        handler: Arc<dyn RequestHandler>,
        user_builder: Arc<dyn UserBuilder>,
    ) -> Self {
        Self {
            handler,
            user_builder,
        }
    }

    fn context(&self, metadata: &MetadataMap) -> Arc<ServerCallContext> {
        ServerCallContext::from_metadata(
            call_metadata(metadata),
            self.user_builder.as_ref(),
        )
    }

    /// `a2a.v1.A2AService/SendMessage`
    pub async fn send_message(
        &self,
        request: Request<pb::SendMessageRequest>,
    ) -> Result<Response<pb::SendMessageResponse>, Status> {
        debug!("gRPC SendMessage");
        let ctx = self.context(request.metadata());
        let params = codec::send_message_params_from_proto(request.into_inner())
            .map_err(|e| codec::status_from_error(&e))?;
        let result = self
            .handler
            .on_send_message(params, ctx.clone())
            .await
            .map_err(|e| codec::status_from_error(&e))?;
        let encoded = codec::send_message_response_to_proto(result)
            .map_err(|e| codec::status_from_error(&e))?;
        Ok(respond(encoded, &ctx))
    }

    /// `a2a.v1.A2AService/SendStreamingMessage`
    pub async fn send_streaming_message(
        &self,
        request: Request<pb::SendMessageRequest>,
    ) -> Result<Response<GrpcEventStream>, Status> {
        debug!("gRPC SendStreamingMessage");
        let ctx = self.context(request.metadata());
        let params = codec::send_message_params_from_proto(request.into_inner())
            .map_err(|e| codec::status_from_error(&e))?;
        let stream = self
            .handler
            .on_send_message_stream(params, ctx.clone())
            .await
            .map_err(|e| codec::status_from_error(&e))?;
        Ok(respond(encode_stream(stream), &ctx))
    }

    /// `a2a.v1.A2AService/GetTask`
    pub async fn get_task(
        &self,
        request: Request<pb::GetTaskRequest>,
    ) -> Result<Response<pb::Task>, Status> {
        debug!("gRPC GetTask");
        let ctx = self.context(request.metadata());
        let params = codec::get_task_params_from_proto(request.into_inner())
            .map_err(|e| codec::status_from_error(&e))?;
        let task = self
            .handler
            .on_get_task(params, ctx.clone())
            .await
            .map_err(|e| codec::status_from_error(&e))?;
        let encoded = codec::task_to_proto(task).map_err(|e| codec::status_from_error(&e))?;
        Ok(respond(encoded, &ctx))
    }

    /// `a2a.v1.A2AService/CancelTask`
    pub async fn cancel_task(
        &self,
        request: Request<pb::CancelTaskRequest>,
    ) -> Result<Response<pb::Task>, Status> {
        debug!("gRPC CancelTask");
        let ctx = self.context(request.metadata());
        let params = codec::cancel_task_params_from_proto(request.into_inner())
            .map_err(|e| codec::status_from_error(&e))?;
        let task = self
            .handler
            .on_cancel_task(params, ctx.clone())
            .await
            .map_err(|e| codec::status_from_error(&e))?;
        let encoded = codec::task_to_proto(task).map_err(|e| codec::status_from_error(&e))?;
        Ok(respond(encoded, &ctx))
    }

    /// `a2a.v1.A2AService/TaskSubscription`
    pub async fn task_subscription(
        &self,
        request: Request<pb::TaskSubscriptionRequest>,
    ) -> Result<Response<GrpcEventStream>, Status> {
        debug!("gRPC TaskSubscription");
        let ctx = self.context(request.metadata());
        let params = codec::subscription_params_from_proto(request.into_inner())
            .map_err(|e| codec::status_from_error(&e))?;
        let stream = self
            .handler
            .on_resubscribe(params, ctx.clone())
            .await
            .map_err(|e| codec::status_from_error(&e))?;
        Ok(respond(encode_stream(stream), &ctx))
    }

    /// `a2a.v1.A2AService/CreateTaskPushNotificationConfig`
    pub async fn create_task_push_notification_config(
        &self,
        request: Request<pb::CreateTaskPushNotificationConfigRequest>,
    ) -> Result<Response<pb::TaskPushNotificationConfig>, Status> {
        debug!("gRPC CreateTaskPushNotificationConfig");
        let ctx = self.context(request.metadata());
        let params = codec::set_push_config_params_from_proto(request.into_inner())
            .map_err(|e| codec::status_from_error(&e))?;
        let result = self
            .handler
            .on_set_task_push_notification_config(params, ctx.clone())
            .await
            .map_err(|e| codec::status_from_error(&e))?;
        Ok(respond(codec::task_push_config_to_proto(result), &ctx))
    }

    /// `a2a.v1.A2AService/GetTaskPushNotificationConfig`
    pub async fn get_task_push_notification_config(
        &self,
        request: Request<pb::GetTaskPushNotificationConfigRequest>,
    ) -> Result<Response<pb::TaskPushNotificationConfig>, Status> {
        debug!("gRPC GetTaskPushNotificationConfig");
        let ctx = self.context(request.metadata());
        let params = codec::get_push_config_params_from_proto(request.into_inner())
            .map_err(|e| codec::status_from_error(&e))?;
        let result = self
            .handler
            .on_get_task_push_notification_config(params, ctx.clone())
            .await
            .map_err(|e| codec::status_from_error(&e))?;
        Ok(respond(codec::task_push_config_to_proto(result), &ctx))
    }

    /// `a2a.v1.A2AService/ListTaskPushNotificationConfig`
    pub async fn list_task_push_notification_config(
        &self,
        request: Request<pb::ListTaskPushNotificationConfigRequest>,
    ) -> Result<Response<pb::ListTaskPushNotificationConfigResponse>, Status> {
        debug!("gRPC ListTaskPushNotificationConfig");
        let ctx = self.context(request.metadata());
        let params = codec::list_push_config_params_from_proto(request.into_inner())
            .map_err(|e| codec::status_from_error(&e))?;
        let configs = self
            .handler
            .on_list_task_push_notification_configs(params, ctx.clone())
            .await
            .map_err(|e| codec::status_from_error(&e))?;
        Ok(respond(
            codec::list_push_config_response_to_proto(configs, None),
            &ctx,
        ))
    }

    /// `a2a.v1.A2AService/DeleteTaskPushNotificationConfig`
    pub async fn delete_task_push_notification_config(
        &self,
        request: Request<pb::DeleteTaskPushNotificationConfigRequest>,
    ) -> Result<Response<()>, Status> {
        debug!("gRPC DeleteTaskPushNotificationConfig");
        let ctx = self.context(request.metadata());
        let params = codec::delete_push_config_params_from_proto(request.into_inner())
            .map_err(|e| codec::status_from_error(&e))?;
        self.handler
            .on_delete_task_push_notification_config(params, ctx.clone())
            .await
            .map_err(|e| codec::status_from_error(&e))?;
        Ok(respond((), &ctx))
    }

    /// `a2a.v1.A2AService/GetExtendedAgentCard`
    pub async fn get_extended_agent_card(
        &self,
        request: Request<pb::GetExtendedAgentCardRequest>,
    ) -> Result<Response<pb::AgentCard>, Status> {
        debug!("gRPC GetExtendedAgentCard");
        let ctx = self.context(request.metadata());
        let card = self
            .handler
            .on_get_extended_agent_card(ctx.clone())
            .await
            .map_err(|e| codec::status_from_error(&e))?;
        let encoded = codec::agent_card_to_proto(card).map_err(|e| codec::status_from_error(&e))?;
        Ok(respond(encoded, &ctx))
    }
}

fn call_metadata(metadata: &MetadataMap) -> CallMetadata {
    let mut out = CallMetadata::new();
    for entry in metadata.iter() {
        if let KeyAndValueRef::Ascii(key, value) = entry {
            if let Ok(value) = value.to_str() {
                out.insert(key.as_str(), value);
            }
        }
    }
    out
}

/// Wrap a payload in a response carrying the activated-extensions metadata.
fn respond<T>(payload: T, ctx: &ServerCallContext) -> Response<T> {
    let mut response = Response::new(payload);
    let activated = ctx.activated_extensions();
    if !activated.is_empty() {
        if let Ok(value) = MetadataValue::try_from(format_extensions_header(&activated)) {
            response.metadata_mut().insert(EXTENSIONS_HEADER, value);
        }
    }
    response
}

/// Encode domain events per item; a failure terminates the stream with its
/// mapped status, items already written stand.
fn encode_stream(upstream: crate::handler::EventStream) -> GrpcEventStream {
    Box::pin(upstream.map(|item| match item {
        Ok(event) => {
            codec::stream_response_to_proto(event).map_err(|e| codec::status_from_error(&e))
        }
        Err(e) => Err(codec::status_from_error(&e)),
    }))
}
