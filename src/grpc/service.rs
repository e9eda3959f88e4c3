//! Hand-rolled `a2a.v1.A2AService` client stub.
//!
//! Follows the shape tonic's generator emits, specialized to
//! [`tonic::transport::Channel`]. The gRPC transport adapter in
//! [`crate::client::grpc`] owns one of these per connection and clones it
//! per call.

use tonic::codegen::http::uri::PathAndQuery;
use tonic::codegen::GrpcMethod;
use tonic::transport::Channel;

use super::pb;

/// Client stub for the ten A2AService RPCs.
#[derive(Debug, Clone)]
pub struct A2aServiceClient {
    inner: tonic::client::Grpc<Channel>,
}

impl A2aServiceClient {
    /// Wrap an established channel.
    pub fn new(channel: Channel) -> Self {
        A2aServiceClient {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    async fn ready(&mut self) -> Result<(), tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::unknown(format!("Service was not ready: {}", e))
        })
    }

    pub async fn send_message(
        &mut self,
        request: impl tonic::IntoRequest<pb::SendMessageRequest>,
    ) -> Result<tonic::Response<pb::SendMessageResponse>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/a2a.v1.A2AService/SendMessage");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("a2a.v1.A2AService", "SendMessage"));
        self.inner.unary(req, path, codec).await
    }

    pub async fn send_streaming_message(
        &mut self,
        request: impl tonic::IntoRequest<pb::SendMessageRequest>,
    ) -> Result<tonic::Response<tonic::codec::Streaming<pb::StreamResponse>>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/a2a.v1.A2AService/SendStreamingMessage");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("a2a.v1.A2AService", "SendStreamingMessage"));
        self.inner.server_streaming(req, path, codec).await
    }

    pub async fn get_task(
        &mut self,
        request: impl tonic::IntoRequest<pb::GetTaskRequest>,
    ) -> Result<tonic::Response<pb::Task>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/a2a.v1.A2AService/GetTask");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("a2a.v1.A2AService", "GetTask"));
        self.inner.unary(req, path, codec).await
    }

    pub async fn cancel_task(
        &mut self,
        request: impl tonic::IntoRequest<pb::CancelTaskRequest>,
    ) -> Result<tonic::Response<pb::Task>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/a2a.v1.A2AService/CancelTask");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("a2a.v1.A2AService", "CancelTask"));
        self.inner.unary(req, path, codec).await
    }

    pub async fn task_subscription(
        &mut self,
        request: impl tonic::IntoRequest<pb::TaskSubscriptionRequest>,
    ) -> Result<tonic::Response<tonic::codec::Streaming<pb::StreamResponse>>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/a2a.v1.A2AService/TaskSubscription");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("a2a.v1.A2AService", "TaskSubscription"));
        self.inner.server_streaming(req, path, codec).await
    }

    pub async fn create_task_push_notification_config(
        &mut self,
        request: impl tonic::IntoRequest<pb::CreateTaskPushNotificationConfigRequest>,
    ) -> Result<tonic::Response<pb::TaskPushNotificationConfig>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path =
            PathAndQuery::from_static("/a2a.v1.A2AService/CreateTaskPushNotificationConfig");
        let mut req = request.into_request();
        req.extensions_mut().insert(GrpcMethod::new(
            "a2a.v1.A2AService",
            "CreateTaskPushNotificationConfig",
        ));
        self.inner.unary(req, path, codec).await
    }

    pub async fn get_task_push_notification_config(
        &mut self,
        request: impl tonic::IntoRequest<pb::GetTaskPushNotificationConfigRequest>,
    ) -> Result<tonic::Response<pb::TaskPushNotificationConfig>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/a2a.v1.A2AService/GetTaskPushNotificationConfig");
        let mut req = request.into_request();
        req.extensions_mut().insert(GrpcMethod::new(
            "a2a.v1.A2AService",
            "GetTaskPushNotificationConfig",
        ));
        self.inner.unary(req, path, codec).await
    }

    pub async fn list_task_push_notification_config(
        &mut self,
        request: impl tonic::IntoRequest<pb::ListTaskPushNotificationConfigRequest>,
    ) -> Result<tonic::Response<pb::ListTaskPushNotificationConfigResponse>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/a2a.v1.A2AService/ListTaskPushNotificationConfig");
        let mut req = request.into_request();
        req.extensions_mut().insert(GrpcMethod::new(
            "a2a.v1.A2AService",
            "ListTaskPushNotificationConfig",
        ));
        self.inner.unary(req, path, codec).await
    }

    pub async fn delete_task_push_notification_config(
        &mut self,
        request: impl tonic::IntoRequest<pb::DeleteTaskPushNotificationConfigRequest>,
    ) -> Result<tonic::Response<()>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path =
            PathAndQuery::from_static("/a2a.v1.A2AService/DeleteTaskPushNotificationConfig");
        let mut req = request.into_request();
        req.extensions_mut().insert(GrpcMethod::new(
            "a2a.v1.A2AService",
            "DeleteTaskPushNotificationConfig",
        ));
        self.inner.unary(req, path, codec).await
    }

    pub async fn get_extended_agent_card(
        &mut self,
        request: impl tonic::IntoRequest<pb::GetExtendedAgentCardRequest>,
    ) -> Result<tonic::Response<pb::AgentCard>, tonic::Status> {
        self.ready().await?;
        let codec = tonic::codec::ProstCodec::default();
        let path = PathAndQuery::from_static("/a2a.v1.A2AService/GetExtendedAgentCard");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("a2a.v1.A2AService", "GetExtendedAgentCard"));
        self.inner.unary(req, path, codec).await
    }
}
