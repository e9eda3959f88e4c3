//! The transport-neutral handler contract.
//!
//! [`RequestHandler`] is the seam between the transport dispatchers and
//! business logic: every binding (JSON-RPC, REST, gRPC) decodes its wire
//! request into domain types and calls the same trait method. Implement it
//! once and the agent is reachable over all three transports.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;

use crate::context::ServerCallContext;
use crate::error::{A2AError, A2AResult};
use crate::types::{
    AgentCard, CancelTaskParams, DeleteTaskPushNotificationConfigParams,
    GetTaskParams, GetTaskPushNotificationConfigParams, ListTaskPushNotificationConfigParams,
    SendMessageParams, SendMessageResponse, SetTaskPushNotificationConfigParams, StreamResponse,
    Task, TaskIdParams, TaskPushNotificationConfig,
};

/// A server-push stream of domain events, one `Result` per item.
pub type EventStream = Pin<Box<dyn Stream<Item = A2AResult<StreamResponse>> + Send + 'static>>;

/// The ten A2A operations, used to tag interceptor payloads and to give
/// reverse error mapping its method context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `message/send` — send a message, get a task or message back.
    SendMessage,
    /// `message/stream` — send a message, get an event stream back.
    SendMessageStream,
    /// `tasks/get` — fetch a task snapshot.
    GetTask,
    /// `tasks/cancel` — request cancellation of a task.
    CancelTask,
    /// `tasks/resubscribe` — re-attach to a running task's event stream.
    Resubscribe,
    /// `tasks/pushNotificationConfig/set` — store a push config.
    SetPushConfig,
    /// `tasks/pushNotificationConfig/get` — fetch a push config.
    GetPushConfig,
    /// `tasks/pushNotificationConfig/list` — list push configs for a task.
    ListPushConfigs,
    /// `tasks/pushNotificationConfig/delete` — delete a push config.
    DeletePushConfig,
    /// `agent/getAuthenticatedExtendedCard` — fetch the extended agent card.
    ExtendedAgentCard,
}

impl Method {
    /// Whether this method belongs to the push notification config family.
    pub fn is_push_config(&self) -> bool {
        matches!(
            self,
            Method::SetPushConfig
                | Method::GetPushConfig
                | Method::ListPushConfigs
                | Method::DeletePushConfig
        )
    }

    /// The JSON-RPC method name for this operation.
    pub fn json_rpc_name(&self) -> &'static str {
        match self {
            Method::SendMessage => "message/send",
            Method::SendMessageStream => "message/stream",
            Method::GetTask => "tasks/get",
            Method::CancelTask => "tasks/cancel",
            Method::Resubscribe => "tasks/resubscribe",
            Method::SetPushConfig => "tasks/pushNotificationConfig/set",
            Method::GetPushConfig => "tasks/pushNotificationConfig/get",
            Method::ListPushConfigs => "tasks/pushNotificationConfig/list",
            Method::DeletePushConfig => "tasks/pushNotificationConfig/delete",
            Method::ExtendedAgentCard => "agent/getAuthenticatedExtendedCard",
        }
    }

    /// Parse a JSON-RPC method name.
    pub fn from_json_rpc_name(name: &str) -> Option<Self> {
        match name {
            "message/send" => Some(Method::SendMessage),
            "message/stream" => Some(Method::SendMessageStream),
            "tasks/get" => Some(Method::GetTask),
            "tasks/cancel" => Some(Method::CancelTask),
            "tasks/resubscribe" => Some(Method::Resubscribe),
            "tasks/pushNotificationConfig/set" => Some(Method::SetPushConfig),
            "tasks/pushNotificationConfig/get" => Some(Method::GetPushConfig),
            "tasks/pushNotificationConfig/list" => Some(Method::ListPushConfigs),
            "tasks/pushNotificationConfig/delete" => Some(Method::DeletePushConfig),
            "agent/getAuthenticatedExtendedCard" => Some(Method::ExtendedAgentCard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.json_rpc_name())
    }
}

/// Handles decoded A2A requests, independent of the wire transport.
///
/// Each method receives protocol-neutral params plus the per-call
/// [`ServerCallContext`]. Push notification and resubscribe methods default
/// to `UnsupportedOperation` so minimal agents only implement the message
/// and task operations.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handle `message/send`.
    async fn on_send_message(
        &self,
        params: SendMessageParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<SendMessageResponse>;

    /// Handle `message/stream`.
    ///
    /// Only called when [`streaming_supported`](Self::streaming_supported)
    /// returns `true`; otherwise dispatchers fall back to
    /// [`on_send_message`](Self::on_send_message) and emit the unary result
    /// as a single-item stream.
    async fn on_send_message_stream(
        &self,
        params: SendMessageParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<EventStream> {
        let _ = (params, ctx);
        Err(A2AError::unsupported_operation(
            "message/stream is not supported",
        ))
    }

    /// Handle `tasks/get`.
    async fn on_get_task(
        &self,
        params: GetTaskParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Task>;

    /// Handle `tasks/cancel`.
    async fn on_cancel_task(
        &self,
        params: CancelTaskParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Task>;

    /// Handle `tasks/resubscribe`.
    async fn on_resubscribe(
        &self,
        params: TaskIdParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<EventStream> {
        let _ = (params, ctx);
        Err(A2AError::unsupported_operation(
            "tasks/resubscribe is not supported",
        ))
    }

    /// Handle `tasks/pushNotificationConfig/set`.
    async fn on_set_task_push_notification_config(
        &self,
        params: SetTaskPushNotificationConfigParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<TaskPushNotificationConfig> {
        let _ = (params, ctx);
        Err(A2AError::push_notification_not_supported(
            "push notification configs are not supported",
        ))
    }

    /// Handle `tasks/pushNotificationConfig/get`.
    async fn on_get_task_push_notification_config(
        &self,
        params: GetTaskPushNotificationConfigParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<TaskPushNotificationConfig> {
        let _ = (params, ctx);
        Err(A2AError::push_notification_not_supported(
            "push notification configs are not supported",
        ))
    }

    /// Handle `tasks/pushNotificationConfig/list`.
    async fn on_list_task_push_notification_configs(
        &self,
        params: ListTaskPushNotificationConfigParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Vec<TaskPushNotificationConfig>> {
        let _ = (params, ctx);
        Err(A2AError::push_notification_not_supported(
            "push notification configs are not supported",
        ))
    }

    /// Handle `tasks/pushNotificationConfig/delete`.
    async fn on_delete_task_push_notification_config(
        &self,
        params: DeleteTaskPushNotificationConfigParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<()> {
        let _ = (params, ctx);
        Err(A2AError::push_notification_not_supported(
            "push notification configs are not supported",
        ))
    }

    /// Handle `agent/getAuthenticatedExtendedCard`.
    async fn on_get_extended_agent_card(
        &self,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<AgentCard> {
        let _ = ctx;
        Err(A2AError::authenticated_extended_card_not_configured(
            "no extended agent card is configured",
        ))
    }

    /// Whether this handler implements true streaming.
    ///
    /// Return `false` to have dispatchers serve `message/stream` by calling
    /// [`on_send_message`](Self::on_send_message) and wrapping the unary
    /// result in a one-item stream.
    fn streaming_supported(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_round_trip() {
        let methods = [
            Method::SendMessage,
            Method::SendMessageStream,
            Method::GetTask,
            Method::CancelTask,
            Method::Resubscribe,
            Method::SetPushConfig,
            Method::GetPushConfig,
            Method::ListPushConfigs,
            Method::DeletePushConfig,
            Method::ExtendedAgentCard,
        ];
        for method in methods {
            assert_eq!(Method::from_json_rpc_name(method.json_rpc_name()), Some(method));
        }
        assert_eq!(Method::from_json_rpc_name("tasks/list"), None);
    }

    #[test]
    fn push_config_family() {
        assert!(Method::SetPushConfig.is_push_config());
        assert!(Method::DeletePushConfig.is_push_config());
        assert!(!Method::CancelTask.is_push_config());
    }
}
