//! Shared test fixtures: an in-memory echo handler and sample data.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use a2a_bridge::context::ServerCallContext;
use a2a_bridge::error::{A2AError, A2AResult};
use a2a_bridge::handler::{EventStream, RequestHandler};
use a2a_bridge::types::{
    AgentCapabilities, AgentCard, Artifact, CancelTaskParams,
    DeleteTaskPushNotificationConfigParams, GetTaskParams, GetTaskPushNotificationConfigParams,
    ListTaskPushNotificationConfigParams, Message, Part, PushNotificationConfig,
    SendMessageParams, SendMessageResponse, SetTaskPushNotificationConfigParams, Task,
    TaskArtifactUpdateEvent, TaskIdParams, TaskPushNotificationConfig, TaskState, TaskStatus,
    TaskStatusUpdateEvent, StreamResponse,
};

pub const KNOWN_TASK: &str = "t1";
pub const TERMINAL_TASK: &str = "done";
pub const CONTEXT: &str = "c1";

pub fn sample_task(id: &str, state: TaskState) -> Task {
    Task {
        id: id.to_string(),
        context_id: CONTEXT.to_string(),
        kind: "task".to_string(),
        status: TaskStatus::new(state),
        artifacts: None,
        history: None,
        metadata: None,
    }
}

pub fn sample_card() -> AgentCard {
    AgentCard {
        name: "echo".to_string(),
        description: "echoes messages back".to_string(),
        version: "1.0.0".to_string(),
        protocol_version: "0.3.0".to_string(),
        url: "http://localhost:7420/a2a".to_string(),
        preferred_transport: "JSONRPC".to_string(),
        additional_interfaces: Vec::new(),
        capabilities: AgentCapabilities {
            streaming: Some(true),
            push_notifications: Some(true),
            extensions: None,
        },
        security_schemes: None,
        security: None,
        default_input_modes: vec!["text/plain".to_string()],
        default_output_modes: vec!["text/plain".to_string()],
        skills: Vec::new(),
        signatures: None,
        supports_authenticated_extended_card: Some(true),
    }
}

/// Handler used by the transport tests.
///
/// - `message/send` echoes the message parts back as an agent message
/// - `tasks/get`/`tasks/cancel` know the task `"t1"`; `"done"` is terminal
/// - streaming yields task, working update, artifact, final update
/// - push configs live in an in-memory map
#[derive(Default)]
pub struct EchoHandler {
    configs: Mutex<HashMap<(String, String), PushNotificationConfig>>,
}

impl EchoHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestHandler for EchoHandler {
    async fn on_send_message(
        &self,
        params: SendMessageParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<SendMessageResponse> {
        let mut reply = Message::agent_text("");
        reply.parts = params.message.parts;
        reply.context_id = Some(CONTEXT.to_string());
        Ok(SendMessageResponse::Message(reply))
    }

    async fn on_send_message_stream(
        &self,
        _params: SendMessageParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<EventStream> {
        Ok(Box::pin(async_stream::stream! {
            yield Ok(StreamResponse::Task(sample_task(KNOWN_TASK, TaskState::Submitted)));
            yield Ok(StreamResponse::StatusUpdate(TaskStatusUpdateEvent {
                task_id: KNOWN_TASK.to_string(),
                context_id: CONTEXT.to_string(),
                kind: "status-update".to_string(),
                status: TaskStatus::new(TaskState::Working),
                r#final: false,
                metadata: None,
            }));
            yield Ok(StreamResponse::ArtifactUpdate(TaskArtifactUpdateEvent {
                task_id: KNOWN_TASK.to_string(),
                context_id: CONTEXT.to_string(),
                kind: "artifact-update".to_string(),
                artifact: Artifact {
                    artifact_id: "a1".to_string(),
                    name: Some("result".to_string()),
                    description: None,
                    parts: vec![Part::text("hello")],
                    metadata: None,
                    extensions: None,
                },
                append: None,
                last_chunk: Some(true),
                metadata: None,
            }));
            yield Ok(StreamResponse::StatusUpdate(TaskStatusUpdateEvent {
                task_id: KNOWN_TASK.to_string(),
                context_id: CONTEXT.to_string(),
                kind: "status-update".to_string(),
                status: TaskStatus::new(TaskState::Completed),
                r#final: true,
                metadata: None,
            }));
        }))
    }

    async fn on_get_task(
        &self,
        params: GetTaskParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Task> {
        match params.id.as_str() {
            KNOWN_TASK => Ok(sample_task(KNOWN_TASK, TaskState::Working)),
            TERMINAL_TASK => Ok(sample_task(TERMINAL_TASK, TaskState::Completed)),
            other => Err(A2AError::task_not_found(format!("no such task: {other}"))),
        }
    }

    async fn on_cancel_task(
        &self,
        params: CancelTaskParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Task> {
        match params.id.as_str() {
            KNOWN_TASK => Ok(sample_task(KNOWN_TASK, TaskState::Canceled)),
            TERMINAL_TASK => Err(A2AError::task_not_cancelable(format!(
                "task {TERMINAL_TASK} is already terminal"
            ))),
            other => Err(A2AError::task_not_found(format!("no such task: {other}"))),
        }
    }

    async fn on_resubscribe(
        &self,
        params: TaskIdParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<EventStream> {
        if params.id != KNOWN_TASK {
            return Err(A2AError::task_not_found(format!(
                "no such task: {}",
                params.id
            )));
        }
        Ok(Box::pin(async_stream::stream! {
            yield Ok(StreamResponse::StatusUpdate(TaskStatusUpdateEvent {
                task_id: KNOWN_TASK.to_string(),
                context_id: CONTEXT.to_string(),
                kind: "status-update".to_string(),
                status: TaskStatus::new(TaskState::Working),
                r#final: false,
                metadata: None,
            }));
            yield Ok(StreamResponse::StatusUpdate(TaskStatusUpdateEvent {
                task_id: KNOWN_TASK.to_string(),
                context_id: CONTEXT.to_string(),
                kind: "status-update".to_string(),
                status: TaskStatus::new(TaskState::Completed),
                r#final: true,
                metadata: None,
            }));
        }))
    }

    async fn on_set_task_push_notification_config(
        &self,
        params: SetTaskPushNotificationConfigParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<TaskPushNotificationConfig> {
        let mut config = params.push_notification_config;
        let config_id = config.id.clone().unwrap_or_else(|| params.task_id.clone());
        config.id = Some(config_id.clone());
        self.configs
            .lock()
            .unwrap()
            .insert((params.task_id.clone(), config_id), config.clone());
        Ok(TaskPushNotificationConfig {
            task_id: params.task_id,
            push_notification_config: config,
        })
    }

    async fn on_get_task_push_notification_config(
        &self,
        params: GetTaskPushNotificationConfigParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<TaskPushNotificationConfig> {
        self.configs
            .lock()
            .unwrap()
            .get(&(params.id.clone(), params.push_notification_config_id.clone()))
            .cloned()
            .map(|config| TaskPushNotificationConfig {
                task_id: params.id.clone(),
                push_notification_config: config,
            })
            .ok_or_else(|| {
                A2AError::task_not_found(format!(
                    "no push config {} for task {}",
                    params.push_notification_config_id, params.id
                ))
            })
    }

    async fn on_list_task_push_notification_configs(
        &self,
        params: ListTaskPushNotificationConfigParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Vec<TaskPushNotificationConfig>> {
        let configs = self.configs.lock().unwrap();
        let mut out: Vec<TaskPushNotificationConfig> = configs
            .iter()
            .filter(|((task_id, _), _)| *task_id == params.id)
            .map(|((task_id, _), config)| TaskPushNotificationConfig {
                task_id: task_id.clone(),
                push_notification_config: config.clone(),
            })
            .collect();
        out.sort_by(|a, b| {
            a.push_notification_config
                .id
                .cmp(&b.push_notification_config.id)
        });
        Ok(out)
    }

    async fn on_delete_task_push_notification_config(
        &self,
        params: DeleteTaskPushNotificationConfigParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<()> {
        self.configs
            .lock()
            .unwrap()
            .remove(&(params.id, params.push_notification_config_id));
        Ok(())
    }

    async fn on_get_extended_agent_card(
        &self,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<AgentCard> {
        let mut card = sample_card();
        card.name = "echo (extended)".to_string();
        Ok(card)
    }
}

/// A message with a single text part and a fixed id, for parity assertions.
pub fn user_message(text: &str) -> Message {
    let mut message = Message::user_text(text);
    message.message_id = "m-fixed".to_string();
    message
}
