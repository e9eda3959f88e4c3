//! gRPC binding codec: domain types to and from the protobuf wire types
//! in [`crate::grpc::pb`], plus the status-code mapping in both directions.
//!
//! Conversions are pure and strict. Protobuf one-ofs with no arm set and
//! malformed resource names reject with `InvalidParams`; unrecognized enum
//! numbers fall back to the domain `Unknown`/`Unspecified` members instead
//! of failing. File bytes are raw on this binding and base64 on the text
//! bindings, so byte parts re-encode when crossing.

use base64::Engine;
use tonic::Code;

use crate::codec::names::{parse_push_config_name, parse_task_name, push_config_name, task_name};
use crate::error::{A2AError, A2AResult};
use crate::grpc::pb;
use crate::handler::Method;
use crate::types::{
    AgentCapabilities, AgentCard, AgentCardSignature, AgentExtension, AgentInterface, AgentSkill,
    Artifact, CancelTaskParams, DeleteTaskPushNotificationConfigParams, FileContent,
    FileWithBytes, FileWithUri, GetTaskParams, GetTaskPushNotificationConfigParams,
    ListTaskPushNotificationConfigParams, ListTaskPushNotificationConfigResponse, Message, Part,
    PushNotificationAuthenticationInfo, PushNotificationConfig, Role, SecurityScheme,
    SendMessageConfiguration, SendMessageParams, SendMessageResponse,
    SetTaskPushNotificationConfigParams, StreamResponse, Task, TaskArtifactUpdateEvent,
    TaskIdParams, TaskPushNotificationConfig, TaskState, TaskStatus, TaskStatusUpdateEvent,
};

// ---------------------------------------------------------------------------
// google.protobuf.Struct <-> serde_json::Value
// ---------------------------------------------------------------------------

/// Convert a protobuf `Struct` into a JSON object value.
pub fn struct_to_value(s: &prost_types::Struct) -> serde_json::Value {
    let map = s
        .fields
        .iter()
        .map(|(k, v)| (k.clone(), prost_value_to_json(v)))
        .collect();
    serde_json::Value::Object(map)
}

/// Convert a JSON value into a protobuf `Struct`.
///
/// The value must be a JSON object; anything else is `InvalidParams`
/// because `google.protobuf.Struct` cannot carry it.
pub fn value_to_struct(value: &serde_json::Value) -> A2AResult<prost_types::Struct> {
    match value {
        serde_json::Value::Object(map) => Ok(prost_types::Struct {
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_prost_value(v)))
                .collect(),
        }),
        other => Err(A2AError::invalid_params(format!(
            "expected a JSON object for a protobuf Struct, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

fn prost_value_to_json(value: &prost_types::Value) -> serde_json::Value {
    use prost_types::value::Kind;
    match &value.kind {
        None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
        Some(Kind::NumberValue(n)) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::StringValue(s)) => serde_json::Value::String(s.clone()),
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(*b),
        Some(Kind::StructValue(s)) => struct_to_value(s),
        Some(Kind::ListValue(list)) => {
            serde_json::Value::Array(list.values.iter().map(prost_value_to_json).collect())
        }
    }
}

fn json_to_prost_value(value: &serde_json::Value) -> prost_types::Value {
    use prost_types::value::Kind;
    let kind = match value {
        serde_json::Value::Null => Kind::NullValue(0),
        serde_json::Value::Bool(b) => Kind::BoolValue(*b),
        // Struct numbers are doubles; integers beyond 2^53 lose precision.
        serde_json::Value::Number(n) => Kind::NumberValue(n.as_f64().unwrap_or(f64::NAN)),
        serde_json::Value::String(s) => Kind::StringValue(s.clone()),
        serde_json::Value::Array(items) => Kind::ListValue(prost_types::ListValue {
            values: items.iter().map(json_to_prost_value).collect(),
        }),
        serde_json::Value::Object(map) => Kind::StructValue(prost_types::Struct {
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), json_to_prost_value(v)))
                .collect(),
        }),
    };
    prost_types::Value { kind: Some(kind) }
}

fn metadata_to_proto(metadata: &Option<serde_json::Value>) -> A2AResult<Option<prost_types::Struct>> {
    metadata.as_ref().map(value_to_struct).transpose()
}

fn metadata_from_proto(metadata: &Option<prost_types::Struct>) -> Option<serde_json::Value> {
    metadata.as_ref().map(struct_to_value)
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Map a domain role onto the wire enum. `Unknown`/`Unspecified` encode as 0.
pub fn role_to_proto(role: Role) -> pb::Role {
    match role {
        Role::User => pb::Role::User,
        Role::Agent => pb::Role::Agent,
        Role::Unspecified => pb::Role::Unspecified,
    }
}

/// Decode a wire role number; unrecognized numbers become `Unspecified`.
pub fn role_from_proto(role: i32) -> Role {
    match pb::Role::try_from(role).unwrap_or(pb::Role::Unspecified) {
        pb::Role::User => Role::User,
        pb::Role::Agent => Role::Agent,
        pb::Role::Unspecified => Role::Unspecified,
    }
}

/// Map a domain task state onto the wire enum.
pub fn task_state_to_proto(state: TaskState) -> pb::TaskState {
    match state {
        TaskState::Submitted => pb::TaskState::Submitted,
        TaskState::Working => pb::TaskState::Working,
        TaskState::Completed => pb::TaskState::Completed,
        TaskState::Failed => pb::TaskState::Failed,
        TaskState::Canceled => pb::TaskState::Cancelled,
        TaskState::InputRequired => pb::TaskState::InputRequired,
        TaskState::Rejected => pb::TaskState::Rejected,
        TaskState::AuthRequired => pb::TaskState::AuthRequired,
        TaskState::Unknown => pb::TaskState::Unspecified,
    }
}

/// Decode a wire task state number; unrecognized numbers become `Unknown`.
pub fn task_state_from_proto(state: i32) -> TaskState {
    match pb::TaskState::try_from(state).unwrap_or(pb::TaskState::Unspecified) {
        pb::TaskState::Submitted => TaskState::Submitted,
        pb::TaskState::Working => TaskState::Working,
        pb::TaskState::Completed => TaskState::Completed,
        pb::TaskState::Failed => TaskState::Failed,
        pb::TaskState::Cancelled => TaskState::Canceled,
        pb::TaskState::InputRequired => TaskState::InputRequired,
        pb::TaskState::Rejected => TaskState::Rejected,
        pb::TaskState::AuthRequired => TaskState::AuthRequired,
        pb::TaskState::Unspecified => TaskState::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

fn timestamp_to_proto(timestamp: &str) -> A2AResult<prost_types::Timestamp> {
    let parsed = chrono::DateTime::parse_from_rfc3339(timestamp).map_err(|e| {
        A2AError::invalid_params(format!("invalid RFC 3339 timestamp '{}': {}", timestamp, e))
    })?;
    Ok(prost_types::Timestamp {
        seconds: parsed.timestamp(),
        nanos: parsed.timestamp_subsec_nanos() as i32,
    })
}

fn timestamp_from_proto(timestamp: &prost_types::Timestamp) -> Option<String> {
    let nanos = u32::try_from(timestamp.nanos).ok()?;
    chrono::DateTime::<chrono::Utc>::from_timestamp(timestamp.seconds, nanos)
        .map(|dt| dt.to_rfc3339())
}

// ---------------------------------------------------------------------------
// Parts, messages, tasks, artifacts
// ---------------------------------------------------------------------------

fn opt_string(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Encode a content part. Base64 byte payloads become raw bytes.
pub fn part_to_proto(part: Part) -> A2AResult<pb::Part> {
    let (content, metadata) = match part {
        Part::Text { text, metadata } => (pb::part::Content::Text(text), metadata),
        Part::File { file, metadata } => {
            let file_part = match file {
                FileContent::Bytes(f) => {
                    let raw = base64::engine::general_purpose::STANDARD
                        .decode(&f.bytes)
                        .map_err(|e| {
                            A2AError::invalid_params(format!(
                                "file part bytes are not valid base64: {}",
                                e
                            ))
                        })?;
                    pb::FilePart {
                        mime_type: f.mime_type.unwrap_or_default(),
                        name: f.name.unwrap_or_default(),
                        file: Some(pb::file_part::File::FileWithBytes(raw)),
                    }
                }
                FileContent::Uri(f) => pb::FilePart {
                    mime_type: f.mime_type.unwrap_or_default(),
                    name: f.name.unwrap_or_default(),
                    file: Some(pb::file_part::File::FileWithUri(f.uri)),
                },
            };
            (pb::part::Content::File(file_part), metadata)
        }
        Part::Data { data, metadata } => (
            pb::part::Content::Data(pb::DataPart {
                data: Some(value_to_struct(&data)?),
            }),
            metadata,
        ),
    };
    Ok(pb::Part {
        metadata: metadata_to_proto(&metadata)?,
        content: Some(content),
    })
}

/// Decode a content part. Raw bytes become base64.
pub fn part_from_proto(part: pb::Part) -> A2AResult<Part> {
    let metadata = metadata_from_proto(&part.metadata);
    let content = part
        .content
        .ok_or_else(|| A2AError::invalid_params("part has no content arm set"))?;
    Ok(match content {
        pb::part::Content::Text(text) => Part::Text { text, metadata },
        pb::part::Content::File(file_part) => {
            let mime_type = opt_string(file_part.mime_type);
            let name = opt_string(file_part.name);
            let file = match file_part
                .file
                .ok_or_else(|| A2AError::invalid_params("file part has no payload arm set"))?
            {
                pb::file_part::File::FileWithBytes(raw) => FileContent::Bytes(FileWithBytes {
                    bytes: base64::engine::general_purpose::STANDARD.encode(raw),
                    mime_type,
                    name,
                }),
                pb::file_part::File::FileWithUri(uri) => FileContent::Uri(FileWithUri {
                    uri,
                    mime_type,
                    name,
                }),
            };
            Part::File { file, metadata }
        }
        pb::part::Content::Data(data_part) => Part::Data {
            data: data_part
                .data
                .as_ref()
                .map(struct_to_value)
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            metadata,
        },
    })
}

pub fn message_to_proto(message: Message) -> A2AResult<pb::Message> {
    Ok(pb::Message {
        message_id: message.message_id,
        context_id: message.context_id.unwrap_or_default(),
        task_id: message.task_id.unwrap_or_default(),
        role: role_to_proto(message.role) as i32,
        content: message
            .parts
            .into_iter()
            .map(part_to_proto)
            .collect::<A2AResult<Vec<_>>>()?,
        metadata: metadata_to_proto(&message.metadata)?,
        extensions: message.extensions.unwrap_or_default(),
    })
}

pub fn message_from_proto(message: pb::Message) -> A2AResult<Message> {
    Ok(Message {
        message_id: message.message_id,
        role: role_from_proto(message.role),
        kind: "message".to_string(),
        parts: message
            .content
            .into_iter()
            .map(part_from_proto)
            .collect::<A2AResult<Vec<_>>>()?,
        context_id: opt_string(message.context_id),
        task_id: opt_string(message.task_id),
        metadata: metadata_from_proto(&message.metadata),
        extensions: if message.extensions.is_empty() {
            None
        } else {
            Some(message.extensions)
        },
    })
}

pub fn task_status_to_proto(status: TaskStatus) -> A2AResult<pb::TaskStatus> {
    Ok(pb::TaskStatus {
        state: task_state_to_proto(status.state) as i32,
        update: status.message.map(message_to_proto).transpose()?,
        timestamp: status
            .timestamp
            .as_deref()
            .map(timestamp_to_proto)
            .transpose()?,
    })
}

pub fn task_status_from_proto(status: pb::TaskStatus) -> A2AResult<TaskStatus> {
    Ok(TaskStatus {
        state: task_state_from_proto(status.state),
        message: status.update.map(message_from_proto).transpose()?,
        timestamp: status.timestamp.as_ref().and_then(timestamp_from_proto),
    })
}

pub fn artifact_to_proto(artifact: Artifact) -> A2AResult<pb::Artifact> {
    Ok(pb::Artifact {
        artifact_id: artifact.artifact_id,
        name: artifact.name.unwrap_or_default(),
        description: artifact.description.unwrap_or_default(),
        parts: artifact
            .parts
            .into_iter()
            .map(part_to_proto)
            .collect::<A2AResult<Vec<_>>>()?,
        metadata: metadata_to_proto(&artifact.metadata)?,
        extensions: artifact.extensions.unwrap_or_default(),
    })
}

pub fn artifact_from_proto(artifact: pb::Artifact) -> A2AResult<Artifact> {
    Ok(Artifact {
        artifact_id: artifact.artifact_id,
        name: opt_string(artifact.name),
        description: opt_string(artifact.description),
        parts: artifact
            .parts
            .into_iter()
            .map(part_from_proto)
            .collect::<A2AResult<Vec<_>>>()?,
        metadata: metadata_from_proto(&artifact.metadata),
        extensions: if artifact.extensions.is_empty() {
            None
        } else {
            Some(artifact.extensions)
        },
    })
}

pub fn task_to_proto(task: Task) -> A2AResult<pb::Task> {
    Ok(pb::Task {
        id: task.id,
        context_id: task.context_id,
        status: Some(task_status_to_proto(task.status)?),
        artifacts: task
            .artifacts
            .unwrap_or_default()
            .into_iter()
            .map(artifact_to_proto)
            .collect::<A2AResult<Vec<_>>>()?,
        history: task
            .history
            .unwrap_or_default()
            .into_iter()
            .map(message_to_proto)
            .collect::<A2AResult<Vec<_>>>()?,
        metadata: metadata_to_proto(&task.metadata)?,
    })
}

pub fn task_from_proto(task: pb::Task) -> A2AResult<Task> {
    let status = task
        .status
        .ok_or_else(|| A2AError::invalid_params("task has no status"))?;
    let artifacts = task
        .artifacts
        .into_iter()
        .map(artifact_from_proto)
        .collect::<A2AResult<Vec<_>>>()?;
    let history = task
        .history
        .into_iter()
        .map(message_from_proto)
        .collect::<A2AResult<Vec<_>>>()?;
    Ok(Task {
        id: task.id,
        context_id: task.context_id,
        kind: "task".to_string(),
        status: task_status_from_proto(status)?,
        artifacts: if artifacts.is_empty() {
            None
        } else {
            Some(artifacts)
        },
        history: if history.is_empty() { None } else { Some(history) },
        metadata: metadata_from_proto(&task.metadata),
    })
}

// ---------------------------------------------------------------------------
// Streaming events
// ---------------------------------------------------------------------------

pub fn status_update_to_proto(event: TaskStatusUpdateEvent) -> A2AResult<pb::TaskStatusUpdateEvent> {
    Ok(pb::TaskStatusUpdateEvent {
        task_id: event.task_id,
        context_id: event.context_id,
        status: Some(task_status_to_proto(event.status)?),
        r#final: event.r#final,
        metadata: metadata_to_proto(&event.metadata)?,
    })
}

pub fn status_update_from_proto(
    event: pb::TaskStatusUpdateEvent,
) -> A2AResult<TaskStatusUpdateEvent> {
    let status = event
        .status
        .ok_or_else(|| A2AError::invalid_params("status update event has no status"))?;
    Ok(TaskStatusUpdateEvent {
        task_id: event.task_id,
        context_id: event.context_id,
        kind: "status-update".to_string(),
        status: task_status_from_proto(status)?,
        r#final: event.r#final,
        metadata: metadata_from_proto(&event.metadata),
    })
}

pub fn artifact_update_to_proto(
    event: TaskArtifactUpdateEvent,
) -> A2AResult<pb::TaskArtifactUpdateEvent> {
    Ok(pb::TaskArtifactUpdateEvent {
        task_id: event.task_id,
        context_id: event.context_id,
        artifact: Some(artifact_to_proto(event.artifact)?),
        append: event.append.unwrap_or(false),
        last_chunk: event.last_chunk.unwrap_or(false),
        metadata: metadata_to_proto(&event.metadata)?,
    })
}

pub fn artifact_update_from_proto(
    event: pb::TaskArtifactUpdateEvent,
) -> A2AResult<TaskArtifactUpdateEvent> {
    let artifact = event
        .artifact
        .ok_or_else(|| A2AError::invalid_params("artifact update event has no artifact"))?;
    Ok(TaskArtifactUpdateEvent {
        task_id: event.task_id,
        context_id: event.context_id,
        kind: "artifact-update".to_string(),
        artifact: artifact_from_proto(artifact)?,
        append: if event.append { Some(true) } else { None },
        last_chunk: if event.last_chunk { Some(true) } else { None },
        metadata: metadata_from_proto(&event.metadata),
    })
}

pub fn stream_response_to_proto(event: StreamResponse) -> A2AResult<pb::StreamResponse> {
    let payload = match event {
        StreamResponse::Task(task) => pb::stream_response::Payload::Task(task_to_proto(task)?),
        StreamResponse::Message(msg) => {
            pb::stream_response::Payload::Msg(message_to_proto(msg)?)
        }
        StreamResponse::StatusUpdate(event) => {
            pb::stream_response::Payload::StatusUpdate(status_update_to_proto(event)?)
        }
        StreamResponse::ArtifactUpdate(event) => {
            pb::stream_response::Payload::ArtifactUpdate(artifact_update_to_proto(event)?)
        }
    };
    Ok(pb::StreamResponse {
        payload: Some(payload),
    })
}

pub fn stream_response_from_proto(event: pb::StreamResponse) -> A2AResult<StreamResponse> {
    let payload = event
        .payload
        .ok_or_else(|| A2AError::invalid_params("stream response has no payload arm set"))?;
    Ok(match payload {
        pb::stream_response::Payload::Task(task) => StreamResponse::Task(task_from_proto(task)?),
        pb::stream_response::Payload::Msg(msg) => {
            StreamResponse::Message(message_from_proto(msg)?)
        }
        pb::stream_response::Payload::StatusUpdate(event) => {
            StreamResponse::StatusUpdate(status_update_from_proto(event)?)
        }
        pb::stream_response::Payload::ArtifactUpdate(event) => {
            StreamResponse::ArtifactUpdate(artifact_update_from_proto(event)?)
        }
    })
}

pub fn send_message_response_to_proto(
    response: SendMessageResponse,
) -> A2AResult<pb::SendMessageResponse> {
    let payload = match response {
        SendMessageResponse::Task(task) => {
            pb::send_message_response::Payload::Task(task_to_proto(task)?)
        }
        SendMessageResponse::Message(msg) => {
            pb::send_message_response::Payload::Msg(message_to_proto(msg)?)
        }
    };
    Ok(pb::SendMessageResponse {
        payload: Some(payload),
    })
}

pub fn send_message_response_from_proto(
    response: pb::SendMessageResponse,
) -> A2AResult<SendMessageResponse> {
    let payload = response
        .payload
        .ok_or_else(|| A2AError::invalid_params("send message response has no payload arm set"))?;
    Ok(match payload {
        pb::send_message_response::Payload::Task(task) => {
            SendMessageResponse::Task(task_from_proto(task)?)
        }
        pb::send_message_response::Payload::Msg(msg) => {
            SendMessageResponse::Message(message_from_proto(msg)?)
        }
    })
}

// ---------------------------------------------------------------------------
// Push notification configs
// ---------------------------------------------------------------------------

pub fn push_config_to_proto(config: PushNotificationConfig) -> pb::PushNotificationConfig {
    pb::PushNotificationConfig {
        id: config.id.unwrap_or_default(),
        url: config.url,
        token: config.token.unwrap_or_default(),
        authentication: config.authentication.map(|auth| pb::AuthenticationInfo {
            schemes: auth.schemes,
            credentials: auth.credentials.unwrap_or_default(),
        }),
    }
}

pub fn push_config_from_proto(config: pb::PushNotificationConfig) -> PushNotificationConfig {
    PushNotificationConfig {
        id: opt_string(config.id),
        url: config.url,
        token: opt_string(config.token),
        authentication: config
            .authentication
            .map(|auth| PushNotificationAuthenticationInfo {
                schemes: auth.schemes,
                credentials: opt_string(auth.credentials),
            }),
    }
}

/// The config ID used in resource names when the config carries none.
/// Defaults to the task ID, matching REST's defaulting rule.
fn effective_config_id(config: &PushNotificationConfig, task_id: &str) -> String {
    config.id.clone().unwrap_or_else(|| task_id.to_string())
}

pub fn task_push_config_to_proto(
    config: TaskPushNotificationConfig,
) -> pb::TaskPushNotificationConfig {
    let config_id = effective_config_id(&config.push_notification_config, &config.task_id);
    pb::TaskPushNotificationConfig {
        name: push_config_name(&config.task_id, &config_id),
        push_notification_config: Some(push_config_to_proto(config.push_notification_config)),
    }
}

pub fn task_push_config_from_proto(
    config: pb::TaskPushNotificationConfig,
) -> A2AResult<TaskPushNotificationConfig> {
    let (task_id, config_id) = parse_push_config_name(&config.name)?;
    let mut push_notification_config = config
        .push_notification_config
        .map(push_config_from_proto)
        .ok_or_else(|| {
            A2AError::invalid_params("task push notification config has no config payload")
        })?;
    if push_notification_config.id.is_none() {
        push_notification_config.id = Some(config_id);
    }
    Ok(TaskPushNotificationConfig {
        task_id,
        push_notification_config,
    })
}

// ---------------------------------------------------------------------------
// Operation params <-> request envelopes
// ---------------------------------------------------------------------------

pub fn send_message_params_to_proto(params: SendMessageParams) -> A2AResult<pb::SendMessageRequest> {
    Ok(pb::SendMessageRequest {
        request: Some(message_to_proto(params.message)?),
        configuration: params.configuration.map(|c| pb::SendMessageConfiguration {
            accepted_output_modes: c.accepted_output_modes.unwrap_or_default(),
            push_notification: c.push_notification_config.map(push_config_to_proto),
            history_length: c.history_length.unwrap_or(0),
            blocking: c.blocking.unwrap_or(false),
        }),
        metadata: metadata_to_proto(&params.metadata)?,
    })
}

pub fn send_message_params_from_proto(
    request: pb::SendMessageRequest,
) -> A2AResult<SendMessageParams> {
    let message = request
        .request
        .ok_or_else(|| A2AError::invalid_params("send message request has no message"))?;
    Ok(SendMessageParams {
        message: message_from_proto(message)?,
        configuration: request.configuration.map(|c| SendMessageConfiguration {
            accepted_output_modes: if c.accepted_output_modes.is_empty() {
                None
            } else {
                Some(c.accepted_output_modes)
            },
            push_notification_config: c.push_notification.map(push_config_from_proto),
            history_length: if c.history_length == 0 {
                None
            } else {
                Some(c.history_length)
            },
            blocking: if c.blocking { Some(true) } else { None },
        }),
        metadata: metadata_from_proto(&request.metadata),
    })
}

pub fn get_task_params_to_proto(params: GetTaskParams) -> pb::GetTaskRequest {
    pb::GetTaskRequest {
        name: task_name(&params.id),
        history_length: params.history_length.unwrap_or(0),
    }
}

pub fn get_task_params_from_proto(request: pb::GetTaskRequest) -> A2AResult<GetTaskParams> {
    Ok(GetTaskParams {
        id: parse_task_name(&request.name)?,
        history_length: if request.history_length == 0 {
            None
        } else {
            Some(request.history_length)
        },
        metadata: None,
    })
}

pub fn cancel_task_params_to_proto(params: CancelTaskParams) -> pb::CancelTaskRequest {
    pb::CancelTaskRequest {
        name: task_name(&params.id),
    }
}

pub fn cancel_task_params_from_proto(
    request: pb::CancelTaskRequest,
) -> A2AResult<CancelTaskParams> {
    Ok(CancelTaskParams {
        id: parse_task_name(&request.name)?,
        metadata: None,
    })
}

pub fn subscription_params_to_proto(params: TaskIdParams) -> pb::TaskSubscriptionRequest {
    pb::TaskSubscriptionRequest {
        name: task_name(&params.id),
    }
}

pub fn subscription_params_from_proto(
    request: pb::TaskSubscriptionRequest,
) -> A2AResult<TaskIdParams> {
    Ok(TaskIdParams {
        id: parse_task_name(&request.name)?,
        metadata: None,
    })
}

pub fn set_push_config_params_to_proto(
    params: SetTaskPushNotificationConfigParams,
) -> pb::CreateTaskPushNotificationConfigRequest {
    let config_id = effective_config_id(&params.push_notification_config, &params.task_id);
    let config = TaskPushNotificationConfig {
        task_id: params.task_id.clone(),
        push_notification_config: params.push_notification_config,
    };
    pb::CreateTaskPushNotificationConfigRequest {
        parent: task_name(&params.task_id),
        config_id,
        config: Some(task_push_config_to_proto(config)),
    }
}

pub fn set_push_config_params_from_proto(
    request: pb::CreateTaskPushNotificationConfigRequest,
) -> A2AResult<SetTaskPushNotificationConfigParams> {
    let task_id = parse_task_name(&request.parent)?;
    let config = request.config.ok_or_else(|| {
        A2AError::invalid_params("create push notification config request has no config")
    })?;
    let decoded = task_push_config_from_proto(config)?;
    Ok(SetTaskPushNotificationConfigParams {
        task_id,
        push_notification_config: decoded.push_notification_config,
    })
}

pub fn get_push_config_params_to_proto(
    params: &GetTaskPushNotificationConfigParams,
) -> pb::GetTaskPushNotificationConfigRequest {
    pb::GetTaskPushNotificationConfigRequest {
        name: push_config_name(&params.id, &params.push_notification_config_id),
    }
}

pub fn get_push_config_params_from_proto(
    request: pb::GetTaskPushNotificationConfigRequest,
) -> A2AResult<GetTaskPushNotificationConfigParams> {
    let (id, config_id) = parse_push_config_name(&request.name)?;
    Ok(GetTaskPushNotificationConfigParams {
        id,
        push_notification_config_id: config_id,
        metadata: None,
    })
}

pub fn list_push_config_params_to_proto(
    params: &ListTaskPushNotificationConfigParams,
) -> pb::ListTaskPushNotificationConfigRequest {
    pb::ListTaskPushNotificationConfigRequest {
        parent: task_name(&params.id),
        page_size: params.page_size.unwrap_or(0),
        page_token: params.page_token.clone().unwrap_or_default(),
    }
}

pub fn list_push_config_params_from_proto(
    request: pb::ListTaskPushNotificationConfigRequest,
) -> A2AResult<ListTaskPushNotificationConfigParams> {
    Ok(ListTaskPushNotificationConfigParams {
        id: parse_task_name(&request.parent)?,
        page_size: if request.page_size == 0 {
            None
        } else {
            Some(request.page_size)
        },
        page_token: opt_string(request.page_token),
        metadata: None,
    })
}

pub fn delete_push_config_params_to_proto(
    params: &DeleteTaskPushNotificationConfigParams,
) -> pb::DeleteTaskPushNotificationConfigRequest {
    pb::DeleteTaskPushNotificationConfigRequest {
        name: push_config_name(&params.id, &params.push_notification_config_id),
    }
}

pub fn delete_push_config_params_from_proto(
    request: pb::DeleteTaskPushNotificationConfigRequest,
) -> A2AResult<DeleteTaskPushNotificationConfigParams> {
    let (id, config_id) = parse_push_config_name(&request.name)?;
    Ok(DeleteTaskPushNotificationConfigParams {
        id,
        push_notification_config_id: config_id,
        metadata: None,
    })
}

pub fn list_push_config_response_to_proto(
    configs: Vec<TaskPushNotificationConfig>,
    next_page_token: Option<String>,
) -> pb::ListTaskPushNotificationConfigResponse {
    pb::ListTaskPushNotificationConfigResponse {
        configs: configs.into_iter().map(task_push_config_to_proto).collect(),
        next_page_token: next_page_token.unwrap_or_default(),
    }
}

pub fn list_push_config_response_from_proto(
    response: pb::ListTaskPushNotificationConfigResponse,
) -> A2AResult<ListTaskPushNotificationConfigResponse> {
    Ok(ListTaskPushNotificationConfigResponse {
        configs: response
            .configs
            .into_iter()
            .map(task_push_config_from_proto)
            .collect::<A2AResult<Vec<_>>>()?,
        next_page_token: opt_string(response.next_page_token),
    })
}

// ---------------------------------------------------------------------------
// Agent card
// ---------------------------------------------------------------------------

pub fn agent_card_to_proto(card: AgentCard) -> A2AResult<pb::AgentCard> {
    let security_schemes = card
        .security_schemes
        .unwrap_or_default()
        .into_iter()
        .map(|(name, scheme)| {
            let value = serde_json::to_value(&scheme)?;
            Ok((name, value_to_struct(&value)?))
        })
        .collect::<A2AResult<_>>()?;
    let security = card
        .security
        .unwrap_or_default()
        .into_iter()
        .map(|requirement| {
            let value = serde_json::to_value(&requirement)?;
            value_to_struct(&value)
        })
        .collect::<A2AResult<Vec<_>>>()?;
    Ok(pb::AgentCard {
        protocol_version: card.protocol_version,
        name: card.name,
        description: card.description,
        url: card.url,
        preferred_transport: card.preferred_transport,
        additional_interfaces: card
            .additional_interfaces
            .into_iter()
            .map(|i| pb::AgentInterface {
                url: i.url,
                transport: i.transport,
            })
            .collect(),
        version: card.version,
        capabilities: Some(pb::AgentCapabilities {
            streaming: card.capabilities.streaming.unwrap_or(false),
            push_notifications: card.capabilities.push_notifications.unwrap_or(false),
            extensions: card
                .capabilities
                .extensions
                .unwrap_or_default()
                .into_iter()
                .map(|e| {
                    Ok(pb::AgentExtension {
                        uri: e.uri,
                        description: e.description.unwrap_or_default(),
                        required: e.required.unwrap_or(false),
                        params: e.params.as_ref().map(value_to_struct).transpose()?,
                    })
                })
                .collect::<A2AResult<Vec<_>>>()?,
        }),
        security_schemes,
        security,
        default_input_modes: card.default_input_modes,
        default_output_modes: card.default_output_modes,
        skills: card
            .skills
            .into_iter()
            .map(|s| pb::AgentSkill {
                id: s.id,
                name: s.name,
                description: s.description,
                tags: s.tags,
                examples: s.examples.unwrap_or_default(),
            })
            .collect(),
        supports_authenticated_extended_card: card
            .supports_authenticated_extended_card
            .unwrap_or(false),
        signatures: card
            .signatures
            .unwrap_or_default()
            .into_iter()
            .map(|s| {
                Ok(pb::AgentCardSignature {
                    protected: s.protected,
                    signature: s.signature,
                    header: s.header.as_ref().map(value_to_struct).transpose()?,
                })
            })
            .collect::<A2AResult<Vec<_>>>()?,
    })
}

pub fn agent_card_from_proto(card: pb::AgentCard) -> A2AResult<AgentCard> {
    let capabilities = card.capabilities.unwrap_or_default();
    let security_schemes = if card.security_schemes.is_empty() {
        None
    } else {
        let schemes = card
            .security_schemes
            .into_iter()
            .map(|(name, s)| {
                let scheme: SecurityScheme = serde_json::from_value(struct_to_value(&s))
                    .map_err(|e| {
                        A2AError::invalid_params(format!("invalid security scheme '{}': {}", name, e))
                    })?;
                Ok((name, scheme))
            })
            .collect::<A2AResult<_>>()?;
        Some(schemes)
    };
    let security = if card.security.is_empty() {
        None
    } else {
        let requirements = card
            .security
            .into_iter()
            .map(|requirement| {
                serde_json::from_value(struct_to_value(&requirement)).map_err(|e| {
                    A2AError::invalid_params(format!("invalid security requirement: {}", e))
                })
            })
            .collect::<A2AResult<Vec<_>>>()?;
        Some(requirements)
    };
    Ok(AgentCard {
        name: card.name,
        description: card.description,
        version: card.version,
        protocol_version: card.protocol_version,
        url: card.url,
        preferred_transport: card.preferred_transport,
        additional_interfaces: card
            .additional_interfaces
            .into_iter()
            .map(|i| AgentInterface {
                url: i.url,
                transport: i.transport,
            })
            .collect(),
        capabilities: AgentCapabilities {
            streaming: if capabilities.streaming { Some(true) } else { None },
            push_notifications: if capabilities.push_notifications {
                Some(true)
            } else {
                None
            },
            extensions: if capabilities.extensions.is_empty() {
                None
            } else {
                Some(
                    capabilities
                        .extensions
                        .into_iter()
                        .map(|e| AgentExtension {
                            uri: e.uri,
                            description: opt_string(e.description),
                            required: if e.required { Some(true) } else { None },
                            params: e.params.as_ref().map(struct_to_value),
                        })
                        .collect(),
                )
            },
        },
        security_schemes,
        security,
        default_input_modes: card.default_input_modes,
        default_output_modes: card.default_output_modes,
        skills: card
            .skills
            .into_iter()
            .map(|s| AgentSkill {
                id: s.id,
                name: s.name,
                description: s.description,
                tags: s.tags,
                examples: if s.examples.is_empty() {
                    None
                } else {
                    Some(s.examples)
                },
            })
            .collect(),
        signatures: if card.signatures.is_empty() {
            None
        } else {
            Some(
                card.signatures
                    .into_iter()
                    .map(|s| AgentCardSignature {
                        protected: s.protected,
                        signature: s.signature,
                        header: s.header.as_ref().map(struct_to_value),
                    })
                    .collect(),
            )
        },
        supports_authenticated_extended_card: if card.supports_authenticated_extended_card {
            Some(true)
        } else {
            None
        },
    })
}

// ---------------------------------------------------------------------------
// Status mapping
// ---------------------------------------------------------------------------

/// Forward mapping: canonical error to gRPC status.
///
/// Many-to-one; the original code is only recoverable through the
/// method-aware reverse mapping.
pub fn status_from_error(err: &A2AError) -> tonic::Status {
    let code = match err {
        A2AError::ParseError { .. }
        | A2AError::InvalidRequest { .. }
        | A2AError::InvalidParams { .. }
        | A2AError::ContentTypeNotSupported { .. } => Code::InvalidArgument,
        A2AError::MethodNotFound { .. }
        | A2AError::PushNotificationNotSupported { .. }
        | A2AError::UnsupportedOperation { .. } => Code::Unimplemented,
        A2AError::TaskNotFound { .. } => Code::NotFound,
        A2AError::TaskNotCancelable { .. }
        | A2AError::AuthenticatedExtendedCardNotConfigured { .. } => Code::FailedPrecondition,
        _ => Code::Internal,
    };
    tonic::Status::new(code, err.to_string())
}

/// Reverse mapping: gRPC status to canonical error, using the method for
/// context where one native code covers several canonical ones.
pub fn error_from_status(status: tonic::Status, method: Method) -> A2AError {
    let message = status.message().to_string();
    match status.code() {
        Code::NotFound => A2AError::task_not_found(message),
        Code::InvalidArgument => A2AError::invalid_params(message),
        Code::FailedPrecondition => match method {
            Method::CancelTask => A2AError::task_not_cancelable(message),
            Method::ExtendedAgentCard => {
                A2AError::authenticated_extended_card_not_configured(message)
            }
            _ => A2AError::Other(format!("FailedPrecondition: {}", message)),
        },
        Code::Unimplemented => {
            if method.is_push_config() {
                A2AError::push_notification_not_supported(message)
            } else {
                A2AError::unsupported_operation(message)
            }
        }
        Code::Internal => A2AError::internal_error(message),
        Code::DeadlineExceeded => A2AError::Timeout(message),
        Code::Unavailable => A2AError::Transport(message),
        other => A2AError::Other(format!("{:?}: {}", other, message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn struct_value_round_trip() {
        let value = serde_json::json!({
            "nested": {"list": [1.0, "two", true, null]},
            "flag": false
        });
        let s = value_to_struct(&value).unwrap();
        assert_eq!(struct_to_value(&s), value);
    }

    #[test]
    fn value_to_struct_rejects_non_objects() {
        assert!(value_to_struct(&serde_json::json!([1, 2])).is_err());
        assert!(value_to_struct(&serde_json::json!("scalar")).is_err());
    }

    #[test]
    fn unknown_enum_numbers_fall_back() {
        assert_eq!(task_state_from_proto(99), TaskState::Unknown);
        assert_eq!(role_from_proto(42), Role::Unspecified);
    }

    #[test]
    fn file_bytes_cross_binding_recoding() {
        // base64 on the text side, raw bytes on the wire.
        let part = Part::file_from_bytes("aGVsbG8=", None, Some("text/plain".into()));
        let proto = part_to_proto(part.clone()).unwrap();
        match &proto.content {
            Some(pb::part::Content::File(f)) => match &f.file {
                Some(pb::file_part::File::FileWithBytes(raw)) => assert_eq!(raw, b"hello"),
                other => panic!("wrong arm: {:?}", other),
            },
            other => panic!("wrong arm: {:?}", other),
        }
        assert_eq!(part_from_proto(proto).unwrap(), part);
    }

    #[test]
    fn invalid_base64_is_invalid_params() {
        let part = Part::file_from_bytes("!!!not-base64!!!", None, None);
        let err = part_to_proto(part).unwrap_err();
        assert!(matches!(err, A2AError::InvalidParams { .. }));
    }

    #[test]
    fn empty_oneof_is_invalid_params() {
        let err = part_from_proto(pb::Part {
            metadata: None,
            content: None,
        })
        .unwrap_err();
        assert!(matches!(err, A2AError::InvalidParams { .. }));

        let err = stream_response_from_proto(pb::StreamResponse { payload: None }).unwrap_err();
        assert!(matches!(err, A2AError::InvalidParams { .. }));
    }

    #[test]
    fn status_mapping_is_context_sensitive() {
        let status = tonic::Status::new(Code::FailedPrecondition, "terminal state");
        let err = error_from_status(status, Method::CancelTask);
        assert!(matches!(err, A2AError::TaskNotCancelable { .. }));

        let status = tonic::Status::new(Code::FailedPrecondition, "not configured");
        let err = error_from_status(status, Method::ExtendedAgentCard);
        assert!(matches!(
            err,
            A2AError::AuthenticatedExtendedCardNotConfigured { .. }
        ));

        let status = tonic::Status::new(Code::Unimplemented, "no push");
        let err = error_from_status(status, Method::SetPushConfig);
        assert!(matches!(err, A2AError::PushNotificationNotSupported { .. }));

        let status = tonic::Status::new(Code::Unimplemented, "no stream");
        let err = error_from_status(status, Method::SendMessageStream);
        assert!(matches!(err, A2AError::UnsupportedOperation { .. }));
    }

    #[test]
    fn unrecognized_status_stays_generic() {
        let status = tonic::Status::new(Code::ResourceExhausted, "quota");
        let err = error_from_status(status, Method::GetTask);
        match err {
            A2AError::Other(msg) => assert!(msg.contains("quota")),
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn push_config_resource_name_round_trip() {
        let config = TaskPushNotificationConfig {
            task_id: "t1".to_string(),
            push_notification_config: PushNotificationConfig {
                id: Some("c1".to_string()),
                url: "https://push.example".to_string(),
                token: None,
                authentication: None,
            },
        };
        let proto = task_push_config_to_proto(config.clone());
        assert_eq!(proto.name, "tasks/t1/pushNotificationConfigs/c1");
        assert_eq!(task_push_config_from_proto(proto).unwrap(), config);
    }

    #[test]
    fn task_round_trip() {
        let task = Task {
            id: "t1".to_string(),
            context_id: "c1".to_string(),
            kind: "task".to_string(),
            status: TaskStatus {
                state: TaskState::Working,
                message: None,
                timestamp: Some("2026-01-05T10:00:00+00:00".to_string()),
            },
            artifacts: Some(vec![Artifact {
                artifact_id: "a1".to_string(),
                name: Some("result".to_string()),
                description: None,
                parts: vec![Part::text("done"), Part::data(serde_json::json!({"k": "v"}))],
                metadata: Some(serde_json::json!({"origin": "test"})),
                extensions: None,
            }]),
            history: Some(vec![Message::user_text("go")]),
            metadata: Some(serde_json::json!({"trace": "abc"})),
        };
        let round_tripped = task_from_proto(task_to_proto(task.clone()).unwrap()).unwrap();
        assert_eq!(round_tripped, task);
    }
}
