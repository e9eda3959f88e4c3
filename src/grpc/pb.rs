//! Wire types for the `a2a.v1.A2AService` gRPC interface.
//!
//! Written by hand against the A2A v0.3 protobuf schema rather than
//! generated at build time, so the crate builds without protoc. Field
//! numbers follow the published schema; prost derives provide the
//! encode/decode implementations.
//!
//! These types never leak past [`crate::codec::grpc`]: everything else in
//! the crate works with the domain types in [`crate::types`].

use std::collections::HashMap;

/// Role of a message sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Role {
    /// Unset or unrecognized.
    Unspecified = 0,
    /// Message from the user / client.
    User = 1,
    /// Message from the agent / server.
    Agent = 2,
}

/// Lifecycle state of a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TaskState {
    /// Unset or unrecognized.
    Unspecified = 0,
    /// Received but not started.
    Submitted = 1,
    /// Actively processing.
    Working = 2,
    /// Finished successfully.
    Completed = 3,
    /// Finished with an error.
    Failed = 4,
    /// Canceled before completion.
    Cancelled = 5,
    /// Waiting for user input.
    InputRequired = 6,
    /// Rejected by the agent.
    Rejected = 7,
    /// Waiting for authentication.
    AuthRequired = 8,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Message {
    #[prost(string, tag = "1")]
    pub message_id: String,
    #[prost(string, tag = "2")]
    pub context_id: String,
    #[prost(string, tag = "3")]
    pub task_id: String,
    #[prost(enumeration = "Role", tag = "4")]
    pub role: i32,
    #[prost(message, repeated, tag = "5")]
    pub content: Vec<Part>,
    #[prost(message, optional, tag = "6")]
    pub metadata: Option<::prost_types::Struct>,
    #[prost(string, repeated, tag = "7")]
    pub extensions: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Part {
    #[prost(message, optional, tag = "4")]
    pub metadata: Option<::prost_types::Struct>,
    #[prost(oneof = "part::Content", tags = "1, 2, 3")]
    pub content: Option<part::Content>,
}

pub mod part {
    /// Exactly one content arm must be set.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Content {
        #[prost(string, tag = "1")]
        Text(String),
        #[prost(message, tag = "2")]
        File(super::FilePart),
        #[prost(message, tag = "3")]
        Data(super::DataPart),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FilePart {
    #[prost(string, tag = "3")]
    pub mime_type: String,
    #[prost(string, tag = "4")]
    pub name: String,
    #[prost(oneof = "file_part::File", tags = "1, 2")]
    pub file: Option<file_part::File>,
}

pub mod file_part {
    /// File payload: a URI reference or raw bytes.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum File {
        #[prost(string, tag = "1")]
        FileWithUri(String),
        #[prost(bytes, tag = "2")]
        FileWithBytes(Vec<u8>),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DataPart {
    #[prost(message, optional, tag = "1")]
    pub data: Option<::prost_types::Struct>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskStatus {
    #[prost(enumeration = "TaskState", tag = "1")]
    pub state: i32,
    #[prost(message, optional, tag = "2")]
    pub update: Option<Message>,
    #[prost(message, optional, tag = "3")]
    pub timestamp: Option<::prost_types::Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Task {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub context_id: String,
    #[prost(message, optional, tag = "3")]
    pub status: Option<TaskStatus>,
    #[prost(message, repeated, tag = "4")]
    pub artifacts: Vec<Artifact>,
    #[prost(message, repeated, tag = "5")]
    pub history: Vec<Message>,
    #[prost(message, optional, tag = "6")]
    pub metadata: Option<::prost_types::Struct>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Artifact {
    #[prost(string, tag = "1")]
    pub artifact_id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(message, repeated, tag = "4")]
    pub parts: Vec<Part>,
    #[prost(message, optional, tag = "5")]
    pub metadata: Option<::prost_types::Struct>,
    #[prost(string, repeated, tag = "6")]
    pub extensions: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskStatusUpdateEvent {
    #[prost(string, tag = "1")]
    pub task_id: String,
    #[prost(string, tag = "2")]
    pub context_id: String,
    #[prost(message, optional, tag = "3")]
    pub status: Option<TaskStatus>,
    #[prost(bool, tag = "4")]
    pub r#final: bool,
    #[prost(message, optional, tag = "5")]
    pub metadata: Option<::prost_types::Struct>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskArtifactUpdateEvent {
    #[prost(string, tag = "1")]
    pub task_id: String,
    #[prost(string, tag = "2")]
    pub context_id: String,
    #[prost(message, optional, tag = "3")]
    pub artifact: Option<Artifact>,
    #[prost(bool, tag = "4")]
    pub append: bool,
    #[prost(bool, tag = "5")]
    pub last_chunk: bool,
    #[prost(message, optional, tag = "6")]
    pub metadata: Option<::prost_types::Struct>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PushNotificationConfig {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub url: String,
    #[prost(string, tag = "3")]
    pub token: String,
    #[prost(message, optional, tag = "4")]
    pub authentication: Option<AuthenticationInfo>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthenticationInfo {
    #[prost(string, repeated, tag = "1")]
    pub schemes: Vec<String>,
    #[prost(string, tag = "2")]
    pub credentials: String,
}

/// A push config addressed by its hierarchical resource name:
/// `tasks/{task_id}/pushNotificationConfigs/{config_id}`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskPushNotificationConfig {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub push_notification_config: Option<PushNotificationConfig>,
}

// ---------------------------------------------------------------------------
// Request / response envelopes
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendMessageConfiguration {
    #[prost(string, repeated, tag = "1")]
    pub accepted_output_modes: Vec<String>,
    #[prost(message, optional, tag = "2")]
    pub push_notification: Option<PushNotificationConfig>,
    #[prost(int32, tag = "3")]
    pub history_length: i32,
    #[prost(bool, tag = "4")]
    pub blocking: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendMessageRequest {
    #[prost(message, optional, tag = "1")]
    pub request: Option<Message>,
    #[prost(message, optional, tag = "2")]
    pub configuration: Option<SendMessageConfiguration>,
    #[prost(message, optional, tag = "3")]
    pub metadata: Option<::prost_types::Struct>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendMessageResponse {
    #[prost(oneof = "send_message_response::Payload", tags = "1, 2")]
    pub payload: Option<send_message_response::Payload>,
}

pub mod send_message_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "1")]
        Task(super::Task),
        #[prost(message, tag = "2")]
        Msg(super::Message),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamResponse {
    #[prost(oneof = "stream_response::Payload", tags = "1, 2, 3, 4")]
    pub payload: Option<stream_response::Payload>,
}

pub mod stream_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "1")]
        Task(super::Task),
        #[prost(message, tag = "2")]
        Msg(super::Message),
        #[prost(message, tag = "3")]
        StatusUpdate(super::TaskStatusUpdateEvent),
        #[prost(message, tag = "4")]
        ArtifactUpdate(super::TaskArtifactUpdateEvent),
    }
}

/// `name` is `tasks/{task_id}`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTaskRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(int32, tag = "2")]
    pub history_length: i32,
}

/// `name` is `tasks/{task_id}`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CancelTaskRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// `name` is `tasks/{task_id}`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TaskSubscriptionRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// `parent` is `tasks/{task_id}`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateTaskPushNotificationConfigRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(string, tag = "2")]
    pub config_id: String,
    #[prost(message, optional, tag = "3")]
    pub config: Option<TaskPushNotificationConfig>,
}

/// `name` is `tasks/{task_id}/pushNotificationConfigs/{config_id}`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetTaskPushNotificationConfigRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// `parent` is `tasks/{task_id}`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListTaskPushNotificationConfigRequest {
    #[prost(string, tag = "1")]
    pub parent: String,
    #[prost(int32, tag = "2")]
    pub page_size: i32,
    #[prost(string, tag = "3")]
    pub page_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListTaskPushNotificationConfigResponse {
    #[prost(message, repeated, tag = "1")]
    pub configs: Vec<TaskPushNotificationConfig>,
    #[prost(string, tag = "2")]
    pub next_page_token: String,
}

/// `name` is `tasks/{task_id}/pushNotificationConfigs/{config_id}`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteTaskPushNotificationConfigRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetExtendedAgentCardRequest {}

// ---------------------------------------------------------------------------
// Agent card
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AgentCard {
    #[prost(string, tag = "1")]
    pub protocol_version: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, tag = "4")]
    pub url: String,
    #[prost(string, tag = "5")]
    pub preferred_transport: String,
    #[prost(message, repeated, tag = "6")]
    pub additional_interfaces: Vec<AgentInterface>,
    #[prost(string, tag = "7")]
    pub version: String,
    #[prost(message, optional, tag = "8")]
    pub capabilities: Option<AgentCapabilities>,
    /// Security scheme definitions, carried as JSON structs.
    #[prost(map = "string, message", tag = "9")]
    pub security_schemes: HashMap<String, ::prost_types::Struct>,
    /// Security requirements, each a scheme-name to scope-list map.
    #[prost(message, repeated, tag = "10")]
    pub security: Vec<::prost_types::Struct>,
    #[prost(string, repeated, tag = "11")]
    pub default_input_modes: Vec<String>,
    #[prost(string, repeated, tag = "12")]
    pub default_output_modes: Vec<String>,
    #[prost(message, repeated, tag = "13")]
    pub skills: Vec<AgentSkill>,
    #[prost(bool, tag = "14")]
    pub supports_authenticated_extended_card: bool,
    #[prost(message, repeated, tag = "15")]
    pub signatures: Vec<AgentCardSignature>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AgentInterface {
    #[prost(string, tag = "1")]
    pub url: String,
    #[prost(string, tag = "2")]
    pub transport: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AgentCapabilities {
    #[prost(bool, tag = "1")]
    pub streaming: bool,
    #[prost(bool, tag = "2")]
    pub push_notifications: bool,
    #[prost(message, repeated, tag = "3")]
    pub extensions: Vec<AgentExtension>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AgentExtension {
    #[prost(string, tag = "1")]
    pub uri: String,
    #[prost(string, tag = "2")]
    pub description: String,
    #[prost(bool, tag = "3")]
    pub required: bool,
    #[prost(message, optional, tag = "4")]
    pub params: Option<::prost_types::Struct>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AgentSkill {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, repeated, tag = "4")]
    pub tags: Vec<String>,
    #[prost(string, repeated, tag = "5")]
    pub examples: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AgentCardSignature {
    #[prost(string, tag = "1")]
    pub protected: String,
    #[prost(string, tag = "2")]
    pub signature: String,
    #[prost(message, optional, tag = "3")]
    pub header: Option<::prost_types::Struct>,
}
