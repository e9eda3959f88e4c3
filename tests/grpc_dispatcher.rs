//! gRPC dispatcher tests: proto requests in, proto responses or statuses out.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tonic::metadata::MetadataValue;
use tonic::{Code, Request};

use a2a_bridge::codec::grpc as codec;
use a2a_bridge::context::{ServerCallContext, EXTENSIONS_HEADER};
use a2a_bridge::error::{A2AError, A2AResult};
use a2a_bridge::grpc::pb;
use a2a_bridge::handler::RequestHandler;
use a2a_bridge::server::GrpcDispatcher;
use a2a_bridge::types::{
    CancelTaskParams, GetTaskParams, Part, SendMessageParams, Task, TaskState,
};

use common::{user_message, EchoHandler, KNOWN_TASK, TERMINAL_TASK};

fn dispatcher() -> GrpcDispatcher {
    GrpcDispatcher::new(Arc::new(EchoHandler::new()))
}

fn send_request(text: &str) -> pb::SendMessageRequest {
    let params = SendMessageParams {
        message: user_message(text),
        configuration: None,
        metadata: None,
    };
    codec::send_message_params_to_proto(params).unwrap()
}

#[tokio::test]
async fn send_message_round_trips_through_proto() {
    let response = dispatcher()
        .send_message(Request::new(send_request("ping")))
        .await
        .unwrap();

    let decoded = codec::send_message_response_from_proto(response.into_inner()).unwrap();
    match decoded {
        a2a_bridge::types::SendMessageResponse::Message(msg) => {
            assert_eq!(msg.parts, vec![Part::text("ping")]);
        }
        other => panic!("expected a message, got {other:?}"),
    }
}

#[tokio::test]
async fn get_task_maps_errors_onto_statuses() {
    let d = dispatcher();

    let task = d
        .get_task(Request::new(pb::GetTaskRequest {
            name: format!("tasks/{KNOWN_TASK}"),
            history_length: 0,
        }))
        .await
        .unwrap();
    let task = codec::task_from_proto(task.into_inner()).unwrap();
    assert_eq!(task.status.state, TaskState::Working);

    let status = d
        .get_task(Request::new(pb::GetTaskRequest {
            name: "tasks/missing".to_string(),
            history_length: 0,
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    // A malformed resource name is rejected by the codec, not the handler.
    let status = d
        .get_task(Request::new(pb::GetTaskRequest {
            name: "bogus".to_string(),
            history_length: 0,
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn cancel_of_terminal_task_is_failed_precondition() {
    let status = dispatcher()
        .cancel_task(Request::new(pb::CancelTaskRequest {
            name: format!("tasks/{TERMINAL_TASK}"),
        }))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::FailedPrecondition);
}

#[tokio::test]
async fn streaming_yields_proto_events_in_order() {
    let response = dispatcher()
        .send_streaming_message(Request::new(send_request("go")))
        .await
        .unwrap();

    let mut stream = response.into_inner();
    let mut events = Vec::new();
    while let Some(item) = stream.next().await {
        events.push(codec::stream_response_from_proto(item.unwrap()).unwrap());
    }

    assert_eq!(events.len(), 4);
    assert!(matches!(
        &events[0],
        a2a_bridge::types::StreamResponse::Task(t) if t.status.state == TaskState::Submitted
    ));
    assert!(matches!(
        &events[3],
        a2a_bridge::types::StreamResponse::StatusUpdate(e) if e.r#final
    ));
}

#[tokio::test]
async fn push_config_crud_via_resource_names() {
    let d = dispatcher();

    let created = d
        .create_task_push_notification_config(Request::new(
            pb::CreateTaskPushNotificationConfigRequest {
                parent: format!("tasks/{KNOWN_TASK}"),
                config_id: "c1".to_string(),
                config: Some(pb::TaskPushNotificationConfig {
                    name: format!("tasks/{KNOWN_TASK}/pushNotificationConfigs/c1"),
                    push_notification_config: Some(pb::PushNotificationConfig {
                        id: "c1".to_string(),
                        url: "https://push.example".to_string(),
                        token: String::new(),
                        authentication: None,
                    }),
                }),
            },
        ))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(
        created.name,
        format!("tasks/{KNOWN_TASK}/pushNotificationConfigs/c1")
    );

    let got = d
        .get_task_push_notification_config(Request::new(
            pb::GetTaskPushNotificationConfigRequest {
                name: format!("tasks/{KNOWN_TASK}/pushNotificationConfigs/c1"),
            },
        ))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(
        got.push_notification_config.unwrap().url,
        "https://push.example"
    );

    let listed = d
        .list_task_push_notification_config(Request::new(
            pb::ListTaskPushNotificationConfigRequest {
                parent: format!("tasks/{KNOWN_TASK}"),
                page_size: 0,
                page_token: String::new(),
            },
        ))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(listed.configs.len(), 1);
    assert!(listed.next_page_token.is_empty());

    d.delete_task_push_notification_config(Request::new(
        pb::DeleteTaskPushNotificationConfigRequest {
            name: format!("tasks/{KNOWN_TASK}/pushNotificationConfigs/c1"),
        },
    ))
    .await
    .unwrap();

    let status = d
        .get_task_push_notification_config(Request::new(
            pb::GetTaskPushNotificationConfigRequest {
                name: format!("tasks/{KNOWN_TASK}/pushNotificationConfigs/c1"),
            },
        ))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
}

#[tokio::test]
async fn extended_card_is_served() {
    let card = dispatcher()
        .get_extended_agent_card(Request::new(pb::GetExtendedAgentCardRequest {}))
        .await
        .unwrap();
    let card = codec::agent_card_from_proto(card.into_inner()).unwrap();
    assert_eq!(card.name, "echo (extended)");
}

/// Activates every requested extension, for metadata echo tests.
struct ActivatesExtensions;

#[async_trait]
impl RequestHandler for ActivatesExtensions {
    async fn on_send_message(
        &self,
        _params: SendMessageParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<a2a_bridge::types::SendMessageResponse> {
        Err(A2AError::unsupported_operation("n/a"))
    }

    async fn on_get_task(
        &self,
        params: GetTaskParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Task> {
        for uri in ctx.requested_extensions() {
            ctx.activate_extension(uri.clone());
        }
        Ok(common::sample_task(&params.id, TaskState::Working))
    }

    async fn on_cancel_task(
        &self,
        _params: CancelTaskParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Task> {
        Err(A2AError::unsupported_operation("n/a"))
    }
}

#[tokio::test]
async fn activated_extensions_echo_in_response_metadata() {
    let d = GrpcDispatcher::new(Arc::new(ActivatesExtensions));

    let mut request = Request::new(pb::GetTaskRequest {
        name: format!("tasks/{KNOWN_TASK}"),
        history_length: 0,
    });
    request.metadata_mut().insert(
        EXTENSIONS_HEADER,
        MetadataValue::from_static("https://ext.example/a, https://ext.example/b"),
    );

    let response = d.get_task(request).await.unwrap();
    let echoed = response
        .metadata()
        .get(EXTENSIONS_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(echoed, "https://ext.example/a, https://ext.example/b");
}
