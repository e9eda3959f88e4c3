//! End-to-end JSON-RPC binding tests: real axum server, real reqwest client.

mod common;

use std::sync::Arc;

use futures::StreamExt;

use a2a_bridge::client::{ClientTransport, JsonRpcClient, RequestOptions};
use a2a_bridge::error::A2AError;
use a2a_bridge::server::jsonrpc_router;
use a2a_bridge::types::{
    CancelTaskParams, GetTaskParams, Part, SendMessageParams, SendMessageResponse, StreamResponse,
    TaskIdParams, TaskState,
};

use common::{sample_card, user_message, EchoHandler, KNOWN_TASK, TERMINAL_TASK};

/// Serve the echo handler on an ephemeral port, returning the base URL.
async fn spawn_server() -> String {
    let app = jsonrpc_router(Arc::new(EchoHandler::new()), sample_card());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn send_params(text: &str) -> SendMessageParams {
    SendMessageParams {
        message: user_message(text),
        configuration: None,
        metadata: None,
    }
}

#[tokio::test]
async fn send_message_echoes_the_parts_back() {
    let base = spawn_server().await;
    let client = JsonRpcClient::new(format!("{base}/a2a"));

    let response = client
        .send_message(send_params("ping"), &RequestOptions::default())
        .await
        .unwrap();

    match response.value {
        SendMessageResponse::Message(msg) => {
            assert_eq!(msg.parts, vec![Part::text("ping")]);
        }
        SendMessageResponse::Task(task) => panic!("expected a message, got task {}", task.id),
    }
}

#[tokio::test]
async fn task_errors_arrive_with_their_canonical_kind() {
    let base = spawn_server().await;
    let client = JsonRpcClient::new(format!("{base}/a2a"));
    let options = RequestOptions::default();

    let err = client
        .get_task(
            GetTaskParams {
                id: "missing".to_string(),
                history_length: None,
                metadata: None,
            },
            &options,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, A2AError::TaskNotFound { .. }));

    let err = client
        .cancel_task(
            CancelTaskParams {
                id: TERMINAL_TASK.to_string(),
                metadata: None,
            },
            &options,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, A2AError::TaskNotCancelable { .. }));
}

#[tokio::test]
async fn streaming_preserves_event_order() {
    let base = spawn_server().await;
    let client = JsonRpcClient::new(format!("{base}/a2a"));

    let mut stream = client
        .send_message_stream(send_params("go"), &RequestOptions::default())
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Some(item) = stream.next().await {
        events.push(item.unwrap());
    }

    assert_eq!(events.len(), 4);
    assert!(matches!(&events[0], StreamResponse::Task(t) if t.status.state == TaskState::Submitted));
    assert!(
        matches!(&events[1], StreamResponse::StatusUpdate(e) if e.status.state == TaskState::Working)
    );
    assert!(matches!(&events[2], StreamResponse::ArtifactUpdate(_)));
    assert!(matches!(&events[3], StreamResponse::StatusUpdate(e) if e.r#final));
}

#[tokio::test]
async fn resubscribe_failure_surfaces_before_the_stream_starts() {
    let base = spawn_server().await;
    let client = JsonRpcClient::new(format!("{base}/a2a"));

    let Err(err) = client
        .resubscribe(
            TaskIdParams {
                id: "missing".to_string(),
                metadata: None,
            },
            &RequestOptions::default(),
        )
        .await
    else {
        panic!("expected resubscribe to fail");
    };
    assert!(matches!(err, A2AError::TaskNotFound { .. }));
}

#[tokio::test]
async fn resubscribe_replays_known_task_updates() {
    let base = spawn_server().await;
    let client = JsonRpcClient::new(format!("{base}/a2a"));

    let mut stream = client
        .resubscribe(
            TaskIdParams {
                id: KNOWN_TASK.to_string(),
                metadata: None,
            },
            &RequestOptions::default(),
        )
        .await
        .unwrap();

    let mut states = Vec::new();
    while let Some(item) = stream.next().await {
        if let StreamResponse::StatusUpdate(e) = item.unwrap() {
            states.push(e.status.state);
        }
    }
    assert_eq!(states, vec![TaskState::Working, TaskState::Completed]);
}

#[tokio::test]
async fn push_config_operations_round_trip() {
    use a2a_bridge::types::{
        DeleteTaskPushNotificationConfigParams, GetTaskPushNotificationConfigParams,
        ListTaskPushNotificationConfigParams, PushNotificationConfig,
        SetTaskPushNotificationConfigParams,
    };

    let base = spawn_server().await;
    let client = JsonRpcClient::new(format!("{base}/a2a"));
    let options = RequestOptions::default();

    let set = client
        .set_task_push_notification_config(
            SetTaskPushNotificationConfigParams {
                task_id: KNOWN_TASK.to_string(),
                push_notification_config: PushNotificationConfig {
                    id: Some("c1".to_string()),
                    url: "https://push.example".to_string(),
                    token: None,
                    authentication: None,
                },
            },
            &options,
        )
        .await
        .unwrap();
    assert_eq!(set.value.task_id, KNOWN_TASK);

    let got = client
        .get_task_push_notification_config(
            GetTaskPushNotificationConfigParams {
                id: KNOWN_TASK.to_string(),
                push_notification_config_id: "c1".to_string(),
                metadata: None,
            },
            &options,
        )
        .await
        .unwrap();
    assert_eq!(
        got.value.push_notification_config.url,
        "https://push.example"
    );

    let listed = client
        .list_task_push_notification_configs(
            ListTaskPushNotificationConfigParams {
                id: KNOWN_TASK.to_string(),
                page_size: None,
                page_token: None,
                metadata: None,
            },
            &options,
        )
        .await
        .unwrap();
    assert_eq!(listed.value.configs.len(), 1);

    client
        .delete_task_push_notification_config(
            DeleteTaskPushNotificationConfigParams {
                id: KNOWN_TASK.to_string(),
                push_notification_config_id: "c1".to_string(),
                metadata: None,
            },
            &options,
        )
        .await
        .unwrap();

    let err = client
        .get_task_push_notification_config(
            GetTaskPushNotificationConfigParams {
                id: KNOWN_TASK.to_string(),
                push_notification_config_id: "c1".to_string(),
                metadata: None,
            },
            &options,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, A2AError::TaskNotFound { .. }));
}

#[tokio::test]
async fn extended_card_is_served() {
    let base = spawn_server().await;
    let client = JsonRpcClient::new(format!("{base}/a2a"));

    let card = client
        .get_extended_agent_card(&RequestOptions::default())
        .await
        .unwrap();
    assert_eq!(card.value.name, "echo (extended)");
}

#[tokio::test]
async fn well_known_path_serves_the_agent_card() {
    let base = spawn_server().await;

    let card: a2a_bridge::types::AgentCard =
        reqwest::get(format!("{base}/.well-known/agent-card.json"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
    assert_eq!(card, sample_card());
}

/// Raw-body tests for the layered envelope validation.
mod envelope_tiers {
    use super::*;

    async fn post_raw(base: &str, body: &str) -> serde_json::Value {
        reqwest::Client::new()
            .post(format!("{base}/a2a"))
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    fn error_code(envelope: &serde_json::Value) -> i64 {
        envelope["error"]["code"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn malformed_json_answers_parse_error() {
        let base = spawn_server().await;
        let envelope = post_raw(&base, "{not json").await;
        assert_eq!(error_code(&envelope), -32700);
    }

    #[tokio::test]
    async fn wrong_version_answers_invalid_request() {
        let base = spawn_server().await;
        let body = r#"{"jsonrpc":"1.0","id":1,"method":"tasks/get","params":{"id":"t1"}}"#;
        let envelope = post_raw(&base, body).await;
        assert_eq!(error_code(&envelope), -32600);
        // The id is still echoed back for correlation.
        assert_eq!(envelope["id"], serde_json::json!(1));
    }

    #[tokio::test]
    async fn structured_id_answers_invalid_request() {
        let base = spawn_server().await;
        let body = r#"{"jsonrpc":"2.0","id":["a"],"method":"tasks/get","params":{"id":"t1"}}"#;
        let envelope = post_raw(&base, body).await;
        assert_eq!(error_code(&envelope), -32600);
    }

    #[tokio::test]
    async fn unknown_method_answers_method_not_found() {
        let base = spawn_server().await;
        let body = r#"{"jsonrpc":"2.0","id":2,"method":"tasks/freeze","params":{}}"#;
        let envelope = post_raw(&base, body).await;
        assert_eq!(error_code(&envelope), -32601);
    }

    #[tokio::test]
    async fn undecodable_params_answer_invalid_params() {
        let base = spawn_server().await;
        let body = r#"{"jsonrpc":"2.0","id":3,"method":"tasks/get","params":{"id":7}}"#;
        let envelope = post_raw(&base, body).await;
        assert_eq!(error_code(&envelope), -32602);
    }
}
