//! Interceptor pipeline behavior: ordering, short-circuits, per-item stream
//! hooks, and payload-shape enforcement.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;

use a2a_bridge::context::ServerCallContext;
use a2a_bridge::error::{A2AError, A2AResult};
use a2a_bridge::handler::{EventStream, RequestHandler};
use a2a_bridge::interceptor::{
    AfterFlow, CallInterceptor, CallRequest, CallResponse, InterceptedHandler,
};
use a2a_bridge::types::{
    CancelTaskParams, GetTaskParams, Message, SendMessageParams, SendMessageResponse,
    StreamResponse, Task, TaskState,
};

use common::{sample_task, EchoHandler, KNOWN_TASK};

fn ctx() -> Arc<ServerCallContext> {
    Arc::new(ServerCallContext::default())
}

fn send_params(text: &str) -> SendMessageParams {
    SendMessageParams {
        message: Message::user_text(text),
        configuration: None,
        metadata: None,
    }
}

/// Rewrites any `tasks/get` id to the known task.
struct RewriteId;

#[async_trait]
impl CallInterceptor for RewriteId {
    async fn before(
        &self,
        request: &mut CallRequest,
        _ctx: &ServerCallContext,
    ) -> A2AResult<Option<CallResponse>> {
        if let CallRequest::GetTask(params) = request {
            params.id = KNOWN_TASK.to_string();
        }
        Ok(None)
    }
}

/// Short-circuits `tasks/get` with a canned task; counts `after` runs.
struct ShortCircuit {
    after_runs: AtomicUsize,
}

#[async_trait]
impl CallInterceptor for ShortCircuit {
    async fn before(
        &self,
        request: &mut CallRequest,
        _ctx: &ServerCallContext,
    ) -> A2AResult<Option<CallResponse>> {
        match request {
            CallRequest::GetTask(_) => Ok(Some(CallResponse::GetTask(sample_task(
                "from-interceptor",
                TaskState::Completed,
            )))),
            _ => Ok(None),
        }
    }

    async fn after(
        &self,
        _response: &mut CallResponse,
        _ctx: &ServerCallContext,
    ) -> A2AResult<AfterFlow> {
        self.after_runs.fetch_add(1, Ordering::SeqCst);
        Ok(AfterFlow::Continue)
    }
}

/// Counts `after` invocations without touching the response.
#[derive(Default)]
struct AfterCounter {
    runs: AtomicUsize,
}

#[async_trait]
impl CallInterceptor for AfterCounter {
    async fn after(
        &self,
        _response: &mut CallResponse,
        _ctx: &ServerCallContext,
    ) -> A2AResult<AfterFlow> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(AfterFlow::Continue)
    }
}

/// Stops the `after` chain after the first stream item.
struct StopAfterFirst {
    seen: AtomicUsize,
}

#[async_trait]
impl CallInterceptor for StopAfterFirst {
    async fn after(
        &self,
        _response: &mut CallResponse,
        _ctx: &ServerCallContext,
    ) -> A2AResult<AfterFlow> {
        self.seen.fetch_add(1, Ordering::SeqCst);
        Ok(AfterFlow::Stop)
    }
}

/// Swaps the response to a mismatched variant — a pipeline bug.
struct VariantSwapper;

#[async_trait]
impl CallInterceptor for VariantSwapper {
    async fn after(
        &self,
        response: &mut CallResponse,
        _ctx: &ServerCallContext,
    ) -> A2AResult<AfterFlow> {
        *response = CallResponse::DeletePushConfig;
        Ok(AfterFlow::Continue)
    }
}

#[tokio::test]
async fn before_hook_mutations_reach_the_handler() {
    let handler = InterceptedHandler::new(Arc::new(EchoHandler::new()), vec![Arc::new(RewriteId)]);
    let params = GetTaskParams {
        id: "definitely-not-a-task".to_string(),
        history_length: None,
        metadata: None,
    };
    let task = handler.on_get_task(params, ctx()).await.unwrap();
    assert_eq!(task.id, KNOWN_TASK);
}

#[tokio::test]
async fn short_circuit_skips_handler_and_later_interceptors() {
    let first = Arc::new(ShortCircuit {
        after_runs: AtomicUsize::new(0),
    });
    let second = Arc::new(AfterCounter::default());
    let handler = InterceptedHandler::new(
        Arc::new(EchoHandler::new()),
        vec![first.clone(), second.clone()],
    );

    let params = GetTaskParams {
        id: "unknown".to_string(),
        history_length: None,
        metadata: None,
    };
    let task = handler.on_get_task(params, ctx()).await.unwrap();

    // The canned response replaces the handler's, so the unknown id never
    // reaches the handler (which would have errored).
    assert_eq!(task.id, "from-interceptor");
    // Only interceptors up to and including the short-circuiter see `after`.
    assert_eq!(first.after_runs.load(Ordering::SeqCst), 1);
    assert_eq!(second.runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn mismatched_short_circuit_fails_the_call() {
    struct WrongShape;

    #[async_trait]
    impl CallInterceptor for WrongShape {
        async fn before(
            &self,
            _request: &mut CallRequest,
            _ctx: &ServerCallContext,
        ) -> A2AResult<Option<CallResponse>> {
            Ok(Some(CallResponse::DeletePushConfig))
        }
    }

    let handler =
        InterceptedHandler::new(Arc::new(EchoHandler::new()), vec![Arc::new(WrongShape)]);
    let params = GetTaskParams {
        id: KNOWN_TASK.to_string(),
        history_length: None,
        metadata: None,
    };
    let err = handler.on_get_task(params, ctx()).await.unwrap_err();
    assert!(matches!(err, A2AError::InternalError { .. }));
}

#[tokio::test]
async fn mismatched_after_rewrite_fails_the_call() {
    let handler =
        InterceptedHandler::new(Arc::new(EchoHandler::new()), vec![Arc::new(VariantSwapper)]);
    let err = handler
        .on_send_message(send_params("hi"), ctx())
        .await
        .unwrap_err();
    assert!(matches!(err, A2AError::InternalError { .. }));
}

#[tokio::test]
async fn after_chain_runs_once_per_stream_item() {
    let counter = Arc::new(AfterCounter::default());
    let handler =
        InterceptedHandler::new(Arc::new(EchoHandler::new()), vec![counter.clone()]);

    let mut stream = handler
        .on_send_message_stream(send_params("hi"), ctx())
        .await
        .unwrap();

    let mut items = Vec::new();
    while let Some(item) = stream.next().await {
        items.push(item.unwrap());
    }

    // The echo stream emits task, working, artifact, final — in order.
    assert_eq!(items.len(), 4);
    assert!(matches!(items[0], StreamResponse::Task(_)));
    assert!(items[3].is_terminal());
    assert_eq!(counter.runs.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn stop_forwards_current_item_then_ends_stream() {
    let stopper = Arc::new(StopAfterFirst {
        seen: AtomicUsize::new(0),
    });
    let handler = InterceptedHandler::new(Arc::new(EchoHandler::new()), vec![stopper.clone()]);

    let mut stream = handler
        .on_send_message_stream(send_params("hi"), ctx())
        .await
        .unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert!(matches!(first, StreamResponse::Task(_)));
    assert!(stream.next().await.is_none());
    assert_eq!(stopper.seen.load(Ordering::SeqCst), 1);
}

/// A handler that only implements the unary path.
struct UnaryOnly;

#[async_trait]
impl RequestHandler for UnaryOnly {
    async fn on_send_message(
        &self,
        params: SendMessageParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<SendMessageResponse> {
        let mut reply = Message::agent_text("");
        reply.parts = params.message.parts;
        Ok(SendMessageResponse::Message(reply))
    }

    async fn on_get_task(
        &self,
        _params: GetTaskParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Task> {
        Err(A2AError::task_not_found("unary-only"))
    }

    async fn on_cancel_task(
        &self,
        _params: CancelTaskParams,
        _ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Task> {
        Err(A2AError::task_not_found("unary-only"))
    }

    fn streaming_supported(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn non_streaming_handler_serves_streams_as_single_item() {
    let handler = InterceptedHandler::new(Arc::new(UnaryOnly), Vec::new());

    let mut stream: EventStream = handler
        .on_send_message_stream(send_params("only once"), ctx())
        .await
        .unwrap();

    let item = stream.next().await.unwrap().unwrap();
    match item {
        StreamResponse::Message(msg) => assert_eq!(msg.parts.len(), 1),
        other => panic!("expected a message, got {other:?}"),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn upstream_stream_errors_pass_through() {
    struct FailingStream;

    #[async_trait]
    impl RequestHandler for FailingStream {
        async fn on_send_message(
            &self,
            _params: SendMessageParams,
            _ctx: Arc<ServerCallContext>,
        ) -> A2AResult<SendMessageResponse> {
            Err(A2AError::unsupported_operation("stream only"))
        }

        async fn on_send_message_stream(
            &self,
            _params: SendMessageParams,
            _ctx: Arc<ServerCallContext>,
        ) -> A2AResult<EventStream> {
            Ok(Box::pin(async_stream::stream! {
                yield Ok(StreamResponse::Message(Message::agent_text("one")));
                yield Err(A2AError::internal_error("boom"));
            }))
        }

        async fn on_get_task(
            &self,
            _params: GetTaskParams,
            _ctx: Arc<ServerCallContext>,
        ) -> A2AResult<Task> {
            Err(A2AError::task_not_found("n/a"))
        }

        async fn on_cancel_task(
            &self,
            _params: CancelTaskParams,
            _ctx: Arc<ServerCallContext>,
        ) -> A2AResult<Task> {
            Err(A2AError::task_not_found("n/a"))
        }
    }

    let handler = InterceptedHandler::new(Arc::new(FailingStream), Vec::new());
    let mut stream = handler
        .on_send_message_stream(send_params("hi"), ctx())
        .await
        .unwrap();

    assert!(stream.next().await.unwrap().is_ok());
    let err = stream.next().await.unwrap().unwrap_err();
    assert!(matches!(err, A2AError::InternalError { .. }));
}
