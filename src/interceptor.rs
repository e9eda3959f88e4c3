//! Server-side interceptor pipeline.
//!
//! Interceptors see every call as a discriminated [`CallRequest`] /
//! [`CallResponse`] pair, after transport decode and before transport
//! encode, so one interceptor works across all three bindings.
//!
//! Chain semantics:
//! - `before` hooks run in registration order and may mutate the request
//!   in place, or short-circuit by returning a response. When interceptor
//!   `k` short-circuits, only `after` hooks of interceptors `0..=k` run.
//! - `after` hooks run in registration order over the (mutable) response.
//!   Returning [`AfterFlow::Stop`] ends the chain; for streams the current
//!   item is still forwarded, then the stream ends.
//! - For streaming calls the `after` chain runs once per emitted item,
//!   with at most one item in flight at a time.
//! - A hook that swaps the response to a variant that does not match the
//!   call's method is a pipeline bug and fails the call with an internal
//!   error rather than sending a mistyped payload.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

use crate::context::ServerCallContext;
use crate::error::{A2AError, A2AResult};
use crate::handler::{EventStream, Method, RequestHandler};
use crate::types::{
    AgentCard, CancelTaskParams, DeleteTaskPushNotificationConfigParams, GetTaskParams,
    GetTaskPushNotificationConfigParams, ListTaskPushNotificationConfigParams, SendMessageParams,
    SendMessageResponse, SetTaskPushNotificationConfigParams, StreamResponse, Task, TaskIdParams,
    TaskPushNotificationConfig,
};

/// A decoded request, tagged by operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CallRequest {
    /// `message/send` params.
    SendMessage(SendMessageParams),
    /// `message/stream` params.
    SendMessageStream(SendMessageParams),
    /// `tasks/get` params.
    GetTask(GetTaskParams),
    /// `tasks/cancel` params.
    CancelTask(CancelTaskParams),
    /// `tasks/resubscribe` params.
    Resubscribe(TaskIdParams),
    /// `tasks/pushNotificationConfig/set` params.
    SetPushConfig(SetTaskPushNotificationConfigParams),
    /// `tasks/pushNotificationConfig/get` params.
    GetPushConfig(GetTaskPushNotificationConfigParams),
    /// `tasks/pushNotificationConfig/list` params.
    ListPushConfigs(ListTaskPushNotificationConfigParams),
    /// `tasks/pushNotificationConfig/delete` params.
    DeletePushConfig(DeleteTaskPushNotificationConfigParams),
    /// `agent/getAuthenticatedExtendedCard` (no params).
    ExtendedAgentCard,
}

impl CallRequest {
    /// The operation this request belongs to.
    pub fn method(&self) -> Method {
        match self {
            CallRequest::SendMessage(_) => Method::SendMessage,
            CallRequest::SendMessageStream(_) => Method::SendMessageStream,
            CallRequest::GetTask(_) => Method::GetTask,
            CallRequest::CancelTask(_) => Method::CancelTask,
            CallRequest::Resubscribe(_) => Method::Resubscribe,
            CallRequest::SetPushConfig(_) => Method::SetPushConfig,
            CallRequest::GetPushConfig(_) => Method::GetPushConfig,
            CallRequest::ListPushConfigs(_) => Method::ListPushConfigs,
            CallRequest::DeletePushConfig(_) => Method::DeletePushConfig,
            CallRequest::ExtendedAgentCard => Method::ExtendedAgentCard,
        }
    }
}

/// A response or stream item, tagged by payload shape.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResponse {
    /// Result of `message/send`.
    SendMessage(SendMessageResponse),
    /// One item of a `message/stream` or `tasks/resubscribe` stream.
    StreamItem(StreamResponse),
    /// Result of `tasks/get`.
    GetTask(Task),
    /// Result of `tasks/cancel`.
    CancelTask(Task),
    /// Result of `tasks/pushNotificationConfig/set`.
    SetPushConfig(TaskPushNotificationConfig),
    /// Result of `tasks/pushNotificationConfig/get`.
    GetPushConfig(TaskPushNotificationConfig),
    /// Result of `tasks/pushNotificationConfig/list`.
    ListPushConfigs(Vec<TaskPushNotificationConfig>),
    /// Result of `tasks/pushNotificationConfig/delete`.
    DeletePushConfig,
    /// Result of `agent/getAuthenticatedExtendedCard`.
    ExtendedAgentCard(AgentCard),
}

impl CallResponse {
    /// Whether this payload shape is valid for the given operation.
    ///
    /// `StreamItem` is valid for both streaming operations; every other
    /// variant is valid for exactly one.
    pub fn matches(&self, method: Method) -> bool {
        match self {
            CallResponse::SendMessage(_) => method == Method::SendMessage,
            CallResponse::StreamItem(_) => {
                method == Method::SendMessageStream || method == Method::Resubscribe
            }
            CallResponse::GetTask(_) => method == Method::GetTask,
            CallResponse::CancelTask(_) => method == Method::CancelTask,
            CallResponse::SetPushConfig(_) => method == Method::SetPushConfig,
            CallResponse::GetPushConfig(_) => method == Method::GetPushConfig,
            CallResponse::ListPushConfigs(_) => method == Method::ListPushConfigs,
            CallResponse::DeletePushConfig => method == Method::DeletePushConfig,
            CallResponse::ExtendedAgentCard(_) => method == Method::ExtendedAgentCard,
        }
    }
}

/// Whether the `after` chain should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterFlow {
    /// Run the next `after` hook.
    Continue,
    /// End the chain. On a stream, the current item is still forwarded
    /// and then the stream ends.
    Stop,
}

/// A server-side call interceptor.
///
/// Both hooks default to no-ops; implement only the side you need.
#[async_trait]
pub trait CallInterceptor: Send + Sync {
    /// Runs before the handler. Mutate the request in place, or return
    /// `Some(response)` to short-circuit the remaining `before` hooks and
    /// the handler itself.
    async fn before(
        &self,
        request: &mut CallRequest,
        ctx: &ServerCallContext,
    ) -> A2AResult<Option<CallResponse>> {
        let _ = (request, ctx);
        Ok(None)
    }

    /// Runs after the handler (or per stream item). Mutate the response in
    /// place; return [`AfterFlow::Stop`] to end the chain.
    async fn after(
        &self,
        response: &mut CallResponse,
        ctx: &ServerCallContext,
    ) -> A2AResult<AfterFlow> {
        let _ = (response, ctx);
        Ok(AfterFlow::Continue)
    }
}

/// Wraps a [`RequestHandler`] with an interceptor chain.
///
/// Implements [`RequestHandler`] itself, so dispatchers need no knowledge
/// of whether interceptors are present.
pub struct InterceptedHandler {
    inner: Arc<dyn RequestHandler>,
    interceptors: Vec<Arc<dyn CallInterceptor>>,
}

impl InterceptedHandler {
    /// Wrap `inner` with the given chain, in execution order.
    pub fn new(inner: Arc<dyn RequestHandler>, interceptors: Vec<Arc<dyn CallInterceptor>>) -> Self {
        InterceptedHandler { inner, interceptors }
    }

    /// Run the `before` chain.
    ///
    /// Returns the short-circuit response (if any) and the number of
    /// interceptors whose `after` hook must run.
    async fn run_before(
        &self,
        request: &mut CallRequest,
        ctx: &ServerCallContext,
    ) -> A2AResult<(Option<CallResponse>, usize)> {
        let method = request.method();
        for (index, interceptor) in self.interceptors.iter().enumerate() {
            if let Some(early) = interceptor.before(request, ctx).await? {
                if !early.matches(method) {
                    return Err(A2AError::internal_error(format!(
                        "interceptor {} short-circuited {} with a mismatched response payload",
                        index, method
                    )));
                }
                debug!(%method, interceptor = index, "call short-circuited by interceptor");
                return Ok((Some(early), index + 1));
            }
        }
        Ok((None, self.interceptors.len()))
    }

    /// Run the `after` chain over the first `limit` interceptors.
    async fn run_after(
        &self,
        response: &mut CallResponse,
        method: Method,
        ctx: &ServerCallContext,
        limit: usize,
    ) -> A2AResult<AfterFlow> {
        for (index, interceptor) in self.interceptors[..limit].iter().enumerate() {
            let flow = interceptor.after(response, ctx).await?;
            if !response.matches(method) {
                return Err(A2AError::internal_error(format!(
                    "interceptor {} rewrote the {} response to a mismatched payload",
                    index, method
                )));
            }
            if flow == AfterFlow::Stop {
                debug!(%method, interceptor = index, "after chain stopped by interceptor");
                return Ok(AfterFlow::Stop);
            }
        }
        Ok(AfterFlow::Continue)
    }

    fn unexpected(method: Method) -> A2AError {
        A2AError::internal_error(format!(
            "interceptor pipeline produced a mismatched payload for {}",
            method
        ))
    }

    /// Wrap an upstream event stream so the `after` chain runs per item.
    ///
    /// Items are pulled one at a time; the next item is not requested until
    /// the current one has cleared the chain and been yielded. Upstream
    /// errors pass through untouched. [`AfterFlow::Stop`] forwards the
    /// current item and then ends the stream.
    fn intercept_stream(
        self: Arc<Self>,
        method: Method,
        mut upstream: EventStream,
        ctx: Arc<ServerCallContext>,
        limit: usize,
    ) -> EventStream {
        Box::pin(async_stream::stream! {
            while let Some(item) = upstream.next().await {
                match item {
                    Ok(event) => {
                        let mut response = CallResponse::StreamItem(event);
                        match self.run_after(&mut response, method, &ctx, limit).await {
                            Ok(flow) => {
                                let event = match response {
                                    CallResponse::StreamItem(event) => event,
                                    _ => {
                                        yield Err(Self::unexpected(method));
                                        break;
                                    }
                                };
                                yield Ok(event);
                                if flow == AfterFlow::Stop {
                                    break;
                                }
                            }
                            Err(err) => {
                                yield Err(err);
                                break;
                            }
                        }
                    }
                    Err(err) => yield Err(err),
                }
            }
        })
    }

    /// Shared front half of the streaming operations: run the `before`
    /// chain and turn a short-circuit item into a one-item stream.
    async fn begin_stream(
        self: &Arc<Self>,
        request: &mut CallRequest,
        ctx: &Arc<ServerCallContext>,
    ) -> A2AResult<Result<EventStream, usize>> {
        let method = request.method();
        let (early, limit) = self.run_before(request, ctx).await?;
        if let Some(early) = early {
            let single: EventStream = match early {
                CallResponse::StreamItem(event) => Box::pin(futures::stream::iter([Ok(event)])),
                _ => return Err(Self::unexpected(method)),
            };
            return Ok(Ok(Arc::clone(self).intercept_stream(method, single, ctx.clone(), limit)));
        }
        Ok(Err(limit))
    }
}

macro_rules! intercepted_unary {
    ($self:ident, $ctx:ident, $request:expr, $req_variant:ident, $resp_variant:ident, $call:expr) => {{
        let method = Method::$req_variant;
        let mut request = $request;
        let (early, limit) = $self.run_before(&mut request, &$ctx).await?;
        let mut response = match early {
            Some(response) => response,
            None => {
                #[allow(clippy::redundant_closure_call)]
                let value = match request {
                    CallRequest::$req_variant(params) => ($call)(params).await?,
                    _ => return Err(Self::unexpected(method)),
                };
                CallResponse::$resp_variant(value)
            }
        };
        $self.run_after(&mut response, method, &$ctx, limit).await?;
        match response {
            CallResponse::$resp_variant(value) => Ok(value),
            _ => Err(Self::unexpected(method)),
        }
    }};
}

#[async_trait]
impl RequestHandler for InterceptedHandler {
    async fn on_send_message(
        &self,
        params: SendMessageParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<SendMessageResponse> {
        let inner = Arc::clone(&self.inner);
        let call_ctx = ctx.clone();
        intercepted_unary!(
            self,
            ctx,
            CallRequest::SendMessage(params),
            SendMessage,
            SendMessage,
            |p| inner.on_send_message(p, call_ctx)
        )
    }

    async fn on_send_message_stream(
        &self,
        params: SendMessageParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<EventStream> {
        // The chain cannot be run on `&self` inside the returned stream, so
        // streaming goes through a cheap self-wrapping Arc.
        let this = Arc::new(InterceptedHandler {
            inner: Arc::clone(&self.inner),
            interceptors: self.interceptors.clone(),
        });

        let mut request = CallRequest::SendMessageStream(params);
        match this.begin_stream(&mut request, &ctx).await? {
            Ok(stream) => Ok(stream),
            Err(limit) => {
                let params = match request {
                    CallRequest::SendMessageStream(params) => params,
                    _ => return Err(Self::unexpected(Method::SendMessageStream)),
                };
                let upstream: EventStream = if this.inner.streaming_supported() {
                    this.inner.on_send_message_stream(params, ctx.clone()).await?
                } else {
                    // Unary fallback: serve the stream as a single item.
                    let response = this.inner.on_send_message(params, ctx.clone()).await?;
                    Box::pin(futures::stream::iter([Ok(response.into())]))
                };
                Ok(this.intercept_stream(Method::SendMessageStream, upstream, ctx, limit))
            }
        }
    }

    async fn on_get_task(
        &self,
        params: GetTaskParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Task> {
        let inner = Arc::clone(&self.inner);
        let call_ctx = ctx.clone();
        intercepted_unary!(self, ctx, CallRequest::GetTask(params), GetTask, GetTask, |p| {
            inner.on_get_task(p, call_ctx)
        })
    }

    async fn on_cancel_task(
        &self,
        params: CancelTaskParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Task> {
        let inner = Arc::clone(&self.inner);
        let call_ctx = ctx.clone();
        intercepted_unary!(
            self,
            ctx,
            CallRequest::CancelTask(params),
            CancelTask,
            CancelTask,
            |p| inner.on_cancel_task(p, call_ctx)
        )
    }

    async fn on_resubscribe(
        &self,
        params: TaskIdParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<EventStream> {
        let this = Arc::new(InterceptedHandler {
            inner: Arc::clone(&self.inner),
            interceptors: self.interceptors.clone(),
        });

        let mut request = CallRequest::Resubscribe(params);
        match this.begin_stream(&mut request, &ctx).await? {
            Ok(stream) => Ok(stream),
            Err(limit) => {
                let params = match request {
                    CallRequest::Resubscribe(params) => params,
                    _ => return Err(Self::unexpected(Method::Resubscribe)),
                };
                let upstream = this.inner.on_resubscribe(params, ctx.clone()).await?;
                Ok(this.intercept_stream(Method::Resubscribe, upstream, ctx, limit))
            }
        }
    }

    async fn on_set_task_push_notification_config(
        &self,
        params: SetTaskPushNotificationConfigParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<TaskPushNotificationConfig> {
        let inner = Arc::clone(&self.inner);
        let call_ctx = ctx.clone();
        intercepted_unary!(
            self,
            ctx,
            CallRequest::SetPushConfig(params),
            SetPushConfig,
            SetPushConfig,
            |p| inner.on_set_task_push_notification_config(p, call_ctx)
        )
    }

    async fn on_get_task_push_notification_config(
        &self,
        params: GetTaskPushNotificationConfigParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<TaskPushNotificationConfig> {
        let inner = Arc::clone(&self.inner);
        let call_ctx = ctx.clone();
        intercepted_unary!(
            self,
            ctx,
            CallRequest::GetPushConfig(params),
            GetPushConfig,
            GetPushConfig,
            |p| inner.on_get_task_push_notification_config(p, call_ctx)
        )
    }

    async fn on_list_task_push_notification_configs(
        &self,
        params: ListTaskPushNotificationConfigParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<Vec<TaskPushNotificationConfig>> {
        let inner = Arc::clone(&self.inner);
        let call_ctx = ctx.clone();
        intercepted_unary!(
            self,
            ctx,
            CallRequest::ListPushConfigs(params),
            ListPushConfigs,
            ListPushConfigs,
            |p| inner.on_list_task_push_notification_configs(p, call_ctx)
        )
    }

    async fn on_delete_task_push_notification_config(
        &self,
        params: DeleteTaskPushNotificationConfigParams,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<()> {
        let method = Method::DeletePushConfig;
        let mut request = CallRequest::DeletePushConfig(params);
        let (early, limit) = self.run_before(&mut request, &ctx).await?;
        let mut response = match early {
            Some(response) => response,
            None => {
                let params = match request {
                    CallRequest::DeletePushConfig(params) => params,
                    _ => return Err(Self::unexpected(method)),
                };
                self.inner
                    .on_delete_task_push_notification_config(params, ctx.clone())
                    .await?;
                CallResponse::DeletePushConfig
            }
        };
        self.run_after(&mut response, method, &ctx, limit).await?;
        match response {
            CallResponse::DeletePushConfig => Ok(()),
            _ => Err(Self::unexpected(method)),
        }
    }

    async fn on_get_extended_agent_card(
        &self,
        ctx: Arc<ServerCallContext>,
    ) -> A2AResult<AgentCard> {
        let method = Method::ExtendedAgentCard;
        let mut request = CallRequest::ExtendedAgentCard;
        let (early, limit) = self.run_before(&mut request, &ctx).await?;
        let mut response = match early {
            Some(response) => response,
            None => {
                CallResponse::ExtendedAgentCard(
                    self.inner.on_get_extended_agent_card(ctx.clone()).await?,
                )
            }
        };
        self.run_after(&mut response, method, &ctx, limit).await?;
        match response {
            CallResponse::ExtendedAgentCard(card) => Ok(card),
            _ => Err(Self::unexpected(method)),
        }
    }

    fn streaming_supported(&self) -> bool {
        // The wrapper itself always streams; the unary fallback for a
        // non-streaming inner handler happens inside on_send_message_stream.
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_item_matches_both_streaming_methods() {
        let item = CallResponse::StreamItem(StreamResponse::Message(
            crate::types::Message::agent_text("hi"),
        ));
        assert!(item.matches(Method::SendMessageStream));
        assert!(item.matches(Method::Resubscribe));
        assert!(!item.matches(Method::SendMessage));
    }

    #[test]
    fn unary_payloads_match_exactly_one_method() {
        let resp = CallResponse::DeletePushConfig;
        assert!(resp.matches(Method::DeletePushConfig));
        assert!(!resp.matches(Method::SetPushConfig));
    }
}
