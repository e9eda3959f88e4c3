//! Server-Sent Events parsing for the streaming HTTP bindings.
//!
//! Both text bindings stream one event per SSE frame, but they frame
//! errors differently:
//! - JSON-RPC wraps every `data:` payload in a JSON-RPC envelope; an
//!   envelope with an `error` member ends the stream with that error.
//! - REST sends raw domain events, and signals failure with an
//!   `event: error` frame whose data is the REST error envelope.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::Stream;
use tokio::sync::mpsc;

use crate::error::{A2AError, A2AResult};
use crate::handler::EventStream;
use crate::types::{JsonRpcError, StreamResponse};

/// How `data:` payloads are framed on this connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseFormat {
    /// Each payload is a JSON-RPC response envelope (JSON-RPC binding).
    JsonRpcEnvelope,
    /// Each payload is a bare domain event; errors arrive as
    /// `event: error` frames (REST binding).
    Raw,
}

/// A stream of A2A server-sent events.
///
/// Wraps a raw HTTP response; a background task parses SSE frames into
/// typed events and pushes them through a bounded channel.
pub struct SseStream {
    receiver: mpsc::Receiver<A2AResult<StreamResponse>>,
    /// Kept alive so the parsing task runs to completion.
    _task: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for SseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseStream").finish_non_exhaustive()
    }
}

impl SseStream {
    /// Spawn a parser over a raw `reqwest::Response` body.
    pub(crate) fn from_response(response: reqwest::Response, format: SseFormat) -> Self {
        let (tx, rx) = mpsc::channel(64);

        let task = tokio::spawn(async move {
            if let Err(e) = parse_sse_stream(response, format, &tx).await {
                // Deliver the terminal error; the receiver may be gone.
                let _ = tx.send(Err(e)).await;
            }
        });

        Self {
            receiver: rx,
            _task: task,
        }
    }

    /// Next event, or `None` once the server closes the connection.
    pub async fn next(&mut self) -> Option<A2AResult<StreamResponse>> {
        self.receiver.recv().await
    }

    /// Convert into the crate-wide [`EventStream`] type.
    pub fn into_event_stream(self) -> EventStream {
        Box::pin(SseStreamAdapter {
            receiver: self.receiver,
            _task: self._task,
        })
    }
}

struct SseStreamAdapter {
    receiver: mpsc::Receiver<A2AResult<StreamResponse>>,
    _task: tokio::task::JoinHandle<()>,
}

impl Stream for SseStreamAdapter {
    type Item = A2AResult<StreamResponse>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

async fn parse_sse_stream(
    response: reqwest::Response,
    format: SseFormat,
    tx: &mpsc::Sender<A2AResult<StreamResponse>>,
) -> A2AResult<()> {
    use futures::StreamExt;

    let mut stream = response.bytes_stream();
    let mut buffer = String::new();
    let mut parser = SseParser::new(format);

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result
            .map_err(|e| A2AError::Transport(format!("error reading SSE stream: {e}")))?;

        let text = std::str::from_utf8(&chunk)
            .map_err(|e| A2AError::Transport(format!("invalid UTF-8 in SSE stream: {e}")))?;

        buffer.push_str(text);

        // Process complete lines from the buffer.
        while let Some(newline_pos) = buffer.find('\n') {
            let line = buffer[..newline_pos].trim_end_matches('\r').to_string();
            buffer = buffer[newline_pos + 1..].to_string();

            if let Some(event) = parser.parse_line(&line)? {
                if tx.send(Ok(event)).await.is_err() {
                    // Receiver dropped — stop parsing.
                    return Ok(());
                }
            }
        }
    }

    // Flush a final frame that lacked a trailing newline.
    if !buffer.trim().is_empty() {
        if let Some(event) = parser.parse_line(buffer.trim())? {
            let _ = tx.send(Ok(event)).await;
        }
    }

    Ok(())
}

/// Incremental SSE line parser tracking the current `event:` name.
pub(crate) struct SseParser {
    format: SseFormat,
    event_name: Option<String>,
}

impl SseParser {
    pub(crate) fn new(format: SseFormat) -> Self {
        SseParser {
            format,
            event_name: None,
        }
    }

    /// Parse one SSE line. Returns `Some(event)` for data lines carrying a
    /// domain event, `None` for comments, field lines, and keep-alives, and
    /// `Err` when the frame carries a protocol error.
    pub(crate) fn parse_line(&mut self, line: &str) -> A2AResult<Option<StreamResponse>> {
        // Blank line = frame boundary; reset the event name.
        if line.is_empty() {
            self.event_name = None;
            return Ok(None);
        }

        // SSE comments are keep-alive signals.
        if line.starts_with(':') {
            return Ok(None);
        }

        if let Some(name) = line.strip_prefix("event:") {
            self.event_name = Some(name.trim().to_string());
            return Ok(None);
        }

        let Some(data) = line.strip_prefix("data:") else {
            // Other SSE fields (id:, retry:) carry nothing for us.
            return Ok(None);
        };
        let data = data.trim();
        if data.is_empty() || data == "[DONE]" {
            return Ok(None);
        }

        match self.format {
            SseFormat::JsonRpcEnvelope => parse_json_rpc_frame(data).map(Some),
            SseFormat::Raw => {
                if self.event_name.as_deref() == Some("error") {
                    let envelope: JsonRpcError = serde_json::from_str(data).map_err(|e| {
                        A2AError::InvalidJson(format!(
                            "failed to parse SSE error frame: {e} (data: {data})"
                        ))
                    })?;
                    return Err(envelope.into());
                }
                serde_json::from_str::<StreamResponse>(data)
                    .map(Some)
                    .map_err(|e| {
                        A2AError::InvalidJson(format!(
                            "failed to parse SSE event: {e} (data: {data})"
                        ))
                    })
            }
        }
    }
}

fn parse_json_rpc_frame(data: &str) -> A2AResult<StreamResponse> {
    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        A2AError::InvalidJson(format!("failed to parse SSE event data: {e} (data: {data})"))
    })?;

    if let Some(error) = value.get("error") {
        let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(-1);
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error")
            .to_string();
        let data = error.get("data").cloned();
        return Err(A2AError::from_code(code, message, data));
    }

    let result = value.get("result").cloned().ok_or_else(|| {
        A2AError::InvalidJson(format!(
            "JSON-RPC SSE frame has neither 'result' nor 'error': {data}"
        ))
    })?;

    serde_json::from_value(result).map_err(|e| {
        A2AError::InvalidJson(format!(
            "failed to parse SSE event as a stream response: {e} (data: {data})"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(format: SseFormat) -> SseParser {
        SseParser::new(format)
    }

    #[test]
    fn comments_fields_and_blanks_yield_nothing() {
        let mut p = parser(SseFormat::Raw);
        assert!(p.parse_line("").unwrap().is_none());
        assert!(p.parse_line(": keepalive").unwrap().is_none());
        assert!(p.parse_line("id: 123").unwrap().is_none());
        assert!(p.parse_line("retry: 5000").unwrap().is_none());
        assert!(p.parse_line("data: [DONE]").unwrap().is_none());
        assert!(p.parse_line("data:").unwrap().is_none());
    }

    #[test]
    fn raw_frame_parses_domain_event() {
        let mut p = parser(SseFormat::Raw);
        let event = p
            .parse_line(r#"data: {"kind":"status-update","taskId":"t1","contextId":"c1","status":{"state":"working"},"final":false}"#)
            .unwrap()
            .unwrap();
        assert!(matches!(event, StreamResponse::StatusUpdate(_)));
    }

    #[test]
    fn raw_error_frame_becomes_canonical_error() {
        let mut p = parser(SseFormat::Raw);
        assert!(p.parse_line("event: error").unwrap().is_none());
        let err = p
            .parse_line(r#"data: {"code":-32001,"message":"no such task"}"#)
            .unwrap_err();
        assert!(matches!(err, A2AError::TaskNotFound { .. }));
    }

    #[test]
    fn blank_line_resets_event_name() {
        let mut p = parser(SseFormat::Raw);
        assert!(p.parse_line("event: error").unwrap().is_none());
        assert!(p.parse_line("").unwrap().is_none());
        // Next frame is a normal data frame again.
        let event = p
            .parse_line(r#"data: {"kind":"message","messageId":"m1","role":"agent","parts":[]}"#)
            .unwrap()
            .unwrap();
        assert!(matches!(event, StreamResponse::Message(_)));
    }

    #[test]
    fn json_rpc_frame_unwraps_result() {
        let mut p = parser(SseFormat::JsonRpcEnvelope);
        let event = p
            .parse_line(r#"data: {"jsonrpc":"2.0","id":"1","result":{"kind":"message","messageId":"m1","role":"agent","parts":[]}}"#)
            .unwrap()
            .unwrap();
        assert!(matches!(event, StreamResponse::Message(_)));
    }

    #[test]
    fn json_rpc_error_frame_keeps_code() {
        let mut p = parser(SseFormat::JsonRpcEnvelope);
        let err = p
            .parse_line(r#"data: {"jsonrpc":"2.0","id":"1","error":{"code":-32002,"message":"terminal"}}"#)
            .unwrap_err();
        assert!(matches!(err, A2AError::TaskNotCancelable { .. }));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let mut p = parser(SseFormat::Raw);
        assert!(p.parse_line("data: {not valid json}").is_err());
    }
}
