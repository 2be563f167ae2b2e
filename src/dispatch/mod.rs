//! Dispatcher — resolves, validates and executes one tool request.
//!
//! Per request: `Received → Resolved → Validated → Executing → {Succeeded | Failed}`.
//! The dispatcher keeps no state between requests; the registry is the only
//! thing it shares with other tasks.
//!
//! Handlers run on their own task so the caller gets control back at the
//! deadline even if the handler never yields. On deadline, or when the caller
//! drops the response future, the handler's `CancellationToken` is cancelled
//! and its task is aborted shortly after.

mod envelope;

pub use envelope::{Envelope, ErrorBody};

use crate::tools::{
    validate, HandlerError, PartialSink, RegisteredTool, ToolHandler, ToolRegistry, ToolRequest,
};
use crate::types::{DispatchConfig, Error, RequestId, Result};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Time a cancelled handler gets to observe its token before its task is aborted.
const ABORT_GRACE: Duration = Duration::from_millis(100);

/// Result from dispatching a request.
#[derive(Debug)]
pub enum DispatchResponse {
    /// Single result value, framed as `final` by the transport.
    Single(Value),
    /// Progressive response — `partial` frames, the last one with `done = true`.
    Stream(mpsc::Receiver<Envelope>),
}

/// Routes requests to registered handlers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, config: DispatchConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Run one request to completion (or to the start of its stream).
    pub async fn run(&self, mut request: ToolRequest) -> Result<DispatchResponse> {
        let request_id = RequestId::from_client(request.request_id.as_deref());
        request.request_id = Some(request_id.to_string());

        let span = tracing::info_span!(
            "dispatch",
            tool = %request.tool_name,
            request_id = %request_id,
        );
        self.run_inner(request).instrument(span).await
    }

    /// Run one request and collapse the outcome into its terminal envelope.
    ///
    /// Progressive responses are drained; intermediate frames are discarded.
    pub async fn run_to_envelope(&self, request: ToolRequest) -> Envelope {
        match self.run(request).await {
            Ok(DispatchResponse::Single(result)) => Envelope::final_result(result),
            Ok(DispatchResponse::Stream(mut rx)) => {
                while let Some(frame) = rx.recv().await {
                    if frame.is_terminal() {
                        return frame;
                    }
                }
                Envelope::partial_error("stream ended without a terminal frame")
            }
            Err(err) => Envelope::from(&err),
        }
    }

    async fn run_inner(&self, request: ToolRequest) -> Result<DispatchResponse> {
        // Received → Resolved
        if request.tool_name.is_empty() {
            tracing::warn!("Rejected request without tool_name");
            return Err(Error::MissingToolName);
        }

        let tool = match self.registry.resolve(&request.tool_name).await {
            Some(tool) => tool,
            None => {
                tracing::warn!("Unknown tool requested: {}", request.tool_name);
                return Err(Error::unknown_tool(request.tool_name));
            }
        };

        // Resolved → Validated
        if let Err(e) = validate(&request.input, &tool.definition.parameters) {
            tracing::warn!(
                "Parameter validation failed for tool {}: {}",
                request.tool_name,
                e
            );
            return Err(e.into());
        }

        // Validated → Executing
        let deadline = self.config.effective_timeout(request.timeout_ms);

        if tool.handler.streams_output() {
            if !self.config.streaming_enabled {
                tracing::error!(
                    "Tool {} streams output but streaming is disabled",
                    request.tool_name
                );
                return Err(Error::streaming_unsupported(format!(
                    "tool {} produces progressive output",
                    request.tool_name
                )));
            }
            tracing::debug!("Streaming response for tool: {}", request.tool_name);
            let rx = self.spawn_stream(tool, request, deadline);
            return Ok(DispatchResponse::Stream(rx));
        }

        let tool_name = request.tool_name.clone();
        let handler = tool.handler;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let started = Instant::now();

        let outcome = run_bounded(
            &tool_name,
            async move { handler.handle(request, token).await },
            cancel,
            deadline,
        )
        .await;

        match outcome {
            Ok(result) => {
                tracing::debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Successfully processed request for tool: {}",
                    tool_name
                );
                Ok(DispatchResponse::Single(result))
            }
            Err(e) => {
                tracing::error!("Handler error for tool {}: {}", tool_name, e);
                Err(e)
            }
        }
    }

    /// Start a progressive response. The returned receiver yields partial
    /// frames and always ends with exactly one `done = true` frame.
    fn spawn_stream(
        &self,
        tool: RegisteredTool,
        request: ToolRequest,
        deadline: Option<Duration>,
    ) -> mpsc::Receiver<Envelope> {
        let (tx, rx) = mpsc::channel(self.config.stream_channel_capacity);
        let sink = PartialSink::new(tx.clone());
        let tool_name = request.tool_name.clone();
        let handler: Arc<dyn ToolHandler> = tool.handler;
        let cancel = CancellationToken::new();

        let pump = async move {
            let token = cancel.clone();
            let work = async move { handler.handle_stream(request, sink, token).await };

            let outcome = tokio::select! {
                _ = tx.closed() => {
                    tracing::debug!("Caller went away, cancelling tool: {}", tool_name);
                    cancel.cancel();
                    return;
                }
                outcome = run_bounded(&tool_name, work, cancel.clone(), deadline) => outcome,
            };

            let terminal = match outcome {
                Ok(content) => {
                    tracing::debug!("Finished streaming response for tool: {}", tool_name);
                    Envelope::partial(content, true)
                }
                Err(e) => {
                    tracing::error!("Handler error for tool {}: {}", tool_name, e);
                    Envelope::partial_error(e.to_string())
                }
            };
            // Receiver may already be gone; nothing left to deliver to.
            let _ = tx.send(terminal).await;
        };

        tokio::spawn(pump.in_current_span());
        rx
    }
}

/// Cancels the handler's token when dropped, then aborts its task after
/// [`ABORT_GRACE`]. The caller never waits for either.
struct TaskGuard {
    cancel: CancellationToken,
    abort: AbortHandle,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
        if self.abort.is_finished() {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let abort = self.abort.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(ABORT_GRACE).await;
                    abort.abort();
                });
            }
            Err(_) => self.abort.abort(),
        }
    }
}

/// Execute handler work on its own task, bounded by `deadline`.
async fn run_bounded<F>(
    tool_name: &str,
    work: F,
    cancel: CancellationToken,
    deadline: Option<Duration>,
) -> Result<Value>
where
    F: Future<Output = std::result::Result<Value, HandlerError>> + Send + 'static,
{
    let task = tokio::spawn(work.in_current_span());
    let _guard = TaskGuard {
        cancel,
        abort: task.abort_handle(),
    };

    let joined = match deadline {
        Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
            Error::timeout(format!(
                "tool {} did not complete within {}ms",
                tool_name,
                limit.as_millis()
            ))
        })?,
        None => task.await,
    };

    match joined {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(Error::HandlerFailure(e.into_message())),
        Err(join_err) if join_err.is_panic() => Err(Error::handler_failure(format!(
            "tool {} panicked",
            tool_name
        ))),
        Err(_) => Err(Error::handler_failure(format!(
            "tool {} was cancelled",
            tool_name
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================
