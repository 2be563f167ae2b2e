//! Frame codec for progressive `/v1/run` responses.
//!
//! Frame format: one JSON-encoded [`Envelope`] per line.
//! ```text
//! {"type":"partial","content":{...},"done":false}\n
//! {"type":"partial","content":{...},"done":true}\n
//! ```
//! The stream ends after the first terminal frame.

use bytes::Bytes;
use futures::stream::{self, Stream};
use tokio::sync::mpsc;

use crate::dispatch::Envelope;

/// Content type of every gateway response body.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Encode one frame, newline-terminated.
pub fn encode_frame(frame: &Envelope) -> std::io::Result<Bytes> {
    let mut buf = serde_json::to_vec(frame).map_err(|e| {
        tracing::error!("Frame encoding failed: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;
    buf.push(b'\n');
    Ok(Bytes::from(buf))
}

struct FrameState {
    rx: mpsc::Receiver<Envelope>,
    finished: bool,
}

/// Turn a dispatcher receiver into a body stream.
///
/// If the channel closes before a terminal frame arrives, a terminal error
/// frame is synthesized so the caller always sees exactly one `done = true`.
pub fn frame_stream(
    rx: mpsc::Receiver<Envelope>,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
    stream::unfold(
        FrameState {
            rx,
            finished: false,
        },
        |mut state| async move {
            if state.finished {
                return None;
            }
            let frame = match state.rx.recv().await {
                Some(frame) => frame,
                None => {
                    tracing::warn!("Response stream ended without a terminal frame");
                    Envelope::partial_error("stream ended without a terminal frame")
                }
            };
            state.finished = frame.is_terminal();
            Some((encode_frame(&frame), state))
        },
    )
}
