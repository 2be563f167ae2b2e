//! Tool execution endpoint.

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::dispatch::{DispatchResponse, Envelope};
use crate::http::codec::{frame_stream, CONTENT_TYPE_JSON};
use crate::http::AppState;
use crate::tools::ToolRequest;
use crate::types::{Error, Result};

/// `POST /v1/run`
///
/// An unparseable body yields a `MALFORMED_REQUEST` error envelope.
pub async fn run_tool(State(state): State<AppState>, body: Bytes) -> Result<Response> {
    let request: ToolRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!("Failed to parse run request: {}", e);
        Error::malformed(e.to_string())
    })?;

    match state.dispatcher.run(request).await? {
        DispatchResponse::Single(result) => {
            Ok(Json(Envelope::final_result(result)).into_response())
        }
        DispatchResponse::Stream(rx) => Ok((
            [(header::CONTENT_TYPE, CONTENT_TYPE_JSON)],
            Body::from_stream(frame_stream(rx)),
        )
            .into_response()),
    }
}
