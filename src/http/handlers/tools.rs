//! Tool catalog listing.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::http::AppState;
use crate::tools::ToolDefinition;

#[derive(Debug, Serialize)]
pub struct ToolList {
    pub tools: Vec<Arc<ToolDefinition>>,
}

/// `GET /v1/tools`
pub async fn list_tools(State(state): State<AppState>) -> Json<ToolList> {
    Json(ToolList {
        tools: state.registry.list_all().await,
    })
}
