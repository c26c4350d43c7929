//! The `tool.call(name, args) → result` dispatch table.
//!
//! The transport (session handshake, JSON framing) lives outside this
//! crate; it hands tool calls here and serializes whatever comes back.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::dto::GenerateRequest;
use crate::error::ServiceError;
use crate::service::PodcastService;

/// All tool names this registry answers to.
pub const TOOL_NAMES: [&str; 6] = [
    "generate_podcast",
    "get_podcast",
    "list_podcasts",
    "list_voices",
    "list_options",
    "server_info",
];

/// Per-call context supplied by the transport.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// Caller identity (already authenticated upstream).
    pub owner: String,
    /// Trace id of the originating request, propagated into the worker span.
    pub trace_id: Option<String>,
}

/// Tool-call dispatcher over a [`PodcastService`].
pub struct ToolRegistry {
    service: Arc<PodcastService>,
}

impl ToolRegistry {
    /// Create a registry over a service.
    pub fn new(service: Arc<PodcastService>) -> Self {
        Self { service }
    }

    /// Dispatch one tool call.
    pub async fn call(
        &self,
        name: &str,
        args: Value,
        context: &CallContext,
    ) -> Result<Value, ServiceError> {
        debug!(tool = name, "dispatching tool call");
        match name {
            "generate_podcast" => {
                let request: GenerateRequest = serde_json::from_value(args)
                    .map_err(|e| ServiceError::InvalidParams(e.to_string()))?;
                let response = self
                    .service
                    .generate(request, &context.owner, context.trace_id.clone())
                    .await?;
                to_value(&response)
            }
            "get_podcast" => {
                let id = required_str(&args, "podcast_id")?;
                let response = self.service.get(&id).await?;
                to_value(&response)
            }
            "list_podcasts" => {
                let limit = args
                    .get("limit")
                    .and_then(Value::as_u64)
                    .map(|l| l.min(u64::from(u32::MAX)) as u32);
                let cursor = args.get("cursor").and_then(Value::as_str).map(String::from);
                let response = self.service.list(limit, cursor.as_deref()).await?;
                to_value(&response)
            }
            "list_voices" => {
                let provider = required_str(&args, "provider")?;
                let response = self.service.voices(&provider)?;
                to_value(&response)
            }
            "list_options" => to_value(&self.service.options()),
            "server_info" => to_value(&self.service.server_info()),
            other => Err(ServiceError::UnknownTool(other.to_string())),
        }
    }
}

fn required_str(args: &Value, field: &str) -> Result<String, ServiceError> {
    args.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(String::from)
        .ok_or_else(|| ServiceError::InvalidParams(format!("'{field}' is required")))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, ServiceError> {
    serde_json::to_value(value).map_err(|e| ServiceError::Internal(e.to_string()))
}

/// Render a service error as the transport-facing error payload.
#[must_use]
pub fn error_payload(error: &ServiceError) -> Value {
    let retriable = matches!(error, ServiceError::Busy(_));
    json!({ "error": error.to_string(), "retriable": retriable })
}
