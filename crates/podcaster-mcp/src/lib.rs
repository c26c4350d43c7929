//! Request-scoped tool surface for podcast generation.
//!
//! Exposes the six tools (`generate_podcast`, `get_podcast`,
//! `list_podcasts`, `list_voices`, `list_options`, `server_info`) as
//! `name + JSON args → JSON result` handlers over an injected
//! [`PodcastService`]. The RPC transport itself is out of scope.

mod dto;
mod error;
mod service;
mod tools;

pub use dto::{
    GenerateRequest, GenerateResponse, ListResponse, OptionsResponse, PodcastStatus,
    ServerInfoResponse, VoicesResponse, DEFAULT_MODEL,
};
pub use error::ServiceError;
pub use service::PodcastService;
pub use tools::{error_payload, CallContext, ToolRegistry, TOOL_NAMES};
