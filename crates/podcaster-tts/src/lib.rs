//! Text-to-speech providers and dispatch.
//!
//! A lazy provider pool ([`ProviderSet`]), five HTTP providers behind the
//! [`podcaster_core::SpeechProvider`] capability set, the GCP credential
//! chain, the retry helper and the batch/per-segment [`Dispatcher`].

mod auth;
mod dispatch;
mod providers;
mod rate;
mod registry;
mod retry;

pub use auth::{AuthError, GcpTokenSource};
pub use dispatch::{DispatchError, Dispatcher, ProviderLookup};
pub use providers::{
    voice_catalog, ElevenLabsProvider, GeminiProvider, GoogleTtsProvider, OpenAiProvider,
    VertexProvider,
};
pub use rate::RateGate;
pub use registry::{batch_disabled_from_env, ProviderCredentials, ProviderSet};
pub use retry::with_retry;
