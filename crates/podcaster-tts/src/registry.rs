//! Lazy provider pool.
//!
//! Providers are constructed on first request and cached; a lock protects
//! the construct-if-absent step. Clients are not shared across pools, so a
//! pool per job (or per process, at the server's choice) is safe.
//!
//! The pool also carries the operator's per-provider batch switch: batch
//! endpoints with a daily quota are shared by the whole deployment, so
//! disabling one here disables it for every job that uses this pool.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use podcaster_core::{ProviderKind, SpeechError, SpeechProvider};

use crate::auth::GcpTokenSource;
use crate::providers::{
    ElevenLabsProvider, GeminiProvider, GoogleTtsProvider, OpenAiProvider, VertexProvider,
};

/// Per-request credential overrides, keyed by provider.
#[derive(Clone, Debug, Default)]
pub struct ProviderCredentials {
    /// API-key overrides; providers fall back to their environment variables.
    pub api_keys: HashMap<ProviderKind, String>,
}

impl ProviderCredentials {
    fn key_for(&self, kind: ProviderKind) -> Option<&str> {
        self.api_keys.get(&kind).map(String::as_str)
    }
}

/// Parse the operator's batch switch from `PODCASTER_DISABLE_BATCH`
/// (comma-separated provider tags). Unknown tags are warned about and
/// skipped.
#[must_use]
pub fn batch_disabled_from_env() -> HashSet<ProviderKind> {
    let raw = match std::env::var("PODCASTER_DISABLE_BATCH") {
        Ok(raw) => raw,
        Err(_) => return HashSet::new(),
    };
    parse_batch_disabled(&raw)
}

fn parse_batch_disabled(raw: &str) -> HashSet<ProviderKind> {
    let mut disabled = HashSet::new();
    for tag in raw.split(',') {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        match tag.parse::<ProviderKind>() {
            Ok(kind) => {
                disabled.insert(kind);
            }
            Err(_) => warn!(tag, "ignoring unknown provider tag in PODCASTER_DISABLE_BATCH"),
        }
    }
    disabled
}

/// Lazy registry of speech providers.
pub struct ProviderSet {
    credentials: ProviderCredentials,
    disabled_batch: HashSet<ProviderKind>,
    tokens: Arc<GcpTokenSource>,
    cache: Mutex<HashMap<ProviderKind, Arc<dyn SpeechProvider>>>,
}

impl ProviderSet {
    /// Create an empty pool with the given credential overrides.
    #[must_use]
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self {
            credentials,
            disabled_batch: HashSet::new(),
            tokens: Arc::new(GcpTokenSource::new()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Set the providers whose batch path the operator disabled for this
    /// deployment (see [`batch_disabled_from_env`]).
    #[must_use]
    pub fn with_batch_disabled(mut self, disabled: HashSet<ProviderKind>) -> Self {
        self.disabled_batch = disabled;
        self
    }

    /// Whether the operator disabled the batch path for a provider.
    #[must_use]
    pub fn batch_disabled(&self, kind: ProviderKind) -> bool {
        self.disabled_batch.contains(&kind)
    }

    /// Get (or lazily construct) the provider for a tag.
    pub async fn get(&self, kind: ProviderKind) -> Result<Arc<dyn SpeechProvider>, SpeechError> {
        let mut cache = self.cache.lock().await;
        if let Some(provider) = cache.get(&kind) {
            return Ok(Arc::clone(provider));
        }

        debug!(provider = %kind, "constructing speech provider");
        let provider: Arc<dyn SpeechProvider> = match kind {
            ProviderKind::Gemini => {
                Arc::new(GeminiProvider::new(self.credentials.key_for(kind))?)
            }
            ProviderKind::Elevenlabs => {
                Arc::new(ElevenLabsProvider::new(self.credentials.key_for(kind))?)
            }
            ProviderKind::Openai => {
                Arc::new(OpenAiProvider::new(self.credentials.key_for(kind))?)
            }
            ProviderKind::Googletts => {
                Arc::new(GoogleTtsProvider::new(Arc::clone(&self.tokens)))
            }
            ProviderKind::Vertex => Arc::new(VertexProvider::new(Arc::clone(&self.tokens))?),
        };

        cache.insert(kind, Arc::clone(&provider));
        Ok(provider)
    }

    /// Release all cached providers.
    pub async fn close(&self) {
        let mut cache = self.cache.lock().await;
        for (_, provider) in cache.drain() {
            provider.close().await;
        }
    }
}
