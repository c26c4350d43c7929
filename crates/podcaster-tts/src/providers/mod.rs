//! Concrete speech providers.

mod elevenlabs;
mod gemini;
mod googletts;
mod openai;
pub(crate) mod util;
mod vertex;

pub use elevenlabs::ElevenLabsProvider;
pub use gemini::GeminiProvider;
pub use googletts::GoogleTtsProvider;
pub use openai::OpenAiProvider;
pub use vertex::VertexProvider;

use podcaster_core::{ProviderKind, VoiceInfo};

/// Selectable voices for a provider tag, without constructing the provider
/// (and therefore without requiring credentials). Serves `list_voices`.
#[must_use]
pub fn voice_catalog(kind: ProviderKind) -> Vec<VoiceInfo> {
    match kind {
        ProviderKind::Gemini => gemini::catalog(),
        ProviderKind::Elevenlabs => elevenlabs::catalog(),
        ProviderKind::Openai => openai::catalog(),
        ProviderKind::Googletts => googletts::catalog(),
        ProviderKind::Vertex => vertex::catalog(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_provider_has_a_catalog_with_defaults() {
        for kind in ProviderKind::ALL {
            let catalog = voice_catalog(kind);
            assert!(catalog.len() >= 3, "{kind} catalog too small");
            for slot in 1..=3u8 {
                assert!(
                    catalog.iter().any(|v| v.default_for == Some(slot)),
                    "{kind} has no default for slot {slot}"
                );
            }
        }
    }
}
