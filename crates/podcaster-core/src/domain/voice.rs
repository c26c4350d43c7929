//! Voices, provider tags and the voice map.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Maximum number of host slots in a voice map.
pub const MAX_VOICES: usize = 3;

/// Known TTS provider tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google AI Studio speech generation. API key, batch-capable, strict limits.
    #[default]
    Gemini,
    /// ElevenLabs dialogue synthesis. API key, batch-capable.
    Elevenlabs,
    /// OpenAI speech endpoint. API key, per-segment only.
    Openai,
    /// Google Cloud Text-to-Speech. Credential chain, per-segment only.
    Googletts,
    /// Vertex-hosted speech generation. Credential chain (OAuth2), batch-capable.
    Vertex,
}

impl ProviderKind {
    /// All known provider tags, in display order.
    pub const ALL: [Self; 5] = [
        Self::Gemini,
        Self::Elevenlabs,
        Self::Openai,
        Self::Googletts,
        Self::Vertex,
    ];

    /// Canonical lowercase tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Elevenlabs => "elevenlabs",
            Self::Openai => "openai",
            Self::Googletts => "googletts",
            Self::Vertex => "vertex",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "elevenlabs" => Ok(Self::Elevenlabs),
            "openai" => Ok(Self::Openai),
            "googletts" => Ok(Self::Googletts),
            "vertex" => Ok(Self::Vertex),
            other => Err(format!("unknown TTS provider '{other}'")),
        }
    }
}

/// A provider-specific voice binding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Provider-specific voice identifier (e.g. `"Kore"`, `"alloy"`).
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Which provider this voice belongs to.
    pub provider: ProviderKind,
}

impl Voice {
    /// Create a voice binding.
    pub fn new(id: impl Into<String>, name: impl Into<String>, provider: ProviderKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider,
        }
    }
}

/// Catalog entry describing a selectable voice, for the `list_voices` surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Provider-specific voice identifier.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// Voice gender label (`"female"`, `"male"`, `"neutral"`).
    pub gender: String,
    /// Short characterization of the voice.
    pub description: String,
    /// Which host slot this voice fills by default, if any (1-based).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_for: Option<u8>,
}

/// Binds the logical host slots (voice-1..voice-3) to concrete voices.
///
/// The active roster size is 1–3; slots beyond the active count are
/// permitted to exist but are never referenced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceMap {
    slots: Vec<Voice>,
}

impl VoiceMap {
    /// Build a voice map from up to [`MAX_VOICES`] slots.
    ///
    /// Returns `None` when `slots` is empty or oversized.
    #[must_use]
    pub fn new(slots: Vec<Voice>) -> Option<Self> {
        if slots.is_empty() || slots.len() > MAX_VOICES {
            return None;
        }
        Some(Self { slots })
    }

    /// Number of bound host slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot is bound. Always false for a constructed map.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Voice for the 0-based host slot.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&Voice> {
        self.slots.get(index)
    }

    /// All bound voices in slot order.
    #[must_use]
    pub fn voices(&self) -> &[Voice] {
        &self.slots
    }

    /// The single provider tag shared by every slot, if there is one.
    ///
    /// Mixed-provider maps return `None`, which forces the per-segment
    /// dispatch path.
    #[must_use]
    pub fn uniform_provider(&self) -> Option<ProviderKind> {
        let first = self.slots.first()?.provider;
        self.slots
            .iter()
            .all(|v| v.provider == first)
            .then_some(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_round_trips() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
        assert!("polly".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn voice_map_rejects_bad_sizes() {
        assert!(VoiceMap::new(vec![]).is_none());
        let v = Voice::new("a", "A", ProviderKind::Gemini);
        assert!(VoiceMap::new(vec![v.clone(); 4]).is_none());
        assert!(VoiceMap::new(vec![v; 3]).is_some());
    }

    #[test]
    fn uniform_provider_detects_mixed_maps() {
        let same = VoiceMap::new(vec![
            Voice::new("a", "A", ProviderKind::Gemini),
            Voice::new("b", "B", ProviderKind::Gemini),
        ])
        .unwrap();
        assert_eq!(same.uniform_provider(), Some(ProviderKind::Gemini));

        let mixed = VoiceMap::new(vec![
            Voice::new("a", "A", ProviderKind::Gemini),
            Voice::new("alloy", "Alloy", ProviderKind::Openai),
        ])
        .unwrap();
        assert_eq!(mixed.uniform_provider(), None);
    }
}
