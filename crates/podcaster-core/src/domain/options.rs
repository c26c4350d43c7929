//! Generation options: tone, duration, style, episode format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::voice::ProviderKind;

/// Conversational register of the episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Relaxed, chatty delivery.
    #[default]
    Casual,
    /// Precise, jargon-tolerant delivery.
    Technical,
    /// Teaching-oriented delivery that assumes no prior knowledge.
    Educational,
}

impl Tone {
    /// Canonical lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::Technical => "technical",
            Self::Educational => "educational",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "casual" => Ok(Self::Casual),
            "technical" => Ok(Self::Technical),
            "educational" => Ok(Self::Educational),
            other => Err(format!("unknown tone '{other}'")),
        }
    }
}

/// Target episode length preset.
///
/// The preset calibrates the model's output-token cap; the actual length
/// follows from the produced script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationPreset {
    /// Roughly 3–5 minutes.
    Short,
    /// Roughly 8–12 minutes.
    #[default]
    Standard,
    /// Roughly 20–30 minutes.
    Long,
    /// An hour-scale deep session.
    Deep,
}

impl DurationPreset {
    /// All presets in ascending length order.
    pub const ALL: [Self; 4] = [Self::Short, Self::Standard, Self::Long, Self::Deep];

    /// Output-token cap handed to the language model for this preset.
    #[must_use]
    pub const fn max_output_tokens(&self) -> u32 {
        match self {
            Self::Short | Self::Standard => 8192,
            Self::Long => 24576,
            Self::Deep => 32768,
        }
    }

    /// Canonical lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Standard => "standard",
            Self::Long => "long",
            Self::Deep => "deep",
        }
    }

    /// Human target-length hint embedded in the prompt.
    #[must_use]
    pub const fn target_hint(&self) -> &'static str {
        match self {
            Self::Short => "about 4 minutes of dialogue",
            Self::Standard => "about 10 minutes of dialogue",
            Self::Long => "about 25 minutes of dialogue",
            Self::Deep => "a deep session of 45 minutes or more",
        }
    }
}

impl fmt::Display for DurationPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DurationPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "standard" => Ok(Self::Standard),
            "long" => Ok(Self::Long),
            "deep" => Ok(Self::Deep),
            other => Err(format!("unknown duration preset '{other}'")),
        }
    }
}

/// Optional stylistic flavors layered on top of the format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// Jokes and playful tangents welcome.
    Humor,
    /// Lean into surprising facts.
    Wow,
    /// Keep it sober and measured.
    Serious,
    /// Hosts take opposing positions.
    Debate,
    /// Narrative arc over bullet points.
    Storytelling,
}

impl Style {
    /// All style flags.
    pub const ALL: [Self; 5] = [
        Self::Humor,
        Self::Wow,
        Self::Serious,
        Self::Debate,
        Self::Storytelling,
    ];

    /// Canonical lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Humor => "humor",
            Self::Wow => "wow",
            Self::Serious => "serious",
            Self::Debate => "debate",
            Self::Storytelling => "storytelling",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "humor" => Ok(Self::Humor),
            "wow" => Ok(Self::Wow),
            "serious" => Ok(Self::Serious),
            "debate" => Ok(Self::Debate),
            "storytelling" => Ok(Self::Storytelling),
            other => Err(format!("unknown style '{other}'")),
        }
    }
}

/// Overall shape of the episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EpisodeFormat {
    /// Free-flowing conversation between the hosts.
    #[default]
    Conversation,
    /// One host interviews the other(s).
    Interview,
    /// Long-form exploration of a single thread.
    DeepDive,
    /// Structured explainer aimed at newcomers.
    Explainer,
    /// Hosts argue opposing sides.
    Debate,
    /// News-bulletin pacing.
    News,
    /// Narrative storytelling.
    Storytelling,
    /// One host plays devil's advocate throughout.
    Challenger,
}

impl EpisodeFormat {
    /// All formats in display order.
    pub const ALL: [Self; 8] = [
        Self::Conversation,
        Self::Interview,
        Self::DeepDive,
        Self::Explainer,
        Self::Debate,
        Self::News,
        Self::Storytelling,
        Self::Challenger,
    ];

    /// Canonical kebab-case label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::Interview => "interview",
            Self::DeepDive => "deep-dive",
            Self::Explainer => "explainer",
            Self::Debate => "debate",
            Self::News => "news",
            Self::Storytelling => "storytelling",
            Self::Challenger => "challenger",
        }
    }
}

impl fmt::Display for EpisodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EpisodeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "conversation" => Ok(Self::Conversation),
            "interview" => Ok(Self::Interview),
            "deep-dive" | "deepdive" => Ok(Self::DeepDive),
            "explainer" => Ok(Self::Explainer),
            "debate" => Ok(Self::Debate),
            "news" => Ok(Self::News),
            "storytelling" => Ok(Self::Storytelling),
            "challenger" => Ok(Self::Challenger),
            other => Err(format!("unknown episode format '{other}'")),
        }
    }
}

/// Everything needed to run one generation job.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EpisodeSpec {
    /// Source to ingest (URL, `.pdf` path or text-file path). `None` when
    /// `input_text` or `from_script` supplies the material instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Inline source text, mutually exclusive with `source`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
    /// Path to a previously persisted script; skips stages 1 and 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_script: Option<String>,
    /// Stop after persisting the script.
    #[serde(default)]
    pub script_only: bool,
    /// Optional topic focus for the generator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Conversational register.
    #[serde(default)]
    pub tone: Tone,
    /// Target length preset.
    #[serde(default)]
    pub duration: DurationPreset,
    /// Stylistic flavors.
    #[serde(default)]
    pub styles: Vec<Style>,
    /// Episode shape.
    #[serde(default)]
    pub format: EpisodeFormat,
    /// Number of active hosts (1–3).
    #[serde(default = "default_voices")]
    pub voices: u8,
    /// Language model identifier handed to the script backend.
    pub model: String,
    /// TTS provider tag.
    #[serde(default)]
    pub tts: ProviderKind,
    /// Per-slot voice-id overrides (voice-1..voice-3).
    #[serde(default)]
    pub voice_overrides: [Option<String>; 3],
    /// Per-run opt-out of the batch synthesis path. The operator's
    /// per-provider batch switch on the provider pool applies regardless
    /// of this flag.
    #[serde(default)]
    pub disable_batch: bool,
    /// Per-request language-model API key. Overrides the backend's
    /// configured credential; never serialized.
    #[serde(skip_serializing, default)]
    pub llm_api_key: Option<String>,
}

const fn default_voices() -> u8 {
    2
}

impl EpisodeSpec {
    /// Active host count clamped to the valid 1–3 range.
    #[must_use]
    pub fn voice_count(&self) -> usize {
        usize::from(self.voices).clamp(1, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_caps_match_presets() {
        assert_eq!(DurationPreset::Short.max_output_tokens(), 8192);
        assert_eq!(DurationPreset::Standard.max_output_tokens(), 8192);
        assert_eq!(DurationPreset::Long.max_output_tokens(), 24576);
        assert_eq!(DurationPreset::Deep.max_output_tokens(), 32768);
    }

    #[test]
    fn format_labels_are_kebab_case() {
        assert_eq!(EpisodeFormat::DeepDive.as_str(), "deep-dive");
        assert_eq!(
            "deep-dive".parse::<EpisodeFormat>().unwrap(),
            EpisodeFormat::DeepDive
        );
    }

    #[test]
    fn voice_count_is_clamped() {
        let mut spec = EpisodeSpec {
            source: None,
            input_text: Some("text".into()),
            from_script: None,
            script_only: false,
            topic: None,
            tone: Tone::default(),
            duration: DurationPreset::default(),
            styles: vec![],
            format: EpisodeFormat::default(),
            voices: 0,
            model: "test".into(),
            tts: ProviderKind::Gemini,
            voice_overrides: [None, None, None],
            disable_batch: false,
            llm_api_key: None,
        };
        assert_eq!(spec.voice_count(), 1);
        spec.voices = 7;
        assert_eq!(spec.voice_count(), 3);
    }
}
