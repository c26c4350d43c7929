//! Prompt construction for the script generator.

use std::fmt::Write as _;

use podcaster_core::{roster, Content, EpisodeFormat, EpisodeSpec, Style, Tone};

/// Compose the system prompt: persona roster plus the output contract.
#[must_use]
pub fn system_prompt(voice_count: usize) -> String {
    let hosts = roster(voice_count);
    let names: Vec<&str> = hosts.iter().map(|p| p.name).collect();

    let mut prompt = String::from(
        "You write complete podcast episode scripts as natural spoken dialogue.\n\
         The show has the following hosts:\n\n",
    );
    for persona in hosts {
        let _ = writeln!(prompt, "{}\n", persona.prompt_block());
    }

    let _ = write!(
        prompt,
        "Rules:\n\
         - Every line of dialogue belongs to exactly one host.\n\
         - Valid speaker names are: {names}.\n\
         - Write for the ear: contractions, reactions, hand-offs between hosts.\n\
         - Do not read URLs, citations or markdown aloud.\n\n\
         You may think first inside <scratchpad>...</scratchpad> markers. \
         After the optional scratchpad, output exactly one JSON object and \
         nothing else, shaped as:\n\
         {{\"title\": string, \"summary\": string, \"segments\": \
         [{{\"speaker\": string, \"text\": string}}, ...]}}",
        names = names.join(", "),
    );
    prompt
}

/// Compose the user prompt: directives plus the source material.
#[must_use]
pub fn user_prompt(content: &Content, spec: &EpisodeSpec) -> String {
    let mut prompt = String::new();

    let _ = writeln!(prompt, "Produce a {} episode.", format_directive(spec.format));
    let _ = writeln!(prompt, "Tone: {}.", tone_directive(spec.tone));
    if !spec.styles.is_empty() {
        let styles: Vec<&str> = spec.styles.iter().map(Style::as_str).collect();
        let _ = writeln!(prompt, "Stylistic flavor: {}.", styles.join(", "));
    }
    let _ = writeln!(prompt, "Target length: {}.", spec.duration.target_hint());
    if let Some(ref topic) = spec.topic {
        let _ = writeln!(prompt, "Focus the discussion on: {topic}.");
    }

    let _ = write!(
        prompt,
        "\nSOURCE MATERIAL\nTitle: {}\n\n{}",
        content.title, content.text
    );
    prompt
}

const fn tone_directive(tone: Tone) -> &'static str {
    match tone {
        Tone::Casual => "relaxed and conversational",
        Tone::Technical => "precise and technically rigorous",
        Tone::Educational => "patient and instructive, assuming no prior knowledge",
    }
}

const fn format_directive(format: EpisodeFormat) -> &'static str {
    match format {
        EpisodeFormat::Conversation => "free-flowing conversation",
        EpisodeFormat::Interview => "host-led interview",
        EpisodeFormat::DeepDive => "single-thread deep dive",
        EpisodeFormat::Explainer => "structured explainer",
        EpisodeFormat::Debate => "two-sided debate",
        EpisodeFormat::News => "news-bulletin style",
        EpisodeFormat::Storytelling => "narrative storytelling",
        EpisodeFormat::Challenger => "devil's-advocate challenge session",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podcaster_core::{DurationPreset, ProviderKind};

    fn spec() -> EpisodeSpec {
        EpisodeSpec {
            source: None,
            input_text: Some("text".into()),
            from_script: None,
            script_only: false,
            topic: Some("river deltas".into()),
            tone: Tone::Technical,
            duration: DurationPreset::Short,
            styles: vec![Style::Humor, Style::Wow],
            format: EpisodeFormat::DeepDive,
            voices: 2,
            model: "m".into(),
            tts: ProviderKind::Gemini,
            voice_overrides: [None, None, None],
            disable_batch: false,
            llm_api_key: None,
        }
    }

    #[test]
    fn system_prompt_lists_active_hosts_only() {
        let prompt = system_prompt(2);
        assert!(prompt.contains("Maya"));
        assert!(prompt.contains("Theo"));
        assert!(!prompt.contains("Priya"));
        assert!(prompt.contains("<scratchpad>"));
        assert!(prompt.contains("\"segments\""));
    }

    #[test]
    fn user_prompt_embeds_directives_and_content() {
        let content = Content::new("body text", "Deltas", "inline");
        let prompt = user_prompt(&content, &spec());
        assert!(prompt.contains("single-thread deep dive"));
        assert!(prompt.contains("technically rigorous"));
        assert!(prompt.contains("humor, wow"));
        assert!(prompt.contains("river deltas"));
        assert!(prompt.contains("about 4 minutes"));
        assert!(prompt.contains("SOURCE MATERIAL"));
        assert!(prompt.contains("body text"));
    }
}
