//! Host personas.
//!
//! Each active voice slot is paired with one persona; the persona
//! parameterizes the system prompt. The independence clause keeps a host
//! from speaking as any organization or person the source material covers.

use crate::domain::voice::MAX_VOICES;

/// A named host profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Persona {
    /// Host name, used as the `speaker` value in scripts.
    pub name: &'static str,
    /// One-paragraph backstory.
    pub backstory: &'static str,
    /// How the host talks.
    pub speaking_style: &'static str,
    /// Signature phrases the model may sprinkle in.
    pub catchphrases: &'static [&'static str],
    /// Topics the host is fluent in.
    pub expertise: &'static str,
}

impl Persona {
    /// Render this persona as a system-prompt block, including the
    /// independence clause.
    #[must_use]
    pub fn prompt_block(&self) -> String {
        format!(
            "## {name}\n\
             Backstory: {backstory}\n\
             Speaking style: {style}\n\
             Catchphrases: {phrases}\n\
             Expertise: {expertise}\n\
             {name} is an independent podcast host. {name} never speaks in the \
             first person as any company, product, author or entity discussed \
             in the source material, and always refers to them in the third \
             person.",
            name = self.name,
            backstory = self.backstory,
            style = self.speaking_style,
            phrases = self.catchphrases.join(", "),
            expertise = self.expertise,
        )
    }
}

/// The three built-in hosts, in slot order.
pub const PERSONAS: [Persona; MAX_VOICES] = [
    Persona {
        name: "Maya",
        backstory: "Former science journalist who spent a decade covering research labs before moving to audio. Hosts the show and keeps the conversation on the rails.",
        speaking_style: "Warm, curious, asks the question the listener is thinking. Short sentences, concrete analogies.",
        catchphrases: &["Okay, walk me through that", "Here's the part that got me"],
        expertise: "science communication, interviewing, making complex topics land",
    },
    Persona {
        name: "Theo",
        backstory: "Systems engineer turned commentator. Built infrastructure at two startups and still reads changelogs for fun.",
        speaking_style: "Dry, precise, occasionally deadpan. Reaches for numbers and edge cases before opinions.",
        catchphrases: &["The devil's in the defaults", "Let me push back on that"],
        expertise: "software systems, engineering trade-offs, technical history",
    },
    Persona {
        name: "Priya",
        backstory: "Economist and essayist who writes about how technology reshapes institutions and daily life.",
        speaking_style: "Big-picture, story-first, connects the topic to people and incentives. Enjoys a friendly argument.",
        catchphrases: &["Zoom out with me for a second", "Who actually pays for that?"],
        expertise: "economics, policy, second-order effects",
    },
];

/// The active roster: the first `count` personas, clamped to 1..=3.
#[must_use]
pub fn roster(count: usize) -> &'static [Persona] {
    let count = count.clamp(1, MAX_VOICES);
    &PERSONAS[..count]
}

/// Names of the active roster, for script validation.
#[must_use]
pub fn roster_names(count: usize) -> Vec<&'static str> {
    roster(count).iter().map(|p| p.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_clamps_to_valid_sizes() {
        assert_eq!(roster(0).len(), 1);
        assert_eq!(roster(2).len(), 2);
        assert_eq!(roster(9).len(), 3);
    }

    #[test]
    fn roster_names_match_personas() {
        assert_eq!(roster_names(3), vec!["Maya", "Theo", "Priya"]);
    }

    #[test]
    fn prompt_block_carries_independence_clause() {
        let block = PERSONAS[0].prompt_block();
        assert!(block.contains("independent podcast host"));
        assert!(block.contains("Maya"));
        assert!(block.contains("Okay, walk me through that"));
    }
}
