//! Keyword classifier for candidate messages.

/// What a candidate message signals, beyond its literal content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Asks for the question to be rephrased.
    Confused,
    /// Expresses stress or anxiety.
    Emotional,
    /// Seeks reassurance about how the interview went.
    EmotionalEnding,
    Neutral,
}

impl Signal {
    /// True for both emotional variants.
    pub fn is_emotional(self) -> bool {
        matches!(self, Signal::Emotional | Signal::EmotionalEnding)
    }
}

const CONFUSION_PHRASES: &[&str] = &[
    "don't understand",
    "dont understand",
    "don’t understand",
    "i'm confused",
    "im confused",
    "not sure what you mean",
    "what do you mean",
    "can you rephrase",
    "can you say it differently",
    "you are repeating",
    "this is repeated",
    "same question",
];

const EMOTIONAL_PHRASES: &[&str] = &[
    "anxious",
    "anxiety",
    "nervous",
    "stressed",
    "worried",
    "sad",
    "frustrated",
    "overwhelmed",
    "not confident",
    "i'm scared",
    "im scared",
    "i feel bad",
];

const EMOTIONAL_ENDING_PHRASES: &[&str] = &[
    "hope",
    "nervous",
    "worried",
    "did i do well",
    "not confident",
    "anxious",
];

/// Classifies a message. Precedence: Confused, Emotional, EmotionalEnding, Neutral.
pub fn classify(text: &str) -> Signal {
    let lower = text.to_lowercase();
    let matches_any = |phrases: &[&str]| phrases.iter().any(|p| lower.contains(p));

    if matches_any(CONFUSION_PHRASES) {
        Signal::Confused
    } else if matches_any(EMOTIONAL_PHRASES) {
        Signal::Emotional
    } else if matches_any(EMOTIONAL_ENDING_PHRASES) {
        Signal::EmotionalEnding
    } else {
        Signal::Neutral
    }
}
