/// Claude models usable for the strengths analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClaudeModel {
    #[default]
    Haiku35,
    Sonnet4,
    Opus4,
    Override(String),
}

impl ClaudeModel {
    pub const HAIKU_3_5: &'static str = "claude-3-5-haiku-20241022";
    pub const SONNET_4: &'static str = "claude-sonnet-4-20250514";
    pub const OPUS_4: &'static str = "claude-opus-4-20250514";

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Haiku35 => Self::HAIKU_3_5,
            Self::Sonnet4 => Self::SONNET_4,
            Self::Opus4 => Self::OPUS_4,
            Self::Override(s) => s.as_str(),
        }
    }

    /// Map a CLI/model string to a known variant, falling back to an override.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "haiku" | Self::HAIKU_3_5 => Self::Haiku35,
            "sonnet" | Self::SONNET_4 => Self::Sonnet4,
            "opus" | Self::OPUS_4 => Self::Opus4,
            other => Self::Override(other.to_string()),
        }
    }
}
