//! Mood labels attached to journal entries

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A mood picked from a fixed set when writing an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Excited,
    Calm,
    Angry,
    Grateful,
    Anxious,
    Motivated,
}

impl Mood {
    /// Every mood, in display order
    pub const ALL: [Self; 8] = [
        Self::Happy,
        Self::Sad,
        Self::Excited,
        Self::Calm,
        Self::Angry,
        Self::Grateful,
        Self::Anxious,
        Self::Motivated,
    ];

    /// Wire/storage name (lowercase)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Excited => "excited",
            Self::Calm => "calm",
            Self::Angry => "angry",
            Self::Grateful => "grateful",
            Self::Anxious => "anxious",
            Self::Motivated => "motivated",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Sad => "Sad",
            Self::Excited => "Excited",
            Self::Calm => "Calm",
            Self::Angry => "Angry",
            Self::Grateful => "Grateful",
            Self::Anxious => "Anxious",
            Self::Motivated => "Motivated",
        }
    }

    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Sad => "😢",
            Self::Excited => "🤩",
            Self::Calm => "😌",
            Self::Angry => "😠",
            Self::Grateful => "🙏",
            Self::Anxious => "😰",
            Self::Motivated => "💪",
        }
    }

    /// Whether the mood counts toward an improving trend
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(
            self,
            Self::Happy | Self::Excited | Self::Calm | Self::Grateful | Self::Motivated
        )
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mood| mood.as_str() == needle)
            .ok_or_else(|| crate::Error::InvalidInput(format!("Unknown mood: {}", crate::util::compact_text(s))))
    }
}
