//! Core data model types for chromaquiz.
//!
//! Difficulty tiers, play modes and the per-session settings that the rest of
//! the system is parameterized by.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty tier. Controls palette size, hue closeness and option count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All tiers, easiest first.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "med" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// How the displayed word is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The word is a neutral noun, unrelated to any color.
    #[default]
    Normal,
    /// The word names a different color than the one it is rendered in.
    Trick,
}

impl Mode {
    /// Instruction shown while the word is visible.
    pub fn prompt(&self) -> &'static str {
        match self {
            Mode::Normal => "Memorize the color!",
            Mode::Trick => "What is the FONT color?",
        }
    }

    /// Persistent banner for the mode, if it needs one.
    pub fn banner(&self) -> Option<&'static str> {
        match self {
            Mode::Normal => None,
            Mode::Trick => Some("TRICK MODE: pick the FONT color, not the word!"),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Normal => write!(f, "normal"),
            Mode::Trick => write!(f, "trick"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(Mode::Normal),
            "trick" | "stroop" => Ok(Mode::Trick),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Settings a session is started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub mode: Mode,
    /// Forwarded to the presenter as sound cues; never affects scoring.
    pub sound_enabled: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            mode: Mode::Normal,
            sound_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_display_and_parse() {
        assert_eq!(Difficulty::Hard.to_string(), "hard");
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("MEDIUM".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!(" hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn mode_display_and_parse() {
        assert_eq!(Mode::Trick.to_string(), "trick");
        assert_eq!("Normal".parse::<Mode>().unwrap(), Mode::Normal);
        assert_eq!("stroop".parse::<Mode>().unwrap(), Mode::Trick);
        assert!("chaos".parse::<Mode>().is_err());
    }

    #[test]
    fn only_trick_mode_has_banner() {
        assert!(Mode::Normal.banner().is_none());
        assert!(Mode::Trick.banner().unwrap().contains("FONT"));
    }

    #[test]
    fn settings_serde_uses_lowercase_names() {
        let settings = GameSettings {
            difficulty: Difficulty::Medium,
            mode: Mode::Trick,
            sound_enabled: false,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"medium\""));
        assert!(json.contains("\"trick\""));
        let back: GameSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
