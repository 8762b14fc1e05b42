//! What the player is told when a round resolves.

use rand::Rng;
use serde::Serialize;

use crate::palette::Color;
use crate::scoring::Bonus;

const MSG_CORRECT: [&str; 9] = [
    "Nice one!",
    "Nailed it!",
    "You're on fire!",
    "Amazing!",
    "Keep it up!",
    "Color genius!",
    "Unstoppable!",
    "Brilliant!",
    "Perfect eye!",
];

const MSG_WRONG: [&str; 5] = [
    "So close! Try again",
    "Don't give up!",
    "Better luck next time",
    "Almost!",
    "You'll get the next one!",
];

const MSG_TIMEOUT: [&str; 3] = ["Too slow!", "Time ran out!", "Tick tock!"];

/// How a round resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Correct,
    Wrong,
    Timeout,
}

/// Audio hint for the presenter's sound collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundCue {
    Correct,
    Combo,
    Wrong,
    Timeout,
}

/// Feedback for one resolved round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub kind: Resolution,
    /// The color the word was rendered in.
    pub answer: Color,
    /// What the player picked; `None` on timeout.
    pub guessed: Option<Color>,
    /// Points added to the score by this round.
    pub points: u32,
    pub bonus: Bonus,
    /// Motivational line.
    pub message: &'static str,
    /// `None` when sound is disabled.
    pub cue: Option<SoundCue>,
}

impl Feedback {
    pub fn correct(answer: Color, streak: u32, points: u32, sound: bool) -> Self {
        let bonus = Bonus::for_streak(streak);
        let message = match bonus {
            Bonus::Triple => "BONUS x3!",
            Bonus::Double => "DOUBLE points!",
            Bonus::None => {
                let idx = (streak.max(1) as usize - 1).min(MSG_CORRECT.len() - 1);
                MSG_CORRECT[idx]
            }
        };
        let cue = if bonus.is_combo() {
            SoundCue::Combo
        } else {
            SoundCue::Correct
        };
        Self {
            kind: Resolution::Correct,
            answer,
            guessed: Some(answer),
            points,
            bonus,
            message,
            cue: sound.then_some(cue),
        }
    }

    pub fn wrong<R: Rng + ?Sized>(answer: Color, guessed: Color, sound: bool, rng: &mut R) -> Self {
        Self {
            kind: Resolution::Wrong,
            answer,
            guessed: Some(guessed),
            points: 0,
            bonus: Bonus::None,
            message: MSG_WRONG[rng.gen_range(0..MSG_WRONG.len())],
            cue: sound.then_some(SoundCue::Wrong),
        }
    }

    pub fn timeout<R: Rng + ?Sized>(answer: Color, sound: bool, rng: &mut R) -> Self {
        Self {
            kind: Resolution::Timeout,
            answer,
            guessed: None,
            points: 0,
            bonus: Bonus::None,
            message: MSG_TIMEOUT[rng.gen_range(0..MSG_TIMEOUT.len())],
            cue: sound.then_some(SoundCue::Timeout),
        }
    }

    /// One-line headline, e.g. "Correct! +20 pts".
    pub fn headline(&self) -> String {
        match self.kind {
            Resolution::Correct => format!("Correct! +{} pts", self.points),
            Resolution::Wrong => format!("Wrong! It was {}.", self.answer.name),
            Resolution::Timeout => format!("Time's up! It was {}.", self.answer.name),
        }
    }
}
