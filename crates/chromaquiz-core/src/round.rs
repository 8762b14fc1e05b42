//! Round generation.
//!
//! A round is one word rendered in one color plus the option set the player
//! picks from once the color is hidden.

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::model::{Difficulty, Mode};
use crate::palette::{option_count_for, palette_for, Color, WORDS};

/// Identifies a round within one engine. Strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RoundId(pub u64);

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything needed to play one round. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSpec {
    pub id: RoundId,
    /// The color the word is rendered in; the correct answer.
    pub answer: Color,
    /// The word shown to the player.
    pub displayed_text: String,
    /// Options in presentation order. Contains `answer` exactly once.
    pub options: Vec<Color>,
}

impl RoundSpec {
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// The offered option with this name, if any.
    pub fn option(&self, name: &str) -> Option<&Color> {
        self.options.iter().find(|c| c.same_name(name))
    }

    pub fn is_answer(&self, name: &str) -> bool {
        self.answer.same_name(name)
    }
}

/// Builds rounds from the palettes.
pub struct RoundGenerator<R = StdRng> {
    rng: R,
    next_id: u64,
}

impl RoundGenerator<StdRng> {
    /// Generator seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic generator for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RoundGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RoundGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng, next_id: 1 }
    }

    /// Access to the underlying RNG, for other uniform picks tied to the round.
    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Generate a fresh round for the given tier and mode.
    pub fn generate(&mut self, tier: Difficulty, mode: Mode) -> RoundSpec {
        let palette = palette_for(tier);
        let option_count = option_count_for(tier);

        // Palettes are non-empty by construction.
        let answer = palette[self.rng.gen_range(0..palette.len())];
        let others: Vec<Color> = palette
            .iter()
            .copied()
            .filter(|c| !c.same_name(answer.name))
            .collect();

        let displayed_text = match mode {
            Mode::Normal => WORDS[self.rng.gen_range(0..WORDS.len())].to_string(),
            Mode::Trick => others[self.rng.gen_range(0..others.len())]
                .name
                .to_uppercase(),
        };

        let mut options = Vec::with_capacity(option_count);
        options.push(answer);
        options.extend(
            others
                .choose_multiple(&mut self.rng, option_count - 1)
                .copied(),
        );
        options.shuffle(&mut self.rng);

        let id = RoundId(self.next_id);
        self.next_id += 1;

        RoundSpec {
            id,
            answer,
            displayed_text,
            options,
        }
    }
}
