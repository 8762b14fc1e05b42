//! Capabilities the core consumes from its collaborators.
//!
//! The UI layer implements [`Presenter`]; storage backends implement
//! [`KeyValueStore`] (raw medium) or [`StatsStore`] (typed stats). Concrete
//! stores live in the `chromaquiz-store` crate.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::feedback::Feedback;
use crate::palette::Color;
use crate::round::RoundId;
use crate::session::SessionStatus;
use crate::stats::{PersistentStats, SessionSummary};

// ---------------------------------------------------------------------------
// Presenter trait
// ---------------------------------------------------------------------------

/// Renders the game. Called only from the engine loop, one call at a time.
///
/// Input flows the other way, through a
/// [`GameHandle`](crate::engine::GameHandle).
pub trait Presenter: Send {
    /// Show the word in its render color; the memorize phase begins.
    fn show_round(&mut self, text: &str, color: &Color);

    /// Remove the color distinction from the word.
    fn hide_color_reveal_word(&mut self);

    /// Show the options for `round`. Guesses must quote the same round id.
    fn show_options(&mut self, round: RoundId, options: &[Color]);

    /// The round resolved.
    fn show_feedback(&mut self, feedback: &Feedback);

    /// The session ended.
    fn show_summary(&mut self, summary: &SessionSummary);

    /// Seconds left on the round countdown, once per second.
    fn on_timer_tick(&mut self, seconds_left: u32);

    /// Score, streak and live accuracy changed.
    fn show_status(&mut self, _status: &SessionStatus) {}
}

// ---------------------------------------------------------------------------
// Storage traits
// ---------------------------------------------------------------------------

/// Raw string key-value medium.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value for `key`, `None` if never set.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Set `key` to `value`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Set several keys at once. Backends that can write atomically override
    /// this; the default writes one key at a time.
    async fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }
}

/// Typed access to the cross-session stats.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn read(&self) -> Result<PersistentStats, StoreError>;

    /// Replace the stored stats. Repeating an identical write is a no-op.
    async fn write(&self, stats: &PersistentStats) -> Result<(), StoreError>;
}
