//! Session state machine.
//!
//! Phases of one session:
//!
//! ```text
//! Memorize --(1.5s)--> [reveal] --> AwaitingGuess --guess--> Resolved(correct) --(1.3s)--> Memorize
//!                                               \--guess--> Resolved(wrong)   --(2.2s)--> Ended
//!                                               \--expire-> Resolved(timeout) --(2.2s)--> Ended
//! ```
//!
//! The machine is synchronous. It renders through a [`Presenter`] and returns
//! [`Effect`]s (delays, timer control, persistence) for the engine to carry
//! out. Every delayed transition carries an [`AlarmToken`] and every timer
//! event a [`RoundId`]; anything that does not match the current phase, round
//! or token is stale and dropped.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::feedback::{Feedback, Resolution};
use crate::model::{Difficulty, GameSettings, Mode};
use crate::round::{RoundGenerator, RoundId, RoundSpec};
use crate::scoring::{accuracy_pct, points_for_streak, DOUBLE_STREAK};
use crate::traits::Presenter;

/// How long the word stays colored before the options appear.
pub const MEMORIZE_DELAY: Duration = Duration::from_millis(1500);
/// Countdown for a guess, in seconds.
pub const ROUND_SECONDS: u32 = 5;
/// Pause after a correct answer before the next round.
pub const DELIGHT_DELAY: Duration = Duration::from_millis(1300);
/// Pause after a wrong answer or timeout before the summary.
pub const REVEAL_DELAY: Duration = Duration::from_millis(2200);

/// Score and counters of the running session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub id: Uuid,
    pub score: u32,
    /// Consecutive correct answers.
    pub streak: u32,
    pub max_streak: u32,
    /// Correct plus wrong guesses. Timeouts are not answers.
    pub total_answered: u32,
    pub total_correct: u32,
    pub difficulty: Difficulty,
    pub mode: Mode,
}

impl SessionState {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            score: 0,
            streak: 0,
            max_streak: 0,
            total_answered: 0,
            total_correct: 0,
            difficulty: settings.difficulty,
            mode: settings.mode,
        }
    }

    /// Count a correct guess and return the points it earned.
    pub fn record_correct(&mut self) -> u32 {
        self.total_answered += 1;
        self.total_correct += 1;
        self.streak += 1;
        self.max_streak = self.max_streak.max(self.streak);
        let points = points_for_streak(self.streak);
        self.score += points;
        points
    }

    pub fn record_wrong(&mut self) {
        self.total_answered += 1;
        self.streak = 0;
    }

    pub fn record_timeout(&mut self) {
        self.streak = 0;
    }

    /// Session accuracy; 0 when nothing was answered.
    pub fn accuracy_pct(&self) -> u32 {
        accuracy_pct(self.total_correct, self.total_answered)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            score: self.score,
            streak: self.streak,
            combo_active: self.streak >= DOUBLE_STREAK,
            live_accuracy_pct: if self.total_answered == 0 {
                100
            } else {
                self.accuracy_pct()
            },
        }
    }
}

/// Live numbers for the in-game header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub score: u32,
    pub streak: u32,
    /// Streak is high enough for a bonus.
    pub combo_active: bool,
    /// 100 before the first answer.
    pub live_accuracy_pct: u32,
}

/// Where the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Word shown in its color; guesses are not possible yet.
    Memorize,
    /// Options shown, countdown running.
    AwaitingGuess,
    /// Round over; waiting out the feedback delay.
    Resolved(Resolution),
    /// No session running. Also the phase before the first start.
    Ended,
}

/// Identifies one scheduled delayed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlarmToken(pub u64);

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The player picked the option named `color` from `round`'s options.
    Guess { round: RoundId, color: String },
    TimerTick { round: RoundId, seconds_left: u32 },
    TimerExpired { round: RoundId },
    /// A scheduled delay elapsed.
    Alarm(AlarmToken),
    /// Abandon/restart request.
    Interrupt,
    /// Start a new session after the previous one ended.
    PlayAgain,
    /// Shut the game down.
    Quit,
}

/// Work the engine must carry out on the machine's behalf, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver `Event::Alarm(token)` after `after`, replacing any pending delay.
    Schedule { token: AlarmToken, after: Duration },
    /// Drop the pending delay, if any.
    CancelScheduled,
    /// Start the round countdown, superseding any running one.
    StartTimer { round: RoundId, seconds: u32 },
    StopTimer,
    /// Persist the finished session and show its summary.
    Finish(SessionState),
    /// Stop the engine.
    Exit,
}

/// The session state machine.
pub struct Session<R = StdRng> {
    settings: GameSettings,
    generator: RoundGenerator<R>,
    state: SessionState,
    phase: Phase,
    /// The current round; dropped as soon as it resolves.
    round: Option<RoundSpec>,
    /// Token of the single delay the machine is waiting for.
    pending: Option<AlarmToken>,
    next_token: u64,
}

impl Session<StdRng> {
    pub fn new(settings: GameSettings) -> Self {
        Self::with_generator(settings, RoundGenerator::new())
    }
}

impl<R: Rng> Session<R> {
    pub fn with_generator(settings: GameSettings, generator: RoundGenerator<R>) -> Self {
        Self {
            settings,
            generator,
            state: SessionState::new(settings),
            phase: Phase::Ended,
            round: None,
            pending: None,
            next_token: 0,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The round being played, if one is in progress.
    pub fn current_round(&self) -> Option<&RoundSpec> {
        self.round.as_ref()
    }

    /// Start a fresh session, discarding the current one.
    pub fn start(&mut self, presenter: &mut dyn Presenter) -> Vec<Effect> {
        self.state = SessionState::new(self.settings);
        tracing::info!(
            session = %self.state.id,
            difficulty = %self.settings.difficulty,
            mode = %self.settings.mode,
            "session started"
        );
        let mut effects = vec![Effect::StopTimer, Effect::CancelScheduled];
        self.pending = None;
        self.begin_round(presenter, &mut effects);
        effects
    }

    /// Feed one event through the machine.
    pub fn handle(&mut self, event: Event, presenter: &mut dyn Presenter) -> Vec<Effect> {
        match event {
            Event::Alarm(token) => self.on_alarm(token, presenter),
            Event::Guess { round, color } => self.on_guess(round, &color, presenter),
            Event::TimerTick {
                round,
                seconds_left,
            } => {
                if self.timer_is_current(round) {
                    presenter.on_timer_tick(seconds_left);
                } else {
                    self.stale("timer tick", round);
                }
                Vec::new()
            }
            Event::TimerExpired { round } => self.on_expired(round, presenter),
            Event::Interrupt => self.on_interrupt(presenter),
            Event::PlayAgain => {
                if self.phase == Phase::Ended {
                    self.start(presenter)
                } else {
                    self.stale("play again", self.phase);
                    Vec::new()
                }
            }
            Event::Quit => self.on_quit(),
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn begin_round(&mut self, presenter: &mut dyn Presenter, effects: &mut Vec<Effect>) {
        let round = self
            .generator
            .generate(self.settings.difficulty, self.settings.mode);
        tracing::debug!(round = %round.id, answer = round.answer.name, "memorize");

        presenter.show_round(&round.displayed_text, &round.answer);
        presenter.show_status(&self.state.status());

        self.round = Some(round);
        self.phase = Phase::Memorize;
        effects.push(self.schedule(MEMORIZE_DELAY));
    }

    fn on_alarm(&mut self, token: AlarmToken, presenter: &mut dyn Presenter) -> Vec<Effect> {
        if self.pending != Some(token) {
            self.stale("alarm", token);
            return Vec::new();
        }
        self.pending = None;

        match self.phase {
            Phase::Memorize => self.reveal(presenter),
            Phase::Resolved(Resolution::Correct) => {
                let mut effects = Vec::new();
                self.begin_round(presenter, &mut effects);
                effects
            }
            Phase::Resolved(Resolution::Wrong | Resolution::Timeout) => self.end(),
            Phase::AwaitingGuess | Phase::Ended => {
                self.stale("alarm", self.phase);
                Vec::new()
            }
        }
    }

    fn reveal(&mut self, presenter: &mut dyn Presenter) -> Vec<Effect> {
        let Some(round) = self.round.as_ref() else {
            self.stale("reveal", "no round");
            return Vec::new();
        };
        let id = round.id;

        presenter.hide_color_reveal_word();
        presenter.show_options(id, &round.options);
        self.phase = Phase::AwaitingGuess;
        tracing::debug!(round = %id, "awaiting guess");

        vec![Effect::StartTimer {
            round: id,
            seconds: ROUND_SECONDS,
        }]
    }

    fn on_guess(&mut self, id: RoundId, color: &str, presenter: &mut dyn Presenter) -> Vec<Effect> {
        if self.phase != Phase::AwaitingGuess {
            self.stale("guess", self.phase);
            return Vec::new();
        }
        let guessed = match self.round.as_ref() {
            Some(round) if round.id == id => round.option(color).copied(),
            _ => {
                self.stale("guess", id);
                return Vec::new();
            }
        };
        let Some(guessed) = guessed else {
            tracing::debug!(round = %id, color, "guess is not one of the offered options");
            return Vec::new();
        };
        let Some(round) = self.round.take() else {
            return Vec::new();
        };

        let sound = self.settings.sound_enabled;
        let mut effects = vec![Effect::StopTimer];

        if round.is_answer(guessed.name) {
            let points = self.state.record_correct();
            let feedback = Feedback::correct(round.answer, self.state.streak, points, sound);
            self.resolve(Resolution::Correct, &feedback, presenter);
            effects.push(self.schedule(DELIGHT_DELAY));
        } else {
            self.state.record_wrong();
            let feedback = Feedback::wrong(round.answer, guessed, sound, self.generator.rng());
            self.resolve(Resolution::Wrong, &feedback, presenter);
            effects.push(self.schedule(REVEAL_DELAY));
        }
        effects
    }

    fn on_expired(&mut self, id: RoundId, presenter: &mut dyn Presenter) -> Vec<Effect> {
        if !self.timer_is_current(id) {
            self.stale("timer expiry", id);
            return Vec::new();
        }
        let Some(round) = self.round.take() else {
            return Vec::new();
        };

        self.state.record_timeout();
        let feedback =
            Feedback::timeout(round.answer, self.settings.sound_enabled, self.generator.rng());
        self.resolve(Resolution::Timeout, &feedback, presenter);

        vec![Effect::StopTimer, self.schedule(REVEAL_DELAY)]
    }

    fn resolve(&mut self, how: Resolution, feedback: &Feedback, presenter: &mut dyn Presenter) {
        presenter.show_feedback(feedback);
        presenter.show_status(&self.state.status());
        self.phase = Phase::Resolved(how);
        tracing::debug!(
            resolution = ?how,
            score = self.state.score,
            streak = self.state.streak,
            "round resolved"
        );
    }

    fn on_interrupt(&mut self, presenter: &mut dyn Presenter) -> Vec<Effect> {
        if self.phase == Phase::Ended {
            self.stale("interrupt", self.phase);
            return Vec::new();
        }
        if self.state.total_answered > 0 {
            tracing::info!(session = %self.state.id, "interrupted, ending session");
            self.end()
        } else {
            tracing::info!(session = %self.state.id, "interrupted before any answer, restarting");
            self.start(presenter)
        }
    }

    fn on_quit(&mut self) -> Vec<Effect> {
        let mut effects = if self.phase != Phase::Ended && self.state.total_answered > 0 {
            self.end()
        } else {
            self.phase = Phase::Ended;
            self.round = None;
            self.pending = None;
            vec![Effect::StopTimer, Effect::CancelScheduled]
        };
        effects.push(Effect::Exit);
        effects
    }

    fn end(&mut self) -> Vec<Effect> {
        self.phase = Phase::Ended;
        self.round = None;
        self.pending = None;
        tracing::info!(
            session = %self.state.id,
            score = self.state.score,
            answered = self.state.total_answered,
            correct = self.state.total_correct,
            max_streak = self.state.max_streak,
            "session ended"
        );
        vec![
            Effect::StopTimer,
            Effect::CancelScheduled,
            Effect::Finish(self.state.clone()),
        ]
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn schedule(&mut self, after: Duration) -> Effect {
        self.next_token += 1;
        let token = AlarmToken(self.next_token);
        self.pending = Some(token);
        Effect::Schedule { token, after }
    }

    fn timer_is_current(&self, id: RoundId) -> bool {
        self.phase == Phase::AwaitingGuess && self.round.as_ref().is_some_and(|r| r.id == id)
    }

    fn stale(&self, what: &str, detail: impl std::fmt::Debug) {
        tracing::debug!(phase = ?self.phase, ?detail, "stale {what} ignored");
    }
}
