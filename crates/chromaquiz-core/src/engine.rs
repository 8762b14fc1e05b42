//! Game engine.
//!
//! Owns a [`Session`] and drives it on the tokio runtime: player input arrives
//! through a [`GameHandle`], countdown events from the [`RoundTimer`], and the
//! session's single pending delay is awaited here. Effects returned by the
//! session are carried out in order.

use std::future;
use std::ops::ControlFlow;
use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::model::GameSettings;
use crate::round::{RoundGenerator, RoundId};
use crate::session::{AlarmToken, Effect, Event, Session};
use crate::stats::{record_session, SessionSummary};
use crate::timer::RoundTimer;
use crate::traits::{Presenter, StatsStore};

/// What the player can do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Pick the option named `color` from `round`'s options.
    Guess { round: RoundId, color: String },
    /// End the session early (or restart it if nothing was answered yet).
    Interrupt,
    /// Start another session once the summary is up.
    PlayAgain,
    Quit,
}

impl From<Input> for Event {
    fn from(input: Input) -> Self {
        match input {
            Input::Guess { round, color } => Event::Guess { round, color },
            Input::Interrupt => Event::Interrupt,
            Input::PlayAgain => Event::PlayAgain,
            Input::Quit => Event::Quit,
        }
    }
}

/// Sends player input to a running [`GameEngine`].
///
/// Every method returns `false` once the engine has stopped. Dropping all
/// handles quits the game.
#[derive(Debug, Clone)]
pub struct GameHandle {
    tx: mpsc::UnboundedSender<Input>,
}

impl GameHandle {
    pub fn send(&self, input: Input) -> bool {
        self.tx.send(input).is_ok()
    }

    pub fn guess(&self, round: RoundId, color: impl Into<String>) -> bool {
        self.send(Input::Guess {
            round,
            color: color.into(),
        })
    }

    pub fn interrupt(&self) -> bool {
        self.send(Input::Interrupt)
    }

    pub fn play_again(&self) -> bool {
        self.send(Input::PlayAgain)
    }

    pub fn quit(&self) -> bool {
        self.send(Input::Quit)
    }
}

/// Runs sessions until the player quits.
pub struct GameEngine<R = StdRng> {
    session: Session<R>,
    presenter: Box<dyn Presenter>,
    store: Arc<dyn StatsStore>,
    inputs: mpsc::UnboundedReceiver<Input>,
    timer: RoundTimer,
    timer_tx: mpsc::UnboundedSender<Event>,
    timer_rx: mpsc::UnboundedReceiver<Event>,
    /// The session's pending delay and when it fires.
    alarm: Option<(AlarmToken, Instant)>,
    summaries: Vec<SessionSummary>,
}

impl GameEngine<StdRng> {
    pub fn new(
        settings: GameSettings,
        presenter: Box<dyn Presenter>,
        store: Arc<dyn StatsStore>,
    ) -> (Self, GameHandle) {
        Self::with_generator(settings, RoundGenerator::new(), presenter, store)
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_generator(
        settings: GameSettings,
        generator: RoundGenerator<R>,
        presenter: Box<dyn Presenter>,
        store: Arc<dyn StatsStore>,
    ) -> (Self, GameHandle) {
        let (tx, inputs) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let engine = Self {
            session: Session::with_generator(settings, generator),
            presenter,
            store,
            inputs,
            timer: RoundTimer::new(),
            timer_tx,
            timer_rx,
            alarm: None,
            summaries: Vec::new(),
        };
        (engine, GameHandle { tx })
    }

    /// Start the first session and run until quit. Returns the summary of
    /// every session that ended, oldest first.
    pub async fn run(mut self) -> Result<Vec<SessionSummary>> {
        let effects = self.session.start(self.presenter.as_mut());
        if self.apply(effects).await.is_break() {
            return Ok(self.summaries);
        }

        loop {
            let event = tokio::select! {
                input = self.inputs.recv() => match input {
                    Some(input) => Event::from(input),
                    None => {
                        tracing::debug!("all game handles dropped, quitting");
                        Event::Quit
                    }
                },
                Some(event) = self.timer_rx.recv() => event,
                token = alarm(self.alarm) => {
                    self.alarm = None;
                    Event::Alarm(token)
                }
            };

            let effects = self.session.handle(event, self.presenter.as_mut());
            if self.apply(effects).await.is_break() {
                break;
            }
        }

        self.timer.stop();
        tracing::info!(sessions = self.summaries.len(), "game over");
        Ok(self.summaries)
    }

    async fn apply(&mut self, effects: Vec<Effect>) -> ControlFlow<()> {
        for effect in effects {
            match effect {
                Effect::Schedule { token, after } => {
                    self.alarm = Some((token, Instant::now() + after));
                }
                Effect::CancelScheduled => self.alarm = None,
                Effect::StartTimer { round, seconds } => {
                    let ticks = self.timer_tx.clone();
                    let expiry = self.timer_tx.clone();
                    // Sends only fail once the engine is gone.
                    self.timer.start(
                        seconds,
                        move |seconds_left| {
                            let _ = ticks.send(Event::TimerTick {
                                round,
                                seconds_left,
                            });
                        },
                        move || {
                            let _ = expiry.send(Event::TimerExpired { round });
                        },
                    );
                }
                Effect::StopTimer => self.timer.stop(),
                Effect::Finish(state) => {
                    let summary = record_session(self.store.as_ref(), &state).await;
                    self.presenter.show_summary(&summary);
                    self.summaries.push(summary);
                }
                Effect::Exit => return ControlFlow::Break(()),
            }
        }
        ControlFlow::Continue(())
    }
}

/// Resolves when the pending delay fires; never resolves without one.
async fn alarm(pending: Option<(AlarmToken, Instant)>) -> AlarmToken {
    match pending {
        Some((token, at)) => {
            sleep_until(at).await;
            token
        }
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::feedback::Resolution;
    use crate::mock::{MemoryStatsStore, PresenterCall, RecordingPresenter};
    use crate::model::{Difficulty, Mode};
    use crate::palette::Color;
    use crate::session::{REVEAL_DELAY, ROUND_SECONDS};
    use crate::stats::PersistentStats;

    struct Game {
        presenter: RecordingPresenter,
        calls: UnboundedReceiver<PresenterCall>,
        store: Arc<MemoryStatsStore>,
        handle: GameHandle,
        task: JoinHandle<Result<Vec<SessionSummary>>>,
    }

    fn launch(mode: Mode, store: MemoryStatsStore) -> Game {
        let (presenter, calls) = RecordingPresenter::with_notifier();
        let store = Arc::new(store);
        let settings = GameSettings {
            difficulty: Difficulty::Medium,
            mode,
            sound_enabled: true,
        };
        let (engine, handle) = GameEngine::with_generator(
            settings,
            RoundGenerator::seeded(11),
            Box::new(presenter.clone()),
            store.clone(),
        );
        Game {
            presenter,
            calls,
            store,
            handle,
            task: tokio::spawn(engine.run()),
        }
    }

    impl Game {
        /// Wait for options, remembering the color shown just before them.
        async fn next_options(&mut self) -> (RoundId, Color) {
            let mut answer = None;
            loop {
                match self.calls.recv().await.unwrap() {
                    PresenterCall::ShowRound { color, .. } => answer = Some(color),
                    PresenterCall::ShowOptions { round, .. } => return (round, answer.unwrap()),
                    _ => {}
                }
            }
        }

        async fn next_feedback(&mut self) -> Resolution {
            loop {
                if let PresenterCall::Feedback(f) = self.calls.recv().await.unwrap() {
                    return f.kind;
                }
            }
        }

        async fn next_summary(&mut self) -> SessionSummary {
            loop {
                if let PresenterCall::Summary(s) = self.calls.recv().await.unwrap() {
                    return s;
                }
            }
        }

        async fn answer_correctly(&mut self) {
            let (round, answer) = self.next_options().await;
            assert!(self.handle.guess(round, answer.name));
            assert_eq!(self.next_feedback().await, Resolution::Correct);
        }

        async fn finish(self) -> Vec<SessionSummary> {
            self.task.await.unwrap().unwrap()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn five_correct_then_quit_persists_high_score() {
        let mut game = launch(Mode::Trick, MemoryStatsStore::default());
        for _ in 0..5 {
            game.answer_correctly().await;
        }
        game.handle.quit();

        let summary = game.next_summary().await;
        assert_eq!(summary.score, 90);
        assert_eq!(summary.best, 90);
        assert!(summary.is_new_best);
        assert_eq!(summary.accuracy_pct, 100);
        assert_eq!(summary.max_streak, 5);

        let store = Arc::clone(&game.store);
        let summaries = game.finish().await;
        assert_eq!(summaries.len(), 1);

        let stats = store.stats();
        assert_eq!(stats.high_score, 90);
        assert_eq!(stats.total_correct, 5);
        assert_eq!(stats.total_answers, 5);
        assert!(stats.last_played.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_then_interrupt_ends_with_answered_rounds_only() {
        let mut game = launch(Mode::Normal, MemoryStatsStore::default());
        game.answer_correctly().await;
        game.answer_correctly().await;

        game.next_options().await;
        assert_eq!(game.next_feedback().await, Resolution::Timeout);
        game.handle.interrupt();

        let summary = game.next_summary().await;
        assert_eq!(summary.score, 20);
        assert_eq!(summary.total_answered, 2);
        assert_eq!(summary.accuracy_pct, 100);

        game.handle.quit();
        let store = Arc::clone(&game.store);
        assert_eq!(game.finish().await.len(), 1);
        assert_eq!(store.stats().total_answers, 2);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_guess_shows_summary_after_reveal_delay() {
        let mut game = launch(Mode::Normal, MemoryStatsStore::default());
        let (round, answer) = game.next_options().await;
        let wrong = game
            .presenter
            .last_options()
            .unwrap()
            .1
            .into_iter()
            .find(|c| !c.same_name(answer.name))
            .unwrap();

        let guessed_at = Instant::now();
        game.handle.guess(round, wrong.name);
        assert_eq!(game.next_feedback().await, Resolution::Wrong);
        let summary = game.next_summary().await;
        assert_eq!(Instant::now() - guessed_at, REVEAL_DELAY);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.accuracy_pct, 0);

        // A second session, abandoned before any answer, is not recorded.
        game.handle.play_again();
        game.next_options().await;
        game.handle.quit();

        let store = Arc::clone(&game.store);
        assert_eq!(game.finish().await.len(), 1);
        assert_eq!(store.writes(), 1);
        assert_eq!(store.stats().total_answers, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_round_counts_down_and_leaves_stats_alone() {
        let previous = PersistentStats {
            high_score: 40,
            total_correct: 3,
            total_answers: 4,
            last_played: None,
        };
        let mut game = launch(Mode::Normal, MemoryStatsStore::with_stats(previous.clone()));
        game.next_options().await;
        let revealed_at = Instant::now();

        assert_eq!(game.next_feedback().await, Resolution::Timeout);
        assert_eq!(
            Instant::now() - revealed_at,
            Duration::from_secs(ROUND_SECONDS.into())
        );

        let summary = game.next_summary().await;
        assert_eq!(summary.best, 40);
        assert!(!summary.is_new_best);
        assert_eq!(game.presenter.ticks(), vec![5, 4, 3, 2, 1, 0]);

        game.handle.quit();
        let store = Arc::clone(&game.store);
        game.finish().await;
        assert_eq!(store.writes(), 0);
        assert_eq!(store.stats(), previous);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_every_handle_stops_the_engine() {
        let Game { handle, task, .. } = launch(Mode::Normal, MemoryStatsStore::default());
        drop(handle);
        let summaries = task.await.unwrap().unwrap();
        assert!(summaries.is_empty());
    }
}
