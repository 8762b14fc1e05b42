//! Test doubles for driving the state machine and engine without a UI or disk.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::StoreError;
use crate::feedback::Feedback;
use crate::palette::Color;
use crate::round::RoundId;
use crate::session::SessionStatus;
use crate::stats::{PersistentStats, SessionSummary};
use crate::traits::{Presenter, StatsStore};

/// One call made on the presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    ShowRound { text: String, color: Color },
    HideColor,
    ShowOptions { round: RoundId, options: Vec<Color> },
    Feedback(Feedback),
    Summary(SessionSummary),
    Tick(u32),
    Status(SessionStatus),
}

/// A presenter that records every call.
///
/// Clones share the same log, so a test can keep one clone while the engine
/// owns another. [`RecordingPresenter::with_notifier`] additionally streams
/// each call over a channel so async tests can wait for a specific one.
#[derive(Clone, Default)]
pub struct RecordingPresenter {
    log: Arc<Mutex<Vec<PresenterCall>>>,
    notify: Option<mpsc::UnboundedSender<PresenterCall>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder that also sends every call to the returned receiver.
    pub fn with_notifier() -> (Self, mpsc::UnboundedReceiver<PresenterCall>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let presenter = Self {
            log: Arc::default(),
            notify: Some(tx),
        };
        (presenter, rx)
    }

    /// All calls so far, oldest first.
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.log.lock().unwrap().clone()
    }

    pub fn ticks(&self) -> Vec<u32> {
        self.collect(|c| match c {
            PresenterCall::Tick(s) => Some(*s),
            _ => None,
        })
    }

    pub fn feedback(&self) -> Vec<Feedback> {
        self.collect(|c| match c {
            PresenterCall::Feedback(f) => Some(f.clone()),
            _ => None,
        })
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.collect(|c| match c {
            PresenterCall::Summary(s) => Some(s.clone()),
            _ => None,
        })
    }

    /// The most recently shown option set.
    pub fn last_options(&self) -> Option<(RoundId, Vec<Color>)> {
        self.collect(|c| match c {
            PresenterCall::ShowOptions { round, options } => Some((*round, options.clone())),
            _ => None,
        })
        .pop()
    }

    /// The color of the most recently shown word.
    pub fn last_round_color(&self) -> Option<Color> {
        self.collect(|c| match c {
            PresenterCall::ShowRound { color, .. } => Some(*color),
            _ => None,
        })
        .pop()
    }

    fn collect<T>(&self, f: impl Fn(&PresenterCall) -> Option<T>) -> Vec<T> {
        self.log.lock().unwrap().iter().filter_map(f).collect()
    }

    fn record(&mut self, call: PresenterCall) {
        if let Some(tx) = &self.notify {
            // A test that stopped listening is not an error.
            let _ = tx.send(call.clone());
        }
        self.log.lock().unwrap().push(call);
    }
}

impl Presenter for RecordingPresenter {
    fn show_round(&mut self, text: &str, color: &Color) {
        self.record(PresenterCall::ShowRound {
            text: text.to_string(),
            color: *color,
        });
    }

    fn hide_color_reveal_word(&mut self) {
        self.record(PresenterCall::HideColor);
    }

    fn show_options(&mut self, round: RoundId, options: &[Color]) {
        self.record(PresenterCall::ShowOptions {
            round,
            options: options.to_vec(),
        });
    }

    fn show_feedback(&mut self, feedback: &Feedback) {
        self.record(PresenterCall::Feedback(feedback.clone()));
    }

    fn show_summary(&mut self, summary: &SessionSummary) {
        self.record(PresenterCall::Summary(summary.clone()));
    }

    fn on_timer_tick(&mut self, seconds_left: u32) {
        self.record(PresenterCall::Tick(seconds_left));
    }

    fn show_status(&mut self, status: &SessionStatus) {
        self.record(PresenterCall::Status(*status));
    }
}

// ---------------------------------------------------------------------------
// In-memory stats
// ---------------------------------------------------------------------------

/// A [`StatsStore`] held in memory that counts writes.
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    stats: Mutex<PersistentStats>,
    writes: AtomicUsize,
}

impl MemoryStatsStore {
    pub fn with_stats(stats: PersistentStats) -> Self {
        Self {
            stats: Mutex::new(stats),
            writes: AtomicUsize::new(0),
        }
    }

    /// Current contents.
    pub fn stats(&self) -> PersistentStats {
        self.stats.lock().unwrap().clone()
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn read(&self) -> Result<PersistentStats, StoreError> {
        Ok(self.stats())
    }

    async fn write(&self, stats: &PersistentStats) -> Result<(), StoreError> {
        *self.stats.lock().unwrap() = stats.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
