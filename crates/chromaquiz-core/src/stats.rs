//! Cross-session statistics and the end-of-session summary.
//!
//! The stats live in an external key-value medium. [`KvStatsStore`] maps them
//! onto string keys; [`record_session`] performs the single read-merge-write
//! that happens when a session ends.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::model::{Difficulty, Mode};
use crate::scoring::accuracy_pct;
use crate::session::SessionState;
use crate::traits::{KeyValueStore, StatsStore};

pub const KEY_HIGH_SCORE: &str = "chromaquiz.high_score";
pub const KEY_TOTAL_CORRECT: &str = "chromaquiz.total_correct";
pub const KEY_TOTAL_ANSWERS: &str = "chromaquiz.total_answers";
pub const KEY_LAST_PLAYED: &str = "chromaquiz.last_played";

/// Stats that survive across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentStats {
    /// Best session score ever persisted. Never decreases.
    pub high_score: u32,
    pub total_correct: u32,
    pub total_answers: u32,
    /// When a session was last merged in.
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
}

impl PersistentStats {
    /// Fold a finished session into these stats.
    pub fn merge(&self, session: &SessionState, now: DateTime<Utc>) -> PersistentStats {
        PersistentStats {
            high_score: self.high_score.max(session.score),
            total_correct: self.total_correct.saturating_add(session.total_correct),
            total_answers: self.total_answers.saturating_add(session.total_answered),
            last_played: Some(now),
        }
    }

    /// Accuracy over every answer ever persisted.
    pub fn lifetime_accuracy_pct(&self) -> u32 {
        accuracy_pct(self.total_correct, self.total_answers)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.total_correct > self.total_answers {
            return Err(StoreError::Inconsistent(format!(
                "total_correct {} exceeds total_answers {}",
                self.total_correct, self.total_answers
            )));
        }
        Ok(())
    }
}

/// How a finished session is celebrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Trophy,
    Celebrate,
    Encourage,
}

/// What the player sees when a session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub score: u32,
    /// `max(stored high score, score)`.
    pub best: u32,
    pub accuracy_pct: u32,
    pub max_streak: u32,
    pub is_new_best: bool,
    pub total_answered: u32,
    pub total_correct: u32,
    pub difficulty: Difficulty,
    pub mode: Mode,
}

impl SessionSummary {
    pub fn rating(&self) -> Rating {
        if self.score >= 50 {
            Rating::Trophy
        } else if self.score >= 20 {
            Rating::Celebrate
        } else {
            Rating::Encourage
        }
    }

    pub fn headline(&self) -> &'static str {
        if self.is_new_best {
            "New High Score!"
        } else {
            "Game Over!"
        }
    }

    pub fn remark(&self) -> &'static str {
        if self.is_new_best {
            "You crushed it!"
        } else if self.score >= 30 {
            "Great effort! Keep going!"
        } else {
            "Practice makes perfect!"
        }
    }
}

/// Merge a finished session into the store and build its summary.
///
/// Store failures never propagate. An unreadable store counts as empty for
/// the summary and is left as it was, so stored history is never replaced by
/// one session. A failed write only loses this session's contribution.
/// Sessions with no answers leave the store untouched.
pub async fn record_session(store: &dyn StatsStore, session: &SessionState) -> SessionSummary {
    let (stored, readable) = match store.read().await {
        Ok(stats) => (stats, true),
        Err(e) => {
            tracing::warn!("could not read stats, treating as empty: {e}");
            (PersistentStats::default(), false)
        }
    };

    let is_new_best = session.score > stored.high_score;

    if session.total_answered == 0 {
        tracing::debug!("session had no answers, stats untouched");
    } else if !readable {
        tracing::warn!(
            score = session.score,
            total_answered = session.total_answered,
            "stats unreadable, session not persisted"
        );
    } else {
        let merged = stored.merge(session, Utc::now());
        match store.write(&merged).await {
            Ok(()) => tracing::debug!(
                high_score = merged.high_score,
                total_answers = merged.total_answers,
                "stats persisted"
            ),
            Err(e) => tracing::warn!("could not persist stats: {e}"),
        }
    }

    SessionSummary {
        score: session.score,
        best: stored.high_score.max(session.score),
        accuracy_pct: session.accuracy_pct(),
        max_streak: session.max_streak,
        is_new_best,
        total_answered: session.total_answered,
        total_correct: session.total_correct,
        difficulty: session.difficulty,
        mode: session.mode,
    }
}

// ---------------------------------------------------------------------------
// Key-value adapter
// ---------------------------------------------------------------------------

/// [`StatsStore`] over a raw [`KeyValueStore`]. Counters are stored as decimal
/// strings, the timestamp as RFC 3339. Missing keys read as zero.
pub struct KvStatsStore<K> {
    kv: K,
}

impl<K: KeyValueStore> KvStatsStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn inner(&self) -> &K {
        &self.kv
    }

    async fn read_counter(&self, key: &str) -> Result<u32, StoreError> {
        match self.kv.get(key).await? {
            None => Ok(0),
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| StoreError::Corrupt {
                key: key.to_string(),
                value: raw,
            }),
        }
    }
}

#[async_trait]
impl<K: KeyValueStore> StatsStore for KvStatsStore<K> {
    async fn read(&self) -> Result<PersistentStats, StoreError> {
        let last_played = match self.kv.get(KEY_LAST_PLAYED).await? {
            None => None,
            Some(raw) => match DateTime::parse_from_rfc3339(raw.trim()) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(e) => {
                    tracing::warn!(
                        key = KEY_LAST_PLAYED,
                        value = %raw,
                        "ignoring bad timestamp: {e}"
                    );
                    None
                }
            },
        };
        let stats = PersistentStats {
            high_score: self.read_counter(KEY_HIGH_SCORE).await?,
            total_correct: self.read_counter(KEY_TOTAL_CORRECT).await?,
            total_answers: self.read_counter(KEY_TOTAL_ANSWERS).await?,
            last_played,
        };
        stats.check()?;
        Ok(stats)
    }

    async fn write(&self, stats: &PersistentStats) -> Result<(), StoreError> {
        stats.check()?;
        let mut entries = vec![
            (KEY_HIGH_SCORE, stats.high_score.to_string()),
            (KEY_TOTAL_CORRECT, stats.total_correct.to_string()),
            (KEY_TOTAL_ANSWERS, stats.total_answers.to_string()),
        ];
        if let Some(ts) = stats.last_played {
            entries.push((KEY_LAST_PLAYED, ts.to_rfc3339()));
        }
        self.kv.set_many(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::model::GameSettings;

    #[derive(Default)]
    struct MapKv {
        map: Mutex<HashMap<String, String>>,
        writes: Mutex<u32>,
    }

    impl MapKv {
        fn with(entries: &[(&str, &str)]) -> Self {
            let kv = MapKv::default();
            {
                let mut map = kv.map.lock().unwrap();
                for (k, v) in entries {
                    map.insert(k.to_string(), v.to_string());
                }
            }
            kv
        }
    }

    #[async_trait]
    impl KeyValueStore for MapKv {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.map.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            *self.writes.lock().unwrap() += 1;
            self.map
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl StatsStore for BrokenStore {
        async fn read(&self) -> Result<PersistentStats, StoreError> {
            Err(StoreError::Io("unplugged".into()))
        }

        async fn write(&self, _stats: &PersistentStats) -> Result<(), StoreError> {
            Err(StoreError::Io("unplugged".into()))
        }
    }

    fn session(score: u32, correct: u32, answered: u32, max_streak: u32) -> SessionState {
        let mut s = SessionState::new(GameSettings::default());
        s.score = score;
        s.total_correct = correct;
        s.total_answered = answered;
        s.max_streak = max_streak;
        s
    }

    #[tokio::test]
    async fn empty_store_reads_defaults() {
        let store = KvStatsStore::new(MapKv::default());
        assert_eq!(store.read().await.unwrap(), PersistentStats::default());
    }

    #[tokio::test]
    async fn write_then_read_roundtrip() {
        let store = KvStatsStore::new(MapKv::default());
        let stats = PersistentStats {
            high_score: 120,
            total_correct: 40,
            total_answers: 52,
            last_played: Some(Utc::now()),
        };
        store.write(&stats).await.unwrap();
        let back = store.read().await.unwrap();
        assert_eq!(back.high_score, 120);
        assert_eq!(back.total_correct, 40);
        assert_eq!(back.total_answers, 52);
        assert!(back.last_played.is_some());
    }

    #[tokio::test]
    async fn corrupt_counter_is_reported() {
        let store = KvStatsStore::new(MapKv::with(&[(KEY_HIGH_SCORE, "lots")]));
        let err = store.read().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == KEY_HIGH_SCORE));
    }

    #[tokio::test]
    async fn inconsistent_counters_are_reported() {
        let store = KvStatsStore::new(MapKv::with(&[
            (KEY_TOTAL_CORRECT, "9"),
            (KEY_TOTAL_ANSWERS, "3"),
        ]));
        assert!(matches!(
            store.read().await.unwrap_err(),
            StoreError::Inconsistent(_)
        ));
    }

    #[tokio::test]
    async fn record_session_merges_and_persists() {
        let store = KvStatsStore::new(MapKv::with(&[
            (KEY_HIGH_SCORE, "50"),
            (KEY_TOTAL_CORRECT, "10"),
            (KEY_TOTAL_ANSWERS, "12"),
        ]));

        let summary = record_session(&store, &session(70, 6, 7, 6)).await;
        assert!(summary.is_new_best);
        assert_eq!(summary.best, 70);
        assert_eq!(summary.accuracy_pct, 86);

        let stats = store.read().await.unwrap();
        assert_eq!(stats.high_score, 70);
        assert_eq!(stats.total_correct, 16);
        assert_eq!(stats.total_answers, 19);
    }

    #[tokio::test]
    async fn high_score_never_decreases() {
        let store = KvStatsStore::new(MapKv::with(&[
            (KEY_HIGH_SCORE, "200"),
            (KEY_TOTAL_ANSWERS, "30"),
        ]));
        let summary = record_session(&store, &session(40, 3, 4, 3)).await;
        assert!(!summary.is_new_best);
        assert_eq!(summary.best, 200);
        assert_eq!(store.read().await.unwrap().high_score, 200);
    }

    #[tokio::test]
    async fn unanswered_session_leaves_store_untouched() {
        let store = KvStatsStore::new(MapKv::with(&[
            (KEY_HIGH_SCORE, "30"),
            (KEY_TOTAL_ANSWERS, "5"),
        ]));
        let before = store.read().await.unwrap();

        let summary = record_session(&store, &session(0, 0, 0, 0)).await;
        assert_eq!(summary.accuracy_pct, 0);
        assert_eq!(summary.best, 30);
        assert_eq!(*store.inner().writes.lock().unwrap(), 0);
        assert_eq!(store.read().await.unwrap(), before);
    }

    #[tokio::test]
    async fn bad_timestamp_reads_as_absent() {
        let store = KvStatsStore::new(MapKv::with(&[
            (KEY_HIGH_SCORE, "200"),
            (KEY_TOTAL_CORRECT, "40"),
            (KEY_TOTAL_ANSWERS, "50"),
            (KEY_LAST_PLAYED, "yesterday"),
        ]));
        let stats = store.read().await.unwrap();
        assert_eq!(stats.high_score, 200);
        assert_eq!(stats.total_correct, 40);
        assert_eq!(stats.last_played, None);

        let summary = record_session(&store, &session(60, 4, 4, 4)).await;
        assert!(!summary.is_new_best);
        assert_eq!(summary.best, 200);

        let stats = store.read().await.unwrap();
        assert_eq!(stats.high_score, 200);
        assert_eq!(stats.total_correct, 44);
        assert_eq!(stats.total_answers, 54);
        assert!(stats.last_played.is_some());
    }

    #[tokio::test]
    async fn unreadable_store_is_not_overwritten() {
        let store = KvStatsStore::new(MapKv::with(&[
            (KEY_HIGH_SCORE, "lots"),
            (KEY_TOTAL_ANSWERS, "50"),
        ]));
        let summary = record_session(&store, &session(60, 4, 4, 4)).await;
        assert_eq!(summary.best, 60);
        assert_eq!(*store.inner().writes.lock().unwrap(), 0);
        assert_eq!(
            store.inner().map.lock().unwrap().get(KEY_HIGH_SCORE).cloned(),
            Some("lots".to_string())
        );
    }

    #[tokio::test]
    async fn identical_writes_are_idempotent() {
        let store = KvStatsStore::new(MapKv::default());
        let stats = PersistentStats {
            high_score: 90,
            total_correct: 5,
            total_answers: 6,
            last_played: Some(Utc::now()),
        };
        store.write(&stats).await.unwrap();
        let first = store.inner().map.lock().unwrap().clone();
        store.write(&stats).await.unwrap();
        assert_eq!(*store.inner().map.lock().unwrap(), first);
        assert_eq!(store.read().await.unwrap(), stats);
    }

    #[tokio::test]
    async fn store_failures_do_not_propagate() {
        let summary = record_session(&BrokenStore, &session(30, 3, 3, 3)).await;
        assert!(summary.is_new_best);
        assert_eq!(summary.best, 30);
        assert_eq!(summary.accuracy_pct, 100);
    }

    #[test]
    fn lifetime_accuracy() {
        let stats = PersistentStats {
            high_score: 0,
            total_correct: 2,
            total_answers: 3,
            last_played: None,
        };
        assert_eq!(stats.lifetime_accuracy_pct(), 67);
        assert_eq!(PersistentStats::default().lifetime_accuracy_pct(), 0);
    }

    #[test]
    fn summary_rating_and_text() {
        let mut summary = SessionSummary {
            score: 60,
            best: 60,
            accuracy_pct: 100,
            max_streak: 6,
            is_new_best: true,
            total_answered: 6,
            total_correct: 6,
            difficulty: Difficulty::Easy,
            mode: Mode::Normal,
        };
        assert_eq!(summary.rating(), Rating::Trophy);
        assert_eq!(summary.headline(), "New High Score!");

        summary.score = 30;
        summary.is_new_best = false;
        assert_eq!(summary.rating(), Rating::Celebrate);
        assert_eq!(summary.headline(), "Game Over!");
        assert_eq!(summary.remark(), "Great effort! Keep going!");

        summary.score = 10;
        assert_eq!(summary.rating(), Rating::Encourage);
        assert_eq!(summary.remark(), "Practice makes perfect!");
    }
}
