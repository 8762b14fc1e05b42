//! Round countdown.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// A one-second-resolution countdown running on the tokio runtime.
///
/// `start(n, on_tick, on_expire)` calls `on_tick(n)` right away, then
/// `on_tick(n - 1)` ... `on_tick(0)` once per second, then `on_expire()` once.
/// Starting again supersedes the running countdown; `stop` (or drop) cancels
/// it, after which neither callback runs again.
#[derive(Debug, Default)]
pub struct RoundTimer {
    task: Option<JoinHandle<()>>,
}

impl RoundTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown from `seconds`. Must be called within a tokio runtime.
    pub fn start<T, E>(&mut self, seconds: u32, mut on_tick: T, on_expire: E)
    where
        T: FnMut(u32) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        self.stop();
        self.task = Some(tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut left = seconds;
            on_tick(left);
            while left > 0 {
                ticks.tick().await;
                left -= 1;
                on_tick(left);
            }
            on_expire();
        }));
    }

    /// Cancel the running countdown, if any.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Whether a countdown is still in progress.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::sync::oneshot;

    use super::*;

    type Ticks = Arc<Mutex<Vec<u32>>>;

    fn recorder() -> (Ticks, impl FnMut(u32) + Send + 'static) {
        let ticks: Ticks = Arc::default();
        let sink = Arc::clone(&ticks);
        (ticks, move |s| sink.lock().unwrap().push(s))
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_then_expires_once() {
        let (ticks, on_tick) = recorder();
        let (tx, rx) = oneshot::channel();
        let started = Instant::now();

        let mut timer = RoundTimer::new();
        timer.start(5, on_tick, move || {
            let _ = tx.send(Instant::now());
        });

        let expired_at = rx.await.unwrap();
        assert_eq!(*ticks.lock().unwrap(), vec![5, 4, 3, 2, 1, 0]);
        assert_eq!(expired_at - started, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_expiry() {
        let (ticks, on_tick) = recorder();
        let expired = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&expired);

        let mut timer = RoundTimer::new();
        timer.start(5, on_tick, move || *flag.lock().unwrap() = true);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(timer.is_running());
        timer.stop();
        assert!(!timer.is_running());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(*ticks.lock().unwrap(), vec![5, 4, 3]);
        assert!(!*expired.lock().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_supersedes_previous_countdown() {
        let expirations = Arc::new(Mutex::new(Vec::new()));

        let mut timer = RoundTimer::new();
        let first = Arc::clone(&expirations);
        timer.start(5, |_| {}, move || first.lock().unwrap().push("first"));

        tokio::time::sleep(Duration::from_secs(2)).await;
        let (tx, rx) = oneshot::channel();
        let second = Arc::clone(&expirations);
        timer.start(3, |_| {}, move || {
            second.lock().unwrap().push("second");
            let _ = tx.send(());
        });

        rx.await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(*expirations.lock().unwrap(), vec!["second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_seconds_ticks_once_and_expires() {
        let (ticks, on_tick) = recorder();
        let (tx, rx) = oneshot::channel();
        let mut timer = RoundTimer::new();
        timer.start(0, on_tick, move || {
            let _ = tx.send(());
        });
        rx.await.unwrap();
        assert_eq!(*ticks.lock().unwrap(), vec![0]);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels() {
        let expired = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&expired);
        {
            let mut timer = RoundTimer::new();
            timer.start(1, |_| {}, move || *flag.lock().unwrap() = true);
        }
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!*expired.lock().unwrap());
    }
}
