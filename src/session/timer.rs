//! One-shot recognition timeout.

use std::time::Duration;
use tokio::task::JoinHandle;

/// Default time between the first non-empty result and giving up.
pub const DEFAULT_RECOGNITION_TIMEOUT: Duration = Duration::from_secs(30);

/// A cancellable one-shot timer.
///
/// Each arming gets a generation number so a callback that raced with
/// `disarm` can tell it is stale.
#[derive(Debug, Default)]
pub(crate) struct TimeoutTimer {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl TimeoutTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Arm the timer; `on_fire` receives the generation it was armed with.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn arm<F>(&mut self, after: Duration, on_fire: F)
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.disarm();
        self.generation += 1;
        let generation = self.generation;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            on_fire(generation);
        }));
    }

    /// Returns `true` if a timer was armed.
    pub fn disarm(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Acknowledge a firing. Returns `false` for a stale generation.
    pub fn take_fired(&mut self, generation: u64) -> bool {
        if self.handle.is_some() && generation == self.generation {
            self.handle = None;
            true
        } else {
            false
        }
    }
}

impl Drop for TimeoutTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_duration() {
        let fired = Arc::new(AtomicU64::new(0));
        let mut timer = TimeoutTimer::new();
        let f = fired.clone();
        timer.arm(Duration::from_millis(500), move |generation| {
            f.store(generation, Ordering::SeqCst);
        });
        assert!(timer.is_armed());

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(timer.take_fired(1));
        assert!(!timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_prevents_firing() {
        let fired = Arc::new(AtomicU64::new(0));
        let mut timer = TimeoutTimer::new();
        let f = fired.clone();
        timer.arm(Duration::from_millis(100), move |g| f.store(g, Ordering::SeqCst));
        assert!(timer.disarm());
        assert!(!timer.disarm());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_generation_is_ignored() {
        let mut timer = TimeoutTimer::new();
        timer.arm(Duration::from_secs(10), |_| {});
        timer.arm(Duration::from_secs(10), |_| {});
        assert!(!timer.take_fired(1));
        assert!(timer.take_fired(2));
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(DEFAULT_RECOGNITION_TIMEOUT, Duration::from_millis(30_000));
    }
}
