use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

type Commit<T> = Box<dyn Fn(T) + Send + Sync>;

struct Shared<T> {
    latest: AtomicU64,
    pending: Mutex<Option<JoinHandle<()>>>,
    commit: Commit<T>,
}

/// Delays a value until no newer one arrives for `delay`, then hands it to
/// the commit callback.
///
/// Each push cancels the pending timer. A timer that still fires after being
/// superseded sees a newer sequence number and does nothing.
pub struct Debouncer<T> {
    delay: Duration,
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, commit: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            shared: Arc::new(Shared {
                latest: AtomicU64::new(0),
                pending: Mutex::new(None),
                commit: Box::new(commit),
            }),
        }
    }

    /// Schedules `value`, replacing whatever was pending. Must be called from
    /// within a tokio runtime.
    pub fn push(&self, value: T) {
        let sequence = self.shared.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let shared = Arc::clone(&self.shared);
        let delay = self.delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if shared.latest.load(Ordering::SeqCst) == sequence {
                trace!("Debounced value {} committed", sequence);
                (shared.commit)(value);
            } else {
                trace!("Debounced value {} superseded", sequence);
            }
        });

        if let Some(previous) = self.pending_slot().replace(task) {
            previous.abort();
        }
    }

    /// Drops the pending value without committing it.
    pub fn cancel(&self) {
        self.shared.latest.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.pending_slot().take() {
            previous.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_slot().as_ref().is_some_and(|task| !task.is_finished())
    }

    fn pending_slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.shared.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let mut pending = self.shared.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = pending.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Instant};

    type Commits = Arc<Mutex<Vec<(&'static str, Duration)>>>;

    fn recording(delay: Duration) -> (Debouncer<&'static str>, Commits) {
        let start = Instant::now();
        let commits = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&commits);
        let debouncer = Debouncer::new(delay, move |value| {
            sink.lock().unwrap().push((value, start.elapsed()));
        });
        (debouncer, commits)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_commits_once_after_quiet_period() {
        let (debouncer, commits) = recording(Duration::from_millis(500));

        debouncer.push("a");
        sleep(Duration::from_millis(100)).await;
        debouncer.push("ab");
        sleep(Duration::from_millis(50)).await;
        debouncer.push("abc");

        sleep(Duration::from_millis(499)).await;
        assert!(commits.lock().unwrap().is_empty());

        sleep(Duration::from_millis(10)).await;

        let commits = commits.lock().unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].0, "abc");
        assert_eq!(commits[0].1, Duration::from_millis(650));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_pushes_commit_separately() {
        let (debouncer, commits) = recording(Duration::from_millis(500));

        debouncer.push("first");
        sleep(Duration::from_millis(600)).await;
        debouncer.push("second");
        sleep(Duration::from_millis(600)).await;

        let values: Vec<_> = commits.lock().unwrap().iter().map(|(value, _)| *value).collect();
        assert_eq!(values, vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_value() {
        let (debouncer, commits) = recording(Duration::from_millis(500));

        debouncer.push("typed");
        assert!(debouncer.is_pending());
        debouncer.cancel();
        sleep(Duration::from_secs(1)).await;

        assert!(commits.lock().unwrap().is_empty());
        assert!(!debouncer.is_pending());
    }
}
