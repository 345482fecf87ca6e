//! Named background tasks with cooperative cancellation.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing;

/// A running task and the token that asks it to stop.
#[derive(Debug)]
struct SupervisedTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Outcome of [`Supervisor::shutdown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Tasks that finished after cancellation.
    pub stopped: usize,
    /// Tasks still running at the deadline and aborted.
    pub aborted: usize,
}

/// Owns every periodic task of the process. Each task receives a child of
/// the supervisor's root token and must return once it is cancelled.
#[derive(Debug, Default)]
pub struct Supervisor {
    root: CancellationToken,
    tasks: Mutex<HashMap<String, SupervisedTask>>,
}

impl Supervisor {
    /// Create an empty supervisor
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a task under `name`. A task already running under the same
    /// name is cancelled and replaced.
    pub fn spawn<F, Fut>(&self, name: impl Into<String>, task: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let token = self.root.child_token();
        let handle = tokio::spawn(task(token.clone()));

        let previous = self
            .lock()
            .insert(name.clone(), SupervisedTask { token, handle });
        if let Some(previous) = previous {
            tracing::warn!(task = %name, "Replacing running task");
            previous.token.cancel();
        }
        tracing::info!(task = %name, "Background task started");
    }

    /// Cancel one task and wait up to `timeout` for it to return.
    /// Returns `false` if no task has that name.
    pub async fn stop(&self, name: &str, timeout: Duration) -> bool {
        let Some(task) = self.lock().remove(name) else {
            return false;
        };
        task.token.cancel();
        if !join_within(task.handle, timeout).await {
            tracing::warn!(task = %name, "Task did not stop in time, aborted");
        }
        tracing::info!(task = %name, "Background task stopped");
        true
    }

    /// Cancel every task, wait for all of them up to `timeout` in total,
    /// then abort whatever is left.
    pub async fn shutdown(&self, timeout: Duration) -> ShutdownReport {
        self.root.cancel();
        let tasks: Vec<(String, SupervisedTask)> = self.lock().drain().collect();
        let deadline = tokio::time::Instant::now() + timeout;

        let mut report = ShutdownReport::default();
        for (name, task) in tasks {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if join_within(task.handle, remaining).await {
                report.stopped += 1;
            } else {
                tracing::warn!(task = %name, "Task still running at shutdown deadline, aborted");
                report.aborted += 1;
            }
        }

        tracing::info!(
            stopped = report.stopped,
            aborted = report.aborted,
            "Supervisor shut down"
        );
        report
    }

    /// Names of the tasks currently registered.
    pub fn task_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Whether a task with this name is registered and has not finished.
    pub fn is_running(&self, name: &str) -> bool {
        self.lock()
            .get(name)
            .is_some_and(|task| !task.handle.is_finished())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SupervisedTask>> {
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Await `handle` for at most `timeout`; abort it on expiry.
async fn join_within(mut handle: JoinHandle<()>, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Err(e)) if e.is_panic() => {
            tracing::error!(error = %e, "Background task panicked");
            true
        }
        Ok(_) => true,
        Err(_) => {
            handle.abort();
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_only_the_named_task() {
        let supervisor = Supervisor::new();
        let ticks = Arc::new(AtomicUsize::new(0));

        for name in ["a", "b"] {
            let ticks = ticks.clone();
            supervisor.spawn(name, move |cancel| async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(Duration::from_secs(1)) => {
                            ticks.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                }
            });
        }

        assert!(supervisor.stop("a", Duration::from_secs(1)).await);
        assert!(!supervisor.stop("a", Duration::from_secs(1)).await);
        assert!(supervisor.is_running("b"));
        assert_eq!(supervisor.task_names(), vec!["b".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts_tasks_that_ignore_cancellation() {
        let supervisor = Supervisor::new();
        supervisor.spawn("polite", |cancel| async move { cancel.cancelled().await });
        supervisor.spawn("stubborn", |_cancel| async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });

        let report = supervisor.shutdown(Duration::from_secs(2)).await;
        assert_eq!(report, ShutdownReport { stopped: 1, aborted: 1 });
        assert!(supervisor.task_names().is_empty());
    }
}
