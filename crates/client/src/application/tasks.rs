//! Background work with bounded concurrency.
//!
//! The facade never blocks its caller: each operation is submitted here and
//! the caller gets an [`AsyncResult`] back. At most `max_concurrent_tasks`
//! units run at once; the rest wait for a permit.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;

use super::async_result::AsyncResult;
use super::error::ServiceError;

/// A unit of work that is currently running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInfo {
    pub id: u64,
    pub title: String,
}

/// Runs facade work on the tokio runtime.
#[derive(Clone)]
pub struct TaskService {
    runtime: Handle,
    permits: Arc<Semaphore>,
    running: Arc<DashMap<u64, String>>,
    next_id: Arc<AtomicU64>,
}

impl TaskService {
    pub fn new(runtime: Handle, max_concurrent_tasks: usize) -> Self {
        Self {
            runtime,
            permits: Arc::new(Semaphore::new(max_concurrent_tasks.max(1))),
            running: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Run `work` in the background and settle the returned result with its outcome.
    pub fn submit<T, F>(&self, title: impl Into<String>, work: F) -> AsyncResult<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ServiceError>> + Send + 'static,
    {
        let title = title.into();
        let (completer, result) = AsyncResult::pending();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let permits = Arc::clone(&self.permits);
        let running = Arc::clone(&self.running);
        let task_title = title.clone();

        self.runtime.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                completer.fail(ServiceError::Cancelled);
                return;
            };
            let _registration = Registration::new(&running, id, &task_title);

            tracing::debug!(task_id = id, title = %task_title, "Task started");
            let outcome = work.await;
            match &outcome {
                Ok(_) => tracing::debug!(task_id = id, title = %task_title, "Task finished"),
                Err(e) => {
                    tracing::warn!(task_id = id, title = %task_title, error = %e, "Task failed")
                }
            }
            completer.complete(outcome);
        });

        result.with_title(title)
    }

    /// Like [`TaskService::submit`] for CPU-bound or blocking work.
    pub fn submit_blocking<T, F>(&self, title: impl Into<String>, work: F) -> AsyncResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    {
        self.submit(title, async move {
            tokio::task::spawn_blocking(work)
                .await
                .unwrap_or_else(|e| {
                    tracing::error!(error = %e, "Blocking task panicked or was aborted");
                    Err(ServiceError::Cancelled)
                })
        })
    }

    /// Work currently holding a permit, oldest first.
    pub fn active_tasks(&self) -> Vec<TaskInfo> {
        let mut tasks: Vec<TaskInfo> = self
            .running
            .iter()
            .map(|entry| TaskInfo {
                id: *entry.key(),
                title: entry.value().clone(),
            })
            .collect();
        tasks.sort_by_key(|task| task.id);
        tasks
    }
}

/// Keeps a task listed as running until dropped.
struct Registration<'a> {
    running: &'a DashMap<u64, String>,
    id: u64,
}

impl<'a> Registration<'a> {
    fn new(running: &'a DashMap<u64, String>, id: u64, title: &str) -> Self {
        running.insert(id, title.to_string());
        Self { running, id }
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.running.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn submit_resolves_with_work_outcome() {
        let tasks = TaskService::new(Handle::current(), 2);

        let result = tasks.submit("Answer", async { Ok(42) });

        assert_eq!(result.title(), Some("Answer"));
        assert_eq!(result.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn submit_propagates_failure() {
        let tasks = TaskService::new(Handle::current(), 2);

        let result: AsyncResult<()> =
            tasks.submit("Failing", async { Err(ServiceError::validation("bad")) });

        assert!(result.await.unwrap_err().is_validation());
    }

    #[tokio::test]
    async fn submit_blocking_runs_closure() {
        let tasks = TaskService::new(Handle::current(), 2);

        let result = tasks.submit_blocking("Summing", || Ok((1..=100).sum::<u32>()));

        assert_eq!(result.await.unwrap(), 5050);
    }

    #[tokio::test]
    async fn running_work_is_listed_until_it_finishes() {
        let tasks = TaskService::new(Handle::current(), 2);
        let (release, gate) = oneshot::channel::<()>();
        let (started_tx, started) = oneshot::channel::<()>();

        let result = tasks.submit("Reading ladder", async move {
            let _ = started_tx.send(());
            let _ = gate.await;
            Ok(())
        });
        started.await.unwrap();

        let active = tasks.active_tasks();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Reading ladder");

        release.send(()).unwrap();
        result.await.unwrap();
        assert!(tasks.active_tasks().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_is_bounded() {
        let tasks = TaskService::new(Handle::current(), 2);
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let results: Vec<_> = (0..6)
            .map(|i| {
                let current = Arc::clone(&current);
                let peak = Arc::clone(&peak);
                tasks.submit(format!("task {}", i), async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    Ok(i)
                })
            })
            .collect();

        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(result.await.unwrap(), i);
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
