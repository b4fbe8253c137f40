use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Duration, Instant};
use tracing::{error, warn};

/// Background handler tasks that must finish before the final state save
#[derive(Default)]
pub struct TaskSet {
    tasks: Mutex<JoinSet<()>>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.lock();
        // Reap finished tasks so the set only holds live ones
        while let Some(res) = tasks.try_join_next() {
            if let Err(e) = res {
                error!("Handler task failed: {}", e);
            }
        }
        tasks.spawn(task);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait for every task, including ones spawned while draining.
    /// Returns false if the deadline hit first; the leftovers are aborted.
    pub async fn drain(&self, grace: Duration) -> bool {
        let deadline = Instant::now() + grace;
        loop {
            let mut batch = std::mem::take(&mut *self.lock());
            if batch.is_empty() {
                return true;
            }
            loop {
                match timeout_at(deadline, batch.join_next()).await {
                    Ok(Some(Err(e))) => error!("Handler task failed: {}", e),
                    Ok(Some(Ok(()))) => {}
                    Ok(None) => break,
                    Err(_) => {
                        warn!("Aborting {} handler tasks still running at shutdown", batch.len());
                        batch.abort_all();
                        self.lock().abort_all();
                        return false;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_drain_waits_for_nested_tasks() {
        let tasks = Arc::new(TaskSet::new());
        let done = Arc::new(AtomicUsize::new(0));

        let inner_tasks = tasks.clone();
        let inner_done = done.clone();
        tasks.spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let done = inner_done.clone();
            inner_tasks.spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                done.fetch_add(1, Ordering::SeqCst);
            });
            inner_done.fetch_add(1, Ordering::SeqCst);
        });

        assert!(tasks.drain(Duration::from_secs(5)).await);
        assert_eq!(done.load(Ordering::SeqCst), 2);
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let tasks = TaskSet::new();
        tasks.spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        assert!(!tasks.drain(Duration::from_millis(20)).await);
    }
}
