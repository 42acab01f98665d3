//! Cancellable handles for the session's background timers.

use tokio::task::JoinHandle;

/// Owns one spawned timer task. The task is aborted on `cancel()` and
/// again when the handle drops; a handle that leaves scope cannot leak a
/// running timer.
#[derive(Debug)]
pub struct TaskHandle {
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    /// Stop the task. Safe to call more than once.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_the_timer() {
        let fired = Arc::new(AtomicBool::new(false));
        let task_fired = fired.clone();
        let handle = TaskHandle::new(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            task_fired.store(true, Ordering::SeqCst);
        }));
        tokio::task::yield_now().await;

        handle.cancel();
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!fired.load(Ordering::SeqCst), "cancelled timer must not fire");
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_the_task() {
        let fired = Arc::new(AtomicBool::new(false));
        let task_fired = fired.clone();
        {
            let _handle = TaskHandle::new(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                task_fired.store(true, Ordering::SeqCst);
            }));
            tokio::task::yield_now().await;
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!fired.load(Ordering::SeqCst), "dropped handle must abort its task");
    }
}
