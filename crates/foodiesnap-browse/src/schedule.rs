use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Handle to a delayed task. Dropping or cancelling it aborts the task,
/// whether it is still waiting or already running.
#[derive(Debug)]
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

/// Runs `task` after `delay` on the current Tokio runtime.
pub fn schedule<F>(delay: Duration, task: F) -> ScheduledTask
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        task.await;
    });
    ScheduledTask { handle }
}

impl ScheduledTask {
    pub fn cancel(self) { self.handle.abort(); }

    pub fn is_finished(&self) -> bool { self.handle.is_finished() }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) { self.handle.abort(); }
}
