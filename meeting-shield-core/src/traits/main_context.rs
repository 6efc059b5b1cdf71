use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Unit of work run on the main context.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// The single serial execution context that drives session work.
///
/// Tasks run one at a time, in due order. Implemented by `ManualContext` and
/// `LoopContext`.
pub trait MainContext: Send + Sync {
    /// Run `task` as soon as possible.
    fn post(&self, task: Task);

    /// Run `task` after `delay`, unless the returned handle is cancelled first.
    fn post_delayed(&self, delay: Duration, task: Task) -> TaskHandle;
}

/// Cancellation handle for a delayed task. Cancelling a task that already ran is a no-op.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
