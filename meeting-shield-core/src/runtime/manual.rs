use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::traits::main_context::{MainContext, Task, TaskHandle};

struct Scheduled {
    due: Duration,
    seq: u64,
    task: Task,
    handle: TaskHandle,
}

struct ManualQueue {
    now: Duration,
    next_seq: u64,
    tasks: Vec<Scheduled>,
}

/// Main context driven by an explicit virtual clock.
///
/// Nothing runs until the owner calls [`run_pending`](Self::run_pending) or
/// [`advance`](Self::advance). Hosts that pump their own UI loop call these from it;
/// tests use them to step time deterministically.
pub struct ManualContext {
    queue: Mutex<ManualQueue>,
}

impl ManualContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(ManualQueue {
                now: Duration::ZERO,
                next_seq: 0,
                tasks: Vec::new(),
            }),
        })
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.queue.lock().now
    }

    /// Scheduled tasks that have not been cancelled.
    pub fn pending_count(&self) -> usize {
        self.queue
            .lock()
            .tasks
            .iter()
            .filter(|s| !s.handle.is_cancelled())
            .count()
    }

    /// Run every task already due, including ones posted while running. Returns tasks run.
    pub fn run_pending(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Move the clock forward by `by`, running tasks in due order as time passes.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.queue.lock().now + by;
        let mut ran = 0;

        loop {
            let next = {
                let mut queue = self.queue.lock();
                queue.tasks.retain(|s| !s.handle.is_cancelled());
                let earliest = queue
                    .tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.due <= target)
                    .min_by_key(|(_, s)| (s.due, s.seq))
                    .map(|(i, _)| i);
                match earliest {
                    Some(index) => {
                        let scheduled = queue.tasks.swap_remove(index);
                        queue.now = queue.now.max(scheduled.due);
                        Some(scheduled)
                    }
                    None => {
                        queue.now = target;
                        None
                    }
                }
            };

            let Some(scheduled) = next else {
                return ran;
            };
            if !scheduled.handle.is_cancelled() {
                (scheduled.task)();
                ran += 1;
            }
        }
    }

    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::new();
        let mut queue = self.queue.lock();
        let due = queue.now + delay;
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.tasks.push(Scheduled {
            due,
            seq,
            task,
            handle: handle.clone(),
        });
        handle
    }
}

impl MainContext for ManualContext {
    fn post(&self, task: Task) {
        self.schedule(Duration::ZERO, task);
    }

    fn post_delayed(&self, delay: Duration, task: Task) -> TaskHandle {
        self.schedule(delay, task)
    }
}
