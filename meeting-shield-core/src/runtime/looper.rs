use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::traits::main_context::{MainContext, Task, TaskHandle};

struct Entry {
    due: Instant,
    seq: u64,
    task: Task,
    handle: TaskHandle,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

struct LoopQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
    running: bool,
}

struct Shared {
    queue: Mutex<LoopQueue>,
    wake: Condvar,
}

/// Main context backed by a dedicated looper thread.
///
/// For hosts without a UI loop of their own. Tasks run serially on the
/// `meeting-shield-main` thread; a panicking task is logged and the loop continues.
pub struct LoopContext {
    shared: Arc<Shared>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl LoopContext {
    pub fn start() -> io::Result<Arc<Self>> {
        let shared = Arc::new(Shared {
            queue: Mutex::new(LoopQueue {
                heap: BinaryHeap::new(),
                next_seq: 0,
                running: true,
            }),
            wake: Condvar::new(),
        });

        let loop_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("meeting-shield-main".into())
            .spawn(move || run_loop(&loop_shared))?;

        Ok(Arc::new(Self {
            shared,
            handle: Mutex::new(Some(handle)),
        }))
    }

    /// Stop the looper and wait for it to exit. Pending tasks are dropped.
    pub fn shutdown(&self) {
        {
            let mut queue = self.shared.queue.lock();
            queue.running = false;
            queue.heap.clear();
        }
        self.shared.wake.notify_all();

        if let Some(handle) = self.handle.lock().take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                log::error!("main context thread panicked during shutdown");
            }
        }
    }

    fn schedule(&self, delay: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::new();
        {
            let mut queue = self.shared.queue.lock();
            if !queue.running {
                log::debug!("main context stopped; dropping task");
                handle.cancel();
                return handle;
            }
            let seq = queue.next_seq;
            queue.next_seq += 1;
            queue.heap.push(Reverse(Entry {
                due: Instant::now() + delay,
                seq,
                task,
                handle: handle.clone(),
            }));
        }
        self.shared.wake.notify_one();
        handle
    }
}

impl MainContext for LoopContext {
    fn post(&self, task: Task) {
        self.schedule(Duration::ZERO, task);
    }

    fn post_delayed(&self, delay: Duration, task: Task) -> TaskHandle {
        self.schedule(delay, task)
    }
}

impl Drop for LoopContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(shared: &Shared) {
    let mut queue = shared.queue.lock();
    while queue.running {
        let next_due = queue.heap.peek().map(|Reverse(entry)| entry.due);
        match next_due {
            None => shared.wake.wait(&mut queue),
            Some(due) if due > Instant::now() => {
                shared.wake.wait_until(&mut queue, due);
            }
            Some(_) => {
                if let Some(Reverse(entry)) = queue.heap.pop() {
                    if !entry.handle.is_cancelled() {
                        MutexGuard::unlocked(&mut queue, || run_task(entry.task));
                    }
                }
            }
        }
    }
}

fn run_task(task: Task) {
    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
        log::error!("main context task panicked");
    }
}
