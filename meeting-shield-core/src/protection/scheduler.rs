use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::ops::AddAssign;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;

use crate::protection::view_sanitizer::ViewSanitizer;
use crate::traits::main_context::{MainContext, TaskHandle};
use crate::traits::ui_node::RootProvider;

/// Cumulative counters for one scheduler run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub passes: u64,
    pub concealed: u64,
}

impl AddAssign for ScanStats {
    fn add_assign(&mut self, other: Self) {
        self.passes += other.passes;
        self.concealed += other.concealed;
    }
}

/// One start..stop lifetime of the periodic task.
struct ScanRun {
    id: u64,
    sanitizer: ViewSanitizer,
    root_provider: RootProvider,
    interval: Duration,
    stopped: AtomicBool,
    next_tick: Mutex<Option<TaskHandle>>,
    passes: AtomicU64,
    concealed: AtomicU64,
}

impl ScanRun {
    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(handle) = self.next_tick.lock().take() {
            handle.cancel();
        }
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn stats(&self) -> ScanStats {
        ScanStats {
            passes: self.passes.load(Ordering::Relaxed),
            concealed: self.concealed.load(Ordering::Relaxed),
        }
    }

    fn tick(&self) {
        let root = (self.root_provider)();
        let concealed = self.sanitizer.scan(root.as_ref());
        self.passes.fetch_add(1, Ordering::Relaxed);
        if concealed > 0 {
            self.concealed.fetch_add(concealed as u64, Ordering::Relaxed);
            log::info!("sanitizer run {} concealed {} view group(s)", self.id, concealed);
        }
    }
}

/// Runs a `ViewSanitizer` on a fixed interval on the main context.
///
/// At most one run is active. `start` replaces any previous run; `stop` cancels
/// the next tick but lets a tick already executing finish.
pub struct SanitizationScheduler {
    context: Arc<dyn MainContext>,
    current: Mutex<Option<Arc<ScanRun>>>,
    next_run_id: AtomicU64,
}

impl SanitizationScheduler {
    pub fn new(context: Arc<dyn MainContext>) -> Self {
        Self {
            context,
            current: Mutex::new(None),
            next_run_id: AtomicU64::new(1),
        }
    }

    /// Start scanning every `interval`, fetching a fresh root from `root_provider`
    /// on each tick. The first pass runs immediately.
    pub fn start(&self, sanitizer: ViewSanitizer, root_provider: RootProvider, interval: Duration) {
        let run = Arc::new(ScanRun {
            id: self.next_run_id.fetch_add(1, Ordering::Relaxed),
            sanitizer,
            root_provider,
            interval,
            stopped: AtomicBool::new(false),
            next_tick: Mutex::new(None),
            passes: AtomicU64::new(0),
            concealed: AtomicU64::new(0),
        });

        let previous = self.current.lock().replace(Arc::clone(&run));
        if let Some(previous) = previous {
            log::debug!("sanitizer run {} replaced by run {}", previous.id, run.id);
            previous.stop();
        }

        log::debug!("sanitizer run {} started ({} ms interval)", run.id, interval.as_millis());
        schedule_tick(&self.context, run, Duration::ZERO);
    }

    /// Stop the active run, returning its counters. Safe to call repeatedly.
    pub fn stop(&self) -> Option<ScanStats> {
        let run = self.current.lock().take()?;
        run.stop();
        log::debug!("sanitizer run {} stopped", run.id);
        Some(run.stats())
    }

    pub fn is_running(&self) -> bool {
        self.current.lock().as_ref().is_some_and(|run| !run.is_stopped())
    }

    pub fn stats(&self) -> Option<ScanStats> {
        self.current.lock().as_ref().map(|run| run.stats())
    }
}

impl Drop for SanitizationScheduler {
    fn drop(&mut self) {
        if let Some(run) = self.current.get_mut().take() {
            run.stop();
        }
    }
}

/// The queued tick holds the context weakly; the context owns the tick.
fn schedule_tick(context: &Arc<dyn MainContext>, run: Arc<ScanRun>, delay: Duration) {
    let tick_context: Weak<dyn MainContext> = Arc::downgrade(context);
    let tick_run = Arc::clone(&run);
    let mut next_tick = run.next_tick.lock();
    let handle = context.post_delayed(
        delay,
        Box::new(move || {
            if tick_run.is_stopped() {
                return;
            }
            tick_run.tick();
            if tick_run.is_stopped() {
                return;
            }
            if let Some(context) = tick_context.upgrade() {
                let interval = tick_run.interval;
                schedule_tick(&context, tick_run, interval);
            }
        }),
    );

    if run.is_stopped() {
        handle.cancel();
    } else {
        *next_tick = Some(handle);
    }
}
