use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::config::SdkInitParams;
use crate::models::error::{InitError, InitErrorCode};
use crate::models::state::{InitOutcome, InitProgress};
use crate::traits::capture_surface::CaptureSurface;
use crate::traits::conferencing_sdk::{ConferencingSdk, InitResultCallback};
use crate::traits::main_context::{MainContext, TaskHandle};

/// Receives the final init outcome on the main context.
pub type OutcomeHandler = Box<dyn FnOnce(InitOutcome) + Send + 'static>;

/// Single-resolution slot shared by the SDK callback and the timeout.
struct Completion {
    context: Arc<dyn MainContext>,
    resolved: AtomicBool,
    handler: Mutex<Option<OutcomeHandler>>,
    timeout: Mutex<Option<TaskHandle>>,
}

impl Completion {
    /// Returns `false` when an earlier resolution already won.
    fn resolve(&self, outcome: InitOutcome) -> bool {
        if self.resolved.swap(true, Ordering::SeqCst) {
            log::debug!("ignoring late init resolution: {:?}", outcome);
            return false;
        }
        self.disarm_timeout();
        if let Some(handler) = self.handler.lock().take() {
            self.context.post(Box::new(move || handler(outcome)));
        }
        true
    }

    /// Claim the slot without delivering anything.
    fn abandon(&self) {
        self.resolved.store(true, Ordering::SeqCst);
        self.disarm_timeout();
        self.handler.lock().take();
    }

    fn disarm_timeout(&self) {
        if let Some(timeout) = self.timeout.lock().take() {
            timeout.cancel();
        }
    }
}

/// Turns the SDK's callback-style initialization into one outcome with a timeout.
pub struct InitBridge {
    context: Arc<dyn MainContext>,
    timeout: Duration,
}

impl InitBridge {
    pub fn new(context: Arc<dyn MainContext>, timeout: Duration) -> Self {
        Self { context, timeout }
    }

    /// Ensure the SDK is initialized.
    ///
    /// Returns `AlreadyReady` without touching `on_outcome` when the SDK is already
    /// up. Otherwise starts initialization and returns `Initializing`; `on_outcome`
    /// then runs exactly once on the main context with `Ready` or `Failed`. A
    /// synchronous refusal from the SDK is returned directly and `on_outcome` is
    /// dropped.
    pub fn ensure_ready(
        &self,
        sdk: &dyn ConferencingSdk,
        surface: &Arc<dyn CaptureSurface>,
        params: &SdkInitParams,
        on_outcome: OutcomeHandler,
    ) -> Result<InitProgress, InitError> {
        if sdk.is_initialized() {
            return Ok(InitProgress::AlreadyReady);
        }

        let completion = Arc::new(Completion {
            context: Arc::clone(&self.context),
            resolved: AtomicBool::new(false),
            handler: Mutex::new(Some(on_outcome)),
            timeout: Mutex::new(None),
        });

        let timeout_slot = Arc::clone(&completion);
        let timeout_ms = self.timeout.as_millis();
        let timeout_handle = self.context.post_delayed(
            self.timeout,
            Box::new(move || {
                if timeout_slot.resolve(InitOutcome::Failed(InitError::timeout(timeout_ms))) {
                    log::warn!("sdk initialization timed out after {} ms", timeout_ms);
                }
            }),
        );
        *completion.timeout.lock() = Some(timeout_handle);

        let callback_slot = Arc::clone(&completion);
        let callback: InitResultCallback = Arc::new(move |code: i32, internal_code: i32| {
            let outcome = if code == 0 {
                InitOutcome::Ready
            } else {
                InitOutcome::Failed(InitError::from_sdk(code, internal_code))
            };
            callback_slot.resolve(outcome);
        });

        log::info!("initializing conferencing sdk (domain {})", params.domain);
        if let Err(e) = sdk.initialize(surface, params, callback) {
            completion.abandon();
            log::error!("sdk refused initialization: {}", e);
            return Err(InitError {
                code: InitErrorCode::Rejected,
                internal_code: 0,
                detail: e.to_string(),
            });
        }

        Ok(InitProgress::Initializing)
    }
}
