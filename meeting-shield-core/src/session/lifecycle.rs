use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::models::config::EngineConfig;
use crate::models::error::{SessionError, ValidationError};
use crate::models::join_request::JoinRequest;
use crate::models::policy::ProtectionPolicy;
use crate::models::state::{InitOutcome, InitProgress, MeetingStatus, PolicyState, SessionPhase};
use crate::models::summary::SessionSummary;
use crate::models::suppression::UiSuppressionSet;
use crate::protection::capture_guard::CaptureGuard;
use crate::protection::scheduler::{SanitizationScheduler, ScanStats};
use crate::protection::view_sanitizer::{ScanLimits, ViewSanitizer};
use crate::session::binding::WindowBinding;
use crate::session::init_bridge::InitBridge;
use crate::traits::capture_surface::CaptureSurface;
use crate::traits::conferencing_sdk::ConferencingSdk;
use crate::traits::host_window::HostWindow;
use crate::traits::main_context::MainContext;
use crate::traits::session_delegate::SessionDelegate;
use crate::traits::ui_node::RootProvider;

/// SDK instances that currently have a live engine bound to them.
static BOUND_SDKS: Mutex<Vec<usize>> = parking_lot::const_mutex(Vec::new());

fn sdk_key(sdk: &Arc<dyn ConferencingSdk>) -> usize {
    Arc::as_ptr(sdk) as *const () as usize
}

/// Identity of one init..teardown lifetime, for the end-of-session report.
struct SessionRecord {
    id: String,
    started_at: DateTime<Utc>,
    meeting_fingerprint: Option<String>,
    /// Totals from scan runs already replaced or stopped.
    scans: ScanStats,
}

impl SessionRecord {
    fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            meeting_fingerprint: None,
            scans: ScanStats::default(),
        }
    }
}

/// Internal mutable state, protected by `parking_lot::Mutex`.
struct SessionState {
    policy_state: PolicyState,
    binding: WindowBinding,
    /// Bumped whenever a pending init attempt must be ignored.
    attempt: u64,
    record: Option<SessionRecord>,
}

enum SessionEvent {
    Phase(SessionPhase),
    InitFinished(InitOutcome),
    Ended(SessionSummary),
}

struct Inner {
    sdk: Arc<dyn ConferencingSdk>,
    host: Arc<dyn HostWindow>,
    context: Arc<dyn MainContext>,
    config: EngineConfig,
    guard: CaptureGuard,
    scheduler: SanitizationScheduler,
    bridge: InitBridge,
    state: Mutex<SessionState>,
    delegate: Mutex<Option<Arc<dyn SessionDelegate>>>,
    sdk_key: usize,
}

/// The session state machine: gates init and join, and drives capture blocking
/// and sanitization.
///
/// Must be driven from the main context. SDK callbacks reach it through
/// [`meeting_listener`](Self::meeting_listener) and the init bridge, both of
/// which marshal onto that context.
pub struct SessionLifecycle {
    inner: Arc<Inner>,
}

impl SessionLifecycle {
    /// Bind a new engine to `sdk`. Fails if another live engine already owns it.
    pub fn new(
        sdk: Arc<dyn ConferencingSdk>,
        host: Arc<dyn HostWindow>,
        context: Arc<dyn MainContext>,
        config: EngineConfig,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        let key = sdk_key(&sdk);
        {
            let mut bound = BOUND_SDKS.lock();
            if bound.contains(&key) {
                return Err(SessionError::EngineAlreadyBound);
            }
            bound.push(key);
        }

        let inner = Arc::new(Inner {
            sdk,
            host,
            scheduler: SanitizationScheduler::new(Arc::clone(&context)),
            bridge: InitBridge::new(Arc::clone(&context), config.init_timeout()),
            context,
            config,
            guard: CaptureGuard::new(),
            state: Mutex::new(SessionState {
                policy_state: PolicyState::new(),
                binding: WindowBinding::default(),
                attempt: 0,
                record: None,
            }),
            delegate: Mutex::new(None),
            sdk_key: key,
        });
        Ok(Self { inner })
    }

    pub fn set_delegate(&self, delegate: Arc<dyn SessionDelegate>) {
        *self.inner.delegate.lock() = Some(delegate);
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.lock().policy_state.phase
    }

    /// Policy of the current session, if one has been supplied.
    pub fn policy(&self) -> Option<ProtectionPolicy> {
        self.inner.state.lock().policy_state.policy.clone()
    }

    pub fn is_sanitizing(&self) -> bool {
        self.inner.scheduler.is_running()
    }

    pub fn scan_stats(&self) -> Option<ScanStats> {
        self.inner.scheduler.stats()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn host(&self) -> &Arc<dyn HostWindow> {
        &self.inner.host
    }

    /// Initialize the SDK under `policy`.
    ///
    /// Capture blocking is applied before the SDK is contacted. Re-entrant calls
    /// once the SDK is ready re-assert protection and return `AlreadyReady`.
    pub fn init(&self, policy: ProtectionPolicy, jwt: &str) -> Result<InitProgress, SessionError> {
        self.inner.init(policy, jwt)
    }

    /// Join a meeting. Validation happens before any phase check or side effect.
    pub fn join(&self, meeting_id: &str, passcode: &str, display_name: &str) -> Result<(), SessionError> {
        let request = JoinRequest::new(meeting_id, passcode, display_name)?;
        self.inner.join(&request)
    }

    /// Apply a meeting status change. Call on the main context; use
    /// [`meeting_listener`](Self::meeting_listener) from SDK threads.
    pub fn handle_meeting_status(&self, status: MeetingStatus) {
        self.inner.handle_meeting_status(status);
    }

    /// A `Send + Sync` sink for the SDK's meeting-status callbacks.
    pub fn meeting_listener(&self) -> MeetingStatusListener {
        MeetingStatusListener {
            context: Arc::clone(&self.inner.context),
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// End the session from any phase.
    pub fn teardown(&self) {
        self.inner.end_session("teardown");
    }

    /// Return to `Uninitialized` from any phase, ending the session first if needed.
    pub fn reset(&self) {
        self.inner.reset();
    }

    pub fn on_foreground(&self, surface: &Arc<dyn CaptureSurface>) {
        self.inner.state.lock().binding.bind(surface);
        self.inner.enforce_capture_block();
    }

    pub fn on_background(&self) {
        self.inner.state.lock().binding.clear();
        self.inner.enforce_capture_block();
    }

    pub fn on_configuration_changed(&self, surface: &Arc<dyn CaptureSurface>) {
        self.on_foreground(surface);
    }
}

/// Forwards SDK meeting-status events onto the main context.
#[derive(Clone)]
pub struct MeetingStatusListener {
    context: Arc<dyn MainContext>,
    inner: Weak<Inner>,
}

impl MeetingStatusListener {
    pub fn on_meeting_status_changed(&self, status: MeetingStatus) {
        let inner = self.inner.clone();
        self.context.post(Box::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.handle_meeting_status(status);
            }
        }));
    }
}

impl Inner {
    fn init(self: &Arc<Self>, policy: ProtectionPolicy, jwt: &str) -> Result<InitProgress, SessionError> {
        if jwt.trim().is_empty() {
            return Err(ValidationError::MissingToken.into());
        }
        policy.validate()?;

        let mut events = Vec::new();
        let phase = self.state.lock().policy_state.phase;
        if phase.is_ready_or_later() {
            log::debug!("init while {}: re-asserting protection", phase.as_str());
            self.enforce_capture_block();
            return Ok(InitProgress::AlreadyReady);
        }
        match phase {
            SessionPhase::Initializing => return Ok(InitProgress::Initializing),
            phase if phase.is_terminal() => self.reset_state(&mut events),
            _ => {}
        }

        let capture_block = policy.capture_block_enabled;
        // Held strongly for the rest of init: the binding alone does not keep
        // a host-provided surface alive.
        let surface = {
            let mut state = self.state.lock();
            state.policy_state.policy = Some(policy);
            match state.binding.current() {
                Some(bound) => Some(bound),
                None => {
                    let foreground = self.host.foreground_surface();
                    if let Some(foreground) = &foreground {
                        state.binding.bind(foreground);
                    }
                    foreground
                }
            }
        };
        self.guard.apply(surface.as_deref(), capture_block);

        if self.sdk.is_initialized() {
            self.begin_session(SessionPhase::Ready, &mut events);
            self.dispatch(events);
            return Ok(InitProgress::AlreadyReady);
        }

        let Some(surface) = surface else {
            self.dispatch(events);
            return Err(SessionError::NoSurface);
        };

        let attempt = self.begin_session(SessionPhase::Initializing, &mut events);
        self.dispatch(std::mem::take(&mut events));

        let weak = Arc::downgrade(self);
        let params = self.config.sdk_init_params(jwt);
        let result = self.bridge.ensure_ready(
            self.sdk.as_ref(),
            &surface,
            &params,
            Box::new(move |outcome| {
                if let Some(inner) = weak.upgrade() {
                    inner.finish_init(attempt, outcome);
                }
            }),
        );

        match result {
            Ok(InitProgress::AlreadyReady) => {
                self.finish_init(attempt, InitOutcome::AlreadyReady);
                Ok(InitProgress::AlreadyReady)
            }
            Ok(InitProgress::Initializing) => Ok(InitProgress::Initializing),
            Err(e) => {
                self.finish_init(attempt, InitOutcome::Failed(e.clone()));
                Err(e.into())
            }
        }
    }

    /// Start a session record and move to `phase`. Returns the new init attempt id.
    fn begin_session(&self, phase: SessionPhase, events: &mut Vec<SessionEvent>) -> u64 {
        let mut state = self.state.lock();
        state.attempt += 1;
        state.record = Some(SessionRecord::new());
        Self::transition(&mut state, phase, events);
        state.attempt
    }

    fn finish_init(&self, attempt: u64, outcome: InitOutcome) {
        let mut events = Vec::new();
        {
            let mut state = self.state.lock();
            if state.attempt != attempt || state.policy_state.phase != SessionPhase::Initializing {
                log::debug!("discarding init outcome from superseded attempt {}", attempt);
                return;
            }
            match &outcome {
                InitOutcome::Ready | InitOutcome::AlreadyReady => {
                    log::info!("conferencing sdk ready");
                    Self::transition(&mut state, SessionPhase::Ready, &mut events);
                }
                InitOutcome::Failed(e) => {
                    log::warn!("conferencing sdk initialization failed: {}", e);
                    state.record = None;
                    Self::transition(&mut state, SessionPhase::Uninitialized, &mut events);
                }
            }
            events.push(SessionEvent::InitFinished(outcome));
        }
        self.enforce_capture_block();
        self.dispatch(events);
    }

    fn join(&self, request: &JoinRequest) -> Result<(), SessionError> {
        let mut events = Vec::new();
        let (surface, policy) = {
            let mut state = self.state.lock();
            let phase = state.policy_state.phase;
            if phase != SessionPhase::Ready {
                return Err(SessionError::NotReady {
                    phase,
                    operation: "join",
                });
            }
            let policy = state
                .policy_state
                .policy
                .clone()
                .unwrap_or_else(|| self.config.default_policy.clone());
            if let Some(record) = state.record.as_mut() {
                record.meeting_fingerprint = Some(request.meeting_fingerprint());
            }
            Self::transition(&mut state, SessionPhase::Joining, &mut events);
            (state.binding.current(), policy)
        };

        self.guard.apply(surface.as_deref(), policy.capture_block_enabled);
        let suppression = UiSuppressionSet::compose(&policy, &self.config.baseline_visible);
        self.dispatch(events);

        log::info!("joining meeting {}", request.meeting_fingerprint());
        if let Err(e) = self.sdk.join(surface.as_ref(), request, &suppression) {
            log::error!("sdk rejected join: {}", e);
            let mut events = Vec::new();
            {
                let mut state = self.state.lock();
                if state.policy_state.phase == SessionPhase::Joining {
                    Self::transition(&mut state, SessionPhase::Ready, &mut events);
                }
            }
            self.dispatch(events);
            return Err(e.into());
        }
        Ok(())
    }

    fn handle_meeting_status(&self, status: MeetingStatus) {
        match status {
            MeetingStatus::InMeeting => self.enter_meeting(),
            status if status.is_terminated() => {
                let phase = self.state.lock().policy_state.phase;
                if phase == SessionPhase::Joining || phase.is_in_meeting() {
                    self.end_session("meeting terminated");
                }
            }
            status => log::trace!("meeting status {:?}", status),
        }
    }

    fn enter_meeting(&self) {
        let mut events = Vec::new();
        let policy = {
            let mut state = self.state.lock();
            let phase = state.policy_state.phase;
            if !(phase == SessionPhase::Joining || phase.is_in_meeting()) {
                log::debug!("ignoring in-meeting status while {}", phase.as_str());
                return;
            }
            Self::transition(&mut state, SessionPhase::InMeeting, &mut events);
            state
                .policy_state
                .policy
                .clone()
                .unwrap_or_else(|| self.config.default_policy.clone())
        };

        self.enforce_capture_block();
        if let Err(e) = self.sdk.set_meeting_info_visible(false) {
            log::debug!("could not hide meeting info panel: {}", e);
        }

        let sanitizer = ViewSanitizer::new(
            policy.redaction_vocabulary.clone(),
            ScanLimits::from_config(&self.config),
        );
        if let Some(previous) = self.scheduler.stop() {
            if let Some(record) = self.state.lock().record.as_mut() {
                record.scans += previous;
            }
        }
        let sdk = Arc::clone(&self.sdk);
        let root_provider: RootProvider = Arc::new(move || sdk.meeting_root());
        self.scheduler
            .start(sanitizer, root_provider, policy.sanitization_interval());

        log::info!("meeting in progress; protection active");
        self.dispatch(events);
    }

    fn end_session(&self, reason: &str) {
        let stats = self.scheduler.stop().unwrap_or_default();

        let mut events = Vec::new();
        let (keep_capture_block, surface) = {
            let mut state = self.state.lock();
            if state.policy_state.phase.is_terminal() {
                return;
            }
            state.attempt += 1;
            Self::transition(&mut state, SessionPhase::Ended, &mut events);

            if let Some(mut record) = state.record.take() {
                record.scans += stats;
                events.push(SessionEvent::Ended(SessionSummary {
                    session_id: record.id,
                    meeting_fingerprint: record.meeting_fingerprint,
                    started_at: record.started_at.to_rfc3339(),
                    ended_at: Utc::now().to_rfc3339(),
                    scan_passes: record.scans.passes,
                    nodes_concealed: record.scans.concealed,
                }));
            }

            let keep = state
                .policy_state
                .policy
                .as_ref()
                .map_or(true, |p| p.keep_capture_block_after_session);
            (keep, state.binding.current())
        };

        if !keep_capture_block {
            self.guard
                .apply_all(&[surface, self.sdk.meeting_surface()], false);
        }
        log::info!("session ended ({})", reason);
        self.dispatch(events);
    }

    fn reset(&self) {
        let phase = self.state.lock().policy_state.phase;
        if !(phase.is_terminal() || phase == SessionPhase::Uninitialized) {
            self.end_session("reset");
        }
        let mut events = Vec::new();
        self.reset_state(&mut events);
        self.dispatch(events);
    }

    fn reset_state(&self, events: &mut Vec<SessionEvent>) {
        self.scheduler.stop();
        let mut state = self.state.lock();
        state.attempt += 1;
        state.record = None;
        state.policy_state.policy = None;
        Self::transition(&mut state, SessionPhase::Uninitialized, events);
    }

    /// Bring the bound surface and the SDK's meeting surface to the policy flag.
    fn enforce_capture_block(&self) {
        let (enabled, surface) = {
            let state = self.state.lock();
            let enabled = state
                .policy_state
                .capture_block_enabled(self.config.default_policy.capture_block_enabled);
            (enabled, state.binding.current())
        };
        self.guard
            .apply_all(&[surface, self.sdk.meeting_surface()], enabled);
    }

    fn transition(state: &mut SessionState, phase: SessionPhase, events: &mut Vec<SessionEvent>) {
        let previous = state.policy_state.phase;
        if previous == phase {
            return;
        }
        log::debug!("session phase {} -> {}", previous.as_str(), phase.as_str());
        state.policy_state.phase = phase;
        events.push(SessionEvent::Phase(phase));
    }

    fn dispatch(&self, events: Vec<SessionEvent>) {
        if events.is_empty() {
            return;
        }
        let Some(delegate) = self.delegate.lock().clone() else {
            return;
        };
        for event in events {
            match event {
                SessionEvent::Phase(phase) => delegate.on_phase_changed(phase),
                SessionEvent::InitFinished(outcome) => delegate.on_init_finished(&outcome),
                SessionEvent::Ended(summary) => delegate.on_session_ended(&summary),
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        BOUND_SDKS.lock().retain(|key| *key != self.sdk_key);
    }
}
