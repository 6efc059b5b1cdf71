//! In-memory collaborators shared by the unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::models::config::SdkInitParams;
use crate::models::error::{PlatformEffectError, SdkError};
use crate::models::join_request::JoinRequest;
use crate::models::state::{InitOutcome, SessionPhase};
use crate::models::summary::SessionSummary;
use crate::models::suppression::UiSuppressionSet;
use crate::traits::capture_surface::CaptureSurface;
use crate::traits::conferencing_sdk::{ConferencingSdk, InitResultCallback};
use crate::traits::host_window::HostWindow;
use crate::traits::session_delegate::SessionDelegate;
use crate::traits::ui_node::UiNode;

pub(crate) struct FakeSurface {
    label: String,
    blocked: AtomicBool,
    reports_state: bool,
    fails: bool,
    history: Mutex<Vec<bool>>,
}

impl FakeSurface {
    fn build(label: &str, reports_state: bool, fails: bool) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            blocked: AtomicBool::new(false),
            reports_state,
            fails,
            history: Mutex::new(Vec::new()),
        })
    }

    pub fn new(label: &str) -> Arc<Self> {
        Self::build(label, true, false)
    }

    /// Cannot report its current state, like surfaces on older platforms.
    pub fn opaque(label: &str) -> Arc<Self> {
        Self::build(label, false, false)
    }

    pub fn failing(label: &str) -> Arc<Self> {
        Self::build(label, true, true)
    }

    pub fn blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> usize {
        self.history.lock().len()
    }

    /// Every value successfully or unsuccessfully requested, in order.
    pub fn history(&self) -> Vec<bool> {
        self.history.lock().clone()
    }
}

impl CaptureSurface for FakeSurface {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn capture_blocked(&self) -> Option<bool> {
        self.reports_state.then(|| self.blocked())
    }

    fn set_capture_blocked(&self, blocked: bool) -> Result<(), PlatformEffectError> {
        self.history.lock().push(blocked);
        if self.fails {
            return Err(PlatformEffectError::Os("window manager refused".into()));
        }
        self.blocked.store(blocked, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) struct FakeNode {
    id: u64,
    text: Option<String>,
    children: Mutex<Vec<Option<Arc<dyn UiNode>>>>,
    parent: Mutex<Option<Weak<FakeNode>>>,
    concealed: AtomicBool,
    conceal_calls: AtomicUsize,
    keyed: AtomicBool,
    fail_conceal: AtomicBool,
    panics: AtomicBool,
}

impl FakeNode {
    fn build(id: u64, text: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            id,
            text: text.map(str::to_string),
            children: Mutex::new(Vec::new()),
            parent: Mutex::new(None),
            concealed: AtomicBool::new(false),
            conceal_calls: AtomicUsize::new(0),
            keyed: AtomicBool::new(false),
            fail_conceal: AtomicBool::new(false),
            panics: AtomicBool::new(false),
        })
    }

    pub fn group(id: u64) -> Arc<Self> {
        Self::build(id, None)
    }

    pub fn text(id: u64, text: &str) -> Arc<Self> {
        Self::build(id, Some(text))
    }

    pub fn as_node(node: &Arc<Self>) -> Arc<dyn UiNode> {
        node.clone()
    }

    pub fn keyed(self: Arc<Self>) -> Arc<Self> {
        self.keyed.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_conceal(self: Arc<Self>) -> Arc<Self> {
        self.fail_conceal.store(true, Ordering::SeqCst);
        self
    }

    pub fn panicking(self: Arc<Self>) -> Arc<Self> {
        self.panics.store(true, Ordering::SeqCst);
        self
    }

    /// Append `child` and make `self` its containing group.
    pub fn push(self: &Arc<Self>, child: &Arc<FakeNode>) {
        *child.parent.lock() = Some(Arc::downgrade(self));
        let node: Arc<dyn UiNode> = child.clone();
        self.children.lock().push(Some(node));
    }

    pub fn push_missing(&self) {
        self.children.lock().push(None);
    }

    pub fn concealed(&self) -> bool {
        self.concealed.load(Ordering::SeqCst)
    }

    pub fn conceal_calls(&self) -> usize {
        self.conceal_calls.load(Ordering::SeqCst)
    }
}

impl UiNode for FakeNode {
    fn visible_text(&self) -> Option<String> {
        if self.panics.load(Ordering::SeqCst) {
            panic!("adapter failure in node {}", self.id);
        }
        self.text.clone()
    }

    fn children(&self) -> Vec<Option<Arc<dyn UiNode>>> {
        self.children.lock().clone()
    }

    fn containing_group(&self) -> Option<Arc<dyn UiNode>> {
        let parent: Arc<dyn UiNode> = self.parent.lock().as_ref().and_then(Weak::upgrade)?;
        Some(parent)
    }

    fn is_concealed(&self) -> bool {
        self.concealed()
    }

    fn conceal(&self) -> Result<(), PlatformEffectError> {
        self.conceal_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_conceal.load(Ordering::SeqCst) {
            return Err(PlatformEffectError::SurfaceGone);
        }
        self.concealed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn node_key(&self) -> Option<u64> {
        self.keyed.load(Ordering::SeqCst).then_some(self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InitBehavior {
    /// Call back synchronously from `initialize` with this code.
    Respond(i32),
    /// Keep the callback; the test fires it with `fire_init_result`.
    Withhold,
    /// Refuse synchronously.
    Reject,
}

pub(crate) struct FakeSdk {
    behavior: Mutex<InitBehavior>,
    initialized: AtomicBool,
    initialize_calls: AtomicUsize,
    pending: Mutex<Option<InitResultCallback>>,
    joins: Mutex<Vec<(String, UiSuppressionSet)>>,
    reject_join: AtomicBool,
    meeting_surface: Mutex<Option<Arc<FakeSurface>>>,
    meeting_root: Mutex<Option<Arc<dyn UiNode>>>,
    supports_info_toggle: AtomicBool,
    info_visible: Mutex<Option<bool>>,
}

impl FakeSdk {
    pub fn new(behavior: InitBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior: Mutex::new(behavior),
            initialized: AtomicBool::new(false),
            initialize_calls: AtomicUsize::new(0),
            pending: Mutex::new(None),
            joins: Mutex::new(Vec::new()),
            reject_join: AtomicBool::new(false),
            meeting_surface: Mutex::new(None),
            meeting_root: Mutex::new(None),
            supports_info_toggle: AtomicBool::new(false),
            info_visible: Mutex::new(None),
        })
    }

    pub fn set_behavior(&self, behavior: InitBehavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn set_initialized(&self, initialized: bool) {
        self.initialized.store(initialized, Ordering::SeqCst);
    }

    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    /// Deliver an init result through the last callback handed to `initialize`.
    pub fn fire_init_result(&self, code: i32, internal_code: i32) {
        let callback = self.pending.lock().clone();
        if let Some(callback) = callback {
            if code == 0 {
                self.set_initialized(true);
            }
            callback(code, internal_code);
        }
    }

    pub fn joins(&self) -> Vec<(String, UiSuppressionSet)> {
        self.joins.lock().clone()
    }

    pub fn reject_joins(&self) {
        self.reject_join.store(true, Ordering::SeqCst);
    }

    pub fn open_meeting_window(&self, surface: Arc<FakeSurface>, root: Arc<dyn UiNode>) {
        *self.meeting_surface.lock() = Some(surface);
        *self.meeting_root.lock() = Some(root);
    }

    pub fn support_info_toggle(&self) {
        self.supports_info_toggle.store(true, Ordering::SeqCst);
    }

    pub fn info_visible(&self) -> Option<bool> {
        *self.info_visible.lock()
    }
}

impl ConferencingSdk for FakeSdk {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn initialize(
        &self,
        _surface: &Arc<dyn CaptureSurface>,
        _params: &SdkInitParams,
        on_result: InitResultCallback,
    ) -> Result<(), SdkError> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        let behavior = *self.behavior.lock();
        match behavior {
            InitBehavior::Reject => {
                *self.pending.lock() = Some(on_result);
                Err(SdkError::Rejected {
                    code: 99,
                    detail: "bad token".into(),
                })
            }
            InitBehavior::Withhold => {
                *self.pending.lock() = Some(on_result);
                Ok(())
            }
            InitBehavior::Respond(code) => {
                if code == 0 {
                    self.set_initialized(true);
                }
                on_result(code, 0);
                Ok(())
            }
        }
    }

    fn join(
        &self,
        _surface: Option<&Arc<dyn CaptureSurface>>,
        request: &JoinRequest,
        suppression: &UiSuppressionSet,
    ) -> Result<(), SdkError> {
        if self.reject_join.load(Ordering::SeqCst) {
            return Err(SdkError::Rejected {
                code: 1,
                detail: "meeting not found".into(),
            });
        }
        self.joins
            .lock()
            .push((request.meeting_id().to_string(), suppression.clone()));
        Ok(())
    }

    fn meeting_surface(&self) -> Option<Arc<dyn CaptureSurface>> {
        let surface: Arc<dyn CaptureSurface> = self.meeting_surface.lock().clone()?;
        Some(surface)
    }

    fn meeting_root(&self) -> Option<Arc<dyn UiNode>> {
        self.meeting_root.lock().clone()
    }

    fn set_meeting_info_visible(&self, visible: bool) -> Result<(), SdkError> {
        if !self.supports_info_toggle.load(Ordering::SeqCst) {
            return Err(SdkError::Unsupported("meeting info toggle"));
        }
        *self.info_visible.lock() = Some(visible);
        Ok(())
    }
}

pub(crate) struct FakeHost {
    foreground: Mutex<Option<Arc<dyn CaptureSurface>>>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            foreground: Mutex::new(None),
        })
    }

    pub fn with_foreground(surface: Arc<dyn CaptureSurface>) -> Arc<Self> {
        Arc::new(Self {
            foreground: Mutex::new(Some(surface)),
        })
    }
}

impl HostWindow for FakeHost {
    fn foreground_surface(&self) -> Option<Arc<dyn CaptureSurface>> {
        self.foreground.lock().clone()
    }

    fn platform_version(&self) -> String {
        "TestOS 1.0".into()
    }
}

/// A fresh handle onto a shared window, as backends hand out per lookup.
struct SurfaceHandle(Arc<FakeSurface>);

impl CaptureSurface for SurfaceHandle {
    fn label(&self) -> String {
        self.0.label()
    }

    fn capture_blocked(&self) -> Option<bool> {
        self.0.capture_blocked()
    }

    fn set_capture_blocked(&self, blocked: bool) -> Result<(), PlatformEffectError> {
        self.0.set_capture_blocked(blocked)
    }
}

/// Returns a new, otherwise unreferenced handle on every lookup.
pub(crate) struct FreshHandleHost {
    window: Arc<FakeSurface>,
}

impl FreshHandleHost {
    pub fn new(window: Arc<FakeSurface>) -> Arc<Self> {
        Arc::new(Self { window })
    }
}

impl HostWindow for FreshHandleHost {
    fn foreground_surface(&self) -> Option<Arc<dyn CaptureSurface>> {
        let handle: Arc<dyn CaptureSurface> = Arc::new(SurfaceHandle(Arc::clone(&self.window)));
        Some(handle)
    }

    fn platform_version(&self) -> String {
        "TestOS 1.0".into()
    }
}

#[derive(Default)]
pub(crate) struct RecordingDelegate {
    pub phases: Mutex<Vec<SessionPhase>>,
    pub init_outcomes: Mutex<Vec<InitOutcome>>,
    pub summaries: Mutex<Vec<SessionSummary>>,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl SessionDelegate for RecordingDelegate {
    fn on_phase_changed(&self, phase: SessionPhase) {
        self.phases.lock().push(phase);
    }

    fn on_init_finished(&self, outcome: &InitOutcome) {
        self.init_outcomes.lock().push(outcome.clone());
    }

    fn on_session_ended(&self, summary: &SessionSummary) {
        self.summaries.lock().push(summary.clone());
    }
}
