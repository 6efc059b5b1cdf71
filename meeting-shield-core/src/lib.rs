//! # meeting-shield-core
//!
//! Platform-agnostic session protection engine for an embedded conferencing SDK.
//!
//! Blocks screen capture of the host and meeting windows, periodically conceals
//! on-screen meeting identifiers, and gates SDK initialization and joining.
//! Platform backends (Windows window affinity, other toolkits) implement the
//! `CaptureSurface` and `UiNode` traits and plug into the generic `SessionLifecycle`.
//!
//! ## Architecture
//!
//! ```text
//! meeting-shield-core (this crate)
//! ├── traits/      ← CaptureSurface, UiNode, ConferencingSdk, HostWindow, MainContext, SessionDelegate
//! ├── models/      ← SessionPhase, ProtectionPolicy, JoinRequest, UiSuppressionSet, errors, EngineConfig
//! ├── protection/  ← CaptureGuard, ViewSanitizer, SanitizationScheduler
//! ├── session/     ← SessionLifecycle, InitBridge, WindowBinding
//! ├── runtime/     ← ManualContext, LoopContext
//! └── commands/    ← CommandSurface (initZoom / joinMeeting / getPlatformVersion)
//! ```

pub mod commands;
pub mod models;
pub mod protection;
pub mod runtime;
pub mod session;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience.
pub use commands::surface::{CommandError, CommandSurface, MethodCall};
pub use models::config::{EngineConfig, SdkInitParams};
pub use models::error::{
    InitError, InitErrorCode, PlatformEffectError, SdkError, SessionError, ValidationError,
};
pub use models::join_request::JoinRequest;
pub use models::policy::{Affordance, ProtectionPolicy, RedactionVocabulary};
pub use models::state::{InitOutcome, InitProgress, MeetingStatus, SessionPhase};
pub use models::summary::SessionSummary;
pub use models::suppression::UiSuppressionSet;
pub use protection::capture_guard::CaptureGuard;
pub use protection::scheduler::{SanitizationScheduler, ScanStats};
pub use protection::view_sanitizer::{ScanLimits, ScanReport, ViewSanitizer};
pub use runtime::looper::LoopContext;
pub use runtime::manual::ManualContext;
pub use session::init_bridge::InitBridge;
pub use session::lifecycle::{MeetingStatusListener, SessionLifecycle};
pub use traits::capture_surface::CaptureSurface;
pub use traits::conferencing_sdk::{ConferencingSdk, InitResultCallback};
pub use traits::host_window::HostWindow;
pub use traits::main_context::{MainContext, Task, TaskHandle};
pub use traits::session_delegate::SessionDelegate;
pub use traits::ui_node::{RootProvider, UiNode};
