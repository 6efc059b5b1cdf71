use std::sync::Arc;

use crate::models::config::SdkInitParams;
use crate::models::error::SdkError;
use crate::models::join_request::JoinRequest;
use crate::models::suppression::UiSuppressionSet;
use crate::traits::capture_surface::CaptureSurface;
use crate::traits::ui_node::UiNode;

/// Callback the SDK invokes with its initialization result.
///
/// Parameters:
/// - `error_code`: `0` on success.
/// - `internal_code`: SDK-internal detail code.
///
/// May fire on any thread, more than once, or never.
pub type InitResultCallback = Arc<dyn Fn(i32, i32) + Send + Sync + 'static>;

/// The embedded conferencing SDK, treated as an opaque capability provider.
///
/// One instance per process. Meeting status changes are reported back through
/// `SessionLifecycle::meeting_listener`.
pub trait ConferencingSdk: Send + Sync {
    fn is_initialized(&self) -> bool;

    /// Begin asynchronous initialization. The result arrives via `on_result`.
    fn initialize(
        &self,
        surface: &Arc<dyn CaptureSurface>,
        params: &SdkInitParams,
        on_result: InitResultCallback,
    ) -> Result<(), SdkError>;

    /// Fire-and-forget join; completion is observed through the meeting listener.
    fn join(
        &self,
        surface: Option<&Arc<dyn CaptureSurface>>,
        request: &JoinRequest,
        suppression: &UiSuppressionSet,
    ) -> Result<(), SdkError>;

    /// Window the SDK renders the meeting into, while one exists.
    fn meeting_surface(&self) -> Option<Arc<dyn CaptureSurface>>;

    /// Root of the meeting window's view hierarchy, while one exists.
    fn meeting_root(&self) -> Option<Arc<dyn UiNode>>;

    /// Toggle the SDK's built-in meeting-info panel. Older revisions lack it.
    fn set_meeting_info_visible(&self, _visible: bool) -> Result<(), SdkError> {
        Err(SdkError::Unsupported("meeting info toggle"))
    }
}
