use std::sync::Arc;

use crate::traits::capture_surface::CaptureSurface;

/// The host application's window layer.
///
/// Lifecycle callbacks (attach, detach, reattach, configuration change) are
/// forwarded by the host to `SessionLifecycle::on_foreground` and friends.
pub trait HostWindow: Send + Sync {
    fn foreground_surface(&self) -> Option<Arc<dyn CaptureSurface>>;

    fn platform_version(&self) -> String;
}
