use crate::models::error::PlatformEffectError;

/// A host or SDK window whose contents can be excluded from screen capture.
///
/// Implemented by:
/// - `HwndSurface` (Windows, via window display affinity)
/// - test fakes
pub trait CaptureSurface: Send + Sync {
    /// Human-readable label for logs.
    fn label(&self) -> String;

    /// Current capture-block state, or `None` when the platform cannot report it.
    fn capture_blocked(&self) -> Option<bool>;

    /// Request (or release) OS-level capture blocking for this surface.
    fn set_capture_blocked(&self, blocked: bool) -> Result<(), PlatformEffectError>;
}
