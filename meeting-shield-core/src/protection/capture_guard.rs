use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::traits::capture_surface::CaptureSurface;

/// Applies or removes the OS-level capture-block flag on a surface.
///
/// Best-effort: platform failures are logged and swallowed, never returned.
/// Holds no surface or policy between calls; both are passed in each time.
#[derive(Debug, Default)]
pub struct CaptureGuard {
    writes: AtomicU64,
    failures: AtomicU64,
}

impl CaptureGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring `surface` to `enabled`. A `None` surface is a no-op, as is a surface
    /// that already reports the requested state.
    pub fn apply(&self, surface: Option<&dyn CaptureSurface>, enabled: bool) {
        let Some(surface) = surface else {
            log::trace!("capture guard: no surface bound");
            return;
        };

        if surface.capture_blocked() == Some(enabled) {
            return;
        }

        match surface.set_capture_blocked(enabled) {
            Ok(()) => {
                self.writes.fetch_add(1, Ordering::Relaxed);
                log::debug!(
                    "capture block {} on {}",
                    if enabled { "applied" } else { "cleared" },
                    surface.label()
                );
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                log::warn!("failed to set capture block on {}: {}", surface.label(), e);
            }
        }
    }

    /// Apply to every present surface in `surfaces`.
    pub fn apply_all(&self, surfaces: &[Option<Arc<dyn CaptureSurface>>], enabled: bool) {
        for surface in surfaces {
            self.apply(surface.as_deref(), enabled);
        }
    }

    /// Successful flag writes so far.
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
