use std::sync::{Arc, Weak};

use crate::traits::capture_surface::CaptureSurface;

/// Non-owning reference to the current foreground surface.
///
/// The host owns its windows; a binding only records which one to protect next.
#[derive(Default)]
pub struct WindowBinding {
    surface: Option<Weak<dyn CaptureSurface>>,
}

impl WindowBinding {
    pub fn bind(&mut self, surface: &Arc<dyn CaptureSurface>) {
        self.surface = Some(Arc::downgrade(surface));
    }

    pub fn clear(&mut self) {
        self.surface = None;
    }

    /// The bound surface, if it is still alive.
    pub fn current(&self) -> Option<Arc<dyn CaptureSurface>> {
        self.surface.as_ref().and_then(Weak::upgrade)
    }
}
