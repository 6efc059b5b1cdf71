//! Capture blocking for a top-level window via `SetWindowDisplayAffinity`.
//!
//! `WDA_EXCLUDEFROMCAPTURE` removes the window from screenshots, recordings
//! and screen-share streams while leaving it visible on the local display.
//! Builds before 19041 only know `WDA_MONITOR`, which paints the window black
//! in captures instead of omitting it.

use std::ffi::c_void;

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::*;

use meeting_shield_core::models::error::PlatformEffectError;
use meeting_shield_core::traits::capture_surface::CaptureSurface;

use crate::error::Win32Error;

/// A window whose display affinity the engine controls.
///
/// The handle is stored as a raw integer so the surface can cross threads.
/// Window handles are process-global and valid from any thread; affinity
/// calls only succeed from the owning process.
pub struct HwndSurface {
    hwnd: isize,
    exclude_supported: bool,
}

impl HwndSurface {
    /// Wrap `hwnd`. Returns `None` for a null or destroyed handle.
    pub fn new(hwnd: HWND, exclude_supported: bool) -> Option<Self> {
        let surface = Self {
            hwnd: hwnd.0 as isize,
            exclude_supported,
        };
        surface.is_alive().then_some(surface)
    }

    pub fn hwnd(&self) -> HWND {
        HWND(self.hwnd as *mut c_void)
    }

    pub fn is_alive(&self) -> bool {
        self.hwnd != 0 && unsafe { IsWindow(Some(self.hwnd())) }.as_bool()
    }

    fn blocking_affinity(&self) -> WINDOW_DISPLAY_AFFINITY {
        if self.exclude_supported {
            WDA_EXCLUDEFROMCAPTURE
        } else {
            WDA_MONITOR
        }
    }

    fn write_affinity(&self, affinity: WINDOW_DISPLAY_AFFINITY) -> Result<(), Win32Error> {
        if !self.is_alive() {
            return Err(Win32Error::InvalidWindow);
        }
        unsafe { SetWindowDisplayAffinity(self.hwnd(), affinity) }
            .map_err(|e| Win32Error::call("SetWindowDisplayAffinity", e))
    }
}

impl CaptureSurface for HwndSurface {
    fn label(&self) -> String {
        format!("hwnd:{:#x}", self.hwnd)
    }

    fn capture_blocked(&self) -> Option<bool> {
        if !self.is_alive() {
            return None;
        }
        let mut affinity = 0u32;
        unsafe { GetWindowDisplayAffinity(self.hwnd(), &mut affinity) }.ok()?;
        Some(affinity != WDA_NONE.0)
    }

    fn set_capture_blocked(&self, blocked: bool) -> Result<(), PlatformEffectError> {
        let affinity = if blocked {
            self.blocking_affinity()
        } else {
            WDA_NONE
        };
        self.write_affinity(affinity)?;
        log::debug!("{}: display affinity set to {:#x}", self.label(), affinity.0);
        Ok(())
    }
}
