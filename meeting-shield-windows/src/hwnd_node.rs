//! Child-window tree adapter for the view sanitizer.
//!
//! Classic Win32 conferencing UIs build their meeting window out of child
//! controls, so the window hierarchy is the view tree. Concealment hides the
//! control with `ShowWindow(SW_HIDE)`; the SDK never re-shows a control it
//! did not hide itself, so the effect sticks between scan passes.

use std::ffi::c_void;
use std::sync::Arc;

use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::*;

use meeting_shield_core::models::error::PlatformEffectError;
use meeting_shield_core::traits::ui_node::{RootProvider, UiNode};

use crate::error::Win32Error;

/// Upper bound on siblings enumerated under one parent.
///
/// `GW_HWNDNEXT` walks a live z-order list that can change under us; the cap
/// keeps a reordering loop from spinning forever.
const MAX_SIBLINGS: usize = 1024;

/// One window in the tree under a meeting window.
pub struct HwndNode {
    hwnd: isize,
    /// The node the scan started from; its parent is outside the tree.
    root: isize,
}

impl HwndNode {
    /// Root a tree at `hwnd`. Returns `None` for a null or destroyed handle.
    pub fn root(hwnd: HWND) -> Option<Arc<Self>> {
        let raw = hwnd.0 as isize;
        if raw == 0 || !unsafe { IsWindow(Some(hwnd)) }.as_bool() {
            return None;
        }
        Some(Arc::new(Self { hwnd: raw, root: raw }))
    }

    /// A root provider that re-resolves `find` every tick.
    pub fn provider<F>(find: F) -> RootProvider
    where
        F: Fn() -> Option<HWND> + Send + Sync + 'static,
    {
        Arc::new(move || {
            let node: Arc<dyn UiNode> = Self::root(find()?)?;
            Some(node)
        })
    }

    fn hwnd(&self) -> HWND {
        HWND(self.hwnd as *mut c_void)
    }

    fn child(&self, hwnd: HWND) -> Arc<dyn UiNode> {
        Arc::new(Self {
            hwnd: hwnd.0 as isize,
            root: self.root,
        })
    }

    fn window_text(&self) -> Result<String, Win32Error> {
        let hwnd = self.hwnd();
        if !unsafe { IsWindow(Some(hwnd)) }.as_bool() {
            return Err(Win32Error::InvalidWindow);
        }
        let len = unsafe { GetWindowTextLengthW(hwnd) };
        if len <= 0 {
            return Ok(String::new());
        }
        let mut buf = vec![0u16; len as usize + 1];
        let copied = unsafe { GetWindowTextW(hwnd, &mut buf) };
        buf.truncate(copied.max(0) as usize);
        Ok(String::from_utf16_lossy(&buf))
    }
}

impl UiNode for HwndNode {
    fn visible_text(&self) -> Option<String> {
        // The root's text is its title bar, which is window chrome.
        if self.hwnd == self.root {
            return None;
        }
        match self.window_text() {
            Ok(text) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                log::trace!("hwnd:{:#x}: no text ({})", self.hwnd, e);
                None
            }
        }
    }

    fn children(&self) -> Vec<Option<Arc<dyn UiNode>>> {
        let mut children = Vec::new();
        let mut next = unsafe { GetWindow(self.hwnd(), GW_CHILD) };
        while let Ok(hwnd) = next {
            if hwnd.0.is_null() || children.len() >= MAX_SIBLINGS {
                break;
            }
            children.push(Some(self.child(hwnd)));
            next = unsafe { GetWindow(hwnd, GW_HWNDNEXT) };
        }
        children
    }

    fn containing_group(&self) -> Option<Arc<dyn UiNode>> {
        if self.hwnd == self.root {
            return None;
        }
        let parent = unsafe { GetParent(self.hwnd()) }.ok()?;
        // Hiding the root would blank the whole meeting window.
        if parent.0.is_null() || parent.0 as isize == self.root {
            return None;
        }
        Some(self.child(parent))
    }

    fn is_concealed(&self) -> bool {
        !unsafe { IsWindowVisible(self.hwnd()) }.as_bool()
    }

    fn conceal(&self) -> Result<(), PlatformEffectError> {
        let hwnd = self.hwnd();
        if !unsafe { IsWindow(Some(hwnd)) }.as_bool() {
            return Err(Win32Error::InvalidWindow.into());
        }
        // Return value is the previous visibility, not success.
        let _ = unsafe { ShowWindow(hwnd, SW_HIDE) };
        Ok(())
    }

    fn node_key(&self) -> Option<u64> {
        Some(self.hwnd as u64)
    }
}
