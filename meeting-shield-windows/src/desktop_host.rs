//! Host window layer for desktop applications.

use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::Arc;

use parking_lot::Mutex;
use windows::Win32::Foundation::HWND;
use windows::Win32::System::SystemInformation::{GetVersionExW, OSVERSIONINFOW};
use windows::Win32::UI::WindowsAndMessaging::GetForegroundWindow;

use meeting_shield_core::traits::capture_surface::CaptureSurface;
use meeting_shield_core::traits::host_window::HostWindow;

use crate::hwnd_surface::HwndSurface;

/// First build that understands `WDA_EXCLUDEFROMCAPTURE` (Windows 10 2004).
const EXCLUDE_FROM_CAPTURE_BUILD: u32 = 19041;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OsVersion {
    major: u32,
    minor: u32,
    build: u32,
}

impl OsVersion {
    fn query() -> Option<Self> {
        let mut info = OSVERSIONINFOW {
            dwOSVersionInfoSize: std::mem::size_of::<OSVERSIONINFOW>() as u32,
            ..Default::default()
        };
        unsafe { GetVersionExW(&mut info) }.ok()?;
        Some(Self {
            major: info.dwMajorVersion,
            minor: info.dwMinorVersion,
            build: info.dwBuildNumber,
        })
    }

    fn supports_exclude_from_capture(&self) -> bool {
        self.major > 10 || (self.major == 10 && self.build >= EXCLUDE_FROM_CAPTURE_BUILD)
    }
}

/// The host application's windows.
///
/// By default the foreground window is whatever the desktop reports.
/// Hosts with a single main window should pin it so that a dialog from
/// another process never receives the capture block.
///
/// Surfaces are cached per window handle and live as long as their window, so
/// the engine's non-owning binding stays valid between lookups.
pub struct DesktopHost {
    pinned: Mutex<Option<isize>>,
    surfaces: Mutex<HashMap<isize, Arc<HwndSurface>>>,
    version: Option<OsVersion>,
}

impl DesktopHost {
    pub fn new() -> Arc<Self> {
        let version = OsVersion::query();
        if version.is_none() {
            log::warn!("could not query the Windows version; assuming WDA_MONITOR only");
        }
        Arc::new(Self {
            pinned: Mutex::new(None),
            surfaces: Mutex::new(HashMap::new()),
            version,
        })
    }

    /// Report `hwnd` as the foreground surface until `unpin` is called.
    pub fn pin(&self, hwnd: HWND) {
        *self.pinned.lock() = Some(hwnd.0 as isize);
    }

    pub fn unpin(&self) {
        *self.pinned.lock() = None;
    }

    pub fn supports_exclude_from_capture(&self) -> bool {
        self.version
            .is_some_and(|v| v.supports_exclude_from_capture())
    }

    /// The surface for an arbitrary window, such as the SDK's meeting window.
    ///
    /// Repeated lookups of the same live window return the same surface.
    pub fn surface_for(&self, hwnd: HWND) -> Option<Arc<dyn CaptureSurface>> {
        let raw = hwnd.0 as isize;
        let mut surfaces = self.surfaces.lock();
        surfaces.retain(|_, surface| surface.is_alive());
        if let Some(cached) = surfaces.get(&raw) {
            let surface: Arc<dyn CaptureSurface> = cached.clone();
            return Some(surface);
        }

        let created = Arc::new(HwndSurface::new(hwnd, self.supports_exclude_from_capture())?);
        log::debug!("tracking {}", created.label());
        surfaces.insert(raw, Arc::clone(&created));
        let surface: Arc<dyn CaptureSurface> = created;
        Some(surface)
    }

    /// Number of live windows with a cached surface.
    pub fn tracked_surfaces(&self) -> usize {
        let mut surfaces = self.surfaces.lock();
        surfaces.retain(|_, surface| surface.is_alive());
        surfaces.len()
    }
}

impl HostWindow for DesktopHost {
    fn foreground_surface(&self) -> Option<Arc<dyn CaptureSurface>> {
        let hwnd = match *self.pinned.lock() {
            Some(raw) => HWND(raw as *mut c_void),
            None => unsafe { GetForegroundWindow() },
        };
        self.surface_for(hwnd)
    }

    fn platform_version(&self) -> String {
        match self.version {
            Some(v) => format!("Windows {}.{}.{}", v.major, v.minor, v.build),
            None => "Windows".to_string(),
        }
    }
}
