//! # meeting-shield-windows
//!
//! Windows backend for meeting-shield.
//!
//! Provides:
//! - `HwndSurface`: capture blocking via window display affinity
//! - `HwndNode`: child-window tree adapter for the view sanitizer
//! - `DesktopHost`: foreground window and OS version lookup
//!
//! ## Platform Requirements
//! - Windows 10 2004+ (build 19041) for `WDA_EXCLUDEFROMCAPTURE`.
//!   Older builds fall back to `WDA_MONITOR`, which shows a black rectangle.
//! - Visual Studio Build Tools 2022 + Windows SDK for linking
//!
//! ## Usage
//! ```ignore
//! use meeting_shield_core::{LoopContext, SessionLifecycle, EngineConfig};
//! use meeting_shield_windows::DesktopHost;
//!
//! let host = DesktopHost::new();
//! let ctx = LoopContext::start()?;
//! let engine = SessionLifecycle::new(sdk, host, ctx, EngineConfig::default())?;
//! ```

pub mod error;

#[cfg(target_os = "windows")]
pub mod desktop_host;
#[cfg(target_os = "windows")]
pub mod hwnd_node;
#[cfg(target_os = "windows")]
pub mod hwnd_surface;

pub use error::Win32Error;

#[cfg(target_os = "windows")]
pub use desktop_host::DesktopHost;
#[cfg(target_os = "windows")]
pub use hwnd_node::HwndNode;
#[cfg(target_os = "windows")]
pub use hwnd_surface::HwndSurface;
