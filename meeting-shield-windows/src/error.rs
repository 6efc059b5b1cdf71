use thiserror::Error;

use meeting_shield_core::models::error::PlatformEffectError;

/// Failures from the Win32 window APIs.
#[derive(Debug, Error)]
pub enum Win32Error {
    #[error("window handle is no longer valid")]
    InvalidWindow,

    #[error("{call} failed: {message}")]
    Call { call: &'static str, message: String },
}

impl Win32Error {
    pub fn call(call: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Call {
            call,
            message: err.to_string(),
        }
    }
}

impl From<Win32Error> for PlatformEffectError {
    fn from(err: Win32Error) -> Self {
        match err {
            Win32Error::InvalidWindow => PlatformEffectError::SurfaceGone,
            other => PlatformEffectError::Os(other.to_string()),
        }
    }
}
