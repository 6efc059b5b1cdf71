use thiserror::Error;

use super::state::SessionPhase;

/// A join or init request carried a missing or empty field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing token")]
    MissingToken,

    #[error("missing meeting details: {0} is empty")]
    EmptyField(&'static str),

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
}

/// Why SDK initialization did not complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitErrorCode {
    /// The SDK reported a non-zero result code.
    Sdk(i32),
    /// The SDK never called back within the configured timeout.
    Timeout,
    /// `initialize` refused the request synchronously.
    Rejected,
}

/// SDK initialization failure. Recoverable by retrying `init`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("initialization failed ({code:?}, internal {internal_code}): {detail}")]
pub struct InitError {
    pub code: InitErrorCode,
    pub internal_code: i32,
    pub detail: String,
}

impl InitError {
    pub fn timeout(after_ms: u128) -> Self {
        Self {
            code: InitErrorCode::Timeout,
            internal_code: 0,
            detail: format!("no initialization result after {after_ms} ms"),
        }
    }

    pub fn from_sdk(code: i32, internal_code: i32) -> Self {
        Self {
            code: InitErrorCode::Sdk(code),
            internal_code,
            detail: format!("sdk returned error code {code}"),
        }
    }

    /// Numeric code reported across the command surface.
    pub fn numeric_code(&self) -> i32 {
        match self.code {
            InitErrorCode::Sdk(code) => code,
            InitErrorCode::Timeout => -1,
            InitErrorCode::Rejected => -2,
        }
    }
}

/// Errors raised by the conferencing SDK boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// The installed SDK revision does not expose this capability.
    #[error("unsupported by this sdk revision: {0}")]
    Unsupported(&'static str),

    #[error("sdk rejected request (code {code}): {detail}")]
    Rejected { code: i32, detail: String },
}

/// An OS or UI effect could not be applied. Logged, never surfaced to callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformEffectError {
    #[error("surface is gone")]
    SurfaceGone,

    #[error("capture block not supported on this platform")]
    Unsupported,

    #[error("platform call failed: {0}")]
    Os(String),
}

/// Errors returned synchronously by `SessionLifecycle` operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("{operation} not allowed while {phase:?}")]
    NotReady {
        phase: SessionPhase,
        operation: &'static str,
    },

    #[error("no foreground surface bound")]
    NoSurface,

    #[error(transparent)]
    Init(#[from] InitError),

    #[error(transparent)]
    Sdk(#[from] SdkError),

    #[error("a session engine is already bound to this sdk instance")]
    EngineAlreadyBound,
}
