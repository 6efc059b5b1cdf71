use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::error::{SessionError, ValidationError};
use crate::session::lifecycle::SessionLifecycle;

/// A request from the host's cross-process command channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: &str, arguments: Value) -> Self {
        Self {
            method: method.to_string(),
            arguments,
        }
    }
}

/// Error reply sent back over the command channel.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{code}: {message}")]
pub struct CommandError {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl CommandError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct InitZoomArgs {
    jwt: Option<String>,
    enable_protection: Option<bool>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct JoinMeetingArgs {
    meeting_id: Option<String>,
    meeting_password: Option<String>,
    display_name: Option<String>,
}

/// Maps channel commands (`initZoom`, `joinMeeting`, `getPlatformVersion`) onto a
/// `SessionLifecycle` and its errors onto the channel's error codes.
pub struct CommandSurface {
    session: Arc<SessionLifecycle>,
}

impl CommandSurface {
    pub fn new(session: Arc<SessionLifecycle>) -> Self {
        Self { session }
    }

    pub fn handle(&self, call: &MethodCall) -> Result<Value, CommandError> {
        log::debug!("command {}", call.method);
        match call.method.as_str() {
            "initZoom" => self.init_zoom(&call.arguments),
            "joinMeeting" => self.join_meeting(&call.arguments),
            "getPlatformVersion" => Ok(Value::String(self.session.host().platform_version())),
            other => Err(CommandError::new(
                "NOT_IMPLEMENTED",
                format!("unknown method {other}"),
            )),
        }
    }

    fn init_zoom(&self, arguments: &Value) -> Result<Value, CommandError> {
        let args: InitZoomArgs = parse_arguments(arguments)
            .map_err(|e| CommandError::new("INVALID_ARGUMENT", e))?;

        let jwt = args.jwt.unwrap_or_default();
        let policy = self
            .session
            .config()
            .default_policy
            .clone()
            .with_capture_block(args.enable_protection.unwrap_or(true));

        match self.session.init(policy, &jwt) {
            Ok(_) => Ok(Value::Bool(true)),
            Err(SessionError::Validation(ValidationError::MissingToken)) => Err(CommandError::new(
                "INVALID_ARGUMENT",
                "JWT token is missing",
            )),
            Err(SessionError::Validation(e)) => Err(CommandError::new("INVALID_ARGUMENT", e.to_string())),
            Err(SessionError::NoSurface) => Err(CommandError::new(
                "NO_ACTIVITY",
                "no foreground surface is bound",
            )),
            Err(SessionError::Init(e)) => Err(CommandError {
                code: "INIT_ERROR",
                message: e.detail.clone(),
                details: Some(json!({
                    "code": e.numeric_code(),
                    "internalCode": e.internal_code,
                })),
            }),
            Err(e) => Err(CommandError::new("INIT_ERROR", e.to_string())),
        }
    }

    fn join_meeting(&self, arguments: &Value) -> Result<Value, CommandError> {
        let args: JoinMeetingArgs = parse_arguments(arguments)
            .map_err(|e| CommandError::new("INVALID_ARGUMENTS", e))?;

        let result = self.session.join(
            args.meeting_id.as_deref().unwrap_or_default(),
            args.meeting_password.as_deref().unwrap_or_default(),
            args.display_name.as_deref().unwrap_or_default(),
        );

        match result {
            Ok(()) => Ok(Value::Bool(true)),
            Err(SessionError::Validation(_)) => Err(CommandError::new(
                "INVALID_ARGUMENTS",
                "Missing meeting details",
            )),
            Err(SessionError::NotReady { .. }) => Err(CommandError::new(
                "SDK_NOT_INITIALIZED",
                "conferencing sdk not initialized",
            )),
            Err(e) => Err(CommandError::new("JOIN_ERROR", e.to_string())),
        }
    }
}

fn parse_arguments<T: for<'de> Deserialize<'de> + Default>(arguments: &Value) -> Result<T, String> {
    if arguments.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(arguments.clone()).map_err(|e| format!("malformed arguments: {e}"))
}
