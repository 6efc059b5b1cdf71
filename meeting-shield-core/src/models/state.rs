use super::error::InitError;
use super::policy::ProtectionPolicy;

/// Session phase state machine.
///
/// State transitions:
/// ```text
/// uninitialized → initializing → ready → joining → in_meeting → ended
///       ↑               │                                          │
///       └───── failure ─┘                 (any) ── teardown ──→ ended
///       └──────────────────────── reset ───────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Uninitialized,
    Initializing,
    Ready,
    Joining,
    InMeeting,
    Ended,
}

impl SessionPhase {
    /// The SDK is initialized and a meeting may be (or is being) joined.
    pub fn is_ready_or_later(&self) -> bool {
        matches!(self, Self::Ready | Self::Joining | Self::InMeeting)
    }

    pub fn is_in_meeting(&self) -> bool {
        matches!(self, Self::InMeeting)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Joining => "joining",
            Self::InMeeting => "in_meeting",
            Self::Ended => "ended",
        }
    }
}

/// Current protection flags and session phase. Owned by `SessionLifecycle`.
#[derive(Debug, Clone)]
pub struct PolicyState {
    pub phase: SessionPhase,
    pub policy: Option<ProtectionPolicy>,
}

impl PolicyState {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            policy: None,
        }
    }
}

impl PolicyState {
    /// The capture-block flag window events should apply right now.
    ///
    /// Before any policy is stored, `fallback` applies. Once the session has
    /// ended, the block only persists if the policy asks to keep it.
    pub fn capture_block_enabled(&self, fallback: bool) -> bool {
        match &self.policy {
            None => fallback,
            Some(policy) if self.phase.is_terminal() => {
                policy.capture_block_enabled && policy.keep_capture_block_after_session
            }
            Some(policy) => policy.capture_block_enabled,
        }
    }
}

impl Default for PolicyState {
    fn default() -> Self {
        Self::new()
    }
}

/// Meeting status reported by the SDK's meeting listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingStatus {
    Idle,
    Connecting,
    WaitingForHost,
    InMeeting,
    Disconnecting,
    Ended,
    Failed { code: i32 },
}

impl MeetingStatus {
    pub fn is_terminated(&self) -> bool {
        matches!(self, Self::Ended | Self::Failed { .. })
    }
}

/// Immediate result of `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitProgress {
    /// The SDK was already initialized; the session is `Ready`.
    AlreadyReady,
    /// Initialization was dispatched; the outcome arrives via the delegate.
    Initializing,
}

/// Final, single-resolution outcome of SDK initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    AlreadyReady,
    Ready,
    Failed(InitError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(phase: SessionPhase, policy: Option<ProtectionPolicy>) -> PolicyState {
        PolicyState { phase, policy }
    }

    #[test]
    fn capture_block_falls_back_without_policy() {
        assert!(state(SessionPhase::Uninitialized, None).capture_block_enabled(true));
        assert!(!state(SessionPhase::Ended, None).capture_block_enabled(false));
    }

    #[test]
    fn capture_block_follows_policy_during_session() {
        let policy = ProtectionPolicy {
            keep_capture_block_after_session: false,
            ..Default::default()
        };
        assert!(state(SessionPhase::InMeeting, Some(policy.clone())).capture_block_enabled(true));
        assert!(!state(SessionPhase::Ready, Some(policy.with_capture_block(false)))
            .capture_block_enabled(true));
    }

    #[test]
    fn ended_session_keeps_block_only_when_asked() {
        let release = ProtectionPolicy {
            keep_capture_block_after_session: false,
            ..Default::default()
        };
        assert!(!state(SessionPhase::Ended, Some(release)).capture_block_enabled(true));
        assert!(state(SessionPhase::Ended, Some(ProtectionPolicy::default())).capture_block_enabled(true));
    }

    #[test]
    fn phase_predicates() {
        assert!(SessionPhase::Joining.is_ready_or_later());
        assert!(!SessionPhase::Initializing.is_ready_or_later());
        assert!(SessionPhase::InMeeting.is_in_meeting());
        assert!(SessionPhase::Ended.is_terminal());
        assert!(MeetingStatus::Failed { code: 3 }.is_terminated());
        assert!(!MeetingStatus::Connecting.is_terminated());
    }
}
