use crate::models::state::{InitOutcome, SessionPhase};
use crate::models::summary::SessionSummary;

/// Event delegate for session notifications.
///
/// All methods are called on the main context with no engine lock held.
pub trait SessionDelegate: Send + Sync {
    fn on_phase_changed(&self, phase: SessionPhase);

    /// Called once per init attempt that reached the SDK.
    fn on_init_finished(&self, outcome: &InitOutcome);

    fn on_session_ended(&self, summary: &SessionSummary);
}
