use serde::Serialize;

/// Report emitted when a session ends. Never carries raw meeting identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub meeting_fingerprint: Option<String>,
    pub started_at: String,
    pub ended_at: String,
    pub scan_passes: u64,
    pub nodes_concealed: u64,
}
