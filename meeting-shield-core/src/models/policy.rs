use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Domain string the conferencing provider renders in invite links.
pub const PROVIDER_DOMAIN: &str = "zoom.us";

const DEFAULT_PHRASES: [&str; 4] = ["meeting id", "invite link", "passcode", "password"];

/// Normalized set of phrases whose presence marks a UI node as sensitive.
///
/// Phrases are trimmed and lowercased on insertion; empty phrases are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RedactionVocabulary {
    phrases: BTreeSet<String>,
}

impl RedactionVocabulary {
    pub fn empty() -> Self {
        Self {
            phrases: BTreeSet::new(),
        }
    }

    pub fn with_phrase(mut self, phrase: &str) -> Self {
        self.insert(phrase);
        self
    }

    pub fn insert(&mut self, phrase: &str) {
        let normalized = phrase.trim().to_lowercase();
        if !normalized.is_empty() {
            self.phrases.insert(normalized);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(String::as_str)
    }

    /// Substring match against already-lowercased text.
    pub fn matches(&self, lowercase_text: &str) -> bool {
        self.phrases.iter().any(|p| lowercase_text.contains(p.as_str()))
    }
}

impl Default for RedactionVocabulary {
    fn default() -> Self {
        DEFAULT_PHRASES
            .iter()
            .copied()
            .chain(std::iter::once(PROVIDER_DOMAIN))
            .fold(Self::empty(), |vocab, phrase| vocab.with_phrase(phrase))
    }
}

impl From<Vec<String>> for RedactionVocabulary {
    fn from(phrases: Vec<String>) -> Self {
        let mut vocab = Self::empty();
        for phrase in &phrases {
            vocab.insert(phrase);
        }
        vocab
    }
}

impl From<RedactionVocabulary> for Vec<String> {
    fn from(vocab: RedactionVocabulary) -> Self {
        vocab.phrases.into_iter().collect()
    }
}

/// Optional built-in meeting affordances the SDK can hide at join time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    Invite,
    MeetingId,
    MeetingPassword,
    MeetingUrl,
    Share,
    Recording,
    ParticipantList,
    DialIn,
    Chat,
}

impl Affordance {
    pub const ALL: [Affordance; 9] = [
        Affordance::Invite,
        Affordance::MeetingId,
        Affordance::MeetingPassword,
        Affordance::MeetingUrl,
        Affordance::Share,
        Affordance::Recording,
        Affordance::ParticipantList,
        Affordance::DialIn,
        Affordance::Chat,
    ];
}

/// Protection settings for one session. Immutable once handed to `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectionPolicy {
    /// Request OS-level capture blocking on bound surfaces (default: true).
    pub capture_block_enabled: bool,

    /// Period between sanitization passes in milliseconds (default: 1000).
    pub sanitization_interval_ms: u64,

    pub redaction_vocabulary: RedactionVocabulary,

    /// Keep the host surface capture-blocked after the meeting ends (default: true).
    pub keep_capture_block_after_session: bool,

    /// Affordances the host explicitly allows. Everything else is hidden.
    pub allowed_affordances: HashSet<Affordance>,
}

impl ProtectionPolicy {
    pub fn with_capture_block(mut self, enabled: bool) -> Self {
        self.capture_block_enabled = enabled;
        self
    }

    pub fn allowing(mut self, affordance: Affordance) -> Self {
        self.allowed_affordances.insert(affordance);
        self
    }

    pub fn sanitization_interval(&self) -> Duration {
        Duration::from_millis(self.sanitization_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sanitization_interval_ms == 0 {
            return Err(ValidationError::InvalidPolicy(
                "sanitization interval must be positive".into(),
            ));
        }
        if self.redaction_vocabulary.is_empty() {
            return Err(ValidationError::InvalidPolicy(
                "redaction vocabulary is empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ProtectionPolicy {
    fn default() -> Self {
        Self {
            capture_block_enabled: true,
            sanitization_interval_ms: 1000,
            redaction_vocabulary: RedactionVocabulary::default(),
            keep_capture_block_after_session: true,
            allowed_affordances: HashSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vocabulary_includes_provider_domain() {
        let vocab = RedactionVocabulary::default();
        assert_eq!(vocab.len(), 5);
        assert!(vocab.phrases().any(|p| p == PROVIDER_DOMAIN));
        assert!(vocab.matches("join at https://zoom.us/j/123"));
    }

    #[test]
    fn phrases_are_normalized() {
        let vocab = RedactionVocabulary::empty()
            .with_phrase("  Exam Code ")
            .with_phrase("exam code")
            .with_phrase("   ");
        assert_eq!(vocab.phrases().collect::<Vec<_>>(), vec!["exam code"]);
    }

    #[test]
    fn vocabulary_parses_from_json_list() {
        let vocab: RedactionVocabulary = serde_json::from_str(r#"["Room Key", "PIN"]"#).unwrap();
        assert!(vocab.matches("your pin is 1234"));
        assert!(vocab.matches("room key: abc"));
        assert!(!vocab.matches("participants"));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let policy = ProtectionPolicy {
            sanitization_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(policy.validate(), Err(ValidationError::InvalidPolicy(_))));
    }

    #[test]
    fn validate_rejects_empty_vocabulary() {
        let policy = ProtectionPolicy {
            redaction_vocabulary: RedactionVocabulary::empty(),
            ..Default::default()
        };
        assert!(policy.validate().is_err());
        assert!(ProtectionPolicy::default().validate().is_ok());
    }

    #[test]
    fn partial_json_policy_fills_defaults() {
        let policy: ProtectionPolicy =
            serde_json::from_str(r#"{"capture_block_enabled": false}"#).unwrap();
        assert!(!policy.capture_block_enabled);
        assert_eq!(policy.sanitization_interval(), Duration::from_secs(1));
        assert!(policy.keep_capture_block_after_session);
    }
}
