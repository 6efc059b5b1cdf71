use std::fmt;

use sha2::{Digest, Sha256};

use super::error::ValidationError;

/// Meeting join request. Construct with [`JoinRequest::new`], which validates eagerly.
#[derive(Clone, PartialEq, Eq)]
pub struct JoinRequest {
    meeting_id: String,
    passcode: String,
    display_name: String,
}

impl JoinRequest {
    pub fn new(
        meeting_id: impl Into<String>,
        passcode: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let request = Self {
            meeting_id: meeting_id.into(),
            passcode: passcode.into(),
            display_name: display_name.into(),
        };
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("meeting id", &self.meeting_id),
            ("passcode", &self.passcode),
            ("display name", &self.display_name),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyField(name));
            }
        }
        Ok(())
    }

    pub fn meeting_id(&self) -> &str {
        &self.meeting_id
    }

    pub fn passcode(&self) -> &str {
        &self.passcode
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Short sha256 prefix of the meeting id, safe to log.
    pub fn meeting_fingerprint(&self) -> String {
        let digest = Sha256::digest(self.meeting_id.as_bytes());
        digest[..6].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for JoinRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinRequest")
            .field("meeting", &self.meeting_fingerprint())
            .field("passcode", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}
