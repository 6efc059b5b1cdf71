use std::collections::{BTreeSet, HashSet};

use super::policy::{Affordance, ProtectionPolicy};

/// "Hide this built-in affordance" toggles handed to the SDK at join time.
///
/// Default-deny: an affordance is visible only when the policy allows it or the
/// engine baseline keeps it visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiSuppressionSet {
    hidden: BTreeSet<Affordance>,
}

impl UiSuppressionSet {
    pub fn compose(policy: &ProtectionPolicy, baseline_visible: &HashSet<Affordance>) -> Self {
        let hidden = Affordance::ALL
            .iter()
            .copied()
            .filter(|a| !policy.allowed_affordances.contains(a) && !baseline_visible.contains(a))
            .collect();
        Self { hidden }
    }

    pub fn hides(&self, affordance: Affordance) -> bool {
        self.hidden.contains(&affordance)
    }

    pub fn hidden(&self) -> impl Iterator<Item = Affordance> + '_ {
        self.hidden.iter().copied()
    }

    pub fn no_invite(&self) -> bool {
        self.hides(Affordance::Invite)
    }

    pub fn no_meeting_id(&self) -> bool {
        self.hides(Affordance::MeetingId)
    }

    pub fn no_meeting_password(&self) -> bool {
        self.hides(Affordance::MeetingPassword)
    }

    pub fn no_meeting_url(&self) -> bool {
        self.hides(Affordance::MeetingUrl)
    }

    pub fn no_share(&self) -> bool {
        self.hides(Affordance::Share)
    }

    pub fn no_record(&self) -> bool {
        self.hides(Affordance::Recording)
    }

    pub fn no_participants(&self) -> bool {
        self.hides(Affordance::ParticipantList)
    }

    pub fn no_dial_in(&self) -> bool {
        self.hides(Affordance::DialIn)
    }

    pub fn no_chat(&self) -> bool {
        self.hides(Affordance::Chat)
    }
}
