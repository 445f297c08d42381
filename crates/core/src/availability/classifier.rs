//! Availability classifier
//!
//! Maps the current availability slot plus the user's current presence to a
//! [`PresenceDecision`] and a human-readable explanation.

use presencesync_domain::{AvailabilityCode, PresenceDecision, PresenceState};

/// Classifier output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub decision: PresenceDecision,
    pub message: String,
}

impl Classification {
    fn keep(message: String) -> Self {
        Self { decision: PresenceDecision::Keep, message }
    }

    fn change(decision: PresenceDecision, message: String) -> Self {
        Self { decision, message }
    }
}

/// Decide what to do with `current` given the availability `code`.
///
/// Only a `dnd` user is moved back to `online` when free; users who chose
/// `away` or `offline` themselves are left alone.
pub fn classify(code: AvailabilityCode, current: PresenceState) -> Classification {
    match code {
        AvailabilityCode::Free => {
            if current == PresenceState::DoNotDisturb {
                Classification::change(
                    PresenceDecision::SetFree,
                    format!(
                        "User is free. Setting user from {current} to {}.",
                        PresenceState::Online
                    ),
                )
            } else {
                Classification::keep(format!("User is free, and is already set to {current}."))
            }
        }
        AvailabilityCode::Tentative | AvailabilityCode::Busy => {
            if current == PresenceState::DoNotDisturb {
                Classification::keep(format!("User is busy, and is already set to {current}."))
            } else {
                Classification::change(
                    PresenceDecision::SetBusy,
                    format!(
                        "User is busy. Setting user from {current} to {}.",
                        PresenceState::DoNotDisturb
                    ),
                )
            }
        }
        AvailabilityCode::OutOfOffice => {
            if current == PresenceState::Offline {
                Classification::keep(format!(
                    "User is out of office, and is already set to {current}."
                ))
            } else {
                Classification::change(
                    PresenceDecision::SetAway,
                    format!(
                        "User is out of office. Setting user from {current} to {}.",
                        PresenceState::Offline
                    ),
                )
            }
        }
        AvailabilityCode::WorkingElsewhere => {
            Classification::keep("User is working elsewhere. Pending implementation.".to_owned())
        }
        AvailabilityCode::Unknown(other) => {
            Classification::keep(format!("Availability view doesn't match {other}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [PresenceState; 4] = [
        PresenceState::Online,
        PresenceState::Away,
        PresenceState::DoNotDisturb,
        PresenceState::Offline,
    ];

    #[test]
    fn free_only_releases_dnd() {
        let result = classify(AvailabilityCode::Free, PresenceState::DoNotDisturb);
        assert_eq!(result.decision, PresenceDecision::SetFree);
        assert_eq!(result.message, "User is free. Setting user from dnd to online.");

        for state in [PresenceState::Online, PresenceState::Away, PresenceState::Offline] {
            let result = classify(AvailabilityCode::Free, state);
            assert_eq!(result.decision, PresenceDecision::Keep);
            assert_eq!(result.message, format!("User is free, and is already set to {state}."));
        }
    }

    #[test]
    fn tentative_counts_as_busy() {
        for code in [AvailabilityCode::Tentative, AvailabilityCode::Busy] {
            let result = classify(code, PresenceState::Away);
            assert_eq!(result.decision, PresenceDecision::SetBusy);
            assert_eq!(result.message, "User is busy. Setting user from away to dnd.");

            let result = classify(code, PresenceState::DoNotDisturb);
            assert_eq!(result.decision, PresenceDecision::Keep);
            assert_eq!(result.message, "User is busy, and is already set to dnd.");
        }
    }

    #[test]
    fn out_of_office_goes_offline() {
        let result = classify(AvailabilityCode::OutOfOffice, PresenceState::Online);
        assert_eq!(result.decision, PresenceDecision::SetAway);
        assert_eq!(result.message, "User is out of office. Setting user from online to offline.");

        let result = classify(AvailabilityCode::OutOfOffice, PresenceState::Offline);
        assert_eq!(result.decision, PresenceDecision::Keep);
        assert_eq!(result.message, "User is out of office, and is already set to offline.");
    }

    #[test]
    fn working_elsewhere_and_unknown_codes_never_change_presence() {
        for state in ALL_STATES {
            let result = classify(AvailabilityCode::WorkingElsewhere, state);
            assert_eq!(result.decision, PresenceDecision::Keep);
            assert_eq!(result.message, "User is working elsewhere. Pending implementation.");

            let result = classify(AvailabilityCode::Unknown('9'), state);
            assert_eq!(result.decision, PresenceDecision::Keep);
            assert_eq!(result.message, "Availability view doesn't match 9");
            assert!(!AvailabilityCode::Unknown('9').is_recognized());
        }
    }

    #[test]
    fn applying_a_decision_is_idempotent() {
        let codes = [
            AvailabilityCode::Free,
            AvailabilityCode::Tentative,
            AvailabilityCode::Busy,
            AvailabilityCode::OutOfOffice,
            AvailabilityCode::WorkingElsewhere,
        ];
        for code in codes {
            for state in ALL_STATES {
                let first = classify(code, state);
                let applied = first.decision.target_state().unwrap_or(state);
                let second = classify(code, applied);
                assert_eq!(
                    second.decision,
                    PresenceDecision::Keep,
                    "{code} from {state} is not stable"
                );
            }
        }
    }
}
