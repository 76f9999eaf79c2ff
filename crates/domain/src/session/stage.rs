//! Session stage state machine.

use serde::{Deserialize, Serialize};

/// The stage of a purchase-finalization session.
///
/// Stage transitions:
/// ```text
/// NeedName ──► NeedPhone ──► NeedLocation ──► NeedDeliveryChoice ──► NeedDeliveryConfirm
///     ◄──────────◄──────────────◄───────────────────◄   (explicit back() only)
/// ```
///
/// Stages are strictly forward-progressing; the only backward movement
/// is an explicit [`SessionStage::back`], one stage at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SessionStage {
    /// Collecting the customer's name.
    #[default]
    NeedName,

    /// Collecting the customer's phone number.
    NeedPhone,

    /// Collecting the delivery location.
    NeedLocation,

    /// Waiting for a delivery-method choice (pickup or courier).
    NeedDeliveryChoice,

    /// Waiting for the final confirmation of the chosen delivery.
    NeedDeliveryConfirm,
}

impl SessionStage {
    /// Returns the next stage, or `None` from the last stage.
    pub fn next(&self) -> Option<SessionStage> {
        match self {
            SessionStage::NeedName => Some(SessionStage::NeedPhone),
            SessionStage::NeedPhone => Some(SessionStage::NeedLocation),
            SessionStage::NeedLocation => Some(SessionStage::NeedDeliveryChoice),
            SessionStage::NeedDeliveryChoice => Some(SessionStage::NeedDeliveryConfirm),
            SessionStage::NeedDeliveryConfirm => None,
        }
    }

    /// Returns the previous stage, or `None` from the first stage.
    pub fn back(&self) -> Option<SessionStage> {
        match self {
            SessionStage::NeedName => None,
            SessionStage::NeedPhone => Some(SessionStage::NeedName),
            SessionStage::NeedLocation => Some(SessionStage::NeedPhone),
            SessionStage::NeedDeliveryChoice => Some(SessionStage::NeedLocation),
            SessionStage::NeedDeliveryConfirm => Some(SessionStage::NeedDeliveryChoice),
        }
    }

    /// Returns true if free-text input is expected in this stage.
    pub fn expects_text(&self) -> bool {
        matches!(
            self,
            SessionStage::NeedName | SessionStage::NeedPhone | SessionStage::NeedLocation
        )
    }

    /// Returns true if the session can be finalized from this stage.
    pub fn can_finalize(&self) -> bool {
        matches!(
            self,
            SessionStage::NeedDeliveryChoice | SessionStage::NeedDeliveryConfirm
        )
    }

    /// Returns the stage name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStage::NeedName => "need_name",
            SessionStage::NeedPhone => "need_phone",
            SessionStage::NeedLocation => "need_location",
            SessionStage::NeedDeliveryChoice => "need_delivery_choice",
            SessionStage::NeedDeliveryConfirm => "need_delivery_confirm",
        }
    }
}

impl std::fmt::Display for SessionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stage_is_need_name() {
        assert_eq!(SessionStage::default(), SessionStage::NeedName);
    }

    #[test]
    fn test_forward_chain() {
        let mut stage = SessionStage::NeedName;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            stage = next;
            visited.push(stage);
        }
        assert_eq!(
            visited,
            vec![
                SessionStage::NeedName,
                SessionStage::NeedPhone,
                SessionStage::NeedLocation,
                SessionStage::NeedDeliveryChoice,
                SessionStage::NeedDeliveryConfirm,
            ]
        );
    }

    #[test]
    fn test_back_is_inverse_of_next() {
        for stage in [
            SessionStage::NeedName,
            SessionStage::NeedPhone,
            SessionStage::NeedLocation,
            SessionStage::NeedDeliveryChoice,
        ] {
            assert_eq!(stage.next().unwrap().back(), Some(stage));
        }
    }

    #[test]
    fn test_back_from_first_stage_is_none() {
        assert_eq!(SessionStage::NeedName.back(), None);
    }

    #[test]
    fn test_expects_text() {
        assert!(SessionStage::NeedName.expects_text());
        assert!(SessionStage::NeedPhone.expects_text());
        assert!(SessionStage::NeedLocation.expects_text());
        assert!(!SessionStage::NeedDeliveryChoice.expects_text());
        assert!(!SessionStage::NeedDeliveryConfirm.expects_text());
    }

    #[test]
    fn test_can_finalize_only_last_two_stages() {
        assert!(!SessionStage::NeedName.can_finalize());
        assert!(!SessionStage::NeedPhone.can_finalize());
        assert!(!SessionStage::NeedLocation.can_finalize());
        assert!(SessionStage::NeedDeliveryChoice.can_finalize());
        assert!(SessionStage::NeedDeliveryConfirm.can_finalize());
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionStage::NeedName.to_string(), "need_name");
        assert_eq!(
            SessionStage::NeedDeliveryConfirm.to_string(),
            "need_delivery_confirm"
        );
    }
}
