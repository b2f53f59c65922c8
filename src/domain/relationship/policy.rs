//! How follow requests turn into edges

use serde::Deserialize;

use super::entity::EdgeState;

/// Relationship model, chosen once per deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipPolicy {
    /// Following takes effect immediately
    #[default]
    Direct,
    /// Following creates a pending request the followee must confirm
    RequestConfirm,
}

impl RelationshipPolicy {
    /// State of an edge right after a follow
    pub fn initial_state(&self) -> EdgeState {
        match self {
            Self::Direct => EdgeState::Confirmed,
            Self::RequestConfirm => EdgeState::Pending,
        }
    }

    /// Whether confirm / pending-request operations are available
    pub fn supports_confirmation(&self) -> bool {
        matches!(self, Self::RequestConfirm)
    }
}
