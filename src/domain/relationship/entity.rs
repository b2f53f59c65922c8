//! Follow edge between two users

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

/// Lifecycle of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeState {
    /// Requested by the follower, not yet accepted by the followee
    Pending,
    /// Counts as a follow
    Confirmed,
}

impl EdgeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            _ => None,
        }
    }
}

/// Directed edge: `follower` follows `followee`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    follower: UserId,
    followee: UserId,
    state: EdgeState,
    created_at: DateTime<Utc>,
}

impl Edge {
    pub fn new(follower: UserId, followee: UserId, state: EdgeState) -> Self {
        Self {
            follower,
            followee,
            state,
            created_at: Utc::now(),
        }
    }

    pub fn restore(
        follower: UserId,
        followee: UserId,
        state: EdgeState,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            follower,
            followee,
            state,
            created_at,
        }
    }

    pub fn follower(&self) -> &UserId {
        &self.follower
    }

    pub fn followee(&self) -> &UserId {
        &self.followee
    }

    pub fn state(&self) -> EdgeState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == EdgeState::Confirmed
    }

    /// Whether this edge touches `user` on either end
    pub fn involves(&self, user: &UserId) -> bool {
        self.follower == *user || self.followee == *user
    }

    pub fn confirm(&mut self) {
        self.state = EdgeState::Confirmed;
    }
}
