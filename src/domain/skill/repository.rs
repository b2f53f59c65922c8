//! Skill repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Skill, SkillId, SkillType};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository trait for skills and user-skill links
#[async_trait]
pub trait SkillRepository: Send + Sync + Debug {
    /// Get a skill by ID
    async fn get(&self, id: &SkillId) -> Result<Option<Skill>, DomainError>;

    /// Case-insensitive lookup by title
    async fn find_by_title(&self, title: &str) -> Result<Option<Skill>, DomainError>;

    /// Return the skill with this title, creating it if none exists.
    ///
    /// Two concurrent callers with titles differing only in case end up
    /// with the same row.
    async fn find_or_create(&self, title: &str, skill_type: SkillType)
    -> Result<Skill, DomainError>;

    /// Link a skill to a user; linking twice is a no-op
    async fn link(&self, user_id: &UserId, skill_id: &SkillId) -> Result<(), DomainError>;

    /// Remove a user-skill link; returns false if it did not exist
    async fn unlink(&self, user_id: &UserId, skill_id: &SkillId) -> Result<bool, DomainError>;

    /// Skills linked to a user, ordered by title
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Skill>, DomainError>;

    /// Number of skill rows
    async fn count(&self) -> Result<usize, DomainError>;
}
