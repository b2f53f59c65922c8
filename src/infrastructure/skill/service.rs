//! Skill assignment service

use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::domain::skill::{Skill, SkillId, SkillRepository, SkillType};
use crate::domain::user::{validate_not_blank, UserId, UserLookup, MAX_NAME_LENGTH};
use crate::domain::{validate_request, DomainError};

/// Request for attaching a skill to a user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddSkillRequest {
    #[validate(
        custom(function = validate_not_blank),
        length(max = MAX_NAME_LENGTH, message = "must be at most 100 characters")
    )]
    pub title: String,

    pub skill_type: SkillType,
}

/// Attaches and detaches shared skill tags
#[derive(Debug)]
pub struct SkillService<S: SkillRepository> {
    repository: Arc<S>,
    users: Arc<dyn UserLookup>,
}

impl<S: SkillRepository> SkillService<S> {
    /// Create a new skill service
    pub fn new(repository: Arc<S>, users: Arc<dyn UserLookup>) -> Self {
        Self { repository, users }
    }

    /// Attach a skill by title, reusing an existing skill regardless of case
    pub async fn add_skill(
        &self,
        user_id: &UserId,
        request: AddSkillRequest,
    ) -> Result<Skill, DomainError> {
        self.users.require_active(user_id).await?;
        validate_request(&request)?;

        let skill = self
            .repository
            .find_or_create(&request.title, request.skill_type)
            .await?;
        self.repository.link(user_id, skill.id()).await?;

        info!(
            user_id = %user_id,
            skill_id = %skill.id(),
            title = %skill.title(),
            "Skill attached"
        );

        Ok(skill)
    }

    /// Detach a skill from a user; the skill itself is kept
    pub async fn remove_skill(&self, user_id: &UserId, skill_id: &SkillId) -> Result<(), DomainError> {
        self.users.require_active(user_id).await?;

        if self.repository.get(skill_id).await?.is_none() {
            return Err(DomainError::skill_not_found(skill_id));
        }

        if self.repository.unlink(user_id, skill_id).await? {
            info!(user_id = %user_id, skill_id = %skill_id, "Skill detached");
        } else {
            debug!(user_id = %user_id, skill_id = %skill_id, "Skill was not attached");
        }

        Ok(())
    }

    /// Skills attached to a user
    pub async fn skills_of(&self, user_id: &UserId) -> Result<Vec<Skill>, DomainError> {
        self.repository.list_for_user(user_id).await
    }
}
