//! Application state for shared services

use std::sync::Arc;

use crate::domain::relationship::{Edge, RelationshipRepository};
use crate::domain::skill::{Skill, SkillId, SkillRepository};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::{DomainError, RelationshipPolicy};
use crate::infrastructure::relationship::{RelationshipCounts, RelationshipService};
use crate::infrastructure::skill::{AddSkillRequest, SkillService};
use crate::infrastructure::user::{
    PasswordHasher, RegisterUserRequest, UpdateProfileRequest, UserService,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub skill_service: Arc<dyn SkillServiceTrait>,
    pub relationship_service: Arc<dyn RelationshipServiceTrait>,
}

/// Trait for user directory operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError>;
    async fn update_profile(
        &self,
        id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<User, DomainError>;
    async fn get(&self, id: &UserId) -> Result<User, DomainError>;
    async fn list(&self) -> Result<Vec<User>, DomainError>;
    async fn exists_by_username(&self, username: &str) -> Result<bool, DomainError>;
    async fn delete(&self, id: &UserId) -> Result<(), DomainError>;
}

/// Trait for skill assignment operations
#[async_trait::async_trait]
pub trait SkillServiceTrait: Send + Sync {
    async fn add_skill(&self, user: &UserId, request: AddSkillRequest)
    -> Result<Skill, DomainError>;
    async fn remove_skill(&self, user: &UserId, skill: &SkillId) -> Result<(), DomainError>;
    async fn skills_of(&self, user: &UserId) -> Result<Vec<Skill>, DomainError>;
}

/// Trait for follow graph operations
#[async_trait::async_trait]
pub trait RelationshipServiceTrait: Send + Sync {
    fn policy(&self) -> RelationshipPolicy;
    async fn follow(&self, actor: &UserId, target: &UserId) -> Result<Edge, DomainError>;
    async fn unfollow(&self, actor: &UserId, target: &UserId) -> Result<(), DomainError>;
    async fn confirm(&self, target: &UserId, follower: &UserId) -> Result<(), DomainError>;
    async fn pending_requests(&self, user: &UserId) -> Result<Vec<User>, DomainError>;
    async fn followers(&self, user: &UserId) -> Result<Vec<User>, DomainError>;
    async fn following(&self, user: &UserId) -> Result<Vec<User>, DomainError>;
    async fn counts(&self, user: &UserId) -> Result<RelationshipCounts, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError> {
        UserService::register(self, request).await
    }

    async fn update_profile(
        &self,
        id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        UserService::update_profile(self, id, request).await
    }

    async fn get(&self, id: &UserId) -> Result<User, DomainError> {
        UserService::get(self, id).await
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        UserService::list(self).await
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, DomainError> {
        UserService::exists_by_username(self, username).await
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        UserService::delete(self, id).await
    }
}

#[async_trait::async_trait]
impl<S: SkillRepository + 'static> SkillServiceTrait for SkillService<S> {
    async fn add_skill(
        &self,
        user: &UserId,
        request: AddSkillRequest,
    ) -> Result<Skill, DomainError> {
        SkillService::add_skill(self, user, request).await
    }

    async fn remove_skill(&self, user: &UserId, skill: &SkillId) -> Result<(), DomainError> {
        SkillService::remove_skill(self, user, skill).await
    }

    async fn skills_of(&self, user: &UserId) -> Result<Vec<Skill>, DomainError> {
        SkillService::skills_of(self, user).await
    }
}

#[async_trait::async_trait]
impl<E: RelationshipRepository + 'static> RelationshipServiceTrait for RelationshipService<E> {
    fn policy(&self) -> RelationshipPolicy {
        RelationshipService::policy(self)
    }

    async fn follow(&self, actor: &UserId, target: &UserId) -> Result<Edge, DomainError> {
        RelationshipService::follow(self, actor, target).await
    }

    async fn unfollow(&self, actor: &UserId, target: &UserId) -> Result<(), DomainError> {
        RelationshipService::unfollow(self, actor, target).await
    }

    async fn confirm(&self, target: &UserId, follower: &UserId) -> Result<(), DomainError> {
        RelationshipService::confirm(self, target, follower).await
    }

    async fn pending_requests(&self, user: &UserId) -> Result<Vec<User>, DomainError> {
        RelationshipService::pending_requests(self, user).await
    }

    async fn followers(&self, user: &UserId) -> Result<Vec<User>, DomainError> {
        RelationshipService::followers(self, user).await
    }

    async fn following(&self, user: &UserId) -> Result<Vec<User>, DomainError> {
        RelationshipService::following(self, user).await
    }

    async fn counts(&self, user: &UserId) -> Result<RelationshipCounts, DomainError> {
        RelationshipService::counts(self, user).await
    }
}
