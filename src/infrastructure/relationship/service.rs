//! Follow graph service
//!
//! Maintains directed follow edges between active users. Under
//! [`RelationshipPolicy::Direct`] a follow takes effect immediately; under
//! [`RelationshipPolicy::RequestConfirm`] it creates a pending request that
//! the followee has to confirm before the edge shows up in any list.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::relationship::{Edge, EdgeState, RelationshipPolicy, RelationshipRepository};
use crate::domain::user::{User, UserId, UserLookup};
use crate::domain::DomainError;

/// Derived follower/following totals for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipCounts {
    pub followers: usize,
    pub following: usize,
}

/// Follow graph service
#[derive(Debug)]
pub struct RelationshipService<E: RelationshipRepository> {
    edges: Arc<E>,
    users: Arc<dyn UserLookup>,
    policy: RelationshipPolicy,
}

impl<E: RelationshipRepository> RelationshipService<E> {
    /// Create a new relationship service
    pub fn new(edges: Arc<E>, users: Arc<dyn UserLookup>, policy: RelationshipPolicy) -> Self {
        Self {
            edges,
            users,
            policy,
        }
    }

    pub fn policy(&self) -> RelationshipPolicy {
        self.policy
    }

    /// `actor` starts following `target`, or requests to
    pub async fn follow(&self, actor: &UserId, target: &UserId) -> Result<Edge, DomainError> {
        let from = self.users.require_active(actor).await?;
        let to = self.users.require_active(target).await?;

        if actor == target {
            return Err(DomainError::invalid("target_id", "users cannot follow themselves"));
        }

        if let Some(existing) = self.edges.get(actor, target).await? {
            return Err(Self::duplicate_follow(existing.state()));
        }

        // A concurrent follow can still win the insert after the check above
        let initial = self.policy.initial_state();
        let edge = self
            .edges
            .insert(Edge::new(*actor, *target, initial))
            .await
            .map_err(|e| match e {
                DomainError::Conflict { .. } => Self::duplicate_follow(initial),
                other => other,
            })?;

        info!(
            follower = %from.username(),
            followee = %to.username(),
            state = edge.state().as_str(),
            "Follow edge created"
        );

        Ok(edge)
    }

    fn duplicate_follow(state: EdgeState) -> DomainError {
        match state {
            EdgeState::Pending => DomainError::conflict("subscription already requested"),
            EdgeState::Confirmed => DomainError::conflict("already following"),
        }
    }

    /// Remove the edge `actor -> target`, withdrawing a pending request too
    pub async fn unfollow(&self, actor: &UserId, target: &UserId) -> Result<(), DomainError> {
        let from = self.users.require_active(actor).await?;
        let to = self.users.require_active(target).await?;

        if !self.edges.delete(actor, target).await? {
            return Err(DomainError::conflict("not following"));
        }

        info!(follower = %from.username(), followee = %to.username(), "Follow edge removed");

        Ok(())
    }

    /// `target` accepts the pending request from `follower`
    pub async fn confirm(&self, target: &UserId, follower: &UserId) -> Result<(), DomainError> {
        self.ensure_confirmation_enabled()?;

        let to = self.users.require_active(target).await?;
        let from = self.users.require_active(follower).await?;

        if !self.edges.confirm_pending(follower, target).await? {
            return Err(DomainError::not_found(
                "subscription request not found or already confirmed",
            ));
        }

        info!(follower = %from.username(), followee = %to.username(), "Subscription confirmed");

        Ok(())
    }

    /// Users waiting for `user` to confirm their request
    pub async fn pending_requests(&self, user: &UserId) -> Result<Vec<User>, DomainError> {
        self.ensure_confirmation_enabled()?;
        self.users.require_active(user).await?;

        let edges = self.edges.incoming(user, EdgeState::Pending).await?;
        let ids: Vec<UserId> = edges.iter().map(|e| *e.follower()).collect();

        self.resolve(&ids).await
    }

    /// Users following `user`
    pub async fn followers(&self, user: &UserId) -> Result<Vec<User>, DomainError> {
        self.users.require_active(user).await?;
        self.confirmed_followers(user).await
    }

    /// Users `user` follows
    pub async fn following(&self, user: &UserId) -> Result<Vec<User>, DomainError> {
        self.users.require_active(user).await?;
        self.confirmed_following(user).await
    }

    /// Follower/following totals, computed from the current edges
    pub async fn counts(&self, user: &UserId) -> Result<RelationshipCounts, DomainError> {
        Ok(RelationshipCounts {
            followers: self.confirmed_followers(user).await?.len(),
            following: self.confirmed_following(user).await?.len(),
        })
    }

    async fn confirmed_followers(&self, user: &UserId) -> Result<Vec<User>, DomainError> {
        let edges = self.edges.incoming(user, EdgeState::Confirmed).await?;
        let ids: Vec<UserId> = edges.iter().map(|e| *e.follower()).collect();

        self.resolve(&ids).await
    }

    async fn confirmed_following(&self, user: &UserId) -> Result<Vec<User>, DomainError> {
        let edges = self.edges.outgoing(user, EdgeState::Confirmed).await?;
        let ids: Vec<UserId> = edges.iter().map(|e| *e.followee()).collect();

        self.resolve(&ids).await
    }

    /// Active users for the given ids, ordered by username
    async fn resolve(&self, ids: &[UserId]) -> Result<Vec<User>, DomainError> {
        let mut users = self.users.find_active(ids).await?;

        if users.len() < ids.len() {
            debug!(
                skipped = ids.len() - users.len(),
                "Edges point at inactive users"
            );
        }

        users.sort_by(|a, b| a.username().cmp(b.username()));
        Ok(users)
    }

    fn ensure_confirmation_enabled(&self) -> Result<(), DomainError> {
        if self.policy.supports_confirmation() {
            Ok(())
        } else {
            Err(DomainError::invalid(
                "policy",
                "subscription confirmation is disabled",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::relationship::repository::InMemoryRelationshipRepository;
    use crate::infrastructure::user::{
        Argon2Hasher, InMemoryUserRepository, RegisterUserRequest, UserService,
    };

    struct Fixture {
        service: RelationshipService<InMemoryRelationshipRepository>,
        users: Arc<UserService<InMemoryUserRepository, Argon2Hasher>>,
    }

    fn create_fixture(policy: RelationshipPolicy) -> Fixture {
        let edges = Arc::new(InMemoryRelationshipRepository::new());
        let users = Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new()),
            edges.clone(),
        ));
        let service = RelationshipService::new(edges, users.clone(), policy);

        Fixture { service, users }
    }

    async fn register(fixture: &Fixture, username: &str) -> UserId {
        register_with(&fixture.users, username).await
    }

    async fn register_with(
        users: &UserService<InMemoryUserRepository, Argon2Hasher>,
        username: &str,
    ) -> UserId {
        let user = users
            .register(RegisterUserRequest {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: "secure_password123".to_string(),
            })
            .await
            .unwrap();

        *user.id()
    }

    fn usernames(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.username()).collect()
    }

    #[tokio::test]
    async fn test_follow_and_list() {
        let fixture = create_fixture(RelationshipPolicy::Direct);
        let alice = register(&fixture, "alice").await;
        let bob = register(&fixture, "bob").await;

        let edge = fixture.service.follow(&alice, &bob).await.unwrap();
        assert!(edge.is_confirmed());

        let followers = fixture.service.followers(&bob).await.unwrap();
        assert_eq!(usernames(&followers), vec!["alice"]);

        let following = fixture.service.following(&alice).await.unwrap();
        assert_eq!(usernames(&following), vec!["bob"]);

        assert!(fixture.service.followers(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_follow_twice_conflicts() {
        let fixture = create_fixture(RelationshipPolicy::Direct);
        let alice = register(&fixture, "alice").await;
        let bob = register(&fixture, "bob").await;

        fixture.service.follow(&alice, &bob).await.unwrap();

        let result = fixture.service.follow(&alice, &bob).await;
        assert!(
            matches!(result, Err(DomainError::Conflict { reason }) if reason == "already following")
        );
        assert_eq!(fixture.service.followers(&bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_follow_self_rejected() {
        let fixture = create_fixture(RelationshipPolicy::Direct);
        let alice = register(&fixture, "alice").await;

        let result = fixture.service.follow(&alice, &alice).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_follow_unknown_user() {
        let fixture = create_fixture(RelationshipPolicy::Direct);
        let alice = register(&fixture, "alice").await;
        let ghost = UserId::generate();

        let result = fixture.service.follow(&alice, &ghost).await;
        assert!(matches!(result, Err(DomainError::UserNotFound { id }) if id == ghost.to_string()));

        let result = fixture.service.follow(&ghost, &alice).await;
        assert!(matches!(result, Err(DomainError::UserNotFound { .. })));
    }

    #[tokio::test]
    async fn test_unfollow() {
        let fixture = create_fixture(RelationshipPolicy::Direct);
        let alice = register(&fixture, "alice").await;
        let bob = register(&fixture, "bob").await;

        fixture.service.follow(&alice, &bob).await.unwrap();
        fixture.service.unfollow(&alice, &bob).await.unwrap();

        assert!(fixture.service.followers(&bob).await.unwrap().is_empty());

        let result = fixture.service.unfollow(&alice, &bob).await;
        assert!(
            matches!(result, Err(DomainError::Conflict { reason }) if reason == "not following")
        );
    }

    #[tokio::test]
    async fn test_follow_is_directed() {
        let fixture = create_fixture(RelationshipPolicy::Direct);
        let alice = register(&fixture, "alice").await;
        let bob = register(&fixture, "bob").await;

        fixture.service.follow(&alice, &bob).await.unwrap();
        fixture.service.follow(&bob, &alice).await.unwrap();
        fixture.service.unfollow(&alice, &bob).await.unwrap();

        assert_eq!(usernames(&fixture.service.following(&bob).await.unwrap()), vec!["alice"]);
        assert!(fixture.service.following(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counts_match_lists() {
        let fixture = create_fixture(RelationshipPolicy::Direct);
        let alice = register(&fixture, "alice").await;
        let bob = register(&fixture, "bob").await;
        let carol = register(&fixture, "carol").await;

        fixture.service.follow(&bob, &alice).await.unwrap();
        fixture.service.follow(&carol, &alice).await.unwrap();
        fixture.service.follow(&alice, &carol).await.unwrap();

        let counts = fixture.service.counts(&alice).await.unwrap();
        assert_eq!(
            counts,
            RelationshipCounts {
                followers: 2,
                following: 1
            }
        );
        assert_eq!(
            usernames(&fixture.service.followers(&alice).await.unwrap()),
            vec!["bob", "carol"]
        );
    }

    #[tokio::test]
    async fn test_deleted_user_disappears_from_lists() {
        let fixture = create_fixture(RelationshipPolicy::Direct);
        let alice = register(&fixture, "alice").await;
        let bob = register(&fixture, "bob").await;

        fixture.service.follow(&alice, &bob).await.unwrap();
        fixture.users.delete(&alice).await.unwrap();

        assert!(fixture.service.followers(&bob).await.unwrap().is_empty());
        assert_eq!(fixture.service.counts(&bob).await.unwrap().followers, 0);

        let result = fixture.service.following(&alice).await;
        assert!(matches!(result, Err(DomainError::UserNotFound { .. })));
    }

    #[tokio::test]
    async fn test_confirmation_disabled_under_direct_policy() {
        let fixture = create_fixture(RelationshipPolicy::Direct);
        let alice = register(&fixture, "alice").await;
        let bob = register(&fixture, "bob").await;

        let result = fixture.service.confirm(&bob, &alice).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));

        let result = fixture.service.pending_requests(&bob).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_request_is_invisible_until_confirmed() {
        let fixture = create_fixture(RelationshipPolicy::RequestConfirm);
        let alice = register(&fixture, "alice").await;
        let bob = register(&fixture, "bob").await;

        let edge = fixture.service.follow(&alice, &bob).await.unwrap();
        assert_eq!(edge.state(), EdgeState::Pending);

        assert!(fixture.service.followers(&bob).await.unwrap().is_empty());
        assert!(fixture.service.following(&alice).await.unwrap().is_empty());
        assert_eq!(
            usernames(&fixture.service.pending_requests(&bob).await.unwrap()),
            vec!["alice"]
        );

        fixture.service.confirm(&bob, &alice).await.unwrap();

        assert_eq!(usernames(&fixture.service.followers(&bob).await.unwrap()), vec!["alice"]);
        assert_eq!(usernames(&fixture.service.following(&alice).await.unwrap()), vec!["bob"]);
        assert!(fixture.service.pending_requests(&bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_twice_conflicts() {
        let fixture = create_fixture(RelationshipPolicy::RequestConfirm);
        let alice = register(&fixture, "alice").await;
        let bob = register(&fixture, "bob").await;

        fixture.service.follow(&alice, &bob).await.unwrap();

        let result = fixture.service.follow(&alice, &bob).await;
        assert!(matches!(
            result,
            Err(DomainError::Conflict { reason }) if reason == "subscription already requested"
        ));
    }

    #[tokio::test]
    async fn test_confirm_twice_not_found() {
        let fixture = create_fixture(RelationshipPolicy::RequestConfirm);
        let alice = register(&fixture, "alice").await;
        let bob = register(&fixture, "bob").await;

        fixture.service.follow(&alice, &bob).await.unwrap();
        fixture.service.confirm(&bob, &alice).await.unwrap();

        let result = fixture.service.confirm(&bob, &alice).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_confirm_without_request_not_found() {
        let fixture = create_fixture(RelationshipPolicy::RequestConfirm);
        let alice = register(&fixture, "alice").await;
        let bob = register(&fixture, "bob").await;

        let result = fixture.service.confirm(&bob, &alice).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unfollow_withdraws_request() {
        let fixture = create_fixture(RelationshipPolicy::RequestConfirm);
        let alice = register(&fixture, "alice").await;
        let bob = register(&fixture, "bob").await;

        fixture.service.follow(&alice, &bob).await.unwrap();
        fixture.service.unfollow(&alice, &bob).await.unwrap();

        assert!(fixture.service.pending_requests(&bob).await.unwrap().is_empty());

        let result = fixture.service.confirm(&bob, &alice).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    /// Hides existing edges from `get`, so only the insert sees the duplicate
    #[derive(Debug, Default)]
    struct RacingEdges {
        inner: InMemoryRelationshipRepository,
    }

    #[async_trait::async_trait]
    impl RelationshipRepository for RacingEdges {
        async fn get(&self, _: &UserId, _: &UserId) -> Result<Option<Edge>, DomainError> {
            Ok(None)
        }

        async fn insert(&self, edge: Edge) -> Result<Edge, DomainError> {
            self.inner.insert(edge).await
        }

        async fn confirm_pending(&self, f: &UserId, t: &UserId) -> Result<bool, DomainError> {
            self.inner.confirm_pending(f, t).await
        }

        async fn delete(&self, f: &UserId, t: &UserId) -> Result<bool, DomainError> {
            self.inner.delete(f, t).await
        }

        async fn incoming(&self, user: &UserId, state: EdgeState) -> Result<Vec<Edge>, DomainError> {
            self.inner.incoming(user, state).await
        }

        async fn outgoing(&self, user: &UserId, state: EdgeState) -> Result<Vec<Edge>, DomainError> {
            self.inner.outgoing(user, state).await
        }

        async fn purge_user(&self, user: &UserId) -> Result<u64, DomainError> {
            self.inner.purge_user(user).await
        }
    }

    #[tokio::test]
    async fn test_racing_follow_reports_policy_reason() {
        let edges = Arc::new(RacingEdges::default());
        let users = Arc::new(UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(Argon2Hasher::new()),
            edges.clone(),
        ));
        let service =
            RelationshipService::new(edges, users.clone(), RelationshipPolicy::RequestConfirm);
        let alice = register_with(&users, "alice").await;
        let bob = register_with(&users, "bob").await;

        service.follow(&alice, &bob).await.unwrap();

        match service.follow(&alice, &bob).await {
            Err(DomainError::Conflict { reason }) => {
                assert_eq!(reason, "subscription already requested")
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }
}
