//! User endpoints under `/api/users`

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{Ack, ApiError, ApiResponse, Json, Path};
use crate::domain::relationship::EdgeState;
use crate::domain::skill::{Skill, SkillId, SkillType};
use crate::domain::user::{Profile, User, UserId};
use crate::infrastructure::skill::AddSkillRequest;
use crate::infrastructure::user::{RegisterUserRequest, UpdateProfileRequest};

/// Skill as embedded in user payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillResponse {
    pub id: Uuid,
    pub title: String,
    pub skill_type: SkillType,
}

impl From<&Skill> for SkillResponse {
    fn from(skill: &Skill) -> Self {
        Self {
            id: *skill.id().as_uuid(),
            title: skill.title().to_string(),
            skill_type: skill.skill_type(),
        }
    }
}

/// Full user representation; never carries the password hash
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(flatten)]
    pub profile: Profile,
    pub skills: Vec<SkillResponse>,
    pub followers_count: usize,
    pub following_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entry in follower/following/request lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            username: user.username().to_string(),
        }
    }
}

type DataResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn data<T>(value: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::new(value))
}

fn summaries(users: &[User]) -> Vec<UserSummary> {
    users.iter().map(UserSummary::from).collect()
}

async fn user_response(state: &AppState, user: &User) -> Result<UserResponse, ApiError> {
    let skills = state.skill_service.skills_of(user.id()).await?;
    let counts = state.relationship_service.counts(user.id()).await?;

    Ok(UserResponse {
        id: *user.id().as_uuid(),
        username: user.username().to_string(),
        email: user.email().to_string(),
        profile: user.profile().clone(),
        skills: skills.iter().map(SkillResponse::from).collect(),
        followers_count: counts.followers,
        following_count: counts.following,
        created_at: user.created_at(),
        updated_at: user.updated_at(),
    })
}

/// POST /api/users
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    debug!(username = %request.username, "Registering user");

    let user = state.user_service.register(request).await?;
    let response = user_response(&state, &user).await?;

    Ok((StatusCode::CREATED, data(response)))
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> DataResult<Vec<UserResponse>> {
    debug!("Listing users");

    let users = state.user_service.list().await?;
    let mut responses = Vec::with_capacity(users.len());

    for user in &users {
        responses.push(user_response(&state, user).await?);
    }

    Ok(data(responses))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> DataResult<UserResponse> {
    debug!(user_id = %id, "Getting user");

    let user = state.user_service.get(&UserId::from(id)).await?;

    Ok(data(user_response(&state, &user).await?))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> DataResult<UserResponse> {
    debug!(user_id = %id, "Updating user profile");

    let user = state
        .user_service
        .update_profile(&UserId::from(id), request)
        .await?;

    Ok(data(user_response(&state, &user).await?))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> DataResult<Ack> {
    debug!(user_id = %id, "Deleting user");

    state.user_service.delete(&UserId::from(id)).await?;

    Ok(data(Ack::ok(format!("User with id={} deleted", id))))
}

/// POST /api/users/{id}/addSkill
pub async fn add_skill(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddSkillRequest>,
) -> DataResult<SkillResponse> {
    debug!(user_id = %id, title = %request.title, "Adding skill");

    let skill = state
        .skill_service
        .add_skill(&UserId::from(id), request)
        .await?;

    Ok(data(SkillResponse::from(&skill)))
}

/// DELETE /api/users/{id}/removeSkill/{skill_id}
pub async fn remove_skill(
    State(state): State<AppState>,
    Path((id, skill_id)): Path<(Uuid, Uuid)>,
) -> DataResult<Ack> {
    debug!(user_id = %id, skill_id = %skill_id, "Removing skill");

    state
        .skill_service
        .remove_skill(&UserId::from(id), &SkillId::from(skill_id))
        .await?;

    Ok(data(Ack::ok("Skill removed")))
}

/// PUT /api/users/{id}/follow/{target_id}
pub async fn follow(
    State(state): State<AppState>,
    Path((id, target_id)): Path<(Uuid, Uuid)>,
) -> DataResult<Ack> {
    debug!(user_id = %id, target_id = %target_id, "Following user");

    let edge = state
        .relationship_service
        .follow(&UserId::from(id), &UserId::from(target_id))
        .await?;

    let message = match edge.state() {
        EdgeState::Confirmed => "Now following",
        EdgeState::Pending => "Subscription requested",
    };

    Ok(data(Ack::ok(message)))
}

/// DELETE /api/users/{id}/unfollow/{target_id}
pub async fn unfollow(
    State(state): State<AppState>,
    Path((id, target_id)): Path<(Uuid, Uuid)>,
) -> DataResult<Ack> {
    debug!(user_id = %id, target_id = %target_id, "Unfollowing user");

    state
        .relationship_service
        .unfollow(&UserId::from(id), &UserId::from(target_id))
        .await?;

    Ok(data(Ack::ok("Unfollowed")))
}

/// PUT /api/users/{id}/confirm/{follower_id}
pub async fn confirm(
    State(state): State<AppState>,
    Path((id, follower_id)): Path<(Uuid, Uuid)>,
) -> DataResult<Ack> {
    debug!(user_id = %id, follower_id = %follower_id, "Confirming subscription");

    state
        .relationship_service
        .confirm(&UserId::from(id), &UserId::from(follower_id))
        .await?;

    Ok(data(Ack::ok("Subscription confirmed")))
}

/// GET /api/users/{id}/requests
pub async fn pending_requests(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> DataResult<Vec<UserSummary>> {
    let users = state
        .relationship_service
        .pending_requests(&UserId::from(id))
        .await?;

    Ok(data(summaries(&users)))
}

/// GET /api/users/{id}/followers
pub async fn followers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> DataResult<Vec<UserSummary>> {
    let users = state
        .relationship_service
        .followers(&UserId::from(id))
        .await?;

    Ok(data(summaries(&users)))
}

/// GET /api/users/{id}/following
pub async fn following(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> DataResult<Vec<UserSummary>> {
    let users = state
        .relationship_service
        .following(&UserId::from(id))
        .await?;

    Ok(data(summaries(&users)))
}

/// Routes relative to `/api/users`
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_user).get(list_users))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/addSkill", post(add_skill))
        .route("/{id}/removeSkill/{skill_id}", delete(remove_skill))
        .route("/{id}/follow/{target_id}", put(follow))
        .route("/{id}/unfollow/{target_id}", delete(unfollow))
        .route("/{id}/confirm/{follower_id}", put(confirm))
        .route("/{id}/requests", get(pending_requests))
        .route("/{id}/followers", get(followers))
        .route("/{id}/following", get(following))
}
