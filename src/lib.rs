//! Users Service
//!
//! Maintains the user directory for a social platform:
//! - Registration, profile edits and soft deletion
//! - Shared, case-insensitive skill tags
//! - Follow graph with optional request/confirm subscriptions
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::{RelationshipPolicy, RelationshipRepository, SkillRepository, UserLookup, UserRepository};
use infrastructure::relationship::{
    InMemoryRelationshipRepository, PostgresRelationshipRepository, RelationshipService,
};
use infrastructure::skill::{InMemorySkillRepository, PostgresSkillRepository, SkillService};
use infrastructure::storage::{connect_pool, run_storage_migrations, PostgresConfig, StorageType};
use infrastructure::user::{
    Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, UserService,
};
use tracing::info;

/// Create the application state with default configuration (in-memory storage)
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let policy = config.relationships.policy;

    info!(
        backend = ?config.storage.backend,
        policy = ?policy,
        "Initializing application state"
    );

    match config.storage.backend {
        StorageType::Memory => Ok(build_state(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemorySkillRepository::new()),
            Arc::new(InMemoryRelationshipRepository::new()),
            policy,
        )),
        StorageType::Postgres => {
            let pool = create_pool(config).await?;

            if config.storage.run_migrations {
                let applied = run_storage_migrations(&pool).await?;
                info!(applied, "Storage migrations complete");
            }

            Ok(build_state(
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresSkillRepository::new(pool.clone())),
                Arc::new(PostgresRelationshipRepository::new(pool)),
                policy,
            ))
        }
    }
}

/// Open a PostgreSQL pool from the storage section of the configuration
pub async fn create_pool(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let url = config
        .storage
        .database_url
        .clone()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .ok_or_else(|| {
            anyhow::anyhow!("storage.database_url or DATABASE_URL is required for postgres storage")
        })?;

    info!("Connecting to PostgreSQL...");
    let pool = connect_pool(
        &PostgresConfig::new(url).with_max_connections(config.storage.max_connections),
    )
    .await?;
    info!("PostgreSQL connection established");

    Ok(pool)
}

fn build_state<U, S, E>(
    users: Arc<U>,
    skills: Arc<S>,
    edges: Arc<E>,
    policy: RelationshipPolicy,
) -> AppState
where
    U: UserRepository + 'static,
    S: SkillRepository + 'static,
    E: RelationshipRepository + 'static,
{
    let cascade: Arc<dyn RelationshipRepository> = edges.clone();
    let user_service = Arc::new(UserService::new(users, Arc::new(Argon2Hasher::new()), cascade));
    let lookup: Arc<dyn UserLookup> = user_service.clone();

    let skill_service = Arc::new(SkillService::new(skills, lookup.clone()));
    let relationship_service = Arc::new(RelationshipService::new(edges, lookup, policy));

    AppState {
        user_service,
        skill_service,
        relationship_service,
    }
}
