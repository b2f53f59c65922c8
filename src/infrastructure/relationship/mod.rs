//! Relationship infrastructure module

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresRelationshipRepository;
pub use repository::InMemoryRelationshipRepository;
pub use service::{RelationshipCounts, RelationshipService};
