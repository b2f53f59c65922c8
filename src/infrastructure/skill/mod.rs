//! Skill infrastructure module

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresSkillRepository;
pub use repository::InMemorySkillRepository;
pub use service::{AddSkillRequest, SkillService};
