//! Skill domain
//!
//! Deduplicated skill tags shared by many users.

mod entity;
mod repository;

pub use entity::{normalize_title, Skill, SkillId, SkillType};
pub use repository::SkillRepository;
