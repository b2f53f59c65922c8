//! In-memory skill repository implementation

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::skill::{normalize_title, Skill, SkillId, SkillRepository, SkillType};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct SkillTables {
    skills: HashMap<SkillId, Skill>,
    links: HashSet<(UserId, SkillId)>,
}

/// In-memory implementation of SkillRepository
///
/// Skills and links share one lock so find-or-create and linking see a
/// consistent view.
#[derive(Debug, Default)]
pub struct InMemorySkillRepository {
    tables: Arc<RwLock<SkillTables>>,
}

impl InMemorySkillRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn find_in(skills: &HashMap<SkillId, Skill>, title: &str) -> Option<Skill> {
    let normalized = normalize_title(title);
    skills.values().find(|s| s.title() == normalized).cloned()
}

#[async_trait]
impl SkillRepository for InMemorySkillRepository {
    async fn get(&self, id: &SkillId) -> Result<Option<Skill>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.skills.get(id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Skill>, DomainError> {
        let tables = self.tables.read().await;
        Ok(find_in(&tables.skills, title))
    }

    async fn find_or_create(
        &self,
        title: &str,
        skill_type: SkillType,
    ) -> Result<Skill, DomainError> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = find_in(&tables.skills, title) {
            return Ok(existing);
        }

        let skill = Skill::new(title, skill_type);
        tables.skills.insert(*skill.id(), skill.clone());

        Ok(skill)
    }

    async fn link(&self, user_id: &UserId, skill_id: &SkillId) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;

        if !tables.skills.contains_key(skill_id) {
            return Err(DomainError::skill_not_found(skill_id));
        }

        tables.links.insert((*user_id, *skill_id));
        Ok(())
    }

    async fn unlink(&self, user_id: &UserId, skill_id: &SkillId) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        Ok(tables.links.remove(&(*user_id, *skill_id)))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Skill>, DomainError> {
        let tables = self.tables.read().await;

        let mut skills: Vec<Skill> = tables
            .links
            .iter()
            .filter(|(user, _)| user == user_id)
            .filter_map(|(_, skill_id)| tables.skills.get(skill_id))
            .cloned()
            .collect();

        skills.sort_by(|a, b| a.title().cmp(b.title()));
        Ok(skills)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.skills.len())
    }
}
