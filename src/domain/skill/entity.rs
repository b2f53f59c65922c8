//! Skill entity and related types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Skill identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(Uuid);

impl SkillId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for SkillId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for SkillId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillType {
    Hard,
    Soft,
}

impl SkillType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hard => "HARD",
            Self::Soft => "SOFT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HARD" => Some(Self::Hard),
            "SOFT" => Some(Self::Soft),
            _ => None,
        }
    }
}

/// Shared skill tag. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skill {
    id: SkillId,
    title: String,
    skill_type: SkillType,
}

impl Skill {
    /// Create a new skill; the title is stored trimmed and lowercased
    pub fn new(title: &str, skill_type: SkillType) -> Self {
        Self {
            id: SkillId::generate(),
            title: normalize_title(title),
            skill_type,
        }
    }

    /// Rebuild a skill from persisted state
    pub fn restore(id: SkillId, title: String, skill_type: SkillType) -> Self {
        Self {
            id,
            title,
            skill_type,
        }
    }

    pub fn id(&self) -> &SkillId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn skill_type(&self) -> SkillType {
        self.skill_type
    }
}

/// Canonical form used for storage and case-insensitive lookup
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}
