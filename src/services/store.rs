use async_trait::async_trait;
use thiserror::Error;

use crate::core::validation::ValidSkill;
use crate::models::{Profile, SkillMatch};

/// Errors that can occur while reading from the data store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Read-only access to the skills, teachers and profiles collections
#[async_trait]
pub trait TeacherStore: Send + Sync {
    /// All skill rows whose name contains `skill`, ignoring case, each with
    /// its owning teacher when one still exists
    async fn find_skill_matches(&self, skill: &ValidSkill) -> Result<Vec<SkillMatch>, StoreError>;

    /// Profiles for the given user ids, fetched in one batch
    ///
    /// Ids without a profile are simply absent from the result.
    async fn fetch_profiles(&self, user_ids: &[String]) -> Result<Vec<Profile>, StoreError>;

    /// Whether the store is reachable
    async fn health_check(&self) -> bool {
        true
    }
}
