use actix_web::http::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::core::{
    aggregate::{aggregate, distinct_user_ids},
    enrich::Enricher,
    ranking::rank,
    validation::{validate, ValidationError},
};
use crate::models::{ErrorResponse, MatchTeachersResponse, MatchedTeacherView};
use crate::services::{StoreError, TeacherStore};

/// Message returned to clients when the data store fails
pub const DATA_STORE_ERROR_MESSAGE: &str = "Failed to search for teachers";

/// Errors that abort a whole match request
#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Data store error: {0}")]
    DataStore(#[from] StoreError),
}

impl MatchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            MatchError::Validation(_) => StatusCode::BAD_REQUEST,
            MatchError::DataStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing payload; validation messages pass through verbatim
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            MatchError::Validation(e) => ErrorResponse::new(e.to_string()),
            MatchError::DataStore(_) => ErrorResponse::new(DATA_STORE_ERROR_MESSAGE),
        }
    }
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Validate the raw query
/// 2. Look up skills matching the query
/// 3. Batch-fetch profiles and join them with teachers
/// 4. Rank by teacher rank
/// 5. Enrich the top of the ranking with generated descriptions
#[derive(Clone)]
pub struct TeacherMatcher {
    store: Arc<dyn TeacherStore>,
    enricher: Enricher,
}

impl TeacherMatcher {
    pub fn new(store: Arc<dyn TeacherStore>, enricher: Enricher) -> Self {
        Self { store, enricher }
    }

    pub fn store(&self) -> &Arc<dyn TeacherStore> {
        &self.store
    }

    /// Run the full pipeline for a raw `skill` value from a request body
    pub async fn match_teachers(&self, raw_skill: &Value) -> Result<MatchTeachersResponse, MatchError> {
        let skill = validate(raw_skill)?;

        tracing::info!("Matching teachers for skill: {}", skill);

        let rows = self.store.find_skill_matches(&skill).await.map_err(|e| {
            tracing::error!("Error fetching skills for {}: {}", skill, e);
            e
        })?;

        let user_ids = distinct_user_ids(&rows);

        let profiles = if user_ids.is_empty() {
            vec![]
        } else {
            match self.store.fetch_profiles(&user_ids).await {
                Ok(profiles) => profiles,
                Err(e) => {
                    tracing::warn!(
                        "Failed to fetch {} profiles, proceeding without them: {}",
                        user_ids.len(),
                        e
                    );
                    vec![]
                }
            }
        };

        tracing::debug!(
            "Fetched {} profiles for {} teachers ({} skill rows)",
            profiles.len(),
            user_ids.len(),
            rows.len()
        );

        let views = rank(aggregate(rows, profiles));

        tracing::info!("Found teachers: {}", views.len());

        let views = self.enricher.enrich(views, skill.as_str()).await;

        Ok(assemble(views))
    }
}

/// Package the final ordered list as the service response
pub fn assemble(views: Vec<MatchedTeacherView>) -> MatchTeachersResponse {
    MatchTeachersResponse { teachers: views }
}
