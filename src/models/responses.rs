use serde::{Deserialize, Serialize};
use crate::models::domain::MatchedTeacherView;

/// Response for the match teachers endpoint
#[derive(Debug, Clone, Serialize)]
pub struct MatchTeachersResponse {
    pub teachers: Vec<MatchedTeacherView>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
