use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::core::validation::ValidSkill;
use crate::models::{Profile, SkillMatch};
use crate::services::store::{StoreError, TeacherStore};

/// Columns selected from `skills`, with the owning teacher embedded
const SKILL_SELECT: &str =
    "teacher_id,skill_name,proficiency_level,teachers(id,user_id,occupation,years_of_experience,rank,bio,expertise_areas)";

const PROFILE_SELECT: &str = "id,full_name,email";

/// Data store client for a Supabase (PostgREST) backend
///
/// Reads the `skills`, `teachers` and `profiles` tables through the REST
/// API using a service key.
pub struct SupabaseClient {
    base_url: String,
    service_key: String,
    client: Client,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(base_url: String, service_key: String) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            service_key,
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    async fn get_rows(&self, url: &str, what: &str) -> Result<Vec<Value>, StoreError> {
        tracing::debug!("Fetching {} from: {}", what, url);

        let response = self
            .client
            .get(url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to fetch {}: {} - {}", what, status, body);
            return Err(StoreError::ApiError(format!("Failed to fetch {}: {}", what, status)));
        }

        let json: Value = response.json().await?;

        match json {
            Value::Array(rows) => Ok(rows),
            _ => Err(StoreError::InvalidResponse(format!("Expected an array of {}", what))),
        }
    }
}

#[async_trait]
impl TeacherStore for SupabaseClient {
    async fn find_skill_matches(&self, skill: &ValidSkill) -> Result<Vec<SkillMatch>, StoreError> {
        // Validated skills hold no PostgREST or LIKE metacharacters
        let pattern = format!("ilike.*{}*", skill.as_str());

        let url = format!(
            "{}?select={}&skill_name={}",
            self.table_url("skills"),
            urlencoding::encode(SKILL_SELECT),
            urlencoding::encode(&pattern)
        );

        let rows = self.get_rows(&url, "skills").await?;
        let total = rows.len();

        let matches: Vec<SkillMatch> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(skill_match) => Some(skill_match),
                Err(e) => {
                    tracing::warn!("Skipping undecodable skill row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Decoded {} of {} skill rows", matches.len(), total);

        Ok(matches)
    }

    async fn fetch_profiles(&self, user_ids: &[String]) -> Result<Vec<Profile>, StoreError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let id_list = user_ids
            .iter()
            .map(|id| format!("\"{}\"", id.replace('"', "")))
            .collect::<Vec<_>>()
            .join(",");

        let url = format!(
            "{}?select={}&id={}",
            self.table_url("profiles"),
            urlencoding::encode(PROFILE_SELECT),
            urlencoding::encode(&format!("in.({})", id_list))
        );

        let rows = self.get_rows(&url, "profiles").await?;
        let total = rows.len();

        let profiles: Vec<Profile> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!("Skipping undecodable profile row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Decoded {} of {} profile rows", profiles.len(), total);

        Ok(profiles)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}?select=id&limit=1", self.table_url("skills"));
        self.get_rows(&url, "health probe").await.is_ok()
    }
}
