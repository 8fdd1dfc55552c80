use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::core::ranking::rank_for_experience;
use crate::core::validation::ValidSkill;
use crate::models::{Embedded, ProficiencyLevel, Profile, SkillMatch, Teacher};
use crate::services::store::{StoreError, TeacherStore};

const FIND_SKILL_MATCHES_SQL: &str = r#"
    SELECT
        s.teacher_id::text AS teacher_id,
        s.skill_name,
        s.proficiency_level::text AS proficiency_level,
        t.id::text AS t_id,
        t.user_id::text AS t_user_id,
        t.occupation AS t_occupation,
        t.years_of_experience AS t_years,
        t.rank AS t_rank,
        t.bio AS t_bio,
        t.expertise_areas AS t_expertise
    FROM skills s
    LEFT JOIN teachers t ON t.id = s.teacher_id
    WHERE s.skill_name ILIKE $1
"#;

const FETCH_PROFILES_SQL: &str = r#"
    SELECT id::text AS id, full_name, email
    FROM profiles
    WHERE id::text = ANY($1)
"#;

/// Data store reading the skills schema straight from PostgreSQL
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store from an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a store with pool settings from configuration
    pub async fn from_settings(
        database_url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.unwrap_or(10))
            .min_connections(min_connections.unwrap_or(1))
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs.unwrap_or(5)))
            .idle_timeout(Duration::from_secs(idle_timeout_secs.unwrap_or(600)))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL store connected");

        Ok(Self { pool })
    }

    fn decode_skill_row(row: &PgRow) -> Result<SkillMatch, StoreError> {
        let level: String = row.try_get("proficiency_level")?;

        let columns = TeacherColumns {
            id: row.try_get("t_id")?,
            user_id: row.try_get("t_user_id")?,
            occupation: row.try_get("t_occupation")?,
            years: row.try_get("t_years")?,
            rank: row.try_get("t_rank")?,
            bio: row.try_get("t_bio")?,
            expertise: row.try_get("t_expertise")?,
        };

        Ok(SkillMatch {
            teacher_id: row.try_get("teacher_id")?,
            skill_name: row.try_get("skill_name")?,
            proficiency_level: parse_level(&level)?,
            teachers: columns.into_teacher().map(Embedded::One),
        })
    }
}

/// Teacher columns of one `LEFT JOIN` row, all NULL when no teacher matched
#[derive(Debug, Default)]
struct TeacherColumns {
    id: Option<String>,
    user_id: Option<String>,
    occupation: Option<String>,
    years: Option<i32>,
    rank: Option<i32>,
    bio: Option<String>,
    expertise: Option<Vec<String>>,
}

impl TeacherColumns {
    fn into_teacher(self) -> Option<Teacher> {
        let id = self.id?;
        let years = self.years.and_then(|y| u32::try_from(y).ok()).unwrap_or(0);

        // Ranks are 1-based; zero or negative is treated as unset
        let rank = self
            .rank
            .and_then(|r| u32::try_from(r).ok())
            .filter(|r| *r > 0)
            .unwrap_or_else(|| rank_for_experience(years));

        Some(Teacher {
            id,
            user_id: self.user_id.unwrap_or_default(),
            occupation: self.occupation.unwrap_or_default(),
            years_of_experience: years,
            rank,
            bio: self.bio,
            expertise_areas: self.expertise.unwrap_or_default(),
        })
    }
}

fn parse_level(level: &str) -> Result<ProficiencyLevel, StoreError> {
    level.parse::<ProficiencyLevel>().map_err(StoreError::InvalidResponse)
}

#[async_trait]
impl TeacherStore for PostgresStore {
    async fn find_skill_matches(&self, skill: &ValidSkill) -> Result<Vec<SkillMatch>, StoreError> {
        // Validated skills hold no LIKE metacharacters, so no escaping is needed
        let pattern = format!("%{}%", skill.as_str());

        let rows = sqlx::query(FIND_SKILL_MATCHES_SQL)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        let matches: Vec<SkillMatch> = rows
            .iter()
            .filter_map(|row| match Self::decode_skill_row(row) {
                Ok(skill_match) => Some(skill_match),
                Err(e) => {
                    tracing::warn!("Skipping undecodable skill row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Decoded {} of {} skill rows", matches.len(), rows.len());

        Ok(matches)
    }

    async fn fetch_profiles(&self, user_ids: &[String]) -> Result<Vec<Profile>, StoreError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = sqlx::query(FETCH_PROFILES_SQL)
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<Profile, StoreError> {
                Ok(Profile {
                    id: row.try_get("id")?,
                    full_name: row.try_get::<Option<String>, _>("full_name")?.unwrap_or_default(),
                    email: row.try_get("email")?,
                })
            })
            .collect()
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}
