use serde::{Deserialize, Deserializer, Serialize};

/// How well a teacher knows a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ProficiencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProficiencyLevel::Beginner => "beginner",
            ProficiencyLevel::Intermediate => "intermediate",
            ProficiencyLevel::Advanced => "advanced",
            ProficiencyLevel::Expert => "expert",
        }
    }
}

impl std::str::FromStr for ProficiencyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(ProficiencyLevel::Beginner),
            "intermediate" => Ok(ProficiencyLevel::Intermediate),
            "advanced" => Ok(ProficiencyLevel::Advanced),
            "expert" => Ok(ProficiencyLevel::Expert),
            other => Err(format!("unknown proficiency level: {}", other)),
        }
    }
}

/// Teacher record as owned by the teacher-profile collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TeacherRow")]
pub struct Teacher {
    pub id: String,
    pub user_id: String,
    pub occupation: String,
    pub years_of_experience: u32,
    pub rank: u32,
    pub bio: Option<String>,
    pub expertise_areas: Vec<String>,
}

/// Wire shape of a teacher row; nullable columns are filled in on conversion
#[derive(Debug, Deserialize)]
struct TeacherRow {
    id: String,
    user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    occupation: String,
    #[serde(default, deserialize_with = "null_as_default")]
    years_of_experience: u32,
    #[serde(default)]
    rank: Option<u32>,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    expertise_areas: Vec<String>,
}

impl From<TeacherRow> for Teacher {
    fn from(row: TeacherRow) -> Self {
        let rank = row
            .rank
            .filter(|rank| *rank > 0)
            .unwrap_or_else(|| crate::core::ranking::rank_for_experience(row.years_of_experience));

        Self {
            id: row.id,
            user_id: row.user_id,
            occupation: row.occupation,
            years_of_experience: row.years_of_experience,
            rank,
            bio: row.bio,
            expertise_areas: row.expertise_areas,
        }
    }
}

impl Teacher {
    /// The teacher's bio, ignoring blank text
    pub fn non_blank_bio(&self) -> Option<&str> {
        self.bio.as_deref().filter(|bio| !bio.trim().is_empty())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Public profile of the user owning a teacher record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A related record that the data store may embed as an object, as a
/// one-element list, or not at all
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Embedded<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Embedded<T> {
    /// Collapse to the single related record, if any
    pub fn resolve(self) -> Option<T> {
        match self {
            Embedded::One(record) => Some(record),
            Embedded::Many(records) => records.into_iter().next(),
        }
    }

    /// Borrowing form of [`Embedded::resolve`]
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Embedded::One(record) => Some(record),
            Embedded::Many(records) => records.first(),
        }
    }
}

/// A skill row whose name matched the search, with its owning teacher
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SkillMatch {
    pub teacher_id: String,
    pub skill_name: String,
    pub proficiency_level: ProficiencyLevel,
    #[serde(default)]
    pub teachers: Option<Embedded<Teacher>>,
}

/// One (teacher, matching skill) pair, denormalized for the response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedTeacherView {
    #[serde(flatten)]
    pub teacher: Teacher,
    pub skill_name: String,
    pub proficiency_level: ProficiencyLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(rename = "aiDescription", skip_serializing_if = "Option::is_none")]
    pub ai_description: Option<String>,
}
