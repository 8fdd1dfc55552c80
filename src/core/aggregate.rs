use crate::models::{MatchedTeacherView, Profile, SkillMatch, Teacher};
use std::collections::{HashMap, HashSet};

/// Resolve the owning teacher of a matched skill row
pub fn resolve_teacher(row: &SkillMatch) -> Option<&Teacher> {
    row.teachers.as_ref()?.resolved()
}

/// Distinct owner references of all resolvable teachers, in first-seen order
pub fn distinct_user_ids(rows: &[SkillMatch]) -> Vec<String> {
    let mut seen = HashSet::new();

    rows.iter()
        .filter_map(resolve_teacher)
        .map(|teacher| teacher.user_id.as_str())
        .filter(|user_id| !user_id.is_empty())
        .filter(|user_id| seen.insert(*user_id))
        .map(str::to_string)
        .collect()
}

/// Join matched rows with their teacher and profile
///
/// Produces one view per (teacher, matching skill) pair in row order. Rows
/// without a teacher are dropped; teachers without a profile keep `profile`
/// unset.
pub fn aggregate(rows: Vec<SkillMatch>, profiles: Vec<Profile>) -> Vec<MatchedTeacherView> {
    let profiles_by_id: HashMap<String, Profile> = profiles
        .into_iter()
        .map(|profile| (profile.id.clone(), profile))
        .collect();

    let total_rows = rows.len();

    let views: Vec<MatchedTeacherView> = rows
        .into_iter()
        .filter_map(|row| {
            let teacher = row.teachers.and_then(|embedded| embedded.resolve())?;
            let profile = profiles_by_id.get(&teacher.user_id).cloned();

            Some(MatchedTeacherView {
                teacher,
                skill_name: row.skill_name,
                proficiency_level: row.proficiency_level,
                profile,
                ai_description: None,
            })
        })
        .collect();

    if views.len() < total_rows {
        tracing::debug!(
            "Dropped {} skill rows without a resolvable teacher",
            total_rows - views.len()
        );
    }

    views
}
