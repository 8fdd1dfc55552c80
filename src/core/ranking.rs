use crate::models::MatchedTeacherView;

/// Rank assigned to a teacher from years of experience
///
/// Staircase: 8+ years → 1, 6+ → 2, 4+ → 3, 2+ → 4, otherwise 5.
pub fn rank_for_experience(years: u32) -> u32 {
    match years {
        8.. => 1,
        6..=7 => 2,
        4..=5 => 3,
        2..=3 => 4,
        _ => 5,
    }
}

/// Order views by teacher rank, best (lowest) first
///
/// The sort is stable: views with equal rank keep their aggregation order.
/// There is deliberately no secondary key.
pub fn rank(mut views: Vec<MatchedTeacherView>) -> Vec<MatchedTeacherView> {
    views.sort_by_key(|view| view.teacher.rank);
    views
}
