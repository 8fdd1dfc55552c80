// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Embedded, MatchedTeacherView, ProficiencyLevel, Profile, SkillMatch, Teacher};
pub use requests::MatchTeachersRequest;
pub use responses::{ErrorResponse, HealthResponse, MatchTeachersResponse};
