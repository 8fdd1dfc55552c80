// Core algorithm exports
pub mod aggregate;
pub mod enrich;
pub mod matcher;
pub mod ranking;
pub mod validation;

pub use aggregate::{aggregate, distinct_user_ids};
pub use enrich::{build_prompt, Enricher};
pub use matcher::{assemble, MatchError, TeacherMatcher};
pub use ranking::{rank, rank_for_experience};
pub use validation::{validate, validate_str, ValidSkill, ValidationError};
