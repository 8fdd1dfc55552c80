//! Skill Match - teacher matching service
//!
//! Finds teachers whose skills match a free-text query, ranks them by their
//! precomputed rank and attaches short generated descriptions to the best
//! matches.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Enricher, MatchError, TeacherMatcher, ValidSkill, ValidationError};
pub use models::{MatchTeachersRequest, MatchTeachersResponse, MatchedTeacherView, Profile, SkillMatch, Teacher};
pub use services::{DescriptionGenerator, TeacherStore};
