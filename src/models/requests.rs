use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request to match teachers for a skill
///
/// `skill` is kept as raw JSON so the validator can reject non-text input
/// with a proper message instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchTeachersRequest {
    #[serde(default)]
    pub skill: Value,
}
