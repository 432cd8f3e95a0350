//! Checklist tasks.

use serde::{Deserialize, Serialize};

use super::error::AlphaTrackError;
use super::lenient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// Tasks a ledger starts with when no task document has ever been stored.
pub fn default_tasks() -> Vec<Task> {
    [
        "Analyze market sentiment",
        "Check economic calendar",
        "Review daily trade plan",
    ]
    .iter()
    .zip(1..)
    .map(|(text, id)| Task {
        id,
        text: text.to_string(),
        completed: false,
    })
    .collect()
}

/// Trim task text, rejecting what is left empty.
pub fn normalize_text(raw: &str) -> Result<String, AlphaTrackError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(AlphaTrackError::validation("text", "must not be empty"));
    }
    Ok(text.to_string())
}
