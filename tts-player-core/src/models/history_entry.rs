use serde::{Deserialize, Serialize};

use super::audio_models::Voice;

/// One past generation request, as kept in the request history.
///
/// Serializable for the JSON history file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub text: String,
    pub voice: Voice,
    pub created_at: String,
}

impl HistoryEntry {
    /// Creates an entry stamped with a fresh id and the current UTC time.
    pub fn new(text: &str, voice: Voice) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            voice,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
