use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field set shared by everything a user writes: the text, who wrote it and
/// when. Embedded in [`Post`](super::Post) and [`Comment`](super::Comment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authored {
    pub author_id: i64,
    pub text: String,
    /// Assigned once on creation, never updated.
    pub created: DateTime<Utc>,
}

impl Authored {
    pub fn new(author_id: i64, text: impl Into<String>) -> Self {
        Self {
            author_id,
            text: text.into(),
            created: Utc::now(),
        }
    }

    pub fn is_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }
}
