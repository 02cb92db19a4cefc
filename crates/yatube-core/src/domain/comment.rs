use std::fmt;

use serde::{Deserialize, Serialize};

use super::Authored;

/// A comment under a post. Deleted together with its post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    #[serde(flatten)]
    pub content: Authored,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content.text)
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub content: Authored,
}

impl NewComment {
    pub fn new(post_id: i64, author_id: i64, text: impl Into<String>) -> Self {
        Self {
            post_id,
            content: Authored::new(author_id, text),
        }
    }
}
