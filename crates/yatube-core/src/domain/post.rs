use std::fmt;

use serde::{Deserialize, Serialize};

use super::Authored;

/// Characters of text shown by a post's string form.
pub const POST_PREVIEW_CHARS: usize = 15;

/// Post entity - a single authored entry, optionally grouped and illustrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(flatten)]
    pub content: Authored,
    pub group_id: Option<i64>,
    /// Storage path of the attached image, relative to the media root.
    pub image: Option<String>,
}

impl Post {
    pub fn author_id(&self) -> i64 {
        self.content.author_id
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.content.text.chars().take(POST_PREVIEW_CHARS).collect();
        f.write_str(&preview)
    }
}

/// A post that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub content: Authored,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

impl NewPost {
    pub fn new(author_id: i64, text: impl Into<String>) -> Self {
        Self {
            content: Authored::new(author_id, text),
            group_id: None,
            image: None,
        }
    }

    pub fn in_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}
