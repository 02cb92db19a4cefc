use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const GROUP_TITLE_MAX_LEN: usize = 200;

/// A named category posts may belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl NewGroup {
    /// Validate title length and slug charset (`[-a-zA-Z0-9_]+`).
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let title = title.into().trim().to_string();
        let slug = slug.into().trim().to_string();

        if title.is_empty() {
            return Err(DomainError::Validation("Group title is required".into()));
        }
        if title.chars().count() > GROUP_TITLE_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "Group title must be at most {} characters",
                GROUP_TITLE_MAX_LEN
            )));
        }
        if !is_valid_slug(&slug) {
            return Err(DomainError::Validation(format!(
                "Invalid slug {:?}: use letters, digits, hyphens or underscores",
                slug
            )));
        }

        Ok(Self {
            title,
            slug,
            description: description.into(),
        })
    }
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
