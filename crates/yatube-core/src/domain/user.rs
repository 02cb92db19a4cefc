use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity - an account that can write posts, comment and follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// "First Last", falling back to the username when both are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// A user that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password_hash: password_hash.into(),
        }
    }
}
