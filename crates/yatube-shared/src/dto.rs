//! Form payloads - what the browser submits, before validation.
//!
//! Every field is a raw string: parsing and validation belong to
//! `yatube_core::forms`, which reports field-level errors back against
//! these same values so a rejected form can be redisplayed as typed.

use serde::{Deserialize, Serialize};

/// `?page=` query parameter shared by every listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// `?next=` query parameter used by the login redirect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Post create/edit form (the image travels separately as an upload).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFormData {
    #[serde(default)]
    pub text: String,
    /// Group id as submitted by the `<select>`; empty means "no group".
    #[serde(default)]
    pub group: String,
    /// Set by the "clear image" checkbox on the edit form.
    #[serde(default, rename = "image-clear")]
    pub clear_image: bool,
    /// Fields the body reader had to give up on, reported back as field
    /// errors instead of being stored partially.
    #[serde(skip)]
    pub unreadable: Vec<(String, UnreadableField)>,
}

impl PostFormData {
    pub fn is_unreadable(&self, field: &str) -> bool {
        self.unreadable.iter().any(|(name, _)| name == field)
    }
}

/// Why a submitted form field could not be taken as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreadableField {
    TooLong { limit: usize },
    NotUtf8,
}

/// Comment form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentFormData {
    #[serde(default)]
    pub text: String,
}

/// Account registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupFormData {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Login form. `next` is carried through a hidden input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginFormData {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Password change form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChangeFormData {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password1: String,
    #[serde(default)]
    pub new_password2: String,
}
