//! Form validation.
//!
//! Each `clean_*` function turns a raw payload from `yatube_shared::dto` into
//! typed values or a set of field errors. Checks that need storage (unique
//! username, existing group) are added by the services on top.

use std::collections::BTreeMap;

use serde::Serialize;

use yatube_shared::dto::{
    CommentFormData, LoginFormData, PasswordChangeFormData, PostFormData, SignupFormData,
    UnreadableField,
};

use crate::ports::Upload;

/// Key for errors that belong to the form as a whole.
pub const NON_FIELD: &str = "__all__";

pub const REQUIRED: &str = "This field is required.";
pub const USERNAME_MAX_LEN: usize = 150;
pub const NAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;

/// Error messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field(&self) -> &[String] {
        self.field(NON_FIELD)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Submitted values plus the errors found in them - what a rejected form is
/// redisplayed with. An unbound form has no errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoundForm<D> {
    pub data: D,
    pub errors: FormErrors,
}

impl<D: Default> BoundForm<D> {
    pub fn unbound() -> Self {
        Self::default()
    }
}

impl<D> BoundForm<D> {
    pub fn new(data: D, errors: FormErrors) -> Self {
        Self { data, errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Image formats accepted for posts, recognized by their magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Gif,
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPost {
    pub text: String,
    pub group_id: Option<i64>,
    pub clear_image: bool,
}

pub fn clean_post(data: &PostFormData) -> Result<CleanPost, FormErrors> {
    let mut errors = FormErrors::new();

    for (field, problem) in &data.unreadable {
        errors.add(field, unreadable_message(*problem));
    }
    if data.text.trim().is_empty() && !data.is_unreadable("text") {
        errors.add("text", REQUIRED);
    }

    let group = data.group.trim();
    let group_id = if group.is_empty() {
        None
    } else {
        match group.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("group", invalid_choice());
                None
            }
        }
    };

    errors.into_result(CleanPost {
        text: data.text.clone(),
        group_id,
        clear_image: data.clear_image,
    })
}

pub fn unreadable_message(problem: UnreadableField) -> String {
    match problem {
        UnreadableField::TooLong { limit } => {
            format!("Ensure this value has at most {limit} bytes.")
        }
        UnreadableField::NotUtf8 => "Enter text in UTF-8 encoding.".to_string(),
    }
}

pub fn invalid_choice() -> String {
    "Select a valid choice. That choice is not one of the available choices.".to_string()
}

/// Check an uploaded image, returning its detected format.
pub fn clean_image(upload: &Upload, max_bytes: usize) -> Result<ImageFormat, String> {
    if upload.data.is_empty() {
        return Err("The submitted file is empty.".to_string());
    }
    if upload.data.len() > max_bytes {
        return Err(format!(
            "The image is too large ({} bytes, limit {}).",
            upload.data.len(),
            max_bytes
        ));
    }
    ImageFormat::sniff(&upload.data).ok_or_else(|| {
        "Upload a valid image. The file you uploaded was either not an image or a corrupted image."
            .to_string()
    })
}

pub fn clean_comment(data: &CommentFormData) -> Result<String, FormErrors> {
    let mut errors = FormErrors::new();
    if data.text.trim().is_empty() {
        errors.add("text", REQUIRED);
    }
    errors.into_result(data.text.clone())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanSignup {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

pub fn clean_signup(data: &SignupFormData) -> Result<CleanSignup, FormErrors> {
    let mut errors = FormErrors::new();

    let username = data.username.trim();
    if username.is_empty() {
        errors.add("username", REQUIRED);
    } else if username.chars().count() > USERNAME_MAX_LEN {
        errors.add(
            "username",
            format!(
                "Ensure this value has at most {} characters.",
                USERNAME_MAX_LEN
            ),
        );
    } else if !is_valid_username(username) {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }

    for (field, value) in [("first_name", &data.first_name), ("last_name", &data.last_name)] {
        if value.trim().chars().count() > NAME_MAX_LEN {
            errors.add(
                field,
                format!("Ensure this value has at most {} characters.", NAME_MAX_LEN),
            );
        }
    }

    let email = data.email.trim();
    if !email.is_empty() && !is_plausible_email(email) {
        errors.add("email", "Enter a valid email address.");
    }

    check_new_password(
        &data.password1,
        &data.password2,
        "password1",
        "password2",
        &mut errors,
    );

    errors.into_result(CleanSignup {
        username: username.to_string(),
        first_name: data.first_name.trim().to_string(),
        last_name: data.last_name.trim().to_string(),
        email: email.to_string(),
        password: data.password1.clone(),
    })
}

pub fn clean_login(data: &LoginFormData) -> Result<(String, String), FormErrors> {
    let mut errors = FormErrors::new();
    if data.username.trim().is_empty() {
        errors.add("username", REQUIRED);
    }
    if data.password.is_empty() {
        errors.add("password", REQUIRED);
    }
    errors.into_result((data.username.trim().to_string(), data.password.clone()))
}

/// Validates the shape of a password change; the old password is checked
/// against the stored hash by the account service.
pub fn clean_password_change(data: &PasswordChangeFormData) -> Result<String, FormErrors> {
    let mut errors = FormErrors::new();
    if data.old_password.is_empty() {
        errors.add("old_password", REQUIRED);
    }
    check_new_password(
        &data.new_password1,
        &data.new_password2,
        "new_password1",
        "new_password2",
        &mut errors,
    );
    errors.into_result(data.new_password1.clone())
}

fn check_new_password(
    password1: &str,
    password2: &str,
    field1: &str,
    field2: &str,
    errors: &mut FormErrors,
) {
    if password1.is_empty() {
        errors.add(field1, REQUIRED);
        return;
    }
    if password2.is_empty() {
        errors.add(field2, REQUIRED);
        return;
    }
    if password1 != password2 {
        errors.add(field2, "The two password fields didn't match.");
        return;
    }
    if password1.chars().count() < PASSWORD_MIN_LEN {
        errors.add(
            field2,
            format!(
                "This password is too short. It must contain at least {} characters.",
                PASSWORD_MIN_LEN
            ),
        );
    }
    if password1.chars().all(|c| c.is_ascii_digit()) {
        errors.add(field2, "This password is entirely numeric.");
    }
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}
