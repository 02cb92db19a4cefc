use std::sync::Arc;

use yatube_shared::dto::{LoginFormData, PasswordChangeFormData, SignupFormData};

use super::Submission;
use crate::domain::{NewUser, User};
use crate::error::{DomainError, RepoError};
use crate::forms::{self, BoundForm, FormErrors, NON_FIELD};
use crate::ports::{AuthError, PasswordService, SessionTokens, UserRepository};

/// A signed-in user and the token for their session cookie.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub token: String,
}

/// Signup, login, session resolution and password change.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn SessionTokens>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        passwords: Arc<dyn PasswordService>,
        tokens: Arc<dyn SessionTokens>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    pub fn session_lifetime(&self) -> std::time::Duration {
        self.tokens.lifetime()
    }

    pub async fn signup(
        &self,
        data: SignupFormData,
    ) -> Result<Submission<Session, BoundForm<SignupFormData>>, DomainError> {
        let clean = match forms::clean_signup(&data) {
            Ok(clean) => clean,
            Err(errors) => return Ok(Submission::Rejected(redisplay_signup(data, errors))),
        };

        if self.users.find_by_username(&clean.username).await?.is_some() {
            let mut errors = FormErrors::new();
            errors.add("username", "A user with that username already exists.");
            return Ok(Submission::Rejected(redisplay_signup(data, errors)));
        }

        let password_hash = self.passwords.hash(&clean.password).map_err(internal)?;
        let new_user = NewUser {
            username: clean.username,
            first_name: clean.first_name,
            last_name: clean.last_name,
            email: clean.email,
            password_hash,
        };

        let user = match self.users.create(new_user).await {
            Ok(user) => user,
            // Lost a race with another signup for the same name.
            Err(RepoError::Constraint(_)) => {
                let mut errors = FormErrors::new();
                errors.add("username", "A user with that username already exists.");
                return Ok(Submission::Rejected(redisplay_signup(data, errors)));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        let token = self.issue(&user)?;
        Ok(Submission::Accepted(Session { user, token }))
    }

    pub async fn login(
        &self,
        data: LoginFormData,
    ) -> Result<Submission<Session, BoundForm<LoginFormData>>, DomainError> {
        let (username, password) = match forms::clean_login(&data) {
            Ok(creds) => creds,
            Err(errors) => return Ok(Submission::Rejected(redisplay_login(data, errors))),
        };

        let user = self.users.find_by_username(&username).await?;
        let verified = match &user {
            Some(user) => self
                .passwords
                .verify(&password, &user.password_hash)
                .map_err(internal)?,
            None => false,
        };

        match user {
            Some(user) if verified => {
                tracing::info!(user_id = user.id, "User logged in");
                let token = self.issue(&user)?;
                Ok(Submission::Accepted(Session { user, token }))
            }
            _ => {
                tracing::warn!(username = %username, "Failed login attempt");
                let mut errors = FormErrors::new();
                errors.add(
                    NON_FIELD,
                    "Please enter a correct username and password. Note that both fields may be case-sensitive.",
                );
                Ok(Submission::Rejected(redisplay_login(data, errors)))
            }
        }
    }

    /// Resolve a session cookie to its user. Invalid, expired or orphaned
    /// tokens resolve to `None`.
    pub async fn authenticate(&self, token: &str) -> Result<Option<User>, DomainError> {
        let claims = match self.tokens.validate(token) {
            Ok(claims) => claims,
            Err(AuthError::TokenExpired) => {
                tracing::debug!("Session token expired");
                return Ok(None);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected session token");
                return Ok(None);
            }
        };

        Ok(self.users.find_by_id(claims.user_id).await?)
    }

    pub async fn change_password(
        &self,
        user: &User,
        data: PasswordChangeFormData,
    ) -> Result<Submission<(), BoundForm<PasswordChangeFormData>>, DomainError> {
        let new_password = match forms::clean_password_change(&data) {
            Ok(password) => password,
            Err(errors) => return Ok(Submission::Rejected(redisplay_password_change(errors))),
        };

        let old_ok = self
            .passwords
            .verify(&data.old_password, &user.password_hash)
            .map_err(internal)?;
        if !old_ok {
            let mut errors = FormErrors::new();
            errors.add(
                "old_password",
                "Your old password was entered incorrectly. Please enter it again.",
            );
            return Ok(Submission::Rejected(redisplay_password_change(errors)));
        }

        let hash = self.passwords.hash(&new_password).map_err(internal)?;
        self.users.set_password(user.id, &hash).await?;

        tracing::info!(user_id = user.id, "Password changed");
        Ok(Submission::Accepted(()))
    }

    fn issue(&self, user: &User) -> Result<String, DomainError> {
        self.tokens.issue(user.id, &user.username).map_err(internal)
    }
}

fn internal(err: AuthError) -> DomainError {
    DomainError::Internal(err.to_string())
}

// Rejected forms never echo passwords back.

fn redisplay_signup(data: SignupFormData, errors: FormErrors) -> BoundForm<SignupFormData> {
    BoundForm::new(
        SignupFormData {
            password1: String::new(),
            password2: String::new(),
            ..data
        },
        errors,
    )
}

fn redisplay_login(data: LoginFormData, errors: FormErrors) -> BoundForm<LoginFormData> {
    BoundForm::new(
        LoginFormData {
            password: String::new(),
            ..data
        },
        errors,
    )
}

fn redisplay_password_change(errors: FormErrors) -> BoundForm<PasswordChangeFormData> {
    BoundForm::new(PasswordChangeFormData::default(), errors)
}
