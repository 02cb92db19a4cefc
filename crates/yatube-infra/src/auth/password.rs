//! Argon2 password hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use yatube_core::ports::{AuthError, PasswordService};

/// Stored hashes starting with this marker never match any password
/// (accounts created by tooling, or disabled ones).
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';

/// Argon2id, v0x13, with a random salt per hash. Hashes are PHC strings,
/// so verification reads the parameters back from the hash itself and
/// keeps working after the defaults change.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    /// Custom cost parameters, e.g. cheap ones in tests.
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashingError(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        if hash.starts_with(UNUSABLE_PASSWORD_PREFIX) {
            return Ok(false);
        }

        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::HashingError(e.to_string())),
        }
    }
}
