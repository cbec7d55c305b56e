use crate::{
    model::Id,
    util::{is_email_address, trimmed_within},
};
use argon2::{
    Argon2,
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::{Debug, Formatter};
use thiserror::Error;

pub const USERNAME_MAX_LEN: usize = 256;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_SALT_LEN: usize = 16;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct IdentityMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct IdentityUser {
    pub id: Id<IdentityMarker>,
    pub username: Username,
    pub password_hash: HashedPassword,
}

impl IdentityUser {
    pub fn register(username: Username, password: &str) -> Result<Self, PasswordHashError> {
        Ok(Self {
            id: Id::new_random(),
            username,
            password_hash: HashedPassword::generate(password)?,
        })
    }
}

/// Login name of an identity. Always an e-mail address.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The username must be an e-mail address of at most 256 characters: {0}")]
pub struct InvalidUsernameError(String);

impl Username {
    pub fn new(username: String) -> Result<Self, InvalidUsernameError> {
        match trimmed_within(&username, USERNAME_MAX_LEN) {
            Some(trimmed) if is_email_address(trimmed) => Ok(Self(trimmed.to_owned())),
            _ => Err(InvalidUsernameError(username)),
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Username::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Username"))
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The password must be at least 6 characters long")]
pub struct InvalidPasswordError;

/// Checks a plaintext password before it gets hashed.
pub fn validate_password(password: &str) -> Result<(), InvalidPasswordError> {
    if password.chars().count() >= PASSWORD_MIN_LEN {
        Ok(())
    } else {
        Err(InvalidPasswordError)
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing password failed: {0}")]
pub struct PasswordHashError(password_hash::Error);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The stored password hash is not a valid PHC string")]
pub struct InvalidPasswordHashError;

/// Argon2 hash of a password in PHC string format.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct HashedPassword(String);

impl HashedPassword {
    pub fn generate(password: &str) -> Result<Self, PasswordHashError> {
        let salt_bytes: [u8; PASSWORD_SALT_LEN] = rand::random();
        let salt = SaltString::encode_b64(&salt_bytes).map_err(PasswordHashError)?;

        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(PasswordHashError)?;

        Ok(Self(hash.to_string()))
    }

    /// Returns `Ok(false)` for a wrong password and `Err` only if the stored hash is unusable.
    pub fn verify(&self, password: &str) -> Result<bool, PasswordHashError> {
        let hash = PasswordHash::new(&self.0).map_err(PasswordHashError)?;

        match Argon2::default().verify_password(password.as_bytes(), &hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError(err)),
        }
    }

    #[must_use]
    pub fn as_phc_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for HashedPassword {
    type Error = InvalidPasswordHashError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PasswordHash::new(&value).map_err(|_| InvalidPasswordHashError)?;
        Ok(Self(value))
    }
}

impl Debug for HashedPassword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HashedPassword")
            .field(&"[redacted]")
            .finish()
    }
}
