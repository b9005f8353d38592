//! The password hash type used for user credentials.

use std::fmt::{Debug, Display, Formatter};

use crate::Error;

/// A salted bcrypt hash of a user's password.
///
/// Raw passwords are never persisted, only hashes.
#[derive(Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The default bcrypt cost factor used when hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `raw_password` with the given bcrypt `cost`.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt fails to hash the password.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        let hash = bcrypt::hash(raw_password, cost)
            .map_err(|error| Error::HashingError(error.to_string()))?;

        Ok(Self(hash))
    }

    /// Create a password hash from a string that is already a bcrypt hash.
    ///
    /// This function should only be used when reading hashes from the
    /// database or when creating test fixtures.
    pub fn new_unchecked(raw_hash: String) -> Self {
        Self(raw_hash)
    }

    /// Check whether `raw_password` matches this hash.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the stored hash could not be parsed.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        bcrypt::verify(raw_password, &self.0)
            .map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Keeps hashes out of debug logs.
impl Debug for PasswordHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "PasswordHash(***)")
    }
}
