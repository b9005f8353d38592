//! Server configuration read from the process environment.

use std::{env, str::FromStr};

use email_address::EmailAddress;

/// The port the server listens on when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 5000;

/// Errors that can occur while reading the configuration.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("the environment variable {0} must be set")]
    MissingVariable(&'static str),

    /// `PORT` was set to something other than a port number.
    #[error("could not parse '{0}' as a port number")]
    InvalidPort(String),

    /// `SEED_ADMIN_EMAIL` was not a valid email address.
    #[error("'{0}' is not a valid email address")]
    InvalidSeedEmail(String),

    /// Only one of the two seed-admin credentials was set.
    #[error("SEED_ADMIN_EMAIL and SEED_ADMIN_PASSWORD must be set together")]
    IncompleteSeedAdmin,
}

/// Credentials for the Cloudinary account that stores receipt images.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudinaryConfig {
    /// The Cloudinary cloud (account) name, used in API URLs.
    pub cloud_name: String,
    /// The API key sent with each request.
    pub api_key: String,
    /// The API secret used to sign requests. Never sent over the wire.
    pub api_secret: String,
}

/// The admin account created on first run when the user table is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedAdmin {
    /// The admin's display name.
    pub name: String,
    /// The admin's email address.
    pub email: EmailAddress,
    /// The admin's raw password. Hashed before it is stored.
    pub password: String,
}

/// The application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// File path to the SQLite database. Created if it does not exist.
    pub db_path: String,
    /// The port to listen on.
    pub port: u16,
    /// The secret used to sign and verify auth tokens.
    pub jwt_secret: String,
    /// Credentials for the remote receipt store.
    pub cloudinary: CloudinaryConfig,
    /// Optional first-run admin credentials.
    pub seed_admin: Option<SeedAdmin>,
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [ConfigError] naming the first missing or invalid variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`.
    ///
    /// Taking the environment as a function keeps tests independent of (and
    /// from mutating) the process environment.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingVariable(key))
        };

        let db_path = require("DB_PATH")?;
        let jwt_secret = require("JWT_SECRET")?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let cloudinary = CloudinaryConfig {
            cloud_name: require("CLOUDINARY_CLOUD_NAME")?,
            api_key: require("CLOUDINARY_API_KEY")?,
            api_secret: require("CLOUDINARY_API_SECRET")?,
        };

        let seed_admin = match (lookup("SEED_ADMIN_EMAIL"), lookup("SEED_ADMIN_PASSWORD")) {
            (Some(raw_email), Some(password)) => {
                let email = EmailAddress::from_str(raw_email.trim())
                    .map_err(|_| ConfigError::InvalidSeedEmail(raw_email))?;

                Some(SeedAdmin {
                    name: lookup("SEED_ADMIN_NAME")
                        .unwrap_or_else(|| "Administrator".to_owned()),
                    email,
                    password,
                })
            }
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteSeedAdmin),
        };

        Ok(Config {
            db_path,
            port,
            jwt_secret,
            cloudinary,
            seed_admin,
        })
    }
}
