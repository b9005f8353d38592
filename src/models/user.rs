//! The user account type, its persistence queries and first-run seeding.

use std::str::FromStr;

use email_address::EmailAddress;
use rusqlite::{
    Connection, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    config::SeedAdmin,
    db::{CreateTable, MapRow},
    models::PasswordHash,
};

/// The ID of a [User].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The integer form of the ID, e.g. for SQL parameters.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// The access level of a [User].
///
/// Members can record expenses and view everything; collections can only be
/// created and deleted by admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including collection management.
    Admin,
    /// Default access level.
    Member,
}

impl Role {
    /// The lowercase string form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "admin" => Ok(Role::Admin),
            "member" => Ok(Role::Member),
            other => Err(format!("unknown role '{other}', expected 'admin' or 'member'")),
        }
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|message: String| FromSqlError::Other(message.into()))
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the database.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The user's email address. Unique across users.
    pub email: EmailAddress,
    /// The bcrypt hash of the user's password.
    pub password_hash: PasswordHash,
    /// The user's access level.
    pub role: Role,
}

/// The representation of a [User] that crosses the wire.
///
/// This is the only user type that is ever serialized into a response, so the
/// password hash cannot leak into one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    /// The user's ID.
    pub id: UserID,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: EmailAddress,
    /// The user's access level.
    pub role: Role,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// A user that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: EmailAddress,
    /// The bcrypt hash of the user's password.
    pub password_hash: PasswordHash,
    /// The user's access level.
    pub role: Role,
}

impl NewUser {
    /// Insert the user into the database and return the stored record.
    ///
    /// # Errors
    ///
    /// Returns [Error::DuplicateEmail] if a user with the same email already
    /// exists, or [Error::SqlError] for other SQL failures.
    pub fn insert(self, connection: &Connection) -> Result<User, Error> {
        connection.execute(
            "INSERT INTO user (name, email, password, role) VALUES (?1, ?2, ?3, ?4)",
            (
                &self.name,
                self.email.as_str(),
                self.password_hash.to_string(),
                self.role,
            ),
        )?;

        let id = UserID::new(connection.last_insert_rowid());

        Ok(User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
        })
    }
}

impl User {
    /// Get the user with the given `id` from the database.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if there is no such user.
    pub fn select_by_id(id: UserID, connection: &Connection) -> Result<User, Error> {
        let user = connection
            .prepare("SELECT id, name, email, password, role FROM user WHERE id = ?1")?
            .query_row([id.as_i64()], User::map_row)?;

        Ok(user)
    }

    /// Get the user with the given `email` from the database.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if there is no such user.
    pub fn select_by_email(email: &EmailAddress, connection: &Connection) -> Result<User, Error> {
        let user = connection
            .prepare("SELECT id, name, email, password, role FROM user WHERE email = ?1")?
            .query_row([email.as_str()], User::map_row)?;

        Ok(user)
    }

    /// Count the registered users.
    pub fn count(connection: &Connection) -> Result<i64, Error> {
        let count = connection
            .prepare("SELECT COUNT(id) FROM user")?
            .query_row((), |row| row.get(0))?;

        Ok(count)
    }
}

impl CreateTable for User {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'member'
            )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for User {
    type ReturnType = Self;

    fn map_row_with_offset(
        row: &rusqlite::Row,
        offset: usize,
    ) -> Result<Self::ReturnType, rusqlite::Error> {
        let raw_email: String = row.get(offset + 2)?;
        let email = EmailAddress::new_unchecked(raw_email);
        let raw_password_hash: String = row.get(offset + 3)?;
        let password_hash = PasswordHash::new_unchecked(raw_password_hash);

        Ok(User {
            id: UserID::new(row.get(offset)?),
            name: row.get(offset + 1)?,
            email,
            password_hash,
            role: row.get(offset + 4)?,
        })
    }
}

/// Create the initial admin account when the user table is empty.
///
/// Without this, a fresh deployment would have no account that can log in.
/// Does nothing when users already exist. Logs a warning when the table is
/// empty but no seed credentials were configured.
pub fn seed_admin_if_empty(
    seed: Option<&SeedAdmin>,
    connection: &Connection,
) -> Result<(), Error> {
    if User::count(connection)? > 0 {
        return Ok(());
    }

    let Some(seed) = seed else {
        tracing::warn!(
            "the user table is empty and no seed admin is configured; \
             no one can log in until a user is added with the add_member tool"
        );
        return Ok(());
    };

    let password_hash =
        PasswordHash::from_raw_password(&seed.password, PasswordHash::DEFAULT_COST)?;

    let user = NewUser {
        name: seed.name.clone(),
        email: seed.email.clone(),
        password_hash,
        role: Role::Admin,
    }
    .insert(connection)?;

    tracing::info!("seeded admin account {} ({})", user.name, user.email);

    Ok(())
}
