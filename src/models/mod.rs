//! The data records the application persists and the value types they share.

use rusqlite::Row;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

mod collection;
mod expense;
mod password;
mod user;

pub use collection::{Collection, NewCollection};
pub use expense::{Expense, ExpenseUpdate, NewExpense};
pub use password::PasswordHash;
pub use user::{NewUser, Role, User, UserID, UserView, seed_admin_if_empty};

/// Alias for the integer type used for database row IDs.
pub type DatabaseID = i64;

/// The grouped sum and count over a record table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// The sum of all amounts. Zero for an empty table.
    pub total_amount: f64,
    /// The number of records.
    pub total_count: i64,
}

/// Parse a monetary amount from its text form in a multipart field.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] if `raw` is not a number, or is not finite
/// and strictly positive.
pub fn parse_amount(raw: &str) -> Result<f64, Error> {
    let amount: f64 = raw.trim().parse().map_err(|_| Error::InvalidAmount)?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount);
    }

    Ok(amount)
}

/// The current time, truncated to whole seconds to match the database's
/// timestamp resolution.
pub(crate) fn timestamp_now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(OffsetDateTime::now_utc().unix_timestamp())
        .expect("the current time is representable as a unix timestamp")
}

/// Read a unix timestamp column as an [OffsetDateTime].
pub(crate) fn datetime_from_timestamp(
    row: &Row,
    index: usize,
) -> Result<OffsetDateTime, rusqlite::Error> {
    let timestamp: i64 = row.get(index)?;

    OffsetDateTime::from_unix_timestamp(timestamp).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Integer,
            Box::new(error),
        )
    })
}
