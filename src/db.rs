//! Database initialization and the traits each persisted model implements.

use rusqlite::{Connection, Row, Transaction, TransactionBehavior};

use crate::{
    Error,
    models::{Collection, Expense, User},
};

/// Create the application tables in the database.
///
/// Tables are created with `IF NOT EXISTS`, so calling this on every server
/// start is safe.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction =
        Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    User::create_table(&transaction)?;
    Collection::create_table(&transaction)?;
    Expense::create_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// A type that has a corresponding table in the database.
pub trait CreateTable {
    /// Create the table for the implementing type.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A type that can be created from a database row.
pub trait MapRow {
    /// The type that the row is mapped to, usually `Self`.
    type ReturnType;

    /// Convert a row into a concrete type.
    ///
    /// Fails if the row does not contain the expected columns in the expected
    /// order.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, with columns starting at `offset`.
    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error>;
}
