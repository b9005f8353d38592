//! The expense record type (money spent by the organization) and its
//! persistence queries.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, Totals, datetime_from_timestamp},
};

/// Money spent by the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The record's ID in the database.
    pub id: DatabaseID,
    /// The amount spent. Always finite and greater than zero.
    pub amount: f64,
    /// What the money was spent on.
    pub description: String,
    /// The broader purpose of the expense, e.g. the event it belongs to.
    pub purpose: String,
    /// Who spent the money.
    pub spent_by: String,
    /// The URL of the receipt image in the remote store, if one was attached.
    pub receipt_url: Option<String>,
    /// When the expense was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// An expense record that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// The amount spent.
    pub amount: f64,
    /// What the money was spent on.
    pub description: String,
    /// The broader purpose of the expense.
    pub purpose: String,
    /// Who spent the money.
    pub spent_by: String,
    /// The URL of the uploaded receipt, if any.
    pub receipt_url: Option<String>,
    /// When the expense was recorded.
    pub date: OffsetDateTime,
}

impl NewExpense {
    /// Insert the record into the database and return the stored record.
    pub fn insert(self, connection: &Connection) -> Result<Expense, Error> {
        connection.execute(
            "INSERT INTO expense (amount, description, purpose, spent_by, receipt_url, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                self.amount,
                &self.description,
                &self.purpose,
                &self.spent_by,
                &self.receipt_url,
                self.date.unix_timestamp(),
            ),
        )?;

        Ok(Expense {
            id: connection.last_insert_rowid(),
            amount: self.amount,
            description: self.description,
            purpose: self.purpose,
            spent_by: self.spent_by,
            receipt_url: self.receipt_url,
            date: self.date,
        })
    }
}

/// Replacement values for an existing [Expense].
///
/// The record's date is kept as-is; everything else is replaced.
#[derive(Debug, Clone)]
pub struct ExpenseUpdate {
    /// The new amount.
    pub amount: f64,
    /// The new description.
    pub description: String,
    /// The new purpose.
    pub purpose: String,
    /// The new spender.
    pub spent_by: String,
    /// The receipt URL to store. The caller decides whether this is a newly
    /// uploaded receipt or the previous one.
    pub receipt_url: Option<String>,
}

impl ExpenseUpdate {
    /// Apply the update to the expense with the given `id` and return the
    /// updated record.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if there is no such record.
    pub fn apply(self, id: DatabaseID, connection: &Connection) -> Result<Expense, Error> {
        let rows_affected = connection.execute(
            "UPDATE expense SET amount = ?1, description = ?2, purpose = ?3, spent_by = ?4, receipt_url = ?5
             WHERE id = ?6",
            (
                self.amount,
                &self.description,
                &self.purpose,
                &self.spent_by,
                &self.receipt_url,
                id,
            ),
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Expense::select(id, connection)
    }
}

impl Expense {
    /// Get all expense records, most recent first.
    pub fn select_all(connection: &Connection) -> Result<Vec<Expense>, Error> {
        let expenses = connection
            .prepare(
                "SELECT id, amount, description, purpose, spent_by, receipt_url, date
                 FROM expense ORDER BY date DESC, id DESC",
            )?
            .query_map((), Expense::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    /// Get the expense record with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if there is no such record.
    pub fn select(id: DatabaseID, connection: &Connection) -> Result<Expense, Error> {
        let expense = connection
            .prepare(
                "SELECT id, amount, description, purpose, spent_by, receipt_url, date
                 FROM expense WHERE id = ?1",
            )?
            .query_row([id], Expense::map_row)?;

        Ok(expense)
    }

    /// Delete the expense record with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if there is no such record.
    pub fn delete(id: DatabaseID, connection: &Connection) -> Result<(), Error> {
        let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Sum and count all expense records in a single grouped query.
    pub fn total(connection: &Connection) -> Result<Totals, Error> {
        let totals = connection
            .prepare("SELECT COALESCE(SUM(amount), 0.0), COUNT(id) FROM expense")?
            .query_row((), |row| {
                Ok(Totals {
                    total_amount: row.get(0)?,
                    total_count: row.get(1)?,
                })
            })?;

        Ok(totals)
    }
}

impl CreateTable for Expense {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY,
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                purpose TEXT NOT NULL,
                spent_by TEXT NOT NULL,
                receipt_url TEXT,
                date INTEGER NOT NULL
            )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for Expense {
    type ReturnType = Self;

    fn map_row_with_offset(
        row: &rusqlite::Row,
        offset: usize,
    ) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Expense {
            id: row.get(offset)?,
            amount: row.get(offset + 1)?,
            description: row.get(offset + 2)?,
            purpose: row.get(offset + 3)?,
            spent_by: row.get(offset + 4)?,
            receipt_url: row.get(offset + 5)?,
            date: datetime_from_timestamp(row, offset + 6)?,
        })
    }
}
