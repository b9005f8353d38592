//! The collection record type (money collected from a member) and its
//! persistence queries.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    db::{CreateTable, MapRow},
    models::{DatabaseID, Totals, datetime_from_timestamp},
};

/// Money collected from a member of the organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// The record's ID in the database.
    pub id: DatabaseID,
    /// The amount collected. Always finite and greater than zero.
    pub amount: f64,
    /// Who collected the money.
    pub collected_by: String,
    /// Who the money was collected from.
    pub collected_from: String,
    /// Free-text notes. May be empty.
    pub description: String,
    /// The URL of the receipt image in the remote store, if one was attached.
    pub receipt_url: Option<String>,
    /// When the collection was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// A collection record that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct NewCollection {
    /// The amount collected.
    pub amount: f64,
    /// Who collected the money.
    pub collected_by: String,
    /// Who the money was collected from.
    pub collected_from: String,
    /// Free-text notes.
    pub description: String,
    /// The URL of the uploaded receipt, if any.
    pub receipt_url: Option<String>,
    /// When the collection was recorded.
    pub date: OffsetDateTime,
}

impl NewCollection {
    /// Insert the record into the database and return the stored record.
    pub fn insert(self, connection: &Connection) -> Result<Collection, Error> {
        connection.execute(
            "INSERT INTO collection (amount, collected_by, collected_from, description, receipt_url, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                self.amount,
                &self.collected_by,
                &self.collected_from,
                &self.description,
                &self.receipt_url,
                self.date.unix_timestamp(),
            ),
        )?;

        Ok(Collection {
            id: connection.last_insert_rowid(),
            amount: self.amount,
            collected_by: self.collected_by,
            collected_from: self.collected_from,
            description: self.description,
            receipt_url: self.receipt_url,
            date: self.date,
        })
    }
}

impl Collection {
    /// Get all collection records, most recent first.
    pub fn select_all(connection: &Connection) -> Result<Vec<Collection>, Error> {
        let collections = connection
            .prepare(
                "SELECT id, amount, collected_by, collected_from, description, receipt_url, date
                 FROM collection ORDER BY date DESC, id DESC",
            )?
            .query_map((), Collection::map_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(collections)
    }

    /// Get the collection record with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if there is no such record.
    pub fn select(id: DatabaseID, connection: &Connection) -> Result<Collection, Error> {
        let collection = connection
            .prepare(
                "SELECT id, amount, collected_by, collected_from, description, receipt_url, date
                 FROM collection WHERE id = ?1",
            )?
            .query_row([id], Collection::map_row)?;

        Ok(collection)
    }

    /// Delete the collection record with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if there is no such record.
    pub fn delete(id: DatabaseID, connection: &Connection) -> Result<(), Error> {
        let rows_affected = connection.execute("DELETE FROM collection WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }

    /// Sum and count all collection records in a single grouped query.
    pub fn total(connection: &Connection) -> Result<Totals, Error> {
        let totals = connection
            .prepare("SELECT COALESCE(SUM(amount), 0.0), COUNT(id) FROM collection")?
            .query_row((), |row| {
                Ok(Totals {
                    total_amount: row.get(0)?,
                    total_count: row.get(1)?,
                })
            })?;

        Ok(totals)
    }
}

impl CreateTable for Collection {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute(
            "CREATE TABLE IF NOT EXISTS collection (
                id INTEGER PRIMARY KEY,
                amount REAL NOT NULL,
                collected_by TEXT NOT NULL,
                collected_from TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                receipt_url TEXT,
                date INTEGER NOT NULL
            )",
            (),
        )?;

        Ok(())
    }
}

impl MapRow for Collection {
    type ReturnType = Self;

    fn map_row_with_offset(
        row: &rusqlite::Row,
        offset: usize,
    ) -> Result<Self::ReturnType, rusqlite::Error> {
        Ok(Collection {
            id: row.get(offset)?,
            amount: row.get(offset + 1)?,
            collected_by: row.get(offset + 2)?,
            collected_from: row.get(offset + 3)?,
            description: row.get(offset + 4)?,
            receipt_url: row.get(offset + 5)?,
            date: datetime_from_timestamp(row, offset + 6)?,
        })
    }
}
