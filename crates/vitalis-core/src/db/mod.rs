//! Database layer for vitalis.

mod schema;
mod users;
mod sessions;
mod patients;
mod clinics;
mod procedures;
mod appointments;
mod records;
mod ratings;
mod requisitions;

pub use schema::*;
pub use appointments::RevenueRow;
pub use sessions::Session;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Storage format of appointment date-times.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Storage format of calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Duplicate value: {0}")]
    Duplicate(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Classify a write error, surfacing unique/primary key violations as `Duplicate`.
    pub(crate) fn from_write(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            {
                return DbError::Duplicate(message.clone().unwrap_or_default());
            }
        }
        DbError::Sqlite(err)
    }
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` as one unit of work.
    ///
    /// Commits when `f` returns `Ok`. An `Err` or a panic drops the
    /// transaction, which rolls everything back. Units of work do not nest.
    pub fn atomic<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Database) -> Result<T, E>,
        E: From<DbError>,
    {
        let tx = self.conn.unchecked_transaction().map_err(DbError::from)?;
        let value = f(self)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }
}

pub(crate) fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn parse_datetime(value: &str) -> DbResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|e| DbError::Constraint(format!("Invalid date-time '{}': {}", value, e)))
}

pub(crate) fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(value: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| DbError::Constraint(format!("Invalid date '{}': {}", value, e)))
}

pub(crate) fn parse_decimal(value: &str) -> DbResult<Decimal> {
    Decimal::from_str(value)
        .map_err(|e| DbError::Constraint(format!("Invalid decimal '{}': {}", value, e)))
}
