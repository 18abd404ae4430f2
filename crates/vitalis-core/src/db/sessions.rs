//! Session database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};

/// A persisted login session, keyed by the hash of its bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token_hash: String,
    pub user_id: String,
    pub issued_at: String,
    pub expires_at: String,
}

impl Database {
    pub fn insert_session(&self, session: &Session) -> DbResult<()> {
        self.conn
            .execute(
                "INSERT INTO sessions (token_hash, user_id, issued_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
                params![
                    session.token_hash,
                    session.user_id,
                    session.issued_at,
                    session.expires_at,
                ],
            )
            .map_err(DbError::from_write)?;
        Ok(())
    }

    pub fn get_session(&self, token_hash: &str) -> DbResult<Option<Session>> {
        self.conn
            .query_row(
                "SELECT token_hash, user_id, issued_at, expires_at FROM sessions WHERE token_hash = ?",
                [token_hash],
                |row| {
                    Ok(Session {
                        token_hash: row.get(0)?,
                        user_id: row.get(1)?,
                        issued_at: row.get(2)?,
                        expires_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Delete a session. Returns false if it did not exist.
    pub fn delete_session(&self, token_hash: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM sessions WHERE token_hash = ?", [token_hash])?;
        Ok(rows_affected > 0)
    }

    /// Drop every session of an account.
    pub fn delete_sessions_for_user(&self, user_id: &str) -> DbResult<usize> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM sessions WHERE user_id = ?", [user_id])?;
        Ok(rows_affected)
    }
}
