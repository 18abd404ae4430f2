//! Rating database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::Rating;

impl Database {
    /// Insert a rating. A second rating for the same appointment surfaces
    /// as `DbError::Duplicate`.
    pub fn insert_rating(&self, rating: &Rating) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO ratings (id, appointment_id, score, comment, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    rating.id,
                    rating.appointment_id,
                    rating.score,
                    rating.comment,
                    rating.created_at,
                ],
            )
            .map_err(DbError::from_write)?;
        Ok(())
    }

    pub fn get_rating_for_appointment(&self, appointment_id: &str) -> DbResult<Option<Rating>> {
        self.conn
            .query_row(
                r#"
                SELECT id, appointment_id, score, comment, created_at
                FROM ratings
                WHERE appointment_id = ?
                "#,
                [appointment_id],
                |row| {
                    Ok(Rating {
                        id: row.get(0)?,
                        appointment_id: row.get(1)?,
                        score: row.get(2)?,
                        comment: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }
}
