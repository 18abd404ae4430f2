//! Clinic database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::Clinic;

const CLINIC_COLUMNS: &str =
    "id, trade_name, legal_name, specialty, address, rating, active, created_at";

impl Database {
    pub fn insert_clinic(&self, clinic: &Clinic) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO clinics (
                    id, trade_name, legal_name, specialty, address, rating, active, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    clinic.id,
                    clinic.trade_name,
                    clinic.legal_name,
                    clinic.specialty,
                    clinic.address,
                    clinic.rating,
                    clinic.active,
                    clinic.created_at,
                ],
            )
            .map_err(DbError::from_write)?;
        Ok(())
    }

    /// Update the editable fields and the active flag. The rating is owned by
    /// [`Database::refresh_clinic_rating`].
    pub fn update_clinic(&self, clinic: &Clinic) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE clinics SET
                trade_name = ?2,
                legal_name = ?3,
                specialty = ?4,
                address = ?5,
                active = ?6
            WHERE id = ?1
            "#,
            params![
                clinic.id,
                clinic.trade_name,
                clinic.legal_name,
                clinic.specialty,
                clinic.address,
                clinic.active,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn get_clinic(&self, id: &str) -> DbResult<Option<Clinic>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM clinics WHERE id = ?", CLINIC_COLUMNS),
                [id],
                clinic_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List active clinics, optionally restricted to one specialty
    /// (case-insensitive exact match).
    pub fn list_clinics(&self, specialty: Option<&str>) -> DbResult<Vec<Clinic>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {} FROM clinics
            WHERE active = 1
              AND (?1 IS NULL OR specialty = ?1 COLLATE NOCASE)
            ORDER BY trade_name
            "#,
            CLINIC_COLUMNS
        ))?;

        let rows = stmt.query_map([specialty], clinic_from_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn count_clinics(&self) -> DbResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM clinics", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn deactivate_clinic(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("UPDATE clinics SET active = 0 WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Recompute a clinic's rating as the mean score of the ratings attached
    /// to its appointments, persist it and return it.
    pub fn refresh_clinic_rating(&self, clinic_id: &str) -> DbResult<f64> {
        let average: Option<f64> = self.conn.query_row(
            r#"
            SELECT AVG(r.score)
            FROM ratings r
            JOIN appointments a ON a.id = r.appointment_id
            WHERE a.clinic_id = ?
            "#,
            [clinic_id],
            |row| row.get(0),
        )?;
        let rating = average.unwrap_or(0.0);

        let rows_affected = self.conn.execute(
            "UPDATE clinics SET rating = ?2 WHERE id = ?1",
            params![clinic_id, rating],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("clinic {}", clinic_id)));
        }
        Ok(rating)
    }
}

fn clinic_from_row(row: &Row<'_>) -> rusqlite::Result<Clinic> {
    Ok(Clinic {
        id: row.get(0)?,
        trade_name: row.get(1)?,
        legal_name: row.get(2)?,
        specialty: row.get(3)?,
        address: row.get(4)?,
        rating: row.get(5)?,
        active: row.get(6)?,
        created_at: row.get(7)?,
    })
}
