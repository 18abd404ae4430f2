//! Clinical record database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::ClinicalRecord;

impl Database {
    /// Insert a record. A second record for the same appointment surfaces
    /// as `DbError::Duplicate`.
    pub fn insert_record(&self, record: &ClinicalRecord) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO clinical_records (
                    id, appointment_id, symptoms, diagnosis, prescription, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    record.id,
                    record.appointment_id,
                    record.symptoms,
                    record.diagnosis,
                    record.prescription,
                    record.created_at,
                ],
            )
            .map_err(DbError::from_write)?;
        Ok(())
    }

    pub fn get_record_for_appointment(
        &self,
        appointment_id: &str,
    ) -> DbResult<Option<ClinicalRecord>> {
        self.conn
            .query_row(
                r#"
                SELECT id, appointment_id, symptoms, diagnosis, prescription, created_at
                FROM clinical_records
                WHERE appointment_id = ?
                "#,
                [appointment_id],
                |row| {
                    Ok(ClinicalRecord {
                        id: row.get(0)?,
                        appointment_id: row.get(1)?,
                        symptoms: row.get(2)?,
                        diagnosis: row.get(3)?,
                        prescription: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }
}
