//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{format_date, parse_date, Database, DbError, DbResult};
use crate::models::Patient;

const PATIENT_COLUMNS: &str = r#"
    id, name, cpf, email, phone, birth_date, address, medical_history, active, created_at
"#;

impl Database {
    /// Insert a new patient. A taken email or cpf surfaces as `DbError::Duplicate`.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO patients (
                    id, name, cpf, email, phone, birth_date,
                    address, medical_history, active, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    patient.id,
                    patient.name,
                    patient.cpf,
                    patient.email,
                    patient.phone,
                    format_date(&patient.birth_date),
                    patient.address,
                    patient.medical_history,
                    patient.active,
                    patient.created_at,
                ],
            )
            .map_err(DbError::from_write)?;
        Ok(())
    }

    /// Update an existing patient.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute(
                r#"
                UPDATE patients SET
                    name = ?2,
                    cpf = ?3,
                    email = ?4,
                    phone = ?5,
                    birth_date = ?6,
                    address = ?7,
                    medical_history = ?8,
                    active = ?9
                WHERE id = ?1
                "#,
                params![
                    patient.id,
                    patient.name,
                    patient.cpf,
                    patient.email,
                    patient.phone,
                    format_date(&patient.birth_date),
                    patient.address,
                    patient.medical_history,
                    patient.active,
                ],
            )
            .map_err(DbError::from_write)?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by id.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.query_patient("id", id)
    }

    pub fn get_patient_by_email(&self, email: &str) -> DbResult<Option<Patient>> {
        self.query_patient("email", email)
    }

    pub fn get_patient_by_cpf(&self, cpf: &str) -> DbResult<Option<Patient>> {
        self.query_patient("cpf", cpf)
    }

    fn query_patient(&self, column: &str, value: &str) -> DbResult<Option<Patient>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE {} = ?", PATIENT_COLUMNS, column),
                [value],
                PatientRow::from_row,
            )
            .optional()?;
        row.map(Patient::try_from).transpose()
    }

    /// List all patients.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients ORDER BY name",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map([], PatientRow::from_row)?;

        rows.map(|r| r.map_err(DbError::from).and_then(Patient::try_from))
            .collect()
    }

    /// Soft-delete a patient.
    pub fn deactivate_patient(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("UPDATE patients SET active = 0 WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Raw row from the patients table.
struct PatientRow {
    id: String,
    name: String,
    cpf: String,
    email: String,
    phone: String,
    birth_date: String,
    address: Option<String>,
    medical_history: Option<String>,
    active: bool,
    created_at: String,
}

impl PatientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            cpf: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            birth_date: row.get(5)?,
            address: row.get(6)?,
            medical_history: row.get(7)?,
            active: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: row.id,
            name: row.name,
            cpf: row.cpf,
            email: row.email,
            phone: row.phone,
            birth_date: parse_date(&row.birth_date)?,
            address: row.address,
            medical_history: row.medical_history,
            active: row.active,
            created_at: row.created_at,
        })
    }
}
