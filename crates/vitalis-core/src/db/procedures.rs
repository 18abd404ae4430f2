//! Procedure catalog database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_decimal, Database, DbError, DbResult};
use crate::models::{Procedure, ProcedureListing};

const LISTING_SELECT: &str = r#"
    SELECT p.id, p.clinic_id, p.name, p.description, p.price,
           p.duration_minutes, p.available, c.trade_name
    FROM procedures p
    JOIN clinics c ON c.id = p.clinic_id
"#;

impl Database {
    pub fn insert_procedure(&self, procedure: &Procedure) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO procedures (
                    id, clinic_id, name, description, price, duration_minutes, available
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    procedure.id,
                    procedure.clinic_id,
                    procedure.name,
                    procedure.description,
                    procedure.price.to_string(),
                    procedure.duration_minutes,
                    procedure.available,
                ],
            )
            .map_err(DbError::from_write)?;
        Ok(())
    }

    pub fn get_procedure(&self, id: &str) -> DbResult<Option<Procedure>> {
        Ok(self.get_procedure_listing(id)?.map(|listing| listing.procedure))
    }

    /// Get a procedure with its clinic's trade name.
    pub fn get_procedure_listing(&self, id: &str) -> DbResult<Option<ProcedureListing>> {
        let row = self
            .conn
            .query_row(
                &format!("{} WHERE p.id = ?", LISTING_SELECT),
                [id],
                ListingRow::from_row,
            )
            .optional()?;
        row.map(ProcedureListing::try_from).transpose()
    }

    /// Available procedures of one clinic, by name.
    pub fn list_available_procedures(&self, clinic_id: &str) -> DbResult<Vec<ProcedureListing>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE p.clinic_id = ? AND p.available = 1 ORDER BY p.name",
            LISTING_SELECT
        ))?;

        let rows = stmt.query_map([clinic_id], ListingRow::from_row)?;

        rows.map(|r| r.map_err(DbError::from).and_then(ProcedureListing::try_from))
            .collect()
    }

    /// Procedures linked to an appointment, in booking order.
    pub fn list_appointment_procedures(
        &self,
        appointment_id: &str,
    ) -> DbResult<Vec<ProcedureListing>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"{}
            JOIN appointment_procedures ap ON ap.procedure_id = p.id
            WHERE ap.appointment_id = ?
            ORDER BY ap.position
            "#,
            LISTING_SELECT
        ))?;

        let rows = stmt.query_map([appointment_id], ListingRow::from_row)?;

        rows.map(|r| r.map_err(DbError::from).and_then(ProcedureListing::try_from))
            .collect()
    }
}

/// Raw joined procedure + clinic name row.
struct ListingRow {
    id: String,
    clinic_id: String,
    name: String,
    description: Option<String>,
    price: String,
    duration_minutes: u32,
    available: bool,
    clinic_name: String,
}

impl ListingRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            clinic_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            price: row.get(4)?,
            duration_minutes: row.get(5)?,
            available: row.get(6)?,
            clinic_name: row.get(7)?,
        })
    }
}

impl TryFrom<ListingRow> for ProcedureListing {
    type Error = DbError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        Ok(ProcedureListing {
            procedure: Procedure {
                id: row.id,
                clinic_id: row.clinic_id,
                name: row.name,
                description: row.description,
                price: parse_decimal(&row.price)?,
                duration_minutes: row.duration_minutes,
                available: row.available,
            },
            clinic_name: row.clinic_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Clinic, ClinicInput, ProcedureInput};
    use rust_decimal::Decimal;

    fn setup_db() -> (Database, Clinic) {
        let db = Database::open_in_memory().unwrap();
        let clinic = Clinic::from_input(ClinicInput {
            trade_name: "CardioPulse".into(),
            legal_name: "CardioPulse LTDA".into(),
            specialty: "Cardiology".into(),
            address: "Av. Paulista, 1000".into(),
        });
        db.insert_clinic(&clinic).unwrap();
        (db, clinic)
    }

    fn procedure(clinic_id: &str, name: &str, price: Decimal, available: bool) -> Procedure {
        Procedure::from_input(ProcedureInput {
            name: name.into(),
            description: Some("Exam".into()),
            price,
            duration_minutes: 30,
            available,
            clinic_id: clinic_id.into(),
        })
    }

    #[test]
    fn test_insert_and_get_keeps_decimal_precision() {
        let (db, clinic) = setup_db();
        let ecg = procedure(&clinic.id, "ECG", Decimal::new(12345, 2), true);
        db.insert_procedure(&ecg).unwrap();

        let stored = db.get_procedure(&ecg.id).unwrap().unwrap();
        assert_eq!(stored.price, Decimal::new(12345, 2));
        assert_eq!(stored, ecg);

        let listing = db.get_procedure_listing(&ecg.id).unwrap().unwrap();
        assert_eq!(listing.clinic_name, "CardioPulse");
    }

    #[test]
    fn test_list_available_only() {
        let (db, clinic) = setup_db();
        db.insert_procedure(&procedure(&clinic.id, "ECG", Decimal::new(100, 0), true))
            .unwrap();
        db.insert_procedure(&procedure(&clinic.id, "Holter", Decimal::new(200, 0), false))
            .unwrap();

        let listed = db.list_available_procedures(&clinic.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].procedure.name, "ECG");
    }

    #[test]
    fn test_procedure_requires_clinic() {
        let (db, _) = setup_db();
        let orphan = procedure("missing", "ECG", Decimal::ONE, true);
        assert!(db.insert_procedure(&orphan).is_err());
    }
}
