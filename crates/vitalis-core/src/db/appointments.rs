//! Appointment database operations.

use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension, Row};
use rust_decimal::Decimal;

use super::{format_datetime, parse_datetime, parse_decimal, Database, DbError, DbResult};
use crate::models::{Appointment, AppointmentStatus};

const APPOINTMENT_COLUMNS: &str = r#"
    id, patient_id, clinic_id, scheduled_at, total_price, status, notes, created_at, updated_at
"#;

/// A completed appointment counted towards revenue.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueRow {
    pub appointment_id: String,
    pub scheduled_at: NaiveDateTime,
    pub total_price: Decimal,
}

impl Database {
    /// Insert an appointment and its procedure links.
    ///
    /// Callers wrap this in [`Database::atomic`] so a failed link leaves no
    /// half-written appointment behind.
    pub fn insert_appointment(&self, appointment: &Appointment) -> DbResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO appointments (
                    id, patient_id, clinic_id, scheduled_at, total_price,
                    status, notes, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                params![
                    appointment.id,
                    appointment.patient_id,
                    appointment.clinic_id,
                    format_datetime(&appointment.scheduled_at),
                    appointment.total_price.to_string(),
                    appointment.status.as_str(),
                    appointment.notes,
                    appointment.created_at,
                    appointment.updated_at,
                ],
            )
            .map_err(DbError::from_write)?;
        self.link_procedures(&appointment.id, &appointment.procedure_ids)
    }

    fn link_procedures(&self, appointment_id: &str, procedure_ids: &[String]) -> DbResult<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO appointment_procedures (appointment_id, procedure_id, position) VALUES (?1, ?2, ?3)",
        )?;
        for (position, procedure_id) in procedure_ids.iter().enumerate() {
            stmt.execute(params![appointment_id, procedure_id, position as i64])
                .map_err(DbError::from_write)?;
        }
        Ok(())
    }

    /// Persist a new procedure set together with its recomputed total.
    pub fn replace_appointment_procedures(&self, appointment: &Appointment) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE appointments SET total_price = ?2, updated_at = ?3 WHERE id = ?1",
            params![
                appointment.id,
                appointment.total_price.to_string(),
                appointment.updated_at,
            ],
        )?;
        if rows_affected == 0 {
            return Ok(false);
        }
        self.conn.execute(
            "DELETE FROM appointment_procedures WHERE appointment_id = ?",
            [&appointment.id],
        )?;
        self.link_procedures(&appointment.id, &appointment.procedure_ids)?;
        Ok(true)
    }

    pub fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
        updated_at: &str,
    ) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE appointments SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), updated_at],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get an appointment by id, with its procedure ids in booking order.
    pub fn get_appointment(&self, id: &str) -> DbResult<Option<Appointment>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM appointments WHERE id = ?", APPOINTMENT_COLUMNS),
                [id],
                AppointmentRow::from_row,
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(self.hydrate_appointment(row)?)),
            None => Ok(None),
        }
    }

    /// Appointments of a patient, soonest first.
    pub fn list_appointments_for_patient(&self, patient_id: &str) -> DbResult<Vec<Appointment>> {
        self.list_appointments_where("patient_id", patient_id)
    }

    /// Appointments of a clinic, soonest first.
    pub fn list_appointments_for_clinic(&self, clinic_id: &str) -> DbResult<Vec<Appointment>> {
        self.list_appointments_where("clinic_id", clinic_id)
    }

    fn list_appointments_where(&self, column: &str, value: &str) -> DbResult<Vec<Appointment>> {
        let rows = {
            let mut stmt = self.conn.prepare(&format!(
                "SELECT {} FROM appointments WHERE {} = ? ORDER BY scheduled_at, created_at",
                APPOINTMENT_COLUMNS, column
            ))?;
            let rows = stmt.query_map([value], AppointmentRow::from_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        rows.into_iter()
            .map(|row| self.hydrate_appointment(row))
            .collect()
    }

    fn procedure_ids_for(&self, appointment_id: &str) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT procedure_id FROM appointment_procedures WHERE appointment_id = ? ORDER BY position",
        )?;
        let ids = stmt.query_map([appointment_id], |row| row.get(0))?;
        ids.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    fn hydrate_appointment(&self, row: AppointmentRow) -> DbResult<Appointment> {
        let procedure_ids = self.procedure_ids_for(&row.id)?;
        Ok(Appointment {
            procedure_ids,
            scheduled_at: parse_datetime(&row.scheduled_at)?,
            total_price: parse_decimal(&row.total_price)?,
            status: string_to_status(&row.status)?,
            id: row.id,
            patient_id: row.patient_id,
            clinic_id: row.clinic_id,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// DONE appointments of a clinic scheduled within `[start, end]`.
    pub fn completed_appointments_between(
        &self,
        clinic_id: &str,
        start: &NaiveDateTime,
        end: &NaiveDateTime,
    ) -> DbResult<Vec<RevenueRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, scheduled_at, total_price
            FROM appointments
            WHERE clinic_id = ?1
              AND status = 'DONE'
              AND scheduled_at >= ?2
              AND scheduled_at <= ?3
            ORDER BY scheduled_at
            "#,
        )?;

        let rows = stmt.query_map(
            params![clinic_id, format_datetime(start), format_datetime(end)],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )?;

        rows.map(|r| -> DbResult<RevenueRow> {
            let (appointment_id, scheduled_at, total_price) = r?;
            Ok(RevenueRow {
                appointment_id,
                scheduled_at: parse_datetime(&scheduled_at)?,
                total_price: parse_decimal(&total_price)?,
            })
        })
        .collect()
    }
}

/// Raw row from the appointments table.
struct AppointmentRow {
    id: String,
    patient_id: String,
    clinic_id: String,
    scheduled_at: String,
    total_price: String,
    status: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl AppointmentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            clinic_id: row.get(2)?,
            scheduled_at: row.get(3)?,
            total_price: row.get(4)?,
            status: row.get(5)?,
            notes: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

fn string_to_status(s: &str) -> Result<AppointmentStatus, DbError> {
    s.parse().map_err(DbError::Constraint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Clinic, ClinicInput, Patient, PatientInput, Procedure, ProcedureInput};
    use chrono::NaiveDate;

    struct Fixture {
        db: Database,
        patient: Patient,
        clinic: Clinic,
        procedures: Vec<Procedure>,
    }

    fn setup() -> Fixture {
        let db = Database::open_in_memory().unwrap();
        let patient = Patient::from_input(PatientInput {
            name: "Maria Souza".into(),
            cpf: "12345678901".into(),
            email: "maria@vitalis.com".into(),
            phone: "11987654321".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            address: None,
            medical_history: None,
        });
        db.insert_patient(&patient).unwrap();

        let clinic = Clinic::from_input(ClinicInput {
            trade_name: "CardioPulse".into(),
            legal_name: "CardioPulse LTDA".into(),
            specialty: "Cardiology".into(),
            address: "Av. Paulista, 1000".into(),
        });
        db.insert_clinic(&clinic).unwrap();

        let procedures: Vec<Procedure> = [("ECG", 12000), ("Holter", 25050)]
            .into_iter()
            .map(|(name, cents)| {
                Procedure::from_input(ProcedureInput {
                    name: name.into(),
                    description: None,
                    price: Decimal::new(cents, 2),
                    duration_minutes: 30,
                    available: true,
                    clinic_id: clinic.id.clone(),
                })
            })
            .collect();
        for procedure in &procedures {
            db.insert_procedure(procedure).unwrap();
        }

        Fixture {
            db,
            patient,
            clinic,
            procedures,
        }
    }

    fn at(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    fn book(f: &Fixture, procedures: &[Procedure], when: &str) -> Appointment {
        let appointment = Appointment::new(
            f.patient.id.clone(),
            f.clinic.id.clone(),
            procedures,
            at(when),
            Some("first visit".into()),
        );
        f.db.insert_appointment(&appointment).unwrap();
        appointment
    }

    #[test]
    fn test_insert_and_get_preserves_order() {
        let f = setup();
        let reversed: Vec<Procedure> = f.procedures.iter().rev().cloned().collect();
        let appointment = book(&f, &reversed, "2030-03-01T10:00:00");

        let stored = f.db.get_appointment(&appointment.id).unwrap().unwrap();
        assert_eq!(stored, appointment);
        assert_eq!(stored.procedure_ids[0], f.procedures[1].id);
        assert_eq!(stored.total_price, Decimal::new(37050, 2));

        let listed = f.db.list_appointment_procedures(&appointment.id).unwrap();
        assert_eq!(listed[0].procedure.name, "Holter");
    }

    #[test]
    fn test_update_status() {
        let f = setup();
        let appointment = book(&f, &f.procedures, "2030-03-01T10:00:00");

        assert!(f
            .db
            .update_appointment_status(&appointment.id, AppointmentStatus::Confirmed, "later")
            .unwrap());
        let stored = f.db.get_appointment(&appointment.id).unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Confirmed);
        assert_eq!(stored.updated_at, "later");

        assert!(!f
            .db
            .update_appointment_status("missing", AppointmentStatus::Done, "later")
            .unwrap());
    }

    #[test]
    fn test_replace_procedures() {
        let f = setup();
        let mut appointment = book(&f, &f.procedures, "2030-03-01T10:00:00");

        appointment.set_procedures(&f.procedures[..1]);
        assert!(f.db.replace_appointment_procedures(&appointment).unwrap());

        let stored = f.db.get_appointment(&appointment.id).unwrap().unwrap();
        assert_eq!(stored.procedure_ids, vec![f.procedures[0].id.clone()]);
        assert_eq!(stored.total_price, Decimal::new(12000, 2));
    }

    #[test]
    fn test_unknown_procedure_link_rejected_atomically() {
        let f = setup();
        let mut appointment = Appointment::new(
            f.patient.id.clone(),
            f.clinic.id.clone(),
            &f.procedures,
            at("2030-03-01T10:00:00"),
            None,
        );
        appointment.procedure_ids.push("ghost".into());

        let result = f.db.atomic(|db| db.insert_appointment(&appointment));
        assert!(result.is_err());
        assert!(f.db.get_appointment(&appointment.id).unwrap().is_none());
    }

    #[test]
    fn test_list_for_patient_and_clinic() {
        let f = setup();
        let later = book(&f, &f.procedures, "2030-05-01T10:00:00");
        let sooner = book(&f, &f.procedures[..1], "2030-04-01T10:00:00");

        let for_patient = f.db.list_appointments_for_patient(&f.patient.id).unwrap();
        assert_eq!(
            for_patient.iter().map(|a| a.id.clone()).collect::<Vec<_>>(),
            vec![sooner.id.clone(), later.id.clone()]
        );
        assert_eq!(f.db.list_appointments_for_clinic(&f.clinic.id).unwrap().len(), 2);
        assert!(f.db.list_appointments_for_clinic("other").unwrap().is_empty());
    }

    #[test]
    fn test_completed_between_is_inclusive() {
        let f = setup();
        let first = book(&f, &f.procedures[..1], "2030-01-01T00:00:00");
        let last = book(&f, &f.procedures, "2030-01-31T23:59:59");
        book(&f, &f.procedures, "2030-01-15T10:00:00");
        for id in [&first.id, &last.id] {
            f.db.update_appointment_status(id, AppointmentStatus::Done, "now")
                .unwrap();
        }

        let rows = f
            .db
            .completed_appointments_between(
                &f.clinic.id,
                &at("2030-01-01T00:00:00"),
                &at("2030-01-31T23:59:59"),
            )
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].appointment_id, first.id);
        assert_eq!(rows[1].total_price, Decimal::new(37050, 2));
    }
}
