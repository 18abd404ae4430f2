//! Demo catalog for local development.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::db::{Database, DbResult};
use crate::models::{
    Clinic, ClinicInput, Patient, PatientInput, Procedure, ProcedureInput, Role, User,
};
use crate::security::PasswordHasher;

/// Password of every seeded clinic account.
pub const DEMO_CLINIC_PASSWORD: &str = "senha123";
/// Password of every seeded patient account.
pub const DEMO_PATIENT_PASSWORD: &str = "paciente123";

/// What [`seed_demo_catalog`] inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub clinics: usize,
    pub procedures: usize,
    pub patients: usize,
    pub accounts: usize,
}

struct DemoClinic {
    trade_name: &'static str,
    legal_name: &'static str,
    specialty: &'static str,
    address: &'static str,
    account_email: &'static str,
    /// name, description, price in cents, minutes
    procedures: &'static [(&'static str, &'static str, i64, u32)],
}

const CLINICS: &[DemoClinic] = &[
    DemoClinic {
        trade_name: "Vitalis Cardio",
        legal_name: "Vitalis Cardiologia LTDA",
        specialty: "Cardiologia",
        address: "Av. Paulista, 1000",
        account_email: "contato@vitaliscardio.com",
        procedures: &[
            ("Consulta Cardiológica", "Consulta completa com especialista", 35000, 45),
            ("Eletrocardiograma", "Exame do coração em repouso", 15000, 20),
        ],
    },
    DemoClinic {
        trade_name: "Clínica da Família",
        legal_name: "Saúde Família S/A",
        specialty: "Clínica Geral",
        address: "Rua das Flores, 500",
        account_email: "contato@clinicadafamilia.com",
        procedures: &[
            ("Consulta Geral", "Atendimento primário", 12000, 30),
            ("Hemograma Completo", "Exame de sangue", 5000, 10),
            ("Raio-X Torax", "Radiografia digital", 18000, 15),
        ],
    },
];

/// name, email, cpf, phone, (year, month, day)
const PATIENTS: &[(&str, &str, &str, &str, (i32, u32, u32))] = &[
    ("João Silva", "joao@email.com", "123.456.789-00", "11999999999", (1985, 5, 20)),
    ("Maria Oliveira", "maria@email.com", "987.654.321-00", "11988888888", (1990, 8, 15)),
];

/// Password hashes for the seeded accounts, computed before the catalog
/// is written.
#[derive(Debug, Clone)]
pub struct DemoPasswords {
    clinic_hash: String,
    patient_hash: String,
}

impl DemoPasswords {
    pub fn hash(hasher: &dyn PasswordHasher) -> Self {
        Self {
            clinic_hash: hasher.hash(DEMO_CLINIC_PASSWORD),
            patient_hash: hasher.hash(DEMO_PATIENT_PASSWORD),
        }
    }
}

/// Insert the demo clinics, their procedures and accounts, and two demo
/// patients, all in one unit of work. Does nothing once any clinic exists.
pub fn seed_demo_catalog(db: &Database, hasher: &dyn PasswordHasher) -> DbResult<SeedSummary> {
    if db.count_clinics()? > 0 {
        info!("Demo catalog skipped: clinics already present");
        return Ok(SeedSummary::default());
    }
    seed_demo_catalog_with(db, &DemoPasswords::hash(hasher))
}

/// [`seed_demo_catalog`] with the account passwords already hashed.
pub fn seed_demo_catalog_with(db: &Database, passwords: &DemoPasswords) -> DbResult<SeedSummary> {
    if db.count_clinics()? > 0 {
        info!("Demo catalog skipped: clinics already present");
        return Ok(SeedSummary::default());
    }

    let summary = db.atomic(|db| -> DbResult<SeedSummary> {
        let mut summary = SeedSummary::default();

        for demo in CLINICS {
            let clinic = Clinic::from_input(ClinicInput {
                trade_name: demo.trade_name.into(),
                legal_name: demo.legal_name.into(),
                specialty: demo.specialty.into(),
                address: demo.address.into(),
            });
            db.insert_clinic(&clinic)?;
            summary.clinics += 1;

            for (name, description, cents, minutes) in demo.procedures {
                db.insert_procedure(&Procedure::from_input(ProcedureInput {
                    name: (*name).into(),
                    description: Some((*description).into()),
                    price: Decimal::new(*cents, 2),
                    duration_minutes: *minutes,
                    available: true,
                    clinic_id: clinic.id.clone(),
                }))?;
                summary.procedures += 1;
            }

            if !db.user_email_exists(demo.account_email)? {
                db.insert_user(&User::new(
                    format!("{} User", demo.trade_name),
                    demo.account_email.into(),
                    passwords.clinic_hash.clone(),
                    Role::Clinic,
                    Some(clinic.id.clone()),
                ))?;
                summary.accounts += 1;
            }
        }

        for (name, email, cpf, phone, (year, month, day)) in PATIENTS {
            if db.get_patient_by_email(email)?.is_some() {
                continue;
            }
            let Some(birth_date) = NaiveDate::from_ymd_opt(*year, *month, *day) else {
                continue;
            };
            let patient = Patient::from_input(PatientInput {
                name: (*name).into(),
                cpf: (*cpf).into(),
                email: (*email).into(),
                phone: (*phone).into(),
                birth_date,
                address: None,
                medical_history: None,
            });
            db.insert_patient(&patient)?;
            summary.patients += 1;

            if !db.user_email_exists(email)? {
                db.insert_user(&User::new(
                    (*name).into(),
                    (*email).into(),
                    passwords.patient_hash.clone(),
                    Role::Patient,
                    Some(patient.id.clone()),
                ))?;
                summary.accounts += 1;
            }
        }

        Ok(summary)
    })?;

    info!(
        clinics = summary.clinics,
        procedures = summary.procedures,
        patients = summary.patients,
        "Demo catalog seeded"
    );
    Ok(summary)
}
