//! SQLite schema definition.

/// Complete database schema for vitalis.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Accounts and sessions
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('ADMIN', 'CLINIC', 'PATIENT')),
    profile_id TEXT,                             -- owning patient or clinic, NULL for admins
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,                 -- SHA-256 hex of the bearer token
    user_id TEXT NOT NULL REFERENCES users(id),
    issued_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

-- one account per patient or clinic profile
CREATE UNIQUE INDEX IF NOT EXISTS idx_users_profile ON users(profile_id);

-- ============================================================================
-- Profiles
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    cpf TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    phone TEXT NOT NULL,
    birth_date TEXT NOT NULL,                    -- YYYY-MM-DD
    address TEXT,
    medical_history TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

CREATE TABLE IF NOT EXISTS clinics (
    id TEXT PRIMARY KEY,
    trade_name TEXT NOT NULL,
    legal_name TEXT NOT NULL,
    specialty TEXT NOT NULL,
    address TEXT NOT NULL,
    rating REAL NOT NULL DEFAULT 0,
    active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_clinics_specialty ON clinics(specialty COLLATE NOCASE);

-- ============================================================================
-- Procedure catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS procedures (
    id TEXT PRIMARY KEY,
    clinic_id TEXT NOT NULL REFERENCES clinics(id),
    name TEXT NOT NULL,
    description TEXT,
    price TEXT NOT NULL,                         -- decimal text
    duration_minutes INTEGER NOT NULL CHECK (duration_minutes > 0),
    available INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX IF NOT EXISTS idx_procedures_clinic ON procedures(clinic_id);

-- ============================================================================
-- Appointments
-- ============================================================================

CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    clinic_id TEXT NOT NULL REFERENCES clinics(id),
    scheduled_at TEXT NOT NULL,                  -- YYYY-MM-DDTHH:MM:SS, UTC
    total_price TEXT NOT NULL,                   -- decimal text
    status TEXT NOT NULL CHECK (status IN ('PENDING', 'CONFIRMED', 'DONE', 'CANCELLED')),
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_appointments_patient ON appointments(patient_id);
CREATE INDEX IF NOT EXISTS idx_appointments_clinic ON appointments(clinic_id, status);

CREATE TABLE IF NOT EXISTS appointment_procedures (
    appointment_id TEXT NOT NULL REFERENCES appointments(id) ON DELETE CASCADE,
    procedure_id TEXT NOT NULL REFERENCES procedures(id),
    position INTEGER NOT NULL,
    PRIMARY KEY (appointment_id, procedure_id)
);

CREATE TABLE IF NOT EXISTS clinical_records (
    id TEXT PRIMARY KEY,
    appointment_id TEXT NOT NULL UNIQUE REFERENCES appointments(id),
    symptoms TEXT,
    diagnosis TEXT,
    prescription TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ratings (
    id TEXT PRIMARY KEY,
    appointment_id TEXT NOT NULL UNIQUE REFERENCES appointments(id),
    score INTEGER NOT NULL CHECK (score BETWEEN 1 AND 5),
    comment TEXT,
    created_at TEXT NOT NULL
);

-- ============================================================================
-- Requisitions
-- ============================================================================

CREATE TABLE IF NOT EXISTS requisitions (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL CHECK (length(title) <= 200),
    description TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('PENDING', 'IN_PROGRESS', 'COMPLETED', 'CANCELLED')),
    priority TEXT NOT NULL CHECK (priority IN ('LOW', 'MEDIUM', 'HIGH', 'URGENT')),
    requester TEXT NOT NULL CHECK (length(requester) <= 100),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_requisitions_status ON requisitions(status);
CREATE INDEX IF NOT EXISTS idx_requisitions_priority ON requisitions(priority);
"#;
