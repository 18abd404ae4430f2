//! Vitalis Core Library
//!
//! Clinic appointment backend: patients book procedures at clinics, clinics
//! confirm and complete the appointments, patients rate them.
//!
//! # Architecture
//!
//! ```text
//! HTTP (vitalis-api) ──► services ──► Database (rusqlite) ──► SQLite
//!                           │
//!                 security capabilities
//!            (PasswordHasher, TokenIssuer)
//! ```
//!
//! # Appointment lifecycle
//!
//! ```text
//!   book ──► PENDING ──confirm──► CONFIRMED ──complete──► DONE ──► rate
//!               │ └────────────complete───────────────────▲
//!               └──cancel──► CANCELLED ◄──cancel──┘ (from CONFIRMED)
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite persistence, one group of operations per entity
//! - [`models`]: Domain types and validated inputs
//! - [`services`]: Business rules and capability checks
//! - [`security`]: Password hashing and bearer token capabilities
//! - [`seed`]: Demo catalog for local development

pub mod db;
pub mod models;
pub mod security;
pub mod seed;
pub mod services;

// Re-export commonly used types
pub use db::{Database, DbError, DbResult};
pub use models::{
    Appointment, AppointmentDetails, AppointmentStatus, AuthToken, Clinic, ClinicalRecord,
    Patient, Principal, Procedure, ProcedureListing, Rating, Requisition, RequisitionPriority,
    RequisitionStatus, RevenueReport, Role, User,
};
pub use security::{hash_token, PasswordHasher, Pbkdf2Hasher, RandomTokenIssuer, TokenIssuer};
pub use services::{ServiceError, ServiceResult};
