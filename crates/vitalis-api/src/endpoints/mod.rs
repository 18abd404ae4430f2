//! API endpoint handlers, one module per resource.
//!
//! Handlers take the database lock for one service call at a time, never
//! across an `.await`, and map service errors into
//! [`ApiError`](crate::error::ApiError).

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod clinics;
pub mod health;
pub mod patients;
pub mod procedures;
pub mod ratings;
pub mod reports;
pub mod requisitions;
