//! Request middleware: bearer authentication and access logging.

pub mod audit;
pub mod auth;
