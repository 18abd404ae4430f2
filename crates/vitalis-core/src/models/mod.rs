//! Domain models for the vitalis clinic system.

mod appointment;
mod clinic;
mod patient;
mod procedure;
mod rating;
mod record;
mod report;
mod requisition;
mod user;

pub use appointment::*;
pub use clinic::*;
pub use patient::*;
pub use procedure::*;
pub use rating::*;
pub use record::*;
pub use report::*;
pub use requisition::*;
pub use user::*;
