//! Vitalis API
//!
//! JSON-over-HTTP surface of [`vitalis_core`]. Handlers authenticate the
//! bearer token, lock the database for one service call, and map
//! [`ServiceError`](vitalis_core::ServiceError)s onto HTTP statuses.
//!
//! # Modules
//!
//! - [`router`]: Route table and middleware stack
//! - [`endpoints`]: Handlers, one module per resource
//! - [`middleware`]: Bearer authentication and access logging
//! - [`config`]: Command line / environment configuration
//! - [`server`]: Listener lifecycle

pub mod config;
pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use config::ServerConfig;
pub use error::ApiError;
pub use router::build_router;
pub use server::serve;
pub use types::{ApiContext, CallerContext};
