//! Core domain logic for Petbook.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod notify;
pub mod schema;
pub mod uri;

pub use gateway::{GatewayError, GatewayResult, PetCursor, PetGateway};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::pet::{Pet, PetPatch, PetValidationError};
pub use notify::{ChangeChannel, ChangeHub, Subscription};
pub use schema::Gender;
pub use uri::{resolve, ContentUri, UriMatch};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
