//! Domain model for pet records.
//!
//! # Responsibility
//! - Define the persisted pet record and its partial-update shape.
//! - Own the field-level validation rules the gateway enforces.
//!
//! # Invariants
//! - Every persisted pet has a non-empty name and an in-domain gender.
//! - Weight is never negative once a row exists.

pub mod pet;
