//! Pantry domain model.
//!
//! # Responsibility
//! - Define the records exchanged with callers (`Section`, `Article`).
//! - Turn free-text user input into validated article fragments.
//!
//! # Invariants
//! - Parsing is pure: no store access happens in this module.
//! - The "no expiration" sentinel never leaves `expiration`.

pub mod article;
pub mod expiration;
pub mod section;
