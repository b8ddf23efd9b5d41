//! Pantry use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the section manager and article
//!   store use-cases.
//! - Collapse persistence failures into the caller-facing `PantryError`.
//!
//! # Invariants
//! - Every section/article use-case passes through the ownership guard.
//! - Services remain storage-agnostic; they only see repository traits.

pub mod article_service;
pub mod error;
mod guard;
pub mod section_service;
