//! Quiz domain model and write-path rules.
//!
//! # Responsibility
//! - Define the canonical `Quiz` record persisted by the repository layer.
//! - Own creation validation and partial-update merge semantics.
//!
//! # Invariants
//! - `0 <= correct_answer < options.len()` for every `Quiz` produced here.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod quiz;
pub mod validation;
