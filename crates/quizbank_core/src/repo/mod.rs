//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the narrow record-store contract the service consumes.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repositories persist what they are given; validation happens before.
//! - "Not found" is a value (`None`/`false`), transport failures are errors.

pub mod quiz_repo;
