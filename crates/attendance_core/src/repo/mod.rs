//! Store abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the attendance store contract used by the persistence writer.
//! - Isolate SQLite query details from session and service logic.
//!
//! # Invariants
//! - Writes enforce record validation before persistence.
//! - The store is a downstream mirror; nothing here mutates a session.

pub mod record_repo;
