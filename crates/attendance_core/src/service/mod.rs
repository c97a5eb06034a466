//! Attendance use-case services.
//!
//! # Responsibility
//! - Orchestrate the session, policies and persistence into use cases.
//! - Keep FFI callers decoupled from storage details.

pub mod attendance_service;
pub mod summary;
pub mod writer;
