//! Error taxonomy surfaced by attendance services.
//!
//! Transition no-ops and clock anomalies are not errors: they are reported as
//! outcome variants and clamped spans. Only the persistence side can fail.

use crate::repo::record_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AttendanceResult<T> = Result<T, AttendanceError>;

#[derive(Debug)]
pub enum AttendanceError {
    /// Downstream store write or read failed. Session state is untouched.
    Persistence(RepoError),
    /// The store already holds a fresher record for the same key.
    StaleWrite {
        incoming_last_updated: i64,
        stored_last_updated: i64,
    },
    /// Sign-off requested while no attendance is marked, including a repeat
    /// sign-off. Nothing was written.
    NotMarked,
}

impl Display for AttendanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "attendance persistence failed: {err}"),
            Self::StaleWrite {
                incoming_last_updated,
                stored_last_updated,
            } => write!(
                f,
                "stale attendance write rejected: incoming last_updated {incoming_last_updated} is older than stored {stored_last_updated}"
            ),
            Self::NotMarked => write!(f, "attendance is not marked for this session"),
        }
    }
}

impl Error for AttendanceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::StaleWrite { .. } | Self::NotMarked => None,
        }
    }
}

impl From<RepoError> for AttendanceError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}
