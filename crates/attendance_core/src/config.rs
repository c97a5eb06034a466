//! Attendance policy configuration.
//!
//! # Responsibility
//! - Describe office location, geofence radius, office hours and writer
//!   cadence as one serializable document.
//! - Validate the document before any service is built from it.
//!
//! # Invariants
//! - Every field has a default matching the production office policy.
//! - A config accepted by `validate` always yields a usable geofence and
//!   office-hours window.

use crate::policy::geofence::{GeoPoint, Geofence, DEFAULT_RADIUS_M};
use crate::policy::office_hours::OfficeHours;
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const OFFICE_TIME_FORMAT: &str = "%H:%M";

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration parse/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidOffice { latitude: f64, longitude: f64 },
    InvalidRadius(f64),
    InvalidTime { field: &'static str, value: String },
    EmptyOfficeHours { start: String, end: String },
    ZeroPersistInterval,
    ZeroFailureThreshold,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
            Self::InvalidOffice {
                latitude,
                longitude,
            } => write!(f, "office coordinate ({latitude}, {longitude}) is invalid"),
            Self::InvalidRadius(value) => {
                write!(f, "geofence_radius_m must be a positive number, got {value}")
            }
            Self::InvalidTime { field, value } => {
                write!(f, "{field} must use HH:MM, got `{value}`")
            }
            Self::EmptyOfficeHours { start, end } => {
                write!(f, "office hours start `{start}` must be before end `{end}`")
            }
            Self::ZeroPersistInterval => write!(f, "persist_interval_secs must be at least 1"),
            Self::ZeroFailureThreshold => {
                write!(f, "failure_notice_threshold must be at least 1")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Office-hours window as `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OfficeHoursConfig {
    pub start: String,
    pub end: String,
}

impl Default for OfficeHoursConfig {
    fn default() -> Self {
        Self {
            start: "09:00".to_string(),
            end: "18:00".to_string(),
        }
    }
}

/// Attendance policy and writer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttendanceConfig {
    pub office: GeoPoint,
    pub geofence_radius_m: f64,
    pub office_hours: OfficeHoursConfig,
    /// Minimum spacing between periodic foreground writes.
    pub persist_interval_secs: u32,
    /// Consecutive write failures before the user is notified.
    pub failure_notice_threshold: u32,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            office: GeoPoint::new(13.0175493, 77.6301157),
            geofence_radius_m: DEFAULT_RADIUS_M,
            office_hours: OfficeHoursConfig::default(),
            persist_interval_secs: 1,
            failure_notice_threshold: 3,
        }
    }
}

impl AttendanceConfig {
    /// Parses and validates a JSON config document.
    ///
    /// Missing fields take their defaults; unknown fields are rejected.
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.office.is_valid() {
            return Err(ConfigError::InvalidOffice {
                latitude: self.office.latitude,
                longitude: self.office.longitude,
            });
        }
        if !self.geofence_radius_m.is_finite() || self.geofence_radius_m <= 0.0 {
            return Err(ConfigError::InvalidRadius(self.geofence_radius_m));
        }
        self.office_hours_window()?;
        if self.persist_interval_secs == 0 {
            return Err(ConfigError::ZeroPersistInterval);
        }
        if self.failure_notice_threshold == 0 {
            return Err(ConfigError::ZeroFailureThreshold);
        }
        Ok(())
    }

    pub fn geofence(&self) -> Geofence {
        Geofence::new(self.office, self.geofence_radius_m)
    }

    /// Parses the configured office-hours window.
    pub fn office_hours_window(&self) -> ConfigResult<OfficeHours> {
        let start = parse_office_time("office_hours.start", &self.office_hours.start)?;
        let end = parse_office_time("office_hours.end", &self.office_hours.end)?;
        if start >= end {
            return Err(ConfigError::EmptyOfficeHours {
                start: self.office_hours.start.clone(),
                end: self.office_hours.end.clone(),
            });
        }
        Ok(OfficeHours::new(start, end))
    }

    pub fn persist_interval(&self) -> Duration {
        Duration::seconds(i64::from(self.persist_interval_secs))
    }
}

fn parse_office_time(field: &'static str, value: &str) -> ConfigResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), OFFICE_TIME_FORMAT).map_err(|_| {
        ConfigError::InvalidTime {
            field,
            value: value.to_string(),
        }
    })
}
