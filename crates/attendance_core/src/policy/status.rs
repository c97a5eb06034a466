//! Status label derivation.
//!
//! Precedence: connectivity/location loss dominates, a marked day dominates
//! office hours, office hours dominate zone membership.

use crate::model::record::ZoneStatus;
use serde::{Deserialize, Serialize};

/// Status label shown next to the attendance card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusText {
    Active,
    Present,
    Absent,
    #[serde(rename = "--")]
    Dash,
}

impl StatusText {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Present => "Present",
            Self::Absent => "Absent",
            Self::Dash => "--",
        }
    }
}

/// Inputs read on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInputs {
    pub has_internet: bool,
    pub has_location_services: bool,
    pub attendance_marked: bool,
    pub tracking_active: bool,
    pub within_office_hours: bool,
}

/// Derives the status label for the current inputs.
pub fn derive_status_text(inputs: StatusInputs) -> StatusText {
    if !inputs.has_internet || !inputs.has_location_services {
        StatusText::Dash
    } else if inputs.attendance_marked && inputs.tracking_active {
        StatusText::Active
    } else if inputs.attendance_marked {
        StatusText::Present
    } else if !inputs.within_office_hours {
        StatusText::Absent
    } else {
        StatusText::Dash
    }
}

/// `In Office` only when inside the fence with internet and location on.
pub fn derive_zone_status(
    is_in_geofence: bool,
    has_internet: bool,
    has_location_services: bool,
) -> ZoneStatus {
    if is_in_geofence && has_internet && has_location_services {
        ZoneStatus::InOffice
    } else {
        ZoneStatus::NotInOffice
    }
}

#[cfg(test)]
mod tests {
    use super::{derive_status_text, derive_zone_status, StatusInputs, StatusText};
    use crate::model::record::ZoneStatus;

    fn inputs() -> StatusInputs {
        StatusInputs {
            has_internet: true,
            has_location_services: true,
            attendance_marked: true,
            tracking_active: true,
            within_office_hours: true,
        }
    }

    #[test]
    fn connectivity_or_location_loss_dominates() {
        let offline = StatusInputs {
            has_internet: false,
            ..inputs()
        };
        assert_eq!(derive_status_text(offline), StatusText::Dash);

        let no_location = StatusInputs {
            has_location_services: false,
            ..inputs()
        };
        assert_eq!(derive_status_text(no_location), StatusText::Dash);
    }

    #[test]
    fn marked_day_is_active_or_present() {
        assert_eq!(derive_status_text(inputs()), StatusText::Active);
        let paused = StatusInputs {
            tracking_active: false,
            within_office_hours: false,
            ..inputs()
        };
        assert_eq!(derive_status_text(paused), StatusText::Present);
    }

    #[test]
    fn unmarked_day_depends_on_office_hours() {
        let after_hours = StatusInputs {
            attendance_marked: false,
            tracking_active: false,
            within_office_hours: false,
            ..inputs()
        };
        assert_eq!(derive_status_text(after_hours), StatusText::Absent);

        let during_hours = StatusInputs {
            within_office_hours: true,
            ..after_hours
        };
        assert_eq!(derive_status_text(during_hours), StatusText::Dash);
        assert_eq!(StatusText::Dash.as_str(), "--");
    }

    #[test]
    fn zone_status_requires_all_signals() {
        assert_eq!(derive_zone_status(true, true, true), ZoneStatus::InOffice);
        assert_eq!(derive_zone_status(true, false, true), ZoneStatus::NotInOffice);
        assert_eq!(derive_zone_status(false, true, true), ZoneStatus::NotInOffice);
    }
}
