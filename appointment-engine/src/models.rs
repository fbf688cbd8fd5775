use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Wire format of `scheduled_at`.
pub const SCHEDULED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Default for `assigned_staff` when the request names nobody.
pub const UNASSIGNED: &str = "unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    InPerson,
    Phone,
    Emergency,
}

impl AppointmentKind {
    /// Discriminator used in listings and JSON.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::InPerson => "in_person",
            Self::Phone => "phone",
            Self::Emergency => "emergency",
        }
    }

    /// The variant field this kind cannot do without.
    #[must_use]
    pub fn required_field(self) -> &'static str {
        match self {
            Self::InPerson => "location",
            Self::Phone => "contact_phone",
            Self::Emergency => "priority_level",
        }
    }
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InPerson => "in-person",
            Self::Phone => "phone",
            Self::Emergency => "emergency",
        })
    }
}

impl FromStr for AppointmentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_person" | "in-person" | "inperson" | "presencial" => Ok(Self::InPerson),
            "phone" | "telefonica" | "telefónica" => Ok(Self::Phone),
            "emergency" | "urgencias" | "urgencia" => Ok(Self::Emergency),
            _ => Err(ValidationError::UnknownKind(s.to_string())),
        }
    }
}

/// Kind-specific payload. Exactly one group exists per appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariantDetails {
    InPerson { location: String },
    Phone { contact_phone: String },
    Emergency { priority_level: String },
}

impl VariantDetails {
    #[must_use]
    pub fn kind(&self) -> AppointmentKind {
        match self {
            Self::InPerson { .. } => AppointmentKind::InPerson,
            Self::Phone { .. } => AppointmentKind::Phone,
            Self::Emergency { .. } => AppointmentKind::Emergency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Requested,
    Attended,
    Cancelled,
}

impl AppointmentStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Attended | Self::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Requested => "requested",
            Self::Attended => "attended",
            Self::Cancelled => "cancelled",
        })
    }
}

/// What the patient directory knows about a patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: String,
    pub patient: PatientSummary,
    pub assigned_staff: String,
    pub scheduled_at: NaiveDateTime,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub attended: bool,
    #[serde(flatten)]
    pub details: VariantDetails,
}

impl Appointment {
    #[must_use]
    pub fn kind(&self) -> AppointmentKind {
        self.details.kind()
    }

    #[must_use]
    pub fn summary(&self) -> AppointmentSummary {
        AppointmentSummary {
            appointment_id: self.appointment_id.clone(),
            kind: self.kind(),
            patient_id: self.patient.patient_id.clone(),
            patient_name: self.patient.display_name.clone(),
            assigned_staff: self.assigned_staff.clone(),
            scheduled_at: self.scheduled_at,
            status: self.status,
            attended: self.attended,
        }
    }
}

/// One row of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSummary {
    pub appointment_id: String,
    pub kind: AppointmentKind,
    pub patient_id: String,
    pub patient_name: String,
    pub assigned_staff: String,
    pub scheduled_at: NaiveDateTime,
    pub status: AppointmentStatus,
    pub attended: bool,
}

/// An unvalidated create request, as it arrives from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub kind: String,
    pub patient_id: String,
    #[serde(default)]
    pub assigned_staff: Option<String>,
    pub scheduled_at: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub priority_level: Option<String>,
}

/// A request that passed every check that does not need the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAppointment {
    pub patient_id: String,
    pub assigned_staff: String,
    pub scheduled_at: NaiveDateTime,
    pub reason: Option<String>,
    pub details: VariantDetails,
}

impl NewAppointment {
    /// Check kind, the kind's variant field and the timestamp, in that
    /// order. Variant fields belonging to other kinds are dropped.
    ///
    /// # Errors
    ///
    /// The first [`ValidationError`] found.
    pub fn validate(&self) -> Result<ValidatedAppointment, ValidationError> {
        let kind: AppointmentKind = self.kind.parse()?;

        let supplied = match kind {
            AppointmentKind::InPerson => &self.location,
            AppointmentKind::Phone => &self.contact_phone,
            AppointmentKind::Emergency => &self.priority_level,
        };
        let value = non_blank(supplied.as_deref()).ok_or(ValidationError::MissingVariantField {
            kind,
            field: kind.required_field(),
        })?;
        let details = match kind {
            AppointmentKind::InPerson => VariantDetails::InPerson { location: value },
            AppointmentKind::Phone => VariantDetails::Phone {
                contact_phone: value,
            },
            AppointmentKind::Emergency => VariantDetails::Emergency {
                priority_level: value,
            },
        };

        let scheduled_at = parse_scheduled_at(&self.scheduled_at)?;

        let patient_id = self.patient_id.trim();
        if patient_id.is_empty() {
            return Err(ValidationError::UnknownPatient(String::new()));
        }

        Ok(ValidatedAppointment {
            patient_id: patient_id.to_string(),
            assigned_staff: non_blank(self.assigned_staff.as_deref())
                .unwrap_or_else(|| UNASSIGNED.to_string()),
            scheduled_at,
            reason: non_blank(self.reason.as_deref()),
            details,
        })
    }
}

/// Length of a `YYYY-MM-DDTHH:MM:SS` timestamp.
const SCHEDULED_AT_LEN: usize = 19;

/// Parse `YYYY-MM-DDTHH:MM:SS` exactly. Every field zero-padded, no
/// offsets, no fractions, no leap seconds.
///
/// # Errors
///
/// [`ValidationError::BadTimestamp`] for anything else.
pub fn parse_scheduled_at(raw: &str) -> Result<NaiveDateTime, ValidationError> {
    let bad = || ValidationError::BadTimestamp(raw.to_string());
    if !has_timestamp_shape(raw) {
        return Err(bad());
    }
    let parsed = NaiveDateTime::parse_from_str(raw, SCHEDULED_AT_FORMAT).map_err(|_| bad())?;
    // chrono encodes second 60 as an overflowing nanosecond count
    if parsed.nanosecond() >= 1_000_000_000 {
        return Err(bad());
    }
    Ok(parsed)
}

fn has_timestamp_shape(raw: &str) -> bool {
    raw.len() == SCHEDULED_AT_LEN
        && raw.bytes().enumerate().all(|(position, byte)| match position {
            4 | 7 => byte == b'-',
            10 => byte == b'T',
            13 | 16 => byte == b':',
            _ => byte.is_ascii_digit(),
        })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: &str) -> NewAppointment {
        NewAppointment {
            kind: kind.to_string(),
            patient_id: "P1".to_string(),
            scheduled_at: "2025-06-01T10:30:00".to_string(),
            ..NewAppointment::default()
        }
    }

    #[test]
    fn kind_aliases() {
        assert_eq!("presencial".parse(), Ok(AppointmentKind::InPerson));
        assert_eq!("In-Person".parse(), Ok(AppointmentKind::InPerson));
        assert_eq!("TELEFONICA".parse(), Ok(AppointmentKind::Phone));
        assert_eq!("urgencias".parse(), Ok(AppointmentKind::Emergency));
        assert_eq!(
            "video".parse::<AppointmentKind>(),
            Err(ValidationError::UnknownKind("video".into()))
        );
    }

    #[test]
    fn missing_variant_field_names_the_field() {
        let err = request("emergency").validate().unwrap_err();
        assert_eq!(err.field(), "priority_level");
        assert!(matches!(
            err,
            ValidationError::MissingVariantField {
                kind: AppointmentKind::Emergency,
                ..
            }
        ));
    }

    #[test]
    fn blank_variant_field_is_missing() {
        let mut req = request("in_person");
        req.location = Some("   ".into());
        assert_eq!(req.validate().unwrap_err().field(), "location");
    }

    #[test]
    fn foreign_variant_fields_are_dropped() {
        let mut req = request("phone");
        req.contact_phone = Some("555-1234".into());
        req.location = Some("Room 101".into());
        let valid = req.validate().unwrap();
        assert_eq!(
            valid.details,
            VariantDetails::Phone {
                contact_phone: "555-1234".into()
            }
        );
    }

    #[test]
    fn variant_checked_before_timestamp() {
        let mut req = request("phone");
        req.scheduled_at = "tomorrow".into();
        assert_eq!(req.validate().unwrap_err().field(), "contact_phone");
    }

    #[test]
    fn timestamp_format_is_strict() {
        for raw in [
            "2025-06-01 10:30:00",
            "2025-06-01T10:30:00Z",
            "2025-06-01T10:30:00.5",
            "2025-06-01T10:30",
            "2025-13-01T10:30:00",
            "2025-6-1T10:30:00",
            "2025-06-01T9:30:00",
            "2025-06-01T10:30:60",
            "+2025-06-01T10:30:00",
            "２025-06-01T10:30:00",
        ] {
            assert_eq!(
                parse_scheduled_at(raw),
                Err(ValidationError::BadTimestamp(raw.to_string())),
                "{raw}"
            );
        }
        assert!(parse_scheduled_at("2025-06-01T10:30:00").is_ok());
    }

    #[test]
    fn staff_defaults_to_unassigned() {
        let mut req = request("in_person");
        req.location = Some("Room 101".into());
        req.assigned_staff = Some(String::new());
        assert_eq!(req.validate().unwrap().assigned_staff, UNASSIGNED);
    }

    #[test]
    fn appointment_json_flattens_details() {
        let mut req = request("phone");
        req.contact_phone = Some("555-1234".into());
        let valid = req.validate().unwrap();
        let appointment = Appointment {
            appointment_id: "a1".into(),
            patient: PatientSummary {
                patient_id: "P1".into(),
                display_name: "Ana Ruiz".into(),
            },
            assigned_staff: valid.assigned_staff,
            scheduled_at: valid.scheduled_at,
            reason: None,
            status: AppointmentStatus::Requested,
            attended: false,
            details: valid.details,
        };
        let json = serde_json::to_value(&appointment).unwrap();
        assert_eq!(json["kind"], "phone");
        assert_eq!(json["contact_phone"], "555-1234");
        assert_eq!(json["status"], "requested");
        assert_eq!(json["scheduled_at"], "2025-06-01T10:30:00");
    }
}
