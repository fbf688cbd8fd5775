use std::fmt;
use std::str::FromStr;

use auth_identity::Role;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Length of the hexadecimal part of a SIP number.
pub const SIP_HEX_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Grave,
    Moderate,
    Mild,
}

impl Condition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grave => "grave",
            Self::Moderate => "moderate",
            Self::Mild => "mild",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grave" => Ok(Self::Grave),
            "moderate" | "moderado" => Ok(Self::Moderate),
            "mild" | "leve" => Ok(Self::Mild),
            other => Err(format!("unknown condition '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Patient {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub gender: String,
    pub condition: Condition,
    pub medical_history: Vec<String>,
    pub symptoms: Vec<String>,
    pub allergies: Vec<String>,
    pub doctor_id: Option<String>,
    pub nurse_id: Option<String>,
    pub room_number: Option<i32>,
}

impl Patient {
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Which staff identity store a [`StaffMember`] lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StaffKind {
    Doctor,
    Nurse,
}

impl StaffKind {
    #[must_use]
    pub fn entity(self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Nurse => "nurse",
        }
    }

    pub(crate) fn table(self) -> &'static str {
        match self {
            Self::Doctor => "doctors",
            Self::Nurse => "nurses",
        }
    }

    #[must_use]
    pub fn role(self) -> Role {
        match self {
            Self::Doctor => Role::Doctor,
            Self::Nurse => Role::Nurse,
        }
    }
}

/// Doctor or nurse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StaffMember {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub specialty: String,
    pub seniority_years: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Aide {
    pub id: String,
    pub seniority_years: i32,
    /// At most one aide per nurse.
    pub nurse_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Room {
    pub number: i32,
    pub capacity: i32,
    pub clean: bool,
}

/// A patient's health-card number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Sip {
    pub sip_number: String,
    pub patient_id: String,
}

impl Sip {
    /// `SIP-` followed by ten random upper-case hex digits.
    #[must_use]
    pub fn generate_number() -> String {
        format!("SIP-{}", crypto::random_upper_hex(SIP_HEX_LEN))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub dose: String,
    pub price: f64,
    #[schema(value_type = String, format = Date)]
    pub expires_on: NaiveDate,
    pub allergens: Vec<String>,
    /// Symptoms this medication relieves.
    pub treats: Vec<String>,
}
