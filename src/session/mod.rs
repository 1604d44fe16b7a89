//! Session
//!
//! The logged-in identity, passed explicitly into the controllers.
//! A [`SessionStore`] keeps it on disk between runs: it is written on
//! login and removed on logout.

mod store;

pub use store::{SessionError, SessionStore};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role; also the path segment of the auth endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Who is logged in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub role: Role,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,
}

/// Session handed to controllers at construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    /// Nobody logged in
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Patient id, if a patient is logged in
    pub fn patient_id(&self) -> Option<i64> {
        self.id_for(Role::Patient)
    }

    /// Doctor id, if a doctor is logged in
    pub fn doctor_id(&self) -> Option<i64> {
        self.id_for(Role::Doctor)
    }

    /// City remembered from login, used to prefill the intake form
    pub fn city(&self) -> Option<&str> {
        self.identity.as_ref().and_then(|i| i.city.as_deref())
    }

    fn id_for(&self, role: Role) -> Option<i64> {
        self.identity
            .as_ref()
            .filter(|i| i.role == role)
            .map(|i| i.id)
    }
}

impl From<Identity> for Session {
    fn from(identity: Identity) -> Self {
        Self::new(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> Identity {
        Identity {
            id: 4,
            role: Role::Patient,
            name: "Robin".into(),
            city: Some("Austin".into()),
            hospital_name: None,
        }
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert_eq!(" patient ".parse::<Role>().unwrap(), Role::Patient);
        assert!("nurse".parse::<Role>().is_err());
        assert_eq!(Role::Doctor.to_string(), "doctor");
    }

    #[test]
    fn test_role_scoped_ids() {
        let session = Session::new(patient());
        assert_eq!(session.patient_id(), Some(4));
        assert_eq!(session.doctor_id(), None);
        assert_eq!(session.city(), Some("Austin"));

        let anonymous = Session::anonymous();
        assert!(!anonymous.is_authenticated());
        assert_eq!(anonymous.patient_id(), None);
    }
}
