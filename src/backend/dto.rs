//! Wire Types
//!
//! Request and response bodies exchanged with the DocAssist backend.
//! Response types are lenient: the backend omits fields freely, so most
//! of them fall back to empty values instead of failing the whole call.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Appointment identifier assigned by the backend
pub type AppointmentId = i64;

/// Triage urgency as reported by the analysis endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    #[default]
    Low,
    Medium,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
        };
        f.write_str(s)
    }
}

/// Approval state of an appointment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => f.write_str("Pending"),
            AppointmentStatus::Confirmed => f.write_str("Confirmed"),
        }
    }
}

/// Device position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Body of `POST /api/analyze`
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub description: String,
    pub city: String,
}

/// AI triage verdict for a symptom description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    pub urgency: Urgency,
    pub summary: String,
    pub recommended_specialist: String,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub care_advice: Option<String>,
}

/// Query of `GET /api/doctors/search`
#[derive(Debug, Clone, PartialEq)]
pub struct DoctorSearch {
    pub specialty: String,
    pub city: String,
    pub coordinates: Option<Coordinates>,
}

/// A doctor or clinic returned by the search endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorCandidate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hospital_name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub google_maps_link: String,
    #[serde(default)]
    pub is_registered: bool,
}

impl DoctorCandidate {
    /// Label of the booking action offered for this candidate.
    ///
    /// Registered doctors take bookings directly; everyone else only
    /// receives a visit request that waits for approval.
    pub fn booking_action(&self) -> &'static str {
        if self.is_registered {
            "Instant Book"
        } else {
            "Request Visit"
        }
    }
}

/// Body of `POST /api/book`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub doctor_name: String,
    pub hospital_name: String,
    pub specialty: String,
    pub address: String,
    pub city: String,
    pub google_maps_link: String,
    pub patient_id: i64,
    pub symptom_description: String,
    pub ai_summary: String,
    pub urgency: Urgency,
    pub is_registered: bool,
}

/// Login issued for a doctor the backend created on the fly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoCredentials {
    pub username: String,
    pub password: String,
}

/// An appointment as listed in patient or doctor history.
///
/// The two history endpoints return different subsets of these fields,
/// so everything beyond `id`, `status` and `appointment_time` is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub id: AppointmentId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub clinic_address: Option<String>,
    #[serde(alias = "time", deserialize_with = "timestamp")]
    pub appointment_time: NaiveDateTime,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub urgency: Option<Urgency>,
}

/// Response of `POST /api/book`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookingReceipt {
    #[serde(flatten)]
    pub record: BookingRecord,
    #[serde(default)]
    pub demo_credentials: Option<DemoCredentials>,
}

/// Body of `POST /api/auth/{role}/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response of `POST /api/auth/{role}/login`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub hospital_name: Option<String>,
}

/// Body of `POST /api/auth/patient/register`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub city: String,
    pub age: u32,
}

/// Body of `POST /api/auth/doctor/register`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorRegistration {
    pub name: String,
    pub username: String,
    pub password: String,
    pub city: String,
    pub specialty: String,
    pub hospital_name: String,
    pub address: String,
    pub google_maps_link: String,
}

impl DoctorRegistration {
    /// Build a registration, deriving the maps link from the clinic location
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        city: impl Into<String>,
        specialty: impl Into<String>,
        hospital_name: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        let city = city.into();
        let hospital_name = hospital_name.into();
        let address = address.into();
        let google_maps_link = maps_search_link(&format!("{} {} {}", hospital_name, address, city));

        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
            city,
            specialty: specialty.into(),
            hospital_name,
            address,
            google_maps_link,
        }
    }
}

/// Google Maps search URL for a free-text query
pub fn maps_search_link(query: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        urlencoding::encode(query)
    )
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts naive ISO-8601 (server local time) as well as RFC 3339.
fn timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid appointment time: {}", raw))
    })
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_history_record() {
        let json = r#"{
            "doctor_name": "Dr. Rao",
            "clinic_address": "12 Main St",
            "urgency": "High",
            "appointment_time": "2026-10-16T14:30:00.123456",
            "status": "Confirmed",
            "id": 7
        }"#;

        let record: BookingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.status, AppointmentStatus::Confirmed);
        assert_eq!(record.doctor_name.as_deref(), Some("Dr. Rao"));
        assert_eq!(record.urgency, Some(Urgency::High));
        assert_eq!(record.appointment_time.format("%H:%M").to_string(), "14:30");
    }

    #[test]
    fn test_missing_or_null_status_is_pending() {
        let missing: BookingRecord =
            serde_json::from_str(r#"{"id": 1, "appointment_time": "2026-10-16T09:00:00"}"#).unwrap();
        assert_eq!(missing.status, AppointmentStatus::Pending);

        let null: BookingRecord = serde_json::from_str(
            r#"{"id": 1, "status": null, "appointment_time": "2026-10-16T09:00:00"}"#,
        )
        .unwrap();
        assert_eq!(null.status, AppointmentStatus::Pending);
    }

    #[test]
    fn test_booking_receipt_uses_time_alias() {
        let json = r#"{
            "message": "Success",
            "status": "Pending",
            "time": "2026-10-16T11:00:00Z",
            "doctor_id": 3,
            "id": 42,
            "demo_credentials": {"username": "dr_smith_123", "password": "123"}
        }"#;

        let receipt: BookingReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.record.id, 42);
        assert_eq!(receipt.record.status, AppointmentStatus::Pending);
        assert_eq!(
            receipt.demo_credentials.map(|c| c.username).as_deref(),
            Some("dr_smith_123")
        );
    }

    #[test]
    fn test_candidate_defaults_and_action() {
        let candidate: DoctorCandidate =
            serde_json::from_str(r#"{"hospital_name": "City Dental", "is_registered": true}"#)
                .unwrap();
        assert_eq!(candidate.name, "");
        assert_eq!(candidate.rating, 0.0);
        assert_eq!(candidate.booking_action(), "Instant Book");
        assert_eq!(DoctorCandidate::default().booking_action(), "Request Visit");
    }

    #[test]
    fn test_doctor_registration_maps_link() {
        let reg = DoctorRegistration::new(
            "Ann Lee",
            "annlee",
            "secret",
            "Austin",
            "Dentist",
            "Smile Clinic",
            "5 Oak Ave",
        );
        assert_eq!(
            reg.google_maps_link,
            "https://www.google.com/maps/search/?api=1&query=Smile%20Clinic%205%20Oak%20Ave%20Austin"
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("tomorrow").is_none());
        assert!(parse_timestamp("2026-10-16 08:15:00").is_some());
    }
}
