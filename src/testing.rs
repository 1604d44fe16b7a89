//! In-memory test doubles for the backend and geocoder

use crate::backend::*;
use crate::geo::{GeoError, ReverseGeocoder};
use crate::session::{Identity, Role, Session};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub(crate) const FAKE_DOCTOR_ID: i64 = 900;

pub(crate) fn patient_session(id: i64) -> Session {
    Session::new(Identity {
        id,
        role: Role::Patient,
        name: format!("Patient {}", id),
        city: Some("Austin".into()),
        hospital_name: None,
    })
}

pub(crate) fn doctor_session(id: i64) -> Session {
    Session::new(Identity {
        id,
        role: Role::Doctor,
        name: "Ann Lee".into(),
        city: Some("Austin".into()),
        hospital_name: Some("Smile Clinic".into()),
    })
}

/// Lets a test pause `book` mid-request
#[derive(Clone, Default)]
pub(crate) struct BookingHold {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

struct StoredAppointment {
    patient_id: i64,
    doctor_id: i64,
    record: BookingRecord,
}

#[derive(Default)]
struct FakeState {
    appointments: Vec<StoredAppointment>,
    next_id: AppointmentId,
    failing: HashSet<&'static str>,
    last_booking: Option<BookingRequest>,
    last_search: Option<DoctorSearch>,
    hold: Option<BookingHold>,
}

/// Backend double with the real service's observable rules:
/// registered doctors confirm immediately, everyone else stays pending.
#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<FakeState>,
    calls: AtomicUsize,
    bookings: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an endpoint fail with a 500
    pub fn fail(&self, endpoint: &'static str) {
        self.state.lock().unwrap().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: &'static str) {
        self.state.lock().unwrap().failing.remove(endpoint);
    }

    pub fn hold_bookings(&self) -> BookingHold {
        let hold = BookingHold::default();
        self.state.lock().unwrap().hold = Some(hold.clone());
        hold
    }

    pub fn seed_appointment(&self, patient_id: i64, doctor_name: &str) -> AppointmentId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.appointments.push(StoredAppointment {
            patient_id,
            doctor_id: FAKE_DOCTOR_ID,
            record: record(id, AppointmentStatus::Pending, doctor_name, "1 Main St", patient_id),
        });
        id
    }

    /// Number of backend calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn bookings(&self) -> usize {
        self.bookings.load(Ordering::SeqCst)
    }

    pub fn last_booking(&self) -> Option<BookingRequest> {
        self.state.lock().unwrap().last_booking.clone()
    }

    pub fn last_search(&self) -> Option<DoctorSearch> {
        self.state.lock().unwrap().last_search.clone()
    }

    fn enter(&self, endpoint: &'static str) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.state.lock().unwrap().failing.contains(endpoint) {
            return Err(BackendError::Api {
                status: 500,
                message: GENERIC_SERVER_ERROR.to_string(),
            });
        }
        Ok(())
    }

    fn list(&self, filter: impl Fn(&StoredAppointment) -> bool) -> Vec<BookingRecord> {
        self.state
            .lock()
            .unwrap()
            .appointments
            .iter()
            .filter(|a| filter(a))
            .map(|a| a.record.clone())
            .collect()
    }
}

fn record(
    id: AppointmentId,
    status: AppointmentStatus,
    doctor_name: &str,
    address: &str,
    patient_id: i64,
) -> BookingRecord {
    BookingRecord {
        id,
        status,
        doctor_name: Some(doctor_name.to_string()),
        clinic_address: Some(address.to_string()),
        appointment_time: NaiveDate::from_ymd_opt(2026, 10, 16)
            .and_then(|d| d.and_hms_opt(14, 0, 0))
            .unwrap(),
        patient_name: Some(format!("Patient {}", patient_id)),
        urgency: None,
    }
}

fn not_found() -> BackendError {
    BackendError::Api {
        status: 404,
        message: "Appointment not found".to_string(),
    }
}

#[async_trait]
impl ClinicBackend for FakeBackend {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<TriageResult, BackendError> {
        self.enter("analyze")?;
        let (urgency, specialist) = if request.description.contains("tooth") {
            (Urgency::High, "Dentist")
        } else {
            (Urgency::Medium, "General Physician")
        };
        Ok(TriageResult {
            urgency,
            summary: format!("Assessment of: {}", request.description),
            recommended_specialist: specialist.to_string(),
            reasoning: None,
            care_advice: Some("Rest".into()),
        })
    }

    async fn search_doctors(
        &self,
        search: &DoctorSearch,
    ) -> Result<Vec<DoctorCandidate>, BackendError> {
        self.enter("search")?;
        self.state.lock().unwrap().last_search = Some(search.clone());
        Ok(vec![
            DoctorCandidate {
                name: "Dr. Gomez".into(),
                hospital_name: format!("{} {} Care", search.city, search.specialty),
                specialty: search.specialty.clone(),
                address: "1 Congress Ave".into(),
                rating: 4.8,
                google_maps_link: "https://maps.example/gomez".into(),
                is_registered: true,
            },
            DoctorCandidate {
                name: format!("{} Specialist", search.specialty),
                hospital_name: "Walk-in Clinic".into(),
                specialty: search.specialty.clone(),
                address: format!("Near {}", search.city),
                rating: 4.0,
                google_maps_link: String::new(),
                is_registered: false,
            },
        ])
    }

    async fn book(&self, request: &BookingRequest) -> Result<BookingReceipt, BackendError> {
        self.enter("book")?;
        let hold = self.state.lock().unwrap().hold.clone();
        if let Some(hold) = hold {
            hold.entered.notify_one();
            hold.release.notified().await;
        }
        self.bookings.fetch_add(1, Ordering::SeqCst);

        let status = if request.is_registered {
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Pending
        };

        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        let mut stored = record(id, status, &request.doctor_name, &request.address, request.patient_id);
        stored.urgency = Some(request.urgency);
        state.appointments.push(StoredAppointment {
            patient_id: request.patient_id,
            doctor_id: FAKE_DOCTOR_ID,
            record: stored,
        });
        state.last_booking = Some(request.clone());

        // the response carries only id, status and time
        let mut returned = record(id, status, "", "", request.patient_id);
        returned.doctor_name = None;
        returned.clinic_address = None;
        returned.patient_name = None;

        Ok(BookingReceipt {
            record: returned,
            demo_credentials: (!request.is_registered).then(|| DemoCredentials {
                username: "dr_specialist_123".into(),
                password: "123".into(),
            }),
        })
    }

    async fn patient_appointments(
        &self,
        patient_id: i64,
    ) -> Result<Vec<BookingRecord>, BackendError> {
        self.enter("patient_appointments")?;
        Ok(self.list(|a| a.patient_id == patient_id))
    }

    async fn doctor_appointments(
        &self,
        doctor_id: i64,
    ) -> Result<Vec<BookingRecord>, BackendError> {
        self.enter("doctor_appointments")?;
        Ok(self.list(|a| a.doctor_id == doctor_id))
    }

    async fn approve_appointment(&self, id: AppointmentId) -> Result<(), BackendError> {
        self.enter("approve")?;
        let mut state = self.state.lock().unwrap();
        let apt = state
            .appointments
            .iter_mut()
            .find(|a| a.record.id == id)
            .ok_or_else(not_found)?;
        apt.record.status = AppointmentStatus::Confirmed;
        Ok(())
    }

    async fn cancel_appointment(&self, id: AppointmentId) -> Result<(), BackendError> {
        self.enter("cancel")?;
        let mut state = self.state.lock().unwrap();
        let before = state.appointments.len();
        state.appointments.retain(|a| a.record.id != id);
        if state.appointments.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

/// Geocoder that answers with a fixed name, or always fails
pub(crate) struct FakeGeocoder(Option<String>);

impl FakeGeocoder {
    pub fn named(city: &str) -> Self {
        Self(Some(city.to_string()))
    }

    pub fn failing() -> Self {
        Self(None)
    }
}

#[async_trait]
impl ReverseGeocoder for FakeGeocoder {
    async fn city_name(&self, _coords: Coordinates) -> Result<String, GeoError> {
        self.0.clone().ok_or(GeoError::Status(503))
    }
}
