//! DocAssist Backend
//!
//! Everything this crate knows about the remote DocAssist REST service.
//!
//! ## Architecture
//!
//! - **dto**: request/response bodies for every endpoint
//! - **client**: `reqwest`-based HTTP client
//! - **ClinicBackend**: the seam the controllers talk through, so they
//!   can run against the real client or an in-memory double

mod client;
pub mod dto;
mod error;

pub use client::BackendClient;
pub use dto::{
    maps_search_link, AnalyzeRequest, AppointmentId, AppointmentStatus, BookingReceipt,
    BookingRecord, BookingRequest, Coordinates, DemoCredentials, DoctorCandidate,
    DoctorRegistration, DoctorSearch, LoginRequest, LoginResponse, PatientRegistration,
    TriageResult, Urgency,
};
pub use error::{extract_message, BackendError, GENERIC_SERVER_ERROR};

use async_trait::async_trait;

/// Backend operations used by the triage flow and the doctor dashboard
#[async_trait]
pub trait ClinicBackend: Send + Sync {
    /// `POST /api/analyze`
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<TriageResult, BackendError>;

    /// `GET /api/doctors/search`
    async fn search_doctors(
        &self,
        search: &DoctorSearch,
    ) -> Result<Vec<DoctorCandidate>, BackendError>;

    /// `POST /api/book`
    async fn book(&self, request: &BookingRequest) -> Result<BookingReceipt, BackendError>;

    /// `GET /api/patient/{id}/appointments`
    async fn patient_appointments(&self, patient_id: i64)
        -> Result<Vec<BookingRecord>, BackendError>;

    /// `GET /api/doctor/{id}/appointments`
    async fn doctor_appointments(&self, doctor_id: i64)
        -> Result<Vec<BookingRecord>, BackendError>;

    /// `PUT /api/appointment/{id}/approve`
    async fn approve_appointment(&self, id: AppointmentId) -> Result<(), BackendError>;

    /// `DELETE /api/appointment/{id}`
    async fn cancel_appointment(&self, id: AppointmentId) -> Result<(), BackendError>;
}
