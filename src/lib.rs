//! # DocAssist
//!
//! Client for the DocAssist clinic service: describe symptoms, get an AI
//! triage verdict, find a matching doctor nearby and book a visit.
//!
//! ## Modules
//!
//! - [`backend`]: typed REST client for the DocAssist API
//! - [`triage`]: the patient flow (intake, results, confirmation)
//! - [`doctor`]: the doctor-side patient queue
//! - [`session`]: logged-in identity and its on-disk store
//! - [`auth`]: registration and login
//! - [`geo`]: device position and reverse geocoding
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docassist::{BackendClient, Config, IntakeForm, SessionStore, TriageFlow};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let client = BackendClient::new(&config.backend)?;
//!     let session = SessionStore::new(config.session_path()).load()?;
//!
//!     let flow = TriageFlow::new(Arc::new(client), session);
//!     flow.analyze(IntakeForm::new("Austin", "severe tooth pain")).await?;
//!
//!     let snapshot = flow.snapshot().await;
//!     if let Some(doctor) = snapshot.candidates.iter().find(|c| c.is_registered) {
//!         let outcome = flow.book(doctor).await?;
//!         println!("Booked: {}", outcome.record.status);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod backend;
pub mod config;
pub mod doctor;
pub mod geo;
pub mod session;
pub mod triage;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthError, AuthService};

pub use backend::{
    AppointmentId, AppointmentStatus, BackendClient, BackendError, BookingRecord, ClinicBackend,
    Coordinates, DemoCredentials, DoctorCandidate, TriageResult, Urgency,
};

pub use config::{Config, ConfigError, LoggingConfig};

pub use doctor::DoctorDashboard;

pub use geo::{BigDataCloudGeocoder, FixedPosition, GeoError, Geolocator, NoGeolocation, ReverseGeocoder};

pub use session::{Identity, Role, Session, SessionError, SessionStore};

pub use triage::{
    AssumeYes, BookingOutcome, CancelOutcome, Confirm, FlowError, FlowSnapshot, FlowStep,
    IntakeForm, TriageFlow,
};
