//! Triage flow controller

use super::error::FlowError;
use super::guard::{Action, InFlight};
use super::state::{BookingOutcome, CancelOutcome, FlowSnapshot, FlowStep, IntakeForm};
use super::Confirm;
use crate::backend::{
    AnalyzeRequest, AppointmentId, BookingRecord, BookingRequest, ClinicBackend,
    DoctorCandidate, DoctorSearch, TriageResult, Urgency,
};
use crate::geo::{self, Geolocator, LocationFix, NoGeolocation, ReverseGeocoder};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::RwLock;

const CANCEL_PROMPT: &str = "Cancel this appointment?";

/// Drives one patient through intake, results and confirmation
pub struct TriageFlow {
    backend: Arc<dyn ClinicBackend>,
    session: Session,
    locator: Arc<dyn Geolocator>,
    geocoder: Option<Arc<dyn ReverseGeocoder>>,
    state: RwLock<FlowSnapshot>,
    in_flight: InFlight,
}

impl TriageFlow {
    /// Create a flow for the given session.
    ///
    /// The intake city starts from the city remembered at login.
    pub fn new(backend: Arc<dyn ClinicBackend>, session: Session) -> Self {
        let form = IntakeForm::new(session.city().unwrap_or_default(), "");

        Self {
            backend,
            session,
            locator: Arc::new(NoGeolocation),
            geocoder: None,
            state: RwLock::new(FlowSnapshot {
                form,
                ..FlowSnapshot::default()
            }),
            in_flight: InFlight::default(),
        }
    }

    /// Enable location detection
    pub fn with_geolocation(
        mut self,
        locator: Arc<dyn Geolocator>,
        geocoder: Option<Arc<dyn ReverseGeocoder>>,
    ) -> Self {
        self.locator = locator;
        self.geocoder = geocoder;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn step(&self) -> FlowStep {
        self.state.read().await.step
    }

    /// Copy of the current state for rendering
    pub async fn snapshot(&self) -> FlowSnapshot {
        self.state.read().await.clone()
    }

    /// True while an analysis is outstanding
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_active(Action::Analyze)
    }

    /// Intake -> Results.
    ///
    /// Runs the AI analysis, then the doctor search for the recommended
    /// specialist. State is only touched when both calls succeed.
    pub async fn analyze(&self, form: IntakeForm) -> Result<(), FlowError> {
        let _busy = self.in_flight.try_begin(Action::Analyze)?;

        let coordinates = {
            let state = self.state.read().await;
            if state.step != FlowStep::Intake {
                return Err(FlowError::WrongStep {
                    action: "analyze",
                    step: state.step,
                });
            }
            state.coordinates
        };

        if let Some(field) = form.missing_field() {
            return Err(FlowError::Validation(format!("{} is required", field)));
        }

        let triage = self
            .backend
            .analyze(&AnalyzeRequest {
                description: form.description.clone(),
                city: form.city.clone(),
            })
            .await?;

        let candidates = self
            .backend
            .search_doctors(&DoctorSearch {
                specialty: triage.recommended_specialist.clone(),
                city: form.city.clone(),
                coordinates,
            })
            .await?;

        tracing::info!(
            urgency = %triage.urgency,
            specialist = %triage.recommended_specialist,
            candidates = candidates.len(),
            "Triage complete"
        );

        let mut state = self.state.write().await;
        state.form = form;
        state.triage = Some(triage);
        state.candidates = candidates;
        state.step = FlowStep::Results;
        Ok(())
    }

    /// Results -> Intake, keeping what was typed
    pub async fn back(&self) -> Result<(), FlowError> {
        let mut state = self.state.write().await;
        if state.step != FlowStep::Results {
            return Err(FlowError::WrongStep {
                action: "go back",
                step: state.step,
            });
        }
        state.step = FlowStep::Intake;
        Ok(())
    }

    /// Results -> Confirmation.
    ///
    /// Needs a patient session; without one nothing is sent.
    pub async fn book(&self, candidate: &DoctorCandidate) -> Result<BookingOutcome, FlowError> {
        let patient_id = self.session.patient_id().ok_or(FlowError::Unauthenticated)?;
        let _guard = self.in_flight.try_begin(Action::Book)?;

        let request = {
            let state = self.state.read().await;
            if state.step != FlowStep::Results {
                return Err(FlowError::WrongStep {
                    action: "book",
                    step: state.step,
                });
            }
            booking_request(candidate, &state.form, state.triage.as_ref(), patient_id)
        };

        let receipt = self.backend.book(&request).await?;

        let mut record = receipt.record;
        if record.doctor_name.is_none() {
            record.doctor_name = Some(request.doctor_name.clone());
        }
        if record.clinic_address.is_none() {
            record.clinic_address = Some(request.address.clone());
        }

        tracing::info!(
            appointment_id = record.id,
            status = %record.status,
            doctor = %request.doctor_name,
            "Appointment booked"
        );

        let history = match self.backend.patient_appointments(patient_id).await {
            Ok(history) => Some(history),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh history after booking");
                None
            }
        };

        let mut state = self.state.write().await;
        if let Some(history) = history {
            state.history = history;
        }
        state.booked = Some(record.clone());
        state.step = FlowStep::Confirmation;

        Ok(BookingOutcome {
            record,
            demo_credentials: receipt.demo_credentials,
        })
    }

    /// Back to an empty intake form. The city and any detected position
    /// are kept; everything else is cleared.
    pub async fn restart(&self) {
        let mut state = self.state.write().await;
        state.form.description.clear();
        state.triage = None;
        state.candidates.clear();
        state.booked = None;
        state.step = FlowStep::Intake;
    }

    /// Re-fetch the patient's appointments. No-op without a patient session.
    pub async fn refresh_history(&self) -> Result<(), FlowError> {
        let Some(patient_id) = self.session.patient_id() else {
            return Ok(());
        };

        let history = self.backend.patient_appointments(patient_id).await?;
        self.state.write().await.history = history;
        Ok(())
    }

    /// Cancel an appointment from the history, after asking the user.
    pub async fn cancel(
        &self,
        id: AppointmentId,
        confirm: &dyn Confirm,
    ) -> Result<CancelOutcome, FlowError> {
        let patient_id = self.session.patient_id().ok_or(FlowError::Unauthenticated)?;
        if self.state.read().await.history.is_empty() {
            return Err(FlowError::Validation("no appointments to cancel".into()));
        }

        if !confirm.confirm(CANCEL_PROMPT) {
            return Ok(CancelOutcome::Declined);
        }

        let _guard = self.in_flight.try_begin(Action::Cancel)?;
        self.backend.cancel_appointment(id).await?;
        tracing::info!(appointment_id = id, "Appointment cancelled");

        let refreshed = match self.backend.patient_appointments(patient_id).await {
            Ok(history) => Some(history),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh history after cancel");
                None
            }
        };

        let mut state = self.state.write().await;
        match refreshed {
            Some(history) => state.history = history,
            None => state.history.retain(|apt| apt.id != id),
        }
        if state.booked.as_ref().map(|b| b.id) == Some(id) {
            state.booked = None;
        }

        Ok(CancelOutcome::Cancelled)
    }

    /// Fill the city from the device position.
    ///
    /// Best-effort: failures and missing capability leave the form alone.
    pub async fn detect_location(&self) -> Option<LocationFix> {
        let fix = geo::locate(self.locator.as_ref(), self.geocoder.as_deref()).await?;

        let mut state = self.state.write().await;
        state.coordinates = Some(fix.coordinates);
        if let Some(city) = &fix.city {
            tracing::info!(city = %city, "Detected location");
            state.form.city = city.clone();
        }

        Some(fix)
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Merge the chosen candidate with the trip context and the patient
fn booking_request(
    candidate: &DoctorCandidate,
    form: &IntakeForm,
    triage: Option<&TriageResult>,
    patient_id: i64,
) -> BookingRequest {
    let recommended = triage
        .map(|t| t.recommended_specialist.as_str())
        .unwrap_or_default();

    BookingRequest {
        doctor_name: non_empty_or(&candidate.name, "Unknown Doctor"),
        hospital_name: non_empty_or(&candidate.hospital_name, "Unknown Clinic"),
        specialty: non_empty_or(&candidate.specialty, &non_empty_or(recommended, "General")),
        address: non_empty_or(&candidate.address, &form.city),
        city: form.city.clone(),
        google_maps_link: candidate.google_maps_link.clone(),
        patient_id,
        symptom_description: form.description.clone(),
        ai_summary: triage
            .map(|t| non_empty_or(&t.summary, "No summary"))
            .unwrap_or_else(|| "No summary".to_string()),
        urgency: triage.map(|t| t.urgency).unwrap_or(Urgency::Low),
        is_registered: candidate.is_registered,
    }
}
