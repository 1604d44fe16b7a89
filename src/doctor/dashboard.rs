use crate::backend::{AppointmentId, AppointmentStatus, BookingRecord, ClinicBackend};
use crate::session::Session;
use crate::triage::{Action, CancelOutcome, Confirm, FlowError, InFlight};
use std::sync::Arc;
use tokio::sync::RwLock;

const CANCEL_PROMPT: &str = "Are you sure you want to cancel this appointment?";

/// Patient queue for the logged-in doctor
pub struct DoctorDashboard {
    backend: Arc<dyn ClinicBackend>,
    session: Session,
    appointments: RwLock<Vec<BookingRecord>>,
    in_flight: InFlight,
}

impl DoctorDashboard {
    pub fn new(backend: Arc<dyn ClinicBackend>, session: Session) -> Self {
        Self {
            backend,
            session,
            appointments: RwLock::new(Vec::new()),
            in_flight: InFlight::default(),
        }
    }

    /// Clinic name shown in the header
    pub fn hospital_name(&self) -> &str {
        self.session
            .identity()
            .and_then(|i| i.hospital_name.as_deref())
            .unwrap_or("My Clinic")
    }

    pub async fn appointments(&self) -> Vec<BookingRecord> {
        self.appointments.read().await.clone()
    }

    pub async fn pending_count(&self) -> usize {
        self.appointments
            .read()
            .await
            .iter()
            .filter(|a| a.status == AppointmentStatus::Pending)
            .count()
    }

    fn doctor_id(&self) -> Result<i64, FlowError> {
        self.session.doctor_id().ok_or(FlowError::Unauthenticated)
    }

    /// Reload the queue from the backend
    pub async fn refresh(&self) -> Result<(), FlowError> {
        let doctor_id = self.doctor_id()?;
        let appointments = self.backend.doctor_appointments(doctor_id).await?;
        tracing::debug!(doctor_id, count = appointments.len(), "Loaded patient queue");
        *self.appointments.write().await = appointments;
        Ok(())
    }

    /// Accept a pending request
    pub async fn approve(&self, id: AppointmentId) -> Result<(), FlowError> {
        self.doctor_id()?;
        let _guard = self.in_flight.try_begin(Action::Approve)?;

        self.backend.approve_appointment(id).await?;
        tracing::info!(appointment_id = id, "Appointment approved");
        self.refresh_after_change().await;
        Ok(())
    }

    /// Cancel an appointment, after asking the user
    pub async fn cancel(
        &self,
        id: AppointmentId,
        confirm: &dyn Confirm,
    ) -> Result<CancelOutcome, FlowError> {
        self.doctor_id()?;
        if !confirm.confirm(CANCEL_PROMPT) {
            return Ok(CancelOutcome::Declined);
        }
        let _guard = self.in_flight.try_begin(Action::Cancel)?;

        self.backend.cancel_appointment(id).await?;
        tracing::info!(appointment_id = id, "Appointment cancelled by doctor");
        self.refresh_after_change().await;
        Ok(CancelOutcome::Cancelled)
    }

    /// The change already happened, so a failed reload only leaves a stale queue
    async fn refresh_after_change(&self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Failed to reload patient queue");
        }
    }
}
