//! Triage flow state

use crate::backend::{BookingRecord, Coordinates, DemoCredentials, DoctorCandidate, TriageResult};
use std::fmt;

/// Steps of the patient flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlowStep {
    #[default]
    Intake,
    Results,
    Confirmation,
}

impl FlowStep {
    /// 1-based position, as shown to the user
    pub fn number(&self) -> u8 {
        match self {
            FlowStep::Intake => 1,
            FlowStep::Results => 2,
            FlowStep::Confirmation => 3,
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowStep::Intake => "intake",
            FlowStep::Results => "results",
            FlowStep::Confirmation => "confirmation",
        };
        f.write_str(s)
    }
}

/// What the patient typed in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeForm {
    pub city: String,
    pub description: String,
}

impl IntakeForm {
    pub fn new(city: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            description: description.into(),
        }
    }

    /// Name of the first empty required field
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.city.trim().is_empty() {
            Some("city")
        } else if self.description.trim().is_empty() {
            Some("description")
        } else {
            None
        }
    }
}

/// Everything the flow currently shows
#[derive(Debug, Clone, Default)]
pub struct FlowSnapshot {
    pub step: FlowStep,
    pub form: IntakeForm,
    pub coordinates: Option<Coordinates>,
    pub triage: Option<TriageResult>,
    pub candidates: Vec<DoctorCandidate>,
    /// Booking shown on the confirmation step
    pub booked: Option<BookingRecord>,
    /// Server-owned appointment history, re-fetched after every mutation
    pub history: Vec<BookingRecord>,
}

/// Returned by a successful booking
#[derive(Debug, Clone, PartialEq)]
pub struct BookingOutcome {
    pub record: BookingRecord,
    /// One-time notice; the flow does not keep it
    pub demo_credentials: Option<DemoCredentials>,
}

/// Result of a cancellation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    /// The user said no; nothing was sent
    Declined,
}
