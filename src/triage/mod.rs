//! Patient Triage Flow
//!
//! Client-side controller for the patient journey:
//!
//! ```text
//! Intake --analyze--> Results --book--> Confirmation
//!   ^                   |                    |
//!   +------back---------+                    |
//!   +-----------------restart----------------+
//! ```
//!
//! `cancel` and `refresh_history` work from any step. Backend calls go
//! through [`ClinicBackend`](crate::backend::ClinicBackend); state is only
//! written once a call has completed.

mod error;
mod flow;
mod guard;
mod state;

pub use error::FlowError;
pub use flow::TriageFlow;
pub use guard::{Action, InFlight, InFlightGuard};
pub use state::{BookingOutcome, CancelOutcome, FlowSnapshot, FlowStep, IntakeForm};

/// Asks the user to confirm a destructive action
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirms everything (`--yes`)
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
