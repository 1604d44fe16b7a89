//! Doctor Dashboard
//!
//! The clinic side of the booking workflow: a doctor sees the patient
//! queue, accepts pending requests and cancels appointments. Each change
//! is followed by a full reload of the queue.

mod dashboard;

pub use dashboard::DoctorDashboard;
