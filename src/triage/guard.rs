//! In-flight guards for mutating actions

use super::error::FlowError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Kinds of action that may only run one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Analyze,
    Book,
    Cancel,
    Approve,
}

impl Action {
    fn index(self) -> usize {
        match self {
            Action::Analyze => 0,
            Action::Book => 1,
            Action::Cancel => 2,
            Action::Approve => 3,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Analyze => "analysis",
            Action::Book => "booking",
            Action::Cancel => "cancellation",
            Action::Approve => "approval",
        };
        f.write_str(s)
    }
}

/// One flag per [`Action`]; a second `try_begin` of the same kind is
/// rejected until the first guard drops.
#[derive(Debug, Default)]
pub struct InFlight {
    flags: [AtomicBool; 4],
}

impl InFlight {
    pub fn try_begin(&self, action: Action) -> Result<InFlightGuard<'_>, FlowError> {
        let flag = &self.flags[action.index()];
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FlowError::InFlight(action))?;
        Ok(InFlightGuard { flag })
    }

    pub fn is_active(&self, action: Action) -> bool {
        self.flags[action.index()].load(Ordering::Acquire)
    }
}

/// Clears its flag when dropped
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_rejected_until_drop() {
        let in_flight = InFlight::default();

        let guard = in_flight.try_begin(Action::Book).unwrap();
        assert!(in_flight.is_active(Action::Book));
        assert!(matches!(
            in_flight.try_begin(Action::Book),
            Err(FlowError::InFlight(Action::Book))
        ));

        // other kinds are independent
        let _cancel = in_flight.try_begin(Action::Cancel).unwrap();

        drop(guard);
        assert!(!in_flight.is_active(Action::Book));
        assert!(in_flight.try_begin(Action::Book).is_ok());
    }
}
