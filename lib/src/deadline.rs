//! Request deadlines.

use std::time::{Duration, Instant};
use crate::error::{Error, Result};

/// The instant after which a request must not start any more persistence
/// calls.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn none() -> Deadline {
        Deadline { at: None }
    }

    pub fn at(at: Instant) -> Deadline {
        Deadline { at: Some(at) }
    }

    /// `None` means no deadline.
    pub fn after(timeout: Option<Duration>) -> Deadline {
        Deadline { at: timeout.map(|t| Instant::now() + t) }
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining() == Some(Duration::ZERO)
    }

    /// Fail with [`Error::DeadlineExceeded`] once the deadline has passed.
    pub fn check(&self) -> Result<()> {
        if self.is_expired() {
            Err(Error::DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Deadline::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_never_expires() {
        assert_eq!(Deadline::none().check(), Ok(()));
        assert_eq!(Deadline::after(None).remaining(), None);
    }

    #[test]
    fn past_deadline_fails_check() {
        let d = Deadline::at(Instant::now() - Duration::from_millis(5));
        assert_eq!(d.check(), Err(Error::DeadlineExceeded));
    }

    #[test]
    fn future_deadline_passes_check() {
        let d = Deadline::after(Some(Duration::from_secs(60)));
        assert_eq!(d.check(), Ok(()));
        assert!(d.remaining().unwrap() > Duration::from_secs(59));
    }
}
