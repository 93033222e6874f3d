use std::time::Duration;

use crate::domain::errors::{DomainError, Result};

/// Timing of the wake-to-ready protocol
#[derive(Debug, Clone, PartialEq)]
pub struct ReadinessPolicy {
    settle_interval: Duration,
    budget: Duration,
}

impl ReadinessPolicy {
    pub fn new(settle_interval: Duration, budget: Duration) -> Result<Self> {
        if settle_interval.is_zero() {
            return Err(DomainError::InvalidSettleInterval);
        }

        Ok(Self {
            settle_interval,
            budget,
        })
    }

    pub fn settle_interval(&self) -> Duration {
        self.settle_interval
    }

    /// Budget handed to the waiter on every start
    pub fn budget(&self) -> Duration {
        self.budget
    }
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            settle_interval: Duration::from_secs(7),
            budget: Duration::from_secs(10),
        }
    }
}
