use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::domain::ports::CloudDeviceClient;
use crate::domain::value_objects::{AuthToken, CameraId};

/// Result of one wake-and-settle attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Wake accepted and the full settle interval elapsed
    Ready,
    /// The cloud refused or failed the wake; no settle wait happened
    WakeRejected(String),
    /// The settle budget is shorter than the settle interval
    BudgetExhausted,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// Wake-to-ready protocol: one wake, then a fixed settle interval.
///
/// Status is not polled after the wake because device lists are unreliable
/// right after a wake. The wake itself is bounded by the cloud client's
/// request timeout and a stalled wake comes back as a rejection. The budget
/// starts once the wake is accepted; readiness is never reported before the
/// settle interval has fully elapsed.
pub struct ReadinessWaiter {
    cloud: Arc<dyn CloudDeviceClient>,
    settle_interval: Duration,
}

impl ReadinessWaiter {
    pub fn new(cloud: Arc<dyn CloudDeviceClient>, settle_interval: Duration) -> Self {
        Self {
            cloud,
            settle_interval,
        }
    }

    pub async fn await_ready(&self, vid: &CameraId, token: &AuthToken, budget: Duration) -> bool {
        self.wait(vid, token, budget).await.is_ready()
    }

    pub async fn wait(&self, vid: &CameraId, token: &AuthToken, budget: Duration) -> Readiness {
        let wake = self.cloud.wake(vid, token).await;

        if !wake.ok {
            let reason = wake
                .diagnostic
                .unwrap_or_else(|| "wake rejected".to_string());
            return Readiness::WakeRejected(reason);
        }

        if budget < self.settle_interval {
            tracing::warn!(
                vid = %vid,
                budget_ms = budget.as_millis() as u64,
                settle_ms = self.settle_interval.as_millis() as u64,
                "Budget shorter than settle interval"
            );
            sleep(budget).await;
            return Readiness::BudgetExhausted;
        }

        tracing::info!(vid = %vid, settle_ms = self.settle_interval.as_millis() as u64, "Waiting for camera to settle");
        sleep(self.settle_interval).await;
        tracing::info!(vid = %vid, "Camera settled");

        Readiness::Ready
    }
}
