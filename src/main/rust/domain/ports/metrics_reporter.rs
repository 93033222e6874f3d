use crate::domain::value_objects::{CameraId, SessionState};

/// Port for metrics reporting
pub trait MetricsReporter: Send + Sync {
    fn report_state_change(&self, vid: &CameraId, state: SessionState);
    fn report_wake_attempt(&self, accepted: bool);
    fn report_start_outcome(&self, outcome: &'static str);
    fn report_active_sessions(&self, count: usize);
    fn report_relay_started(&self);
    fn report_relay_stopped(&self);
}
