use lazy_static::lazy_static;
use prometheus::{Encoder, GaugeVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::domain::ports::MetricsReporter;
use crate::domain::value_objects::{CameraId, SessionState};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Per-camera state (0=Absent, 1=Waking, 2=Ready, 3=Active)
    pub static ref CAMERA_STATE: GaugeVec = GaugeVec::new(
        Opts::new("bridge_camera_state", "Current orchestration state per camera"),
        &["vid"]
    ).expect("metric can be created");

    pub static ref ACTIVE_SESSIONS: IntGauge = IntGauge::new(
        "bridge_active_sessions",
        "Number of cameras with an active session"
    ).expect("metric can be created");

    pub static ref WAKE_ATTEMPTS: IntCounterVec = IntCounterVec::new(
        Opts::new("bridge_wake_attempts_total", "Wake commands sent, by result"),
        &["result"]
    ).expect("metric can be created");

    pub static ref START_OUTCOMES: IntCounterVec = IntCounterVec::new(
        Opts::new("bridge_stream_starts_total", "Stream start requests, by outcome"),
        &["outcome"]
    ).expect("metric can be created");

    pub static ref RUNNING_RELAYS: IntGauge = IntGauge::new(
        "bridge_running_relays",
        "Relay processes currently owned by sessions"
    ).expect("metric can be created");
}

pub struct PrometheusReporter;

impl PrometheusReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn init_metrics() -> Result<(), prometheus::Error> {
        REGISTRY.register(Box::new(CAMERA_STATE.clone()))?;
        REGISTRY.register(Box::new(ACTIVE_SESSIONS.clone()))?;
        REGISTRY.register(Box::new(WAKE_ATTEMPTS.clone()))?;
        REGISTRY.register(Box::new(START_OUTCOMES.clone()))?;
        REGISTRY.register(Box::new(RUNNING_RELAYS.clone()))?;
        Ok(())
    }

    pub fn gather_metrics() -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = REGISTRY.gather();
        let mut buffer = vec![];
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
            return b"# Error encoding metrics\n".to_vec();
        }
        buffer
    }
}

impl Default for PrometheusReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsReporter for PrometheusReporter {
    fn report_state_change(&self, vid: &CameraId, state: SessionState) {
        // Absent cameras drop their series so arbitrary ids cannot pile up
        if state == SessionState::Absent {
            let _ = CAMERA_STATE.remove_label_values(&[vid.as_str()]);
            return;
        }
        CAMERA_STATE
            .with_label_values(&[vid.as_str()])
            .set(state.as_metric());
    }

    fn report_wake_attempt(&self, accepted: bool) {
        let result = if accepted { "accepted" } else { "rejected" };
        WAKE_ATTEMPTS.with_label_values(&[result]).inc();
    }

    fn report_start_outcome(&self, outcome: &'static str) {
        START_OUTCOMES.with_label_values(&[outcome]).inc();
    }

    fn report_active_sessions(&self, count: usize) {
        ACTIVE_SESSIONS.set(count as i64);
    }

    fn report_relay_started(&self) {
        RUNNING_RELAYS.inc();
    }

    fn report_relay_stopped(&self) {
        RUNNING_RELAYS.dec();
    }
}
