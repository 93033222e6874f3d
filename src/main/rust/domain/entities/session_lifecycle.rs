use std::time::{Duration, Instant};

use crate::domain::value_objects::{CameraId, SessionState};

/// State transition record
#[derive(Debug, Clone)]
pub struct StateTransition {
    pub from: SessionState,
    pub to: SessionState,
    pub timestamp: Instant,
    pub reason: Option<String>,
}

/// Tracks one start attempt for a camera through its states
#[derive(Debug)]
pub struct SessionLifecycle {
    vid: CameraId,
    current_state: SessionState,
    state_history: Vec<StateTransition>,
    created_at: Instant,
}

impl SessionLifecycle {
    pub fn new(vid: CameraId) -> Self {
        Self {
            vid,
            current_state: SessionState::Absent,
            state_history: Vec::new(),
            created_at: Instant::now(),
        }
    }

    pub fn vid(&self) -> &CameraId {
        &self.vid
    }

    pub fn current_state(&self) -> SessionState {
        self.current_state
    }

    pub fn elapsed(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub fn transition_count(&self) -> usize {
        self.state_history.len()
    }

    pub fn last_transition(&self) -> Option<&StateTransition> {
        self.state_history.last()
    }

    pub fn transition_to_waking(&mut self) {
        self.record_transition(SessionState::Waking, None);
    }

    pub fn transition_to_ready(&mut self) {
        self.record_transition(SessionState::Ready, None);
    }

    pub fn transition_to_active(&mut self) {
        self.record_transition(SessionState::Active, None);
    }

    pub fn transition_to_absent(&mut self, reason: Option<String>) {
        self.record_transition(SessionState::Absent, reason);
    }

    fn record_transition(&mut self, new_state: SessionState, reason: Option<String>) {
        if !self.current_state.can_transition_to(new_state) {
            tracing::warn!(
                vid = %self.vid,
                from = %self.current_state,
                to = %new_state,
                "Unexpected session state transition"
            );
        }

        let transition = StateTransition {
            from: self.current_state,
            to: new_state,
            timestamp: Instant::now(),
            reason,
        };

        tracing::debug!(
            vid = %self.vid,
            from = %transition.from,
            to = %transition.to,
            reason = transition.reason.as_deref().unwrap_or(""),
            "Session state changed"
        );

        self.state_history.push(transition);
        self.current_state = new_state;
    }
}
