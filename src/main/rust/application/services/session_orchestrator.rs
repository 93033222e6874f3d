use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::camera_locks::CameraLocks;
use super::readiness_waiter::{Readiness, ReadinessWaiter};
use super::relay_port_pool::{PortLease, RelayPortPool};
use super::session_registry::SessionRegistry;
use crate::domain::entities::{Session, SessionLifecycle, SessionSummary};
use crate::domain::errors::{DomainError, RelayError, Result};
use crate::domain::ports::{CloudDeviceClient, MetricsReporter, RelayHandle, RelayLauncher};
use crate::domain::value_objects::{
    camera_stream_url, relay_stream_url, AuthToken, BridgeMode, CameraId, ReadinessPolicy,
    RelaySettings, SessionState, StreamQuality,
};

/// Orchestrator tuning that does not depend on the relay backend
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub mode: BridgeMode,
    pub readiness: ReadinessPolicy,
    pub camera_rtsp_port: u16,
    pub lock_wait_timeout: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            mode: BridgeMode::Direct,
            readiness: ReadinessPolicy::default(),
            camera_rtsp_port: 8554,
            lock_wait_timeout: Duration::from_secs(30),
        }
    }
}

/// Health snapshot for the transport layer
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub active_sessions: usize,
    pub timestamp: DateTime<Utc>,
}

struct RelayBackend {
    launcher: Arc<dyn RelayLauncher>,
    ports: RelayPortPool,
    public_host: String,
}

/// Drives wake, settle, status and (optionally) relay startup for a camera,
/// and records the result in the session registry.
///
/// Start and stop are serialized per camera; different cameras run in parallel.
pub struct SessionOrchestrator {
    cloud: Arc<dyn CloudDeviceClient>,
    waiter: ReadinessWaiter,
    registry: Arc<SessionRegistry>,
    relay: Option<RelayBackend>,
    metrics: Arc<dyn MetricsReporter>,
    locks: CameraLocks,
    settings: OrchestratorSettings,
}

impl SessionOrchestrator {
    pub fn new(
        cloud: Arc<dyn CloudDeviceClient>,
        registry: Arc<SessionRegistry>,
        metrics: Arc<dyn MetricsReporter>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            waiter: ReadinessWaiter::new(cloud.clone(), settings.readiness.settle_interval()),
            cloud,
            registry,
            relay: None,
            metrics,
            locks: CameraLocks::new(settings.lock_wait_timeout),
            settings,
        }
    }

    /// Enable relay mode support
    pub fn with_relay(mut self, launcher: Arc<dyn RelayLauncher>, relay: &RelaySettings) -> Self {
        self.relay = Some(RelayBackend {
            launcher,
            ports: RelayPortPool::new(relay.ports()),
            public_host: relay.public_host().to_string(),
        });
        self
    }

    pub fn mode(&self) -> BridgeMode {
        self.settings.mode
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Wake a camera and record a session for it (use case)
    pub async fn start(
        &self,
        vid: CameraId,
        token: AuthToken,
        quality: StreamQuality,
    ) -> Result<SessionSummary> {
        if self.settings.mode == BridgeMode::Relay && self.relay.is_none() {
            return Err(DomainError::RelayModeUnavailable);
        }

        let _guard = self.locks.acquire(&vid).await?;
        let mut lifecycle = SessionLifecycle::new(vid.clone());

        tracing::info!(vid = %vid, quality = %quality, mode = %self.settings.mode, "Stream requested");

        lifecycle.transition_to_waking();
        self.metrics.report_state_change(&vid, lifecycle.current_state());

        let budget = self.settings.readiness.budget();
        match self.waiter.wait(&vid, &token, budget).await {
            Readiness::Ready => self.metrics.report_wake_attempt(true),
            Readiness::WakeRejected(reason) => {
                self.metrics.report_wake_attempt(false);
                return Err(self.abort(
                    &mut lifecycle,
                    DomainError::WakeFailed {
                        vid: vid.to_string(),
                        reason,
                    },
                ));
            }
            Readiness::BudgetExhausted => {
                return Err(self.abort(
                    &mut lifecycle,
                    DomainError::ReadinessTimeout {
                        vid: vid.to_string(),
                        budget,
                    },
                ));
            }
        }

        lifecycle.transition_to_ready();
        self.metrics.report_state_change(&vid, lifecycle.current_state());

        let status = self.cloud.query_status(&vid, &token).await;
        let local_address = match status.resolved_address() {
            Some(address) => address.to_string(),
            None => {
                return Err(self.abort(
                    &mut lifecycle,
                    DomainError::AddressUnresolved {
                        vid: vid.to_string(),
                    },
                ));
            }
        };
        if !status.online {
            tracing::warn!(vid = %vid, "Cloud reports camera offline but published an address");
        }

        let camera_url =
            camera_stream_url(&local_address, self.settings.camera_rtsp_port, quality);

        // Replace policy: the previous session for this camera is released first,
        // so its relay port is free again and only one relay ever runs per camera.
        if let Some(previous) = self.registry.remove(&vid).await {
            tracing::info!(vid = %vid, session_id = %previous.id(), "Replacing existing session");
            if let Err(e) = self.release(previous).await {
                tracing::error!(vid = %vid, "Failed to release previous session: {}", e);
            }
        }

        let session = match self.settings.mode {
            BridgeMode::Direct => Session::new(vid.clone(), local_address, camera_url, quality),
            BridgeMode::Relay => match self.start_relay(&vid, local_address, &camera_url, quality).await {
                Ok(session) => session,
                Err(e) => return Err(self.abort(&mut lifecycle, e)),
            },
        };

        let summary = session.summary();
        self.registry.put(session).await;

        lifecycle.transition_to_active();
        self.metrics.report_state_change(&vid, lifecycle.current_state());
        self.metrics.report_start_outcome("ok");
        self.metrics.report_active_sessions(self.registry.len().await);

        tracing::info!(
            vid = %vid,
            session_id = %summary.session_id,
            stream_address = %summary.stream_address,
            elapsed_ms = lifecycle.elapsed().as_millis() as u64,
            "Stream ready"
        );

        Ok(summary)
    }

    /// Remove a camera's session and release its relay, if any
    pub async fn stop(&self, vid: &CameraId) -> Result<SessionSummary> {
        let _guard = self.locks.acquire(vid).await?;

        let session = self
            .registry
            .remove(vid)
            .await
            .ok_or_else(|| DomainError::SessionNotFound(vid.to_string()))?;
        let summary = session.summary();

        self.metrics.report_active_sessions(self.registry.len().await);
        self.metrics.report_state_change(vid, SessionState::Absent);

        self.release(session).await?;
        tracing::info!(vid = %vid, session_id = %summary.session_id, "Stream stopped");

        Ok(summary)
    }

    pub async fn list_active(&self) -> Vec<SessionSummary> {
        self.registry.list().await
    }

    pub async fn health(&self) -> HealthReport {
        HealthReport {
            status: "running",
            active_sessions: self.registry.len().await,
            timestamp: Utc::now(),
        }
    }

    /// Stop every session and its relay; used on process shutdown
    pub async fn shutdown(&self) {
        let sessions = self.registry.drain().await;
        tracing::info!(count = sessions.len(), "Releasing all sessions");

        for session in sessions {
            let vid = session.vid().clone();
            if let Err(e) = self.release(session).await {
                tracing::error!(vid = %vid, "Failed to release session during shutdown: {}", e);
            }
        }

        self.metrics.report_active_sessions(0);
    }

    async fn start_relay(
        &self,
        vid: &CameraId,
        local_address: String,
        camera_url: &str,
        quality: StreamQuality,
    ) -> Result<Session> {
        let backend = self.relay.as_ref().ok_or(DomainError::RelayModeUnavailable)?;
        let lease = backend
            .ports
            .acquire()
            .ok_or(DomainError::RelayPortsExhausted)?;
        let port = lease.port();

        tracing::info!(vid = %vid, port, source = %camera_url, "Starting relay");
        let handle = backend.launcher.launch(vid, camera_url, port).await?;
        self.metrics.report_relay_started();

        let stream_address = relay_stream_url(&backend.public_host, port, vid);
        let relay = Box::new(LeasedRelay {
            inner: handle,
            _lease: lease,
            metrics: self.metrics.clone(),
        });

        Ok(Session::new(vid.clone(), local_address, stream_address, quality).with_relay(relay))
    }

    async fn release(&self, mut session: Session) -> std::result::Result<(), RelayError> {
        let Some(mut relay) = session.take_relay() else {
            return Ok(());
        };

        relay.stop().await
    }

    fn abort(&self, lifecycle: &mut SessionLifecycle, error: DomainError) -> DomainError {
        tracing::warn!(vid = %lifecycle.vid(), code = error.code(), "Start failed: {}", error);
        lifecycle.transition_to_absent(Some(error.to_string()));
        self.metrics
            .report_state_change(lifecycle.vid(), lifecycle.current_state());
        self.metrics.report_start_outcome(error.code());
        error
    }
}

/// Relay bundled with its port lease so the port returns to the pool
/// whenever the relay is dropped, including on aborted requests.
/// The running-relay gauge follows the same drop.
struct LeasedRelay {
    inner: Box<dyn RelayHandle>,
    _lease: PortLease,
    metrics: Arc<dyn MetricsReporter>,
}

impl Drop for LeasedRelay {
    fn drop(&mut self) {
        self.metrics.report_relay_stopped();
    }
}

#[async_trait]
impl RelayHandle for LeasedRelay {
    fn pid(&self) -> Option<u32> {
        self.inner.pid()
    }

    fn port(&self) -> u16 {
        self.inner.port()
    }

    fn is_alive(&mut self) -> bool {
        self.inner.is_alive()
    }

    async fn stop(&mut self) -> std::result::Result<(), RelayError> {
        self.inner.stop().await
    }
}
