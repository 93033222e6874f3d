use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use camera_wake_bridge::{
    AuthToken, BridgeMode, CameraId, CameraStatus, CloudDeviceClient, DomainError,
    OrchestratorSettings, PrometheusReporter, ReadinessPolicy, RelayError, RelayHandle,
    RelayLauncher, RelaySettings, SessionOrchestrator, SessionRegistry, StreamQuality, WakeResult,
};

const SETTLE: Duration = Duration::from_millis(50);

/// Cloud that accepts or rejects wakes and serves a fixed device table
#[derive(Default)]
struct FakeCloud {
    reject_wake: bool,
    devices: HashMap<String, CameraStatus>,
    wakes: AtomicUsize,
    status_queries: AtomicUsize,
}

impl FakeCloud {
    fn with_device(mut self, vid: &str, local_ip: &str) -> Self {
        self.devices.insert(
            vid.to_string(),
            CameraStatus {
                online: true,
                local_address: Some(local_ip.to_string()),
                ..CameraStatus::default()
            },
        );
        self
    }
}

#[async_trait]
impl CloudDeviceClient for FakeCloud {
    async fn wake(&self, _vid: &CameraId, _token: &AuthToken) -> WakeResult {
        self.wakes.fetch_add(1, Ordering::SeqCst);
        if self.reject_wake {
            WakeResult::rejected("HTTP 401: token expired")
        } else {
            WakeResult::accepted()
        }
    }

    async fn query_status(&self, vid: &CameraId, _token: &AuthToken) -> CameraStatus {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        self.devices
            .get(vid.as_str())
            .cloned()
            .unwrap_or_else(CameraStatus::offline)
    }
}

struct FakeRelay {
    port: u16,
    alive: Arc<AtomicBool>,
    fail_stop: bool,
}

#[async_trait]
impl RelayHandle for FakeRelay {
    fn pid(&self) -> Option<u32> {
        self.alive.load(Ordering::SeqCst).then_some(4242)
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn is_alive(&mut self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    async fn stop(&mut self) -> Result<(), RelayError> {
        self.alive.store(false, Ordering::SeqCst);
        if self.fail_stop {
            return Err(RelayError::StopFailed("permission denied".to_string()));
        }
        Ok(())
    }
}

/// Launcher that hands out fake relays and remembers every one it started
#[derive(Default)]
struct FakeLauncher {
    fail_launch: bool,
    fail_stop: bool,
    launched: Mutex<Vec<(String, u16, Arc<AtomicBool>)>>,
}

impl FakeLauncher {
    fn alive_count(&self) -> usize {
        self.launched
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, alive)| alive.load(Ordering::SeqCst))
            .count()
    }

    fn launched(&self) -> Vec<(String, u16)> {
        self.launched
            .lock()
            .unwrap()
            .iter()
            .map(|(url, port, _)| (url.clone(), *port))
            .collect()
    }
}

#[async_trait]
impl RelayLauncher for FakeLauncher {
    async fn launch(
        &self,
        _vid: &CameraId,
        source_url: &str,
        port: u16,
    ) -> Result<Box<dyn RelayHandle>, RelayError> {
        if self.fail_launch {
            return Err(RelayError::ExitedEarly {
                status: "exit status: 1".to_string(),
                output: "Connection refused".to_string(),
            });
        }
        let alive = Arc::new(AtomicBool::new(true));
        self.launched
            .lock()
            .unwrap()
            .push((source_url.to_string(), port, alive.clone()));
        Ok(Box::new(FakeRelay {
            port,
            alive,
            fail_stop: self.fail_stop,
        }))
    }
}

fn settings(mode: BridgeMode, budget: Duration) -> OrchestratorSettings {
    OrchestratorSettings {
        mode,
        readiness: ReadinessPolicy::new(SETTLE, budget).unwrap(),
        camera_rtsp_port: 8554,
        lock_wait_timeout: Duration::from_secs(5),
    }
}

fn direct(cloud: Arc<FakeCloud>) -> SessionOrchestrator {
    SessionOrchestrator::new(
        cloud,
        Arc::new(SessionRegistry::default()),
        Arc::new(PrometheusReporter::new()),
        settings(BridgeMode::Direct, Duration::from_secs(2)),
    )
}

fn relay(cloud: Arc<FakeCloud>, launcher: Arc<FakeLauncher>, ports: u16) -> SessionOrchestrator {
    let relay_settings = RelaySettings::new(20000, ports, "bridge.lan".to_string()).unwrap();
    SessionOrchestrator::new(
        cloud,
        Arc::new(SessionRegistry::default()),
        Arc::new(PrometheusReporter::new()),
        settings(BridgeMode::Relay, Duration::from_secs(2)),
    )
    .with_relay(launcher, &relay_settings)
}

fn vid(raw: &str) -> CameraId {
    CameraId::new(raw).unwrap()
}

fn token() -> AuthToken {
    AuthToken::new("tok").unwrap()
}

#[tokio::test]
async fn test_start_returns_direct_camera_address() {
    let cloud = Arc::new(FakeCloud::default().with_device("cam-1", "10.0.0.5"));
    let orchestrator = direct(cloud.clone());

    let started = Instant::now();
    let session = orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .unwrap();

    assert!(started.elapsed() >= SETTLE);
    assert_eq!(session.stream_address, "rtsp://10.0.0.5:8554/stream0");
    assert_eq!(session.camera_local_address, "10.0.0.5");
    assert_eq!(session.quality, StreamQuality::High);
    assert!(session.relay_port.is_none());
    assert_eq!(cloud.wakes.load(Ordering::SeqCst), 1);
    assert!(orchestrator.registry().contains(&vid("cam-1")).await);
}

#[tokio::test]
async fn test_low_quality_selects_secondary_stream() {
    let cloud = Arc::new(FakeCloud::default().with_device("cam-1", "10.0.0.5"));
    let orchestrator = direct(cloud);

    let session = orchestrator
        .start(vid("cam-1"), token(), StreamQuality::Low)
        .await
        .unwrap();
    assert_eq!(session.stream_address, "rtsp://10.0.0.5:8554/stream1");
}

#[tokio::test]
async fn test_unresolved_address_records_nothing() {
    let cloud = Arc::new(FakeCloud::default());
    let orchestrator = direct(cloud.clone());

    let err = orchestrator
        .start(vid("cam-2"), token(), StreamQuality::Low)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::AddressUnresolved { .. }));
    assert_eq!(err.code(), "address_unresolved");
    assert_eq!(cloud.wakes.load(Ordering::SeqCst), 1);
    assert!(orchestrator.registry().is_empty().await);
}

#[tokio::test]
async fn test_rejected_wake_skips_status_query() {
    let cloud = Arc::new(FakeCloud {
        reject_wake: true,
        ..FakeCloud::default().with_device("cam-1", "10.0.0.5")
    });
    let orchestrator = direct(cloud.clone());

    let started = Instant::now();
    let err = orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .unwrap_err();

    match err {
        DomainError::WakeFailed { vid, reason } => {
            assert_eq!(vid, "cam-1");
            assert!(reason.contains("401"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(started.elapsed() < SETTLE);
    assert_eq!(cloud.status_queries.load(Ordering::SeqCst), 0);
    assert!(orchestrator.registry().is_empty().await);
}

/// Cloud whose wake call hangs until the client's own request timeout fires
struct StalledCloud {
    stall: Duration,
}

#[async_trait]
impl CloudDeviceClient for StalledCloud {
    async fn wake(&self, _vid: &CameraId, _token: &AuthToken) -> WakeResult {
        tokio::time::sleep(self.stall).await;
        WakeResult::rejected("timed out after 10s")
    }

    async fn query_status(&self, _vid: &CameraId, _token: &AuthToken) -> CameraStatus {
        CameraStatus::offline()
    }
}

#[tokio::test]
async fn test_wake_stalling_past_budget_is_a_wake_failure() {
    let budget = Duration::from_millis(200);
    let orchestrator = SessionOrchestrator::new(
        Arc::new(StalledCloud {
            stall: budget + Duration::from_millis(5),
        }),
        Arc::new(SessionRegistry::default()),
        Arc::new(PrometheusReporter::new()),
        settings(BridgeMode::Direct, budget),
    );

    let err = orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .unwrap_err();

    match err {
        DomainError::WakeFailed { reason, .. } => assert!(reason.contains("timed out")),
        other => panic!("unexpected error: {} ({})", other, other.code()),
    }
    assert!(orchestrator.registry().is_empty().await);
}

#[tokio::test]
async fn test_slow_accepted_wake_still_gets_full_budget() {
    let cloud = Arc::new(FakeCloud::default().with_device("cam-1", "10.0.0.5"));
    let slow = Arc::new(SlowCloud {
        inner: cloud,
        delay: Duration::from_millis(150),
    });
    let orchestrator = SessionOrchestrator::new(
        slow,
        Arc::new(SessionRegistry::default()),
        Arc::new(PrometheusReporter::new()),
        settings(BridgeMode::Direct, Duration::from_millis(100)),
    );

    let session = orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .unwrap();
    assert_eq!(session.stream_address, "rtsp://10.0.0.5:8554/stream0");
}

/// Delays every wake before delegating
struct SlowCloud {
    inner: Arc<FakeCloud>,
    delay: Duration,
}

#[async_trait]
impl CloudDeviceClient for SlowCloud {
    async fn wake(&self, vid: &CameraId, token: &AuthToken) -> WakeResult {
        tokio::time::sleep(self.delay).await;
        self.inner.wake(vid, token).await
    }

    async fn query_status(&self, vid: &CameraId, token: &AuthToken) -> CameraStatus {
        self.inner.query_status(vid, token).await
    }
}

#[tokio::test]
async fn test_budget_shorter_than_settle_times_out() {
    let cloud = Arc::new(FakeCloud::default().with_device("cam-1", "10.0.0.5"));
    let orchestrator = SessionOrchestrator::new(
        cloud.clone(),
        Arc::new(SessionRegistry::default()),
        Arc::new(PrometheusReporter::new()),
        settings(BridgeMode::Direct, Duration::from_millis(10)),
    );

    let err = orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::ReadinessTimeout { .. }));
    assert_eq!(cloud.status_queries.load(Ordering::SeqCst), 0);
    assert!(orchestrator.registry().is_empty().await);
}

#[tokio::test]
async fn test_concurrent_starts_leave_one_session() {
    let cloud = Arc::new(FakeCloud::default().with_device("cam-1", "10.0.0.5"));
    let orchestrator = Arc::new(direct(cloud.clone()));

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.start(vid("cam-1"), token(), StreamQuality::High).await })
    };
    let second = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.start(vid("cam-1"), token(), StreamQuality::Low).await })
    };

    assert!(first.await.unwrap().is_ok());
    assert!(second.await.unwrap().is_ok());

    let sessions = orchestrator.list_active().await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].vid.as_str(), "cam-1");
    assert_eq!(cloud.wakes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_different_cameras_start_in_parallel() {
    let cloud = Arc::new(
        FakeCloud::default()
            .with_device("cam-1", "10.0.0.5")
            .with_device("cam-2", "10.0.0.6"),
    );
    let orchestrator = Arc::new(direct(cloud));

    let started = Instant::now();
    let (a, b) = tokio::join!(
        orchestrator.start(vid("cam-1"), token(), StreamQuality::High),
        orchestrator.start(vid("cam-2"), token(), StreamQuality::High),
    );
    assert!(a.is_ok() && b.is_ok());
    assert!(started.elapsed() < SETTLE * 2);

    let listed: Vec<String> = orchestrator
        .list_active()
        .await
        .into_iter()
        .map(|s| s.vid.to_string())
        .collect();
    assert_eq!(listed, vec!["cam-1", "cam-2"]);
}

#[tokio::test]
async fn test_stop_unknown_camera_is_not_found() {
    let cloud = Arc::new(FakeCloud::default().with_device("cam-1", "10.0.0.5"));
    let orchestrator = direct(cloud);
    orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .unwrap();

    let err = orchestrator.stop(&vid("cam-3")).await.unwrap_err();
    assert!(matches!(err, DomainError::SessionNotFound(_)));
    assert_eq!(orchestrator.registry().len().await, 1);
}

#[tokio::test]
async fn test_stop_removes_direct_session() {
    let cloud = Arc::new(FakeCloud::default().with_device("cam-1", "10.0.0.5"));
    let orchestrator = direct(cloud);
    let started = orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .unwrap();

    let stopped = orchestrator.stop(&vid("cam-1")).await.unwrap();
    assert_eq!(stopped.session_id, started.session_id);
    assert!(orchestrator.registry().get(&vid("cam-1")).await.is_none());
    assert!(matches!(
        orchestrator.stop(&vid("cam-1")).await,
        Err(DomainError::SessionNotFound(_))
    ));
}

#[tokio::test]
async fn test_relay_mode_hands_out_relay_address() {
    let cloud = Arc::new(FakeCloud::default().with_device("cam-1", "10.0.0.5"));
    let launcher = Arc::new(FakeLauncher::default());
    let orchestrator = relay(cloud, launcher.clone(), 4);

    let session = orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .unwrap();

    assert_eq!(session.stream_address, "rtsp://bridge.lan:20000/cam-1");
    assert_eq!(session.relay_port, Some(20000));
    assert_eq!(
        launcher.launched(),
        vec![("rtsp://10.0.0.5:8554/stream0".to_string(), 20000)]
    );

    orchestrator.stop(&vid("cam-1")).await.unwrap();
    assert_eq!(launcher.alive_count(), 0);
    assert!(orchestrator.registry().is_empty().await);
}

#[tokio::test]
async fn test_relay_restart_replaces_previous_relay() {
    let cloud = Arc::new(FakeCloud::default().with_device("cam-1", "10.0.0.5"));
    let launcher = Arc::new(FakeLauncher::default());
    let orchestrator = Arc::new(relay(cloud, launcher.clone(), 4));

    let (a, b) = tokio::join!(
        orchestrator.start(vid("cam-1"), token(), StreamQuality::High),
        orchestrator.start(vid("cam-1"), token(), StreamQuality::High),
    );
    assert!(a.is_ok() && b.is_ok());

    assert_eq!(launcher.launched().len(), 2);
    assert_eq!(launcher.alive_count(), 1);
    assert_eq!(orchestrator.registry().len().await, 1);

    // The first relay's port went back to the pool before the second launch
    let ports: Vec<u16> = launcher.launched().into_iter().map(|(_, port)| port).collect();
    assert_eq!(ports, vec![20000, 20000]);
}

#[tokio::test]
async fn test_relay_ports_exhausted() {
    let cloud = Arc::new(
        FakeCloud::default()
            .with_device("cam-1", "10.0.0.5")
            .with_device("cam-2", "10.0.0.6"),
    );
    let launcher = Arc::new(FakeLauncher::default());
    let orchestrator = relay(cloud, launcher.clone(), 1);

    orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .unwrap();
    let err = orchestrator
        .start(vid("cam-2"), token(), StreamQuality::High)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::RelayPortsExhausted));
    assert_eq!(orchestrator.registry().len().await, 1);

    orchestrator.stop(&vid("cam-1")).await.unwrap();
    assert!(orchestrator
        .start(vid("cam-2"), token(), StreamQuality::High)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_failed_relay_launch_records_nothing_and_frees_port() {
    let cloud = Arc::new(FakeCloud::default().with_device("cam-1", "10.0.0.5"));
    let launcher = Arc::new(FakeLauncher {
        fail_launch: true,
        ..FakeLauncher::default()
    });
    let orchestrator = relay(cloud, launcher, 1);

    let err = orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .unwrap_err();
    match err {
        DomainError::Relay(RelayError::ExitedEarly { output, .. }) => {
            assert!(output.contains("Connection refused"))
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(orchestrator.registry().is_empty().await);
}

#[tokio::test]
async fn test_stop_failure_still_removes_session() {
    let cloud = Arc::new(FakeCloud::default().with_device("cam-1", "10.0.0.5"));
    let launcher = Arc::new(FakeLauncher {
        fail_stop: true,
        ..FakeLauncher::default()
    });
    let orchestrator = relay(cloud, launcher, 1);
    orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .unwrap();

    let err = orchestrator.stop(&vid("cam-1")).await.unwrap_err();
    assert!(matches!(err, DomainError::Relay(RelayError::StopFailed(_))));
    assert!(orchestrator.registry().is_empty().await);

    // Port came back with the dropped lease
    assert!(orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_relay_mode_without_launcher_is_refused() {
    let cloud = Arc::new(FakeCloud::default().with_device("cam-1", "10.0.0.5"));
    let orchestrator = SessionOrchestrator::new(
        cloud.clone(),
        Arc::new(SessionRegistry::default()),
        Arc::new(PrometheusReporter::new()),
        settings(BridgeMode::Relay, Duration::from_secs(2)),
    );

    let err = orchestrator
        .start(vid("cam-1"), token(), StreamQuality::High)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::RelayModeUnavailable));
    assert_eq!(cloud.wakes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_shutdown_stops_every_relay() {
    let cloud = Arc::new(
        FakeCloud::default()
            .with_device("cam-1", "10.0.0.5")
            .with_device("cam-2", "10.0.0.6"),
    );
    let launcher = Arc::new(FakeLauncher::default());
    let orchestrator = relay(cloud, launcher.clone(), 4);

    for raw in ["cam-1", "cam-2"] {
        orchestrator
            .start(vid(raw), token(), StreamQuality::High)
            .await
            .unwrap();
    }
    assert_eq!(launcher.alive_count(), 2);

    orchestrator.shutdown().await;
    assert_eq!(launcher.alive_count(), 0);
    assert_eq!(orchestrator.health().await.active_sessions, 0);
}
