pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-exports for convenience
pub use application::services::{
    HealthReport, OrchestratorSettings, ReadinessWaiter, SessionOrchestrator, SessionRegistry,
};
pub use config::Config;
pub use domain::entities::{Session, SessionLifecycle, SessionSummary, StateTransition};
pub use domain::errors::{DomainError, RelayError, Result};
pub use domain::ports::{CloudDeviceClient, MetricsReporter, RelayHandle, RelayLauncher};
pub use domain::value_objects::{
    AuthToken, BridgeMode, CameraId, CameraStatus, CloudEndpoint, ReadinessPolicy, RelaySettings,
    SessionState, StreamQuality, WakeResult,
};
pub use infrastructure::cloud::HttpCloudClient;
pub use infrastructure::http::routes;
pub use infrastructure::metrics::PrometheusReporter;
pub use infrastructure::relay::{FfmpegRelayLauncher, RelayCommand, RelayProcess};
