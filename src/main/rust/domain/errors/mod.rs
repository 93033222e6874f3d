use std::time::Duration;

use thiserror::Error;

/// Failures of the local relay subprocess
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Failed to spawn relay process: {0}")]
    SpawnFailed(String),

    #[error("Relay process exited during startup ({status}): {output}")]
    ExitedEarly { status: String, output: String },

    #[error("Failed to stop relay process: {0}")]
    StopFailed(String),
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("auth_token required")]
    MissingAuthToken,

    #[error("Failed to wake camera {vid}: {reason}")]
    WakeFailed { vid: String, reason: String },

    #[error("Camera {vid} woke but the cloud has not published its local address")]
    AddressUnresolved { vid: String },

    #[error("Camera {vid} did not become ready within {budget:?}")]
    ReadinessTimeout { vid: String, budget: Duration },

    #[error("No active session for {0}")]
    SessionNotFound(String),

    #[error("Camera {0} is busy with another request")]
    CameraBusy(String),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error("No free relay port left in the pool")]
    RelayPortsExhausted,

    #[error("Relay mode selected but no relay launcher is configured")]
    RelayModeUnavailable,

    #[error("Invalid stream quality: {0} (expected high or low)")]
    InvalidQuality(String),

    #[error("Invalid camera identifier: {0:?}")]
    InvalidCameraId(String),

    #[error("Invalid bridge mode: {0} (expected direct or relay)")]
    InvalidBridgeMode(String),

    #[error("Invalid port: port cannot be zero")]
    InvalidPort,

    #[error("Invalid cloud base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid settle interval: must be greater than zero")]
    InvalidSettleInterval,
}

impl DomainError {
    /// Stable machine-readable code for callers
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingAuthToken => "auth_required",
            Self::WakeFailed { .. } => "wake_failed",
            Self::AddressUnresolved { .. } => "address_unresolved",
            Self::ReadinessTimeout { .. } => "readiness_timeout",
            Self::SessionNotFound(_) => "not_found",
            Self::CameraBusy(_) => "camera_busy",
            Self::Relay(_) | Self::RelayPortsExhausted | Self::RelayModeUnavailable => {
                "relay_failed"
            }
            Self::InvalidQuality(_) | Self::InvalidCameraId(_) => "invalid_request",
            Self::InvalidBridgeMode(_)
            | Self::InvalidPort
            | Self::InvalidBaseUrl(_)
            | Self::InvalidSettleInterval => "invalid_config",
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
