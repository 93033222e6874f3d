use async_trait::async_trait;

use crate::domain::errors::RelayError;
use crate::domain::value_objects::CameraId;

/// A running relay owned by exactly one session
#[async_trait]
pub trait RelayHandle: Send {
    /// OS process id while the child has not been reaped
    fn pid(&self) -> Option<u32>;

    /// Bridge-side port the relay listens on
    fn port(&self) -> u16;

    /// Non-blocking liveness check
    fn is_alive(&mut self) -> bool;

    /// Terminate and reap the process. Safe to call on an already exited relay.
    async fn stop(&mut self) -> Result<(), RelayError>;
}

/// Port for starting relay processes
#[async_trait]
pub trait RelayLauncher: Send + Sync {
    /// Start a relay pulling `source_url` and listening on `port`.
    /// Resolves only after the startup grace period has passed with the process alive.
    async fn launch(
        &self,
        vid: &CameraId,
        source_url: &str,
        port: u16,
    ) -> Result<Box<dyn RelayHandle>, RelayError>;
}
