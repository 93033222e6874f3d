use async_trait::async_trait;

use super::{FfmpegCommandBuilder, RelayProcess};
use crate::domain::errors::RelayError;
use crate::domain::ports::{RelayHandle, RelayLauncher};
use crate::domain::value_objects::{CameraId, RelaySettings};

/// Starts ffmpeg relays
pub struct FfmpegRelayLauncher {
    settings: RelaySettings,
}

impl FfmpegRelayLauncher {
    pub fn new(settings: RelaySettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl RelayLauncher for FfmpegRelayLauncher {
    async fn launch(
        &self,
        vid: &CameraId,
        source_url: &str,
        port: u16,
    ) -> Result<Box<dyn RelayHandle>, RelayError> {
        let command = FfmpegCommandBuilder::build(self.settings.ffmpeg_path(), source_url, port, vid);
        tracing::info!(vid = %vid, "Launching relay: {}", command);

        let process = RelayProcess::spawn(
            command,
            port,
            self.settings.startup_grace(),
            self.settings.stop_timeout(),
        )
        .await?;

        Ok(Box::new(process))
    }
}
