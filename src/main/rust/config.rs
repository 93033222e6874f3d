use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::application::services::OrchestratorSettings;
use crate::domain::value_objects::{
    BridgeMode, CloudEndpoint, ReadinessPolicy, RelaySettings,
};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "camera-wake-bridge",
    version = "0.1.0",
    about = "Wakes battery cameras through the vendor cloud and hands out their RTSP stream"
)]
pub struct Config {
    /// HTTP API port
    #[arg(long, env = "HTTP_PORT", default_value = "5001")]
    pub http_port: u16,

    /// Vendor cloud API base URL
    #[arg(
        long,
        env = "CLOUD_API_BASE_URL",
        default_value = "https://api.arpha-tech.com"
    )]
    pub api_base_url: String,

    /// Action identifier sent with the wake request
    #[arg(long, env = "WAKE_ACTION_ID", default_value = "ac_wakelocal")]
    pub wake_action_id: String,

    /// App-Name header sent with the device list query
    #[arg(long, env = "CLOUD_APP_NAME", default_value = "cldbus")]
    pub app_name: String,

    /// Cloud request timeout in seconds
    #[arg(long, env = "CLOUD_REQUEST_TIMEOUT", default_value = "10")]
    pub request_timeout: u64,

    /// Seconds to wait after a wake before the camera is treated as ready
    #[arg(long, env = "SETTLE_INTERVAL", default_value = "7")]
    pub settle_interval: u64,

    /// Total seconds allowed for wake plus settle
    #[arg(long, env = "READY_BUDGET", default_value = "10")]
    pub ready_budget: u64,

    /// RTSP port served by the camera on the LAN
    #[arg(long, env = "CAMERA_RTSP_PORT", default_value = "8554")]
    pub camera_rtsp_port: u16,

    /// Stream hand-out mode: direct or relay
    #[arg(long, env = "BRIDGE_MODE", default_value = "direct")]
    pub mode: BridgeMode,

    /// First port of the relay listen range
    #[arg(long, env = "RELAY_BASE_PORT", default_value = "8554")]
    pub relay_base_port: u16,

    /// Number of ports in the relay listen range
    #[arg(long, env = "RELAY_PORT_COUNT", default_value = "16")]
    pub relay_port_count: u16,

    /// Host name put into relay stream addresses
    #[arg(long, env = "PUBLIC_HOST", default_value = "127.0.0.1")]
    pub public_host: String,

    /// ffmpeg executable used for relays
    #[arg(long, env = "FFMPEG_PATH", default_value = "ffmpeg")]
    pub ffmpeg_path: PathBuf,

    /// Seconds a relay must survive before it counts as started
    #[arg(long, env = "RELAY_STARTUP_GRACE", default_value = "3")]
    pub relay_startup_grace: u64,

    /// Seconds to wait for a relay to exit before killing it
    #[arg(long, env = "RELAY_STOP_TIMEOUT", default_value = "5")]
    pub relay_stop_timeout: u64,

    /// Seconds a request waits for another request on the same camera
    #[arg(long, env = "LOCK_WAIT_TIMEOUT", default_value = "30")]
    pub lock_wait_timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Minimum allowed port (ports below 1024 are privileged)
const MIN_USER_PORT: u16 = 1024;

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        Self::validate_port(self.http_port, "HTTP")?;
        Self::validate_port(self.camera_rtsp_port, "camera RTSP")?;

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            anyhow::bail!("Cloud API base URL must start with http:// or https://");
        }

        if self.request_timeout == 0 {
            anyhow::bail!("Cloud request timeout cannot be 0");
        }

        if self.settle_interval == 0 {
            anyhow::bail!("Settle interval cannot be 0");
        }

        if self.ready_budget == 0 {
            anyhow::bail!("Readiness budget cannot be 0");
        }

        if self.lock_wait_timeout == 0 {
            anyhow::bail!("Lock wait timeout cannot be 0");
        }

        if self.mode == BridgeMode::Relay {
            Self::validate_port(self.relay_base_port, "relay base")?;
            if self.relay_port_count == 0 {
                anyhow::bail!("Relay port count cannot be 0");
            }
            let end = u32::from(self.relay_base_port) + u32::from(self.relay_port_count);
            if end > u32::from(u16::MAX) {
                anyhow::bail!(
                    "Relay port range {}+{} exceeds {}",
                    self.relay_base_port,
                    self.relay_port_count,
                    u16::MAX
                );
            }
            let http = u32::from(self.http_port);
            if http >= u32::from(self.relay_base_port) && http < end {
                anyhow::bail!(
                    "HTTP port {} lies inside the relay port range {}..{}",
                    self.http_port,
                    self.relay_base_port,
                    end
                );
            }
            if self.public_host.trim().is_empty() {
                anyhow::bail!("Public host cannot be empty in relay mode");
            }
        }

        Ok(())
    }

    fn validate_port(port: u16, name: &str) -> anyhow::Result<()> {
        if port == 0 {
            anyhow::bail!("Invalid {} port: port cannot be 0", name);
        }
        if port < MIN_USER_PORT {
            anyhow::bail!(
                "Invalid {} port: {} is a privileged port (< {}). Use a port >= {}",
                name,
                port,
                MIN_USER_PORT,
                MIN_USER_PORT
            );
        }
        Ok(())
    }

    pub fn to_cloud_endpoint(&self) -> crate::domain::errors::Result<CloudEndpoint> {
        Ok(CloudEndpoint::new(
            self.api_base_url.clone(),
            Duration::from_secs(self.request_timeout),
        )?
        .with_wake_action_id(self.wake_action_id.clone())
        .with_app_name(self.app_name.clone()))
    }

    pub fn to_readiness_policy(&self) -> crate::domain::errors::Result<ReadinessPolicy> {
        ReadinessPolicy::new(
            Duration::from_secs(self.settle_interval),
            Duration::from_secs(self.ready_budget),
        )
    }

    pub fn to_relay_settings(&self) -> crate::domain::errors::Result<RelaySettings> {
        Ok(RelaySettings::new(
            self.relay_base_port,
            self.relay_port_count,
            self.public_host.clone(),
        )?
        .with_ffmpeg_path(self.ffmpeg_path.clone())
        .with_startup_grace(Duration::from_secs(self.relay_startup_grace))
        .with_stop_timeout(Duration::from_secs(self.relay_stop_timeout)))
    }

    pub fn to_orchestrator_settings(
        &self,
    ) -> crate::domain::errors::Result<OrchestratorSettings> {
        Ok(OrchestratorSettings {
            mode: self.mode,
            readiness: self.to_readiness_policy()?,
            camera_rtsp_port: self.camera_rtsp_port,
            lock_wait_timeout: Duration::from_secs(self.lock_wait_timeout),
        })
    }
}
