use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::errors::{DomainError, Result};

/// Relay-mode deployment settings
#[derive(Debug, Clone, PartialEq)]
pub struct RelaySettings {
    ffmpeg_path: PathBuf,
    base_port: u16,
    port_count: u16,
    public_host: String,
    startup_grace: Duration,
    stop_timeout: Duration,
}

impl RelaySettings {
    pub fn new(base_port: u16, port_count: u16, public_host: String) -> Result<Self> {
        if base_port == 0 || port_count == 0 {
            return Err(DomainError::InvalidPort);
        }
        if u32::from(base_port) + u32::from(port_count) > u32::from(u16::MAX) {
            return Err(DomainError::InvalidPort);
        }

        Ok(Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            base_port,
            port_count,
            public_host,
            startup_grace: Duration::from_secs(3),
            stop_timeout: Duration::from_secs(5),
        })
    }

    pub fn with_ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.ffmpeg_path = path;
        self
    }

    pub fn with_startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn ffmpeg_path(&self) -> &PathBuf {
        &self.ffmpeg_path
    }

    pub fn ports(&self) -> Range<u16> {
        self.base_port..self.base_port + self.port_count
    }

    pub fn public_host(&self) -> &str {
        &self.public_host
    }

    pub fn startup_grace(&self) -> Duration {
        self.startup_grace
    }

    pub fn stop_timeout(&self) -> Duration {
        self.stop_timeout
    }
}
