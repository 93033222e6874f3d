use std::fmt;
use std::str::FromStr;

use crate::domain::errors::DomainError;

/// How a started camera is handed to the consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeMode {
    /// Hand out the camera's own RTSP address
    #[default]
    Direct,
    /// Re-publish the camera through a local relay process
    Relay,
}

impl FromStr for BridgeMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(BridgeMode::Direct),
            "relay" => Ok(BridgeMode::Relay),
            _ => Err(DomainError::InvalidBridgeMode(s.to_string())),
        }
    }
}

impl fmt::Display for BridgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeMode::Direct => write!(f, "direct"),
            BridgeMode::Relay => write!(f, "relay"),
        }
    }
}
