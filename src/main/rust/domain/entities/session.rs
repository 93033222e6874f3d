use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::ports::RelayHandle;
use crate::domain::value_objects::{CameraId, StreamQuality};

/// One active bridge mapping for a camera.
///
/// Owned by the session registry. When the session was started in relay
/// mode it owns the relay process too, and whoever removes the session
/// from the registry is responsible for stopping it.
pub struct Session {
    id: String,
    vid: CameraId,
    camera_local_address: String,
    stream_address: String,
    quality: StreamQuality,
    started_at: DateTime<Utc>,
    relay: Option<Box<dyn RelayHandle>>,
}

impl Session {
    pub fn new(
        vid: CameraId,
        camera_local_address: String,
        stream_address: String,
        quality: StreamQuality,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            vid,
            camera_local_address,
            stream_address,
            quality,
            started_at: Utc::now(),
            relay: None,
        }
    }

    pub fn with_relay(mut self, relay: Box<dyn RelayHandle>) -> Self {
        self.relay = Some(relay);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vid(&self) -> &CameraId {
        &self.vid
    }

    pub fn camera_local_address(&self) -> &str {
        &self.camera_local_address
    }

    pub fn stream_address(&self) -> &str {
        &self.stream_address
    }

    pub fn quality(&self) -> StreamQuality {
        self.quality
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn relay_port(&self) -> Option<u16> {
        self.relay.as_ref().map(|relay| relay.port())
    }

    pub fn has_relay(&self) -> bool {
        self.relay.is_some()
    }

    /// Hand the relay over for release; the session no longer owns it afterwards
    pub fn take_relay(&mut self) -> Option<Box<dyn RelayHandle>> {
        self.relay.take()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            vid: self.vid.clone(),
            session_id: self.id.clone(),
            camera_local_address: self.camera_local_address.clone(),
            stream_address: self.stream_address.clone(),
            quality: self.quality,
            started_at: self.started_at,
            relay_port: self.relay_port(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("vid", &self.vid)
            .field("camera_local_address", &self.camera_local_address)
            .field("stream_address", &self.stream_address)
            .field("quality", &self.quality)
            .field("started_at", &self.started_at)
            .field("relay_port", &self.relay_port())
            .finish()
    }
}

/// Read-only copy of a session for listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub vid: CameraId,
    pub session_id: String,
    pub camera_local_address: String,
    pub stream_address: String,
    pub quality: StreamQuality,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_port: Option<u16>,
}
