mod auth_token;
mod bridge_mode;
mod camera_id;
mod camera_status;
mod cloud_endpoint;
mod readiness_policy;
mod relay_settings;
mod session_state;
mod stream_quality;
mod stream_url;

pub use auth_token::AuthToken;
pub use bridge_mode::BridgeMode;
pub use camera_id::CameraId;
pub use camera_status::{CameraStatus, WakeResult};
pub use cloud_endpoint::CloudEndpoint;
pub use readiness_policy::ReadinessPolicy;
pub use relay_settings::RelaySettings;
pub use session_state::SessionState;
pub use stream_quality::StreamQuality;
pub use stream_url::{camera_stream_url, relay_stream_url};
