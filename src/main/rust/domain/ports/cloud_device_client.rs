use async_trait::async_trait;

use crate::domain::value_objects::{AuthToken, CameraId, CameraStatus, WakeResult};

/// Port for the vendor device cloud.
///
/// Implementations absorb every transport fault: a failed wake is
/// `WakeResult { ok: false, .. }` and a failed status query is
/// `CameraStatus::offline()`. The token is supplied per call and never kept.
#[async_trait]
pub trait CloudDeviceClient: Send + Sync {
    /// Send the wake action for a camera
    async fn wake(&self, vid: &CameraId, token: &AuthToken) -> WakeResult;

    /// Fetch a fresh status snapshot for a camera
    async fn query_status(&self, vid: &CameraId, token: &AuthToken) -> CameraStatus;
}
