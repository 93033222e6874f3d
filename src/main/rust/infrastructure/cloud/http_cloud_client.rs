use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;

use super::wire::{DeviceListResponse, WakeRequest};
use crate::domain::ports::CloudDeviceClient;
use crate::domain::value_objects::{AuthToken, CameraId, CameraStatus, CloudEndpoint, WakeResult};

/// Longest response excerpt kept in a diagnostic
const MAX_DIAGNOSTIC_BODY: usize = 512;

/// Vendor cloud client over HTTPS.
///
/// Holds no credentials: the token travels with every call.
pub struct HttpCloudClient {
    endpoint: CloudEndpoint,
    http: Client,
}

impl HttpCloudClient {
    pub fn new(endpoint: CloudEndpoint) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(endpoint.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { endpoint, http })
    }

    fn describe_transport_error(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("timed out after {:?}", self.endpoint.request_timeout())
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            format!("request failed: {}", err)
        }
    }
}

#[async_trait]
impl CloudDeviceClient for HttpCloudClient {
    async fn wake(&self, vid: &CameraId, token: &AuthToken) -> WakeResult {
        tracing::info!(vid = %vid, "Sending wake command");

        let body = WakeRequest::new(
            vid.as_str(),
            self.endpoint.wake_action_id(),
            Utc::now().timestamp(),
        );

        let response = self
            .http
            .post(self.endpoint.wake_url())
            .bearer_auth(token.expose())
            .header("Accept-Language", "en")
            .json(&body)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                tracing::info!(vid = %vid, status = status.as_u16(), "Wake command accepted");
                tracing::debug!(vid = %vid, body = %truncate(&text), "Wake response");
                WakeResult::accepted()
            }
            Ok(resp) => {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                tracing::error!(
                    vid = %vid,
                    status = status.as_u16(),
                    body = %truncate(&text),
                    "Wake command rejected"
                );
                WakeResult::rejected(format!("HTTP {}: {}", status.as_u16(), truncate(&text)))
            }
            Err(e) => {
                let diagnostic = self.describe_transport_error(&e);
                tracing::error!(vid = %vid, "Wake command failed: {}", diagnostic);
                WakeResult::rejected(diagnostic)
            }
        }
    }

    async fn query_status(&self, vid: &CameraId, token: &AuthToken) -> CameraStatus {
        let response = self
            .http
            .get(self.endpoint.device_list_url())
            .bearer_auth(token.expose())
            .header("App-Name", self.endpoint.app_name())
            .send()
            .await;

        let resp = match response {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                tracing::warn!(vid = %vid, status = resp.status().as_u16(), "Device list request rejected");
                return CameraStatus::offline();
            }
            Err(e) => {
                tracing::error!(vid = %vid, "Device list request failed: {}", self.describe_transport_error(&e));
                return CameraStatus::offline();
            }
        };

        let devices = match resp.json::<DeviceListResponse>().await {
            Ok(list) => list.into_devices(),
            Err(e) => {
                tracing::error!(vid = %vid, "Malformed device list: {}", e);
                return CameraStatus::offline();
            }
        };

        match devices.into_iter().find(|device| device.vid == vid.as_str()) {
            Some(device) => {
                let status = CameraStatus {
                    online: device.online,
                    local_address: non_empty(device.local_ip),
                    display_name: non_empty(device.device_name),
                    model: non_empty(device.model),
                };
                tracing::debug!(vid = %vid, online = status.online, local_address = ?status.local_address, "Camera status");
                status
            }
            None => {
                tracing::warn!(vid = %vid, "Camera not present in device list");
                CameraStatus::offline()
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(MAX_DIAGNOSTIC_BODY) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
