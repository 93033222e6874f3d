use std::time::Duration;

use crate::domain::errors::{DomainError, Result};

const WAKE_ACTION_PATH: &str = "/api/v3/openapi/device/do-action";
const DEVICE_LIST_PATH: &str = "/api/v3/openapi/devices-v2";

/// Where and how the vendor device cloud is reached
#[derive(Debug, Clone, PartialEq)]
pub struct CloudEndpoint {
    base_url: String,
    wake_action_id: String,
    app_name: String,
    request_timeout: Duration,
}

impl CloudEndpoint {
    pub fn new(base_url: String, request_timeout: Duration) -> Result<Self> {
        Self::validate_base_url(&base_url)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            wake_action_id: "ac_wakelocal".to_string(),
            app_name: "cldbus".to_string(),
            request_timeout,
        })
    }

    pub fn with_wake_action_id(mut self, action_id: impl Into<String>) -> Self {
        self.wake_action_id = action_id.into();
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn wake_action_id(&self) -> &str {
        &self.wake_action_id
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn wake_url(&self) -> String {
        format!("{}{}", self.base_url, WAKE_ACTION_PATH)
    }

    pub fn device_list_url(&self) -> String {
        format!("{}{}", self.base_url, DEVICE_LIST_PATH)
    }

    fn validate_base_url(url: &str) -> Result<()> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DomainError::InvalidBaseUrl(url.to_string()));
        }
        Ok(())
    }
}
