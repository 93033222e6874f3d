//! JSON shapes of the vendor device cloud.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize)]
pub struct WakeRequest<'a> {
    pub vid: &'a str,
    pub action_id: &'a str,
    /// JSON document encoded as a string, as the cloud expects
    pub input_params: String,
    pub check_t: i64,
    pub is_async: i64,
}

impl<'a> WakeRequest<'a> {
    pub fn new(vid: &'a str, action_id: &'a str, unix_seconds: i64) -> Self {
        Self {
            vid,
            action_id,
            input_params: serde_json::json!({ "t": unix_seconds, "type": 0 }).to_string(),
            check_t: 0,
            is_async: 0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceListResponse {
    #[serde(default)]
    pub data: Option<DeviceListData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceListData {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceRecord {
    #[serde(default)]
    pub vid: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub online: bool,
    #[serde(default)]
    pub local_ip: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl DeviceListResponse {
    pub fn into_devices(self) -> Vec<DeviceRecord> {
        self.data.map(|data| data.devices).unwrap_or_default()
    }
}

// Some firmware reports `online` as 0/1 instead of a boolean.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_i64().map(|n| n != 0).unwrap_or(false),
        serde_json::Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    })
}
