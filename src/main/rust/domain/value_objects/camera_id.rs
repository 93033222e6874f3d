use std::fmt;

use serde::Serialize;

use crate::domain::errors::{DomainError, Result};

const MAX_CAMERA_ID_LEN: usize = 128;

/// Vendor-assigned camera identifier ("vid")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CameraId(String);

impl CameraId {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        Self::validate(&raw)?;
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // The id ends up in relay mount paths, so URL delimiters are refused.
    fn validate(raw: &str) -> Result<()> {
        if raw.is_empty() || raw.len() > MAX_CAMERA_ID_LEN {
            return Err(DomainError::InvalidCameraId(raw.to_string()));
        }
        let valid = raw
            .chars()
            .all(|c| c.is_ascii_graphic() && !matches!(c, '/' | '?' | '#' | '%'));
        if !valid {
            return Err(DomainError::InvalidCameraId(raw.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
