/// Point-in-time view of a camera as reported by the cloud. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CameraStatus {
    pub online: bool,
    pub local_address: Option<String>,
    pub display_name: Option<String>,
    pub model: Option<String>,
}

impl CameraStatus {
    /// Status used for every failure path: unknown device, HTTP error, timeout
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn resolved_address(&self) -> Option<&str> {
        self.local_address
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
    }
}

/// Outcome of a wake command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakeResult {
    pub ok: bool,
    pub diagnostic: Option<String>,
}

impl WakeResult {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            diagnostic: None,
        }
    }

    pub fn rejected(diagnostic: impl Into<String>) -> Self {
        Self {
            ok: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}
