use std::fmt;

use crate::domain::errors::{DomainError, Result};

/// Bearer credential passed through to the vendor cloud.
///
/// Lives only for one orchestration call. `Debug` is redacted and there is
/// no `Display`, so the value cannot end up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::MissingAuthToken);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Accepts either a raw token or an `Authorization` header value
    pub fn from_authorization_header(header: &str) -> Result<Self> {
        let header = header.trim();
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .unwrap_or(header);
        Self::new(token)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}
