use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamQuality {
    High,
    Low,
}

impl StreamQuality {
    /// Camera-side stream selector: primary for high, secondary for low
    pub fn selector(&self) -> &'static str {
        match self {
            StreamQuality::High => "stream0",
            StreamQuality::Low => "stream1",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamQuality::High => "high",
            StreamQuality::Low => "low",
        }
    }
}

impl FromStr for StreamQuality {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(StreamQuality::High),
            "low" => Ok(StreamQuality::Low),
            other => Err(DomainError::InvalidQuality(other.to_string())),
        }
    }
}

impl fmt::Display for StreamQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
