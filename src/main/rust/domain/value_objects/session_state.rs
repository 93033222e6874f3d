use std::fmt;

/// Per-camera orchestration states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session recorded
    #[default]
    Absent,
    /// Wake sent, settle interval running
    Waking,
    /// Settled, resolving the local address
    Ready,
    /// Session recorded in the registry
    Active,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "ABSENT"),
            Self::Waking => write!(f, "WAKING"),
            Self::Ready => write!(f, "READY"),
            Self::Active => write!(f, "ACTIVE"),
        }
    }
}

impl SessionState {
    /// Numeric value for metrics
    pub fn as_metric(&self) -> f64 {
        match self {
            Self::Absent => 0.0,
            Self::Waking => 1.0,
            Self::Ready => 2.0,
            Self::Active => 3.0,
        }
    }

    /// Allowed edges: Absent -> Waking -> Ready -> Active, and any state back to Absent
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (Self::Absent, Self::Waking)
                | (Self::Waking, Self::Ready)
                | (Self::Ready, Self::Active)
                | (_, Self::Absent)
        )
    }
}
