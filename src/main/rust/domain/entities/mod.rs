mod session;
mod session_lifecycle;

pub use session::{Session, SessionSummary};
pub use session_lifecycle::{SessionLifecycle, StateTransition};
