mod camera_locks;
mod readiness_waiter;
mod relay_port_pool;
mod session_orchestrator;
mod session_registry;

pub use camera_locks::{CameraGuard, CameraLocks};
pub use readiness_waiter::{Readiness, ReadinessWaiter};
pub use relay_port_pool::{PortLease, RelayPortPool};
pub use session_orchestrator::{HealthReport, OrchestratorSettings, SessionOrchestrator};
pub use session_registry::SessionRegistry;
