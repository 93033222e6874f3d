mod routes;

pub use routes::{routes, status_for};
