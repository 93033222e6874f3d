pub mod cloud;
pub mod http;
pub mod metrics;
pub mod relay;
