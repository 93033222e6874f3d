mod cloud_device_client;
mod metrics_reporter;
mod relay_launcher;

pub use cloud_device_client::CloudDeviceClient;
pub use metrics_reporter::MetricsReporter;
pub use relay_launcher::{RelayHandle, RelayLauncher};
