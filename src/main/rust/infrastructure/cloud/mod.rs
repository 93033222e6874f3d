mod http_cloud_client;
mod wire;

pub use http_cloud_client::HttpCloudClient;
