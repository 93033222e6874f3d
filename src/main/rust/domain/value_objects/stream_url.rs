use super::{CameraId, StreamQuality};

/// Direct URL of the camera's own RTSP server
pub fn camera_stream_url(local_address: &str, rtsp_port: u16, quality: StreamQuality) -> String {
    format!("rtsp://{}:{}/{}", local_address, rtsp_port, quality.selector())
}

/// URL under which a relay re-publishes a camera
pub fn relay_stream_url(host: &str, port: u16, vid: &CameraId) -> String {
    format!("rtsp://{}:{}/{}", host, port, vid)
}
