use std::path::Path;

use super::RelayCommand;
use crate::domain::value_objects::CameraId;

pub struct FfmpegCommandBuilder;

impl FfmpegCommandBuilder {
    /// Pull the camera feed over TCP and re-publish it untouched in RTSP listen
    /// mode, so the relay waits for the consumer instead of pushing anywhere.
    pub fn build(ffmpeg: &Path, source_url: &str, port: u16, vid: &CameraId) -> RelayCommand {
        let args = [
            "-rtsp_transport",
            "tcp",
            "-i",
            source_url,
            "-c",
            "copy",
            "-f",
            "rtsp",
            "-rtsp_transport",
            "tcp",
            "-listen",
            "1",
        ]
        .into_iter()
        .map(str::to_string)
        .chain(std::iter::once(Self::listen_url(port, vid)))
        .collect();

        RelayCommand::new(ffmpeg, args)
    }

    fn listen_url(port: u16, vid: &CameraId) -> String {
        format!("rtsp://0.0.0.0:{}/{}", port, vid)
    }
}
