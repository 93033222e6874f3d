mod ffmpeg_command;
mod ffmpeg_launcher;
mod relay_process;

pub use ffmpeg_command::FfmpegCommandBuilder;
pub use ffmpeg_launcher::FfmpegRelayLauncher;
pub use relay_process::{RelayCommand, RelayProcess};
