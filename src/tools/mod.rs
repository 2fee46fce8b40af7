mod browser_launcher;
mod content_sniffer;
mod ffprobe_info;
mod path_validator;
mod pipeline_stage;

pub use browser_launcher::launch_browser;
pub use content_sniffer::{MediaCategory, SNIFF_LEN, UNKNOWN_BINARY, classify, detect_mime};
pub use ffprobe_info::{probe_duration, probe_keyframe_pts};
pub use path_validator::{validate_directory_exists, validate_file_exists};
pub use pipeline_stage::PipelineStage;
