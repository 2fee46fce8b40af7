//! 縮圖生成元件
//!
//! 四個階段：
//! A. 依分類決定輸入來源
//! B. 選取代表時間點（ffprobe）
//! C. 擷取單一畫面（ffmpeg → pipe）
//! D. 縮放並疊上棋盤格背景（magick → JPEG）

mod frame_extractor;
mod keyframe_selector;
mod main;
mod thumbnail_composer;

pub use frame_extractor::extract_frame;
pub use keyframe_selector::{
    KeyframeStrategy, SelectedTimestamp, normalize_timestamps, select_quantile, select_timestamp,
};
pub use main::{ThumbnailPipeline, ThumbnailPlan, ThumbnailStream};
pub use thumbnail_composer::{CHECKERBOARD_SIZE, ComposerInput, THUMBNAIL_SIZE, compose};
