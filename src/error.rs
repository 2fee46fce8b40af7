use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// 縮圖管線與媒體清單的錯誤分類
///
/// 訊息內可能包含本機路徑，只寫入伺服器日誌，不回傳給用戶端
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("無法讀取檔案標頭 {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ffprobe 探測失敗 {path}: {reason}")]
    Probe { path: PathBuf, reason: String },

    #[error("找不到任何關鍵幀: {0}")]
    NoKeyframes(PathBuf),

    #[error("無法解析影片長度 {path}: {value:?}")]
    DurationParse { path: PathBuf, value: Option<String> },

    #[error("無法啟動 ffmpeg 擷取畫面 {path}: {source}")]
    DecodeStart {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ffmpeg 未輸出任何畫面 {path}: {status}")]
    FrameDecode { path: PathBuf, status: ExitStatus },

    #[error("magick 合成縮圖失敗 {path}: {reason}")]
    Composite { path: PathBuf, reason: String },

    #[error("索引超出範圍: {index} (共 {len} 個項目)")]
    OutOfRange { index: usize, len: usize },
}

impl MediaError {
    /// 是否為用戶端可修正的錯誤（對應 404）
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

pub type Result<T> = std::result::Result<T, MediaError>;
