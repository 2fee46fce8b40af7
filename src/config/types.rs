use crate::component::thumbnail_generator::KeyframeStrategy;
use std::path::PathBuf;

/// 外部工具的執行檔名稱或路徑
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffprobe: PathBuf,
    pub ffmpeg: PathBuf,
    pub magick: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffprobe: PathBuf::from("ffprobe"),
            ffmpeg: PathBuf::from("ffmpeg"),
            magick: PathBuf::from("magick"),
        }
    }
}

/// 啟動時建立的不可變設定，以 `Arc` 傳給 HTTP 層
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 驗證權杖
    pub token: String,
    /// 前端設定檔內容，預設設定在最前面
    pub configs: Vec<String>,
    pub listen_addr: String,
    pub auto_launch: bool,
    pub auto_exit: bool,
    pub assets_dir: Option<PathBuf>,
    pub tools: ToolPaths,
    pub keyframe_strategy: KeyframeStrategy,
    /// 0 表示不限制
    pub max_concurrent_thumbnails: usize,
    pub files: Vec<PathBuf>,
}

impl AppConfig {
    /// 指定權杖、其餘為預設值，供測試與嵌入使用
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            configs: Vec::new(),
            listen_addr: "127.0.0.1:0".to_string(),
            auto_launch: false,
            auto_exit: false,
            assets_dir: None,
            tools: ToolPaths::default(),
            keyframe_strategy: KeyframeStrategy::default(),
            max_concurrent_thumbnails: 0,
            files: Vec::new(),
        }
    }
}
