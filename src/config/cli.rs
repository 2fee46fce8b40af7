use crate::component::thumbnail_generator::KeyframeStrategy;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// 本機媒體瀏覽伺服器
#[derive(Debug, Clone, Parser)]
#[command(name = "media-preview", version, about)]
pub struct Cli {
    /// 要瀏覽的媒體檔案，索引依出現順序
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// 使用內建的預設前端設定
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub defaults: bool,

    /// 額外的前端設定檔，可重複指定
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_files: Vec<PathBuf>,

    /// 啟動後自動開啟瀏覽器
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub auto_launch: bool,

    /// 收到 /exit 時關閉伺服器
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub auto_exit: bool,

    /// 驗證權杖，未指定時隨機產生
    #[arg(long)]
    pub token: Option<String>,

    /// 監聽位址
    #[arg(short = 'l', long, default_value = "127.0.0.1:0")]
    pub listen: String,

    /// 前端靜態檔案目錄
    #[arg(long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// 影片縮圖的時間點選取策略
    #[arg(long, value_enum, default_value_t = KeyframeStrategy::Quantile)]
    pub keyframe_strategy: KeyframeStrategy,

    /// 同時生成縮圖的上限，0 表示不限制
    #[arg(long, default_value_t = 0)]
    pub max_concurrent_thumbnails: usize,

    #[arg(long, default_value = "ffprobe")]
    pub ffprobe: PathBuf,

    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    #[arg(long, default_value = "magick")]
    pub magick: PathBuf,
}
