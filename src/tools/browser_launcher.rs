use log::{info, warn};

/// 以系統預設瀏覽器開啟網址；失敗只記錄，不影響伺服器
pub fn launch_browser(url: &str) {
    match open::that_detached(url) {
        Ok(()) => info!("已開啟瀏覽器"),
        Err(e) => warn!("無法開啟瀏覽器: {e}"),
    }
}
