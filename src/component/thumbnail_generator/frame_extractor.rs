use super::keyframe_selector::SelectedTimestamp;
use crate::error::{MediaError, Result};
use crate::tools::PipelineStage;
use log::debug;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// 啟動 ffmpeg，從指定時間點擷取單一畫面並以 PNG 輸出到 stdout
///
/// 回傳的程序 stdout 尚未讀取，交給合成階段當作輸入。
/// 呼叫端負責在合成結束後回收此程序
pub fn extract_frame(
    ffmpeg: &Path,
    path: &Path,
    timestamp: SelectedTimestamp,
) -> Result<PipelineStage> {
    debug!("擷取畫面 {timestamp:?}: {}", path.display());

    PipelineStage::spawn("ffmpeg", build_extract_command(ffmpeg, path, timestamp)).map_err(
        |source| MediaError::DecodeStart {
            path: path.to_path_buf(),
            source,
        },
    )
}

fn build_extract_command(ffmpeg: &Path, path: &Path, timestamp: SelectedTimestamp) -> Command {
    let mut cmd = Command::new(ffmpeg);
    cmd.args(["-nostdin", "-loglevel", "error"]);

    match timestamp {
        SelectedTimestamp::Pts(pts) => {
            // 只解碼關鍵幀，選出第一個 pts >= 目標的畫面
            cmd.args(["-skip_frame", "nokey", "-i"])
                .arg(path)
                .args(["-an", "-fps_mode", "passthrough", "-vf"])
                .arg(format!("select=gte(pts\\,{pts})"));
        }
        SelectedTimestamp::Seconds(seconds) => {
            // -ss 在 -i 前：快速跳到最近的關鍵幀
            cmd.arg("-ss")
                .arg(format!("{:.3}", seconds.max(0.0)))
                .arg("-i")
                .arg(path)
                .arg("-an");
        }
    }

    cmd.args(["-frames:v", "1", "-f", "image2pipe", "-vcodec", "png", "-"])
        .stdin(Stdio::null());
    cmd
}
