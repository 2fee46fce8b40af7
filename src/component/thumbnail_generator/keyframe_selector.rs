use crate::error::{MediaError, Result};
use crate::tools::{probe_duration, probe_keyframe_pts};
use log::debug;
use std::path::Path;

/// 影片長度的取樣比例（duration / 5）
const DURATION_FRACTION: f64 = 5.0;

/// 代表時間點的選取策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum KeyframeStrategy {
    /// 從關鍵幀 pts 中取前三分之一處
    #[default]
    Quantile,
    /// 直接跳到總長度的五分之一
    DurationFraction,
}

/// 傳給 ffmpeg 的跳轉目標
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectedTimestamp {
    /// 串流 time base 單位的 pts
    Pts(u64),
    /// 秒數
    Seconds(f64),
}

/// 依策略選出單一代表時間點
pub async fn select_timestamp(
    ffprobe: &Path,
    path: &Path,
    strategy: KeyframeStrategy,
) -> Result<SelectedTimestamp> {
    let selected = match strategy {
        KeyframeStrategy::Quantile => {
            let pts = probe_keyframe_pts(ffprobe, path).await?;
            let keyframes = normalize_timestamps(pts);
            debug!("{} 個關鍵幀: {}", keyframes.len(), path.display());

            select_quantile(&keyframes)
                .map(SelectedTimestamp::Pts)
                .ok_or_else(|| MediaError::NoKeyframes(path.to_path_buf()))?
        }
        KeyframeStrategy::DurationFraction => {
            let duration = probe_duration(ffprobe, path).await?;
            SelectedTimestamp::Seconds(duration / DURATION_FRACTION)
        }
    };

    debug!("選取時間點 {selected:?}: {}", path.display());
    Ok(selected)
}

/// 排序並移除相鄰重複值，結果嚴格遞增
#[must_use]
pub fn normalize_timestamps(mut timestamps: Vec<u64>) -> Vec<u64> {
    timestamps.sort_unstable();
    timestamps.dedup();
    timestamps
}

/// 從已排序去重的時間點中選一個
///
/// - 1 或 2 個：取第一個
/// - 3 個：取中間
/// - 更多：取 `(n - 1) / 3`，偏向前段，避開開頭黑畫面與片尾字幕
#[must_use]
pub fn select_quantile(timestamps: &[u64]) -> Option<u64> {
    let index = match timestamps.len() {
        0 => return None,
        1 | 2 => 0,
        3 => 1,
        n => (n - 1) / 3,
    };
    timestamps.get(index).copied()
}
