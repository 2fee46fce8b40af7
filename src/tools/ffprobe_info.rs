use crate::error::{MediaError, Result};
use log::debug;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;

/// 關鍵幀封包格式，例如 `1024,K_`
static REGEX_KEYFRAME_PTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+),K").expect("Invalid regex"));

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

/// 列出主要視訊串流上所有關鍵幀的 pts（串流 time base 單位）
///
/// 回傳值未排序、未去重
pub async fn probe_keyframe_pts(ffprobe: &Path, path: &Path) -> Result<Vec<u64>> {
    let stdout = run_ffprobe(
        ffprobe,
        path,
        &[
            "-loglevel",
            "error",
            "-skip_frame",
            "nokey",
            "-select_streams",
            "v:0",
            "-show_entries",
            "packet=pts,flags",
            "-of",
            "csv=p=0",
        ],
    )
    .await?;

    parse_keyframe_pts(&stdout).map_err(|reason| MediaError::Probe {
        path: path.to_path_buf(),
        reason,
    })
}

/// 取得媒體總長度（秒）
pub async fn probe_duration(ffprobe: &Path, path: &Path) -> Result<f64> {
    let stdout = run_ffprobe(
        ffprobe,
        path,
        &["-v", "error", "-print_format", "json", "-show_format"],
    )
    .await?;

    let probe: FfprobeOutput = serde_json::from_str(&stdout).map_err(|e| MediaError::Probe {
        path: path.to_path_buf(),
        reason: format!("無法解析 ffprobe 輸出: {e}"),
    })?;

    let value = probe.format.and_then(|f| f.duration);
    parse_duration(value.as_deref()).ok_or_else(|| MediaError::DurationParse {
        path: path.to_path_buf(),
        value,
    })
}

async fn run_ffprobe(ffprobe: &Path, path: &Path, args: &[&str]) -> Result<String> {
    debug!("執行 ffprobe {}: {}", args.join(" "), path.display());

    let output = Command::new(ffprobe)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| MediaError::Probe {
            path: path.to_path_buf(),
            reason: format!("無法執行 {}: {e}", ffprobe.display()),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MediaError::Probe {
            path: path.to_path_buf(),
            reason: format!("{}: {}", output.status, stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// 從可能夾雜雜訊的 ffprobe 輸出中擷取關鍵幀 pts
fn parse_keyframe_pts(output: &str) -> std::result::Result<Vec<u64>, String> {
    REGEX_KEYFRAME_PTS
        .captures_iter(output)
        .map(|caps| {
            let raw = &caps[1];
            raw.parse::<u64>()
                .map_err(|e| format!("無效的 pts 值 {raw}: {e}"))
        })
        .collect()
}

fn parse_duration(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyframe_pts_csv() {
        let output = "0,K_\n512,__\n1024,K_\n2048,K_\n";
        assert_eq!(parse_keyframe_pts(output).unwrap(), vec![0, 1024, 2048]);
    }

    #[test]
    fn test_parse_keyframe_pts_with_noise() {
        let output = "\
[mov,mp4 @ 0x55d] stream 1, timescale not set
3003,K_

N/A,K_
6006,K_D
";
        assert_eq!(parse_keyframe_pts(output).unwrap(), vec![3003, 6006]);
    }

    #[test]
    fn test_parse_keyframe_pts_empty() {
        assert!(parse_keyframe_pts("").unwrap().is_empty());
        assert!(parse_keyframe_pts("100,__\n200,__\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_keyframe_pts_overflow() {
        let output = "99999999999999999999999999,K_\n";
        assert!(parse_keyframe_pts(output).is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert!((parse_duration(Some("30.000000")).unwrap() - 30.0).abs() < 0.001);
        assert!((parse_duration(Some(" 12.5\n")).unwrap() - 12.5).abs() < 0.001);
        assert!(parse_duration(Some("N/A")).is_none());
        assert!(parse_duration(Some("-1")).is_none());
        assert!(parse_duration(None).is_none());
    }

    #[test]
    fn test_ffprobe_json_without_duration() {
        let probe: FfprobeOutput = serde_json::from_str(r#"{"format": {}}"#).unwrap();
        assert!(probe.format.and_then(|f| f.duration).is_none());

        let probe: FfprobeOutput = serde_json::from_str("{}").unwrap();
        assert!(probe.format.is_none());
    }

    #[tokio::test]
    async fn test_probe_missing_binary() {
        let err = probe_keyframe_pts(
            Path::new("/nonexistent/bin/ffprobe"),
            Path::new("/tmp/video.mp4"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::Probe { .. }));
    }
}
