use crate::error::{MediaError, Result};
use crate::tools::PipelineStage;
use std::path::Path;
use std::process::Stdio;
use tokio::process::{ChildStdout, Command};

/// 縮圖邊長（像素）
pub const THUMBNAIL_SIZE: u32 = 128;

/// 棋盤格背景的原始邊長，縮放到縮圖尺寸後格子較細
pub const CHECKERBOARD_SIZE: u32 = 512;

/// 合成階段的輸入來源
#[derive(Debug)]
pub enum ComposerInput<'a> {
    /// 擷取階段的 stdout
    Pipe(ChildStdout),
    /// 靜態圖片直接以路徑交給 magick
    File(&'a Path),
}

/// 啟動 magick：把來源縮放後以 dstover 疊在棋盤格上，輸出 JPEG 到 stdout
pub fn compose(magick: &Path, source: &Path, input: ComposerInput<'_>) -> Result<PipelineStage> {
    let composite_error = |reason: String| MediaError::Composite {
        path: source.to_path_buf(),
        reason,
    };

    let command = build_compose_command(magick, input)
        .map_err(|e| composite_error(format!("無法轉接擷取階段輸出: {e}")))?;

    PipelineStage::spawn("magick", command)
        .map_err(|e| composite_error(format!("無法執行 {}: {e}", magick.display())))
}

fn build_compose_command(magick: &Path, input: ComposerInput<'_>) -> std::io::Result<Command> {
    let resize = format!("{THUMBNAIL_SIZE}x{THUMBNAIL_SIZE}");
    let pattern_size = format!("{CHECKERBOARD_SIZE}x{CHECKERBOARD_SIZE}");

    let mut cmd = Command::new(magick);

    cmd.arg("(");
    let stdin: Stdio = match input {
        ComposerInput::Pipe(stdout) => {
            cmd.arg("-");
            stdout.try_into()?
        }
        ComposerInput::File(path) => {
            cmd.arg(path);
            Stdio::null()
        }
    };
    cmd.args(["-resize", resize.as_str(), ")"]);

    cmd.args([
        "(",
        "-size",
        pattern_size.as_str(),
        "tile:pattern:checkerboard",
        "-level",
        "0%,75%",
        "-resize",
        resize.as_str(),
        ")",
        "-compose",
        "dstover",
        "-composite",
        "jpeg:-",
    ]);

    cmd.stdin(stdin);
    Ok(cmd)
}
