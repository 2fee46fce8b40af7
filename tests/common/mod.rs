//! 測試共用的假外部工具與媒體檔案
//!
//! 以 shell script 取代 ffprobe / ffmpeg / magick，並把參數與輸入記錄到暫存目錄

#![allow(dead_code)]

use media_preview::component::media_library::MediaLibrary;
use media_preview::config::{AppConfig, ToolPaths};
use media_preview::server::AppState;
use media_preview::signal::ShutdownSignal;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TOKEN: &str = "0123456789abcdef0123456789abcdef";

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01";
pub const GIF_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00";
pub const MP4_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00mp42isom\x00\x00\x00\x08free";

/// 假 ffmpeg 輸出的畫面內容
pub const FRAME_BYTES: &[u8] = b"FAKE-PNG-FRAME";
/// 假 magick 輸出的縮圖內容
pub const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0FAKE-JPEG";

/// 關鍵幀 pts 0..=30，間隔 5
const KEYFRAME_CSV: &str = "0,K__\\n5,K__\\n7,___\\n10,K__\\n15,K__\\n20,K__\\n25,K__\\n30,K__\\n";

pub struct Fixture {
    pub dir: TempDir,
    pub tools: ToolPaths,
    /// 依序為 PNG、GIF、MP4
    pub files: Vec<PathBuf>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        let files = vec![
            write_file(root, "still.png", PNG_BYTES),
            write_file(root, "loop.gif", GIF_BYTES),
            write_file(root, "clip.mp4", MP4_BYTES),
        ];

        let ffprobe = write_script(
            root,
            "ffprobe",
            &format!(
                "printf '%s\\n' \"$@\" > '{log}/ffprobe.args'\nprintf '{KEYFRAME_CSV}'\n",
                log = root.display()
            ),
        );
        let ffmpeg = write_script(
            root,
            "ffmpeg",
            &format!(
                "printf '%s\\n' \"$@\" > '{log}/ffmpeg.args'\nprintf 'FAKE-PNG-FRAME'\n",
                log = root.display()
            ),
        );
        let magick = write_script(
            root,
            "magick",
            &format!(
                "printf '%s\\n' \"$@\" > '{log}/magick.args'\ncat > '{log}/magick.stdin'\nprintf '\\377\\330\\377\\340FAKE-JPEG'\n",
                log = root.display()
            ),
        );

        Self {
            dir,
            tools: ToolPaths {
                ffprobe,
                ffmpeg,
                magick,
            },
            files,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// 取代某個工具的腳本內容
    pub fn replace_tool(&self, name: &str, body: &str) -> PathBuf {
        write_script(self.root(), name, body)
    }

    pub fn library(&self) -> MediaLibrary {
        MediaLibrary::from_files(&self.files).unwrap()
    }

    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::with_token(TOKEN);
        config.tools = self.tools.clone();
        config.configs = vec!["// defaults".to_string(), "// user".to_string()];
        config
    }

    pub fn state(&self, config: AppConfig, shutdown: ShutdownSignal) -> AppState {
        AppState::new(config, self.library(), shutdown)
    }

    /// 工具留下的紀錄；不存在表示該工具沒有被執行
    pub fn log(&self, name: &str) -> Option<Vec<u8>> {
        fs::read(self.root().join(name)).ok()
    }

    pub fn args(&self, tool: &str) -> Option<Vec<String>> {
        self.log(&format!("{tool}.args")).map(|bytes| {
            String::from_utf8_lossy(&bytes)
                .lines()
                .map(str::to_string)
                .collect()
        })
    }
}

fn write_file(root: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = root.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn write_script(root: &Path, name: &str, body: &str) -> PathBuf {
    let path = root.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}
