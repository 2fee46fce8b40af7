use crate::error::{MediaError, Result as MediaResult};
use crate::tools::{MediaCategory, classify, validate_file_exists};
use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 單一媒體項目，啟動時建立後不再變動
#[derive(Debug, Clone, Serialize)]
pub struct MediaEntry {
    /// 使用者在命令列給的原始檔名
    #[serde(rename = "filename")]
    pub display_name: String,
    /// 解析後的絕對路徑，只在伺服器端使用
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub category: MediaCategory,
}

impl MediaEntry {
    /// 檢查檔案並以內容嗅探決定分類
    pub fn from_file(file: &Path) -> Result<Self> {
        validate_file_exists(file)?;

        let path = std::path::absolute(file)
            .with_context(|| format!("無法解析絕對路徑: {}", file.display()))?;
        let (category, mime_type) =
            classify(&path).with_context(|| format!("無法判斷檔案類型: {}", file.display()))?;

        debug!("{} → {mime_type} ({category:?})", path.display());

        Ok(Self {
            display_name: file.to_string_lossy().to_string(),
            path,
            mime_type,
            category,
        })
    }
}

/// 以位置索引存取的媒體清單
#[derive(Debug, Clone, Default)]
pub struct MediaLibrary {
    entries: Vec<MediaEntry>,
}

impl MediaLibrary {
    /// 依命令列順序建立清單；任何一個檔案無法判斷就失敗
    pub fn from_files(files: &[PathBuf]) -> Result<Self> {
        let entries = files
            .iter()
            .map(|file| MediaEntry::from_file(file))
            .collect::<Result<Vec<_>>>()?;

        info!("已載入 {} 個媒體檔案", entries.len());
        Ok(Self { entries })
    }

    pub fn get(&self, index: usize) -> MediaResult<&MediaEntry> {
        self.entries.get(index).ok_or(MediaError::OutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    #[must_use]
    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
